//! Instance transformation data.
//!
//! Per-instance data like position, rotation, and scale. Scene nodes carry one
//! local `Instance`; world transforms are obtained by composing parents with
//! `Mul`, and `to_raw` packs the result into the layout a GPU instance buffer
//! expects.

use std::ops::Mul;

use cgmath::{InnerSpace, Matrix3, One, Quaternion, Rad, Rotation, Rotation3, SquareMatrix, Vector3};

/// Per-instance transformation: position, rotation (as quaternion), and scale.
///
/// Multiple copies of the same mesh can be rendered with different transforms
/// in a single draw call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Instance {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Instance {
    /// Create a new instance with identity transformation (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            // `Quaternion::one()` is the identity quaternion (no rotation)
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn with_position(mut self, position: Vector3<f32>) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Quaternion<f32>) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vector3<f32>) -> Self {
        self.scale = scale;
        self
    }

    /// Takes the rotation part of `matrix` as the orientation.
    pub fn with_rotation_matrix(self, matrix: Matrix3<f32>) -> Self {
        self.with_rotation(Quaternion::from(matrix).normalize())
    }

    /// Rotates by `angle` around `axis` expressed in the instance's own frame.
    pub fn rotate_local(&mut self, axis: Vector3<f32>, angle: Rad<f32>) {
        self.rotation = (self.rotation * Quaternion::from_axis_angle(axis.normalize(), angle)).normalize();
    }

    /// Orients the instance so its local +Z axis points at `target`.
    ///
    /// Leaves the rotation untouched when `target` coincides with `position`.
    pub fn look_at(&mut self, target: Vector3<f32>) {
        let direction = target - self.position;
        if direction.magnitude2() <= f32::EPSILON {
            return;
        }
        let direction = direction.normalize();
        let yaw = direction.x.atan2(direction.z);
        let pitch = -direction.y.clamp(-1.0, 1.0).asin();
        self.rotation = Quaternion::from_angle_y(Rad(yaw)) * Quaternion::from_angle_x(Rad(pitch));
    }

    pub fn rotation_matrix(&self) -> Matrix3<f32> {
        Matrix3::from(self.rotation)
    }

    /// Transforms a direction given in local space into the parent space.
    pub fn rotate_vector(&self, v: Vector3<f32>) -> Vector3<f32> {
        self.rotation.rotate_vector(v)
    }

    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    pub fn to_raw(&self) -> InstanceRaw {
        let world_matrix = self.to_matrix();
        let handedness = world_matrix.determinant().signum();
        InstanceRaw {
            model: world_matrix.into(),
            normal: Matrix3::from(self.rotation).into(),
            handedness,
        }
    }
}

impl<'a, 'b> Mul<&'b Instance> for &'a Instance {
    type Output = Instance;

    fn mul(self, rhs: &'b Instance) -> Self::Output {
        let new_rotation = self.rotation * rhs.rotation;

        let new_scale = Vector3::new(
            self.scale.x * rhs.scale.x,
            self.scale.y * rhs.scale.y,
            self.scale.z * rhs.scale.z,
        );
        let scaled_rhs_pos = Vector3::new(
            self.scale.x * rhs.position.x,
            self.scale.y * rhs.position.y,
            self.scale.z * rhs.position.z,
        );
        let new_position = self.position + (self.rotation * scaled_rhs_pos);

        Instance {
            position: new_position,
            rotation: new_rotation,
            scale: new_scale,
        }
    }
}

impl Mul<Instance> for Instance {
    type Output = Self;

    fn mul(self, rhs: Instance) -> Self::Output {
        &self * &rhs
    }
}

impl From<Vector3<f32>> for Instance {
    fn from(position: Vector3<f32>) -> Self {
        Instance {
            position,
            ..Default::default()
        }
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}

/**
 * The raw instance is the data a renderer stores on the GPU: the world matrix,
 * the normal matrix and the sign of the determinant for mirrored instances.
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 3]; 3],
    pub handedness: f32,
}

impl InstanceRaw {
    pub fn translation(&self) -> Vector3<f32> {
        Vector3::new(self.model[3][0], self.model[3][1], self.model[3][2])
    }
}
