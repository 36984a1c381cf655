//! CPU-side mesh data and primitive shape construction.
//!
//! Meshes are kept as plain vertex and index vectors so they can be merged and
//! inspected without a device. A renderer uploads them with
//! `bytemuck::cast_slice` exactly as stored.

use cgmath::{InnerSpace, Matrix3, Vector3};

use crate::data_structures::instance::Instance;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

/// Axis-aligned bounds of a mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Bounds {
    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }
}

impl MeshData {
    /// A box centred on the origin with the given extents along x, y and z.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let (hx, hy, hz) = (width / 2.0, height / 2.0, depth / 2.0);
        // (normal, u axis, v axis) per face; corners are normal ± u ± v
        let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ];
        let half = Vector3::new(hx, hy, hz);
        let mut mesh = MeshData::default();
        for (normal, u, v) in faces {
            let n: Vector3<f32> = normal.into();
            let u: Vector3<f32> = u.into();
            let v: Vector3<f32> = v.into();
            let base = mesh.vertices.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let corner = n + u * su + v * sv;
                let position = Vector3::new(corner.x * half.x, corner.y * half.y, corner.z * half.z);
                mesh.vertices.push(ModelVertex {
                    position: position.into(),
                    normal,
                });
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        mesh
    }

    /// A closed cylinder standing on the y axis, centred on the origin.
    pub fn cylinder(height: f32, diameter: f32, tessellation: u32) -> Self {
        let segments = tessellation.max(3);
        let radius = diameter / 2.0;
        let hy = height / 2.0;
        let mut mesh = MeshData::default();
        let ring = |i: u32| {
            let angle = std::f32::consts::TAU * i as f32 / segments as f32;
            (angle.cos(), angle.sin())
        };

        // side
        for i in 0..segments {
            let (c0, s0) = ring(i);
            let (c1, s1) = ring(i + 1);
            let base = mesh.vertices.len() as u32;
            for (c, s, y) in [(c0, s0, -hy), (c1, s1, -hy), (c1, s1, hy), (c0, s0, hy)] {
                mesh.vertices.push(ModelVertex {
                    position: [c * radius, y, s * radius],
                    normal: [c, 0.0, s],
                });
            }
            mesh.indices
                .extend_from_slice(&[base, base + 2, base + 1, base, base + 3, base + 2]);
        }

        // caps
        for (y, ny) in [(hy, 1.0), (-hy, -1.0)] {
            let center = mesh.vertices.len() as u32;
            mesh.vertices.push(ModelVertex {
                position: [0.0, y, 0.0],
                normal: [0.0, ny, 0.0],
            });
            for i in 0..segments {
                let (c, s) = ring(i);
                mesh.vertices.push(ModelVertex {
                    position: [c * radius, y, s * radius],
                    normal: [0.0, ny, 0.0],
                });
            }
            for i in 0..segments {
                let a = center + 1 + i;
                let b = center + 1 + (i + 1) % segments;
                if ny > 0.0 {
                    mesh.indices.extend_from_slice(&[center, b, a]);
                } else {
                    mesh.indices.extend_from_slice(&[center, a, b]);
                }
            }
        }
        mesh
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let first: Vector3<f32> = self.vertices.first()?.position.into();
        let bounds = self.vertices.iter().fold(
            Bounds {
                min: first,
                max: first,
            },
            |acc, v| Bounds {
                min: Vector3::new(
                    acc.min.x.min(v.position[0]),
                    acc.min.y.min(v.position[1]),
                    acc.min.z.min(v.position[2]),
                ),
                max: Vector3::new(
                    acc.max.x.max(v.position[0]),
                    acc.max.y.max(v.position[1]),
                    acc.max.z.max(v.position[2]),
                ),
            },
        );
        Some(bounds)
    }

    /// Returns a copy with `transform` baked into positions and normals.
    pub fn transformed(&self, transform: &Instance) -> Self {
        let normal_rotation = Matrix3::from(transform.rotation);
        let vertices = self
            .vertices
            .iter()
            .map(|v| {
                let p: Vector3<f32> = v.position.into();
                let scaled = Vector3::new(
                    p.x * transform.scale.x,
                    p.y * transform.scale.y,
                    p.z * transform.scale.z,
                );
                let position = transform.position + transform.rotate_vector(scaled);
                let n: Vector3<f32> = v.normal.into();
                let normal = (normal_rotation * n).normalize();
                ModelVertex {
                    position: position.into(),
                    normal: normal.into(),
                }
            })
            .collect();
        Self {
            vertices,
            indices: self.indices.clone(),
        }
    }

    /**
     * Bakes every part's transform into its vertices and concatenates the
     * results into one mesh.
     *
     * Returns `None` when there is nothing to merge, or when any part carries
     * no triangles or an index pointing outside its own vertices.
     */
    pub fn merge<'a, I>(parts: I) -> Option<Self>
    where
        I: IntoIterator<Item = (&'a MeshData, Instance)>,
    {
        let mut merged = MeshData::default();
        let mut any = false;
        for (mesh, transform) in parts {
            if mesh.is_empty() || mesh.indices.len() % 3 != 0 {
                return None;
            }
            if mesh.indices.iter().any(|&i| i as usize >= mesh.vertices.len()) {
                return None;
            }
            let offset = merged.vertices.len() as u32;
            let baked = mesh.transformed(&transform);
            merged.vertices.extend(baked.vertices);
            merged
                .indices
                .extend(baked.indices.into_iter().map(|i| i + offset));
            any = true;
        }
        any.then_some(merged)
    }
}
