//! Procedural chair built from four boxes.
//!
//! The seat, back and two armrests are created as separate meshes, merged
//! into one and placed at a seat slot. With [`ChairPolicy::Direct`] every
//! chair is its own merged mesh; with [`ChairPolicy::Instanced`] the first
//! merged mesh becomes a hidden template and each chair is an instance of it.

use std::f32::consts::{FRAC_PI_2, PI};

use cgmath::{Matrix3, Rad, Vector3};
use log::{error, trace};

use crate::{
    data_structures::{
        instance::Instance,
        mesh::MeshData,
        scene_graph::{NodeHandle, SceneBackend},
    },
    error::{LayoutError, Result},
    registry::{Category, LifecycleArena, ReleaseReport, TemplateKind},
};

/// Half the distance between the two armrests.
pub const ARM_REST_DISTANCE: f32 = 0.5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChairPolicy {
    /// One independent merged mesh per chair.
    Direct,
    /// One hidden merged template, one instance per chair.
    #[default]
    Instanced,
}

#[derive(Debug)]
pub struct ChairBuilder {
    policy: ChairPolicy,
    arena: LifecycleArena,
}

impl ChairBuilder {
    pub fn new(policy: ChairPolicy) -> Self {
        Self {
            policy,
            arena: LifecycleArena::new("ChairBuilder"),
        }
    }

    pub fn policy(&self) -> ChairPolicy {
        self.policy
    }

    pub fn chair_count(&self) -> usize {
        self.arena.count(Category::Chair)
    }

    pub fn chairs(&self) -> impl Iterator<Item = NodeHandle> + '_ {
        self.arena.handles(Category::Chair)
    }

    pub fn template<S: SceneBackend>(&self, scene: &S) -> Option<NodeHandle> {
        self.arena.template(scene, TemplateKind::Chair)
    }

    pub fn live_count<S: SceneBackend>(&self, scene: &S) -> usize {
        self.arena.live_count(scene)
    }

    /// World transform of a chair placed at `position` with the seat's `rotation`.
    pub fn chair_transform(position: Vector3<f32>, rotation: Matrix3<f32>) -> Instance {
        let mut transform = Instance::from(position).with_rotation_matrix(rotation);
        transform.rotate_local(Vector3::unit_x(), Rad(-FRAC_PI_2));
        transform.rotate_local(Vector3::unit_y(), Rad(PI));
        transform
    }

    /// Build one chair and return the node that renders it.
    pub fn build_chair<S: SceneBackend>(
        &mut self,
        scene: &mut S,
        position: Vector3<f32>,
        rotation: Matrix3<f32>,
    ) -> Result<NodeHandle> {
        let transform = Self::chair_transform(position, rotation);
        match self.policy {
            ChairPolicy::Direct => {
                let chair = merged_chair(scene, "chair")?;
                scene.set_local_transform(chair, transform);
                Ok(self.arena.track(Category::Chair, chair))
            }
            ChairPolicy::Instanced => {
                let template = match self.template(scene) {
                    Some(template) => template,
                    None => {
                        let template = merged_chair(scene, "chair_template")?;
                        scene.set_visible(template, false);
                        trace!("ChairBuilder: created chair template {:?}", template);
                        self.arena
                            .install_template(scene, TemplateKind::Chair, template)
                    }
                };
                let chair = scene
                    .create_instance(template, "chair_instance")
                    .ok_or_else(|| LayoutError::BuildFailure("chair instance".to_string()))?;
                scene.set_local_transform(chair, transform);
                Ok(self.arena.track(Category::Chair, chair))
            }
        }
    }

    /// Release every chair, then the template.
    pub fn cleanup<S: SceneBackend>(&mut self, scene: &mut S) -> ReleaseReport {
        self.arena.release_all(scene)
    }
}

fn merged_chair<S: SceneBackend>(scene: &mut S, name: &str) -> Result<NodeHandle> {
    let parts = [
        (
            "seat",
            MeshData::cuboid(ARM_REST_DISTANCE * 2.0, 0.1, 1.0),
            Vector3::new(0.0, 0.0, 0.0),
        ),
        (
            "back",
            MeshData::cuboid(ARM_REST_DISTANCE * 2.0 + 0.1, 1.0, 0.1),
            Vector3::new(0.0, 0.5, 0.45),
        ),
        (
            "arm_rest_l",
            MeshData::cuboid(0.1, 1.0, 1.0),
            Vector3::new(-ARM_REST_DISTANCE, 0.0, 0.0),
        ),
        (
            "arm_rest_r",
            MeshData::cuboid(0.1, 1.0, 1.0),
            Vector3::new(ARM_REST_DISTANCE, 0.0, 0.0),
        ),
    ];
    let handles: Vec<NodeHandle> = parts
        .into_iter()
        .map(|(part, mesh, offset)| {
            let handle = scene.add_mesh(part, mesh);
            scene.set_local_transform(handle, Instance::from(offset));
            handle
        })
        .collect();

    match scene.merge_meshes(name, &handles) {
        Some(chair) => Ok(chair),
        None => {
            error!("Chair creation failed: could not merge chair parts");
            for handle in handles {
                scene.dispose(handle);
            }
            Err(LayoutError::BuildFailure(name.to_string()))
        }
    }
}
