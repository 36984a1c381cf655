//! Scene environment and layout configuration.
//!
//! [`Environment`] describes what a freshly created scene surface contains
//! (camera, lights, clear colour); [`SceneConfig`] holds the layout
//! parameters the orchestrator feeds to the generators. Both are plain
//! structs with public fields and defaults matching the stock seating scene.

use std::f32::consts::PI;

use cgmath::Vector3;

use crate::components::chair::ChairPolicy;

/// Orbit camera looking at `target` from spherical coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcRotateCamera {
    pub alpha: f32,
    pub beta: f32,
    pub radius: f32,
    pub target: Vector3<f32>,
    pub upper_beta_limit: f32,
}

impl ArcRotateCamera {
    /// Camera position in world space.
    pub fn eye(&self) -> Vector3<f32> {
        let beta = self.beta.min(self.upper_beta_limit);
        self.target
            + Vector3::new(
                self.radius * self.alpha.cos() * beta.sin(),
                self.radius * beta.cos(),
                self.radius * self.alpha.sin() * beta.sin(),
            )
    }
}

impl Default for ArcRotateCamera {
    fn default() -> Self {
        Self {
            alpha: -PI / 2.0,
            beta: PI / 3.0,
            radius: 50.0,
            target: Vector3::new(0.0, 0.0, 0.0),
            upper_beta_limit: PI / 2.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Light {
    Hemispheric {
        direction: Vector3<f32>,
        intensity: f32,
    },
    Point {
        position: Vector3<f32>,
        intensity: f32,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Environment {
    pub camera: ArcRotateCamera,
    pub lights: Vec<Light>,
    pub clear_colour: [f32; 4],
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            camera: ArcRotateCamera::default(),
            lights: vec![
                Light::Hemispheric {
                    direction: Vector3::new(0.0, 1.0, 0.0),
                    intensity: 0.2,
                },
                Light::Point {
                    position: Vector3::new(0.0, 25.0, 0.0),
                    intensity: 0.7,
                },
            ],
            clear_colour: [0.2, 0.2, 0.3, 1.0],
        }
    }
}

/// Layout and runtime parameters for a [`ProceduralScene`](crate::flow::ProceduralScene).
#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    /// Extent of the tiled floor along x and z.
    pub area: (f32, f32),
    /// Vertical offset of every room above its grid cell.
    pub room_height: f32,
    pub table_ring_radius: f32,
    pub seat_ring_radius: f32,
    pub tables_per_room: u32,
    pub seats_per_table: u32,
    pub chair_policy: ChairPolicy,
    /// Grid built by [`ProceduralScene::launch`](crate::flow::ProceduralScene::launch).
    pub initial_grid: (u32, u32),
    pub frame_interval_millis: u64,
    /// Thickness of the grid cell markers.
    pub marker_height: f32,
    pub environment: Environment,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            area: (60.0, 60.0),
            room_height: 0.5,
            table_ring_radius: 4.0,
            seat_ring_radius: 2.0,
            tables_per_room: 2,
            seats_per_table: 5,
            chair_policy: ChairPolicy::Instanced,
            initial_grid: (3, 3),
            frame_interval_millis: 16,
            marker_height: 0.1,
            environment: Environment::default(),
        }
    }
}
