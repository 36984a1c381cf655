//! seating-ngin
//!
//! Procedural circular-seating layouts on an instancing-oriented scene graph.
//! A grid of rooms is computed from a few counts and radii; each room gets
//! tables on a ring and chairs on smaller rings around every table. Chairs and
//! markers are stamped as instances of hidden template meshes, and every node
//! spawned is tracked so a regeneration can release all of it at once.
//!
//! High-level modules
//! - `layout`: pure placement math (grid cells, seat slots, table positions)
//! - `data_structures`: transforms, mesh data and the scene backend seam
//! - `registry`: lifecycle arena tracking spawned nodes and templates
//! - `components`: circular seating and chair builders
//! - `flow`: the scene orchestrator, regeneration and render loop
//! - `render`: per-frame instance batches
//! - `context`: environment and layout configuration
//! - `error`: error taxonomy
//!

pub mod components;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod flow;
pub mod layout;
pub mod registry;
pub mod render;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use components::chair::{ChairBuilder, ChairPolicy};
pub use context::SceneConfig;
pub use data_structures::scene_graph::{HeadlessScene, NodeHandle, SceneBackend};
pub use error::LayoutError;
pub use flow::{ProceduralScene, Regeneration};
