//! Engine data structures: transforms, meshes and the scene graph.
//!
//! - `instance` holds per-instance transformation data and its GPU layout
//! - `mesh` contains CPU-side mesh data and primitive shapes
//! - `scene_graph` defines the scene backend seam and the headless scene

pub mod instance;
pub mod mesh;
pub mod scene_graph;
