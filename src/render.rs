//! Frame composition and instance batching.
//!
//! Each call to [`SceneBackend::render`](crate::data_structures::scene_graph::SceneBackend::render)
//! produces a [`Frame`]: one [`Batch`] per source mesh, carrying the packed
//! world transforms of everything drawn from it. This is the data a GPU
//! renderer uploads to its instance buffers before issuing one instanced draw
//! per batch.
//!
//! # Key types
//!
//! - [`Frame`] is the per-frame render output
//! - [`Batch`] groups instances sharing one mesh
//!

use crate::data_structures::{instance::InstanceRaw, scene_graph::NodeHandle};

/// Data for instanced object rendering: the mesh to draw and its instances.
#[derive(Clone, Debug)]
pub struct Batch {
    pub mesh: NodeHandle,
    pub name: String,
    pub index_count: usize,
    pub instances: Vec<InstanceRaw>,
}

impl Batch {
    pub fn amount(&self) -> usize {
        self.instances.len()
    }

    /// Instance data as uploaded to a vertex buffer.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }
}

/// Everything drawn in one frame.
#[derive(Clone, Debug, Default)]
pub struct Frame {
    pub number: u64,
    pub batches: Vec<Batch>,
}

impl Frame {
    pub fn instance_count(&self) -> usize {
        self.batches.iter().map(Batch::amount).sum()
    }

    pub fn draw_calls(&self) -> usize {
        self.batches.len()
    }

    pub fn batch(&self, mesh: NodeHandle) -> Option<&Batch> {
        self.batches.iter().find(|b| b.mesh == mesh)
    }
}
