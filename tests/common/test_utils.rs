#![allow(dead_code)]

use cgmath::{InnerSpace, Vector3};
use seating_ngin::{
    HeadlessScene, NodeHandle, SceneBackend,
    context::Environment,
    data_structures::{instance::Instance, mesh::MeshData},
    render::Frame,
};

pub(crate) const EPSILON: f32 = 1e-4;

pub(crate) fn scene() -> HeadlessScene {
    HeadlessScene::create(&Environment::default())
}

pub(crate) fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() <= EPSILON,
        "expected {} but got {}",
        expected,
        actual
    );
}

pub(crate) fn assert_vec_close(actual: Vector3<f32>, expected: Vector3<f32>) {
    assert!(
        (actual - expected).magnitude() <= EPSILON,
        "expected {:?} but got {:?}",
        expected,
        actual
    );
}

/// A scene whose mesh merging always fails, as with degenerate input.
#[derive(Debug)]
pub(crate) struct MergeFailingScene {
    pub inner: HeadlessScene,
    pub merge_attempts: u32,
}

impl SceneBackend for MergeFailingScene {
    fn create(environment: &Environment) -> Self {
        Self {
            inner: HeadlessScene::create(environment),
            merge_attempts: 0,
        }
    }

    fn environment(&self) -> &Environment {
        self.inner.environment()
    }

    fn add_mesh(&mut self, name: &str, mesh: MeshData) -> NodeHandle {
        self.inner.add_mesh(name, mesh)
    }

    fn add_transform_node(&mut self, name: &str) -> NodeHandle {
        self.inner.add_transform_node(name)
    }

    fn merge_meshes(&mut self, _: &str, _: &[NodeHandle]) -> Option<NodeHandle> {
        self.merge_attempts += 1;
        None
    }

    fn create_instance(&mut self, source: NodeHandle, name: &str) -> Option<NodeHandle> {
        self.inner.create_instance(source, name)
    }

    fn local_transform(&self, node: NodeHandle) -> Option<Instance> {
        self.inner.local_transform(node)
    }

    fn set_local_transform(&mut self, node: NodeHandle, transform: Instance) -> bool {
        self.inner.set_local_transform(node, transform)
    }

    fn world_transform(&self, node: NodeHandle) -> Option<Instance> {
        self.inner.world_transform(node)
    }

    fn set_parent(&mut self, node: NodeHandle, parent: Option<NodeHandle>) -> bool {
        self.inner.set_parent(node, parent)
    }

    fn set_visible(&mut self, node: NodeHandle, visible: bool) -> bool {
        self.inner.set_visible(node, visible)
    }

    fn is_visible(&self, node: NodeHandle) -> bool {
        self.inner.is_visible(node)
    }

    fn is_disposed(&self, node: NodeHandle) -> bool {
        self.inner.is_disposed(node)
    }

    fn dispose(&mut self, node: NodeHandle) -> bool {
        self.inner.dispose(node)
    }

    fn live_nodes(&self) -> usize {
        self.inner.live_nodes()
    }

    fn render(&mut self) -> Frame {
        self.inner.render()
    }
}
