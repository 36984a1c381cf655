//! Scene graph and the backend seam the layout code renders through.
//!
//! [`SceneBackend`] lists the scene operations the generators rely on:
//! primitive meshes, merging, instancing from a template, transform nodes,
//! parenting, visibility, disposal and per-frame batch extraction.
//! [`HeadlessScene`] implements it on the CPU with generational handles, so a
//! handle to a disposed node can never alias a newer one.

use std::collections::{HashMap, HashSet};

use slotmap::{SecondaryMap, SlotMap, new_key_type};

use crate::{
    context::Environment,
    data_structures::{instance::Instance, mesh::MeshData},
    render::{Batch, Frame},
};

new_key_type! {
    /// Opaque handle to a node living in a scene.
    pub struct NodeHandle;
}

#[derive(Clone, Debug)]
pub enum NodeKind {
    /// A mesh owning its geometry. Hidden meshes act as instancing templates.
    Mesh(MeshData),
    /// A lightweight copy drawing the geometry of `source`.
    Instance { source: NodeHandle },
    /// A geometry-less node used to group and place children.
    Transform,
}

#[derive(Clone, Debug)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub local: Instance,
    pub parent: Option<NodeHandle>,
    pub visible: bool,
}

impl Node {
    fn new(name: &str, kind: NodeKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            local: Instance::default(),
            parent: None,
            visible: true,
        }
    }
}

/// Trait for a scene the layout components can populate.
///
/// Every mutating call on a disposed handle is a no-op returning `false` (or
/// `None`); none of them panic.
pub trait SceneBackend {
    /// Create a fresh, empty scene surface for `environment`.
    fn create(environment: &Environment) -> Self
    where
        Self: Sized;

    fn environment(&self) -> &Environment;

    fn add_mesh(&mut self, name: &str, mesh: MeshData) -> NodeHandle;

    fn add_transform_node(&mut self, name: &str) -> NodeHandle;

    /// Merge `parts` into one new mesh with their world transforms baked in.
    ///
    /// The parts are disposed on success. Returns `None` and leaves the parts
    /// untouched if any part is not a live mesh or the geometry cannot be merged.
    fn merge_meshes(&mut self, name: &str, parts: &[NodeHandle]) -> Option<NodeHandle>;

    /// Stamp an instance of the mesh `source`, copying its local transform.
    fn create_instance(&mut self, source: NodeHandle, name: &str) -> Option<NodeHandle>;

    fn local_transform(&self, node: NodeHandle) -> Option<Instance>;

    fn set_local_transform(&mut self, node: NodeHandle, transform: Instance) -> bool;

    fn world_transform(&self, node: NodeHandle) -> Option<Instance>;

    /// Re-parent `node`; rejects parents that would introduce a cycle.
    fn set_parent(&mut self, node: NodeHandle, parent: Option<NodeHandle>) -> bool;

    fn set_visible(&mut self, node: NodeHandle, visible: bool) -> bool;

    fn is_visible(&self, node: NodeHandle) -> bool;

    fn is_disposed(&self, node: NodeHandle) -> bool;

    /// Release `node` together with its children and, for meshes, every
    /// instance drawn from it. Returns `false` if it was already gone.
    fn dispose(&mut self, node: NodeHandle) -> bool;

    fn live_nodes(&self) -> usize;

    /// Collect everything visible into per-mesh batches.
    fn render(&mut self) -> Frame;
}

#[derive(Debug, Default)]
pub struct HeadlessScene {
    nodes: SlotMap<NodeHandle, Node>,
    /// Parent to children, kept in step with `Node::parent`.
    children: Links,
    /// Template mesh to the instances drawn from it.
    instances: Links,
    environment: Environment,
    frames: u64,
}

type Links = SecondaryMap<NodeHandle, HashSet<NodeHandle>>;

fn link(index: &mut Links, from: NodeHandle, to: NodeHandle) {
    if let Some(entry) = index.entry(from) {
        entry.or_default().insert(to);
    }
}

fn unlink(index: &mut Links, from: NodeHandle, to: NodeHandle) {
    if let Some(set) = index.get_mut(from) {
        set.remove(&to);
    }
}

impl HeadlessScene {
    pub fn node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    pub fn name(&self, handle: NodeHandle) -> Option<&str> {
        self.nodes.get(handle).map(|n| n.name.as_str())
    }

    pub fn mesh(&self, handle: NodeHandle) -> Option<&MeshData> {
        match &self.nodes.get(handle)?.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            NodeKind::Instance { source } => self.mesh(*source),
            NodeKind::Transform => None,
        }
    }

    pub fn source_of(&self, handle: NodeHandle) -> Option<NodeHandle> {
        match self.nodes.get(handle)?.kind {
            NodeKind::Instance { source } => Some(source),
            _ => None,
        }
    }

    pub fn parent_of(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.nodes.get(handle)?.parent
    }

    pub fn children_of(&self, handle: NodeHandle) -> Vec<NodeHandle> {
        self.children
            .get(handle)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn instances_of(&self, source: NodeHandle) -> Vec<NodeHandle> {
        self.instances
            .get(source)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of live nodes of each kind as (meshes, instances, transforms).
    pub fn census(&self) -> (usize, usize, usize) {
        self.nodes
            .values()
            .fold((0, 0, 0), |(m, i, t), node| match node.kind {
                NodeKind::Mesh(_) => (m + 1, i, t),
                NodeKind::Instance { .. } => (m, i + 1, t),
                NodeKind::Transform => (m, i, t + 1),
            })
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    fn is_ancestor(&self, candidate: NodeHandle, of: NodeHandle) -> bool {
        let mut current = Some(of);
        while let Some(handle) = current {
            if handle == candidate {
                return true;
            }
            current = self.nodes.get(handle).and_then(|n| n.parent);
        }
        false
    }

    fn insert(&mut self, node: Node) -> NodeHandle {
        self.nodes.insert(node)
    }
}

impl SceneBackend for HeadlessScene {
    fn create(environment: &Environment) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            children: SecondaryMap::new(),
            instances: SecondaryMap::new(),
            environment: environment.clone(),
            frames: 0,
        }
    }

    fn environment(&self) -> &Environment {
        &self.environment
    }

    fn add_mesh(&mut self, name: &str, mesh: MeshData) -> NodeHandle {
        self.insert(Node::new(name, NodeKind::Mesh(mesh)))
    }

    fn add_transform_node(&mut self, name: &str) -> NodeHandle {
        self.insert(Node::new(name, NodeKind::Transform))
    }

    fn merge_meshes(&mut self, name: &str, parts: &[NodeHandle]) -> Option<NodeHandle> {
        let mut sources = Vec::with_capacity(parts.len());
        for &part in parts {
            match &self.nodes.get(part)?.kind {
                NodeKind::Mesh(mesh) => sources.push((mesh, self.world_transform(part)?)),
                _ => return None,
            }
        }
        let merged = MeshData::merge(sources.into_iter())?;
        for &part in parts {
            self.dispose(part);
        }
        Some(self.add_mesh(name, merged))
    }

    fn create_instance(&mut self, source: NodeHandle, name: &str) -> Option<NodeHandle> {
        let template = self.nodes.get(source)?;
        if !matches!(template.kind, NodeKind::Mesh(_)) {
            return None;
        }
        let mut node = Node::new(name, NodeKind::Instance { source });
        node.local = template.local;
        let instance = self.insert(node);
        link(&mut self.instances, source, instance);
        Some(instance)
    }

    fn local_transform(&self, node: NodeHandle) -> Option<Instance> {
        self.nodes.get(node).map(|n| n.local)
    }

    fn set_local_transform(&mut self, node: NodeHandle, transform: Instance) -> bool {
        self.nodes
            .get_mut(node)
            .map(|n| n.local = transform)
            .is_some()
    }

    fn world_transform(&self, node: NodeHandle) -> Option<Instance> {
        let mut current = self.nodes.get(node)?;
        let mut world = current.local;
        while let Some(parent) = current.parent.and_then(|p| self.nodes.get(p)) {
            world = &parent.local * &world;
            current = parent;
        }
        Some(world)
    }

    fn set_parent(&mut self, node: NodeHandle, parent: Option<NodeHandle>) -> bool {
        if !self.nodes.contains_key(node) {
            return false;
        }
        if let Some(parent) = parent {
            if !self.nodes.contains_key(parent) || self.is_ancestor(node, parent) {
                return false;
            }
        }
        let Some(entry) = self.nodes.get_mut(node) else {
            return false;
        };
        if let Some(previous) = std::mem::replace(&mut entry.parent, parent) {
            unlink(&mut self.children, previous, node);
        }
        if let Some(parent) = parent {
            link(&mut self.children, parent, node);
        }
        true
    }

    fn set_visible(&mut self, node: NodeHandle, visible: bool) -> bool {
        self.nodes
            .get_mut(node)
            .map(|n| n.visible = visible)
            .is_some()
    }

    fn is_visible(&self, node: NodeHandle) -> bool {
        self.nodes.get(node).is_some_and(|n| n.visible)
    }

    fn is_disposed(&self, node: NodeHandle) -> bool {
        !self.nodes.contains_key(node)
    }

    fn dispose(&mut self, node: NodeHandle) -> bool {
        if !self.nodes.contains_key(node) {
            log::trace!("dispose on released node {:?} ignored", node);
            return false;
        }
        let mut pending = vec![node];
        while let Some(handle) = pending.pop() {
            let Some(removed) = self.nodes.remove(handle) else {
                continue;
            };
            if let Some(parent) = removed.parent {
                unlink(&mut self.children, parent, handle);
            }
            if let NodeKind::Instance { source } = removed.kind {
                unlink(&mut self.instances, source, handle);
            }
            pending.extend(self.children.remove(handle).into_iter().flatten());
            pending.extend(self.instances.remove(handle).into_iter().flatten());
        }
        true
    }

    fn live_nodes(&self) -> usize {
        self.nodes.len()
    }

    fn render(&mut self) -> Frame {
        self.frames += 1;
        let mut batches: Vec<Batch> = Vec::new();
        let mut slots: HashMap<NodeHandle, usize> = HashMap::new();
        for (handle, node) in self.nodes.iter() {
            if !node.visible {
                continue;
            }
            let source = match node.kind {
                NodeKind::Mesh(_) => handle,
                NodeKind::Instance { source } => source,
                NodeKind::Transform => continue,
            };
            let (Some(mesh), Some(world)) = (self.mesh(source), self.world_transform(handle)) else {
                continue;
            };
            let slot = *slots.entry(source).or_insert_with(|| {
                batches.push(Batch {
                    mesh: source,
                    name: self.nodes[source].name.clone(),
                    index_count: mesh.indices.len(),
                    instances: Vec::new(),
                });
                batches.len() - 1
            });
            batches[slot].instances.push(world.to_raw());
        }
        Frame {
            number: self.frames,
            batches,
        }
    }
}
