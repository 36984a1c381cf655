//! Lifecycle arena for spawned scene nodes.
//!
//! Every component that stamps nodes into a scene records them here instead of
//! keeping its own ad hoc lists. The arena remembers insertion order and keeps
//! at most one live template per [`TemplateKind`]. [`LifecycleArena::release_all`]
//! disposes tracked nodes first and templates last, so no instance outlives
//! the mesh it draws from.

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::data_structures::scene_graph::{NodeHandle, SceneBackend};

/// What a tracked handle represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    GridCell,
    RoomRoot,
    Seat,
    Table,
    Chair,
}

/// Shape categories that can own a hidden instancing template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TemplateKind {
    GridMarker,
    Table,
    Chair,
}

/// Outcome of [`LifecycleArena::release_all`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReleaseReport {
    /// Nodes this call actually disposed.
    pub released: usize,
    /// Nodes that were already gone, e.g. removed along with a parent.
    pub already_disposed: usize,
    pub templates: usize,
}

impl ReleaseReport {
    pub fn total(&self) -> usize {
        self.released + self.already_disposed
    }
}

#[derive(Debug, Default)]
pub struct LifecycleArena {
    label: &'static str,
    tracked: Vec<(Category, NodeHandle)>,
    templates: BTreeMap<TemplateKind, NodeHandle>,
}

impl LifecycleArena {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            ..Default::default()
        }
    }

    pub fn track(&mut self, category: Category, handle: NodeHandle) -> NodeHandle {
        self.tracked.push((category, handle));
        handle
    }

    /**
     * Make `handle` the template for `kind`.
     *
     * A live template already installed for `kind` is disposed first; replacing
     * it without releasing would leak its geometry.
     */
    pub fn install_template<S: SceneBackend>(
        &mut self,
        scene: &mut S,
        kind: TemplateKind,
        handle: NodeHandle,
    ) -> NodeHandle {
        if let Some(previous) = self.templates.insert(kind, handle) {
            if previous != handle && scene.dispose(previous) {
                warn!(
                    "{}: replaced live {:?} template, instances drawn from it were released",
                    self.label, kind
                );
            }
        }
        handle
    }

    /// The live template for `kind`, if one is installed.
    pub fn template<S: SceneBackend>(&self, scene: &S, kind: TemplateKind) -> Option<NodeHandle> {
        self.templates
            .get(&kind)
            .copied()
            .filter(|&handle| !scene.is_disposed(handle))
    }

    pub fn templates(&self) -> usize {
        self.templates.len()
    }

    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty() && self.templates.is_empty()
    }

    pub fn count(&self, category: Category) -> usize {
        self.tracked.iter().filter(|(c, _)| *c == category).count()
    }

    /// Tracked handles of `category` in insertion order.
    pub fn handles(&self, category: Category) -> impl Iterator<Item = NodeHandle> + '_ {
        self.tracked
            .iter()
            .filter(move |(c, _)| *c == category)
            .map(|(_, handle)| *handle)
    }

    /// Tracked nodes and templates that are still alive in `scene`.
    pub fn live_count<S: SceneBackend>(&self, scene: &S) -> usize {
        self.tracked
            .iter()
            .map(|(_, handle)| handle)
            .chain(self.templates.values())
            .filter(|&&handle| !scene.is_disposed(handle))
            .count()
    }

    /// Dispose everything this arena owns and return to the initial state.
    pub fn release_all<S: SceneBackend>(&mut self, scene: &mut S) -> ReleaseReport {
        let mut report = ReleaseReport::default();
        if self.is_empty() {
            return report;
        }
        for (_, handle) in self.tracked.drain(..) {
            if scene.dispose(handle) {
                report.released += 1;
            } else {
                report.already_disposed += 1;
            }
        }
        for (_, handle) in std::mem::take(&mut self.templates) {
            report.templates += 1;
            if scene.dispose(handle) {
                report.released += 1;
            } else {
                report.already_disposed += 1;
            }
        }
        debug!(
            "{}: released {} nodes ({} already gone, {} templates)",
            self.label, report.released, report.already_disposed, report.templates
        );
        report
    }
}
