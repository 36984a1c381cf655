//! Grid markers, tables and seat nodes for circular seating rooms.
//!
//! `CircularSeating` turns the placement math of [`crate::layout`] into scene
//! nodes. Grid markers and tables are instances of hidden templates that are
//! created once and reused; seats are transform nodes the chair builder reads
//! its placement from. Everything goes through one [`LifecycleArena`].

use cgmath::Vector3;
use log::{debug, info};

use crate::{
    data_structures::{
        instance::Instance,
        mesh::MeshData,
        scene_graph::{NodeHandle, SceneBackend},
    },
    error::{LayoutError, Result},
    layout::{GridCell, Room, SeatSlot, TablePosition, compute_grid_in},
    registry::{Category, LifecycleArena, ReleaseReport, TemplateKind},
};

pub const TABLE_TEMPLATE_HEIGHT: f32 = 0.05;
pub const TABLE_TEMPLATE_DIAMETER: f32 = 0.8;
const TABLE_TESSELLATION: u32 = 24;

/// A spawned grid marker and the cell it covers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedCell {
    pub cell: GridCell,
    pub marker: NodeHandle,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedTable {
    pub table: TablePosition,
    pub node: NodeHandle,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedSeat {
    pub slot: SeatSlot,
    pub node: NodeHandle,
}

#[derive(Debug)]
pub struct CircularSeating {
    area: (f32, f32),
    marker_height: f32,
    arena: LifecycleArena,
}

impl Default for CircularSeating {
    fn default() -> Self {
        Self::new(crate::layout::GRID_AREA, 0.1)
    }
}

impl CircularSeating {
    pub fn new(area: (f32, f32), marker_height: f32) -> Self {
        Self {
            area,
            marker_height,
            arena: LifecycleArena::new("CircularSeating"),
        }
    }

    pub fn count(&self, category: Category) -> usize {
        self.arena.count(category)
    }

    pub fn live_count<S: SceneBackend>(&self, scene: &S) -> usize {
        self.arena.live_count(scene)
    }

    pub fn template<S: SceneBackend>(&self, scene: &S, kind: TemplateKind) -> Option<NodeHandle> {
        self.arena.template(scene, kind)
    }

    /// Hidden template for `kind`, created on first use.
    fn template_or_create<S: SceneBackend>(
        &mut self,
        scene: &mut S,
        kind: TemplateKind,
    ) -> NodeHandle {
        if let Some(template) = self.arena.template(scene, kind) {
            return template;
        }
        let template = match kind {
            TemplateKind::Table => scene.add_mesh(
                "table",
                MeshData::cylinder(TABLE_TEMPLATE_HEIGHT, TABLE_TEMPLATE_DIAMETER, TABLE_TESSELLATION),
            ),
            _ => scene.add_mesh("box_template", MeshData::cuboid(1.0, 1.0, 1.0)),
        };
        scene.set_visible(template, false);
        self.arena.install_template(scene, kind, template)
    }

    fn room_root<S: SceneBackend>(&mut self, scene: &mut S, center: Vector3<f32>) -> NodeHandle {
        let root = scene.add_transform_node("room_transform");
        scene.set_local_transform(root, Instance::from(center));
        self.arena.track(Category::RoomRoot, root)
    }

    /// Releases the previous generation, then stamps one marker per grid cell.
    pub fn grid_creator<S: SceneBackend>(
        &mut self,
        scene: &mut S,
        x_count: u32,
        z_count: u32,
    ) -> Result<Vec<PlacedCell>> {
        let cells = compute_grid_in(self.area, x_count, z_count)?;
        self.cleanup(scene);
        info!("Creating grid: {}x{}", x_count, z_count);

        let template = self.template_or_create(scene, TemplateKind::GridMarker);
        let mut placed = Vec::with_capacity(cells.len());
        for cell in cells {
            let name = format!("box_{}_{}", cell.index.0, cell.index.1);
            let Some(marker) = scene.create_instance(template, &name) else {
                return Err(LayoutError::BuildFailure(name));
            };
            let transform = Instance::from(cell.center).with_scale(Vector3::new(
                cell.size.0,
                self.marker_height,
                cell.size.1,
            ));
            scene.set_local_transform(marker, transform);
            self.arena.track(Category::GridCell, marker);
            placed.push(PlacedCell { cell, marker });
        }
        Ok(placed)
    }

    /// Table instances for `room`, parented to a new room root.
    pub fn table_positions<S: SceneBackend>(
        &mut self,
        scene: &mut S,
        room: &Room,
    ) -> Result<Vec<PlacedTable>> {
        let tables = room.table_positions()?;
        let template = self.template_or_create(scene, TemplateKind::Table);
        let root = self.room_root(scene, room.center);

        let mut placed = Vec::with_capacity(tables.len());
        for table in tables {
            let name = format!("table_{}", table.index);
            let Some(node) = scene.create_instance(template, &name) else {
                return Err(LayoutError::BuildFailure(name));
            };
            let scale = table.footprint_diameter / TABLE_TEMPLATE_DIAMETER;
            let transform =
                Instance::from(table.local_position).with_scale(Vector3::new(scale, 1.0, scale));
            scene.set_local_transform(node, transform);
            scene.set_parent(node, Some(root));
            self.arena.track(Category::Table, node);
            placed.push(PlacedTable { table, node });
        }
        Ok(placed)
    }

    /// Seat transform nodes for `room`, parented to a new room root.
    pub fn seat_locations<S: SceneBackend>(
        &mut self,
        scene: &mut S,
        room: &Room,
    ) -> Result<Vec<PlacedSeat>> {
        let slots = room.seat_slots()?;
        let root = self.room_root(scene, room.center);

        let placed = slots
            .into_iter()
            .map(|slot| {
                let node =
                    scene.add_transform_node(&format!("seat_{}_{}", slot.table_index, slot.seat_index));
                let local = Instance::from(slot.local_position).with_rotation(slot.rotation);
                scene.set_local_transform(node, local);
                scene.set_parent(node, Some(root));
                self.arena.track(Category::Seat, node);
                PlacedSeat { slot, node }
            })
            .collect();
        Ok(placed)
    }

    pub fn cleanup<S: SceneBackend>(&mut self, scene: &mut S) -> ReleaseReport {
        debug!("CircularSeating: starting cleanup");
        self.arena.release_all(scene)
    }
}
