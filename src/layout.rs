//! Placement math for grids of circular seating rooms.
//!
//! Everything here is pure: given counts, radii and an origin, the functions
//! return positions and orientations and never touch a scene.
//!
//! Angles are in radians, 0 on the local +X axis and growing from +X toward
//! +Z in the X-Z plane. Ring math leaves Y alone; callers lift rooms by a
//! fixed offset.

use std::f32::consts::{FRAC_PI_2, TAU};

use cgmath::{InnerSpace, Quaternion, Rad, Vector3};

use crate::{
    data_structures::instance::Instance,
    error::{LayoutError, Result},
};

/// Default extent of the tiled floor.
pub const GRID_AREA: (f32, f32) = (60.0, 60.0);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridCell {
    pub index: (u32, u32),
    pub center: Vector3<f32>,
    /// Cell width along x and depth along z.
    pub size: (f32, f32),
}

impl GridCell {
    pub fn area(&self) -> f32 {
        self.size.0 * self.size.1
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeatSlot {
    pub table_index: u32,
    pub seat_index: u32,
    pub position: Vector3<f32>,
    /// Position relative to the room origin.
    pub local_position: Vector3<f32>,
    pub table_center: Vector3<f32>,
    /// Looks toward the table, then tilted +90° about local X.
    pub rotation: Quaternion<f32>,
    /// Normalized horizontal direction from the seat to its table.
    pub facing: Vector3<f32>,
}

impl SeatSlot {
    /// Look direction recovered from `rotation`; the tilt moves it onto local +Y.
    pub fn forward(&self) -> Vector3<f32> {
        Instance::new()
            .with_rotation(self.rotation)
            .rotate_vector(Vector3::unit_y())
    }

    pub fn transform(&self) -> Instance {
        Instance::new()
            .with_position(self.position)
            .with_rotation(self.rotation)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TablePosition {
    pub index: u32,
    pub position: Vector3<f32>,
    pub local_position: Vector3<f32>,
    pub footprint_diameter: f32,
}

/// One seating cluster: tables on a ring, seats on a smaller ring around each table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Room {
    pub center: Vector3<f32>,
    pub table_ring_radius: f32,
    pub seat_ring_radius: f32,
    pub table_count: u32,
    pub seats_per_table: u32,
}

impl Room {
    pub fn seat_slots(&self) -> Result<Vec<SeatSlot>> {
        compute_seat_slots(
            self.table_count,
            self.table_ring_radius,
            self.seat_ring_radius,
            self.seats_per_table,
            self.center,
        )
    }

    pub fn table_positions(&self) -> Result<Vec<TablePosition>> {
        compute_table_positions(
            self.table_count,
            self.table_ring_radius,
            self.seat_ring_radius,
            self.center,
        )
    }

    pub fn seat_count(&self) -> usize {
        (self.table_count as usize).saturating_mul(self.seats_per_table as usize)
    }
}

/// Tiles the default 60×60 area into `x_count × z_count` cells.
pub fn compute_grid(x_count: u32, z_count: u32) -> Result<Vec<GridCell>> {
    compute_grid_in(GRID_AREA, x_count, z_count)
}

/// Tiles `area` centred on the origin; cells are ordered x-major.
pub fn compute_grid_in(area: (f32, f32), x_count: u32, z_count: u32) -> Result<Vec<GridCell>> {
    if x_count == 0 || z_count == 0 {
        return Err(LayoutError::InvalidArgument(format!(
            "grid dimensions must be positive, got {}x{}",
            x_count, z_count
        )));
    }
    let (x_size, z_size) = area;
    if !(x_size.is_finite() && z_size.is_finite() && x_size > 0.0 && z_size > 0.0) {
        return Err(LayoutError::InvalidArgument(format!(
            "grid area must be positive, got {}x{}",
            x_size, z_size
        )));
    }
    let cell_w = x_size / x_count as f32;
    let cell_d = z_size / z_count as f32;
    let corner = Vector3::new(-x_size / 2.0, 0.0, -z_size / 2.0);

    let mut cells = reserve("grid cell", x_count as u64 * z_count as u64)?;
    cells.extend(
        (0..x_count)
            .flat_map(|x| (0..z_count).map(move |z| (x, z)))
            .map(|(x, z)| GridCell {
                index: (x, z),
                center: Vector3::new(
                    corner.x + (x as f32 + 0.5) * cell_w,
                    0.0,
                    corner.z + (z as f32 + 0.5) * cell_d,
                ),
                size: (cell_w, cell_d),
            }),
    );
    Ok(cells)
}

/// Room for `len` placements, or an error when they cannot be held in memory.
fn reserve<T>(what: &str, len: u64) -> Result<Vec<T>> {
    let mut out = Vec::new();
    usize::try_from(len)
        .ok()
        .and_then(|n| out.try_reserve_exact(n).ok())
        .ok_or_else(|| {
            LayoutError::InvalidArgument(format!("{} {} placements do not fit in memory", len, what))
        })?;
    Ok(out)
}

fn ring_point(radius: f32, index: u32, count: u32) -> Vector3<f32> {
    let angle = index as f32 / count as f32 * TAU;
    Vector3::new(radius * angle.cos(), 0.0, radius * angle.sin())
}

fn check_ring(what: &str, count: u32, radius: f32) -> Result<()> {
    if count == 0 {
        return Err(LayoutError::InvalidArgument(format!(
            "{} count must be positive",
            what
        )));
    }
    if !radius.is_finite() || radius < 0.0 {
        return Err(LayoutError::InvalidArgument(format!(
            "{} ring radius must be finite and non-negative, got {}",
            what, radius
        )));
    }
    Ok(())
}

/**
 * Seat positions and orientations for one room.
 *
 * Slots are ordered table by table; within a table by seat index. Each seat
 * looks at its table centre and is then tilted +90° about its local X axis so
 * the chair model's up axis lines up with the seat.
 */
pub fn compute_seat_slots(
    table_count: u32,
    table_ring_radius: f32,
    seat_ring_radius: f32,
    seats_per_table: u32,
    room_origin: Vector3<f32>,
) -> Result<Vec<SeatSlot>> {
    check_ring("table", table_count, table_ring_radius)?;
    check_ring("seat", seats_per_table, seat_ring_radius)?;

    let mut slots = reserve("seat", table_count as u64 * seats_per_table as u64)?;
    for i in 0..table_count {
        let table = ring_point(table_ring_radius, i, table_count);
        for j in 0..seats_per_table {
            let local_position = table + ring_point(seat_ring_radius, j, seats_per_table);

            let mut node = Instance::from(local_position);
            let to_table = table - local_position;
            let facing = if to_table.magnitude2() > f32::EPSILON {
                to_table.normalize()
            } else {
                Vector3::unit_z()
            };
            node.look_at(local_position + facing);
            node.rotate_local(Vector3::unit_x(), Rad(FRAC_PI_2));

            slots.push(SeatSlot {
                table_index: i,
                seat_index: j,
                position: room_origin + local_position,
                local_position,
                table_center: room_origin + table,
                rotation: node.rotation,
                facing,
            });
        }
    }
    Ok(slots)
}

/// Table positions for one room; each footprint spans the seat ring.
pub fn compute_table_positions(
    table_count: u32,
    table_ring_radius: f32,
    seat_ring_radius: f32,
    room_origin: Vector3<f32>,
) -> Result<Vec<TablePosition>> {
    check_ring("table", table_count, table_ring_radius)?;
    if !seat_ring_radius.is_finite() || seat_ring_radius < 0.0 {
        return Err(LayoutError::InvalidArgument(format!(
            "seat ring radius must be finite and non-negative, got {}",
            seat_ring_radius
        )));
    }
    let mut tables = reserve("table", table_count as u64)?;
    tables.extend((0..table_count).map(|i| {
        let local_position = ring_point(table_ring_radius, i, table_count);
        TablePosition {
            index: i,
            position: room_origin + local_position,
            local_position,
            footprint_diameter: 2.0 * seat_ring_radius,
        }
    }));
    Ok(tables)
}
