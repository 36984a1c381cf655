use cgmath::{InnerSpace, Vector3};
use seating_ngin::{
    SceneBackend,
    components::seating::{CircularSeating, TABLE_TEMPLATE_DIAMETER},
    layout::Room,
    registry::{Category, TemplateKind},
};

use crate::common::test_utils::{assert_close, assert_vec_close, scene};

mod common;

fn room(center: Vector3<f32>) -> Room {
    Room {
        center,
        table_ring_radius: 4.0,
        seat_ring_radius: 2.0,
        table_count: 2,
        seats_per_table: 5,
    }
}

#[test]
fn grid_markers_are_instances_of_one_hidden_box() {
    let mut scene = scene();
    let mut seating = CircularSeating::default();
    let cells = seating.grid_creator(&mut scene, 3, 2).unwrap();
    assert_eq!(cells.len(), 6);

    let template = seating.template(&scene, TemplateKind::GridMarker).unwrap();
    assert!(!scene.is_visible(template));
    for placed in &cells {
        assert_eq!(scene.source_of(placed.marker), Some(template));
        let (x, z) = placed.cell.index;
        assert_eq!(scene.name(placed.marker), Some(format!("box_{}_{}", x, z).as_str()));
        let local = scene.local_transform(placed.marker).unwrap();
        assert_vec_close(local.position, placed.cell.center);
        assert_vec_close(local.scale, Vector3::new(20.0, 0.1, 30.0));
    }
    assert_eq!(seating.count(Category::GridCell), 6);
}

#[test]
fn grid_creator_replaces_the_previous_grid() {
    let mut scene = scene();
    let mut seating = CircularSeating::default();
    seating.grid_creator(&mut scene, 4, 4).unwrap();
    seating.table_positions(&mut scene, &room(Vector3::new(0.0, 0.5, 0.0))).unwrap();

    seating.grid_creator(&mut scene, 2, 2).unwrap();
    assert_eq!(seating.count(Category::GridCell), 4);
    assert_eq!(seating.count(Category::Table), 0);
    // marker template plus four markers
    assert_eq!(scene.live_nodes(), 5);
    assert_eq!(seating.live_count(&scene), 5);
}

#[test]
fn invalid_grid_keeps_the_current_one() {
    let mut scene = scene();
    let mut seating = CircularSeating::default();
    seating.grid_creator(&mut scene, 2, 2).unwrap();
    assert!(seating.grid_creator(&mut scene, 0, 2).is_err());
    assert_eq!(seating.count(Category::GridCell), 4);
}

#[test]
fn tables_share_a_template_across_rooms() {
    let mut scene = scene();
    let mut seating = CircularSeating::default();
    let first = seating
        .table_positions(&mut scene, &room(Vector3::new(-20.0, 0.5, 0.0)))
        .unwrap();
    let second = seating
        .table_positions(&mut scene, &room(Vector3::new(20.0, 0.5, 0.0)))
        .unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 2);

    let template = seating.template(&scene, TemplateKind::Table).unwrap();
    assert_eq!(scene.instances_of(template).len(), 4);
    assert_eq!(seating.count(Category::RoomRoot), 2);

    for placed in first.iter().chain(second.iter()) {
        let world = scene.world_transform(placed.node).unwrap();
        assert_vec_close(world.position, placed.table.position);
        let footprint = world.scale.x * TABLE_TEMPLATE_DIAMETER;
        assert_close(footprint, 4.0);
    }
}

#[test]
fn seat_nodes_sit_on_their_slots() {
    let mut scene = scene();
    let mut seating = CircularSeating::default();
    let center = Vector3::new(20.0, 0.5, -20.0);
    let seats = seating.seat_locations(&mut scene, &room(center)).unwrap();
    assert_eq!(seats.len(), 10);
    assert_eq!(seating.count(Category::Seat), 10);

    for seat in &seats {
        let world = scene.world_transform(seat.node).unwrap();
        assert_vec_close(world.position, seat.slot.position);
        let to_table = (seat.slot.table_center - seat.slot.position).normalize();
        assert!(world.rotate_vector(Vector3::unit_y()).dot(to_table) > 0.99);
        let parent = scene.parent_of(seat.node).unwrap();
        assert_eq!(scene.name(parent), Some("room_transform"));
    }
}

#[test]
fn cleanup_returns_to_the_initial_state() {
    let mut scene = scene();
    let mut seating = CircularSeating::default();
    seating.grid_creator(&mut scene, 2, 2).unwrap();
    let r = room(Vector3::new(0.0, 0.5, 0.0));
    seating.table_positions(&mut scene, &r).unwrap();
    seating.seat_locations(&mut scene, &r).unwrap();
    assert!(scene.live_nodes() > 0);

    let report = seating.cleanup(&mut scene);
    assert_eq!(report.templates, 2);
    assert_eq!(scene.live_nodes(), 0);
    assert_eq!(seating.live_count(&scene), 0);
    assert_eq!(seating.template(&scene, TemplateKind::Table), None);

    assert_eq!(seating.cleanup(&mut scene).total(), 0);
}
