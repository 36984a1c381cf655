use std::time::{Duration, Instant};

use seating_ngin::{
    ChairPolicy, HeadlessScene, LayoutError, ProceduralScene, Regeneration, SceneBackend,
    SceneConfig, flow::SceneStats,
};

use crate::common::test_utils::MergeFailingScene;

mod common;

fn completed(regeneration: Regeneration) -> SceneStats {
    match regeneration {
        Regeneration::Completed(stats) => stats,
        other => panic!("expected a completed regeneration, got {:?}", other),
    }
}

async fn fresh_stats(x: u32, z: u32) -> SceneStats {
    let scene: ProceduralScene<HeadlessScene> = ProceduralScene::new(SceneConfig::default());
    completed(scene.set_grid(x, z).await.unwrap())
}

#[tokio::test]
async fn set_grid_builds_every_room() {
    let scene: ProceduralScene<HeadlessScene> = ProceduralScene::new(SceneConfig::default());
    let stats = completed(scene.set_grid(3, 3).await.unwrap());

    assert_eq!(stats.grid, Some((3, 3)));
    assert_eq!(stats.cells, 9);
    assert_eq!(stats.rooms, 9);
    assert_eq!(stats.tables, 18);
    assert_eq!(stats.seats, 90);
    assert_eq!(stats.chairs, 90);
    assert_eq!(stats.tracked_live, stats.live_nodes);
    assert_eq!(scene.grid().await, Some((3, 3)));

    // one draw call each for markers, tables and chairs
    let frame = scene.render_frame().await;
    assert_eq!(frame.draw_calls(), 3);
    assert_eq!(frame.instance_count(), 9 + 18 + 90);
}

#[tokio::test]
async fn regeneration_leaves_no_leftovers() {
    let scene: ProceduralScene<HeadlessScene> = ProceduralScene::new(SceneConfig::default());
    completed(scene.set_grid(2, 2).await.unwrap());
    let stats = completed(scene.set_grid(3, 3).await.unwrap());

    let fresh = fresh_stats(3, 3).await;
    assert_eq!(stats.live_nodes, fresh.live_nodes);
    assert_eq!(stats.tracked_live, fresh.tracked_live);
    assert_eq!(stats.chairs, fresh.chairs);
    assert_eq!(stats.generation, 2);
}

#[tokio::test]
async fn invalid_dimensions_keep_the_last_grid() {
    let scene: ProceduralScene<HeadlessScene> = ProceduralScene::new(SceneConfig::default());
    let before = completed(scene.set_grid(2, 3).await.unwrap());

    let result = scene.set_grid(0, 4).await;
    assert!(matches!(result, Err(LayoutError::InvalidArgument(_))));
    assert_eq!(scene.stats().await, before);
    assert_eq!(scene.generation(), 1);
}

#[tokio::test]
async fn direct_chairs_are_one_mesh_each() {
    let config = SceneConfig {
        chair_policy: ChairPolicy::Direct,
        ..Default::default()
    };
    let scene: ProceduralScene<HeadlessScene> = ProceduralScene::new(config);
    let stats = completed(scene.set_grid(1, 1).await.unwrap());
    assert_eq!(stats.chairs, 10);

    let (meshes, _, _) = scene.with_scene(|s| s.census()).await;
    // marker template, table template and ten chairs
    assert_eq!(meshes, 12);
}

#[tokio::test]
async fn build_failure_aborts_to_an_empty_scene() {
    let scene: ProceduralScene<MergeFailingScene> = ProceduralScene::new(SceneConfig::default());
    let result = scene.set_grid(2, 2).await;
    assert!(matches!(result, Err(LayoutError::BuildFailure(_))));

    let stats = scene.stats().await;
    assert_eq!(stats.grid, None);
    assert_eq!(stats.live_nodes, 0);
    assert_eq!(stats.chairs, 0);
    assert_eq!(scene.with_scene(|s| s.live_nodes()).await, 0);
}

#[tokio::test]
async fn overlapping_requests_keep_only_the_latest_grid() {
    let scene: ProceduralScene<HeadlessScene> = ProceduralScene::new(SceneConfig::default());
    let (first, second) = tokio::join!(scene.set_grid(4, 4), scene.set_grid(3, 3));
    let outcomes = [first.unwrap(), second.unwrap()];

    let finished: Vec<SceneStats> = outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            Regeneration::Completed(stats) => Some(*stats),
            Regeneration::Superseded { .. } => None,
        })
        .collect();
    assert_eq!(finished.len(), 1, "{:?}", outcomes);
    let stats = finished[0];
    assert_eq!(stats.generation, 2);

    let (x, z) = stats.grid.unwrap();
    let fresh = fresh_stats(x, z).await;
    assert_eq!(stats.live_nodes, fresh.live_nodes);
    assert_eq!(stats.rooms, (x * z) as usize);
    assert_eq!(scene.stats().await, stats);
}

#[tokio::test]
async fn render_loop_keeps_drawing_between_regenerations() {
    let config = SceneConfig {
        frame_interval_millis: 1,
        ..Default::default()
    };
    let mut scene: ProceduralScene<HeadlessScene> = ProceduralScene::new(config);
    scene.start_render_loop().unwrap();
    completed(scene.set_grid(1, 1).await.unwrap());

    tokio::time::sleep(Duration::from_millis(50)).await;
    let stats = scene.render_stats().unwrap();
    assert!(stats.frames_rendered > 0);
    assert!(scene.render_loop().is_some_and(|render_loop| render_loop.is_running()));
    assert_eq!(stats.last_instance_count, 1 + 2 + 10);

    completed(scene.set_grid(2, 1).await.unwrap());
    tokio::time::sleep(Duration::from_millis(50)).await;
    let later = scene.render_stats().unwrap();
    assert!(later.frames_rendered > stats.frames_rendered);
    assert_eq!(later.last_instance_count, 2 + 4 + 20);

    let stopped = scene.stop_render_loop().unwrap();
    assert!(stopped.frames_rendered >= later.frames_rendered);
    assert!(scene.render_stats().is_none());
}

#[tokio::test]
async fn launch_builds_the_initial_grid() {
    let config = SceneConfig {
        initial_grid: (2, 2),
        ..Default::default()
    };
    let scene: ProceduralScene<HeadlessScene> = ProceduralScene::launch(config).await.unwrap();
    assert_eq!(scene.config().initial_grid, (2, 2));
    assert_eq!(scene.grid().await, Some((2, 2)));
    assert!(scene.render_stats().is_some());

    let environment = scene.with_scene(|s| s.environment().clone()).await;
    assert_eq!(environment.lights.len(), 2);
}

#[tokio::test]
async fn teardown_time_grows_with_the_scene_not_its_square() {
    let scene: ProceduralScene<HeadlessScene> = ProceduralScene::new(SceneConfig::default());
    let large = completed(scene.set_grid(40, 40).await.unwrap());
    assert!(large.live_nodes > 40_000);

    let started = Instant::now();
    let small = completed(scene.set_grid(1, 1).await.unwrap());
    let elapsed = started.elapsed();
    assert_eq!(small.live_nodes, fresh_stats(1, 1).await.live_nodes);
    assert!(
        elapsed < Duration::from_secs(2),
        "teardown of {} nodes took {:?}",
        large.live_nodes,
        elapsed
    );
}

#[test]
fn render_loop_needs_a_runtime() {
    let mut scene: ProceduralScene<HeadlessScene> = ProceduralScene::new(SceneConfig::default());
    let result = scene.start_render_loop();
    assert!(result.is_err());
    assert!(scene.render_stats().is_none());
}
