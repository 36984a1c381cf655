//! Scene orchestration and the render loop.
//!
//! [`ProceduralScene`] owns the scene surface and its collaborators and is the
//! only place the scene is mutated. The one public mutation is
//! [`ProceduralScene::set_grid`], which tears everything down and rebuilds it.
//!
//! # Lifecycle
//!
//! 1. `new()` creates the scene surface from the configured environment
//! 2. `start_render_loop()` spawns the render task on the current tokio
//!    runtime; it lives until the orchestrator is dropped or
//!    `stop_render_loop()` is called
//! 3. `set_grid()` bumps the generation token, releases every tracked node,
//!    recreates the surface, then sets up one room per grid cell
//!
//! The render task only holds the shared state, never the scene itself, so a
//! surface swapped by `set_grid` is picked up on the next frame. It uses
//! `try_lock` and skips a frame rather than wait for a regeneration step.
//!
//! Overlapping `set_grid` calls cancel and supersede: every step re-checks the
//! generation token under the state lock and a stale run stops without
//! touching the newer scene.

use std::sync::{
    Arc,
    atomic::{AtomicU64, AtomicUsize, Ordering},
};

use anyhow::Context as _;
use cgmath::Matrix3;
use futures::future::join_all;
use instant::{Duration, Instant};
use log::{error, info, trace, warn};
use tokio::{runtime::Handle, sync::Mutex, task::JoinHandle, time::MissedTickBehavior};

use crate::{
    components::{chair::ChairBuilder, seating::CircularSeating},
    context::{Environment, SceneConfig},
    data_structures::scene_graph::SceneBackend,
    error::{LayoutError, Result},
    layout::{GridCell, Room},
    registry::Category,
    render::Frame,
};

/// Counts describing the current scene contents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SceneStats {
    pub generation: u64,
    pub grid: Option<(u32, u32)>,
    pub cells: usize,
    pub rooms: usize,
    pub tables: usize,
    pub seats: usize,
    pub chairs: usize,
    /// Nodes tracked by the collaborators that are still alive.
    pub tracked_live: usize,
    /// Every node in the scene, tracked or not.
    pub live_nodes: usize,
}

/// Result of a [`ProceduralScene::set_grid`] call that did not fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Regeneration {
    Completed(SceneStats),
    /// A newer `set_grid` call took over before this one finished.
    Superseded { generation: u64 },
}

impl Regeneration {
    pub fn is_completed(&self) -> bool {
        matches!(self, Regeneration::Completed(_))
    }
}

pub(crate) struct SceneState<S> {
    scene: S,
    seating: CircularSeating,
    chairs: ChairBuilder,
    grid: Option<(u32, u32)>,
    rooms: usize,
    generation: u64,
}

impl<S: SceneBackend> SceneState<S> {
    fn new(config: &SceneConfig) -> Self {
        Self {
            scene: S::create(&config.environment),
            seating: CircularSeating::new(config.area, config.marker_height),
            chairs: ChairBuilder::new(config.chair_policy),
            grid: None,
            rooms: 0,
            generation: 0,
        }
    }

    /// Release collaborators first; their handles belong to the old surface.
    fn teardown(&mut self, environment: &Environment) {
        info!("Starting scene cleanup...");
        let chairs = self.chairs.cleanup(&mut self.scene);
        let seating = self.seating.cleanup(&mut self.scene);
        self.scene = S::create(environment);
        self.grid = None;
        self.rooms = 0;
        info!(
            "Scene cleanup complete: {} nodes released",
            chairs.total() + seating.total()
        );
    }

    fn stats(&self) -> SceneStats {
        SceneStats {
            generation: self.generation,
            grid: self.grid,
            cells: self.seating.count(Category::GridCell),
            rooms: self.rooms,
            tables: self.seating.count(Category::Table),
            seats: self.seating.count(Category::Seat),
            chairs: self.chairs.chair_count(),
            tracked_live: self.seating.live_count(&self.scene) + self.chairs.live_count(&self.scene),
            live_nodes: self.scene.live_nodes(),
        }
    }
}

#[derive(Debug, Default)]
struct RenderCounters {
    rendered: AtomicU64,
    skipped: AtomicU64,
    last_instances: AtomicUsize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub frames_rendered: u64,
    pub frames_skipped: u64,
    pub last_instance_count: usize,
}

/// Handle to the continuously running render task. Dropping it stops the task.
#[derive(Debug)]
pub struct RenderLoop {
    handle: JoinHandle<()>,
    counters: Arc<RenderCounters>,
}

impl RenderLoop {
    fn spawn<S>(runtime: &Handle, state: Arc<Mutex<SceneState<S>>>, interval: Duration) -> Self
    where
        S: SceneBackend + Send + 'static,
    {
        let counters = Arc::new(RenderCounters::default());
        let shared = counters.clone();
        let handle = runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut last_time = Instant::now();
            loop {
                ticker.tick().await;
                match state.try_lock() {
                    Ok(mut guard) => {
                        let frame = guard.scene.render();
                        let dt = last_time.elapsed();
                        last_time = Instant::now();
                        shared.rendered.fetch_add(1, Ordering::Relaxed);
                        shared
                            .last_instances
                            .store(frame.instance_count(), Ordering::Relaxed);
                        trace!(
                            "frame {} with {} draw calls after {:?}",
                            frame.number,
                            frame.draw_calls(),
                            dt
                        );
                    }
                    Err(_) => {
                        shared.skipped.fetch_add(1, Ordering::Relaxed);
                        trace!("scene busy, frame skipped");
                    }
                }
            }
        });
        Self { handle, counters }
    }

    pub fn stats(&self) -> RenderStats {
        RenderStats {
            frames_rendered: self.counters.rendered.load(Ordering::Relaxed),
            frames_skipped: self.counters.skipped.load(Ordering::Relaxed),
            last_instance_count: self.counters.last_instances.load(Ordering::Relaxed),
        }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for RenderLoop {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub struct ProceduralScene<S: SceneBackend> {
    config: SceneConfig,
    state: Arc<Mutex<SceneState<S>>>,
    generation: Arc<AtomicU64>,
    render_loop: Option<RenderLoop>,
}

impl<S> ProceduralScene<S>
where
    S: SceneBackend + Send + 'static,
{
    pub fn new(config: SceneConfig) -> Self {
        let state = SceneState::new(&config);
        Self {
            config,
            state: Arc::new(Mutex::new(state)),
            generation: Arc::new(AtomicU64::new(0)),
            render_loop: None,
        }
    }

    /**
     * Set up logging, start rendering and build the initial grid.
     *
     * Must be called from within a tokio runtime.
     */
    pub async fn launch(config: SceneConfig) -> anyhow::Result<Self> {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        }
        let mut scene = Self::new(config);
        scene.start_render_loop()?;
        let (x_count, z_count) = scene.config.initial_grid;
        scene
            .set_grid(x_count, z_count)
            .await
            .with_context(|| format!("failed to build the initial {}x{} grid", x_count, z_count))?;
        Ok(scene)
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Spawn the render task on the current tokio runtime. Restarts it if it
    /// is already running; fails when called outside a runtime.
    pub fn start_render_loop(&mut self) -> anyhow::Result<()> {
        let runtime =
            Handle::try_current().context("the render loop needs a running tokio runtime")?;
        let interval = Duration::from_millis(self.config.frame_interval_millis);
        self.render_loop = Some(RenderLoop::spawn(&runtime, self.state.clone(), interval));
        Ok(())
    }

    pub fn stop_render_loop(&mut self) -> Option<RenderStats> {
        self.render_loop.take().map(|render_loop| render_loop.stats())
    }

    pub fn render_loop(&self) -> Option<&RenderLoop> {
        self.render_loop.as_ref()
    }

    pub fn render_stats(&self) -> Option<RenderStats> {
        self.render_loop.as_ref().map(RenderLoop::stats)
    }

    /// Render one frame outside the render loop.
    pub async fn render_frame(&self) -> Frame {
        self.state.lock().await.scene.render()
    }

    pub async fn with_scene<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        let state = self.state.lock().await;
        f(&state.scene)
    }

    pub async fn stats(&self) -> SceneStats {
        self.state.lock().await.stats()
    }

    pub async fn grid(&self) -> Option<(u32, u32)> {
        self.state.lock().await.grid
    }

    /// The newest generation token handed out.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn is_current(&self, state: &SceneState<S>, token: u64) -> bool {
        state.generation == token && self.generation.load(Ordering::SeqCst) == token
    }

    fn room_at(&self, cell: &GridCell) -> Room {
        Room {
            center: cell.center + cgmath::Vector3::new(0.0, self.config.room_height, 0.0),
            table_ring_radius: self.config.table_ring_radius,
            seat_ring_radius: self.config.seat_ring_radius,
            table_count: self.config.tables_per_room,
            seats_per_table: self.config.seats_per_table,
        }
    }

    /**
     * Replace the scene with an `x_count × z_count` grid of rooms.
     *
     * Invalid dimensions are rejected before anything is torn down. A build
     * failure leaves an empty scene behind and is returned to the caller.
     */
    pub async fn set_grid(&self, x_count: u32, z_count: u32) -> Result<Regeneration> {
        if x_count == 0 || z_count == 0 {
            return Err(LayoutError::InvalidArgument(format!(
                "grid dimensions must be positive, got {}x{}",
                x_count, z_count
            )));
        }
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let started = Instant::now();
        info!("Updating grid to {}x{} (generation {})", x_count, z_count, token);

        let cells = {
            let mut guard = self.state.lock().await;
            if self.generation.load(Ordering::SeqCst) != token {
                warn!("generation {} superseded before teardown", token);
                return Ok(Regeneration::Superseded { generation: token });
            }
            let state = &mut *guard;
            state.teardown(&self.config.environment);
            state.generation = token;
            match state.seating.grid_creator(&mut state.scene, x_count, z_count) {
                Ok(cells) => cells,
                Err(e) => {
                    error!("Error initializing scene: {}", e);
                    state.teardown(&self.config.environment);
                    return Err(e);
                }
            }
        };

        let rooms = cells
            .iter()
            .map(|placed| self.setup_room(token, self.room_at(&placed.cell)));
        let results = join_all(rooms).await;

        let mut guard = self.state.lock().await;
        let current = self.is_current(&guard, token);
        if let Some(e) = results.iter().find_map(|r| r.as_ref().err()) {
            error!("Error initializing scene: {}", e);
            if current {
                guard.teardown(&self.config.environment);
            }
            return Err(e.clone());
        }
        if !current || results.iter().any(|r| matches!(r, Ok(false))) {
            warn!(
                "{}x{} grid (generation {}) was superseded by a newer request",
                x_count, z_count, token
            );
            return Ok(Regeneration::Superseded { generation: token });
        }
        guard.grid = Some((x_count, z_count));
        let stats = guard.stats();
        info!(
            "Scene initialized with grid {}x{}: {} rooms, {} chairs in {:?}",
            x_count,
            z_count,
            stats.rooms,
            stats.chairs,
            started.elapsed()
        );
        Ok(Regeneration::Completed(stats))
    }

    /// Tables and seats in one step, then one chair per seat with a yield in between.
    ///
    /// Returns `Ok(false)` when a newer generation took over.
    async fn setup_room(&self, token: u64, room: Room) -> Result<bool> {
        let seats = {
            let mut guard = self.state.lock().await;
            if !self.is_current(&guard, token) {
                return Ok(false);
            }
            let state = &mut *guard;
            state.seating.table_positions(&mut state.scene, &room)?;
            state.seating.seat_locations(&mut state.scene, &room)?
        };

        for seat in seats {
            tokio::task::yield_now().await;
            let mut guard = self.state.lock().await;
            if !self.is_current(&guard, token) {
                return Ok(false);
            }
            let state = &mut *guard;
            let rotation = state
                .scene
                .world_transform(seat.node)
                .map(|world| world.rotation_matrix())
                .unwrap_or_else(|| Matrix3::from(seat.slot.rotation));
            state
                .chairs
                .build_chair(&mut state.scene, seat.slot.position, rotation)?;
        }

        let mut guard = self.state.lock().await;
        if !self.is_current(&guard, token) {
            return Ok(false);
        }
        guard.rooms += 1;
        Ok(true)
    }
}
