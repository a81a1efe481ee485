//! The running game: one level, one body, one set of tuning parameters.
//!
//! A [`Session`] is the only owner of simulation state. The physics step
//! borrows the body mutably and the grid immutably through it, and the
//! renderer reads both through the shared accessors, so there is no global
//! state anywhere in the engine.
//!
//! ```
//! use pixelhop_engine::prelude::*;
//!
//! // One solid row under the spawn point.
//! let mut px = vec![0u8; 12 * 3 * 4];
//! for column in 0..12 {
//!     let i = (2 * 12 + column) * 4;
//!     px[i..i + 4].copy_from_slice(&[0, 200, 0, 255]);
//! }
//! let grid = TileGrid::from_rgba(12, 3, &px, TileSize::default()).unwrap();
//!
//! let mut session = Session::spawn_default(grid);
//! session.step(&InputFrame::idle(), 1.0 / 60.0);
//! assert!(session.body().flags.below);
//! assert_eq!(session.tick_count(), 1);
//! ```

use pixelhop_level::grid::TileGrid;

use crate::body::{Body, Vec2};
use crate::config::PhysicsConfig;
use crate::input::ActionQuery;
use crate::physics::{self, StepReport};

/// Where the body starts in the demo level, px.
pub const DEFAULT_SPAWN: Vec2 = Vec2::new(150.0, 0.0);

/// Simulation state for one level.
#[derive(Debug, Clone)]
pub struct Session {
    grid: TileGrid,
    /// Cached [`TileGrid::digest`]; the grid never changes.
    grid_digest: String,
    body: Body,
    config: PhysicsConfig,
    tick: u64,
    last_report: StepReport,
}

impl Session {
    /// Start a session with the body at rest at `spawn`.
    pub fn new(grid: TileGrid, config: PhysicsConfig, spawn: Vec2) -> Self {
        if !config.fits_tile(grid.tile_size()) {
            let (x, y) = config.max_step_travel();
            tracing::warn!(
                max_step_x = x,
                max_step_y = y,
                tile_width = grid.tile_size().width,
                tile_height = grid.tile_size().height,
                "one physics step can travel further than a tile; fast bodies may tunnel"
            );
        }
        let grid_digest = grid.digest();
        let body = Body::new(spawn, config.hitbox);
        tracing::debug!(x = spawn.x, y = spawn.y, grid = %grid_digest, "session started");
        Self {
            grid,
            grid_digest,
            body,
            config,
            tick: 0,
            last_report: StepReport::default(),
        }
    }

    /// Default tuning, body at [`DEFAULT_SPAWN`].
    pub fn spawn_default(grid: TileGrid) -> Self {
        Self::new(grid, PhysicsConfig::default(), DEFAULT_SPAWN)
    }

    /// Run one physics step and advance the tick counter.
    pub fn step(&mut self, input: &impl ActionQuery, dt: f64) -> StepReport {
        let report = physics::step(&mut self.body, &self.grid, input, &self.config, dt);
        self.tick += 1;
        self.last_report = report;
        report
    }

    /// Put the body back at `spawn`, at rest. The tick counter keeps
    /// running.
    pub fn respawn(&mut self, spawn: Vec2) {
        self.body = Body::new(spawn, self.config.hitbox);
        self.last_report = StepReport::default();
    }

    // -- accessors ----------------------------------------------------------

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// BLAKE3 digest of the level layout.
    pub fn grid_digest(&self) -> &str {
        &self.grid_digest
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Steps run since the session started.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Elapsed simulation time, assuming every step used `timestep`.
    pub fn sim_time(&self, timestep: f64) -> f64 {
        self.tick as f64 * timestep
    }

    pub fn last_report(&self) -> &StepReport {
        &self.last_report
    }

    pub(crate) fn restore_state(&mut self, body: Body, tick: u64, config: PhysicsConfig) {
        self.body = body;
        self.tick = tick;
        self.config = config;
        self.last_report = StepReport::default();
    }
}
