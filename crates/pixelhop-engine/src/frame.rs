//! Turns measured wall-clock time into physics updates.
//!
//! In [`TimestepMode::Fixed`] the [`FrameDriver`] keeps an accumulator of
//! unsimulated time and runs as many updates of exactly `timestep` seconds as
//! fit, carrying the remainder to the next frame. The remainder, as a
//! fraction of one timestep, is the interpolation factor the renderer uses
//! to blend between the last two simulated states. Simulation results depend
//! only on the number of updates, never on the frame rate.
//!
//! If a frame would need more than `max_updates_per_frame` updates (the tab
//! was in the background, a debugger was paused) the driver runs the
//! maximum and throws the rest of the backlog away instead of trying to
//! catch up.
//!
//! # Example
//!
//! ```
//! use pixelhop_engine::config::FrameConfig;
//! use pixelhop_engine::frame::FrameDriver;
//!
//! let mut driver = FrameDriver::new(FrameConfig::default());
//! let mut steps = 0;
//! let report = driver.advance(0.05, |_dt| steps += 1);
//!
//! // 50 ms at 60 Hz is three full updates plus a remainder.
//! assert_eq!(report.updates, 3);
//! assert_eq!(steps, 3);
//! assert!(report.interpolation > 0.0 && report.interpolation < 1.0);
//! ```

use crate::config::{FrameConfig, TimestepMode};

/// Smoothing weight for a fresh FPS sample.
const FPS_ALPHA: f64 = 0.9;
/// Seconds between FPS samples.
const FPS_UPDATE_INTERVAL: f64 = 1.0;

// ---------------------------------------------------------------------------
// FrameReport
// ---------------------------------------------------------------------------

/// Outcome of one [`FrameDriver::advance`] call.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameReport {
    /// Updates run this frame.
    pub updates: u32,
    /// Blend factor between the previous and current state, in `[0, 1]`.
    pub interpolation: f64,
    /// Simulation time dropped because the update cap was hit, in seconds.
    /// Zero on normal frames.
    pub discarded_backlog: f64,
}

impl FrameReport {
    pub fn panicked(&self) -> bool {
        self.discarded_backlog > 0.0
    }
}

// ---------------------------------------------------------------------------
// FrameDriver
// ---------------------------------------------------------------------------

/// Fixed-timestep frame driver with FPS smoothing.
#[derive(Debug, Clone)]
pub struct FrameDriver {
    timestep: f64,
    max_updates: u32,
    mode: TimestepMode,
    max_dt: f64,
    accumulator: f64,
    frame_count: u64,
    update_count: u64,
    fps: f64,
    fps_window: f64,
    fps_window_frames: u32,
}

impl FrameDriver {
    /// Create a driver. The accumulator starts empty and the FPS estimate
    /// at 60.
    ///
    /// # Panics
    ///
    /// Panics if `config.timestep` is not positive and finite,
    /// `config.max_updates_per_frame` is zero or `config.max_dt` is not
    /// positive.
    pub fn new(config: FrameConfig) -> Self {
        assert!(
            config.timestep > 0.0 && config.timestep.is_finite(),
            "timestep must be positive and finite, got {}",
            config.timestep
        );
        assert!(
            config.max_updates_per_frame > 0,
            "max_updates_per_frame must be at least 1"
        );
        assert!(config.max_dt > 0.0, "max_dt must be positive, got {}", config.max_dt);
        Self {
            timestep: config.timestep,
            max_updates: config.max_updates_per_frame,
            mode: config.mode,
            max_dt: config.max_dt,
            accumulator: 0.0,
            frame_count: 0,
            update_count: 0,
            fps: 60.0,
            fps_window: 0.0,
            fps_window_frames: 0,
        }
    }

    /// Account for `elapsed` seconds of wall-clock time and run the updates
    /// it pays for. `update` receives the dt to integrate.
    ///
    /// Negative or NaN `elapsed` counts as zero. In variable mode the single
    /// update gets `elapsed` clamped to `max_dt`.
    pub fn advance(&mut self, elapsed: f64, mut update: impl FnMut(f64)) -> FrameReport {
        let elapsed = if elapsed.is_nan() || elapsed < 0.0 {
            0.0
        } else {
            elapsed
        };
        self.sample_fps(elapsed);
        self.frame_count += 1;

        let report = match self.mode {
            TimestepMode::Variable => {
                update(elapsed.min(self.max_dt));
                FrameReport {
                    updates: 1,
                    interpolation: 1.0,
                    discarded_backlog: 0.0,
                }
            }
            TimestepMode::Fixed => self.run_fixed(elapsed, &mut update),
        };
        self.update_count += u64::from(report.updates);

        if report.panicked() {
            tracing::warn!(
                updates = report.updates,
                discarded_seconds = report.discarded_backlog,
                "frame fell too far behind; discarding simulation backlog"
            );
        }
        report
    }

    fn run_fixed(&mut self, elapsed: f64, update: &mut impl FnMut(f64)) -> FrameReport {
        self.accumulator += elapsed;
        let mut updates = 0;
        let mut discarded_backlog = 0.0;
        while self.accumulator >= self.timestep {
            update(self.timestep);
            self.accumulator -= self.timestep;
            updates += 1;
            if updates >= self.max_updates {
                discarded_backlog = self.accumulator;
                self.accumulator = 0.0;
                break;
            }
        }
        FrameReport {
            updates,
            interpolation: (self.accumulator / self.timestep).clamp(0.0, 1.0),
            discarded_backlog,
        }
    }

    fn sample_fps(&mut self, elapsed: f64) {
        self.fps_window += elapsed;
        self.fps_window_frames += 1;
        if self.fps_window > FPS_UPDATE_INTERVAL {
            let measured = f64::from(self.fps_window_frames) / self.fps_window;
            self.fps = FPS_ALPHA * measured + (1.0 - FPS_ALPHA) * self.fps;
            self.fps_window = 0.0;
            self.fps_window_frames = 0;
        }
    }

    /// Drop any accumulated, unsimulated time, so the next frame starts
    /// without a remainder. The windowed runner calls this when the window
    /// regains focus.
    pub fn reset_backlog(&mut self) {
        self.accumulator = 0.0;
    }

    // -- accessors ----------------------------------------------------------

    /// Smoothed frames per second.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn timestep(&self) -> f64 {
        self.timestep
    }

    pub fn mode(&self) -> TimestepMode {
        self.mode
    }

    /// Unsimulated time carried to the next frame, in seconds.
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Updates run since the driver was created.
    pub fn update_count(&self) -> u64 {
        self.update_count
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
