//! Input recording and deterministic replay with hash checkpoints.
//!
//! A [`ReplayRecorder`] captures the starting snapshot of a session, the
//! input and `dt` of every step, and the state hash every N ticks. The
//! resulting [`ReplayLog`] is plain JSON. [`replay`] restores the starting
//! snapshot on a session built from the same level, feeds the recorded
//! steps back in and compares hashes at every checkpoint.
//!
//! ```
//! use pixelhop_engine::prelude::*;
//! use pixelhop_engine::replay::{replay, ReplayRecorder};
//!
//! let grid = TileGrid::from_rgba(20, 4, &vec![0u8; 20 * 4 * 4], TileSize::default()).unwrap();
//! let mut session = Session::spawn_default(grid.clone());
//!
//! let mut recorder = ReplayRecorder::new(session.capture_snapshot().unwrap(), 1.0 / 60.0, 10);
//! for i in 0..60 {
//!     let input = if i < 30 { InputFrame::holding(&[Action::Right]) } else { InputFrame::idle() };
//!     recorder.record_step(&mut session, &input, 1.0 / 60.0).unwrap();
//! }
//! let log = recorder.finish();
//!
//! let mut fresh = Session::spawn_default(grid);
//! let result = replay(&mut fresh, &log).unwrap();
//! assert!(result.completed);
//! assert!(result.first_divergence.is_none());
//! assert_eq!(fresh.state_hash().unwrap(), session.state_hash().unwrap());
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::input::InputFrame;
use crate::physics::StepReport;
use crate::session::Session;
use crate::snapshot::{SessionSnapshot, SnapshotError};

// ---------------------------------------------------------------------------
// ReplayError
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("replay log has two step entries for tick {tick}")]
    DuplicateStep { tick: u64 },

    #[error("replay log has two checkpoints for tick {tick}")]
    DuplicateCheckpoint { tick: u64 },

    #[error("tick range overflow: start {start} + {total} ticks exceeds u64::MAX")]
    TickOverflow { start: u64, total: u64 },

    #[error("replay log timestep must be positive and finite, got {0}")]
    InvalidTimestep(f64),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("replay log serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// ReplayLog
// ---------------------------------------------------------------------------

/// A recorded run: starting snapshot plus ordered steps and checkpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayLog {
    pub initial_snapshot: SessionSnapshot,
    /// `dt` of every tick that has no [`ReplayEntry::Step`].
    pub timestep: f64,
    /// Ticks to run from the snapshot, whether or not they have entries.
    pub total_ticks: u64,
    pub entries: Vec<ReplayEntry>,
}

impl ReplayLog {
    pub fn to_json(&self) -> Result<String, ReplayError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// One entry of a [`ReplayLog`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReplayEntry {
    /// Input and `dt` of a step that was not idle at the log's timestep.
    Step { tick: u64, input: InputFrame, dt: f64 },
    /// State hash taken before the step at `tick` ran.
    Checkpoint { tick: u64, state_hash: String },
}

// ---------------------------------------------------------------------------
// ReplayResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayResult {
    /// Every tick ran and every checkpoint matched.
    pub completed: bool,
    pub ticks_replayed: u64,
    /// First checkpoint whose hash differed. `None` if all matched.
    pub first_divergence: Option<ReplayDivergence>,
    /// State hash where the replay stopped.
    pub final_hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayDivergence {
    pub tick: u64,
    pub expected_hash: String,
    pub actual_hash: String,
}

// ---------------------------------------------------------------------------
// ReplayRecorder
// ---------------------------------------------------------------------------

/// Builds a [`ReplayLog`] while a session runs.
///
/// Ticks must be recorded in strictly increasing order.
#[derive(Debug)]
pub struct ReplayRecorder {
    log: ReplayLog,
    checkpoint_interval: u64,
    ticks_recorded: u64,
    last_tick: Option<u64>,
}

impl ReplayRecorder {
    /// Start recording from `snapshot`.
    ///
    /// `timestep` is the usual `dt`; steps that are idle and use it exactly
    /// are not stored. A `checkpoint_interval` of 10 stores the hash at
    /// ticks 0, 10, 20, ...; 0 stores every hash passed to
    /// [`record_tick`](Self::record_tick).
    pub fn new(snapshot: SessionSnapshot, timestep: f64, checkpoint_interval: u64) -> Self {
        Self {
            log: ReplayLog {
                initial_snapshot: snapshot,
                timestep,
                total_ticks: 0,
                entries: Vec::new(),
            },
            checkpoint_interval,
            ticks_recorded: 0,
            last_tick: None,
        }
    }

    /// Record the step about to run at `tick`.
    ///
    /// # Panics
    ///
    /// Panics if `tick` is not greater than the previous call's tick.
    pub fn record_tick(&mut self, tick: u64, input: &InputFrame, dt: f64, state_hash: Option<String>) {
        if let Some(prev) = self.last_tick {
            assert!(
                tick > prev,
                "ReplayRecorder::record_tick: tick {tick} is not strictly greater than previous tick {prev}"
            );
        }
        self.last_tick = Some(tick);
        self.ticks_recorded += 1;

        if *input != InputFrame::idle() || dt.to_bits() != self.log.timestep.to_bits() {
            self.log.entries.push(ReplayEntry::Step {
                tick,
                input: input.clone(),
                dt,
            });
        }

        if let Some(hash) = state_hash {
            let due = self.checkpoint_interval == 0 || tick % self.checkpoint_interval == 0;
            if due {
                self.log.entries.push(ReplayEntry::Checkpoint {
                    tick,
                    state_hash: hash,
                });
            }
        }
    }

    /// Record a step and run it on `session`. Hashes are only computed on
    /// checkpoint ticks.
    pub fn record_step(
        &mut self,
        session: &mut Session,
        input: &InputFrame,
        dt: f64,
    ) -> Result<StepReport, SnapshotError> {
        let tick = session.tick_count();
        let due = self.checkpoint_interval == 0 || tick % self.checkpoint_interval == 0;
        let hash = if due { Some(session.state_hash()?) } else { None };
        self.record_tick(tick, input, dt, hash);
        Ok(session.step(input, dt))
    }

    pub fn finish(mut self) -> ReplayLog {
        self.log.total_ticks = self.ticks_recorded;
        self.log
    }
}

// ---------------------------------------------------------------------------
// replay()
// ---------------------------------------------------------------------------

/// Replay `log` on `session`, stopping at the first checkpoint that does not
/// match.
///
/// # Errors
///
/// Fails if the log is malformed or its snapshot cannot be restored on this
/// session. Every check runs before the session is touched.
pub fn replay(session: &mut Session, log: &ReplayLog) -> Result<ReplayResult, ReplayError> {
    if !(log.timestep > 0.0 && log.timestep.is_finite()) {
        return Err(ReplayError::InvalidTimestep(log.timestep));
    }

    let mut steps: BTreeMap<u64, (&InputFrame, f64)> = BTreeMap::new();
    let mut checkpoints: BTreeMap<u64, &str> = BTreeMap::new();
    for entry in &log.entries {
        match entry {
            ReplayEntry::Step { tick, input, dt } => {
                if steps.insert(*tick, (input, *dt)).is_some() {
                    return Err(ReplayError::DuplicateStep { tick: *tick });
                }
            }
            ReplayEntry::Checkpoint { tick, state_hash } => {
                if checkpoints.insert(*tick, state_hash.as_str()).is_some() {
                    return Err(ReplayError::DuplicateCheckpoint { tick: *tick });
                }
            }
        }
    }

    let start = log.initial_snapshot.tick;
    let end = start
        .checked_add(log.total_ticks)
        .ok_or(ReplayError::TickOverflow {
            start,
            total: log.total_ticks,
        })?;

    session.restore_from_snapshot(&log.initial_snapshot)?;

    let idle = InputFrame::idle();
    let mut ticks_replayed = 0;
    for tick in start..end {
        if let Some(&expected) = checkpoints.get(&tick) {
            let actual = session.state_hash()?;
            if actual != expected {
                tracing::warn!(tick, expected, actual = %actual, "replay diverged");
                return Ok(ReplayResult {
                    completed: false,
                    ticks_replayed,
                    first_divergence: Some(ReplayDivergence {
                        tick,
                        expected_hash: expected.to_owned(),
                        actual_hash: actual.clone(),
                    }),
                    final_hash: actual,
                });
            }
        }

        let (input, dt) = steps.get(&tick).copied().unwrap_or((&idle, log.timestep));
        session.step(input, dt);
        ticks_replayed += 1;
    }

    Ok(ReplayResult {
        completed: true,
        ticks_replayed,
        first_divergence: None,
        final_hash: session.state_hash()?,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Action;
    use pixelhop_level::grid::TileGrid;
    use pixelhop_level::tile::TileSize;

    const DT: f64 = 1.0 / 60.0;

    fn level() -> TileGrid {
        let (w, h) = (20u32, 6u32);
        let mut px = vec![0u8; (w * h * 4) as usize];
        for column in 0..w {
            let i = ((2 * w + column) * 4) as usize;
            px[i..i + 4].copy_from_slice(&[0, 180, 0, 255]);
        }
        TileGrid::from_rgba(w, h, &px, TileSize::default()).unwrap()
    }

    fn script(i: u64) -> InputFrame {
        match i {
            0..=19 => InputFrame::holding(&[Action::Right]),
            20 => InputFrame::idle().with_press(Action::Jump),
            21..=40 => InputFrame::holding(&[Action::Left, Action::Jump]),
            _ => InputFrame::idle(),
        }
    }

    fn record(ticks: u64, interval: u64) -> (ReplayLog, String) {
        let mut session = Session::spawn_default(level());
        let mut recorder = ReplayRecorder::new(session.capture_snapshot().unwrap(), DT, interval);
        for i in 0..ticks {
            recorder.record_step(&mut session, &script(i), DT).unwrap();
        }
        (recorder.finish(), session.state_hash().unwrap())
    }

    #[test]
    fn replay_reproduces_the_recorded_run() {
        let (log, recorded_final) = record(120, 10);
        assert_eq!(log.total_ticks, 120);
        let mut fresh = Session::spawn_default(level());
        let result = replay(&mut fresh, &log).unwrap();
        assert!(result.completed);
        assert_eq!(result.ticks_replayed, 120);
        assert_eq!(result.final_hash, recorded_final);
    }

    #[test]
    fn idle_steps_at_the_usual_dt_are_not_stored() {
        let (log, _) = record(100, 0);
        let steps = log
            .entries
            .iter()
            .filter(|e| matches!(e, ReplayEntry::Step { .. }))
            .count();
        assert_eq!(steps, 41);
    }

    #[test]
    fn odd_dt_is_stored_even_when_idle() {
        let mut session = Session::spawn_default(level());
        let mut recorder = ReplayRecorder::new(session.capture_snapshot().unwrap(), DT, 0);
        recorder.record_step(&mut session, &InputFrame::idle(), 0.02).unwrap();
        let log = recorder.finish();
        assert!(log
            .entries
            .iter()
            .any(|e| matches!(e, ReplayEntry::Step { dt, .. } if *dt == 0.02)));
    }

    #[test]
    fn tampered_input_is_reported_as_divergence() {
        let (mut log, _) = record(60, 10);
        // Drop the first recorded step so tick 0 replays as idle.
        let first = log
            .entries
            .iter()
            .position(|e| matches!(e, ReplayEntry::Step { .. }))
            .unwrap();
        log.entries.remove(first);

        let mut fresh = Session::spawn_default(level());
        let result = replay(&mut fresh, &log).unwrap();
        assert!(!result.completed);
        let divergence = result.first_divergence.unwrap();
        assert_eq!(divergence.tick, 10);
        assert_ne!(divergence.expected_hash, divergence.actual_hash);
        assert_eq!(result.ticks_replayed, 10);
    }

    #[test]
    fn duplicate_entries_leave_session_untouched() {
        let (mut log, _) = record(5, 1);
        let dup = log.entries[0].clone();
        log.entries.push(dup);
        let mut fresh = Session::spawn_default(level());
        fresh.step(&InputFrame::idle(), DT);
        let err = replay(&mut fresh, &log).unwrap_err();
        assert!(matches!(
            err,
            ReplayError::DuplicateStep { tick: 0 } | ReplayError::DuplicateCheckpoint { tick: 0 }
        ));
        assert_eq!(fresh.tick_count(), 1);
    }

    #[test]
    fn log_survives_json() {
        let (log, recorded_final) = record(45, 15);
        let restored = ReplayLog::from_json(&log.to_json().unwrap()).unwrap();
        assert_eq!(restored, log);
        let mut fresh = Session::spawn_default(level());
        assert_eq!(replay(&mut fresh, &restored).unwrap().final_hash, recorded_final);
    }

    #[test]
    #[should_panic(expected = "not strictly greater")]
    fn non_monotonic_ticks_panic() {
        let session = Session::spawn_default(level());
        let mut recorder = ReplayRecorder::new(session.capture_snapshot().unwrap(), DT, 0);
        recorder.record_tick(3, &InputFrame::idle(), DT, None);
        recorder.record_tick(3, &InputFrame::idle(), DT, None);
    }
}
