//! Session snapshot and restore with BLAKE3 hashing.
//!
//! A [`SessionSnapshot`] holds everything that changes while a session runs
//! (the body, the tick counter and the tuning) plus the digest of the level
//! it was taken on. The level itself is not serialized: it is loaded once
//! and never changes, so a snapshot can only be restored into a session
//! built from the same level.
//!
//! ```
//! use pixelhop_engine::prelude::*;
//!
//! let grid = TileGrid::from_rgba(20, 4, &vec![0u8; 20 * 4 * 4], TileSize::default()).unwrap();
//! let mut session = Session::spawn_default(grid);
//! for _ in 0..10 {
//!     session.step(&InputFrame::idle(), 1.0 / 60.0);
//! }
//!
//! let snapshot = session.capture_snapshot().unwrap();
//! assert_eq!(snapshot.tick, 10);
//! assert_eq!(snapshot.hash.len(), 64);
//!
//! for _ in 0..10 {
//!     session.step(&InputFrame::idle(), 1.0 / 60.0);
//! }
//! session.restore_from_snapshot(&snapshot).unwrap();
//! assert_eq!(session.tick_count(), 10);
//! assert_eq!(session.state_hash().unwrap(), snapshot.hash);
//! ```

use serde::{Deserialize, Serialize};

use crate::body::{Body, BodyError};
use crate::config::{ConfigError, PhysicsConfig};
use crate::session::Session;

// ---------------------------------------------------------------------------
// SnapshotError
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The recorded hash does not match the snapshot's contents.
    #[error("snapshot hash mismatch: recorded {recorded} but recomputed {computed}")]
    HashMismatch { recorded: String, computed: String },

    /// The snapshot was taken on a different level.
    #[error("snapshot belongs to level {snapshot} but the session runs level {session}")]
    GridMismatch { snapshot: String, session: String },

    /// The snapshot carries tuning the physics step cannot run with.
    #[error("snapshot has an invalid config: {0}")]
    Config(#[from] ConfigError),

    /// The body's collider is not attached to its position.
    #[error("snapshot body is inconsistent: {0}")]
    InconsistentBody(#[from] BodyError),

    #[error("snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// SessionSnapshot
// ---------------------------------------------------------------------------

/// Serializable state of a [`Session`], minus the level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub body: Body,
    /// Steps run at the time of capture.
    pub tick: u64,
    pub config: PhysicsConfig,
    /// [`TileGrid::digest`](pixelhop_level::grid::TileGrid::digest) of the
    /// level.
    pub grid_digest: String,
    /// BLAKE3 hex digest over the fields above.
    pub hash: String,
}

impl SessionSnapshot {
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Recompute the hash and compare it with the recorded one.
    pub fn verify(&self) -> Result<(), SnapshotError> {
        let computed = compute_hash(&self.body, self.tick, &self.config, &self.grid_digest)?;
        if computed != self.hash {
            return Err(SnapshotError::HashMismatch {
                recorded: self.hash.clone(),
                computed,
            });
        }
        Ok(())
    }
}

/// BLAKE3 hex digest of the canonical JSON encoding of the hashed state.
fn compute_hash(
    body: &Body,
    tick: u64,
    config: &PhysicsConfig,
    grid_digest: &str,
) -> Result<String, SnapshotError> {
    #[derive(Serialize)]
    struct HashableState<'a> {
        body: &'a Body,
        tick: u64,
        config: &'a PhysicsConfig,
        grid_digest: &'a str,
    }

    let bytes = serde_json::to_vec(&HashableState {
        body,
        tick,
        config,
        grid_digest,
    })?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

// ---------------------------------------------------------------------------
// Session snapshot/restore methods
// ---------------------------------------------------------------------------

impl Session {
    /// Capture the current state.
    pub fn capture_snapshot(&self) -> Result<SessionSnapshot, SnapshotError> {
        let hash = compute_hash(self.body(), self.tick_count(), self.config(), self.grid_digest())?;
        Ok(SessionSnapshot {
            body: self.body().clone(),
            tick: self.tick_count(),
            config: self.config().clone(),
            grid_digest: self.grid_digest().to_owned(),
            hash,
        })
    }

    /// Restore a previously captured state.
    ///
    /// All checks run before anything is modified: on error the session is
    /// unchanged.
    ///
    /// # Errors
    ///
    /// [`SnapshotError::HashMismatch`] if the snapshot was altered,
    /// [`SnapshotError::GridMismatch`] if it was taken on another level,
    /// [`SnapshotError::Config`] if its tuning does not validate and
    /// [`SnapshotError::InconsistentBody`] if the body's collider does not
    /// match its position and the configured hitbox.
    pub fn restore_from_snapshot(&mut self, snapshot: &SessionSnapshot) -> Result<(), SnapshotError> {
        snapshot.verify()?;
        if snapshot.grid_digest != self.grid_digest() {
            return Err(SnapshotError::GridMismatch {
                snapshot: snapshot.grid_digest.clone(),
                session: self.grid_digest().to_owned(),
            });
        }
        snapshot.config.validate()?;
        snapshot.body.validate(&snapshot.config.hitbox)?;

        self.restore_state(snapshot.body.clone(), snapshot.tick, snapshot.config.clone());
        tracing::debug!(tick = snapshot.tick, hash = %snapshot.hash, "session restored");
        Ok(())
    }

    /// Hash of the current state, equal to `capture_snapshot()?.hash`.
    pub fn state_hash(&self) -> Result<String, SnapshotError> {
        compute_hash(self.body(), self.tick_count(), self.config(), self.grid_digest())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Action, InputFrame};
    use pixelhop_level::grid::TileGrid;
    use pixelhop_level::tile::TileSize;

    fn level(solid_row: u32) -> TileGrid {
        let (w, h) = (16u32, 4u32);
        let mut px = vec![0u8; (w * h * 4) as usize];
        for column in 0..w {
            let i = ((solid_row * w + column) * 4) as usize;
            px[i..i + 4].copy_from_slice(&[10, 200, 10, 255]);
        }
        TileGrid::from_rgba(w, h, &px, TileSize::default()).unwrap()
    }

    fn run(session: &mut Session, ticks: usize) {
        for i in 0..ticks {
            let input = if i % 3 == 0 {
                InputFrame::holding(&[Action::Right])
            } else {
                InputFrame::idle()
            };
            session.step(&input, 1.0 / 60.0);
        }
    }

    #[test]
    fn identical_runs_hash_identically() {
        let mut a = Session::spawn_default(level(3));
        let mut b = Session::spawn_default(level(3));
        run(&mut a, 90);
        run(&mut b, 90);
        assert_eq!(a.state_hash().unwrap(), b.state_hash().unwrap());
    }

    #[test]
    fn hash_changes_with_state() {
        let mut session = Session::spawn_default(level(3));
        let before = session.state_hash().unwrap();
        run(&mut session, 1);
        assert_ne!(before, session.state_hash().unwrap());
    }

    #[test]
    fn restore_then_rerun_matches() {
        let mut session = Session::spawn_default(level(3));
        run(&mut session, 30);
        let fork = session.capture_snapshot().unwrap();
        run(&mut session, 30);
        let first = session.state_hash().unwrap();

        session.restore_from_snapshot(&fork).unwrap();
        run(&mut session, 30);
        assert_eq!(first, session.state_hash().unwrap());
    }

    #[test]
    fn tampered_snapshot_is_rejected() {
        let mut session = Session::spawn_default(level(3));
        run(&mut session, 5);
        let mut snapshot = session.capture_snapshot().unwrap();
        snapshot.tick += 1;
        let err = session.restore_from_snapshot(&snapshot).unwrap_err();
        assert!(matches!(err, SnapshotError::HashMismatch { .. }));
        assert_eq!(session.tick_count(), 5);
    }

    #[test]
    fn snapshot_from_another_level_is_rejected() {
        let a = Session::spawn_default(level(3));
        let mut b = Session::spawn_default(level(2));
        let snapshot = a.capture_snapshot().unwrap();
        let err = b.restore_from_snapshot(&snapshot).unwrap_err();
        assert!(matches!(err, SnapshotError::GridMismatch { .. }));
    }

    /// Edit the snapshot's JSON and re-sign it, as a tool that knows the
    /// hashing scheme could.
    fn edited(snapshot: &SessionSnapshot, edit: impl FnOnce(&mut serde_json::Value)) -> SessionSnapshot {
        let mut value = serde_json::to_value(snapshot).unwrap();
        edit(&mut value);
        let mut out: SessionSnapshot = serde_json::from_value(value).unwrap();
        out.hash = compute_hash(&out.body, out.tick, &out.config, &out.grid_digest).unwrap();
        out
    }

    #[test]
    fn resigned_snapshot_with_detached_collider_is_rejected() {
        let mut session = Session::spawn_default(level(3));
        run(&mut session, 8);
        let snapshot = edited(&session.capture_snapshot().unwrap(), |v| {
            v["body"]["collider"]["x"] = serde_json::json!(0.0);
        });
        snapshot.verify().unwrap();

        let before = session.state_hash().unwrap();
        let err = session.restore_from_snapshot(&snapshot).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::InconsistentBody(BodyError::Detached { .. })
        ));
        assert_eq!(session.state_hash().unwrap(), before);
    }

    #[test]
    fn negative_collider_size_does_not_deserialize() {
        let session = Session::spawn_default(level(3));
        let mut value = serde_json::to_value(session.capture_snapshot().unwrap()).unwrap();
        value["body"]["collider"]["width"] = serde_json::json!(-3.0);
        let err = SessionSnapshot::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, SnapshotError::Serialization(_)));
    }

    #[test]
    fn resigned_snapshot_with_foreign_hitbox_is_rejected() {
        let mut session = Session::spawn_default(level(3));
        let snapshot = edited(&session.capture_snapshot().unwrap(), |v| {
            v["config"]["hitbox"]["width"] = serde_json::json!(14.0);
        });
        let err = session.restore_from_snapshot(&snapshot).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::InconsistentBody(BodyError::HitboxMismatch { .. })
        ));
        assert_eq!(session.config().hitbox.width, 11.0);
    }

    #[test]
    fn json_round_trip_keeps_hash_valid() {
        let mut session = Session::spawn_default(level(3));
        run(&mut session, 12);
        let snapshot = session.capture_snapshot().unwrap();
        let restored = SessionSnapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
        restored.verify().unwrap();
        assert_eq!(restored.hash, snapshot.hash);
    }
}
