//! Concurrency-safe holder of the latest telemetry records.
//!
//! [`TelemetryState`] is the only mutable resource shared between the
//! ingest task and the broadcast task. It stores at most one position
//! record and one attitude record (the most recently processed of
//! each kind) behind a single mutex, so a snapshot always reads a
//! consistent pair and never a torn record.
//!
//! Updates replace the stored record wholesale; no history is kept and
//! no sub-fields are merged. The critical sections contain no I/O and
//! no awaits, so a plain [`std::sync::Mutex`] is sufficient and both
//! sync and async callers can use it.

use std::sync::{Mutex, MutexGuard, PoisonError};

use skybridge_protocol::{AttitudeRecord, PositionRecord};

use crate::snapshot::Snapshot;

/// The pair of most-recent records, guarded together.
#[derive(Debug, Default)]
struct LatestRecords {
    /// Most recent position record, if any has arrived.
    position: Option<PositionRecord>,
    /// Most recent attitude record, if any has arrived.
    attitude: Option<AttitudeRecord>,
}

/// Shared "last value wins" telemetry state.
///
/// Created once at startup, written continuously by the ingest
/// service, read continuously by the broadcast service. Cheap to share
/// via [`Arc`](std::sync::Arc).
#[derive(Debug)]
pub struct TelemetryState {
    inner: Mutex<LatestRecords>,
}

impl TelemetryState {
    /// Create an empty state: no records yet, snapshots all zeros.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(LatestRecords {
                position: None,
                attitude: None,
            }),
        }
    }

    /// Replace the stored position record.
    pub fn update_position(&self, record: PositionRecord) {
        self.lock().position = Some(record);
    }

    /// Replace the stored attitude record.
    pub fn update_attitude(&self, record: AttitudeRecord) {
        self.lock().attitude = Some(record);
    }

    /// Compute the merged snapshot from the current record pair.
    ///
    /// The pair is read under the same lock the updates take, so the
    /// snapshot is consistent with respect to concurrent writes. The
    /// two records still arrive from independent streams and carry no
    /// time correlation with each other.
    pub fn snapshot(&self) -> Snapshot {
        let guard = self.lock();
        Snapshot::merge(guard.position.as_ref(), guard.attitude.as_ref())
    }

    /// Acquire the record lock, recovering from poisoning.
    ///
    /// The stored records are plain data and every write is a whole
    /// replacement, so state behind a poisoned lock is still valid.
    fn lock(&self) -> MutexGuard<'_, LatestRecords> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for TelemetryState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn position(track_true_deg: f64, altitude_msl_m: f64) -> PositionRecord {
        PositionRecord {
            source: String::from("Sim"),
            longitude_deg: -80.11,
            latitude_deg: 34.55,
            altitude_msl_m,
            track_true_deg,
            ground_speed_mps: 10.0,
        }
    }

    fn attitude(true_heading_deg: f64) -> AttitudeRecord {
        AttitudeRecord {
            source: String::from("Sim"),
            true_heading_deg,
            pitch_deg: 1.0,
            roll_deg: 2.0,
        }
    }

    #[test]
    fn fresh_state_snapshots_to_zeros() {
        let state = TelemetryState::new();
        assert_eq!(state.snapshot(), Snapshot::default());
    }

    #[test]
    fn heading_precedence_over_the_record_lifecycle() {
        let state = TelemetryState::new();

        // Position only: heading derives from track, wrapped.
        state.update_position(position(370.0, 1000.0));
        assert_eq!(state.snapshot().attitude.true_heading_deg, 10.0);

        // Attitude arrives: its heading overrides the track.
        state.update_attitude(attitude(-5.0));
        assert_eq!(state.snapshot().attitude.true_heading_deg, 355.0);

        // A newer position does not win the heading back; the stale
        // attitude record still takes precedence.
        state.update_position(position(90.0, 2000.0));
        let snapshot = state.snapshot();
        assert_eq!(snapshot.attitude.true_heading_deg, 355.0);
        assert!((snapshot.position.msl_altitude_ft - 6561.68).abs() < 1e-9);
    }

    #[test]
    fn updates_replace_records_wholesale() {
        let state = TelemetryState::new();
        state.update_position(position(10.0, 1000.0));
        state.update_position(position(20.0, 500.0));

        let snapshot = state.snapshot();
        assert_eq!(snapshot.attitude.true_heading_deg, 20.0);
        assert!((snapshot.position.msl_altitude_ft - 1640.42).abs() < 1e-9);
    }

    #[test]
    fn concurrent_updates_and_snapshots_stay_consistent() {
        use std::sync::Arc;

        let state = Arc::new(TelemetryState::new());
        let writer = {
            let state = Arc::clone(&state);
            std::thread::spawn(move || {
                for i in 0..1_000_u32 {
                    state.update_position(position(f64::from(i), 1000.0));
                    state.update_attitude(attitude(f64::from(i)));
                }
            })
        };

        for _ in 0..1_000 {
            let snapshot = state.snapshot();
            // Heading is always normalized, whatever interleaving ran.
            assert!(snapshot.attitude.true_heading_deg >= 0.0);
            assert!(snapshot.attitude.true_heading_deg < 360.0);
        }
        writer.join().unwrap();
    }
}
