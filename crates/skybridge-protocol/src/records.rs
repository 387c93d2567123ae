//! Typed telemetry records decoded from `ForeFlight` protocol lines.
//!
//! Records are immutable once constructed: the parser builds one per
//! successfully decoded line and the state holder replaces its stored
//! record wholesale on every update. No partial merges happen at the
//! record level.

use serde::{Deserialize, Serialize};

/// Position fix decoded from an `XGPS` line.
///
/// Units are the protocol's native units: meters and meters per
/// second. Conversion to the feet/knots wire schema happens at
/// snapshot time, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    /// Name of the simulator or device that produced the line.
    pub source: String,
    /// Longitude in degrees (east positive).
    pub longitude_deg: f64,
    /// Latitude in degrees (north positive).
    pub latitude_deg: f64,
    /// Altitude above mean sea level, in meters.
    pub altitude_msl_m: f64,
    /// True track over the ground, in degrees. Not normalized; the
    /// snapshot merge maps it into `[0, 360)`.
    pub track_true_deg: f64,
    /// Ground speed in meters per second.
    pub ground_speed_mps: f64,
}

/// Attitude decoded from an `XATT` line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttitudeRecord {
    /// Name of the simulator or device that produced the line.
    pub source: String,
    /// True heading in degrees. Not normalized; the snapshot merge
    /// maps it into `[0, 360)`.
    pub true_heading_deg: f64,
    /// Pitch in degrees, nose-up positive.
    pub pitch_deg: f64,
    /// Roll in degrees, right-wing-down positive.
    pub roll_deg: f64,
}

/// Result of parsing one telemetry line.
///
/// Callers dispatch exhaustively: position and attitude records flow
/// into the shared state, unrecognized lines are terminal and exist
/// only for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TelemetryLine {
    /// A well-formed `XGPS` position line.
    Position(PositionRecord),
    /// A well-formed `XATT` attitude line.
    Attitude(AttitudeRecord),
    /// Anything else: unknown prefix, missing fields, or a field that
    /// failed to parse as a float.
    Unrecognized {
        /// The offending line, trimmed, kept for diagnostics.
        raw: String,
    },
}
