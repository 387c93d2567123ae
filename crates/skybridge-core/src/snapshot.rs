//! Merged telemetry snapshot in the downstream JSON wire schema.
//!
//! A [`Snapshot`] is derived, never stored: the broadcast tick computes
//! a fresh one from whatever records [`TelemetryState`] currently
//! holds. Unit conversion (meters to feet, m/s to knots) and heading
//! normalization happen here, at the output boundary; records keep
//! their native protocol units.
//!
//! # Merge precedence
//!
//! Position data fills latitude, longitude, altitude, ground speed and
//! a track-derived heading. If any attitude record has been received,
//! its heading replaces the track-derived one and its pitch/roll fill
//! the attitude fields. The attitude heading wins even when the stored
//! attitude record is older than the stored position record; the two
//! streams are independent and are never time-correlated.
//!
//! [`TelemetryState`]: crate::state::TelemetryState

use serde::{Deserialize, Serialize};
use skybridge_protocol::{AttitudeRecord, PositionRecord};

/// Conversion factor: meters to feet.
pub const METERS_TO_FEET: f64 = 3.28084;

/// Conversion factor: meters per second to knots.
pub const MPS_TO_KNOTS: f64 = 1.94384;

/// Position block of the wire schema.
///
/// Serialized field names are the `camelCase` names consumers expect
/// (`latitudeDeg`, `longitudeDeg`, `mslAltitudeFt`,
/// `gpsGroundSpeedKts`). All fields are always present; zeros mean no
/// position data has arrived yet.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSnapshot {
    /// Latitude in degrees.
    pub latitude_deg: f64,
    /// Longitude in degrees.
    pub longitude_deg: f64,
    /// Altitude above mean sea level, in feet.
    pub msl_altitude_ft: f64,
    /// GPS ground speed in knots.
    pub gps_ground_speed_kts: f64,
}

/// Attitude block of the wire schema.
///
/// Serialized field names: `rollAngleDegRight`, `pitchAngleDegUp`,
/// `trueHeadingDeg`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttitudeSnapshot {
    /// Roll in degrees, right-wing-down positive.
    pub roll_angle_deg_right: f64,
    /// Pitch in degrees, nose-up positive.
    pub pitch_angle_deg_up: f64,
    /// True heading in degrees, normalized to `[0, 360)`.
    pub true_heading_deg: f64,
}

/// One merged, unit-converted view of the latest telemetry.
///
/// This is exactly the JSON object sent to every subscriber each
/// broadcast tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Position block.
    pub position: PositionSnapshot,
    /// Attitude block.
    pub attitude: AttitudeSnapshot,
}

impl Snapshot {
    /// Merge the latest records into a wire snapshot.
    ///
    /// Missing records leave their fields at 0.0. When both records
    /// are present the attitude heading overrides the position track.
    pub fn merge(
        position: Option<&PositionRecord>,
        attitude: Option<&AttitudeRecord>,
    ) -> Self {
        let mut snapshot = Self::default();

        if let Some(pos) = position {
            snapshot.position = PositionSnapshot {
                latitude_deg: pos.latitude_deg,
                longitude_deg: pos.longitude_deg,
                msl_altitude_ft: pos.altitude_msl_m * METERS_TO_FEET,
                gps_ground_speed_kts: pos.ground_speed_mps * MPS_TO_KNOTS,
            };
            // Fallback heading when no attitude data exists.
            snapshot.attitude.true_heading_deg = normalize_heading(pos.track_true_deg);
        }

        if let Some(att) = attitude {
            snapshot.attitude = AttitudeSnapshot {
                roll_angle_deg_right: att.roll_deg,
                pitch_angle_deg_up: att.pitch_deg,
                true_heading_deg: normalize_heading(att.true_heading_deg),
            };
        }

        snapshot
    }
}

/// Normalize a heading into `[0, 360)` degrees.
///
/// Uses euclidean remainder so negative inputs wrap correctly
/// (`-5 -> 355`).
pub fn normalize_heading(heading_deg: f64) -> f64 {
    heading_deg.rem_euclid(360.0)
}
