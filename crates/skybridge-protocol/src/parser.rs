//! Line parser for the `ForeFlight` XGPS/XATT text protocol.
//!
//! Classification is by fixed 4-character prefix. The remainder is a
//! comma-separated field list: a free-text source name followed by
//! floats. Parsing errors are absorbed here: every line yields a
//! [`TelemetryLine`], never an error.

use crate::records::{AttitudeRecord, PositionRecord, TelemetryLine};

/// Prefix of position lines.
const POSITION_PREFIX: &str = "XGPS";

/// Prefix of attitude lines.
const ATTITUDE_PREFIX: &str = "XATT";

/// Parse a single telemetry line into a typed record.
///
/// The line is trimmed first, so datagrams with a trailing newline
/// parse the same as bare lines. Lines with a known prefix but too few
/// fields, or with non-numeric values where a float is expected, come
/// back as [`TelemetryLine::Unrecognized`]. Extra trailing fields are
/// ignored, matching what existing producers send.
pub fn parse_line(line: &str) -> TelemetryLine {
    let line = line.trim();
    if let Some(rest) = line.strip_prefix(POSITION_PREFIX) {
        parse_position(rest)
            .map_or_else(|| unrecognized(line), TelemetryLine::Position)
    } else if let Some(rest) = line.strip_prefix(ATTITUDE_PREFIX) {
        parse_attitude(rest)
            .map_or_else(|| unrecognized(line), TelemetryLine::Attitude)
    } else {
        unrecognized(line)
    }
}

/// Parse the field list of an `XGPS` line (prefix already stripped).
///
/// Expected fields: `name,lon,lat,alt_msl_m,track_true_deg,gs_mps`.
fn parse_position(rest: &str) -> Option<PositionRecord> {
    let mut fields = rest.split(',');
    let source = fields.next()?.trim().to_owned();
    let longitude_deg = parse_float(fields.next()?)?;
    let latitude_deg = parse_float(fields.next()?)?;
    let altitude_msl_m = parse_float(fields.next()?)?;
    let track_true_deg = parse_float(fields.next()?)?;
    let ground_speed_mps = parse_float(fields.next()?)?;

    Some(PositionRecord {
        source,
        longitude_deg,
        latitude_deg,
        altitude_msl_m,
        track_true_deg,
        ground_speed_mps,
    })
}

/// Parse the field list of an `XATT` line (prefix already stripped).
///
/// Expected fields: `name,heading_true_deg,pitch_deg,roll_deg`.
fn parse_attitude(rest: &str) -> Option<AttitudeRecord> {
    let mut fields = rest.split(',');
    let source = fields.next()?.trim().to_owned();
    let true_heading_deg = parse_float(fields.next()?)?;
    let pitch_deg = parse_float(fields.next()?)?;
    let roll_deg = parse_float(fields.next()?)?;

    Some(AttitudeRecord {
        source,
        true_heading_deg,
        pitch_deg,
        roll_deg,
    })
}

/// Parse one numeric field. Whitespace around the value is tolerated;
/// the decimal separator is always `.` (no locale handling).
fn parse_float(field: &str) -> Option<f64> {
    field.trim().parse().ok()
}

/// Build the terminal unrecognized variant for a line.
fn unrecognized(line: &str) -> TelemetryLine {
    TelemetryLine::Unrecognized {
        raw: line.to_owned(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn position_line_round_trips_all_fields() {
        let parsed = parse_line("XGPSMySim,-80.11,34.55,1200.1,359.05,55.6");
        let TelemetryLine::Position(record) = parsed else {
            panic!("expected position record, got {parsed:?}");
        };
        assert_eq!(record.source, "MySim");
        assert_eq!(record.longitude_deg, -80.11);
        assert_eq!(record.latitude_deg, 34.55);
        assert_eq!(record.altitude_msl_m, 1200.1);
        assert_eq!(record.track_true_deg, 359.05);
        assert_eq!(record.ground_speed_mps, 55.6);
    }

    #[test]
    fn attitude_line_round_trips_all_fields() {
        let parsed = parse_line("XATTMySim,180.2,0.1,-0.2");
        let TelemetryLine::Attitude(record) = parsed else {
            panic!("expected attitude record, got {parsed:?}");
        };
        assert_eq!(record.source, "MySim");
        assert_eq!(record.true_heading_deg, 180.2);
        assert_eq!(record.pitch_deg, 0.1);
        assert_eq!(record.roll_deg, -0.2);
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let parsed = parse_line("  XATTSim, 90.0 , 1.0 , 2.0 \r\n");
        let TelemetryLine::Attitude(record) = parsed else {
            panic!("expected attitude record, got {parsed:?}");
        };
        assert_eq!(record.source, "Sim");
        assert_eq!(record.true_heading_deg, 90.0);
    }

    #[test]
    fn unknown_prefix_is_unrecognized() {
        let parsed = parse_line("XTRAFFICSim,1,2,3,4,5,6");
        assert!(matches!(parsed, TelemetryLine::Unrecognized { .. }));
    }

    #[test]
    fn empty_line_is_unrecognized() {
        assert!(matches!(
            parse_line(""),
            TelemetryLine::Unrecognized { .. }
        ));
        assert!(matches!(
            parse_line("   \n"),
            TelemetryLine::Unrecognized { .. }
        ));
    }

    #[test]
    fn position_with_missing_fields_is_unrecognized() {
        let parsed = parse_line("XGPSMySim,-80.11,34.55");
        assert!(matches!(parsed, TelemetryLine::Unrecognized { .. }));
    }

    #[test]
    fn attitude_with_non_numeric_field_is_unrecognized() {
        let parsed = parse_line("XATTMySim,north,0.1,0.2");
        assert!(matches!(parsed, TelemetryLine::Unrecognized { .. }));
    }

    #[test]
    fn malformed_line_classifies_the_same_twice() {
        let line = "XGPSMySim,not-a-float,34.55,1200.1,359.05,55.6";
        let first = parse_line(line);
        let second = parse_line(line);
        assert!(matches!(first, TelemetryLine::Unrecognized { .. }));
        assert_eq!(first, second);
    }

    #[test]
    fn unrecognized_keeps_the_trimmed_line_for_diagnostics() {
        let parsed = parse_line("  garbage\n");
        assert_eq!(
            parsed,
            TelemetryLine::Unrecognized {
                raw: String::from("garbage")
            }
        );
    }

    #[test]
    fn extra_trailing_fields_are_ignored() {
        // Some producers append fields beyond the documented six.
        let parsed = parse_line("XGPSMySim,-80.0,34.0,1000.0,10.0,20.0,99.9");
        let TelemetryLine::Position(record) = parsed else {
            panic!("expected position record, got {parsed:?}");
        };
        assert_eq!(record.ground_speed_mps, 20.0);
    }

    #[test]
    fn prefix_alone_is_unrecognized() {
        // "XGPS" with no fields at all: the name parses as empty but
        // the first float is missing.
        assert!(matches!(
            parse_line("XGPS"),
            TelemetryLine::Unrecognized { .. }
        ));
    }
}
