//! `ForeFlight`-compatible telemetry protocol for the Skybridge bridge.
//!
//! Simulators that speak the `ForeFlight` UDP protocol emit plaintext
//! lines, one per datagram, in two formats:
//!
//! ```text
//! XGPS<name>,<lon>,<lat>,<alt_msl_m>,<track_true_deg>,<gs_mps>
//! XATT<name>,<heading_true_deg>,<pitch_deg>,<roll_deg>
//! ```
//!
//! This crate is the single source of truth for the typed records those
//! lines decode into ([`PositionRecord`], [`AttitudeRecord`]) and for
//! the line parser itself ([`parse_line`]).
//!
//! The parser is a pure function: no state, no I/O, safe to call from
//! any number of tasks concurrently. Malformed input never produces an
//! error; it produces [`TelemetryLine::Unrecognized`], which callers
//! discard or log.

pub mod parser;
pub mod records;

pub use parser::parse_line;
pub use records::{AttitudeRecord, PositionRecord, TelemetryLine};
