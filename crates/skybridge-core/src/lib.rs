//! Core state and configuration for the Skybridge telemetry bridge.
//!
//! This crate holds the one piece of shared mutable state in the whole
//! system, [`TelemetryState`], the "last value wins" holder for the
//! most recent position and attitude records, plus the snapshot merge
//! that turns that pair into the JSON wire schema, and the YAML
//! configuration loader.
//!
//! # Modules
//!
//! - [`state`]: concurrency-safe latest-record holder
//! - [`snapshot`]: merged wire-schema snapshot and unit conversions
//! - [`config`]: typed configuration with YAML loading and env
//!   overrides

pub mod config;
pub mod snapshot;
pub mod state;

pub use config::{BridgeConfig, BroadcastConfig, ConfigError, IngestConfig};
pub use snapshot::{AttitudeSnapshot, PositionSnapshot, Snapshot};
pub use state::TelemetryState;
