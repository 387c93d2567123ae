//! Skybridge binary: `ForeFlight` UDP telemetry in, `WebSocket` JSON out.
//!
//! The orchestrator owns one [`TelemetryState`] and runs the ingest
//! and broadcast services against it concurrently for the process
//! lifetime.
//!
//! # Startup sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `skybridge.yaml` (defaults if absent)
//! 3. Create the shared telemetry state
//! 4. Bind **both** sockets; a port conflict on either side aborts
//!    startup before anything runs, never leaving half a bridge up
//! 5. Run ingest and broadcast until one fails or Ctrl-C arrives

mod error;

use std::path::Path;
use std::sync::Arc;

use skybridge_broadcast::BroadcastService;
use skybridge_core::config::BridgeConfig;
use skybridge_core::state::TelemetryState;
use skybridge_ingest::IngestService;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::BridgeError;

/// Application entry point for the bridge.
///
/// # Errors
///
/// Returns an error if startup fails (bad config, port conflict) or
/// if either long-running service dies.
#[tokio::main]
async fn main() -> Result<(), BridgeError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("skybridge starting");

    let config = load_config()?;
    info!(
        udp_port = config.ingest.port,
        ws_host = %config.broadcast.host,
        ws_port = config.broadcast.port,
        ws_path = %config.broadcast.path,
        tick_interval_ms = config.broadcast.tick_interval_ms,
        "configuration loaded"
    );

    let telemetry = Arc::new(TelemetryState::new());

    // Bind both sides before running either: a conflict on one port
    // must fail the whole bridge, not leave the other side serving.
    let ingest = IngestService::bind(&config.ingest, Arc::clone(&telemetry))?;
    let broadcast = BroadcastService::bind(&config.broadcast, Arc::clone(&telemetry)).await?;

    info!("bridge running, press Ctrl-C to stop");

    tokio::select! {
        result = ingest.run() => {
            result?;
            return Err(BridgeError::UnexpectedExit { service: "ingest" });
        }
        result = broadcast.run() => {
            result?;
            return Err(BridgeError::UnexpectedExit { service: "broadcast" });
        }
        result = tokio::signal::ctrl_c() => {
            result.map_err(|source| BridgeError::Signal { source })?;
            info!("shutdown signal received, stopping bridge");
        }
    }

    info!("skybridge shutdown complete");
    Ok(())
}

/// Load the bridge configuration from `skybridge.yaml`.
///
/// Looks for the config file relative to the current working
/// directory; a missing file means defaults.
fn load_config() -> Result<BridgeConfig, BridgeError> {
    let config_path = Path::new("skybridge.yaml");
    if config_path.exists() {
        Ok(BridgeConfig::from_file(config_path)?)
    } else {
        info!("config file not found, using defaults");
        Ok(BridgeConfig::from_env())
    }
}
