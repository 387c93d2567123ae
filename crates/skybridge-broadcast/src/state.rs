//! Shared application state for the broadcast server.

use std::sync::Arc;

use skybridge_core::state::TelemetryState;

use crate::registry::SubscriberRegistry;

/// State injected into every Axum handler.
///
/// Holds the shared telemetry state the tick loop snapshots from, the
/// registry of active subscriber queues, and the request path clients
/// are expected to use.
#[derive(Debug)]
pub struct AppState {
    /// Latest-record telemetry state, written by the ingest service.
    pub telemetry: Arc<TelemetryState>,
    /// Active subscriber queues.
    pub subscribers: SubscriberRegistry,
    /// The configured `WebSocket` path; connections to other paths are
    /// accepted with a warning.
    pub expected_path: String,
}

impl AppState {
    /// Create the application state for one server instance.
    pub fn new(telemetry: Arc<TelemetryState>, expected_path: String) -> Self {
        Self {
            telemetry,
            subscribers: SubscriberRegistry::new(),
            expected_path,
        }
    }
}
