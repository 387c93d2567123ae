//! Broadcast server lifecycle: bind, serve, tick.
//!
//! [`BroadcastService::bind`] acquires the TCP listener eagerly so a
//! port conflict surfaces as a startup failure instead of a silent
//! half-running bridge. [`BroadcastService::run`] then drives two
//! concurrent duties for the process lifetime: accepting `WebSocket`
//! subscribers, and the fixed-period snapshot tick.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use skybridge_core::config::BroadcastConfig;
use skybridge_core::state::TelemetryState;
use tokio::net::TcpListener;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace, warn};

use crate::router::build_router;
use crate::state::AppState;

/// Errors that can occur when starting or running the broadcast server.
#[derive(Debug, thiserror::Error)]
pub enum BroadcastError {
    /// The configured host/port did not form a valid socket address.
    #[error("invalid broadcast address {addr}: {reason}")]
    InvalidAddr {
        /// The address string that failed to parse.
        addr: String,
        /// Why it failed.
        reason: String,
    },

    /// The configured `WebSocket` path is not usable as a route.
    #[error("invalid WebSocket path {path:?}: must start with '/' and contain no '{{' or '}}'")]
    InvalidPath {
        /// The offending path.
        path: String,
    },

    /// Failed to bind the TCP listener.
    #[error("failed to bind broadcast listener on {addr}: {source}")]
    Bind {
        /// The address that could not be bound.
        addr: SocketAddr,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The server encountered a fatal I/O error while serving.
    #[error("broadcast serve error: {source}")]
    Serve {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// `WebSocket` broadcast service.
///
/// Owns the bound listener, the subscriber registry (via
/// [`AppState`]), and the tick period.
pub struct BroadcastService {
    listener: TcpListener,
    state: Arc<AppState>,
    tick_interval: Duration,
}

impl BroadcastService {
    /// Validate the configuration and bind the TCP listener.
    ///
    /// # Errors
    ///
    /// Returns [`BroadcastError::InvalidPath`] or
    /// [`BroadcastError::InvalidAddr`] for unusable configuration, and
    /// [`BroadcastError::Bind`] when the port is unavailable.
    pub async fn bind(
        config: &BroadcastConfig,
        telemetry: Arc<TelemetryState>,
    ) -> Result<Self, BroadcastError> {
        // Braces are axum route-parameter syntax and would panic in
        // `Router::route` long after bind; reject them up front.
        if !config.path.starts_with('/') || config.path.contains(['{', '}']) {
            return Err(BroadcastError::InvalidPath {
                path: config.path.clone(),
            });
        }

        let addr_str = format!("{}:{}", config.host, config.port);
        let addr: SocketAddr = addr_str.parse().map_err(|e: std::net::AddrParseError| BroadcastError::InvalidAddr {
            addr: addr_str,
            reason: e.to_string(),
        })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| BroadcastError::Bind { addr, source })?;

        info!(%addr, path = %config.path, "broadcast server listening");

        Ok(Self {
            listener,
            state: Arc::new(AppState::new(telemetry, config.path.clone())),
            tick_interval: config.tick_interval(),
        })
    }

    /// The listener's local address, useful when bound to port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept subscribers and broadcast snapshots until the process
    /// terminates.
    ///
    /// # Errors
    ///
    /// Returns [`BroadcastError::Serve`] if the accept loop fails
    /// fatally. The tick loop itself never returns.
    pub async fn run(self) -> Result<(), BroadcastError> {
        use std::future::IntoFuture as _;

        let router = build_router(Arc::clone(&self.state));

        tokio::select! {
            result = axum::serve(self.listener, router).into_future() => {
                result.map_err(|source| BroadcastError::Serve { source })
            }
            () = broadcast_loop(Arc::clone(&self.state), self.tick_interval) => Ok(()),
        }
    }
}

/// Fixed-period snapshot broadcast.
///
/// Every tick computes one fresh snapshot, serializes it once, and
/// fans the frame out to all registered subscribers. Pruned
/// subscribers are logged; a tick with no subscribers is a no-op.
async fn broadcast_loop(state: Arc<AppState>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        let snapshot = state.telemetry.snapshot();
        let frame = match serde_json::to_string(&snapshot) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "failed to serialize snapshot, skipping tick");
                continue;
            }
        };

        let report = state.subscribers.fanout(&frame);
        if report.pruned > 0 {
            debug!(
                pruned = report.pruned,
                remaining = state.subscribers.len(),
                "pruned dead subscribers"
            );
        }
        trace!(delivered = report.delivered, "snapshot broadcast");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config_with_path(path: &str) -> BroadcastConfig {
        BroadcastConfig {
            host: String::from("127.0.0.1"),
            port: 0,
            path: path.to_owned(),
            ..BroadcastConfig::default()
        }
    }

    #[tokio::test]
    async fn path_with_route_parameter_syntax_is_rejected_at_bind() {
        for path in ["/api/{version}", "/{*rest}", "/api/v1}"] {
            let result = BroadcastService::bind(
                &config_with_path(path),
                Arc::new(TelemetryState::new()),
            )
            .await;
            assert!(
                matches!(result, Err(BroadcastError::InvalidPath { .. })),
                "path {path:?} should fail bind"
            );
        }
    }

    #[tokio::test]
    async fn relative_path_is_rejected_at_bind() {
        let result = BroadcastService::bind(
            &config_with_path("api/v1"),
            Arc::new(TelemetryState::new()),
        )
        .await;
        assert!(matches!(result, Err(BroadcastError::InvalidPath { .. })));
    }
}
