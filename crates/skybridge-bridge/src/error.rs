//! Error types for the Skybridge binary.
//!
//! [`BridgeError`] is the top-level error type that wraps all possible
//! failure modes during bridge startup and steady-state operation.

/// Top-level error for the Skybridge binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: skybridge_core::config::ConfigError,
    },

    /// The UDP ingest service failed.
    #[error("ingest error: {source}")]
    Ingest {
        /// The underlying ingest error.
        #[from]
        source: skybridge_ingest::IngestError,
    },

    /// The `WebSocket` broadcast service failed.
    #[error("broadcast error: {source}")]
    Broadcast {
        /// The underlying broadcast error.
        #[from]
        source: skybridge_broadcast::BroadcastError,
    },

    /// Listening for the shutdown signal failed.
    #[error("failed to listen for shutdown signal: {source}")]
    Signal {
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A long-running service returned even though no error surfaced.
    #[error("{service} service exited unexpectedly")]
    UnexpectedExit {
        /// Which service stopped.
        service: &'static str,
    },
}
