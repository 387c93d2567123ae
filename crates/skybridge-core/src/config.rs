//! Typed configuration for the Skybridge bridge.
//!
//! The canonical configuration lives in `skybridge.yaml` next to the
//! binary. Every field has a default matching the protocol's
//! conventions (UDP 49002, `WebSocket` 2992 at `/api/v1`, 4 Hz), so an
//! absent file or an empty document is a valid configuration.
//!
//! Environment variables override the two ports for containerized
//! deployments: `SKYBRIDGE_UDP_PORT` and `SKYBRIDGE_WS_PORT`.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level bridge configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BridgeConfig {
    /// UDP telemetry ingest settings.
    #[serde(default)]
    pub ingest: IngestConfig,

    /// `WebSocket` broadcast settings.
    #[serde(default)]
    pub broadcast: BroadcastConfig,
}

impl BridgeConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Default configuration with environment overrides applied.
    ///
    /// Used when no configuration file exists.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides for the two ports.
    ///
    /// Unparsable values are ignored with a warning rather than
    /// failing startup.
    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("SKYBRIDGE_UDP_PORT") {
            match value.parse() {
                Ok(port) => self.ingest.port = port,
                Err(_) => warn!(%value, "ignoring invalid SKYBRIDGE_UDP_PORT"),
            }
        }
        if let Ok(value) = std::env::var("SKYBRIDGE_WS_PORT") {
            match value.parse() {
                Ok(port) => self.broadcast.port = port,
                Err(_) => warn!(%value, "ignoring invalid SKYBRIDGE_WS_PORT"),
            }
        }
    }
}

/// UDP ingest settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IngestConfig {
    /// UDP port to listen on for telemetry datagrams.
    #[serde(default = "default_udp_port")]
    pub port: u16,

    /// Maximum datagram size in bytes; larger datagrams are truncated.
    #[serde(default = "default_max_datagram_bytes")]
    pub max_datagram_bytes: usize,

    /// Seconds of silence after which resumed data gets logged.
    #[serde(default = "default_silence_gap_secs")]
    pub silence_gap_secs: u64,
}

impl IngestConfig {
    /// The silence gap as a [`Duration`].
    pub const fn silence_gap(&self) -> Duration {
        Duration::from_secs(self.silence_gap_secs)
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            port: default_udp_port(),
            max_datagram_bytes: default_max_datagram_bytes(),
            silence_gap_secs: default_silence_gap_secs(),
        }
    }
}

/// `WebSocket` broadcast settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BroadcastConfig {
    /// Host address to bind the `WebSocket` server to.
    #[serde(default = "default_ws_host")]
    pub host: String,

    /// TCP port for the `WebSocket` server.
    #[serde(default = "default_ws_port")]
    pub port: u16,

    /// Expected request path; other paths are served with a warning.
    #[serde(default = "default_ws_path")]
    pub path: String,

    /// Broadcast period in milliseconds (250 ms = 4 Hz).
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl BroadcastConfig {
    /// The broadcast period as a [`Duration`].
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            host: default_ws_host(),
            port: default_ws_port(),
            path: default_ws_path(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

const fn default_udp_port() -> u16 {
    49002
}

const fn default_max_datagram_bytes() -> usize {
    1024
}

const fn default_silence_gap_secs() -> u64 {
    5
}

fn default_ws_host() -> String {
    String::from("0.0.0.0")
}

const fn default_ws_port() -> u16 {
    2992
}

fn default_ws_path() -> String {
    String::from("/api/v1")
}

const fn default_tick_interval_ms() -> u64 {
    250
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = BridgeConfig::parse("{}").unwrap();
        assert_eq!(config.ingest.port, 49002);
        assert_eq!(config.ingest.max_datagram_bytes, 1024);
        assert_eq!(config.broadcast.port, 2992);
        assert_eq!(config.broadcast.host, "0.0.0.0");
        assert_eq!(config.broadcast.path, "/api/v1");
        assert_eq!(config.broadcast.tick_interval(), Duration::from_millis(250));
    }

    #[test]
    fn partial_document_overrides_selected_fields() {
        let yaml = "ingest:\n  port: 49010\nbroadcast:\n  tick_interval_ms: 500\n";
        let config = BridgeConfig::parse(yaml).unwrap();
        assert_eq!(config.ingest.port, 49010);
        assert_eq!(config.ingest.silence_gap(), Duration::from_secs(5));
        assert_eq!(config.broadcast.tick_interval_ms, 500);
        assert_eq!(config.broadcast.path, "/api/v1");
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        assert!(BridgeConfig::parse("ingest: [").is_err());
    }
}
