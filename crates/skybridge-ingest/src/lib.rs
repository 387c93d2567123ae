//! UDP telemetry ingest service for the Skybridge bridge.
//!
//! [`IngestService`] owns the UDP socket, decodes each datagram as one
//! telemetry line, and deposits parsed records into the shared
//! [`TelemetryState`]. Producers may unicast or broadcast; the socket
//! accepts datagrams from any source with no peer filtering.
//!
//! The loop is deliberately hard to kill: malformed lines, invalid
//! UTF-8, and transient receive errors are logged and skipped. The
//! only fatal error is failing to bind the socket at startup, which
//! propagates so the orchestrator can refuse to start half a bridge.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use skybridge_core::config::IngestConfig;
use skybridge_core::state::TelemetryState;
use skybridge_protocol::{parse_line, TelemetryLine};
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Pause after a transient receive error before retrying.
const RECV_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Errors that can occur in the ingest service.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Failed to bind the UDP socket at startup.
    #[error("failed to bind UDP socket on port {port}: {source}")]
    Bind {
        /// The requested port.
        port: u16,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to configure the bound socket.
    #[error("failed to configure UDP socket: {source}")]
    Socket {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// UDP ingest service: receive, parse, deposit.
///
/// Construct with [`IngestService::bind`], which fails fast if the
/// port is unavailable, then drive with [`IngestService::run`] for the
/// process lifetime.
pub struct IngestService {
    socket: UdpSocket,
    state: Arc<TelemetryState>,
    max_datagram_bytes: usize,
    silence_gap: Duration,
}

impl IngestService {
    /// Bind the UDP socket and prepare the service.
    ///
    /// The socket listens on all interfaces with address reuse and
    /// broadcast reception enabled: simulators commonly broadcast
    /// telemetry instead of unicasting it, and reuse lets a second
    /// listener (or a quick restart) share port 49002 with this one.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Bind`] if the port cannot be bound and
    /// [`IngestError::Socket`] if the socket options cannot be set.
    pub fn bind(
        config: &IngestConfig,
        state: Arc<TelemetryState>,
    ) -> Result<Self, IngestError> {
        let socket = Self::bind_socket(config.port)?;

        info!(port = config.port, "telemetry ingest listening");

        Ok(Self {
            socket,
            state,
            max_datagram_bytes: config.max_datagram_bytes,
            silence_gap: config.silence_gap(),
        })
    }

    /// Build the listening socket with reuse and broadcast enabled.
    ///
    /// Options must be set before binding, so the socket is built
    /// through [`socket2`] and handed to tokio once configured.
    fn bind_socket(port: u16) -> Result<UdpSocket, IngestError> {
        let socket_err = |source| IngestError::Socket { source };

        let socket =
            Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP)).map_err(socket_err)?;
        socket.set_reuse_address(true).map_err(socket_err)?;
        socket.set_broadcast(true).map_err(socket_err)?;
        socket.set_nonblocking(true).map_err(socket_err)?;

        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        socket
            .bind(&addr.into())
            .map_err(|source| IngestError::Bind { port, source })?;

        UdpSocket::from_std(socket.into()).map_err(socket_err)
    }

    /// The socket's local address, useful when bound to port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Receive and process datagrams until the process terminates.
    ///
    /// Each datagram is decoded as UTF-8 text (invalid sequences drop
    /// the datagram), parsed into a telemetry line, and routed into
    /// the shared state. Oversized datagrams are truncated to the
    /// configured maximum rather than rejected.
    ///
    /// # Errors
    ///
    /// Does not return under normal operation. The signature leaves
    /// room for future fatal conditions; transient receive errors are
    /// retried after a short delay.
    pub async fn run(self) -> Result<(), IngestError> {
        let mut buffer = vec![0_u8; self.max_datagram_bytes];
        let mut last_datagram_at: Option<Instant> = None;
        let mut datagrams_received: u64 = 0;

        loop {
            let len = match self.socket.recv(&mut buffer).await {
                Ok(len) => len,
                Err(e) => {
                    warn!(error = %e, "UDP receive error");
                    tokio::time::sleep(RECV_RETRY_DELAY).await;
                    continue;
                }
            };

            datagrams_received = datagrams_received.saturating_add(1);
            let resumed = last_datagram_at
                .is_none_or(|at| at.elapsed() > self.silence_gap);
            last_datagram_at = Some(Instant::now());

            let Some(datagram) = buffer.get(..len) else {
                continue;
            };
            let Ok(text) = std::str::from_utf8(datagram) else {
                debug!(len, "dropping datagram with invalid UTF-8");
                continue;
            };

            let parsed = parse_line(text);
            if resumed {
                // Diagnostic only: lets an operator see data (re)appear
                // after the simulator was silent or not yet started.
                info!(datagrams_received, sample = ?parsed, "receiving telemetry data");
            }

            match parsed {
                TelemetryLine::Position(record) => self.state.update_position(record),
                TelemetryLine::Attitude(record) => self.state.update_attitude(record),
                TelemetryLine::Unrecognized { raw } => {
                    debug!(line = %raw, "discarding unrecognized telemetry line");
                }
            }
        }
    }
}
