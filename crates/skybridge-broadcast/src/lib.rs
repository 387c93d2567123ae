//! `WebSocket` broadcast server for the Skybridge bridge.
//!
//! This crate serves the downstream side of the bridge: an Axum server
//! that accepts `WebSocket` subscribers and, on a fixed 4 Hz tick,
//! pushes the current telemetry [`Snapshot`] to every one of them as a
//! JSON text frame.
//!
//! # Architecture
//!
//! Each accepted connection registers an outbound queue in the
//! [`SubscriberRegistry`] and gets its own forwarding task. The tick
//! loop serializes one snapshot per tick and fans it out to every
//! registered queue; queues whose client has gone away are pruned
//! after the fan-out pass, so one dead subscriber never delays the
//! others. Subscribers that join mid-stream only ever see snapshots
//! computed after their join; there is no backlog to replay.
//!
//! Incoming client messages are drained and ignored; the protocol is
//! strictly server-to-subscriber.
//!
//! [`Snapshot`]: skybridge_core::Snapshot

pub mod registry;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

pub use registry::{FanoutReport, SubscriberId, SubscriberRegistry};
pub use router::build_router;
pub use server::{BroadcastError, BroadcastService};
pub use state::AppState;
