//! `WebSocket` connection handling for snapshot subscribers.
//!
//! Every accepted connection registers an outbound queue in the
//! [`SubscriberRegistry`](crate::registry::SubscriberRegistry) and
//! runs one task that forwards queued JSON frames to the socket. The
//! protocol is unidirectional: anything a client sends (other than
//! pings and close frames) is drained and ignored.
//!
//! A connection ends when the client closes or errors, or when the
//! tick loop prunes its queue; the forwarding task then sees its
//! queue close and drops the socket.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{OriginalUri, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::state::AppState;

/// Upgrade a request on the configured path to a snapshot stream.
pub async fn ws_stream(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Upgrade a request on any other path.
///
/// Consumers occasionally misconfigure the path suffix; serving them
/// anyway (with a warning) matches what producers in the field expect.
pub async fn ws_stream_any_path(
    ws: WebSocketUpgrade,
    OriginalUri(uri): OriginalUri,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    warn!(
        path = %uri.path(),
        expected = %state.expected_path,
        "WebSocket client connected on unexpected path"
    );
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Run one subscriber connection to completion.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (id, rx) = state.subscribers.subscribe();
    debug!(%id, subscribers = state.subscribers.len(), "WebSocket client connected");

    forward_frames(socket, rx).await;

    state.subscribers.unsubscribe(id);
    debug!(%id, subscribers = state.subscribers.len(), "WebSocket client disconnected");
}

/// Forward queued frames to the socket until either side goes away.
async fn forward_frames(mut socket: WebSocket, mut rx: mpsc::Receiver<String>) {
    loop {
        tokio::select! {
            // A snapshot frame queued by the tick loop.
            frame = rx.recv() => {
                let Some(frame) = frame else {
                    // Queue closed: the registry pruned this subscriber.
                    debug!("subscriber queue closed, dropping connection");
                    return;
                };
                if socket.send(Message::Text(frame.into())).await.is_err() {
                    return;
                }
            }
            // Client traffic: answer pings, honor close, ignore the rest.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => return,
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(error = %e, "WebSocket receive error");
                        return;
                    }
                    Some(Ok(_)) => {
                        // Inbound application messages are ignored.
                    }
                }
            }
        }
    }
}
