//! Axum router construction for the broadcast server.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::ws;

/// Build the router for one broadcast server instance.
///
/// The configured path gets the primary `WebSocket` handler; every other
/// path falls back to the same stream with a logged warning, so a
/// client with a mistyped suffix still receives data.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(&state.expected_path, get(ws::ws_stream))
        .fallback(get(ws::ws_stream_any_path))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
