//! WebSocket handler for live reload.
//!
//! Each connection is registered with the hub and then only read from, so
//! that a closed or broken socket is noticed and unregistered.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::StreamExt;

use super::hub::ReloadHub;
use crate::state::AppState;

/// Handle WebSocket upgrade for live reload.
pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_failed_upgrade(|error| {
        tracing::warn!(%error, "Live reload WebSocket upgrade failed");
    })
    .on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle an established WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let Some(hub) = state.live_reload.as_ref() else {
        // Live reload not enabled, close connection
        return;
    };
    serve_client(socket, hub).await;
}

/// Register the socket and block on reads until it closes.
async fn serve_client(socket: WebSocket, hub: &ReloadHub) {
    let (sink, mut stream) = socket.split();
    let id = hub.register(sink).await;

    // Inbound frames carry no data for us; reading only detects closure.
    while let Some(frame) = stream.next().await {
        if let Err(e) = frame {
            tracing::debug!(client = %id, error = %e, "Live reload socket read failed");
            break;
        }
    }

    hub.unregister(id).await;
}
