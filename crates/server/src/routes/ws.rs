// crates/server/src/routes/ws.rs
//! WebSocket endpoint for real-time job updates.
//!
//! - `WS /api/v1/ws/jobs/:job_id` -- stream of progression events
//!
//! A connection registers one sink with the subscriber registry and forwards
//! every event as a JSON text frame, in emission order, until the client
//! disconnects. Inbound frames only keep the connection alive; they drive no
//! state change.

use std::sync::Arc;

use axum::{
    extract::ws::{Message, WebSocket},
    extract::{Path, State, WebSocketUpgrade},
    response::Response,
    routing::get,
    Router,
};

use crate::state::AppState;

/// Build the WebSocket sub-router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/ws/jobs/{job_id}", get(ws_job_updates))
}

/// WS /api/v1/ws/jobs/:job_id - Upgrade and stream job events.
///
/// Subscription is keyed by job id alone; connecting before the job exists
/// (or after it completed) is allowed and simply yields no events.
async fn ws_job_updates(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(state, job_id, socket))
}

async fn handle_socket(state: Arc<AppState>, job_id: String, mut socket: WebSocket) {
    let (subscriber_id, mut events) = state.subscribers.subscribe(&job_id);
    tracing::debug!(job_id = %job_id, subscriber_id, "WebSocket client connected");

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                let frame = match serde_json::to_string(&event) {
                    Ok(json) => json,
                    Err(e) => {
                        tracing::error!(job_id = %job_id, error = %e, "Failed to encode event");
                        continue;
                    }
                };
                if socket.send(Message::Text(frame.into())).await.is_err() {
                    // Client went away between disconnect and deregistration.
                    break;
                }
            }
            inbound = socket.recv() => {
                match inbound {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    state.subscribers.unsubscribe(&job_id, subscriber_id);
    tracing::debug!(job_id = %job_id, subscriber_id, "WebSocket client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_creation() {
        let _router = router();
    }
}
