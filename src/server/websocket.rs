//! WebSocket endpoint
//!
//! Clients connect to `/ws` and immediately join the relay's namespace. There
//! is no handshake: every event carries its own bearer token, and events that
//! fail validation are dropped without any reply.

use crate::events::RejectReason;
use crate::relay::{ConnectionId, EventRelay};
use crate::server::connections::{ClientConnection, ConnectionManager, OutboundMessage};
use crate::server::transport::{ClientFrame, ServerStats};

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Shared state for WebSocket handlers
#[derive(Clone)]
pub struct WsState {
    pub connections: Arc<ConnectionManager>,
    pub relay: Arc<EventRelay>,
    pub outbound_buffer: usize,
}

/// Create the WebSocket router
pub fn create_router(state: WsState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .with_state(state)
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn stats_handler(State(state): State<WsState>) -> Json<ServerStats> {
    Json(ServerStats {
        connections: state.connections.count(),
        relay: state.relay.stats(),
    })
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<WsState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: WsState) {
    let (mut sender, mut receiver) = socket.split();

    let (tx, mut rx) = mpsc::channel::<OutboundMessage>(state.outbound_buffer);
    let client_conn = Arc::new(ClientConnection::new(state.relay.namespace().clone(), tx));

    let conn_id = client_conn.id;
    state.connections.add(client_conn);

    info!(conn_id = %conn_id, namespace = %state.relay.namespace(), "WebSocket client connected");

    // Forward queued frames to the socket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender
                .send(Message::Text(msg.frame.as_str().into()))
                .await
                .is_err()
            {
                break;
            }
        }
    });

    while let Some(msg_result) = receiver.next().await {
        match msg_result {
            Ok(Message::Text(text)) => dispatch_frame(&state.relay, conn_id, text.as_str().as_bytes()),
            Ok(Message::Binary(data)) => dispatch_frame(&state.relay, conn_id, &data),
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                // Handled automatically by axum
            }
            Ok(Message::Close(_)) => break,
            Err(e) => {
                warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    debug!(conn_id = %conn_id, "WebSocket client disconnected");
    state.connections.remove(conn_id);
    send_task.abort();
}

/// Decode one frame and hand it to the relay. Rejected frames get no reply.
fn dispatch_frame(relay: &EventRelay, origin: ConnectionId, bytes: &[u8]) {
    match ClientFrame::decode(bytes) {
        Ok(frame) => {
            let _ = relay.handle_wire(origin, &frame.event, frame.data);
        }
        Err(_) => relay.reject(RejectReason::MalformedPayload),
    }
}
