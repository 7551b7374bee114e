//! Relay server and wire frames

use crate::auth::TokenVerifier;
use crate::config::{ConfigError, RelayConfig};
use crate::relay::{EventRelay, StatsSnapshot};
use crate::server::connections::ConnectionManager;
use crate::server::router::NamespaceRouter;
use crate::server::websocket::{create_router, WsState};

use anyhow::{Context, Result};
use axum::Router;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("frame names no event")]
    MissingEvent,

    #[error("frame must be an object or an array")]
    UnsupportedShape,
}

/// Frame from client to server
///
/// Accepted encodings:
/// - `{"event": "memo:update", "data": {...}}`
/// - `["memo:update", {...}]`
#[derive(Debug, Clone, PartialEq)]
pub struct ClientFrame {
    pub event: String,
    pub data: Value,
}

impl ClientFrame {
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        match serde_json::from_slice::<Value>(bytes)? {
            Value::Object(mut map) => {
                let event = match map.remove("event") {
                    Some(Value::String(event)) => event,
                    _ => return Err(FrameError::MissingEvent),
                };
                let data = map.remove("data").unwrap_or(Value::Null);
                Ok(Self { event, data })
            }
            Value::Array(items) => {
                let mut items = items.into_iter();
                match items.next() {
                    Some(Value::String(event)) => Ok(Self {
                        event,
                        data: items.next().unwrap_or(Value::Null),
                    }),
                    _ => Err(FrameError::MissingEvent),
                }
            }
            _ => Err(FrameError::UnsupportedShape),
        }
    }
}

/// Frame from server to client
#[derive(Debug, Serialize)]
pub struct ServerFrame<'a> {
    pub event: &'a str,
    pub data: &'a Value,
}

/// Counters served on `/stats`
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ServerStats {
    pub connections: usize,
    #[serde(flatten)]
    pub relay: StatsSnapshot,
}

/// The relay server: WebSocket endpoint plus operator routes
#[derive(Clone)]
pub struct RelayServer {
    config: Arc<RelayConfig>,
    connections: Arc<ConnectionManager>,
    relay: Arc<EventRelay>,
}

impl RelayServer {
    pub fn new(config: RelayConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let connections = Arc::new(ConnectionManager::new());
        let router = Arc::new(NamespaceRouter::new(connections.clone()));
        let relay = Arc::new(EventRelay::new(
            TokenVerifier::new(&config.token_secret),
            router,
            config.namespace.clone(),
        ));

        Ok(Self {
            config: Arc::new(config),
            connections,
            relay,
        })
    }

    /// Get connection count
    pub fn connection_count(&self) -> usize {
        self.connections.count()
    }

    pub fn stats(&self) -> ServerStats {
        ServerStats {
            connections: self.connections.count(),
            relay: self.relay.stats(),
        }
    }

    /// Build the axum application
    pub fn router(&self) -> Router {
        create_router(WsState {
            connections: self.connections.clone(),
            relay: self.relay.clone(),
            outbound_buffer: self.config.outbound_buffer,
        })
    }

    /// Bind the configured address and serve until the listener fails
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr)
            .await
            .with_context(|| format!("Failed to bind {}", self.config.bind_addr))?;

        self.serve(listener).await
    }

    /// Serve on an already bound listener
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let addr = listener.local_addr()?;
        let app = self.router();

        info!(addr = %addr, namespace = %self.config.namespace, "Relay server listening");

        axum::serve(listener, app).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_object_frame() {
        let frame = ClientFrame::decode(br#"{"event":"memo:update","data":{"widgetId":"w1"}}"#)
            .unwrap();
        assert_eq!(frame.event, "memo:update");
        assert_eq!(frame.data, json!({"widgetId": "w1"}));
    }

    #[test]
    fn test_decode_array_frame() {
        let frame = ClientFrame::decode(br#"["network:heartbeat",{"token":"t"}]"#).unwrap();
        assert_eq!(frame.event, "network:heartbeat");
        assert_eq!(frame.data, json!({"token": "t"}));
    }

    #[test]
    fn test_decode_missing_data_is_null() {
        let frame = ClientFrame::decode(br#"{"event":"network:heartbeat"}"#).unwrap();
        assert_eq!(frame.data, Value::Null);

        let frame = ClientFrame::decode(br#"["network:heartbeat"]"#).unwrap();
        assert_eq!(frame.data, Value::Null);
    }

    #[test]
    fn test_decode_invalid_frames() {
        assert!(matches!(ClientFrame::decode(b"not json"), Err(FrameError::Json(_))));
        assert!(matches!(
            ClientFrame::decode(br#"{"data":{}}"#),
            Err(FrameError::MissingEvent)
        ));
        assert!(matches!(
            ClientFrame::decode(br#"{"event":5}"#),
            Err(FrameError::MissingEvent)
        ));
        assert!(matches!(ClientFrame::decode(b"[]"), Err(FrameError::MissingEvent)));
        assert!(matches!(
            ClientFrame::decode(br#""memo:update""#),
            Err(FrameError::UnsupportedShape)
        ));
    }

    #[test]
    fn test_server_frame_encoding() {
        let data = json!({"ts": 1});
        let encoded = serde_json::to_value(ServerFrame {
            event: "network:heartbeat",
            data: &data,
        })
        .unwrap();
        assert_eq!(encoded, json!({"event": "network:heartbeat", "data": {"ts": 1}}));
    }

    #[test]
    fn test_server_rejects_invalid_config() {
        let config = RelayConfig::new("127.0.0.1:0".parse().unwrap(), "");
        assert!(matches!(RelayServer::new(config), Err(ConfigError::EmptySecret)));
    }

    #[test]
    fn test_stats_flatten() {
        let server = RelayServer::new(RelayConfig::new("127.0.0.1:0".parse().unwrap(), "s")).unwrap();
        let value = serde_json::to_value(server.stats()).unwrap();
        assert_eq!(value["connections"], 0);
        assert_eq!(value["dispatched"], 0);
        assert_eq!(value["invalid_credential"], 0);
    }
}
