//! Namespace routing and message fan-out

use crate::channels::Namespace;
use crate::relay::{BroadcastTransport, ConnectionId};
use crate::server::connections::{ConnectionManager, OutboundMessage};
use crate::server::transport::ServerFrame;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Delivers relay output to connected clients
#[derive(Clone)]
pub struct NamespaceRouter {
    connections: Arc<ConnectionManager>,
}

impl NamespaceRouter {
    pub fn new(connections: Arc<ConnectionManager>) -> Self {
        Self { connections }
    }

    fn encode(event: &str, data: &Value) -> Option<OutboundMessage> {
        match serde_json::to_string(&ServerFrame { event, data }) {
            Ok(frame) => Some(OutboundMessage {
                event: event.to_string(),
                frame: Arc::new(frame),
            }),
            Err(e) => {
                warn!(event = event, error = %e, "Failed to serialize frame");
                None
            }
        }
    }

    /// Get the number of active connections
    pub fn connection_count(&self) -> usize {
        self.connections.count()
    }
}

impl BroadcastTransport for NamespaceRouter {
    fn broadcast(&self, namespace: &Namespace, event: &str, data: Value) -> usize {
        let subscribers = self.connections.in_namespace(namespace);

        if subscribers.is_empty() {
            debug!(namespace = %namespace, event = event, "No connections in namespace");
            return 0;
        }

        let Some(msg) = Self::encode(event, &data) else {
            return 0;
        };

        let mut delivered = 0;
        for subscriber in &subscribers {
            match subscriber.send(msg.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    // Expected during rapid disconnect or for slow readers
                    debug!(
                        conn_id = %subscriber.id,
                        error = %e,
                        "Failed to queue message (buffer full or disconnected)"
                    );
                }
            }
        }

        debug!(
            namespace = %namespace,
            event = event,
            subscriber_count = subscribers.len(),
            delivered,
            "Broadcast event"
        );

        delivered
    }

    fn reply(&self, origin: ConnectionId, event: &str, data: Value) -> bool {
        let Some(conn) = self.connections.get(origin) else {
            debug!(conn_id = %origin, "Reply target is gone");
            return false;
        };

        let Some(msg) = Self::encode(event, &data) else {
            return false;
        };

        match conn.send(msg) {
            Ok(()) => true,
            Err(e) => {
                debug!(conn_id = %origin, error = %e, "Failed to queue reply");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::connections::ClientConnection;
    use serde_json::json;
    use tokio::sync::mpsc;

    fn connect(
        connections: &ConnectionManager,
        namespace: Namespace,
    ) -> (ConnectionId, mpsc::Receiver<OutboundMessage>) {
        let (tx, rx) = mpsc::channel(8);
        let conn = Arc::new(ClientConnection::new(namespace, tx));
        let id = conn.id;
        connections.add(conn);
        (id, rx)
    }

    #[test]
    fn test_broadcast_reaches_namespace_only() {
        let connections = Arc::new(ConnectionManager::new());
        let router = NamespaceRouter::new(connections.clone());
        let team: Namespace = "/team".parse().unwrap();

        let (_, mut a) = connect(&connections, Namespace::root());
        let (_, mut b) = connect(&connections, Namespace::root());
        let (_, mut c) = connect(&connections, team);

        let n = router.broadcast(&Namespace::root(), "memo:updated", json!({"widgetId": "w1"}));
        assert_eq!(n, 2);

        for rx in [&mut a, &mut b] {
            let msg = rx.try_recv().unwrap();
            assert_eq!(msg.event, "memo:updated");
            let frame: Value = serde_json::from_str(&msg.frame).unwrap();
            assert_eq!(frame, json!({"event": "memo:updated", "data": {"widgetId": "w1"}}));
        }
        assert!(c.try_recv().is_err());
    }

    #[test]
    fn test_broadcast_empty_namespace() {
        let router = NamespaceRouter::new(Arc::new(ConnectionManager::new()));
        assert_eq!(router.broadcast(&Namespace::root(), "todo:updated", json!({})), 0);
    }

    #[test]
    fn test_reply_targets_single_connection() {
        let connections = Arc::new(ConnectionManager::new());
        let router = NamespaceRouter::new(connections.clone());

        let (origin, mut a) = connect(&connections, Namespace::root());
        let (_, mut b) = connect(&connections, Namespace::root());

        assert!(router.reply(origin, "network:heartbeat", json!({"ts": 1})));
        assert_eq!(a.try_recv().unwrap().event, "network:heartbeat");
        assert!(b.try_recv().is_err());
    }

    #[test]
    fn test_reply_to_unknown_connection() {
        let router = NamespaceRouter::new(Arc::new(ConnectionManager::new()));
        assert!(!router.reply(uuid::Uuid::new_v4(), "network:heartbeat", json!({})));
    }
}
