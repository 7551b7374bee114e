//! Connection state management

use crate::channels::Namespace;
use crate::relay::ConnectionId;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Serialized frame queued for one client
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub event: String,
    pub frame: Arc<String>,
}

/// A connected client
pub struct ClientConnection {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Namespace this connection joined
    pub namespace: Namespace,
    /// Queue drained by the connection's writer task
    tx: mpsc::Sender<OutboundMessage>,
}

impl ClientConnection {
    pub fn new(namespace: Namespace, tx: mpsc::Sender<OutboundMessage>) -> Self {
        Self {
            id: Uuid::new_v4(),
            namespace,
            tx,
        }
    }

    /// Queue a message without waiting; fails if the queue is full or the
    /// writer has gone away.
    pub fn send(&self, msg: OutboundMessage) -> Result<(), mpsc::error::TrySendError<OutboundMessage>> {
        self.tx.try_send(msg)
    }
}

/// Manages all active connections
#[derive(Clone, Default)]
pub struct ConnectionManager {
    connections: Arc<DashMap<ConnectionId, Arc<ClientConnection>>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection
    pub fn add(&self, conn: Arc<ClientConnection>) {
        self.connections.insert(conn.id, conn);
    }

    /// Remove a connection
    pub fn remove(&self, id: ConnectionId) -> Option<Arc<ClientConnection>> {
        self.connections.remove(&id).map(|(_, conn)| conn)
    }

    /// Get a connection by ID
    pub fn get(&self, id: ConnectionId) -> Option<Arc<ClientConnection>> {
        self.connections.get(&id).map(|r| r.clone())
    }

    /// All connections that joined `namespace`
    pub fn in_namespace(&self, namespace: &Namespace) -> Vec<Arc<ClientConnection>> {
        self.connections
            .iter()
            .filter(|entry| &entry.value().namespace == namespace)
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Get total connection count
    pub fn count(&self) -> usize {
        self.connections.len()
    }
}
