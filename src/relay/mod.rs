//! Event relay
//!
//! Each inbound event runs `Received -> Normalized -> Authenticated ->
//! Dispatched`, or stops at `Dropped`. A dropped event has no observable
//! effect for any client: no reply, no broadcast, no log line. The reason is
//! returned to the caller and counted in [`RelayStats`].

mod stats;

pub use stats::{RelayStats, StatsSnapshot};

use crate::auth::TokenVerifier;
use crate::channels::Namespace;
use crate::events::{EventKind, InboundEvent, NetworkMode, RejectReason};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

/// Identifies one live connection
pub type ConnectionId = Uuid;

/// Delivery primitive the relay hands accepted events to
pub trait BroadcastTransport: Send + Sync {
    /// Deliver `event` to every connection in `namespace`, the sender
    /// included. Returns how many connections it was queued for.
    fn broadcast(&self, namespace: &Namespace, event: &str, data: Value) -> usize;

    /// Deliver `event` to the single connection `origin`
    fn reply(&self, origin: ConnectionId, event: &str, data: Value) -> bool;
}

/// What an accepted event turned into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Broadcast { event: &'static str, recipients: usize },
    Reply { event: &'static str, delivered: bool },
}

pub type Outcome = Result<Dispatch, RejectReason>;

/// Validates inbound events and fans accepted ones out through the transport
pub struct EventRelay {
    verifier: TokenVerifier,
    transport: Arc<dyn BroadcastTransport>,
    namespace: Namespace,
    stats: RelayStats,
}

impl EventRelay {
    pub fn new(
        verifier: TokenVerifier,
        transport: Arc<dyn BroadcastTransport>,
        namespace: Namespace,
    ) -> Self {
        Self {
            verifier,
            transport,
            namespace,
            stats: RelayStats::new(),
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Handle one event received on connection `origin`
    pub fn handle(&self, origin: ConnectionId, event: InboundEvent) -> Outcome {
        let outcome = self.process(origin, event);
        match outcome {
            Ok(_) => self.stats.record_dispatch(),
            Err(reason) => self.stats.record_reject(reason),
        }
        outcome
    }

    /// Handle an event by its wire name and raw JSON data
    pub fn handle_wire(&self, origin: ConnectionId, name: &str, data: Value) -> Outcome {
        match InboundEvent::from_wire(name, data) {
            Ok(event) => self.handle(origin, event),
            Err(reason) => {
                self.stats.record_reject(reason);
                Err(reason)
            }
        }
    }

    /// Count a drop that happened before an event could be identified
    pub fn reject(&self, reason: RejectReason) {
        self.stats.record_reject(reason);
    }

    fn process(&self, origin: ConnectionId, event: InboundEvent) -> Outcome {
        let kind = event.kind();
        let envelope = event.normalize()?;

        let identity = self
            .verifier
            .verify(envelope.credential())
            .ok_or(RejectReason::InvalidCredential)?;

        match kind {
            EventKind::MemoUpdate | EventKind::TodoUpdate => {
                let widget_id = envelope.target().to_string();
                let content = envelope.into_body().unwrap_or(Value::Null);
                Ok(self.broadcast(
                    kind.outbound_name(),
                    json!({ "widgetId": widget_id, "content": content }),
                ))
            }
            EventKind::NetworkMode => {
                // Checked again here so a bypassed normalizer can't widen the set
                let mode: NetworkMode = envelope.network_mode().unwrap_or_default().parse()?;
                Ok(self.broadcast(
                    kind.outbound_name(),
                    json!({ "mode": mode, "username": identity.as_str() }),
                ))
            }
            EventKind::NetworkHeartbeat => {
                let event = kind.outbound_name();
                let delivered = self.transport.reply(
                    origin,
                    event,
                    json!({ "ts": Utc::now().timestamp_millis() }),
                );
                Ok(Dispatch::Reply { event, delivered })
            }
        }
    }

    fn broadcast(&self, event: &'static str, data: Value) -> Dispatch {
        let recipients = self.transport.broadcast(&self.namespace, event, data);
        Dispatch::Broadcast { event, recipients }
    }
}
