//! Widget event names, the canonical envelope and reject reasons
//!
//! Inbound events:
//! - `memo:update` / `todo:update`: `{token, widgetId, content}`
//! - `network:mode`: `{token, mode}` with mode one of auto, lan, wan, latency
//! - `network:heartbeat`: `{token}`

mod payload;

pub use payload::{Heartbeat, Inbound, NetworkModeUpdate, Normalize, WidgetUpdate};

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const MEMO_UPDATE: &str = "memo:update";
pub const MEMO_UPDATED: &str = "memo:updated";
pub const TODO_UPDATE: &str = "todo:update";
pub const TODO_UPDATED: &str = "todo:updated";
pub const NETWORK_MODE: &str = "network:mode";
pub const NETWORK_HEARTBEAT: &str = "network:heartbeat";

/// Why an event was dropped. Never sent to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum RejectReason {
    #[error("malformed payload")]
    MalformedPayload,

    #[error("invalid credential")]
    InvalidCredential,

    #[error("invalid enum value")]
    InvalidEnumValue,

    #[error("unknown event")]
    UnknownEvent,
}

/// The inbound event kinds the relay understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    MemoUpdate,
    TodoUpdate,
    NetworkMode,
    NetworkHeartbeat,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::MemoUpdate,
        EventKind::TodoUpdate,
        EventKind::NetworkMode,
        EventKind::NetworkHeartbeat,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            MEMO_UPDATE => Some(EventKind::MemoUpdate),
            TODO_UPDATE => Some(EventKind::TodoUpdate),
            NETWORK_MODE => Some(EventKind::NetworkMode),
            NETWORK_HEARTBEAT => Some(EventKind::NetworkHeartbeat),
            _ => None,
        }
    }

    /// Inbound event name
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::MemoUpdate => MEMO_UPDATE,
            EventKind::TodoUpdate => TODO_UPDATE,
            EventKind::NetworkMode => NETWORK_MODE,
            EventKind::NetworkHeartbeat => NETWORK_HEARTBEAT,
        }
    }

    /// Name of the event sent out once this one is accepted
    pub fn outbound_name(&self) -> &'static str {
        match self {
            EventKind::MemoUpdate => MEMO_UPDATED,
            EventKind::TodoUpdate => TODO_UPDATED,
            EventKind::NetworkMode => NETWORK_MODE,
            EventKind::NetworkHeartbeat => NETWORK_HEARTBEAT,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Network mode shown by the dashboard's indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkMode {
    Auto,
    Lan,
    Wan,
    Latency,
}

impl NetworkMode {
    pub const ALL: [NetworkMode; 4] = [
        NetworkMode::Auto,
        NetworkMode::Lan,
        NetworkMode::Wan,
        NetworkMode::Latency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkMode::Auto => "auto",
            NetworkMode::Lan => "lan",
            NetworkMode::Wan => "wan",
            NetworkMode::Latency => "latency",
        }
    }
}

impl FromStr for NetworkMode {
    type Err = RejectReason;

    /// Exact, case-sensitive match
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(NetworkMode::Auto),
            "lan" => Ok(NetworkMode::Lan),
            "wan" => Ok(NetworkMode::Wan),
            "latency" => Ok(NetworkMode::Latency),
            _ => Err(RejectReason::InvalidEnumValue),
        }
    }
}

impl fmt::Display for NetworkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Canonical form of one inbound event, built by the normalizer and
/// consumed once by the relay.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    credential: String,
    target: String,
    mode: Option<String>,
    body: Option<Value>,
}

impl Envelope {
    pub(crate) fn widget(credential: String, widget_id: String, content: Value) -> Self {
        Self {
            credential,
            target: widget_id,
            mode: None,
            body: Some(content),
        }
    }

    pub(crate) fn mode(credential: String, mode: String) -> Self {
        Self {
            credential,
            target: String::new(),
            mode: Some(mode),
            body: None,
        }
    }

    pub(crate) fn token_only(credential: String) -> Self {
        Self {
            credential,
            target: String::new(),
            mode: None,
            body: None,
        }
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }

    /// Widget id, empty for events that address no widget
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn network_mode(&self) -> Option<&str> {
        self.mode.as_deref()
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn into_body(self) -> Option<Value> {
        self.body
    }
}

/// An inbound event paired with its payload in whatever shape it arrived
#[derive(Debug, Clone)]
pub enum InboundEvent {
    MemoUpdate(Inbound<WidgetUpdate>),
    TodoUpdate(Inbound<WidgetUpdate>),
    NetworkMode(Inbound<NetworkModeUpdate>),
    NetworkHeartbeat(Inbound<Heartbeat>),
}

impl InboundEvent {
    /// Pair a wire event name with its decoded JSON data
    pub fn from_wire(name: &str, data: Value) -> Result<Self, RejectReason> {
        let kind = EventKind::from_name(name).ok_or(RejectReason::UnknownEvent)?;

        Ok(match kind {
            EventKind::MemoUpdate => InboundEvent::MemoUpdate(Inbound::from_value(data)),
            EventKind::TodoUpdate => InboundEvent::TodoUpdate(Inbound::from_value(data)),
            EventKind::NetworkMode => InboundEvent::NetworkMode(Inbound::from_value(data)),
            EventKind::NetworkHeartbeat => {
                InboundEvent::NetworkHeartbeat(Inbound::from_value(data))
            }
        })
    }

    pub fn kind(&self) -> EventKind {
        match self {
            InboundEvent::MemoUpdate(_) => EventKind::MemoUpdate,
            InboundEvent::TodoUpdate(_) => EventKind::TodoUpdate,
            InboundEvent::NetworkMode(_) => EventKind::NetworkMode,
            InboundEvent::NetworkHeartbeat(_) => EventKind::NetworkHeartbeat,
        }
    }

    pub fn normalize(self) -> Result<Envelope, RejectReason> {
        match self {
            InboundEvent::MemoUpdate(p) | InboundEvent::TodoUpdate(p) => p.normalize(),
            InboundEvent::NetworkMode(p) => p.normalize(),
            InboundEvent::NetworkHeartbeat(p) => p.normalize(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_names_round_trip() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(EventKind::from_name("memo:updated"), None);
        assert_eq!(EventKind::from_name(""), None);
    }

    #[test]
    fn test_outbound_names() {
        assert_eq!(EventKind::MemoUpdate.outbound_name(), "memo:updated");
        assert_eq!(EventKind::TodoUpdate.outbound_name(), "todo:updated");
        assert_eq!(EventKind::NetworkMode.outbound_name(), "network:mode");
        assert_eq!(EventKind::NetworkHeartbeat.outbound_name(), "network:heartbeat");
    }

    #[test]
    fn test_network_mode_parse() {
        for mode in NetworkMode::ALL {
            assert_eq!(mode.as_str().parse::<NetworkMode>(), Ok(mode));
        }
        assert_eq!("invalid".parse::<NetworkMode>(), Err(RejectReason::InvalidEnumValue));
        assert_eq!("LAN".parse::<NetworkMode>(), Err(RejectReason::InvalidEnumValue));
        assert_eq!("".parse::<NetworkMode>(), Err(RejectReason::InvalidEnumValue));
    }

    #[test]
    fn test_network_mode_serializes_lowercase() {
        assert_eq!(serde_json::to_value(NetworkMode::Latency).unwrap(), json!("latency"));
    }

    #[test]
    fn test_from_wire_unknown_event() {
        let result = InboundEvent::from_wire("chat:message", json!({"token": "t"}));
        assert!(matches!(result, Err(RejectReason::UnknownEvent)));
    }

    #[test]
    fn test_from_wire_kinds() {
        let event = InboundEvent::from_wire(TODO_UPDATE, json!({})).unwrap();
        assert_eq!(event.kind(), EventKind::TodoUpdate);

        let event = InboundEvent::from_wire(NETWORK_HEARTBEAT, Value::Null).unwrap();
        assert_eq!(event.kind(), EventKind::NetworkHeartbeat);
    }
}
