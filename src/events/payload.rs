//! Payload normalization
//!
//! A payload may reach the relay as a typed record (in-process callers), a
//! boxed record that may be missing, or an untyped JSON object off the wire.
//! Every shape is funnelled through the record's [`Normalize`] impl, so equal
//! field values always produce equal envelopes.

use super::{Envelope, NetworkMode, RejectReason};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A payload in any of the accepted shapes
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound<P> {
    /// Strongly-typed record
    Record(P),
    /// Owned record handed over by reference; `None` counts as absent
    Boxed(Option<Box<P>>),
    /// Untyped string-keyed mapping
    Map(Map<String, Value>),
    /// Anything else; always rejected
    Other(Value),
}

impl<P: DeserializeOwned> Inbound<P> {
    /// Decode wire data: typed record first, untyped mapping as fallback
    pub fn from_value(value: Value) -> Self {
        if !value.is_object() {
            return Inbound::Other(value);
        }

        match P::deserialize(&value) {
            Ok(record) => Inbound::Record(record),
            Err(_) => match value {
                Value::Object(map) => Inbound::Map(map),
                other => Inbound::Other(other),
            },
        }
    }
}

impl<P: Normalize> Inbound<P> {
    pub fn normalize(self) -> Result<Envelope, RejectReason> {
        match self {
            Inbound::Record(record) => record.normalize(),
            Inbound::Boxed(Some(record)) => (*record).normalize(),
            Inbound::Boxed(None) => Err(RejectReason::MalformedPayload),
            Inbound::Map(map) => P::from_map(map).normalize(),
            Inbound::Other(_) => Err(RejectReason::MalformedPayload),
        }
    }
}

/// One validation routine per payload record
pub trait Normalize: Sized {
    /// Build the record from an untyped mapping. Fields of the wrong JSON
    /// type are treated as empty.
    fn from_map(map: Map<String, Value>) -> Self;

    fn normalize(self) -> Result<Envelope, RejectReason>;
}

fn string_field(map: &Map<String, Value>, key: &str) -> String {
    map.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// `memo:update` and `todo:update` payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetUpdate {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub widget_id: String,
    /// Opaque widget content; only its presence is checked
    #[serde(default)]
    pub content: Option<Value>,
}

impl Normalize for WidgetUpdate {
    fn from_map(mut map: Map<String, Value>) -> Self {
        Self {
            token: string_field(&map, "token"),
            widget_id: string_field(&map, "widgetId"),
            content: map.remove("content"),
        }
    }

    fn normalize(self) -> Result<Envelope, RejectReason> {
        if self.widget_id.is_empty() {
            return Err(RejectReason::MalformedPayload);
        }

        match self.content {
            Some(content) if !content.is_null() => {
                Ok(Envelope::widget(self.token, self.widget_id, content))
            }
            _ => Err(RejectReason::MalformedPayload),
        }
    }
}

/// `network:mode` payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkModeUpdate {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub mode: String,
}

impl Normalize for NetworkModeUpdate {
    fn from_map(map: Map<String, Value>) -> Self {
        Self {
            token: string_field(&map, "token"),
            mode: string_field(&map, "mode"),
        }
    }

    fn normalize(self) -> Result<Envelope, RejectReason> {
        if self.mode.is_empty() {
            return Err(RejectReason::MalformedPayload);
        }
        self.mode.parse::<NetworkMode>()?;

        Ok(Envelope::mode(self.token, self.mode))
    }
}

/// `network:heartbeat` payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Heartbeat {
    #[serde(default)]
    pub token: String,
}

impl Normalize for Heartbeat {
    fn from_map(map: Map<String, Value>) -> Self {
        Self {
            token: string_field(&map, "token"),
        }
    }

    fn normalize(self) -> Result<Envelope, RejectReason> {
        if self.token.is_empty() {
            return Err(RejectReason::MalformedPayload);
        }

        Ok(Envelope::token_only(self.token))
    }
}
