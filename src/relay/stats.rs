//! Relay counters, exposed to operators only

use crate::events::RejectReason;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic per-outcome counters
#[derive(Debug, Default)]
pub struct RelayStats {
    dispatched: AtomicU64,
    malformed_payload: AtomicU64,
    invalid_credential: AtomicU64,
    invalid_enum_value: AtomicU64,
    unknown_event: AtomicU64,
}

/// Point-in-time copy of [`RelayStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub dispatched: u64,
    pub malformed_payload: u64,
    pub invalid_credential: u64,
    pub invalid_enum_value: u64,
    pub unknown_event: u64,
}

impl StatsSnapshot {
    pub fn rejected(&self) -> u64 {
        self.malformed_payload + self.invalid_credential + self.invalid_enum_value + self.unknown_event
    }
}

impl RelayStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_dispatch(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reject(&self, reason: RejectReason) {
        let counter = match reason {
            RejectReason::MalformedPayload => &self.malformed_payload,
            RejectReason::InvalidCredential => &self.invalid_credential,
            RejectReason::InvalidEnumValue => &self.invalid_enum_value,
            RejectReason::UnknownEvent => &self.unknown_event,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            malformed_payload: self.malformed_payload.load(Ordering::Relaxed),
            invalid_credential: self.invalid_credential.load(Ordering::Relaxed),
            invalid_enum_value: self.invalid_enum_value.load(Ordering::Relaxed),
            unknown_event: self.unknown_event.load(Ordering::Relaxed),
        }
    }
}
