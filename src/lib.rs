//! Dashbus - authenticated event relay for collaborative dashboards
//!
//! Clients push widget updates (memos, todo lists) and network-mode changes
//! over a WebSocket. Each event carries a signed bearer token; valid events
//! are re-broadcast to every connected peer, invalid ones vanish silently.

pub mod auth;
pub mod channels;
pub mod config;
pub mod events;
pub mod relay;
pub mod server;

pub use auth::{Identity, TokenIssuer, TokenVerifier};
pub use channels::Namespace;
pub use config::RelayConfig;
pub use events::{Envelope, EventKind, InboundEvent, NetworkMode, RejectReason};
pub use relay::{BroadcastTransport, Dispatch, EventRelay, Outcome};
pub use server::RelayServer;
