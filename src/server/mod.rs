//! Relay server implementation
//!
//! Handles WebSocket connections, namespace membership, and message fan-out.

mod connections;
mod router;
pub mod transport;
pub mod websocket;

pub use connections::{ClientConnection, ConnectionManager, OutboundMessage};
pub use router::NamespaceRouter;
pub use transport::{ClientFrame, FrameError, RelayServer, ServerFrame, ServerStats};
pub use websocket::{create_router, WsState};
