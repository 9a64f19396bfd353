//! The `transport` module is responsible for everything between the socket
//! and the registry.
//!
//! It defines the envelope clients speak, the dispatcher that applies it to a
//! session, the per-connection lifecycle, the origin allow-list and the
//! WebSocket accept loop.

pub mod connection;
pub mod dispatcher;
pub mod message;
pub mod origin;
pub mod websocket;

pub use connection::handle_connection;
pub use dispatcher::Dispatcher;
pub use message::{Envelope, MessageKind, PONG_MESSAGE};
pub use origin::OriginPolicy;
pub use websocket::{serve, start_websocket_server};
