//! # signal-relay
//!
//! `signal-relay` is an in-memory WebSocket signaling relay. Peers connect,
//! join a single named topic and exchange opaque payloads (typically WebRTC
//! session descriptions and ICE candidates) with the other members of that
//! topic before going peer-to-peer.
//!
//! ## Core Modules
//!
//! - `broker`: the topic registry mapping topic names to ordered subscriber lists.
//! - `session`: the server-side view of one connected client.
//! - `transport`: the wire envelope, the dispatcher, the per-connection lifecycle
//!   and the WebSocket server with its origin check.
//! - `config`: loading server configuration from file and environment.
//! - `utils`: error types and logging setup.

pub mod broker;
pub mod config;
pub mod session;
pub mod transport;
pub mod utils;
