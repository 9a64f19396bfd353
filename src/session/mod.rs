//! The `session` module holds the server-side view of a connected client:
//! its identifier, its subscription state and the handle used to push frames
//! to it.

mod connection_session;
mod id;
mod outbound;

pub use connection_session::{Session, SessionState};
pub use id::{SessionId, SessionIdGenerator};
pub use outbound::{DEFAULT_OUTBOUND_CAPACITY, Outbound};
