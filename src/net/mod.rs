//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, connection limits)
//!     → connection.rs (connection ID, active count for draining)
//!     → Hand off to HTTP layer
//!
//! Outgoing connection
//!     → socks.rs (SOCKS5 handshake, optional user/pass auth)
//!     → UpstreamConnection owned by one request or tunnel
//! ```
//!
//! # Design Decisions
//! - Bounded accept queue prevents resource exhaustion
//! - Each connection tracked for graceful shutdown
//! - Upstream connections are never pooled or shared

pub mod connection;
pub mod listener;
pub mod socks;

pub use connection::{ConnectionGuard, ConnectionId, ConnectionTracker};
pub use listener::{ConnectionPermit, Listener, ListenerError};
pub use socks::{DialError, SocksDialer, UpstreamConnection};
