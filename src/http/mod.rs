//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (hyper HTTP/1.1 with upgrades, trace middleware)
//!     → dispatcher.rs (classify, dial through SOCKS5)
//!         → request.rs (target host:port, request ID)
//!         → tunnel.rs (CONNECT: raw bidirectional splice)
//!         → forward.rs (other methods: re-issue upstream, relay response)
//!             → headers.rs (hop-by-hop scrubbing, both directions)
//!     → response.rs (handshake reply, error responses)
//!     → Send to client
//! ```

pub mod dispatcher;
pub mod forward;
pub mod headers;
pub mod request;
pub mod response;
pub mod server;
pub mod tunnel;

pub use dispatcher::ProxyDispatcher;
pub use headers::{copy_headers, is_hop_by_hop, HOP_BY_HOP_HEADERS};
pub use request::{RequestId, Target};
pub use server::HttpServer;
