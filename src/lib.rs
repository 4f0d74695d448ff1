//! HTTP-to-SOCKS5 Gateway Library
//!
//! An HTTP/1.1 forward proxy that relays every client request through a
//! single upstream SOCKS5 server.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod resilience;

pub use config::schema::ProxyConfig;
pub use error::ProxyError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use net::SocksDialer;
