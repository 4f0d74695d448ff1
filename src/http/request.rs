//! Inbound request classification.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for log correlation
//! - Decide whether a request opens a tunnel or is forwarded
//! - Extract the `host:port` that must be dialed through SOCKS5
//!
//! # Design Decisions
//! - CONNECT targets are used verbatim from the authority form
//! - Forwarded requests dial the URL host, port 80 when none is given
//! - The request ID is only logged, never injected into forwarded headers

use hyper::{Method, Request, Uri};
use uuid::Uuid;

use crate::config::schema::join_host_port;
use crate::error::ProxyError;

/// Port dialed for absolute URLs without an explicit port.
pub const DEFAULT_HTTP_PORT: u16 = 80;

/// Unique identifier for one proxied request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Where a request goes and how it is handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// `CONNECT host:port`: splice raw bytes.
    Tunnel(String),
    /// Any other method: forward the HTTP message.
    Forward(String),
}

impl Target {
    /// Classify `request` and resolve its dial address.
    pub fn of<B>(request: &Request<B>) -> Result<Self, ProxyError> {
        if *request.method() == Method::CONNECT {
            tunnel_address(request.uri()).map(Target::Tunnel)
        } else {
            forward_address(request.uri()).map(Target::Forward)
        }
    }

    /// The `host:port` to dial.
    pub fn address(&self) -> &str {
        match self {
            Target::Tunnel(addr) | Target::Forward(addr) => addr,
        }
    }

    pub fn is_tunnel(&self) -> bool {
        matches!(self, Target::Tunnel(_))
    }
}

fn tunnel_address(uri: &Uri) -> Result<String, ProxyError> {
    uri.authority()
        .map(|authority| authority.as_str().to_string())
        .ok_or_else(|| ProxyError::InvalidTarget(format!("CONNECT target `{}` is not host:port", uri)))
}

fn forward_address(uri: &Uri) -> Result<String, ProxyError> {
    let host = uri
        .host()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| ProxyError::InvalidTarget(format!("request URL `{}` has no host", uri)))?;
    let port = uri.port_u16().unwrap_or(DEFAULT_HTTP_PORT);
    Ok(join_host_port(host, port))
}
