//! Request-scoped error kinds.
//!
//! Every failure is terminal for the request or tunnel it occurs in. Errors
//! that happen before the client has received a response map to an HTTP
//! status; relay errors happen after the tunnel is established and are only
//! logged.

use hyper::StatusCode;

use crate::net::socks::DialError;

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// The request does not name a dialable target.
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    /// Could not reach or authenticate to the target through SOCKS5.
    #[error("failed to connect to target via SOCKS5: {0}")]
    Dial(#[from] DialError),

    /// The client connection cannot be taken over for raw relaying.
    #[error("hijacking not supported")]
    HijackUnsupported,

    /// Taking over the client connection failed.
    #[error("failed to hijack connection: {0}")]
    HijackFailed(#[source] hyper::Error),

    /// The outbound request could not be built.
    #[error("failed to create request: {0}")]
    RequestConstruction(String),

    /// The outbound request could not be written upstream.
    #[error("failed to forward request: {0}")]
    RequestWrite(#[source] hyper::Error),

    /// The upstream response was malformed or never arrived.
    #[error("failed to read response: {0}")]
    ResponseRead(#[source] hyper::Error),

    /// The upstream response head did not arrive in time.
    #[error("timed out waiting for upstream response")]
    Timeout,

    /// Mid-tunnel read or write failure.
    #[error("relay I/O error: {0}")]
    Relay(#[from] std::io::Error),
}

impl ProxyError {
    /// Status code reported to the client for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::InvalidTarget(_) => StatusCode::BAD_REQUEST,
            ProxyError::Dial(_) => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::HijackUnsupported
            | ProxyError::HijackFailed(_)
            | ProxyError::RequestConstruction(_)
            | ProxyError::RequestWrite(_)
            | ProxyError::ResponseRead(_)
            | ProxyError::Relay(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short plain-text message for the client. Upstream details stay in the logs.
    pub fn client_message(&self) -> &'static str {
        match self {
            ProxyError::InvalidTarget(_) => "Request does not name a target host",
            ProxyError::Dial(_) => "Failed to connect to target via SOCKS5",
            ProxyError::HijackUnsupported => "Hijacking not supported",
            ProxyError::HijackFailed(_) => "Failed to hijack connection",
            ProxyError::RequestConstruction(_) => "Failed to create request",
            ProxyError::RequestWrite(_) => "Failed to forward request",
            ProxyError::ResponseRead(_) => "Failed to read response",
            ProxyError::Timeout => "Timed out waiting for upstream response",
            ProxyError::Relay(_) => "Relay failed",
        }
    }

    /// Classify a failed `send_request` on the upstream connection.
    ///
    /// hyper performs the write and the response read in one call; parse
    /// failures and connections closed before a full response mean the read
    /// side failed, anything else is attributed to the write.
    pub fn from_send(err: hyper::Error) -> Self {
        if err.is_parse() || err.is_parse_status() || err.is_incomplete_message() {
            ProxyError::ResponseRead(err)
        } else {
            ProxyError::RequestWrite(err)
        }
    }
}
