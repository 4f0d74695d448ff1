//! Response construction.
//!
//! # Responsibilities
//! - Build the CONNECT handshake reply
//! - Map request errors to plain-text HTTP error responses
//! - Provide the boxed body type shared by every response
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - Error bodies are short plain text; details go to the log

use bytes::Bytes;
use http_body_util::{combinators::BoxBody, BodyExt, Empty, Full};
use hyper::ext::ReasonPhrase;
use hyper::header::{HeaderValue, CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS};
use hyper::{Response, StatusCode};

use crate::error::ProxyError;

/// Body type of every response the gateway produces.
pub type ProxyBody = BoxBody<Bytes, hyper::Error>;

/// Reason phrase of the CONNECT handshake reply.
pub const CONNECTION_ESTABLISHED: &[u8] = b"Connection Established";

/// `HTTP/1.1 200 Connection Established` with no headers and no body.
pub fn connection_established() -> Response<ProxyBody> {
    let mut response = Response::new(empty());
    response
        .extensions_mut()
        .insert(ReasonPhrase::from_static(CONNECTION_ESTABLISHED));
    response
}

/// Plain-text error response for `err`.
pub fn error_response(err: &ProxyError) -> Response<ProxyBody> {
    text_response(err.status(), err.client_message())
}

/// Plain-text response with the given status.
pub fn text_response(status: StatusCode, message: &str) -> Response<ProxyBody> {
    let mut response = Response::new(full(format!("{}\n", message)));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    response
}

pub fn empty() -> ProxyBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed()
}

pub fn full<T: Into<Bytes>>(chunk: T) -> ProxyBody {
    Full::new(chunk.into())
        .map_err(|never| match never {})
        .boxed()
}
