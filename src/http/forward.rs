//! Plain HTTP forwarding.
//!
//! The client's request is re-issued on a freshly dialed upstream connection
//! with a one-shot HTTP/1.1 client handshake; the connection is never pooled
//! and closes once the response body has been relayed (or dropped).

use std::error::Error as StdError;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::body::Body;
use hyper::client::conn::http1;
use hyper::header::{HeaderValue, HOST};
use hyper::{Request, Response, Uri, Version};
use hyper_util::rt::TokioIo;

use crate::error::ProxyError;
use crate::http::headers::copy_headers;
use crate::http::response::ProxyBody;
use crate::net::socks::UpstreamConnection;
use crate::resilience::timeouts::with_deadline;

/// Build the request sent upstream: same method and body, origin-form URI,
/// end-to-end headers only.
pub fn outbound_request<B>(request: Request<B>) -> Result<Request<B>, ProxyError> {
    let (parts, body) = request.into_parts();

    let path = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .filter(|pq| !pq.is_empty())
        .unwrap_or("/");
    let uri: Uri = path
        .parse()
        .map_err(|e| ProxyError::RequestConstruction(format!("{}: {}", path, e)))?;

    let mut outbound = Request::builder()
        .method(parts.method)
        .uri(uri)
        .version(Version::HTTP_11)
        .body(body)
        .map_err(|e| ProxyError::RequestConstruction(e.to_string()))?;

    copy_headers(&parts.headers, outbound.headers_mut());

    if !outbound.headers().contains_key(HOST) {
        if let Some(authority) = parts.uri.authority() {
            let host = HeaderValue::from_str(authority.as_str())
                .map_err(|e| ProxyError::RequestConstruction(e.to_string()))?;
            outbound.headers_mut().insert(HOST, host);
        }
    }

    Ok(outbound)
}

/// Send `request` over `upstream` and return the response to relay.
///
/// `request_timeout` bounds the wait for the response head; the body is
/// streamed afterwards without a deadline.
pub async fn forward<B>(
    request: Request<B>,
    upstream: UpstreamConnection,
    request_timeout: Option<Duration>,
) -> Result<Response<ProxyBody>, ProxyError>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let outbound = outbound_request(request)?;

    let (mut sender, connection) = http1::Builder::new()
        .title_case_headers(true)
        .handshake(TokioIo::new(upstream))
        .await
        .map_err(ProxyError::RequestWrite)?;

    // Drives the upstream connection; it ends (and closes the socket) once the
    // response body is consumed or dropped.
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::debug!(error = %e, "Upstream connection ended with error");
        }
    });

    let response = with_deadline(request_timeout, sender.send_request(outbound))
        .await
        .map_err(|_| ProxyError::Timeout)?
        .map_err(ProxyError::from_send)?;
    drop(sender);

    let (parts, body) = response.into_parts();
    let mut relayed = Response::new(body.boxed());
    *relayed.status_mut() = parts.status;
    copy_headers(&parts.headers, relayed.headers_mut());

    Ok(relayed)
}
