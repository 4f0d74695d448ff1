//! Request dispatch.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → Target::of (CONNECT → tunnel, anything else → forward)
//!     → SocksDialer::dial (503 on failure, no fallback)
//!     → tunnel: take the upgrade, reply 200 Connection Established, splice
//!     → forward: re-issue request upstream, relay response
//! ```

use std::error::Error as StdError;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use hyper::body::Body;
use hyper::upgrade::OnUpgrade;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use tracing::Instrument;

use crate::config::TimeoutConfig;
use crate::error::ProxyError;
use crate::http::request::{RequestId, Target};
use crate::http::response::{connection_established, error_response, ProxyBody};
use crate::http::{forward, tunnel};
use crate::net::connection::ConnectionTracker;
use crate::net::socks::{SocksDialer, UpstreamConnection};
use crate::observability::metrics;

/// Front door for every inbound request.
///
/// Holds only read-only state, so one instance is shared by all connections.
#[derive(Debug)]
pub struct ProxyDispatcher {
    dialer: SocksDialer,
    tracker: ConnectionTracker,
    request_timeout: Option<Duration>,
    idle_timeout: Option<Duration>,
}

impl ProxyDispatcher {
    pub fn new(dialer: SocksDialer, timeouts: &TimeoutConfig, tracker: ConnectionTracker) -> Self {
        Self {
            dialer,
            tracker,
            request_timeout: timeouts.request(),
            idle_timeout: timeouts.idle(),
        }
    }

    /// Handle one request. Failures become plain-text error responses.
    pub async fn dispatch<B>(self: Arc<Self>, request: Request<B>) -> Response<ProxyBody>
    where
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: Into<Box<dyn StdError + Send + Sync>>,
    {
        let start = Instant::now();
        let method = request.method().clone();
        let request_id = RequestId::new();

        let target = match Target::of(&request) {
            Ok(target) => target,
            Err(e) => {
                tracing::warn!(%request_id, %method, uri = %request.uri(), error = %e, "Rejecting request");
                return error_response(&e);
            }
        };

        let span = tracing::info_span!(
            "request",
            %request_id,
            %method,
            target = %target.address(),
        );

        let response = async {
            let result = match &target {
                Target::Tunnel(addr) => self.connect(request, addr).await,
                Target::Forward(addr) => self.forward(request, addr).await,
            };
            result.unwrap_or_else(|e| {
                tracing::warn!(error = %e, status = %e.status(), "Request failed");
                error_response(&e)
            })
        }
        .instrument(span)
        .await;

        if !target.is_tunnel() {
            metrics::record_request(method.as_str(), response.status().as_u16(), start);
        }
        response
    }

    async fn dial(&self, addr: &str, kind: &'static str) -> Result<UpstreamConnection, ProxyError> {
        self.dialer.dial(addr).await.map_err(|e| {
            metrics::record_dial_failure(kind);
            ProxyError::Dial(e)
        })
    }

    /// CONNECT: dial, take over the client connection, then splice.
    async fn connect<B>(
        &self,
        mut request: Request<B>,
        addr: &str,
    ) -> Result<Response<ProxyBody>, ProxyError> {
        let upstream = self.dial(addr, "tunnel").await?;

        let on_upgrade = request
            .extensions_mut()
            .remove::<OnUpgrade>()
            .ok_or(ProxyError::HijackUnsupported)?;

        let idle = self.idle_timeout;
        let guard = self.tracker.track();
        tokio::spawn(
            async move {
                let _guard = guard;
                let client = match on_upgrade.await {
                    Ok(upgraded) => TokioIo::new(upgraded),
                    Err(e) => {
                        let e = ProxyError::HijackFailed(e);
                        tracing::warn!(error = %e, "Tunnel not established");
                        return;
                    }
                };

                metrics::tunnel_opened();
                tracing::debug!("Tunnel established");
                let stats = tunnel::relay(client, upstream, idle).await;
                metrics::tunnel_closed(stats.client_to_upstream, stats.upstream_to_client);

                match stats.result {
                    Ok(()) => tracing::debug!(
                        client_to_upstream = stats.client_to_upstream,
                        upstream_to_client = stats.upstream_to_client,
                        closed_by = %stats.finished_first,
                        "Tunnel closed"
                    ),
                    Err(e) => tracing::debug!(
                        client_to_upstream = stats.client_to_upstream,
                        upstream_to_client = stats.upstream_to_client,
                        closed_by = %stats.finished_first,
                        error = %ProxyError::Relay(e),
                        "Tunnel closed"
                    ),
                }
            }
            .in_current_span(),
        );

        Ok(connection_established())
    }

    /// Everything else: dial, forward, relay the response.
    async fn forward<B>(
        &self,
        request: Request<B>,
        addr: &str,
    ) -> Result<Response<ProxyBody>, ProxyError>
    where
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: Into<Box<dyn StdError + Send + Sync>>,
    {
        let upstream = self.dial(addr, "forward").await?;
        let response = forward::forward(request, upstream, self.request_timeout).await?;
        tracing::debug!(status = %response.status(), "Response relayed");
        Ok(response)
    }
}
