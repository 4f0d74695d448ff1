//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Accept client connections from the bounded listener
//! - Serve each connection with hyper's HTTP/1.1 server, upgrades enabled
//! - Wire up middleware (request tracing)
//! - Hand every request to the dispatcher
//! - Stop accepting on shutdown and drain open connections and tunnels

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::Request;
use hyper_util::rt::TokioIo;
use hyper_util::service::TowerToHyperService;
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::Instrument;

use crate::config::ProxyConfig;
use crate::http::dispatcher::ProxyDispatcher;
use crate::lifecycle::Shutdown;
use crate::net::connection::{ConnectionGuard, ConnectionTracker};
use crate::net::listener::{ConnectionPermit, Listener, ListenerError};
use crate::net::socks::SocksDialer;

/// HTTP proxy server.
pub struct HttpServer {
    dispatcher: Arc<ProxyDispatcher>,
    tracker: ConnectionTracker,
    grace: Duration,
}

impl HttpServer {
    /// Create a server relaying through `dialer`.
    pub fn new(config: &ProxyConfig, dialer: SocksDialer) -> Self {
        let tracker = ConnectionTracker::new();
        let dispatcher = Arc::new(ProxyDispatcher::new(
            dialer,
            &config.timeouts,
            tracker.clone(),
        ));
        Self {
            dispatcher,
            tracker,
            grace: Duration::from_secs(config.shutdown.grace_secs),
        }
    }

    /// Tracker counting open client connections and tunnels.
    pub fn tracker(&self) -> &ConnectionTracker {
        &self.tracker
    }

    /// Run the server until `shutdown` fires, then drain.
    pub async fn run(self, listener: Listener, shutdown: Shutdown) -> Result<(), ListenerError> {
        let addr = listener.local_addr().map_err(ListenerError::Bind)?;
        tracing::info!(address = %addr, "HTTP proxy server starting");

        let mut stop = shutdown.subscribe();
        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer, permit)) => self.spawn_connection(stream, peer, permit, &shutdown),
                    Err(e) => {
                        // Transient (e.g. EMFILE); back off briefly instead of spinning.
                        tracing::error!(error = %e, "Accept failed");
                        tokio::time::sleep(Duration::from_millis(100)).await;
                    }
                },
                _ = stop.recv() => {
                    tracing::info!("Shutdown signal received, no longer accepting connections");
                    break;
                }
            }
        }
        drop(listener);

        let active = self.tracker.active_count();
        if active > 0 {
            tracing::info!(active, grace_secs = self.grace.as_secs(), "Draining connections");
        }
        let remaining = self.tracker.drain(self.grace).await;
        if remaining > 0 {
            tracing::warn!(remaining, "Grace period over, closing remaining connections");
        }

        tracing::info!("HTTP proxy server stopped");
        Ok(())
    }

    fn spawn_connection(
        &self,
        stream: TcpStream,
        peer: SocketAddr,
        permit: ConnectionPermit,
        shutdown: &Shutdown,
    ) {
        let guard = self.tracker.track();
        let span = tracing::info_span!("connection", connection_id = %guard.id(), %peer);
        let dispatcher = Arc::clone(&self.dispatcher);
        let stop = shutdown.subscribe();

        tokio::spawn(serve_connection(stream, dispatcher, guard, permit, stop).instrument(span));
    }
}

/// Server-side HTTP/1.1 options.
///
/// No automatic `Date` header: CONNECT replies must be exactly the status line.
pub fn connection_builder() -> http1::Builder {
    let mut builder = http1::Builder::new();
    builder.title_case_headers(true).auto_date_header(false);
    builder
}

async fn serve_connection(
    stream: TcpStream,
    dispatcher: Arc<ProxyDispatcher>,
    _guard: ConnectionGuard,
    _permit: ConnectionPermit,
    mut stop: broadcast::Receiver<()>,
) {
    let service = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .service_fn(move |request: Request<Incoming>| {
            let dispatcher = Arc::clone(&dispatcher);
            async move { Ok::<_, Infallible>(dispatcher.dispatch(request).await) }
        });

    let builder = connection_builder();
    let connection = builder
        .serve_connection(TokioIo::new(stream), TowerToHyperService::new(service))
        .with_upgrades();
    tokio::pin!(connection);

    let mut draining = false;
    loop {
        tokio::select! {
            result = connection.as_mut() => {
                if let Err(e) = result {
                    tracing::debug!(error = %e, "Connection ended with error");
                }
                break;
            }
            _ = stop.recv(), if !draining => {
                // Finish the in-flight request, then close.
                draining = true;
                connection.as_mut().graceful_shutdown();
            }
        }
    }
}
