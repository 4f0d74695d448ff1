//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize the metrics exporter when enabled
//! - Build the SOCKS5 dialer from configuration
//! - Bind the listener and begin accepting traffic
//! - Wire OS signals to graceful shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listener starts last (traffic only when ready)

use std::net::SocketAddr;

use crate::config::ProxyConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::net::listener::{Listener, ListenerError};
use crate::net::socks::{DialerConfigError, SocksDialer};
use crate::observability::metrics;

/// Error type for startup failures.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid SOCKS5 configuration: {0}")]
    Dialer(#[from] DialerConfigError),

    #[error("invalid metrics address {0}")]
    MetricsAddress(String),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error(transparent)]
    Listener(#[from] ListenerError),
}

/// Start the gateway and run it until a shutdown signal arrives.
pub async fn run(config: ProxyConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let dialer = SocksDialer::new(&config.socks, config.timeouts.connect())?;
    let listener = Listener::bind(&config.listener).await?;

    tracing::info!(
        "Starting HTTP proxy on {} forwarding to SOCKS5 server {}",
        config.listener.bind_address(),
        dialer.proxy_addr(),
    );
    tracing::info!(
        authenticated = dialer.is_authenticated(),
        max_connections = config.listener.max_connections,
        connect_timeout_secs = ?config.timeouts.connect_secs,
        request_timeout_secs = ?config.timeouts.request_secs,
        idle_timeout_secs = ?config.timeouts.idle_secs,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = signals::wait_for_signal().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signals");
            return;
        }
        trigger.trigger();
    });

    HttpServer::new(&config, dialer).run(listener, shutdown).await?;
    Ok(())
}
