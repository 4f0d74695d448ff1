//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): forwarded requests by method, status
//! - `proxy_request_duration_seconds` (histogram): time to response head
//! - `proxy_dial_failures_total` (counter): SOCKS5 dial failures by kind (tunnel/forward)
//! - `proxy_tunnels_active` (gauge): open CONNECT tunnels
//! - `proxy_tunnel_bytes_total` (counter): tunnel bytes by direction
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("proxy_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_dial_failure(kind: &'static str) {
    metrics::counter!("proxy_dial_failures_total", "kind" => kind).increment(1);
}

pub fn tunnel_opened() {
    metrics::gauge!("proxy_tunnels_active").increment(1.0);
}

pub fn tunnel_closed(client_to_upstream: u64, upstream_to_client: u64) {
    metrics::gauge!("proxy_tunnels_active").decrement(1.0);
    metrics::counter!("proxy_tunnel_bytes_total", "direction" => "client_to_upstream")
        .increment(client_to_upstream);
    metrics::counter!("proxy_tunnel_bytes_total", "direction" => "upstream_to_client")
        .increment(upstream_to_client);
}
