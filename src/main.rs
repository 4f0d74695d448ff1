//! HTTP-to-SOCKS5 Gateway
//!
//! Accepts plain HTTP proxy traffic and relays it through an upstream SOCKS5
//! server, built with Tokio and hyper.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──▶ net::listener ──▶ http::server ──▶ http::dispatcher
//!                                                     │
//!                                  CONNECT ◀──────────┴──────────▶ other methods
//!                                     │                                 │
//!                               http::tunnel                      http::forward
//!                                     │                                 │
//!                                     └──────────▶ net::socks ◀─────────┘
//!                                                      │
//!                                                      ▼
//!                                            SOCKS5 server ──▶ Target
//!
//!     Cross-cutting: config, observability, resilience (timeouts), lifecycle
//! ```

use clap::Parser;

use socks_gateway::config::Cli;
use socks_gateway::lifecycle;
use socks_gateway::observability::logging::init_logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("socks-gateway: {e}");
            std::process::exit(2);
        }
    };

    init_logging(&config.observability.log_level)?;
    tracing::info!("socks-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    if let Err(e) = lifecycle::run(config).await {
        tracing::error!(error = %e, "Gateway failed");
        return Err(e.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
