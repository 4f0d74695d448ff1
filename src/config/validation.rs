//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid)
//! - Validate addresses (listen IP, metrics address)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::{IpAddr, SocketAddr};

use crate::config::schema::ProxyConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.listen_ip `{0}` is not an IP address")]
    ListenIp(String),

    #[error("listener.http_port must be non-zero")]
    HttpPort,

    #[error("listener.max_connections must be at least 1")]
    MaxConnections,

    #[error("socks.hostname must not be empty")]
    SocksHostname,

    #[error("socks.port must be non-zero")]
    SocksPort,

    #[error("timeouts.{0} must be greater than zero when set")]
    ZeroTimeout(&'static str),

    #[error("observability.metrics_address `{0}` is not a socket address")]
    MetricsAddress(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.listen_ip.parse::<IpAddr>().is_err() {
        errors.push(ValidationError::ListenIp(config.listener.listen_ip.clone()));
    }
    if config.listener.http_port == 0 {
        errors.push(ValidationError::HttpPort);
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::MaxConnections);
    }

    if config.socks.hostname.trim().is_empty() {
        errors.push(ValidationError::SocksHostname);
    }
    if config.socks.port == 0 {
        errors.push(ValidationError::SocksPort);
    }

    let timeouts = [
        ("connect_secs", config.timeouts.connect_secs),
        ("request_secs", config.timeouts.request_secs),
        ("idle_secs", config.timeouts.idle_secs),
    ];
    for (name, value) in timeouts {
        if value == Some(0) {
            errors.push(ValidationError::ZeroTimeout(name));
        }
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    // Half-configured credentials are legal but almost certainly a mistake.
    let socks = &config.socks;
    if socks.username.is_empty() != socks.password.is_empty() {
        tracing::warn!(
            "Only one of socks username/password is set; using unauthenticated SOCKS5"
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
