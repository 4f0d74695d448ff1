//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ProxyConfig {
    /// Client-facing HTTP listener.
    pub listener: ListenerConfig,

    /// Upstream SOCKS5 proxy every connection is relayed through.
    pub socks: SocksConfig,

    /// Optional deadlines. All disabled unless set.
    pub timeouts: TimeoutConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,

    /// Graceful shutdown settings.
    pub shutdown: ShutdownConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// IP address to listen on (e.g., "0.0.0.0").
    pub listen_ip: String,

    /// HTTP proxy port.
    pub http_port: u16,

    /// Maximum concurrent client connections (backpressure).
    pub max_connections: usize,
}

impl ListenerConfig {
    /// The `ip:port` the listener binds to. IPv6 literals are bracketed.
    pub fn bind_address(&self) -> String {
        join_host_port(&self.listen_ip, self.http_port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            listen_ip: "0.0.0.0".to_string(),
            http_port: 8080,
            max_connections: 10_000,
        }
    }
}

/// Upstream SOCKS5 server configuration.
#[derive(Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SocksConfig {
    /// SOCKS5 server hostname or IP.
    pub hostname: String,

    /// SOCKS5 server port.
    pub port: u16,

    /// Username for SOCKS5 authentication (optional).
    pub username: String,

    /// Password for SOCKS5 authentication (optional).
    pub password: String,
}

impl SocksConfig {
    /// The `host:port` of the SOCKS5 server.
    pub fn address(&self) -> String {
        join_host_port(&self.hostname, self.port)
    }

    /// Credentials are only used when both halves are present.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        if self.username.is_empty() || self.password.is_empty() {
            None
        } else {
            Some((self.username.as_str(), self.password.as_str()))
        }
    }
}

impl Default for SocksConfig {
    fn default() -> Self {
        Self {
            hostname: "localhost".to_string(),
            port: 1080,
            username: String::new(),
            password: String::new(),
        }
    }
}

// Keeps the password out of logs.
impl std::fmt::Debug for SocksConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocksConfig")
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &if self.password.is_empty() { "" } else { "<redacted>" })
            .finish()
    }
}

/// Timeout configuration. `None` means wait indefinitely.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// SOCKS5 dial (TCP connect + handshake) timeout in seconds.
    pub connect_secs: Option<u64>,

    /// Time allowed for the upstream response head after the request is sent, in seconds.
    pub request_secs: Option<u64>,

    /// Tunnel idle timeout in seconds (no bytes in either direction).
    pub idle_secs: Option<u64>,
}

impl TimeoutConfig {
    pub fn connect(&self) -> Option<Duration> {
        self.connect_secs.map(Duration::from_secs)
    }

    pub fn request(&self) -> Option<Duration> {
        self.request_secs.map(Duration::from_secs)
    }

    pub fn idle(&self) -> Option<Duration> {
        self.idle_secs.map(Duration::from_secs)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Graceful shutdown configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ShutdownConfig {
    /// How long open connections may keep running after a shutdown signal.
    pub grace_secs: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self { grace_secs: 30 }
    }
}

/// Join a host and port, bracketing IPv6 literals.
pub fn join_host_port(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}
