//! SOCKS5 upstream dialer.
//!
//! # Responsibilities
//! - Open a TCP connection to a target `host:port` through the SOCKS5 server
//! - Authenticate with username/password only when both are configured
//! - Bound the whole dial with the optional connect timeout
//!
//! # Design Decisions
//! - Built once at startup and shared by every task; holds no mutable state
//! - Target hostnames are resolved by the SOCKS5 server, never locally
//! - Failures are returned to the caller; the dialer never retries

use std::time::Duration;

use tokio::net::TcpStream;
use tokio_socks::tcp::Socks5Stream;

use crate::config::SocksConfig;

/// A live connection to a target, established through SOCKS5.
pub type UpstreamConnection = TcpStream;

/// Error type for dial operations.
#[derive(Debug, thiserror::Error)]
pub enum DialError {
    /// Handshake, authentication or target connection failed.
    #[error("SOCKS5 dial to {target} failed: {source}")]
    Socks {
        target: String,
        #[source]
        source: tokio_socks::Error,
    },

    /// The dial did not complete within the connect timeout.
    #[error("SOCKS5 dial timed out after {0:?}")]
    Timeout(Duration),
}

/// Error type for dialer construction.
#[derive(Debug, thiserror::Error)]
pub enum DialerConfigError {
    #[error("SOCKS5 hostname must not be empty")]
    EmptyHostname,

    #[error("SOCKS5 port must be non-zero")]
    ZeroPort,
}

#[derive(Clone)]
struct Credentials {
    username: String,
    password: String,
}

/// Dials targets through a single upstream SOCKS5 server.
#[derive(Clone)]
pub struct SocksDialer {
    proxy_addr: String,
    credentials: Option<Credentials>,
    connect_timeout: Option<Duration>,
}

impl SocksDialer {
    /// Create a dialer for the configured SOCKS5 server.
    pub fn new(
        config: &SocksConfig,
        connect_timeout: Option<Duration>,
    ) -> Result<Self, DialerConfigError> {
        if config.hostname.trim().is_empty() {
            return Err(DialerConfigError::EmptyHostname);
        }
        if config.port == 0 {
            return Err(DialerConfigError::ZeroPort);
        }

        let credentials = config.credentials().map(|(username, password)| Credentials {
            username: username.to_string(),
            password: password.to_string(),
        });

        Ok(Self {
            proxy_addr: config.address(),
            credentials,
            connect_timeout,
        })
    }

    /// Address of the SOCKS5 server.
    pub fn proxy_addr(&self) -> &str {
        &self.proxy_addr
    }

    /// Whether dials authenticate with username/password.
    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    /// Connect to `target` (`host:port`) through the SOCKS5 server.
    pub async fn dial(&self, target: &str) -> Result<UpstreamConnection, DialError> {
        match self.connect_timeout {
            Some(limit) => tokio::time::timeout(limit, self.handshake(target))
                .await
                .map_err(|_| DialError::Timeout(limit))?,
            None => self.handshake(target).await,
        }
    }

    async fn handshake(&self, target: &str) -> Result<UpstreamConnection, DialError> {
        let proxy = self.proxy_addr.as_str();
        let stream = match &self.credentials {
            Some(creds) => {
                Socks5Stream::connect_with_password(
                    proxy,
                    target.to_string(),
                    &creds.username,
                    &creds.password,
                )
                .await
            }
            None => Socks5Stream::connect(proxy, target.to_string()).await,
        }
        .map_err(|source| DialError::Socks {
            target: target.to_string(),
            source,
        })?;

        tracing::trace!(
            target_addr = %target,
            proxy = %self.proxy_addr,
            "SOCKS5 connection established"
        );

        Ok(stream.into_inner())
    }
}

impl std::fmt::Debug for SocksDialer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocksDialer")
            .field("proxy_addr", &self.proxy_addr)
            .field("authenticated", &self.credentials.is_some())
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}
