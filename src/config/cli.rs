//! Command-line overrides.
//!
//! Every flag is optional so that only the ones given on the command line
//! replace values from the config file (or the built-in defaults).

use std::path::PathBuf;

use clap::Parser;

use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::ProxyConfig;
use crate::config::validation::validate_config;

#[derive(Parser, Debug, Default)]
#[command(name = "socks-gateway")]
#[command(about = "HTTP proxy that relays every connection through a SOCKS5 server", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// SOCKS5 server hostname or IP (default: localhost)
    #[arg(long)]
    pub socks_hostname: Option<String>,

    /// SOCKS5 server port (default: 1080)
    #[arg(long)]
    pub socks_port: Option<u16>,

    /// SOCKS5 username (optional)
    #[arg(long)]
    pub socks_username: Option<String>,

    /// SOCKS5 password (optional)
    #[arg(long)]
    pub socks_password: Option<String>,

    /// IP address to listen on (default: 0.0.0.0)
    #[arg(long)]
    pub listen_ip: Option<String>,

    /// HTTP proxy server port (default: 8080)
    #[arg(long)]
    pub http_port: Option<u16>,

    /// Log filter, e.g. "debug" or "socks_gateway=trace"
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    /// Build the effective configuration: file (or defaults), then flags, then validation.
    pub fn into_config(self) -> Result<ProxyConfig, ConfigError> {
        let base = match &self.config {
            Some(path) => load_config(path)?,
            None => ProxyConfig::default(),
        };
        let config = self.apply(base);
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }

    /// Overlay the flags that were given onto `config`.
    pub fn apply(self, mut config: ProxyConfig) -> ProxyConfig {
        if let Some(hostname) = self.socks_hostname {
            config.socks.hostname = hostname;
        }
        if let Some(port) = self.socks_port {
            config.socks.port = port;
        }
        if let Some(username) = self.socks_username {
            config.socks.username = username;
        }
        if let Some(password) = self.socks_password {
            config.socks.password = password;
        }
        if let Some(ip) = self.listen_ip {
            config.listener.listen_ip = ip;
        }
        if let Some(port) = self.http_port {
            config.listener.http_port = port;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
        config
    }
}
