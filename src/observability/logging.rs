//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Route all diagnostic output to standard error
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level so operators can raise verbosity ad hoc
//! - The configured level may be a bare level or a full filter directive

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use tracing_subscriber::util::TryInitError;

/// Build the filter: `RUST_LOG` if set and valid, otherwise `level`.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(level: &str) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
}
