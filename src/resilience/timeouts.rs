//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap upstream calls with an optional deadline
//! - Track tunnel activity so idle tunnels can be torn down
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Every deadline is optional; `None` waits forever
//! - Timeout errors are distinct from other errors

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;

pub use tokio::time::error::Elapsed;

/// Await `fut`, failing with [`Elapsed`] if `limit` is set and passes first.
pub async fn with_deadline<F>(limit: Option<Duration>, fut: F) -> Result<F::Output, Elapsed>
where
    F: Future,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut).await,
        None => Ok(fut.await),
    }
}

/// Last-activity clock shared by both directions of a tunnel.
///
/// A direction whose own read times out only gives up if the other
/// direction has been quiet for just as long.
#[derive(Debug)]
pub struct IdleClock {
    origin: Instant,
    last_activity_ms: AtomicU64,
}

impl IdleClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            last_activity_ms: AtomicU64::new(0),
        }
    }

    /// Record that bytes moved just now.
    pub fn touch(&self) {
        let now = self.origin.elapsed().as_millis() as u64;
        self.last_activity_ms.fetch_max(now, Ordering::Relaxed);
    }

    /// Time since bytes last moved in either direction.
    pub fn idle_for(&self) -> Duration {
        let last = Duration::from_millis(self.last_activity_ms.load(Ordering::Relaxed));
        self.origin.elapsed().saturating_sub(last)
    }
}

impl Default for IdleClock {
    fn default() -> Self {
        Self::new()
    }
}
