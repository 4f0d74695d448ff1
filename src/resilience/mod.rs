//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! SOCKS5 dial:        timeouts.rs (optional connect deadline)
//! Forwarded request:  timeouts.rs (optional deadline for the response head)
//! Tunnel:             timeouts.rs (optional idle teardown, shared activity clock)
//! ```
//!
//! # Design Decisions
//! - Deadlines are opt-in; without configuration nothing times out
//! - No retries: every failure is terminal for its request or tunnel

pub mod timeouts;
