//! Timeout enforcement.
//!
//! # Responsibilities
//! - Give each inbound request one deadline for all of its upstream calls
//! - Cancel the in-flight call cleanly when the deadline passes
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors
//! - The SPA fallback call shares the deadline of the primary call

use std::future::Future;
use std::time::Duration;
use tokio::time::{self, Instant};

/// The deadline elapsed before the wrapped future completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("deadline elapsed")]
pub struct DeadlineElapsed;

/// Absolute point in time by which upstream work for a request must finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    /// A deadline `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
        }
    }

    /// Run `future` until it completes or the deadline passes. The future is
    /// dropped (cancelled) on expiry.
    pub async fn run<F>(&self, future: F) -> Result<F::Output, DeadlineElapsed>
    where
        F: Future,
    {
        time::timeout_at(self.at, future)
            .await
            .map_err(|_| DeadlineElapsed)
    }
}
