//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request:
//!     → timeouts.rs (Deadline from timeouts.request_secs)
//!     → primary upstream call under the deadline
//!     → optional SPA fallback call under the same deadline
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - No retries: the SPA fallback is a routing rule, not a retry on error
//! - Client disconnect drops the handler future, cancelling the call in flight

pub mod timeouts;

pub use timeouts::{Deadline, DeadlineElapsed};
