//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Handler persistence call:
//!     → retries.rs (execute operation, count attempts)
//!     → classify.rs (Transient | Permanent for each failure)
//!     → backoff.rs (delay before the next attempt)
//!     → success value, or the original error unchanged
//! ```
//!
//! # Design Decisions
//! - Only connectivity failures are retried; everything else fails fast
//! - Backoff is deterministic (no jitter, no cap): base × 2^(retry - 1)
//! - No shared state: every call owns its policy and attempt counter
//! - Cancellation is by drop; `execute_until` adds an explicit signal

pub mod backoff;
pub mod classify;
pub mod retries;

pub use classify::{AttemptOutcome, Classify, ConnectivityCode, ErrorClass};
pub use retries::{execute, execute_until, PolicyError, RetryPolicy};
