//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → limits.rs (body size ceilings per route)
//!     → rate_limit.rs (per-IP token bucket on contact + login)
//!     → handler
//!     → headers.rs (security response headers)
//! ```

pub mod headers;
pub mod limits;
pub mod rate_limit;

pub use rate_limit::{rate_limit_middleware, RateLimiter};
