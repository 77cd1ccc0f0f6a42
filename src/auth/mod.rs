//! Authentication and authorization.
//!
//! # Data Flow
//! ```text
//! Page request:
//!     → http::middleware::auth_gate
//!     → extract.rs (token from cookie or bearer header, verified)
//!     → gate.rs (Allow | RedirectTo)
//!
//! API request:
//!     → extract.rs AdminSession (401 when missing)
//!
//! Login:
//!     → handlers.rs → password.rs (verify) → session.rs (issue + cookie)
//! ```
//!
//! # Design Decisions
//! - The gate decision is a pure function; verification is a separate capability
//! - Sessions are stateless signed tokens with an embedded expiry
//! - One administrator account, configured rather than stored

pub mod extract;
pub mod gate;
pub mod handlers;
pub mod password;
pub mod session;

pub use extract::{AdminSession, SessionGuard};
pub use gate::{AuthDecision, Zones};
pub use session::{Role, Session, SessionSigner, TokenVerifier};
