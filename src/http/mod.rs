//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → request.rs (request ID, trace span)
//!     → server.rs layers (timeout, headers, body limit, metrics)
//!     → middleware/auth_gate.rs (page-level redirects)
//!     → api/, upload.rs, auth handlers
//!     → response.rs (errors as JSON)
//! ```

pub mod api;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;
pub mod upload;

pub use request::X_REQUEST_ID;
pub use response::ApiError;
pub use server::{AppState, HttpServer};
