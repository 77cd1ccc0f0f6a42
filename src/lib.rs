//! Portfolio site backend.
//!
//! Public JSON API for projects, skills, experience and the contact form,
//! plus a session-protected admin area for editing that content, reading
//! messages and uploading images.
//!
//! # Architecture Overview
//!
//! ```text
//!   request ─▶ http (layers, gate) ─▶ handlers ─▶ resilience::execute ─▶ store
//!                     │                   │
//!                     ▼                   ▼
//!               auth (zones,         content (entities,
//!               sessions)            validation)
//! ```
//!
//! Cross-cutting: config, observability, security, lifecycle.

// Core subsystems
pub mod auth;
pub mod config;
pub mod content;
pub mod http;
pub mod resilience;
pub mod store;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
