//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the portfolio server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Retry policy for persistence calls.
    pub retries: RetryConfig,

    /// Session and protected-zone settings.
    pub auth: AuthConfig,

    /// Persistence settings.
    pub storage: StorageConfig,

    /// Image upload settings.
    pub uploads: UploadConfig,

    /// Security hardening.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Static site assets.
    pub site: SiteConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per persistence call, first attempt included.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Path prefix that requires a session.
    pub protected_prefix: String,

    /// Login entry point.
    pub login_path: String,

    /// Where authenticated visitors of the login page are sent.
    pub home_path: String,

    /// Name of the session cookie.
    pub cookie_name: String,

    /// Key for signing session tokens (at least 32 bytes).
    pub session_secret: String,

    /// Session lifetime in seconds.
    pub session_ttl_secs: u64,

    /// Administrator login.
    pub admin_email: String,

    /// Administrator password hash (see `portfolio-cli hash-password`).
    pub admin_password_hash: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            protected_prefix: "/admin".to_string(),
            login_path: "/login".to_string(),
            home_path: "/admin/dashboard".to_string(),
            cookie_name: "portfolio_session".to_string(),
            // WARNING: This is a placeholder! Change this in production.
            session_secret: "CHANGE_ME_IN_PRODUCTION_CHANGE_ME_IN_PRODUCTION".to_string(),
            session_ttl_secs: 60 * 60 * 24,
            admin_email: "admin@example.com".to_string(),
            admin_password_hash: String::new(),
        }
    }
}

/// Persistence configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON snapshot file; `None` keeps data in memory only.
    pub snapshot_path: Option<String>,
}

/// Upload configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Directory uploaded images are written to.
    pub directory: String,

    /// URL prefix the directory is served under.
    pub public_prefix: String,

    /// Maximum accepted file size in bytes.
    pub max_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            directory: "uploads".to_string(),
            public_prefix: "/uploads".to_string(),
            max_bytes: 5 * 1024 * 1024, // 5MB
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Enable security headers.
    pub enable_headers: bool,

    /// Maximum JSON body size in bytes.
    pub max_body_size: usize,

    /// Requests per second per IP on the contact form and login.
    pub rate_limit_per_second: u32,

    /// Burst capacity for the same endpoints.
    pub rate_limit_burst: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
            max_body_size: 1024 * 1024, // 1MB
            rate_limit_per_second: 1,
            rate_limit_burst: 5,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Public site assets.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SiteConfig {
    /// Directory of static public pages; unset serves API only.
    pub directory: Option<String>,
}
