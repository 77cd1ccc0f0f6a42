//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the protected zone, login and home paths agree with each other
//! - Validate value ranges (attempts >= 1, sizes > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::ServerConfig;

/// Minimum length of the session signing key.
pub const MIN_SECRET_LEN: usize = 32;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new("listener.bind_address", "not a socket address"));
    }

    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::new("retries.max_attempts", "must be at least 1"));
    }

    let auth = &config.auth;
    if !auth.protected_prefix.starts_with('/') {
        errors.push(ValidationError::new("auth.protected_prefix", "must start with '/'"));
    }
    if !auth.login_path.starts_with('/') {
        errors.push(ValidationError::new("auth.login_path", "must start with '/'"));
    } else if auth.login_path.starts_with(&auth.protected_prefix) {
        errors.push(ValidationError::new(
            "auth.login_path",
            "must not be inside the protected prefix",
        ));
    }
    if !auth.home_path.starts_with(&auth.protected_prefix) {
        errors.push(ValidationError::new(
            "auth.home_path",
            "must be inside the protected prefix",
        ));
    }
    if auth.session_secret.len() < MIN_SECRET_LEN {
        errors.push(ValidationError::new(
            "auth.session_secret",
            format!("must be at least {} bytes", MIN_SECRET_LEN),
        ));
    }
    if auth.session_ttl_secs == 0 {
        errors.push(ValidationError::new("auth.session_ttl_secs", "must be positive"));
    }
    if auth.cookie_name.is_empty() {
        errors.push(ValidationError::new("auth.cookie_name", "must not be empty"));
    }

    if config.uploads.max_bytes == 0 {
        errors.push(ValidationError::new("uploads.max_bytes", "must be positive"));
    }
    let prefix = &config.uploads.public_prefix;
    if !prefix.starts_with('/') || prefix.len() < 2 || prefix.ends_with('/') {
        errors.push(ValidationError::new(
            "uploads.public_prefix",
            "must start with '/', name a sub-path and have no trailing '/'",
        ));
    }

    if config.security.rate_limit_per_second == 0 || config.security.rate_limit_burst == 0 {
        errors.push(ValidationError::new("security.rate_limit", "rate and burst must be positive"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "not a socket address",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(validate_config(&ServerConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = ServerConfig::default();
        config.retries.max_attempts = 0;
        config.auth.session_secret = "short".into();
        config.uploads.max_bytes = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["retries.max_attempts", "auth.session_secret", "uploads.max_bytes"]
        );
    }

    #[test]
    fn test_login_inside_protected_zone_rejected() {
        let mut config = ServerConfig::default();
        config.auth.login_path = "/admin/login".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "auth.login_path");
    }

    #[test]
    fn test_home_outside_protected_zone_rejected() {
        let mut config = ServerConfig::default();
        config.auth.home_path = "/dashboard".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "auth.home_path");
    }
}
