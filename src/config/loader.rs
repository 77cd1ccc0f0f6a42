//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Secrets that may be supplied through the environment instead of the file.
pub const ENV_SESSION_SECRET: &str = "PORTFOLIO_SESSION_SECRET";
pub const ENV_ADMIN_EMAIL: &str = "PORTFOLIO_ADMIN_EMAIL";
pub const ENV_ADMIN_PASSWORD_HASH: &str = "PORTFOLIO_ADMIN_PASSWORD_HASH";

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ServerConfig = toml::from_str(&content)?;
    finalize(config)
}

/// Apply environment overrides to `config` and validate the result.
pub fn finalize(mut config: ServerConfig) -> Result<ServerConfig, ConfigError> {
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn apply_env_overrides(config: &mut ServerConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(secret) = lookup(ENV_SESSION_SECRET) {
        config.auth.session_secret = secret;
    }
    if let Some(email) = lookup(ENV_ADMIN_EMAIL) {
        config.auth.admin_email = email;
    }
    if let Some(hash) = lookup(ENV_ADMIN_PASSWORD_HASH) {
        config.auth.admin_password_hash = hash;
    }
}
