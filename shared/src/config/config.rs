use std::collections::HashSet;
use std::fs;
use tracing::{debug, error, info};

use crate::types::server_config::{AppConfig, ConfigError};

/// Smallest RSA modulus accepted for the token key pairs.
pub const MIN_KEY_BITS: usize = 2048;

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    info!("Loading configuration from: {}", path);

    let contents = fs::read_to_string(path)?;
    debug!("Processing file: {}", path);

    if contents.trim().is_empty() {
        error!("Configuration file is empty");
        return Err(ConfigError::InvalidConfig("empty file".into()));
    }

    let config: AppConfig = toml::from_str(&contents)?;

    info!("Configuration loaded successfully");
    debug!("Config: {:?}", config);

    validate_config(&config)?;

    info!("Config validated");

    Ok(config)
}

pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.paths.web_dir.is_empty() {
        return Err(ConfigError::InvalidConfig("web_dir cannot be empty".into()));
    }

    if config.auth.token_ttl_secs == 0 {
        return Err(ConfigError::InvalidConfig(
            "token_ttl_secs must be greater than 0".into(),
        ));
    }

    if config.server.request_timeout_secs == 0 {
        return Err(ConfigError::InvalidConfig(
            "request_timeout_secs must be greater than 0".into(),
        ));
    }

    if config.auth.key_bits < MIN_KEY_BITS {
        return Err(ConfigError::InvalidConfig(format!(
            "key_bits must be at least {}",
            MIN_KEY_BITS
        )));
    }

    if config.auth.issuer.is_empty() {
        return Err(ConfigError::InvalidConfig("issuer cannot be empty".into()));
    }

    let mut seen = HashSet::new();
    for user in &config.users {
        if user.name.is_empty() {
            return Err(ConfigError::InvalidConfig("user name cannot be empty".into()));
        }
        if !seen.insert(user.name.as_str()) {
            return Err(ConfigError::InvalidConfig(format!(
                "duplicate user: {}",
                user.name
            )));
        }
        // Every issuable user carries at least one role.
        if user.roles.is_empty() {
            return Err(ConfigError::InvalidConfig(format!(
                "user {} must have at least one role",
                user.name
            )));
        }
    }

    Ok(())
}
