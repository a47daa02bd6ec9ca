//! Configuration loading from disk and the process environment.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Overrides `mount.public_domain`.
pub const ENV_DOMAIN: &str = "APP_DOMAIN";
/// Overrides the listener port.
pub const ENV_PORT: &str = "APP_PORT";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid APP_PORT value {0:?}")]
    Port(String),

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

/// Build the startup configuration: defaults or the given file, then the
/// `APP_DOMAIN` / `APP_PORT` environment overrides, then validation.
pub fn load(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    load_with(path, |key| std::env::var(key).ok())
}

fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<ProxyConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => ProxyConfig::default(),
    };

    apply_env_overrides(&mut config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment overrides through `lookup`. Empty values count as unset.
pub fn apply_env_overrides<F>(config: &mut ProxyConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(domain) = lookup(ENV_DOMAIN) {
        config.mount.public_domain = domain.trim().to_string();
    }

    if let Some(port) = lookup(ENV_PORT) {
        let port: u16 = port
            .trim()
            .parse()
            .map_err(|_| ConfigError::Port(port.clone()))?;
        let mut addr: SocketAddr = config
            .listener
            .bind_address
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], port)));
        addr.set_port(port);
        config.listener.bind_address = addr.to_string();
    }

    Ok(())
}
