//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the upstream URL and public domain are usable rewrite origins
//! - Validate value ranges (limits > 0, timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::ProxyConfig;
use crate::config::target::{PublicDomain, UpstreamTarget};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid upstream url {value:?}: {reason}")]
    UpstreamUrl { value: String, reason: String },

    #[error("invalid public domain {value:?}: {reason}")]
    PublicDomain { value: String, reason: String },

    #[error("invalid mount path {0:?}: must start with '/', not end with '/' and not be '/'")]
    MountPath(String),

    #[error("invalid header value {value:?}: {reason}")]
    Header { value: String, reason: String },

    #[error("invalid captcha prefix {0:?}: must start with '/'")]
    CaptchaPrefix(String),

    #[error("invalid {field} address {value:?}")]
    Address { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Check every semantic rule and collect all failures.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = UpstreamTarget::parse(&config.upstream.url) {
        errors.push(e);
    }
    if let Err(e) = PublicDomain::parse(&config.mount.public_domain) {
        errors.push(e);
    }

    let mount = &config.mount.path;
    if !mount.starts_with('/') || mount.ends_with('/') || mount.len() < 2 {
        errors.push(ValidationError::MountPath(mount.clone()));
    }

    if !config.upstream.captcha_prefix.starts_with('/') {
        errors.push(ValidationError::CaptchaPrefix(config.upstream.captcha_prefix.clone()));
    }

    for value in [&config.upstream.captcha_referer, &config.upstream.captcha_origin] {
        if let Err(e) = axum::http::HeaderValue::from_str(value) {
            errors.push(ValidationError::Header {
                value: value.clone(),
                reason: e.to_string(),
            });
        }
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::Address {
            field: "listener",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::Address {
            field: "metrics",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::Zero("limits.max_body_bytes"));
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
