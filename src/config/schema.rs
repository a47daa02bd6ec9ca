//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the mount proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The single upstream site being fronted.
    pub upstream: UpstreamConfig,

    /// Where the upstream site appears on the proxy's own domain.
    pub mount: MountConfig,

    /// Body buffering limits.
    pub limits: LimitsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:2028").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:2028".to_string(),
        }
    }
}

/// Upstream site configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Scheme and host of the upstream site, without a path.
    pub url: String,

    /// Path prefix reserved for interactive-challenge traffic.
    pub captcha_prefix: String,

    /// `Referer` presented upstream for challenge requests.
    pub captcha_referer: String,

    /// `Origin` presented upstream for challenge requests.
    pub captcha_origin: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: "https://itat.gov.in".to_string(),
            captcha_prefix: "/captcha".to_string(),
            captcha_referer: "https://itat.gov.in/judicial/tribunalorders/itat".to_string(),
            captcha_origin: "https://itat.gov.in".to_string(),
        }
    }
}

/// Mount configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MountConfig {
    /// Path prefix the upstream site is exposed under (e.g., "/itat").
    pub path: String,

    /// Public scheme and host of the proxy itself.
    pub public_domain: String,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            path: "/itat".to_string(),
            public_domain: "https://benkinotice-api.brchub.me".to_string(),
        }
    }
}

/// Limits applied while buffering response bodies.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum body size held in memory, applied to both the raw and the
    /// decompressed form of a rewritten response.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 16 * 1024 * 1024,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter used when `RUST_LOG` is unset.
    pub log_filter: String,

    /// Expose a Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Bind address of the metrics endpoint.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "mount_proxy=info,tower_http=info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
