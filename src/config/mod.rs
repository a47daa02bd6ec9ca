//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults / config file (TOML)
//!     → loader.rs (parse, APP_DOMAIN / APP_PORT overrides)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → target.rs (parsed upstream target and public domain)
//!     → injected into director and transformer at startup
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup and never changes afterwards
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod target;
pub mod validation;

pub use loader::{load, ConfigError};
pub use schema::{
    LimitsConfig, ListenerConfig, MountConfig, ObservabilityConfig, ProxyConfig, TimeoutConfig,
    UpstreamConfig,
};
pub use target::{PublicDomain, UpstreamTarget};
pub use validation::ValidationError;
