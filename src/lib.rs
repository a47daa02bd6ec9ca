//! Mount proxy library.
//!
//! Fronts a single upstream site and republishes it under a path prefix of
//! the proxy's own domain.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod rewrite;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
