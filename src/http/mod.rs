//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, catch-all route)
//!     → request.rs (request ID)
//!     → headers.rs (hop-by-hop strip, X-Forwarded-For)
//!     → director.rs (upstream target, mount strip, captcha headers)
//!     → [upstream fetch: hyper-util client]
//!     → transform.rs (Location, gated body rewrite via codec.rs)
//!     → Send to client (error.rs maps failures to 502)
//! ```

pub mod codec;
pub mod director;
pub mod error;
pub mod headers;
pub mod request;
pub mod server;
pub mod transform;

pub use director::Director;
pub use error::ProxyError;
pub use request::X_REQUEST_ID;
pub use server::HttpServer;
pub use transform::{Exchange, ResponseTransformer};
