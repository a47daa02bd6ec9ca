//! Per-exchange proxy errors.
//!
//! Every variant is local to one request/response exchange. The client sees
//! a `502 Bad Gateway` with an empty body, never a partial or corrupted page.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// The upstream body was not a valid gzip stream.
    #[error("failed to decode gzip body: {0}")]
    Decode(#[source] std::io::Error),

    /// The rewritten body could not be recompressed.
    #[error("failed to encode gzip body: {0}")]
    Encode(#[source] std::io::Error),

    /// The (decompressed) body exceeded the configured buffer limit.
    #[error("body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    /// Reading the upstream body failed.
    #[error("failed to read upstream body: {0}")]
    Body(#[source] axum::Error),

    /// The upstream exchange itself failed.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),
}

impl ProxyError {
    /// Short label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::Decode(_) => "decode",
            ProxyError::Encode(_) => "encode",
            ProxyError::BodyTooLarge { .. } => "body_too_large",
            ProxyError::Body(_) => "body",
            ProxyError::Upstream(_) => "upstream",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        StatusCode::BAD_GATEWAY.into_response()
    }
}
