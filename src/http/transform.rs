//! Response transformation.
//!
//! # Responsibilities
//! - Rewrite redirect targets onto the mount path
//! - Decide whether a body is eligible for rewriting
//! - Decode, rewrite and re-encode eligible HTML bodies
//! - Keep Content-Length exact and strip framing restrictions
//!
//! # Design Decisions
//! - Whole-body buffering, bounded by `limits.max_body_bytes`
//! - Compression state is preserved: gzip in, gzip out
//! - Any decode/encode failure fails the exchange; nothing partial is served

use axum::body::Body;
use axum::http::header::{self, HeaderMap, HeaderValue};
use axum::http::{Method, Response, StatusCode};

use crate::config::{ProxyConfig, PublicDomain, UpstreamTarget, ValidationError};
use crate::http::codec::{self, BodyEncoding};
use crate::http::error::ProxyError;
use crate::http::headers::strip_framing_restrictions;
use crate::observability::metrics;
use crate::rewrite::{MountPath, RewriteRules};

/// What the transformer needs to know about the request side.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub method: Method,
    /// Path as sent upstream (mount prefix already stripped).
    pub path: String,
}

/// Why a body was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    NotHtml,
    Captcha,
    NoBody,
    UnsupportedEncoding,
}

impl Skip {
    fn as_str(self) -> &'static str {
        match self {
            Skip::NotHtml => "not_html",
            Skip::Captcha => "captcha",
            Skip::NoBody => "no_body",
            Skip::UnsupportedEncoding => "unsupported_encoding",
        }
    }
}

/// Rewrites upstream responses so the site works under the mount path.
#[derive(Debug, Clone)]
pub struct ResponseTransformer {
    rules: RewriteRules,
    max_body_bytes: usize,
}

impl ResponseTransformer {
    pub fn new(rules: RewriteRules, max_body_bytes: usize) -> Self {
        Self {
            rules,
            max_body_bytes,
        }
    }

    pub fn from_config(config: &ProxyConfig) -> Result<Self, ValidationError> {
        let rules = RewriteRules::new(
            &UpstreamTarget::parse(&config.upstream.url)?,
            &PublicDomain::parse(&config.mount.public_domain)?,
            &MountPath::new(config.mount.path.clone()),
        );
        Ok(Self::new(rules, config.limits.max_body_bytes))
    }

    /// Run the full pipeline over one upstream response.
    pub async fn transform(
        &self,
        exchange: &Exchange,
        response: Response<Body>,
    ) -> Result<Response<Body>, ProxyError> {
        let (mut parts, body) = response.into_parts();

        self.rewrite_location(&mut parts.headers);

        let encoding = match self.eligibility(exchange, parts.status, &parts.headers) {
            Ok(encoding) => encoding,
            Err(skip) => {
                tracing::debug!(path = %exchange.path, reason = skip.as_str(), "Body passed through");
                metrics::record_rewrite(skip.as_str());
                return Ok(Response::from_parts(parts, body));
            }
        };

        let raw = axum::body::to_bytes(body, self.max_body_bytes)
            .await
            .map_err(|e| {
                if is_length_limit(&e) {
                    ProxyError::BodyTooLarge { limit: self.max_body_bytes }
                } else {
                    ProxyError::Body(e)
                }
            })
            .inspect_err(|_| metrics::record_rewrite("failed"))?;

        if raw.is_empty() {
            tracing::debug!(path = %exchange.path, reason = Skip::NoBody.as_str(), "Empty body, nothing to rewrite");
            metrics::record_rewrite(Skip::NoBody.as_str());
            parts.headers.remove(header::TRANSFER_ENCODING);
            parts.headers.insert(header::CONTENT_LENGTH, HeaderValue::from(0usize));
            strip_framing_restrictions(&mut parts.headers);
            return Ok(Response::from_parts(parts, Body::empty()));
        }

        let rewritten = self
            .rewrite_payload(&raw, encoding)
            .inspect_err(|e| tracing::warn!(path = %exchange.path, error = %e, "Body rewrite failed"))
            .inspect_err(|_| metrics::record_rewrite("failed"))?;

        let gzip = encoding == BodyEncoding::Gzip;
        tracing::debug!(
            path = %exchange.path,
            before = raw.len(),
            after = rewritten.len(),
            gzip,
            "Body rewritten"
        );
        metrics::record_rewrite("rewritten");

        parts.headers.remove(header::TRANSFER_ENCODING);
        parts.headers.insert(header::CONTENT_LENGTH, HeaderValue::from(rewritten.len()));
        strip_framing_restrictions(&mut parts.headers);

        Ok(Response::from_parts(parts, Body::from(rewritten)))
    }

    /// Step 1: rewrite `Location` when it points at the upstream.
    pub fn rewrite_location(&self, headers: &mut HeaderMap) {
        let Some(location) = headers.get(header::LOCATION).and_then(|v| v.to_str().ok()) else {
            return;
        };
        let Some(rewritten) = self.rules.rewrite_location(location) else {
            return;
        };

        match HeaderValue::from_str(&rewritten) {
            Ok(value) => {
                tracing::debug!(from = %location, to = %rewritten, "Redirect rewritten");
                headers.insert(header::LOCATION, value);
            }
            Err(e) => tracing::warn!(location = %rewritten, error = %e, "Rewritten redirect is not a valid header"),
        }
    }

    /// Step 2: the gate in front of body rewriting.
    pub fn eligibility(
        &self,
        exchange: &Exchange,
        status: StatusCode,
        headers: &HeaderMap,
    ) -> Result<BodyEncoding, Skip> {
        let is_html = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("text/html"));
        if !is_html {
            return Err(Skip::NotHtml);
        }

        if exchange.path.to_lowercase().contains("captcha") {
            return Err(Skip::Captcha);
        }

        if exchange.method == Method::HEAD
            || status == StatusCode::NO_CONTENT
            || status == StatusCode::NOT_MODIFIED
        {
            return Err(Skip::NoBody);
        }

        let encoding = headers
            .get(header::CONTENT_ENCODING)
            .map(|v| v.to_str().unwrap_or("?"));
        BodyEncoding::from_header(encoding).ok_or(Skip::UnsupportedEncoding)
    }

    /// Steps 3 to 5 on an already buffered body.
    pub fn rewrite_payload(&self, raw: &[u8], encoding: BodyEncoding) -> Result<Vec<u8>, ProxyError> {
        match encoding {
            BodyEncoding::Identity => Ok(self.rules.rewrite_body(raw)),
            BodyEncoding::Gzip => {
                let html = codec::gunzip(raw, self.max_body_bytes)?;
                codec::gzip(&self.rules.rewrite_body(&html))
            }
        }
    }
}

fn is_length_limit(error: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(error);
    while let Some(err) = source {
        if err.is::<http_body_util::LengthLimitError>() {
            return true;
        }
        source = err.source();
    }
    false
}
