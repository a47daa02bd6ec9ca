//! Parsed forms of the upstream URL and the public domain.
//!
//! The raw strings in [`ProxyConfig`](crate::config::ProxyConfig) are checked
//! once here; everything downstream works with the parsed values.

use axum::http::uri::{Authority, Scheme};
use url::Url;

use crate::config::validation::ValidationError;

/// The fixed upstream site.
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    scheme: Scheme,
    authority: Authority,
}

impl UpstreamTarget {
    /// Parse a `scheme://host[:port]` string. Paths other than `/`, queries,
    /// fragments and credentials are rejected.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: &str| ValidationError::UpstreamUrl {
            value: raw.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;
        let scheme = match url.scheme() {
            "http" => Scheme::HTTP,
            "https" => Scheme::HTTPS,
            _ => return Err(invalid("scheme must be http or https")),
        };
        let host = url.host_str().ok_or_else(|| invalid("missing host"))?;
        if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("must not carry a path, query or fragment"));
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(invalid("must not carry credentials"));
        }

        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        let authority = Authority::try_from(authority.as_str()).map_err(|e| invalid(&e.to_string()))?;

        Ok(Self { scheme, authority })
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    /// Host and optional port, as sent in the `Host` header.
    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// `scheme://host[:port]`
    pub fn origin(&self) -> String {
        format!("{}://{}", self.scheme, self.authority)
    }

    /// `//host[:port]`
    pub fn protocol_relative(&self) -> String {
        format!("//{}", self.authority)
    }
}

/// The proxy's own public scheme and host.
#[derive(Debug, Clone)]
pub struct PublicDomain {
    full: String,
    scheme_relative: String,
}

impl PublicDomain {
    /// Parse an `http(s)://host[:port]` string. A trailing `/` is dropped.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: &str| ValidationError::PublicDomain {
            value: raw.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = raw.trim_end_matches('/');
        let url = Url::parse(trimmed).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if url.host_str().is_none() {
            return Err(invalid("missing host"));
        }

        let scheme_relative = match trimmed.split_once(':') {
            Some((_, rest)) if rest.starts_with("//") => rest.to_string(),
            _ => return Err(invalid("expected scheme://host")),
        };

        Ok(Self {
            full: trimmed.to_string(),
            scheme_relative,
        })
    }

    /// e.g. `https://proxy.example`
    pub fn full(&self) -> &str {
        &self.full
    }

    /// e.g. `//proxy.example`
    pub fn scheme_relative(&self) -> &str {
        &self.scheme_relative
    }
}
