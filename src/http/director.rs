//! Request director.
//!
//! # Responsibilities
//! - Point the outbound request at the upstream host
//! - Strip the mount prefix from the path
//! - Spoof same-origin headers for challenge (captcha) traffic
//! - Forward cookies as a single header line
//! - Only ask the upstream for content codings the transformer can decode
//!
//! # Design Decisions
//! - Never fails: a target that cannot be rebuilt is forwarded unchanged
//! - Pure function of the request and the startup configuration

use axum::http::header::{self, HeaderValue};
use axum::http::request::Parts;
use axum::http::uri::{PathAndQuery, Uri};

use crate::config::{ProxyConfig, UpstreamConfig, UpstreamTarget, ValidationError};
use crate::http::codec::BodyEncoding;
use crate::rewrite::MountPath;

/// Mutates inbound requests into upstream requests.
#[derive(Debug, Clone)]
pub struct Director {
    target: UpstreamTarget,
    mount: MountPath,
    host: HeaderValue,
    captcha_prefix: String,
    captcha_referer: HeaderValue,
    captcha_origin: HeaderValue,
}

impl Director {
    pub fn new(target: UpstreamTarget, mount: MountPath, upstream: &UpstreamConfig) -> Result<Self, ValidationError> {
        let header = |value: &str| {
            HeaderValue::from_str(value).map_err(|e| ValidationError::Header {
                value: value.to_string(),
                reason: e.to_string(),
            })
        };

        Ok(Self {
            host: header(target.authority().as_str())?,
            captcha_referer: header(&upstream.captcha_referer)?,
            captcha_origin: header(&upstream.captcha_origin)?,
            captcha_prefix: upstream.captcha_prefix.clone(),
            target,
            mount,
        })
    }

    /// Build a director from a validated configuration.
    pub fn from_config(config: &ProxyConfig) -> Result<Self, ValidationError> {
        Self::new(
            UpstreamTarget::parse(&config.upstream.url)?,
            MountPath::new(config.mount.path.clone()),
            &config.upstream,
        )
    }

    /// Rewrite `parts` in place for the upstream and return the path that
    /// is sent upstream.
    pub fn direct(&self, parts: &mut Parts) -> String {
        let path = self.mount.strip(parts.uri.path()).into_owned();
        let path_and_query = match parts.uri.query() {
            Some(query) => format!("{}?{}", path, query),
            None => path.clone(),
        };

        let mut uri = Uri::builder()
            .scheme(self.target.scheme().clone())
            .authority(self.target.authority().clone());
        uri = match PathAndQuery::try_from(path_and_query.as_str()) {
            Ok(pq) => uri.path_and_query(pq),
            Err(e) => {
                tracing::debug!(path = %path_and_query, error = %e, "Keeping original request target");
                uri.path_and_query(parts.uri.path_and_query().cloned().unwrap_or_else(|| PathAndQuery::from_static("/")))
            }
        };
        match uri.build() {
            Ok(uri) => parts.uri = uri,
            Err(e) => tracing::debug!(error = %e, "Failed to build upstream uri"),
        }

        parts.headers.insert(header::HOST, self.host.clone());

        let sent_path = parts.uri.path().to_string();
        if sent_path.starts_with(&self.captcha_prefix) {
            tracing::debug!(path = %sent_path, "Applying challenge headers");
            parts.headers.insert(header::REFERER, self.captcha_referer.clone());
            parts.headers.insert(header::ORIGIN, self.captcha_origin.clone());
            parts.headers.insert(header::HOST, self.host.clone());
        }

        fold_cookies(parts);
        restrict_accept_encoding(parts);
        sent_path
    }
}

/// Drop `Accept-Encoding` entries the transformer cannot decode (br, zstd,
/// deflate, `*`). Parameters such as `;q=0.8` stay with their coding.
fn restrict_accept_encoding(parts: &mut Parts) {
    let offered: Vec<String> = parts
        .headers
        .get_all(header::ACCEPT_ENCODING)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|item| {
            let coding = item.split(';').next().unwrap_or_default();
            !coding.is_empty() && BodyEncoding::from_header(Some(coding)).is_some()
        })
        .map(str::to_string)
        .collect();

    parts.headers.remove(header::ACCEPT_ENCODING);
    if offered.is_empty() {
        return;
    }
    if let Ok(value) = HeaderValue::from_str(&offered.join(", ")) {
        parts.headers.insert(header::ACCEPT_ENCODING, value);
    }
}

/// Forward `Cookie` verbatim; multiple lines become one `; `-joined line.
fn fold_cookies(parts: &mut Parts) {
    let cookies: Vec<&[u8]> = parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .map(HeaderValue::as_bytes)
        .collect();
    if cookies.len() < 2 {
        return;
    }

    let joined = cookies.join(&b"; "[..]);
    if let Ok(value) = HeaderValue::from_bytes(&joined) {
        parts.headers.insert(header::COOKIE, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn director() -> Director {
        let mut config = ProxyConfig::default();
        config.upstream.url = "https://upstream.example".into();
        config.upstream.captcha_referer = "https://upstream.example/judicial/orders".into();
        config.upstream.captcha_origin = "https://upstream.example".into();
        config.mount.path = "/app".into();
        Director::from_config(&config).unwrap()
    }

    fn request_parts(uri: &str, headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_strips_mount_and_targets_upstream() {
        let mut parts = request_parts("/app/judicial/orders?page=2", &[("host", "proxy.example")]);
        let path = director().direct(&mut parts);

        assert_eq!(path, "/judicial/orders");
        assert_eq!(parts.uri.to_string(), "https://upstream.example/judicial/orders?page=2");
        assert_eq!(parts.headers[header::HOST], "upstream.example");
    }

    #[test]
    fn test_path_without_mount_is_unchanged() {
        let mut parts = request_parts("/static/site.css", &[]);
        assert_eq!(director().direct(&mut parts), "/static/site.css");
        assert_eq!(parts.uri.path(), "/static/site.css");
    }

    #[test]
    fn test_prefix_removed_exactly_once() {
        let mut parts = request_parts("/app/app/x", &[]);
        assert_eq!(director().direct(&mut parts), "/app/x");
    }

    #[test]
    fn test_mount_root_maps_to_upstream_root() {
        let mut parts = request_parts("/app", &[]);
        assert_eq!(director().direct(&mut parts), "/");
        assert_eq!(parts.uri.to_string(), "https://upstream.example/");
    }

    #[test]
    fn test_captcha_headers_overridden() {
        let mut parts = request_parts(
            "/app/captcha/image?id=7",
            &[
                ("referer", "https://proxy.example/app/page"),
                ("origin", "https://proxy.example"),
                ("host", "proxy.example"),
                ("cookie", "session=abc"),
            ],
        );
        director().direct(&mut parts);

        assert_eq!(parts.headers[header::REFERER], "https://upstream.example/judicial/orders");
        assert_eq!(parts.headers[header::ORIGIN], "https://upstream.example");
        assert_eq!(parts.headers[header::HOST], "upstream.example");
        assert_eq!(parts.headers[header::COOKIE], "session=abc");
    }

    #[test]
    fn test_non_captcha_keeps_referer_and_origin() {
        let mut parts = request_parts(
            "/app/page",
            &[("referer", "https://proxy.example/app/"), ("origin", "https://proxy.example")],
        );
        director().direct(&mut parts);

        assert_eq!(parts.headers[header::REFERER], "https://proxy.example/app/");
        assert_eq!(parts.headers[header::ORIGIN], "https://proxy.example");
    }

    #[test]
    fn test_captcha_match_uses_stripped_path() {
        let mut parts = request_parts("/captcha", &[("origin", "https://proxy.example")]);
        director().direct(&mut parts);
        assert_eq!(parts.headers[header::ORIGIN], "https://upstream.example");

        let mut parts = request_parts("/x/captcha", &[("origin", "https://proxy.example")]);
        director().direct(&mut parts);
        assert_eq!(parts.headers[header::ORIGIN], "https://proxy.example");
    }

    #[test]
    fn test_cookie_lines_folded() {
        let mut parts = request_parts("/app/", &[("cookie", "a=1"), ("cookie", "b=2")]);
        director().direct(&mut parts);

        assert_eq!(parts.headers.get_all(header::COOKIE).iter().count(), 1);
        assert_eq!(parts.headers[header::COOKIE], "a=1; b=2");
    }

    #[test]
    fn test_accept_encoding_limited_to_gzip() {
        let mut parts = request_parts("/app/", &[("accept-encoding", "gzip, deflate, br, zstd")]);
        director().direct(&mut parts);
        assert_eq!(parts.headers[header::ACCEPT_ENCODING], "gzip");

        let mut parts = request_parts("/app/", &[("accept-encoding", "br;q=1.0, gzip;q=0.8, identity;q=0.1")]);
        director().direct(&mut parts);
        assert_eq!(parts.headers[header::ACCEPT_ENCODING], "gzip;q=0.8, identity;q=0.1");
    }

    #[test]
    fn test_accept_encoding_without_gzip_removed() {
        let mut parts = request_parts("/app/", &[("accept-encoding", "br, zstd"), ("accept-encoding", "*")]);
        director().direct(&mut parts);
        assert!(!parts.headers.contains_key(header::ACCEPT_ENCODING));

        let mut parts = request_parts("/app/", &[]);
        director().direct(&mut parts);
        assert!(!parts.headers.contains_key(header::ACCEPT_ENCODING));
    }
}
