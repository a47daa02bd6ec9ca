//! Prefix rewrite rules.
//!
//! # Responsibilities
//! - Map upstream absolute URLs onto the proxy's public domain + mount path
//! - Map upstream protocol-relative URLs the same way, scheme omitted
//! - Map redirect targets onto the bare mount path
//!
//! # Design Decisions
//! - Rules are evaluated in order; absolute before protocol-relative
//! - Redirects: first match wins, at most one rule applies
//! - Bodies: every rule applies, as a global byte-level replacement, so
//!   non-UTF-8 content survives untouched

use memchr::memmem;

use crate::config::{PublicDomain, UpstreamTarget};
use crate::rewrite::MountPath;

/// A single (match-prefix, replacement-prefix) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRule {
    /// Upstream URL prefix, e.g. `https://upstream.example`.
    pub prefix: String,
    /// What the prefix becomes inside HTML, e.g. `https://proxy.example/app`.
    pub replacement: String,
}

/// The ordered rule list shared by redirect and body rewriting.
#[derive(Debug, Clone)]
pub struct RewriteRules {
    rules: Vec<RewriteRule>,
    mount: MountPath,
}

impl RewriteRules {
    /// Derive the two rules from the configured origins.
    pub fn new(upstream: &UpstreamTarget, public: &PublicDomain, mount: &MountPath) -> Self {
        let rules = vec![
            RewriteRule {
                prefix: upstream.origin(),
                replacement: format!("{}{}", public.full(), mount.as_str()),
            },
            RewriteRule {
                prefix: upstream.protocol_relative(),
                replacement: format!("{}{}", public.scheme_relative(), mount.as_str()),
            },
        ];

        Self {
            rules,
            mount: mount.clone(),
        }
    }

    /// Rewrite a `Location` value. Returns `None` when no rule matches.
    pub fn rewrite_location(&self, location: &str) -> Option<String> {
        self.rules.iter().find_map(|rule| {
            location
                .strip_prefix(rule.prefix.as_str())
                .map(|rest| format!("{}{}", self.mount.as_str(), rest))
        })
    }

    /// Apply every rule, in order, to the whole body.
    pub fn rewrite_body(&self, body: &[u8]) -> Vec<u8> {
        let mut out = body.to_vec();
        for rule in &self.rules {
            out = replace_all(&out, rule.prefix.as_bytes(), rule.replacement.as_bytes());
        }
        out
    }
}

/// Non-overlapping, left-to-right replacement of `from` with `to`.
fn replace_all(haystack: &[u8], from: &[u8], to: &[u8]) -> Vec<u8> {
    if from.is_empty() {
        return haystack.to_vec();
    }

    let mut out = Vec::with_capacity(haystack.len());
    let mut last = 0;
    for at in memmem::find_iter(haystack, from) {
        out.extend_from_slice(&haystack[last..at]);
        out.extend_from_slice(to);
        last = at + from.len();
    }
    out.extend_from_slice(&haystack[last..]);
    out
}
