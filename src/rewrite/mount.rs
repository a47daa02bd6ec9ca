//! Mount prefix handling.

use std::borrow::Cow;

/// The path prefix under which the upstream site is exposed (e.g. `/itat`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPath(String);

impl MountPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Remove the mount prefix once from the start of `path`.
    ///
    /// Paths without the prefix come back unchanged. The result always
    /// starts with `/` so it stays a valid origin-form target.
    pub fn strip<'a>(&self, path: &'a str) -> Cow<'a, str> {
        match path.strip_prefix(self.0.as_str()) {
            Some(rest) if rest.starts_with('/') => Cow::Borrowed(rest),
            Some(rest) => Cow::Owned(format!("/{}", rest)),
            None => Cow::Borrowed(path),
        }
    }
}
