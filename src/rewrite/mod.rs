//! URL rewriting subsystem.
//!
//! # Data Flow
//! ```text
//! Rule Compilation (at startup):
//!     UpstreamTarget + PublicDomain + mount path
//!     → rules.rs (ordered prefix rules)
//!     → Freeze as immutable RewriteRules
//!
//! Per exchange:
//!     request path     → mount.rs (strip mount prefix)
//!     Location header  → rules.rs (first matching prefix → mount path)
//!     HTML body bytes  → rules.rs (every rule, in order, global replace)
//! ```
//!
//! # Design Decisions
//! - Rules compiled at startup, immutable at runtime
//! - Plain substring matching, no regex and no HTML parsing
//! - Redirect and body rewriting share one rule list so they cannot drift

pub mod mount;
pub mod rules;

pub use mount::MountPath;
pub use rules::{RewriteRule, RewriteRules};
