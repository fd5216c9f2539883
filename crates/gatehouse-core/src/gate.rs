//! Path exemption matching.
//!
//! An exemption is either an exact path (one trailing `/` ignored on both
//! sides) or a prefix when it ends in `*`. The gate answers one question:
//! does this request path need authentication?

use std::collections::HashSet;

/// Wildcard marker turning an exemption into a prefix match
pub const WILDCARD: char = '*';

/// A single configured exemption
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExemptionPattern {
    /// Normalized path that must match exactly
    Exact(String),
    /// Prefix (marker removed) that exempts anything starting with it
    Prefix(String),
}

impl ExemptionPattern {
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix(WILDCARD) {
            Some(prefix) => ExemptionPattern::Prefix(prefix.to_string()),
            None => ExemptionPattern::Exact(strip_trailing_slash(pattern).to_string()),
        }
    }
}

fn strip_trailing_slash(path: &str) -> &str {
    path.strip_suffix('/').unwrap_or(path)
}

/// Pre-parsed set of exemptions
#[derive(Debug, Clone, Default)]
pub struct PathGate {
    exact: HashSet<String>,
    prefixes: Vec<String>,
}

impl PathGate {
    pub fn new<I, S>(exemptions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut gate = Self::default();
        for pattern in exemptions {
            match ExemptionPattern::parse(pattern.as_ref()) {
                ExemptionPattern::Exact(path) => {
                    gate.exact.insert(path);
                }
                ExemptionPattern::Prefix(prefix) => gate.prefixes.push(prefix),
            }
        }
        gate
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.prefixes.is_empty()
    }

    /// Whether `path` must be authenticated.
    ///
    /// A missing path with no exemptions is let through, a missing path with
    /// exemptions is not.
    pub fn requires_auth(&self, path: Option<&str>) -> bool {
        let path = match path.filter(|p| !p.is_empty()) {
            Some(path) => path,
            None => return !self.is_empty(),
        };
        if self.is_empty() {
            return true;
        }

        let path = strip_trailing_slash(path);
        if self.prefixes.iter().any(|prefix| path.starts_with(prefix.as_str())) {
            return false;
        }
        !self.exact.contains(path)
    }
}

/// One-shot form of [`PathGate::requires_auth`] over raw patterns
pub fn requires_auth<S: AsRef<str>>(path: Option<&str>, exemptions: &[S]) -> bool {
    PathGate::new(exemptions).requires_auth(path)
}
