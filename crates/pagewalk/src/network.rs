//! URL patterns for request blocking and URL expectations.
//!
//! Glob patterns use `*` as a wildcard for any run of characters; `**` is
//! accepted and behaves the same, so `**/api/**` and `**/admin/users` read
//! the way they do in browser tooling.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pattern for matching URLs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrlPattern {
    /// Exact URL match
    Exact(String),
    /// Prefix match
    Prefix(String),
    /// Contains substring
    Contains(String),
    /// Regex match
    Regex(String),
    /// Glob pattern (e.g., "**/api/**")
    Glob(String),
    /// Match any URL
    Any,
}

impl UrlPattern {
    /// Glob pattern when `pattern` contains a wildcard, exact match otherwise
    #[must_use]
    pub fn parse(pattern: &str) -> Self {
        if pattern.contains('*') {
            Self::Glob(pattern.to_string())
        } else {
            Self::Exact(pattern.to_string())
        }
    }

    /// Check if a URL matches this pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(pattern) => url == pattern,
            Self::Prefix(pattern) => url.starts_with(pattern),
            Self::Contains(pattern) => url.contains(pattern),
            Self::Regex(pattern) => regex::Regex::new(pattern)
                .map(|re| re.is_match(url))
                .unwrap_or(false),
            Self::Glob(pattern) => glob_matches(pattern, url),
            Self::Any => true,
        }
    }

    /// Wildcard pattern for the DevTools `Fetch` domain.
    ///
    /// Regex patterns intercept everything; the caller filters with
    /// [`UrlPattern::matches`].
    #[must_use]
    pub fn to_fetch_pattern(&self) -> String {
        match self {
            Self::Exact(pattern) => pattern.clone(),
            Self::Prefix(pattern) => format!("{pattern}*"),
            Self::Contains(pattern) => format!("*{pattern}*"),
            Self::Glob(pattern) => pattern.clone(),
            Self::Regex(_) | Self::Any => "*".to_string(),
        }
    }
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(p) | Self::Glob(p) => write!(f, "{p}"),
            Self::Prefix(p) => write!(f, "{p}*"),
            Self::Contains(p) => write!(f, "*{p}*"),
            Self::Regex(p) => write!(f, "/{p}/"),
            Self::Any => write!(f, "*"),
        }
    }
}

/// Anchored glob match: literal head and tail, wildcard-separated parts in
/// order between them.
fn glob_matches(pattern: &str, url: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return url == pattern;
    }

    let head = parts[0];
    let tail = parts[parts.len() - 1];
    if url.len() < head.len() + tail.len() || !url.starts_with(head) || !url.ends_with(tail) {
        return false;
    }

    let end = url.len() - tail.len();
    let mut pos = head.len();
    for part in &parts[1..parts.len() - 1] {
        if part.is_empty() {
            continue;
        }
        match url[pos..end].find(part) {
            Some(found) => pos += found + part.len(),
            None => return false,
        }
    }
    true
}
