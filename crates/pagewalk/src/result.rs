//! Result and error types for Pagewalk.

use thiserror::Error;

/// Result type for Pagewalk operations
pub type PageWalkResult<T> = Result<T, PageWalkError>;

/// Errors that can occur while driving a scenario.
///
/// Element absence is deliberately not represented here: gated page
/// actions report it as `None`/`false`.
#[derive(Debug, Error)]
pub enum PageWalkError {
    /// Browser executable not found
    #[error("Browser not found. Install Chromium or set CHROMIUM_PATH")]
    BrowserNotFound,

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// The launcher cannot drive the requested engine
    #[error("Browser engine {engine} is not supported by this launcher")]
    UnsupportedBrowser {
        /// Engine name
        engine: String,
    },

    /// Page error
    #[error("Page error: {message}")]
    Page {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Operation timed out
    #[error("Timed out after {ms}ms waiting for {what}")]
    Timeout {
        /// What was being waited for
        what: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Input simulation error
    #[error("Input simulation failed: {message}")]
    Input {
        /// Error message
        message: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// Assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Unknown suite category requested
    #[error("Unknown test category: {name}. Available categories: {}", valid.join(", "))]
    UnknownCategory {
        /// Requested name
        name: String,
        /// Valid category names
        valid: Vec<String>,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Credentials were required but not configured
    #[error("Missing credentials for {site}; set them in the config file or environment")]
    MissingCredentials {
        /// Site the credentials are for
        site: String,
    },

    /// Operation attempted on a closed session
    #[error("Session is closed")]
    SessionClosed,

    /// Scenario body panicked
    #[error("Scenario panicked: {message}")]
    Panicked {
        /// Panic payload
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl PageWalkError {
    /// Create an assertion failure
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Create a page error
    #[must_use]
    pub fn page(message: impl Into<String>) -> Self {
        Self::Page {
            message: message.into(),
        }
    }

    /// Create a timeout error
    #[must_use]
    pub fn timeout(what: impl Into<String>, ms: u64) -> Self {
        Self::Timeout {
            what: what.into(),
            ms,
        }
    }

    /// Whether this error is a timeout worth retrying
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether this error is a usage error rather than a scenario failure
    #[must_use]
    pub const fn is_usage(&self) -> bool {
        matches!(
            self,
            Self::UnknownCategory { .. } | Self::Config { .. } | Self::MissingCredentials { .. }
        )
    }
}
