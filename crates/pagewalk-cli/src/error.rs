//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Exit code for a run where every scenario passed
pub const EXIT_SUCCESS: u8 = 0;

/// Exit code for failed scenarios or a failed demo
pub const EXIT_FAILURE: u8 = 1;

/// Exit code for bad arguments or configuration
pub const EXIT_USAGE: u8 = 2;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// Some scenarios failed
    #[error("{failed} of {total} scenario(s) failed")]
    TestFailures {
        /// Failed scenarios
        failed: usize,
        /// Scenarios executed
        total: usize,
    },

    /// A demo stopped before its end
    #[error("Demo {name} failed: {message}")]
    DemoFailed {
        /// Demo name
        name: String,
        /// Narrated error
        message: String,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Pagewalk library error
    #[error("{0}")]
    PageWalk(#[from] pagewalk::PageWalkError),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Process exit code for this error
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config { .. } | Self::InvalidArgument { .. } => EXIT_USAGE,
            Self::PageWalk(err) if err.is_usage() => EXIT_USAGE,
            _ => EXIT_FAILURE,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pagewalk::{PageWalkError, Selection};

    #[test]
    fn test_config_error() {
        let err = CliError::config("bad config");
        assert!(err.to_string().contains("Configuration"));
        assert!(err.to_string().contains("bad config"));
        assert_eq!(err.exit_code(), EXIT_USAGE);
    }

    #[test]
    fn test_invalid_argument_error() {
        let err = CliError::invalid_argument("bad arg");
        assert!(err.to_string().contains("Invalid argument"));
        assert_eq!(err.exit_code(), EXIT_USAGE);
    }

    #[test]
    fn test_unknown_category_is_usage() {
        let err: CliError = Selection::parse("nope").unwrap_err().into();
        assert_eq!(err.exit_code(), EXIT_USAGE);
        assert!(err.to_string().contains("Available categories"));
    }

    #[test]
    fn test_missing_credentials_is_usage() {
        let err: CliError = PageWalkError::MissingCredentials {
            site: "https://acestreamz.com/admin".to_string(),
        }
        .into();
        assert_eq!(err.exit_code(), EXIT_USAGE);
    }

    #[test]
    fn test_failures_exit_one() {
        let err = CliError::TestFailures { failed: 2, total: 9 };
        assert_eq!(err.to_string(), "2 of 9 scenario(s) failed");
        assert_eq!(err.exit_code(), EXIT_FAILURE);

        let err: CliError = PageWalkError::BrowserNotFound.into();
        assert_eq!(err.exit_code(), EXIT_FAILURE);
    }
}
