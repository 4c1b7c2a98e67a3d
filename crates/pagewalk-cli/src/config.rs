//! CLI configuration: output settings plus harness settings with
//! command-line and environment overrides applied.

use crate::error::{CliError, CliResult};
use pagewalk::{Credentials, Settings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "pagewalk.yaml";

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// Quiet - failures and the summary only
    Quiet,
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - extra output
    Verbose,
    /// Debug - maximum output
    Debug,
}

impl Verbosity {
    /// Map `-q` and the `-v` count to a level
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Check if verbose or higher
    #[must_use]
    pub const fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose | Self::Debug)
    }

    /// Default `tracing` filter when `RUST_LOG` is unset
    #[must_use]
    pub const fn log_filter(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "pagewalk=info,pagewalk_cli=info,warn",
            Self::Debug => "pagewalk=debug,pagewalk_cli=debug,info",
        }
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Should use colors based on output detection
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => std::io::IsTerminal::is_terminal(&std::io::stderr()),
        }
    }
}

/// CLI configuration
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Color output choice
    pub color: ColorChoice,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Settings file, if one was given or found
    pub settings_path: Option<PathBuf>,
}

impl CliConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set color choice
    #[must_use]
    pub const fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }

    /// Set JSON logging
    #[must_use]
    pub const fn with_log_json(mut self, log_json: bool) -> Self {
        self.log_json = log_json;
        self
    }

    /// Use an explicit settings file, or look for [`DEFAULT_CONFIG_FILE`] in `cwd`
    #[must_use]
    pub fn with_settings_path(mut self, explicit: Option<PathBuf>, cwd: &Path) -> Self {
        self.settings_path = explicit.or_else(|| {
            let candidate = cwd.join(DEFAULT_CONFIG_FILE);
            candidate.is_file().then_some(candidate)
        });
        self
    }

    /// Load harness settings; defaults when no file is configured
    pub fn load_settings(&self) -> CliResult<Settings> {
        match &self.settings_path {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading settings");
                Ok(Settings::load(path)?)
            }
            None => Ok(Settings::default()),
        }
    }
}

/// Build credentials from an email/password pair.
///
/// Both halves or neither; a lone half is a configuration error naming `what`.
pub fn credentials_from(
    what: &str,
    email: Option<String>,
    password: Option<String>,
) -> CliResult<Option<Credentials>> {
    match (email, password) {
        (Some(email), Some(password)) => Ok(Some(Credentials::new(email, password))),
        (None, None) => Ok(None),
        (Some(_), None) => Err(CliError::config(format!(
            "{what} email given without a password"
        ))),
        (None, Some(_)) => Err(CliError::config(format!(
            "{what} password given without an email"
        ))),
    }
}
