//! Pagewalk CLI Library
//!
//! Command-line interface for running Pagewalk suites and demos.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod logging;
mod output;

pub use commands::{Cli, ColorArg, Commands, CredentialArgs, DemoArgs, FormatArg, TestArgs, WindowArgs};
pub use config::{credentials_from, CliConfig, ColorChoice, Verbosity, DEFAULT_CONFIG_FILE};
pub use error::{CliError, CliResult, EXIT_FAILURE, EXIT_SUCCESS, EXIT_USAGE};
pub use output::{listing, ConsoleListener, OutputFormat, ProgressReporter};
