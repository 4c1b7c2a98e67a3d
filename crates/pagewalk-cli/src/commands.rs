//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Pagewalk: page-object end-to-end scenarios for FriendFilter and AceStreamz
#[derive(Parser, Debug)]
#[command(name = "pagewalk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (failures and the summary only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Settings file (YAML); defaults to ./pagewalk.yaml when present
    #[arg(long, env = "PAGEWALK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run test suites
    Test(TestArgs),

    /// Run a narrated demo
    Demo(DemoArgs),

    /// List categories, suites and demos
    List,

    /// Check that a browser executable can be found
    Verify,
}

/// Headless override shared by `test` and `demo`
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct WindowArgs {
    /// Run without a browser window
    #[arg(long, conflicts_with = "headed")]
    pub headless: bool,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,
}

impl WindowArgs {
    /// Headless override; `None` keeps the configured mode
    #[must_use]
    pub const fn headless(self) -> Option<bool> {
        if self.headless {
            Some(true)
        } else if self.headed {
            Some(false)
        } else {
            None
        }
    }
}

/// Account overrides; environment variables keep secrets off the command line
#[derive(Args, Debug, Clone, Default)]
pub struct CredentialArgs {
    /// Admin account email
    #[arg(long, env = "PAGEWALK_ADMIN_EMAIL")]
    pub admin_email: Option<String>,

    /// Admin account password
    #[arg(long, env = "PAGEWALK_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,

    /// Consumer site account email
    #[arg(long, env = "PAGEWALK_SITE_EMAIL")]
    pub site_email: Option<String>,

    /// Consumer site account password
    #[arg(long, env = "PAGEWALK_SITE_PASSWORD", hide_env_values = true)]
    pub site_password: Option<String>,
}

/// Arguments for the test command
#[derive(Parser, Debug)]
pub struct TestArgs {
    /// Category to run (landing, auth, pricing, dashboard, extension, forms,
    /// performance, accessibility, browsers, errors, admin, all)
    #[arg(short, long, default_value = "all")]
    pub category: String,

    /// Stop at the first failing scenario
    #[arg(long)]
    pub fail_fast: bool,

    /// Per-scenario timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Result output format
    #[arg(long, default_value = "text")]
    pub format: FormatArg,

    /// Directory for the JSON run report
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub window: WindowArgs,

    #[command(flatten)]
    pub credentials: CredentialArgs,
}

/// Arguments for the demo command
#[derive(Parser, Debug)]
pub struct DemoArgs {
    /// Demo to run (homepage, practical, visual, admin)
    pub name: String,

    #[command(flatten)]
    pub window: WindowArgs,

    #[command(flatten)]
    pub credentials: CredentialArgs,
}

/// Color argument
#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Result format argument
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormatArg {
    /// Human-readable progress and summary
    #[default]
    Text,
    /// JSON run summary on stdout
    Json,
}

impl From<FormatArg> for crate::output::OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}
