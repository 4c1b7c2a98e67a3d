//! Pagewalk CLI: page-object e2e suites for live sites
//!
//! ## Usage
//!
//! ```bash
//! pagewalk test                          # Run every category except admin
//! pagewalk test --category admin         # Admin backend (needs credentials)
//! pagewalk test --format json -o out/    # JSON summary plus run-report.json
//! pagewalk demo visual                   # Narrated walkthrough with a window
//! pagewalk list                          # Categories, scenarios and demos
//! pagewalk verify                        # Locate a Chromium executable
//! ```

use clap::Parser;
use pagewalk_cli::{
    handlers, logging, Cli, CliConfig, CliResult, ColorChoice, Commands, Verbosity,
    EXIT_SUCCESS,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;
    logging::init_logging(&config);

    match cli.command {
        Commands::List => {
            handlers::run_list();
            Ok(())
        }
        Commands::Verify => {
            let settings = config.load_settings()?;
            handlers::run_verify(&config, &settings).map(drop)
        }
        Commands::Test(args) => {
            // Reject a bad category before touching settings or the browser.
            pagewalk::Selection::parse(&args.category)?;
            let mut settings = config.load_settings()?;
            handlers::apply_overrides(&mut settings, args.window, &args.credentials)?;
            handlers::check_test_args(&settings, &args)?;
            let launcher = handlers::launcher()?;
            runtime()?
                .block_on(handlers::run_tests(&config, &settings, launcher.as_ref(), &args))
                .map(drop)
        }
        Commands::Demo(args) => {
            let mut settings = config.load_settings()?;
            handlers::apply_overrides(&mut settings, args.window, &args.credentials)?;
            handlers::check_demo_args(&settings, &args)?;
            let launcher = handlers::launcher()?;
            runtime()?
                .block_on(handlers::run_demo(&settings, launcher.as_ref(), &args, true))
                .map(drop)
        }
    }
}

fn build_config(cli: &Cli) -> CliResult<CliConfig> {
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    let color: ColorChoice = cli.color.into();
    let cwd = std::env::current_dir()?;

    Ok(CliConfig::new()
        .with_verbosity(verbosity)
        .with_color(color)
        .with_log_json(cli.log_json)
        .with_settings_path(cli.config.clone(), &cwd))
}

fn runtime() -> CliResult<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Runtime::new()?)
}
