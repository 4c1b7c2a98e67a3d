//! Subcommand handlers.
//!
//! Handlers take the launcher as a parameter so they run unchanged against
//! Chromium or the scripted browser.

use crate::commands::{CredentialArgs, DemoArgs, TestArgs, WindowArgs};
use crate::config::{credentials_from, CliConfig};
use crate::error::{CliError, CliResult};
use crate::output::{listing, ConsoleListener, OutputFormat, ProgressReporter};
use pagewalk::{
    BrowserExecutable, Category, Demo, DemoOutcome, Launcher, Narrator, RunSummary, Runner,
    RunnerConfig, Selection, Settings, TracingListener,
};
use std::time::Duration;

/// Launcher for real runs
#[cfg(feature = "browser")]
pub fn launcher() -> CliResult<Box<dyn Launcher>> {
    Ok(Box::new(pagewalk::CdpLauncher::new()))
}

/// Launcher for real runs
#[cfg(not(feature = "browser"))]
pub fn launcher() -> CliResult<Box<dyn Launcher>> {
    Err(CliError::config(
        "pagewalk was built without browser support; rebuild with --features browser",
    ))
}

/// Apply command-line window and account overrides to `settings`
pub fn apply_overrides(
    settings: &mut Settings,
    window: WindowArgs,
    credentials: &CredentialArgs,
) -> CliResult<()> {
    if let Some(headless) = window.headless() {
        settings.browser.headless = headless;
    }
    if let Some(admin) = credentials_from(
        "admin",
        credentials.admin_email.clone(),
        credentials.admin_password.clone(),
    )? {
        settings.admin.credentials = Some(admin);
    }
    if let Some(site) = credentials_from(
        "site",
        credentials.site_email.clone(),
        credentials.site_password.clone(),
    )? {
        settings.site.credentials = Some(site);
    }
    Ok(())
}

/// Usage checks for `pagewalk test`; nothing is launched
pub fn check_test_args(settings: &Settings, args: &TestArgs) -> CliResult<Selection> {
    let selection = Selection::parse(&args.category)?;
    if selection.includes(Category::Admin) {
        settings.admin_credentials()?;
    }
    if args.timeout == Some(0) {
        return Err(CliError::invalid_argument("--timeout must be at least 1 second"));
    }
    Ok(selection)
}

/// Usage checks for `pagewalk demo`; nothing is launched
pub fn check_demo_args(settings: &Settings, args: &DemoArgs) -> CliResult<&'static Demo> {
    let demo = pagewalk::demo(&args.name).ok_or_else(|| {
        CliError::invalid_argument(format!(
            "unknown demo {:?}; available demos: {}",
            args.name,
            pagewalk::demo_names().join(", ")
        ))
    })?;
    if demo.name == "admin" {
        settings.admin_credentials()?;
    }
    Ok(demo)
}

/// `pagewalk test`
pub async fn run_tests(
    config: &CliConfig,
    settings: &Settings,
    launcher: &dyn Launcher,
    args: &TestArgs,
) -> CliResult<RunSummary> {
    let selection = check_test_args(settings, args)?;

    let format = OutputFormat::from(args.format);
    let mut runner_config = RunnerConfig::new().fail_fast(args.fail_fast);
    if let Some(secs) = args.timeout {
        runner_config = runner_config.case_timeout(Duration::from_secs(secs));
    }

    let suites = selection.suites(pagewalk::suites::registry());
    let total = suites.iter().map(|s| s.len()).sum();
    let quiet = config.verbosity.is_quiet() || format == OutputFormat::Json;
    let reporter = ProgressReporter::new(config.color.should_color(), quiet);

    tracing::info!(%selection, scenarios = total, headless = settings.browser.headless, "starting run");
    let summary = Runner::new(launcher, settings, runner_config)
        .with_listener(TracingListener)
        .with_listener(ConsoleListener::new(reporter, total))
        .run_suites(&selection.to_string(), suites)
        .await;

    if format == OutputFormat::Json {
        println!("{}", summary.to_json()?);
    }
    if let Some(dir) = &args.output {
        let path = summary.write_json(dir)?;
        ProgressReporter::new(config.color.should_color(), quiet)
            .info(&format!("report written to {}", path.display()));
    }

    if summary.all_passed() {
        Ok(summary)
    } else {
        Err(CliError::TestFailures {
            failed: summary.failed(),
            total: summary.total(),
        })
    }
}

/// `pagewalk demo`
pub async fn run_demo(
    settings: &Settings,
    launcher: &dyn Launcher,
    args: &DemoArgs,
    echo: bool,
) -> CliResult<DemoOutcome> {
    let demo = check_demo_args(settings, args)?;

    let narrator = if echo {
        Narrator::new(settings.clone())
    } else {
        Narrator::silent(settings.clone())
    };
    let outcome = pagewalk::run_demo(launcher, demo, &narrator, args.window.headless()).await;
    match &outcome.error {
        None => Ok(outcome),
        Some(message) => Err(CliError::DemoFailed {
            name: demo.name.to_string(),
            message: message.clone(),
        }),
    }
}

/// `pagewalk list`
pub fn run_list() {
    for line in listing(pagewalk::suites::registry(), pagewalk::demos()) {
        println!("{line}");
    }
}

/// `pagewalk verify`
pub fn run_verify(config: &CliConfig, settings: &Settings) -> CliResult<BrowserExecutable> {
    let found = pagewalk::find_browser(settings.browser.executable_path.as_deref())?;
    ProgressReporter::new(config.color.should_color(), false).success(&format!(
        "browser found at {} (via {})",
        found.path.display(),
        found.source
    ));
    Ok(found)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::commands::FormatArg;
    use crate::config::Verbosity;
    use crate::error::{EXIT_FAILURE, EXIT_USAGE};
    use pagewalk::{Credentials, MockBrowser};

    fn test_args(category: &str) -> TestArgs {
        TestArgs {
            category: category.to_string(),
            fail_fast: false,
            timeout: None,
            format: FormatArg::Text,
            output: None,
            window: WindowArgs::default(),
            credentials: CredentialArgs::default(),
        }
    }

    fn quiet() -> CliConfig {
        CliConfig::new().with_verbosity(Verbosity::Quiet)
    }

    fn settings(dir: &std::path::Path) -> Settings {
        Settings {
            screenshot_dir: dir.join("shots"),
            ..Settings::default()
        }
    }

    mod override_tests {
        use super::*;

        #[test]
        fn test_window_and_credentials() {
            let mut settings = Settings::default();
            let window = WindowArgs {
                headless: false,
                headed: true,
            };
            let creds = CredentialArgs {
                admin_email: Some("ops@example.com".into()),
                admin_password: Some("from-env".into()),
                ..CredentialArgs::default()
            };
            apply_overrides(&mut settings, window, &creds).unwrap();
            assert!(!settings.browser.headless);
            assert_eq!(
                settings.admin.credentials,
                Some(Credentials::new("ops@example.com", "from-env"))
            );
            assert!(settings.site.credentials.is_none());
        }

        #[test]
        fn test_no_overrides_keep_settings() {
            let mut settings = Settings::default();
            apply_overrides(&mut settings, WindowArgs::default(), &CredentialArgs::default())
                .unwrap();
            assert!(settings.browser.headless);
            assert!(settings.admin.credentials.is_none());
        }
    }

    mod test_command_tests {
        use super::*;

        #[tokio::test]
        async fn test_errors_category_passes() {
            let dir = tempfile::tempdir().unwrap();
            let browser = MockBrowser::new();
            let mut args = test_args("errors");
            args.output = Some(dir.path().join("reports"));

            let summary = run_tests(&quiet(), &settings(dir.path()), &browser, &args)
                .await
                .unwrap();

            assert_eq!(summary.total(), 2);
            assert!(dir.path().join("reports").join(pagewalk::reporter::REPORT_FILE).is_file());
        }

        #[tokio::test]
        async fn test_unknown_category_never_launches() {
            let dir = tempfile::tempdir().unwrap();
            let browser = MockBrowser::new();
            let err = run_tests(&quiet(), &settings(dir.path()), &browser, &test_args("bogus"))
                .await
                .unwrap_err();
            assert_eq!(err.exit_code(), EXIT_USAGE);
            assert_eq!(browser.launches(), 0);
        }

        #[tokio::test]
        async fn test_admin_without_credentials_is_usage() {
            let dir = tempfile::tempdir().unwrap();
            let browser = MockBrowser::new();
            let err = run_tests(&quiet(), &settings(dir.path()), &browser, &test_args("admin"))
                .await
                .unwrap_err();
            assert_eq!(err.exit_code(), EXIT_USAGE);
            assert!(err.to_string().contains("Missing credentials"));
            assert_eq!(browser.launches(), 0);
        }

        #[tokio::test]
        async fn test_failures_exit_one() {
            let dir = tempfile::tempdir().unwrap();
            let browser = MockBrowser::new().with_failing_launch();
            let err = run_tests(&quiet(), &settings(dir.path()), &browser, &test_args("errors"))
                .await
                .unwrap_err();
            assert_eq!(err.exit_code(), EXIT_FAILURE);
            match err {
                CliError::TestFailures { failed, total } => {
                    assert_eq!(failed, 2);
                    assert_eq!(total, 2);
                }
                other => panic!("unexpected error {other}"),
            }
        }

        #[tokio::test]
        async fn test_zero_timeout_rejected() {
            let dir = tempfile::tempdir().unwrap();
            let browser = MockBrowser::new();
            let mut args = test_args("errors");
            args.timeout = Some(0);
            let err = run_tests(&quiet(), &settings(dir.path()), &browser, &args)
                .await
                .unwrap_err();
            assert_eq!(err.exit_code(), EXIT_USAGE);
        }
    }

    mod usage_check_tests {
        use super::*;

        fn demo_args(name: &str) -> DemoArgs {
            DemoArgs {
                name: name.to_string(),
                window: WindowArgs::default(),
                credentials: CredentialArgs::default(),
            }
        }

        #[test]
        fn test_checks_run_without_a_launcher() {
            let settings = Settings::default();
            assert!(check_test_args(&settings, &test_args("errors")).is_ok());
            assert_eq!(
                check_test_args(&settings, &test_args("admin")).unwrap_err().exit_code(),
                EXIT_USAGE
            );
            assert_eq!(
                check_demo_args(&settings, &demo_args("admin")).unwrap_err().exit_code(),
                EXIT_USAGE
            );
            assert_eq!(check_demo_args(&settings, &demo_args("visual")).unwrap().name, "visual");
        }

        #[test]
        fn test_admin_checks_pass_with_credentials() {
            let mut settings = Settings::default();
            settings.admin.credentials = Some(Credentials::new("ops@example.com", "from-env"));
            let selection = check_test_args(&settings, &test_args("admin")).unwrap();
            assert!(selection.includes(Category::Admin));
            assert!(check_demo_args(&settings, &demo_args("admin")).is_ok());
        }
    }

    mod demo_command_tests {
        use super::*;

        fn demo_args(name: &str) -> DemoArgs {
            DemoArgs {
                name: name.to_string(),
                window: WindowArgs::default(),
                credentials: CredentialArgs::default(),
            }
        }

        #[tokio::test]
        async fn test_unknown_demo_lists_names() {
            let browser = MockBrowser::new();
            let err = run_demo(&Settings::default(), &browser, &demo_args("tour"), false)
                .await
                .unwrap_err();
            assert_eq!(err.exit_code(), EXIT_USAGE);
            assert!(err.to_string().contains("homepage, practical, visual, admin"));
        }

        #[tokio::test]
        async fn test_admin_demo_needs_credentials() {
            let browser = MockBrowser::new();
            let err = run_demo(&Settings::default(), &browser, &demo_args("admin"), false)
                .await
                .unwrap_err();
            assert_eq!(err.exit_code(), EXIT_USAGE);
            assert_eq!(browser.launches(), 0);
        }

        #[tokio::test]
        async fn test_launch_failure_is_demo_failure() {
            let dir = tempfile::tempdir().unwrap();
            let browser = MockBrowser::new().with_failing_launch();
            let err = run_demo(&settings(dir.path()), &browser, &demo_args("homepage"), false)
                .await
                .unwrap_err();
            assert!(matches!(err, CliError::DemoFailed { .. }));
            assert_eq!(err.exit_code(), EXIT_FAILURE);
        }
    }

    mod verify_tests {
        use super::*;

        #[test]
        fn test_configured_executable() {
            let dir = tempfile::tempdir().unwrap();
            let exe = dir.path().join("chromium");
            std::fs::write(&exe, b"").unwrap();
            let mut settings = Settings::default();
            settings.browser.executable_path = Some(exe.clone());
            let found = run_verify(&quiet(), &settings).unwrap();
            assert_eq!(found.path, exe);
        }

        #[test]
        fn test_missing_configured_executable_is_usage() {
            let mut settings = Settings::default();
            settings.browser.executable_path = Some("/nonexistent/chromium".into());
            let err = run_verify(&quiet(), &settings).unwrap_err();
            assert_eq!(err.exit_code(), EXIT_USAGE);
        }
    }
}
