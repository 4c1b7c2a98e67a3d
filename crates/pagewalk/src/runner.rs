//! Sequential scenario runner.
//!
//! Scenarios run one at a time, each over its own [`Session`]. A failing,
//! panicking or timed-out scenario is recorded and the run moves on unless
//! [`FailureMode::FailFast`] is configured.

use crate::config::Settings;
use crate::driver::Launcher;
use crate::reporter::{FailureMode, RunSummary, SuiteReport, TestResult};
use crate::result::PageWalkResult;
use crate::scenario::{Scenario, Selection, Suite};
use crate::session::Session;
use crate::suites;
use std::time::{Duration, Instant};

/// Runner options
#[derive(Debug, Clone, Copy, Default)]
pub struct RunnerConfig {
    /// Upper bound on one scenario, session setup excluded
    pub case_timeout: Option<Duration>,
    /// Behavior after a failure
    pub failure_mode: FailureMode,
}

impl RunnerConfig {
    /// Create default config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set per-scenario timeout
    #[must_use]
    pub const fn case_timeout(mut self, timeout: Duration) -> Self {
        self.case_timeout = Some(timeout);
        self
    }

    /// Stop at the first failure
    #[must_use]
    pub const fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.failure_mode = if fail_fast {
            FailureMode::FailFast
        } else {
            FailureMode::CollectAll
        };
        self
    }
}

/// Observer of run progress
pub trait RunListener {
    /// A suite is about to run
    fn suite_started(&mut self, _suite: &Suite) {}

    /// A scenario is about to run
    fn case_started(&mut self, _suite: &Suite, _scenario: &Scenario) {}

    /// A scenario finished
    fn case_finished(&mut self, _suite: &Suite, _result: &TestResult) {}

    /// The run finished
    fn run_finished(&mut self, _summary: &RunSummary) {}
}

/// Logs progress through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingListener;

impl RunListener for TracingListener {
    fn suite_started(&mut self, suite: &Suite) {
        tracing::info!(suite = suite.name, scenarios = suite.len(), "running suite");
    }

    fn case_started(&mut self, suite: &Suite, scenario: &Scenario) {
        tracing::debug!(suite = suite.name, scenario = scenario.name, "running scenario");
    }

    fn case_finished(&mut self, suite: &Suite, result: &TestResult) {
        let ms = result.duration.as_millis() as u64;
        match &result.error {
            None => tracing::info!(suite = suite.name, scenario = %result.name, ms, "passed"),
            Some(error) => {
                tracing::warn!(suite = suite.name, scenario = %result.name, ms, error = %error, "failed");
            }
        }
    }

    fn run_finished(&mut self, summary: &RunSummary) {
        tracing::info!(
            total = summary.total(),
            passed = summary.passed(),
            failed = summary.failed(),
            "run finished"
        );
    }
}

/// Runs selected suites against a launcher
pub struct Runner<'r> {
    launcher: &'r dyn Launcher,
    settings: &'r Settings,
    config: RunnerConfig,
    listeners: Vec<Box<dyn RunListener + 'r>>,
}

impl std::fmt::Debug for Runner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("config", &self.config)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl<'r> Runner<'r> {
    /// Runner with no listeners
    #[must_use]
    pub fn new(launcher: &'r dyn Launcher, settings: &'r Settings, config: RunnerConfig) -> Self {
        Self {
            launcher,
            settings,
            config,
            listeners: Vec::new(),
        }
    }

    /// Add a listener
    #[must_use]
    pub fn with_listener(mut self, listener: impl RunListener + 'r) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Run every registered suite the selection includes
    pub async fn run(&mut self, selection: Selection) -> RunSummary {
        let selected = selection.suites(suites::registry());
        self.run_suites(&selection.to_string(), selected).await
    }

    /// Run `suites` in order
    pub async fn run_suites<'s>(
        &mut self,
        label: &str,
        suites: impl IntoIterator<Item = &'s Suite>,
    ) -> RunSummary {
        let start = Instant::now();
        let mut summary = RunSummary::new(label);

        'suites: for suite in suites {
            self.notify(|l| l.suite_started(suite));
            let mut report = SuiteReport::new(suite.name, suite.category);

            for scenario in suite.scenarios {
                self.notify(|l| l.case_started(suite, scenario));
                let result = self.run_scenario(scenario).await;
                self.notify(|l| l.case_finished(suite, &result));
                let failed = result.status.is_failed();
                report.results.push(result);

                if failed && self.config.failure_mode == FailureMode::FailFast {
                    summary.suites.push(report);
                    summary.stopped_early = true;
                    break 'suites;
                }
            }
            summary.suites.push(report);
        }

        summary.duration = start.elapsed();
        self.notify(|l| l.run_finished(&summary));
        summary
    }

    /// Run one scenario over a fresh session
    pub async fn run_scenario(&self, scenario: &Scenario) -> TestResult {
        let start = Instant::now();
        let outcome = self.execute(scenario).await;
        let duration = start.elapsed();
        match outcome {
            Ok(()) => TestResult::passed(scenario.name, duration),
            Err(err) => TestResult::failed(scenario.name, duration, err.to_string()),
        }
    }

    async fn execute(&self, scenario: &Scenario) -> PageWalkResult<()> {
        let mut config = self.settings.session_config();
        if let Some(viewport) = scenario.viewport {
            config = config.viewport(viewport);
        }
        Session::scoped_with(
            self.launcher,
            config,
            self.config.case_timeout,
            self.settings,
            scenario.body,
        )
        .await
    }

    fn notify(&mut self, mut event: impl FnMut(&mut dyn RunListener)) {
        for listener in &mut self.listeners {
            event(listener.as_mut());
        }
    }
}
