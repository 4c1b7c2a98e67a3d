//! Output formatting and progress reporting

use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use pagewalk::{Category, RunListener, RunSummary, Scenario, Suite, TestResult};
use serde::{Deserialize, Serialize};

/// Output format for run results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Progress reporter for a run.
///
/// Progress and status lines go to stderr so stdout stays free for
/// `--format json`.
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar over `total` scenarios
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet || !self.term.is_term() {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Increment progress
    pub fn increment(&self, delta: u64) {
        if let Some(ref pb) = self.progress_bar {
            pb.inc(delta);
        }
    }

    /// Update progress message
    pub fn set_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_message(message.to_string());
        }
    }

    /// Finish and clear the progress bar
    pub fn finish(&mut self) {
        if let Some(pb) = self.progress_bar.take() {
            pb.finish_and_clear();
        }
    }

    fn write_line(&self, line: &str) {
        match &self.progress_bar {
            Some(pb) => pb.println(line),
            None => {
                let _ = self.term.write_line(line);
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        };

        self.write_line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Failures print even in quiet mode
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };

        self.write_line(&format!("{prefix} {message}"));
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("⚠").yellow().bold().to_string()
        } else {
            "WARN".to_string()
        };

        self.write_line(&format!("{prefix} {message}"));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };

        self.write_line(&format!("{prefix} {message}"));
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }

        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };

        self.write_line("");
        self.write_line(&styled);
    }

    /// Print the run summary and every failure
    pub fn summary(&self, summary: &RunSummary) {
        let failures = summary.failures();
        if !failures.is_empty() {
            self.write_line("");
            self.write_line("Failures:");
            for (suite, result) in &failures {
                let error = result.error.as_deref().unwrap_or("unknown error");
                self.write_line(&format!("  {suite} :: {}: {error}", result.name));
            }
        }

        if self.quiet && failures.is_empty() {
            return;
        }

        self.write_line("");
        let passed = summary.passed();
        let failed = summary.failed();
        let total = summary.total();
        let secs = summary.duration.as_secs_f64();
        let percent = summary.pass_percentage();

        if self.use_color {
            let passed_style = Style::new().green().bold();
            let failed_style = Style::new().red().bold();
            let status = if failed > 0 {
                failed_style.apply_to("FAILED")
            } else {
                passed_style.apply_to("PASSED")
            };
            self.write_line(&format!(
                "{status} {total} scenarios in {secs:.2}s ({} passed, {} failed, {percent:.1}%)",
                passed_style.apply_to(passed),
                if failed > 0 {
                    failed_style.apply_to(failed).to_string()
                } else {
                    failed.to_string()
                },
            ));
        } else {
            let status = if failed > 0 { "FAILED" } else { "PASSED" };
            self.write_line(&format!(
                "{status} {total} scenarios in {secs:.2}s ({passed} passed, {failed} failed, {percent:.1}%)"
            ));
        }

        if summary.stopped_early {
            self.warning("stopped at the first failure (--fail-fast)");
        }
    }
}

/// Feeds runner events into a [`ProgressReporter`]
#[derive(Debug)]
pub struct ConsoleListener {
    reporter: ProgressReporter,
    total: usize,
}

impl ConsoleListener {
    /// Listener for a run of `total` scenarios
    #[must_use]
    pub const fn new(reporter: ProgressReporter, total: usize) -> Self {
        Self { reporter, total }
    }
}

impl RunListener for ConsoleListener {
    fn suite_started(&mut self, suite: &Suite) {
        if self.reporter.progress_bar.is_none() {
            self.reporter.start_progress(self.total as u64, suite.name);
        }
        self.reporter
            .header(&format!("{} ({} scenarios)", suite.name, suite.len()));
    }

    fn case_started(&mut self, _suite: &Suite, scenario: &Scenario) {
        self.reporter.set_message(scenario.name);
    }

    fn case_finished(&mut self, _suite: &Suite, result: &TestResult) {
        self.reporter.increment(1);
        let ms = result.duration.as_millis();
        match &result.error {
            None => self.reporter.success(&format!("{} ({ms}ms)", result.name)),
            Some(error) => self
                .reporter
                .failure(&format!("{} ({ms}ms): {error}", result.name)),
        }
    }

    fn run_finished(&mut self, summary: &RunSummary) {
        self.reporter.finish();
        self.reporter.summary(summary);
    }
}

/// Lines for `pagewalk list`
#[must_use]
pub fn listing(registry: &[Suite], demos: &[pagewalk::Demo]) -> Vec<String> {
    let mut lines = vec!["Categories:".to_string()];
    for category in Category::ALL {
        let suites: Vec<_> = registry.iter().filter(|s| s.category == category).collect();
        let scenarios: usize = suites.iter().map(|s| s.len()).sum();
        let note = if category.in_all() { "" } else { " (not in all)" };
        lines.push(format!("  {:<14} {scenarios:>2} scenarios{note}", category.name()));
        for suite in suites {
            for scenario in suite.scenarios {
                lines.push(format!("      {:<36} {}", scenario.name, scenario.description));
            }
        }
    }
    lines.push(String::new());
    lines.push("Demos:".to_string());
    for demo in demos {
        lines.push(format!("  {:<14} {}", demo.name, demo.description));
    }
    lines
}
