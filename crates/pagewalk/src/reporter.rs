//! Run results: per scenario, per suite and for the whole run.

use crate::result::PageWalkResult;
use crate::scenario::Category;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name of the JSON run report
pub const REPORT_FILE: &str = "run-report.json";

/// What the runner does after a failed scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Record the failure and keep going
    #[default]
    CollectAll,
    /// Stop the run at the first failure
    FailFast,
}

// =============================================================================
// SCENARIO RESULTS
// =============================================================================

/// Scenario outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// Body completed
    Passed,
    /// Body failed, panicked or timed out
    Failed,
}

impl TestStatus {
    /// Check if status is passing
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Check if status is failing
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// Result of one scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    /// Scenario name
    pub name: String,
    /// Outcome
    pub status: TestStatus,
    /// Failure description
    pub error: Option<String>,
    /// Wall time including session setup and teardown
    pub duration: Duration,
}

impl TestResult {
    /// Create a passing result
    #[must_use]
    pub fn passed(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Passed,
            error: None,
            duration,
        }
    }

    /// Create a failing result
    #[must_use]
    pub fn failed(name: impl Into<String>, duration: Duration, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Failed,
            error: Some(error.into()),
            duration,
        }
    }
}

// =============================================================================
// SUITE REPORTS
// =============================================================================

/// Results of one suite, in execution order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Suite name
    pub suite: String,
    /// Suite category
    pub category: Category,
    /// Scenario results
    pub results: Vec<TestResult>,
}

impl SuiteReport {
    /// Empty report for a suite
    #[must_use]
    pub fn new(suite: impl Into<String>, category: Category) -> Self {
        Self {
            suite: suite.into(),
            category,
            results: Vec::new(),
        }
    }

    /// Number of results
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Count passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.status.is_passed()).count()
    }

    /// Count failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| r.status.is_failed()).count()
    }

    /// Failed results
    #[must_use]
    pub fn failures(&self) -> Vec<&TestResult> {
        self.results.iter().filter(|r| r.status.is_failed()).collect()
    }
}

// =============================================================================
// RUN SUMMARY
// =============================================================================

/// Aggregate of a whole run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Selection the run was started with
    pub selection: String,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Total wall time
    pub duration: Duration,
    /// Per-suite results, in execution order
    pub suites: Vec<SuiteReport>,
    /// Set when fail-fast stopped the run early
    pub stopped_early: bool,
}

impl RunSummary {
    /// Empty summary
    #[must_use]
    pub fn new(selection: impl Into<String>) -> Self {
        Self {
            selection: selection.into(),
            started_at: Utc::now(),
            duration: Duration::ZERO,
            suites: Vec::new(),
            stopped_early: false,
        }
    }

    /// Scenarios executed
    #[must_use]
    pub fn total(&self) -> usize {
        self.suites.iter().map(SuiteReport::total).sum()
    }

    /// Scenarios passed
    #[must_use]
    pub fn passed(&self) -> usize {
        self.suites.iter().map(SuiteReport::passed_count).sum()
    }

    /// Scenarios failed
    #[must_use]
    pub fn failed(&self) -> usize {
        self.suites.iter().map(SuiteReport::failed_count).sum()
    }

    /// Check if every executed scenario passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    /// Overall pass percentage; 100 for an empty run
    #[must_use]
    pub fn pass_percentage(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 100.0;
        }
        self.passed() as f64 / total as f64 * 100.0
    }

    /// Report for a suite by name
    #[must_use]
    pub fn suite(&self, name: &str) -> Option<&SuiteReport> {
        self.suites.iter().find(|s| s.suite == name)
    }

    /// Every failed result with its suite name
    #[must_use]
    pub fn failures(&self) -> Vec<(&str, &TestResult)> {
        self.suites
            .iter()
            .flat_map(|s| s.failures().into_iter().map(move |r| (s.suite.as_str(), r)))
            .collect()
    }

    /// Pretty JSON
    pub fn to_json(&self) -> PageWalkResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write [`REPORT_FILE`] into `dir`, creating it when needed
    pub fn write_json(&self, dir: &Path) -> PageWalkResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(REPORT_FILE);
        std::fs::write(&path, self.to_json()?)?;
        Ok(path)
    }
}
