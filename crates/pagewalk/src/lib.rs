//! Pagewalk: page-object end-to-end scenarios for live websites.
//!
//! Pagewalk drives a real browser against two production sites, the
//! FriendFilter consumer site and the AceStreamz admin console, through a
//! layered harness:
//!
//! ```text
//! ┌────────────┐   ┌─────────────┐   ┌────────────┐   ┌────────────┐
//! │  Locator   │──►│ Page Object │──►│  Scenario  │──►│   Runner   │
//! │  Catalog   │   │  (pages/)   │   │ (suites/)  │   │ + Reporter │
//! └────────────┘   └─────────────┘   └────────────┘   └────────────┘
//!                         │                                 │
//!                         ▼                                 ▼
//!                  ┌─────────────┐                   ┌────────────┐
//!                  │ PageDriver  │◄──── Session ─────│  Launcher  │
//!                  │ (cdp, mock) │                   │            │
//!                  └─────────────┘                   └────────────┘
//! ```
//!
//! Every scenario runs in its own [`Session`], which is always closed once
//! the scenario finishes, fails, panics or times out.
//!
//! # Example
//!
//! ```no_run
//! use pagewalk::{MockBrowser, Runner, RunnerConfig, Selection, Settings};
//!
//! # async fn run() -> pagewalk::PageWalkResult<()> {
//! let settings = Settings::default();
//! let browser = MockBrowser::new();
//! let mut runner = Runner::new(&browser, &settings, RunnerConfig::new());
//! let summary = runner.run(Selection::parse("errors")?).await;
//! println!("{}/{} passed", summary.passed(), summary.total());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

pub mod assertion;
pub mod catalog;
#[cfg(feature = "browser")]
pub mod cdp;
pub mod config;
pub mod demo;
pub mod driver;
pub mod locator;
pub mod mock;
pub mod network;
pub mod page_object;
pub mod pages;
pub mod reporter;
mod result;
pub mod runner;
pub mod scenario;
pub mod session;
pub mod setup;
pub mod suites;
pub mod wait;

#[cfg(feature = "browser")]
pub use cdp::CdpLauncher;
pub use config::{AdminSettings, BrowserSettings, Credentials, Settings, SiteSettings};
pub use demo::{demo, demo_names, demos, run_demo, Demo, DemoOutcome, Narrator};
pub use driver::{
    BrowserDriver, BrowserEngine, Launcher, PageDriver, Screenshot, ScreenshotTarget,
    SessionConfig, Viewport,
};
pub use locator::{LocatorSpec, Selector};
pub use mock::{MockBrowser, MockDocument, MockElement};
pub use network::UrlPattern;
pub use page_object::{PageContext, PageObject, Target};
pub use reporter::{FailureMode, RunSummary, SuiteReport, TestResult, TestStatus};
pub use result::{PageWalkError, PageWalkResult};
pub use runner::{RunListener, Runner, RunnerConfig, TracingListener};
pub use scenario::{Category, Scenario, Selection, Suite};
pub use session::Session;
pub use setup::{find_browser, BrowserExecutable, BrowserSource};
pub use wait::{LoadState, WaitOptions};
