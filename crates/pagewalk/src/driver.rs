//! Browser automation seam.
//!
//! ```text
//! Launcher ──launch──▶ BrowserDriver ──new_page──▶ PageDriver
//!    │                     │                          │
//!    │ CdpLauncher         │ one browser + context    │ one tab
//!    │ MockBrowser         │                          │
//! ```
//!
//! Everything above this module (sessions, page objects, scenarios) talks
//! to these traits only, so scenarios run unchanged against Chromium or the
//! in-memory mock.

use crate::locator::Selector;
use crate::network::UrlPattern;
use crate::result::PageWalkResult;
use crate::wait::{LoadState, DEFAULT_ELEMENT_TIMEOUT_MS, DEFAULT_NAVIGATION_TIMEOUT_MS};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

// =============================================================================
// SESSION CONFIGURATION
// =============================================================================

/// Desktop user agent presented by default
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Viewport dimensions in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Viewport {
    /// Width
    pub width: u32,
    /// Height
    pub height: u32,
}

impl Viewport {
    /// Desktop 1080p
    pub const DESKTOP: Self = Self::new(1920, 1080);
    /// Portrait tablet
    pub const TABLET: Self = Self::new(768, 1024);
    /// Small phone
    pub const MOBILE: Self = Self::new(375, 667);

    /// Create a viewport
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Widths at or below tablet size get the collapsed site navigation
    #[must_use]
    pub const fn is_compact(&self) -> bool {
        self.width <= Self::TABLET.width
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::DESKTOP
    }
}

impl std::fmt::Display for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Browser engines a launcher may be asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserEngine {
    /// Chromium via the DevTools protocol
    #[default]
    Chromium,
    /// Firefox
    Firefox,
    /// WebKit
    Webkit,
}

impl std::fmt::Display for BrowserEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Chromium => "chromium",
            Self::Firefox => "firefox",
            Self::Webkit => "webkit",
        };
        write!(f, "{name}")
    }
}

/// Browser configuration for one session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Initial viewport
    pub viewport: Viewport,
    /// User agent string
    pub user_agent: Option<String>,
    /// Engine to launch
    pub engine: BrowserEngine,
    /// Timeout for navigation
    pub navigation_timeout: Duration,
    /// Timeout for element waits and popup capture
    pub element_timeout: Duration,
    /// Extra attempts after a navigation timeout
    pub navigation_retries: u32,
    /// Executable path override
    pub executable_path: Option<PathBuf>,
    /// Keep the Chromium sandbox enabled
    pub sandbox: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport: Viewport::DESKTOP,
            user_agent: Some(DEFAULT_USER_AGENT.to_string()),
            engine: BrowserEngine::Chromium,
            navigation_timeout: Duration::from_millis(DEFAULT_NAVIGATION_TIMEOUT_MS),
            element_timeout: Duration::from_millis(DEFAULT_ELEMENT_TIMEOUT_MS),
            navigation_retries: 1,
            executable_path: None,
            sandbox: true,
        }
    }
}

impl SessionConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set headless mode
    #[must_use]
    pub const fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set viewport
    #[must_use]
    pub const fn viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Set user agent
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set engine
    #[must_use]
    pub const fn engine(mut self, engine: BrowserEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Set navigation timeout
    #[must_use]
    pub const fn navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    /// Set element timeout
    #[must_use]
    pub const fn element_timeout(mut self, timeout: Duration) -> Self {
        self.element_timeout = timeout;
        self
    }

    /// Set navigation retry budget
    #[must_use]
    pub const fn navigation_retries(mut self, retries: u32) -> Self {
        self.navigation_retries = retries;
        self
    }

    /// Set browser executable
    #[must_use]
    pub fn executable_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable_path = Some(path.into());
        self
    }

    /// Enable or disable the sandbox
    #[must_use]
    pub const fn sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }
}

// =============================================================================
// SCREENSHOTS
// =============================================================================

/// What a screenshot captures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenshotTarget {
    /// The visible viewport
    Viewport,
    /// The whole scrollable page
    FullPage,
    /// The bounding box of the n-th match of a selector
    Element {
        /// Selector
        selector: Selector,
        /// Match index
        nth: usize,
    },
}

/// Screenshot data with metadata
#[derive(Debug, Clone)]
pub struct Screenshot {
    /// Raw PNG data
    pub data: Vec<u8>,
    /// Timestamp when screenshot was taken
    pub timestamp: SystemTime,
}

impl Screenshot {
    /// Create a new screenshot
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            timestamp: SystemTime::now(),
        }
    }

    /// Get the size in bytes
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Check if screenshot is valid (has data)
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.data.is_empty()
    }

    /// Write the PNG to `path`, creating parent directories
    pub async fn save(&self, path: &Path) -> PageWalkResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, &self.data).await?;
        Ok(())
    }
}

// =============================================================================
// DRIVER TRAITS
// =============================================================================

/// Starts browsers
#[async_trait]
pub trait Launcher: Send + Sync {
    /// Launch a browser with an isolated browsing context
    async fn launch(&self, config: &SessionConfig) -> PageWalkResult<Box<dyn BrowserDriver>>;
}

/// One running browser
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Open a new tab
    async fn new_page(&mut self) -> PageWalkResult<Box<dyn PageDriver>>;

    /// Shut the browser down
    async fn close(&mut self) -> PageWalkResult<()>;
}

/// One tab.
///
/// Element methods address the `nth` match of a [`Selector`]. Interacting
/// with a match that does not exist is an error; callers that tolerate
/// absence check [`PageDriver::count`] first.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate and wait for `wait_until`
    async fn goto(&mut self, url: &str, wait_until: LoadState, timeout: Duration)
        -> PageWalkResult<()>;

    /// Reload and wait for `wait_until`
    async fn reload(&mut self, wait_until: LoadState, timeout: Duration) -> PageWalkResult<()>;

    /// Current URL
    async fn url(&self) -> PageWalkResult<String>;

    /// Document title
    async fn title(&self) -> PageWalkResult<String>;

    /// Serialized document HTML
    async fn content(&self) -> PageWalkResult<String>;

    /// Number of elements matching `selector`
    async fn count(&self, selector: &Selector) -> PageWalkResult<usize>;

    /// Whether the n-th match is rendered and visible; `false` when absent
    async fn is_visible(&self, selector: &Selector, nth: usize) -> PageWalkResult<bool>;

    /// Whether the n-th match is enabled; `false` when absent
    async fn is_enabled(&self, selector: &Selector, nth: usize) -> PageWalkResult<bool>;

    /// Text content of the n-th match
    async fn text_content(&self, selector: &Selector, nth: usize)
        -> PageWalkResult<Option<String>>;

    /// Attribute of the n-th match
    async fn attribute(
        &self,
        selector: &Selector,
        nth: usize,
        name: &str,
    ) -> PageWalkResult<Option<String>>;

    /// Replace the value of the n-th match
    async fn fill(&mut self, selector: &Selector, nth: usize, value: &str) -> PageWalkResult<()>;

    /// Click the n-th match
    async fn click(&mut self, selector: &Selector, nth: usize) -> PageWalkResult<()>;

    /// Focus the n-th match and press `key`
    async fn press(&mut self, selector: &Selector, nth: usize, key: &str) -> PageWalkResult<()>;

    /// Press `key` on whatever has focus
    async fn keyboard_press(&mut self, key: &str) -> PageWalkResult<()>;

    /// Check the n-th match if it is an unchecked checkbox
    async fn check(&mut self, selector: &Selector, nth: usize) -> PageWalkResult<()>;

    /// Resize the viewport
    async fn set_viewport(&mut self, viewport: Viewport) -> PageWalkResult<()>;

    /// Current viewport
    async fn viewport(&self) -> PageWalkResult<Viewport>;

    /// Capture a PNG
    async fn screenshot(&self, target: &ScreenshotTarget) -> PageWalkResult<Screenshot>;

    /// Click the n-th match and return the tab it opens
    async fn click_for_popup(
        &mut self,
        selector: &Selector,
        nth: usize,
        timeout: Duration,
    ) -> PageWalkResult<Box<dyn PageDriver>>;

    /// Fail every subsequent request whose URL matches `pattern`
    async fn block_requests(&mut self, pattern: UrlPattern) -> PageWalkResult<()>;

    /// Close the tab
    async fn close(&mut self) -> PageWalkResult<()>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod viewport_tests {
        use super::*;

        #[test]
        fn test_presets() {
            assert_eq!(Viewport::DESKTOP, Viewport::new(1920, 1080));
            assert_eq!(Viewport::TABLET.to_string(), "768x1024");
            assert_eq!(Viewport::default(), Viewport::DESKTOP);
        }

        #[test]
        fn test_is_compact() {
            assert!(Viewport::MOBILE.is_compact());
            assert!(Viewport::TABLET.is_compact());
            assert!(!Viewport::DESKTOP.is_compact());
        }
    }

    mod session_config_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let config = SessionConfig::default();
            assert!(config.headless);
            assert_eq!(config.viewport, Viewport::DESKTOP);
            assert_eq!(config.navigation_timeout, Duration::from_secs(30));
            assert_eq!(config.element_timeout, Duration::from_secs(5));
            assert_eq!(config.navigation_retries, 1);
            assert_eq!(config.engine, BrowserEngine::Chromium);
        }

        #[test]
        fn test_builder() {
            let config = SessionConfig::new()
                .headless(false)
                .viewport(Viewport::MOBILE)
                .navigation_retries(3)
                .sandbox(false)
                .executable_path("/usr/bin/chromium");
            assert!(!config.headless);
            assert_eq!(config.viewport, Viewport::MOBILE);
            assert_eq!(config.navigation_retries, 3);
            assert!(!config.sandbox);
            assert_eq!(
                config.executable_path.as_deref(),
                Some(Path::new("/usr/bin/chromium"))
            );
        }

        #[test]
        fn test_engine_serde() {
            let engine: BrowserEngine = serde_json::from_str("\"webkit\"").unwrap();
            assert_eq!(engine, BrowserEngine::Webkit);
            assert_eq!(BrowserEngine::Firefox.to_string(), "firefox");
        }
    }

    mod screenshot_tests {
        use super::*;

        #[test]
        fn test_validity() {
            assert!(!Screenshot::new(Vec::new()).is_valid());
            let shot = Screenshot::new(vec![0x89, b'P', b'N', b'G']);
            assert!(shot.is_valid());
            assert_eq!(shot.size_bytes(), 4);
        }

        #[tokio::test]
        async fn test_save_creates_directories() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("nested").join("shot.png");
            Screenshot::new(vec![1, 2, 3]).save(&path).await.unwrap();
            assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3]);
        }
    }
}
