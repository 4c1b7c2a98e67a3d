//! Harness settings.
//!
//! Settings come from an optional YAML file; every field has a default so a
//! partial file (or none) is valid. Credentials are never defaulted: they
//! must come from the file or from the environment via the CLI.

use crate::driver::{BrowserEngine, SessionConfig, Viewport, DEFAULT_USER_AGENT};
use crate::result::{PageWalkError, PageWalkResult};
use crate::wait::{DEFAULT_ELEMENT_TIMEOUT_MS, DEFAULT_NAVIGATION_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default consumer site
pub const DEFAULT_SITE_URL: &str = "https://friendfilter.com";

/// Default admin backend
pub const DEFAULT_ADMIN_URL: &str = "https://acestreamz.com/admin";

/// Login credentials
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Account email
    pub email: String,
    /// Account password
    #[serde(skip_serializing)]
    pub password: String,
}

impl Credentials {
    /// Create credentials
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Consumer site settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    /// Base URL, without trailing slash
    pub base_url: String,
    /// Test account, if any
    pub credentials: Option<Credentials>,
    /// Slowest acceptable DOMContentLoaded time for the landing page
    pub max_load_ms: u64,
    /// Text the landing page title must contain
    pub expected_title: String,
    /// Throwaway address typed into reset and validation forms
    pub probe_email: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SITE_URL.to_string(),
            credentials: None,
            max_load_ms: 5_000,
            expected_title: "FriendFilter".to_string(),
            probe_email: "test@example.com".to_string(),
        }
    }
}

/// Admin backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminSettings {
    /// Base URL of the admin panel
    pub base_url: String,
    /// Admin account
    pub credentials: Option<Credentials>,
    /// Tick "Remember me" on login
    pub remember_me: bool,
    /// User row exercised by the edit flow
    pub user_name: String,
    /// Account row exercised by the view flow
    pub account_name: String,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ADMIN_URL.to_string(),
            credentials: None,
            remember_me: true,
            user_name: "Joy Kumar".to_string(),
            account_name: "bitpixel coders".to_string(),
        }
    }
}

/// Browser launch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Run without a window
    pub headless: bool,
    /// Engine to launch
    pub engine: BrowserEngine,
    /// Initial viewport
    pub viewport: Viewport,
    /// User agent override
    pub user_agent: Option<String>,
    /// Navigation timeout in milliseconds
    pub navigation_timeout_ms: u64,
    /// Element wait and popup timeout in milliseconds
    pub element_timeout_ms: u64,
    /// Extra attempts after a navigation timeout
    pub navigation_retries: u32,
    /// Browser executable
    pub executable_path: Option<PathBuf>,
    /// Keep the Chromium sandbox enabled
    pub sandbox: bool,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            engine: BrowserEngine::Chromium,
            viewport: Viewport::DESKTOP,
            user_agent: Some(DEFAULT_USER_AGENT.to_string()),
            navigation_timeout_ms: DEFAULT_NAVIGATION_TIMEOUT_MS,
            element_timeout_ms: DEFAULT_ELEMENT_TIMEOUT_MS,
            navigation_retries: 1,
            executable_path: None,
            sandbox: true,
        }
    }
}

/// Root settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Consumer site
    pub site: SiteSettings,
    /// Admin backend
    pub admin: AdminSettings,
    /// Browser launch
    pub browser: BrowserSettings,
    /// Where screenshots are written
    pub screenshot_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            site: SiteSettings::default(),
            admin: AdminSettings::default(),
            browser: BrowserSettings::default(),
            screenshot_dir: PathBuf::from("screenshots"),
        }
    }
}

impl Settings {
    /// Parse settings from YAML
    pub fn from_yaml_str(yaml: &str) -> PageWalkResult<Self> {
        let settings: Self = serde_yaml_ng::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a YAML file
    pub fn load(path: &Path) -> PageWalkResult<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|err| PageWalkError::Config {
            message: format!("cannot read {}: {err}", path.display()),
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Reject settings no run could succeed with
    pub fn validate(&self) -> PageWalkResult<()> {
        for (name, url) in [
            ("site.base_url", &self.site.base_url),
            ("admin.base_url", &self.admin.base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(PageWalkError::Config {
                    message: format!("{name} must be an http(s) URL, got {url:?}"),
                });
            }
        }
        if self.browser.navigation_timeout_ms == 0 || self.browser.element_timeout_ms == 0 {
            return Err(PageWalkError::Config {
                message: "browser timeouts must be greater than zero".to_string(),
            });
        }
        if self.browser.viewport.width == 0 || self.browser.viewport.height == 0 {
            return Err(PageWalkError::Config {
                message: "browser.viewport must be non-empty".to_string(),
            });
        }
        Ok(())
    }

    /// Session configuration for these settings
    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        let browser = &self.browser;
        let mut config = SessionConfig::new()
            .headless(browser.headless)
            .viewport(browser.viewport)
            .engine(browser.engine)
            .navigation_timeout(Duration::from_millis(browser.navigation_timeout_ms))
            .element_timeout(Duration::from_millis(browser.element_timeout_ms))
            .navigation_retries(browser.navigation_retries)
            .sandbox(browser.sandbox);
        config.user_agent.clone_from(&browser.user_agent);
        if let Some(path) = &browser.executable_path {
            config = config.executable_path(path.clone());
        }
        config
    }

    /// Consumer site account, required by flows that log in
    pub fn site_credentials(&self) -> PageWalkResult<&Credentials> {
        self.site
            .credentials
            .as_ref()
            .ok_or_else(|| PageWalkError::MissingCredentials {
                site: self.site.base_url.clone(),
            })
    }

    /// Admin account, required by the admin flows
    pub fn admin_credentials(&self) -> PageWalkResult<&Credentials> {
        self.admin
            .credentials
            .as_ref()
            .ok_or_else(|| PageWalkError::MissingCredentials {
                site: self.admin.base_url.clone(),
            })
    }

    /// Path for a named screenshot
    #[must_use]
    pub fn screenshot_path(&self, name: &str) -> PathBuf {
        self.screenshot_dir.join(format!("{name}.png"))
    }
}
