//! Browser executable discovery.
//!
//! Lookup order: explicit path from settings, `CHROMIUM_PATH`, the `PATH`
//! search for well-known binary names, then common install locations.

use crate::result::{PageWalkError, PageWalkResult};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Environment variable naming a browser executable
pub const CHROMIUM_PATH_ENV: &str = "CHROMIUM_PATH";

#[cfg(not(windows))]
const BINARY_NAMES: [&str; 4] = [
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
];

#[cfg(windows)]
const BINARY_NAMES: [&str; 2] = ["chrome.exe", "chromium.exe"];

#[cfg(not(windows))]
const COMMON_LOCATIONS: [&str; 5] = [
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
];

#[cfg(windows)]
const COMMON_LOCATIONS: [&str; 2] = [
    "C:\\Program Files\\Google\\Chrome\\Application\\chrome.exe",
    "C:\\Program Files (x86)\\Google\\Chrome\\Application\\chrome.exe",
];

/// Where a browser executable was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserSource {
    /// `browser.executable_path` in settings
    Settings,
    /// The `CHROMIUM_PATH` environment variable
    Environment,
    /// A directory on `PATH`
    SearchPath,
    /// A well-known install location
    InstallLocation,
}

impl std::fmt::Display for BrowserSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Settings => "settings",
            Self::Environment => CHROMIUM_PATH_ENV,
            Self::SearchPath => "PATH",
            Self::InstallLocation => "install location",
        };
        write!(f, "{name}")
    }
}

/// A located browser executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserExecutable {
    /// Executable path
    pub path: PathBuf,
    /// How it was found
    pub source: BrowserSource,
}

/// Find a Chromium-family executable using the process environment
pub fn find_browser(configured: Option<&Path>) -> PageWalkResult<BrowserExecutable> {
    let env_path = std::env::var_os(CHROMIUM_PATH_ENV);
    let search_path = std::env::var_os("PATH");
    find_browser_with(configured, env_path.as_deref(), search_path.as_deref())
}

/// [`find_browser`] with the environment passed in
pub fn find_browser_with(
    configured: Option<&Path>,
    env_path: Option<&OsStr>,
    search_path: Option<&OsStr>,
) -> PageWalkResult<BrowserExecutable> {
    if let Some(path) = configured {
        // A configured path must exist.
        if path.is_file() {
            return Ok(found(path.to_path_buf(), BrowserSource::Settings));
        }
        return Err(PageWalkError::Config {
            message: format!("browser.executable_path {} does not exist", path.display()),
        });
    }

    if let Some(path) = env_path.map(PathBuf::from) {
        if path.is_file() {
            return Ok(found(path, BrowserSource::Environment));
        }
        tracing::warn!(path = %path.display(), "{CHROMIUM_PATH_ENV} does not point to a file");
    }

    if let Some(search_path) = search_path {
        for dir in std::env::split_paths(search_path) {
            for name in BINARY_NAMES {
                let candidate = dir.join(name);
                if candidate.is_file() {
                    return Ok(found(candidate, BrowserSource::SearchPath));
                }
            }
        }
    }

    COMMON_LOCATIONS
        .iter()
        .map(PathBuf::from)
        .find(|path| path.is_file())
        .map(|path| found(path, BrowserSource::InstallLocation))
        .ok_or(PageWalkError::BrowserNotFound)
}

fn found(path: PathBuf, source: BrowserSource) -> BrowserExecutable {
    tracing::debug!(path = %path.display(), %source, "browser executable found");
    BrowserExecutable { path, source }
}
