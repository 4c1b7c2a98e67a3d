//! Wait mechanisms.
//!
//! Every wait polls a condition against the live page until it holds or a
//! deadline passes. Nothing in the harness sleeps for a fixed duration.
//!
//! ## Primitives
//!
//! - [`poll_until`]: any async condition; errors from the condition abort
//!   the wait at once
//! - [`wait_for_element`]: one selector reaching an [`ElementState`]
//! - [`wait_for_url`]: the page URL matching a [`UrlPattern`]
//!
//! ## Timeouts
//!
//! Element waits default to [`DEFAULT_ELEMENT_TIMEOUT_MS`], navigation to
//! [`DEFAULT_NAVIGATION_TIMEOUT_MS`]. An expired wait is
//! [`PageWalkError::Timeout`](crate::PageWalkError::Timeout); page objects
//! turn it into `false` where absence is acceptable.

use crate::driver::PageDriver;
use crate::locator::Selector;
use crate::network::UrlPattern;
use crate::result::{PageWalkError, PageWalkResult};
use std::future::Future;
use std::time::{Duration, Instant};

// =============================================================================
// DEFAULTS
// =============================================================================

/// Default timeout for element waits (5 seconds)
pub const DEFAULT_ELEMENT_TIMEOUT_MS: u64 = 5_000;

/// Default timeout for navigation (30 seconds)
pub const DEFAULT_NAVIGATION_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

// =============================================================================
// LOAD STATE
// =============================================================================

/// Page load states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadState {
    /// Wait for the `load` event to fire
    Load,
    /// Wait for `DOMContentLoaded` event
    #[default]
    DomContentLoaded,
    /// Wait for the network to settle after `load`
    NetworkIdle,
}

impl LoadState {
    /// Get the JavaScript event name for this load state
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::DomContentLoaded => "DOMContentLoaded",
            Self::NetworkIdle => "networkidle",
        }
    }

    /// Whether `document.readyState` satisfies this load state
    #[must_use]
    pub fn is_reached(&self, ready_state: &str) -> bool {
        match self {
            Self::DomContentLoaded => matches!(ready_state, "interactive" | "complete"),
            Self::Load | Self::NetworkIdle => ready_state == "complete",
        }
    }
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.event_name())
    }
}

// =============================================================================
// ELEMENT STATE
// =============================================================================

/// Element states an element wait can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementState {
    /// At least one match in the DOM
    Attached,
    /// No match in the DOM
    Detached,
    /// First match rendered and visible
    Visible,
    /// No visible first match
    Hidden,
}

impl std::fmt::Display for ElementState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Attached => "attached",
            Self::Detached => "detached",
            Self::Visible => "visible",
            Self::Hidden => "hidden",
        };
        write!(f, "{name}")
    }
}

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_ELEMENT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// POLLING
// =============================================================================

/// Poll `check` until it yields `true` or the timeout elapses.
///
/// Errors from `check` abort the wait immediately.
pub async fn poll_until<F, Fut>(what: &str, options: &WaitOptions, mut check: F) -> PageWalkResult<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PageWalkResult<bool>>,
{
    let deadline = Instant::now() + options.timeout();
    loop {
        if check().await? {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(PageWalkError::timeout(what, options.timeout_ms));
        }
        tokio::time::sleep(options.poll_interval()).await;
    }
}

/// Wait until the first match of `selector` reaches `state`
pub async fn wait_for_element(
    page: &dyn PageDriver,
    selector: &Selector,
    state: ElementState,
    options: &WaitOptions,
) -> PageWalkResult<()> {
    let what = format!("{selector} to be {state}");
    poll_until(&what, options, || async {
        Ok(match state {
            ElementState::Attached => page.count(selector).await? > 0,
            ElementState::Detached => page.count(selector).await? == 0,
            ElementState::Visible => page.is_visible(selector, 0).await?,
            ElementState::Hidden => !page.is_visible(selector, 0).await?,
        })
    })
    .await
}

/// Wait until the page URL matches `pattern`
pub async fn wait_for_url(
    page: &dyn PageDriver,
    pattern: &UrlPattern,
    options: &WaitOptions,
) -> PageWalkResult<()> {
    let what = format!("URL matching {pattern}");
    poll_until(&what, options, || async { Ok(pattern.matches(&page.url().await?)) }).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    mod load_state_tests {
        use super::*;

        #[test]
        fn test_default_is_dom_content_loaded() {
            assert_eq!(LoadState::default(), LoadState::DomContentLoaded);
        }

        #[test]
        fn test_is_reached() {
            assert!(LoadState::DomContentLoaded.is_reached("interactive"));
            assert!(LoadState::DomContentLoaded.is_reached("complete"));
            assert!(!LoadState::DomContentLoaded.is_reached("loading"));
            assert!(!LoadState::Load.is_reached("interactive"));
            assert!(LoadState::Load.is_reached("complete"));
        }

        #[test]
        fn test_display() {
            assert_eq!(LoadState::Load.to_string(), "load");
            assert_eq!(ElementState::Visible.to_string(), "visible");
        }
    }

    mod poll_tests {
        use super::*;

        #[tokio::test]
        async fn test_poll_until_succeeds_after_retries() {
            let calls = AtomicU32::new(0);
            let options = WaitOptions::new().with_timeout(1_000).with_poll_interval(1);
            poll_until("third call", &options, || async {
                Ok(calls.fetch_add(1, Ordering::SeqCst) >= 2)
            })
            .await
            .unwrap();
            assert_eq!(calls.load(Ordering::SeqCst), 3);
        }

        #[tokio::test]
        async fn test_poll_until_times_out() {
            let options = WaitOptions::new().with_timeout(20).with_poll_interval(5);
            let err = poll_until("never", &options, || async { Ok(false) })
                .await
                .unwrap_err();
            assert!(err.is_timeout());
            assert!(err.to_string().contains("never"));
        }

        #[tokio::test]
        async fn test_poll_until_propagates_errors() {
            let options = WaitOptions::new().with_timeout(1_000);
            let err = poll_until("broken", &options, || async {
                Err(PageWalkError::page("detached"))
            })
            .await
            .unwrap_err();
            assert!(!err.is_timeout());
        }
    }

    mod element_tests {
        use super::*;
        use crate::driver::{Launcher, SessionConfig, Viewport};
        use crate::mock::{MockBrowser, MockDocument, MockElement};

        const HOME: &str = "https://friendfilter.com";

        async fn open_page(browser: &MockBrowser) -> Box<dyn PageDriver> {
            let mut driver = browser.launch(&SessionConfig::default()).await.unwrap();
            let mut page = driver.new_page().await.unwrap();
            page.goto(HOME, LoadState::Load, Duration::from_secs(1))
                .await
                .unwrap();
            page
        }

        #[tokio::test]
        async fn test_wait_for_element_states() {
            let browser = MockBrowser::new().with_document(
                HOME,
                MockDocument::new("FriendFilter")
                    .element(MockElement::new(Selector::css("h1")))
                    .element(MockElement::new(Selector::css(".hamburger")).visible_up_to(768)),
            );
            let page = open_page(&browser).await;
            let options = WaitOptions::new().with_timeout(20).with_poll_interval(5);
            let heading = Selector::css("h1");
            let burger = Selector::css(".hamburger");

            wait_for_element(&*page, &heading, ElementState::Visible, &options)
                .await
                .unwrap();
            wait_for_element(&*page, &burger, ElementState::Attached, &options)
                .await
                .unwrap();
            wait_for_element(&*page, &burger, ElementState::Hidden, &options)
                .await
                .unwrap();
            wait_for_element(&*page, &Selector::css("footer"), ElementState::Detached, &options)
                .await
                .unwrap();
        }

        #[tokio::test]
        async fn test_wait_for_element_follows_viewport() {
            let browser = MockBrowser::new().with_document(
                HOME,
                MockDocument::new("FriendFilter")
                    .element(MockElement::new(Selector::css(".hamburger")).visible_up_to(768)),
            );
            let mut page = open_page(&browser).await;
            let options = WaitOptions::new().with_timeout(20).with_poll_interval(5);
            let burger = Selector::css(".hamburger");

            let err = wait_for_element(&*page, &burger, ElementState::Visible, &options)
                .await
                .unwrap_err();
            assert!(err.is_timeout());
            assert!(err.to_string().contains("to be visible"));

            page.set_viewport(Viewport::MOBILE).await.unwrap();
            wait_for_element(&*page, &burger, ElementState::Visible, &options)
                .await
                .unwrap();
        }
    }
}
