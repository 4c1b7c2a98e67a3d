//! Page Object Model support.
//!
//! A page object binds a [`PageContext`] (the session's tab, a base URL and
//! the page's [`LocatorCatalog`]) and exposes the page's actions. Every
//! action goes through the gated primitives below: resolve the target's
//! strategies against the live DOM, act once on a match, and report
//! absence as `None`/`false` instead of failing.

use crate::catalog::LocatorCatalog;
use crate::driver::PageDriver;
use crate::locator::{Located, LocatorSpec, Selector};
use crate::result::PageWalkResult;
use crate::session::Session;
use crate::network::UrlPattern;
use crate::wait::{self, poll_until, ElementState, LoadState, WaitOptions};
use futures::future::BoxFuture;
use std::time::{Duration, Instant};

// =============================================================================
// TARGETS
// =============================================================================

/// Something resolvable to selector strategies: a catalog name or an
/// ad-hoc [`LocatorSpec`]
pub trait Target: Sync {
    /// Strategies in priority order
    fn strategies<'c>(&'c self, catalog: &'c LocatorCatalog) -> &'c [Selector];

    /// Name for logs
    fn label(&self) -> &str;
}

impl Target for str {
    fn strategies<'c>(&'c self, catalog: &'c LocatorCatalog) -> &'c [Selector] {
        catalog.strategies(self)
    }

    fn label(&self) -> &str {
        self
    }
}

impl Target for LocatorSpec {
    fn strategies<'c>(&'c self, _catalog: &'c LocatorCatalog) -> &'c [Selector] {
        LocatorSpec::strategies(self)
    }

    fn label(&self) -> &str {
        self.name()
    }
}

// =============================================================================
// PAGE CONTEXT
// =============================================================================

/// A session's tab seen through one page's catalog
pub struct PageContext<'a> {
    page: &'a mut dyn PageDriver,
    base_url: &'a str,
    catalog: &'static LocatorCatalog,
    navigation_timeout: Duration,
    element_timeout: Duration,
    navigation_retries: u32,
}

impl std::fmt::Debug for PageContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageContext")
            .field("page", &self.catalog.page())
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl<'a> PageContext<'a> {
    /// Bind the session's active tab
    pub fn new(
        session: &'a mut Session,
        base_url: &'a str,
        catalog: &'static LocatorCatalog,
    ) -> PageWalkResult<Self> {
        let config = session.config();
        let navigation_timeout = config.navigation_timeout;
        let element_timeout = config.element_timeout;
        let navigation_retries = config.navigation_retries;
        Ok(Self {
            page: session.page()?,
            base_url: base_url.trim_end_matches('/'),
            catalog,
            navigation_timeout,
            element_timeout,
            navigation_retries,
        })
    }

    /// The underlying tab, for calls with no gated equivalent
    pub fn page(&mut self) -> &mut dyn PageDriver {
        &mut *self.page
    }

    /// Catalog this context resolves names against
    #[must_use]
    pub const fn catalog(&self) -> &'static LocatorCatalog {
        self.catalog
    }

    /// Base URL without trailing slash
    #[must_use]
    pub const fn base_url(&self) -> &str {
        self.base_url
    }

    /// Element wait and popup timeout
    #[must_use]
    pub const fn element_timeout(&self) -> Duration {
        self.element_timeout
    }

    /// Absolute URL for a path relative to the base URL
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Navigate to base URL + `path` and wait for DOMContentLoaded.
    ///
    /// Timeouts are retried up to the session's navigation retry budget;
    /// any other error is returned at once.
    pub async fn navigate(&mut self, path: &str) -> PageWalkResult<()> {
        let url = self.url_for(path);
        self.goto(&url).await
    }

    /// Navigate to an absolute URL with the same retry policy as
    /// [`PageContext::navigate`]
    pub async fn goto(&mut self, url: &str) -> PageWalkResult<()> {
        let attempts = self.navigation_retries + 1;
        let mut attempt = 1;
        loop {
            tracing::debug!(url, attempt, "navigating");
            match self
                .page
                .goto(url, LoadState::DomContentLoaded, self.navigation_timeout)
                .await
            {
                Ok(()) => return Ok(()),
                Err(err) if err.is_timeout() && attempt < attempts => {
                    tracing::warn!(url, attempt, error = %err, "navigation timed out; retrying");
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// First strategy with at least one match, or `None`
    pub async fn resolve<T: Target + ?Sized>(&self, target: &T) -> PageWalkResult<Option<Located>> {
        for selector in target.strategies(self.catalog) {
            let count = self.page.count(selector).await?;
            if count > 0 {
                return Ok(Some(Located {
                    selector: selector.clone(),
                    count,
                }));
            }
        }
        Ok(None)
    }

    /// Number of matches of the winning strategy
    pub async fn count<T: Target + ?Sized>(&self, target: &T) -> PageWalkResult<usize> {
        Ok(self.resolve(target).await?.map_or(0, |l| l.count))
    }

    /// Whether the target resolves at all
    pub async fn is_present<T: Target + ?Sized>(&self, target: &T) -> PageWalkResult<bool> {
        Ok(self.resolve(target).await?.is_some())
    }

    /// Whether the first match is visible; `false` when absent
    pub async fn is_visible<T: Target + ?Sized>(&self, target: &T) -> PageWalkResult<bool> {
        self.is_nth_visible(target, 0).await
    }

    /// Whether the n-th match is visible; `false` when absent
    pub async fn is_nth_visible<T: Target + ?Sized>(
        &self,
        target: &T,
        nth: usize,
    ) -> PageWalkResult<bool> {
        match self.resolve(target).await? {
            Some(located) if nth < located.count => self.page.is_visible(&located.selector, nth).await,
            _ => Ok(false),
        }
    }

    /// Text of the first match
    pub async fn text<T: Target + ?Sized>(&self, target: &T) -> PageWalkResult<Option<String>> {
        match self.resolve(target).await? {
            Some(located) => self.page.text_content(&located.selector, 0).await,
            None => Ok(None),
        }
    }

    /// Attribute of the n-th match
    pub async fn attribute<T: Target + ?Sized>(
        &self,
        target: &T,
        nth: usize,
        name: &str,
    ) -> PageWalkResult<Option<String>> {
        match self.resolve(target).await? {
            Some(located) if nth < located.count => {
                self.page.attribute(&located.selector, nth, name).await
            }
            _ => Ok(None),
        }
    }

    /// Poll until the target is visible, up to the element timeout.
    ///
    /// Returns `false` instead of failing when the target never shows up.
    pub async fn wait_visible<T: Target + ?Sized>(&self, target: &T) -> PageWalkResult<bool> {
        let started = Instant::now();
        let options = WaitOptions::new().with_timeout(self.element_timeout.as_millis() as u64);
        // A strategy may only start matching once the page renders it.
        let located = match poll_until(target.label(), &options, || self.is_present(target)).await {
            Ok(()) => self.resolve(target).await?,
            Err(err) if err.is_timeout() => None,
            Err(err) => return Err(err),
        };
        let Some(located) = located else {
            tracing::debug!(element = target.label(), "element never attached");
            return Ok(false);
        };

        let remaining = self.element_timeout.saturating_sub(started.elapsed());
        let options = WaitOptions::new().with_timeout(remaining.as_millis() as u64);
        let waited =
            wait::wait_for_element(&*self.page, &located.selector, ElementState::Visible, &options)
                .await;
        match waited {
            Ok(()) => Ok(true),
            Err(err) if err.is_timeout() => {
                tracing::debug!(element = target.label(), "element never became visible");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Poll until the page URL matches `pattern`, up to the navigation
    /// timeout. Returns `false` when it never does.
    pub async fn wait_for_url(&self, pattern: &UrlPattern) -> PageWalkResult<bool> {
        let options = WaitOptions::new().with_timeout(self.navigation_timeout.as_millis() as u64);
        match wait::wait_for_url(&*self.page, pattern, &options).await {
            Ok(()) => Ok(true),
            Err(err) if err.is_timeout() => {
                tracing::debug!(%pattern, "URL never matched");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Fill the first match
    pub async fn fill_if_present<T: Target + ?Sized>(
        &mut self,
        target: &T,
        value: &str,
    ) -> PageWalkResult<bool> {
        let Some(located) = self.resolve_or_skip(target, "fill").await? else {
            return Ok(false);
        };
        self.page.fill(&located.selector, 0, value).await?;
        Ok(true)
    }

    /// Click the first match
    pub async fn click_if_present<T: Target + ?Sized>(&mut self, target: &T) -> PageWalkResult<bool> {
        self.click_nth_if_present(target, 0).await
    }

    /// Click the n-th match; skipped when there are not enough matches
    pub async fn click_nth_if_present<T: Target + ?Sized>(
        &mut self,
        target: &T,
        nth: usize,
    ) -> PageWalkResult<bool> {
        let Some(located) = self.resolve_or_skip(target, "click").await? else {
            return Ok(false);
        };
        if nth >= located.count {
            tracing::debug!(
                page = self.catalog.page(),
                element = target.label(),
                nth,
                count = located.count,
                "not enough matches; skipping click"
            );
            return Ok(false);
        }
        self.page.click(&located.selector, nth).await?;
        Ok(true)
    }

    /// Press `key` with the first match focused
    pub async fn press_if_present<T: Target + ?Sized>(
        &mut self,
        target: &T,
        key: &str,
    ) -> PageWalkResult<bool> {
        let Some(located) = self.resolve_or_skip(target, "press").await? else {
            return Ok(false);
        };
        self.page.press(&located.selector, 0, key).await?;
        Ok(true)
    }

    /// Check the first match
    pub async fn check_if_present<T: Target + ?Sized>(&mut self, target: &T) -> PageWalkResult<bool> {
        let Some(located) = self.resolve_or_skip(target, "check").await? else {
            return Ok(false);
        };
        self.page.check(&located.selector, 0).await?;
        Ok(true)
    }

    /// Click the first match and capture the tab it opens.
    ///
    /// Absence yields `None`; a popup that never appears is a timeout.
    pub async fn popup_if_present<T: Target + ?Sized>(
        &mut self,
        target: &T,
    ) -> PageWalkResult<Option<Box<dyn PageDriver>>> {
        let Some(located) = self.resolve_or_skip(target, "open popup from").await? else {
            return Ok(None);
        };
        let popup = self
            .page
            .click_for_popup(&located.selector, 0, self.element_timeout)
            .await?;
        Ok(Some(popup))
    }

    async fn resolve_or_skip<T: Target + ?Sized>(
        &self,
        target: &T,
        action: &str,
    ) -> PageWalkResult<Option<Located>> {
        let located = self.resolve(target).await?;
        if located.is_none() {
            tracing::debug!(
                page = self.catalog.page(),
                element = target.label(),
                "element absent; skipping {action}"
            );
        }
        Ok(located)
    }
}

// =============================================================================
// PAGE OBJECT TRAIT
// =============================================================================

/// A page of the site under test
pub trait PageObject<'a>: Send {
    /// Path relative to the site's base URL
    fn path(&self) -> &'static str {
        ""
    }

    /// Page name for logging
    fn page_name(&self) -> &'static str;

    /// Locator catalog for this page
    fn catalog(&self) -> &'static LocatorCatalog;

    /// Catalog name of the container whose visibility means "loaded"
    fn loaded_marker(&self) -> &'static str {
        "body"
    }

    /// Context the page acts through
    fn context(&mut self) -> &mut PageContext<'a>;

    /// Navigate to this page and wait for its content
    fn load<'s>(&'s mut self) -> BoxFuture<'s, PageWalkResult<()>>
    where
        'a: 's,
    {
        let path = self.path();
        let name = self.page_name();
        let ctx = self.context();
        Box::pin(async move {
            tracing::info!(page = name, path, "loading page");
            ctx.navigate(path).await
        })
    }

    /// Whether the page's defining container is visible
    fn is_loaded<'s>(&'s mut self) -> BoxFuture<'s, PageWalkResult<bool>>
    where
        'a: 's,
    {
        let marker = self.loaded_marker();
        let ctx = self.context();
        Box::pin(async move { ctx.is_visible(marker).await })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::driver::SessionConfig;
    use crate::mock::{MockBrowser, MockDocument, MockElement};

    const HOME: &str = "https://friendfilter.com";

    fn site() -> MockBrowser {
        MockBrowser::new().with_document(
            HOME,
            MockDocument::new("FriendFilter")
                .element(MockElement::new(Selector::css("body")))
                .element(MockElement::new(Selector::css("input[name=\"email\"]")))
                .element(MockElement::new(Selector::text_exact("Get Started")))
                .element(MockElement::new(Selector::text_exact("Get Started")))
                .element(MockElement::new(Selector::css("h1")).text("Hello").hidden()),
        )
    }

    async fn open(browser: &MockBrowser) -> Session {
        Session::open(browser, SessionConfig::default()).await.unwrap()
    }

    mod resolve_tests {
        use super::*;

        #[tokio::test]
        async fn test_falls_back_to_later_strategy() {
            let browser = site();
            let mut session = open(&browser).await;
            let mut ctx = PageContext::new(&mut session, HOME, catalog::auth()).unwrap();
            ctx.navigate("").await.unwrap();
            let located = ctx.resolve("email_input").await.unwrap().unwrap();
            assert_eq!(located.selector, Selector::css("input[name=\"email\"]"));
            assert_eq!(located.count, 1);
            drop(ctx);
            session.close().await.unwrap();
        }

        #[tokio::test]
        async fn test_unknown_and_absent_resolve_to_none() {
            let browser = site();
            let mut session = open(&browser).await;
            let mut ctx = PageContext::new(&mut session, HOME, catalog::auth()).unwrap();
            ctx.navigate("").await.unwrap();
            assert!(ctx.resolve("password_input").await.unwrap().is_none());
            assert!(ctx.resolve("not_in_catalog").await.unwrap().is_none());
            assert_eq!(ctx.count("not_in_catalog").await.unwrap(), 0);
            drop(ctx);
            session.close().await.unwrap();
        }

        #[tokio::test]
        async fn test_visibility_is_idempotent() {
            let browser = site();
            let mut session = open(&browser).await;
            let mut ctx = PageContext::new(&mut session, HOME, catalog::landing()).unwrap();
            ctx.navigate("").await.unwrap();
            let first = ctx.is_visible("main_heading").await.unwrap();
            let second = ctx.is_visible("main_heading").await.unwrap();
            assert!(!first);
            assert_eq!(first, second);
            assert_eq!(ctx.text("main_heading").await.unwrap().as_deref(), Some("Hello"));
            drop(ctx);
            session.close().await.unwrap();
        }
    }

    mod gated_action_tests {
        use super::*;

        #[tokio::test]
        async fn test_absent_targets_are_noops() {
            let browser = site();
            let mut session = open(&browser).await;
            let mut ctx = PageContext::new(&mut session, HOME, catalog::auth()).unwrap();
            ctx.navigate("").await.unwrap();
            assert!(!ctx.fill_if_present("password_input", "x").await.unwrap());
            assert!(!ctx.click_if_present("forgot_password_link").await.unwrap());
            assert!(!ctx.press_if_present("password_input", "Enter").await.unwrap());
            assert!(!ctx.check_if_present("password_input").await.unwrap());
            assert!(ctx.popup_if_present("login_link").await.unwrap().is_none());
            drop(ctx);
            session.close().await.unwrap();
            assert!(!browser.was_called("fill:"));
            assert!(!browser.was_called("click:"));
            assert!(!browser.was_called("press:"));
            assert!(!browser.was_called("check:"));
        }

        #[tokio::test]
        async fn test_click_nth_needs_enough_matches() {
            let browser = site();
            let mut session = open(&browser).await;
            let mut ctx = PageContext::new(&mut session, HOME, catalog::pricing()).unwrap();
            ctx.navigate("").await.unwrap();
            assert!(ctx.click_nth_if_present("select_plan_buttons", 1).await.unwrap());
            assert!(!ctx.click_nth_if_present("select_plan_buttons", 2).await.unwrap());
            drop(ctx);
            session.close().await.unwrap();
            assert_eq!(browser.call_count("click:"), 1);
            assert!(browser.was_called("click:text=\"Get Started\"#1"));
        }

        #[tokio::test]
        async fn test_ad_hoc_spec_target() {
            let browser = site();
            let mut session = open(&browser).await;
            let mut ctx = PageContext::new(&mut session, HOME, catalog::landing()).unwrap();
            ctx.navigate("").await.unwrap();
            let spec = LocatorSpec::new("heading", vec![Selector::css("h1")]);
            assert!(ctx.is_present(&spec).await.unwrap());
            drop(ctx);
            session.close().await.unwrap();
        }

        #[tokio::test]
        async fn test_wait_visible_gives_up_quietly() {
            let browser = site();
            let config = SessionConfig::default().element_timeout(Duration::from_millis(30));
            let mut session = Session::open(&browser, config).await.unwrap();
            let mut ctx = PageContext::new(&mut session, HOME, catalog::landing()).unwrap();
            ctx.navigate("").await.unwrap();
            assert!(!ctx.wait_visible("main_heading").await.unwrap());
            assert!(!ctx.wait_visible("features_section").await.unwrap());
            assert!(ctx.wait_visible("body").await.unwrap());
            drop(ctx);
            session.close().await.unwrap();
        }
    }

    mod navigation_tests {
        use super::*;

        #[tokio::test]
        async fn test_navigation_timeout_is_retried() {
            let browser = site().with_navigation_timeouts(HOME, 1);
            let mut session = open(&browser).await;
            let mut ctx = PageContext::new(&mut session, HOME, catalog::landing()).unwrap();
            ctx.navigate("").await.unwrap();
            drop(ctx);
            session.close().await.unwrap();
            assert_eq!(browser.call_count("goto:"), 2);
        }

        #[tokio::test]
        async fn test_navigation_retry_budget_is_bounded() {
            let browser = site().with_navigation_timeouts(HOME, 5);
            let config = SessionConfig::default().navigation_retries(2);
            let mut session = Session::open(&browser, config).await.unwrap();
            let mut ctx = PageContext::new(&mut session, HOME, catalog::landing()).unwrap();
            let err = ctx.navigate("").await.unwrap_err();
            assert!(err.is_timeout());
            drop(ctx);
            session.close().await.unwrap();
            assert_eq!(browser.call_count("goto:"), 3);
        }

        #[tokio::test]
        async fn test_url_for_trims_base_slash() {
            let browser = site();
            let mut session = open(&browser).await;
            let ctx = PageContext::new(&mut session, "https://friendfilter.com/", catalog::pricing())
                .unwrap();
            assert_eq!(ctx.url_for("/pricing"), "https://friendfilter.com/pricing");
            drop(ctx);
            session.close().await.unwrap();
        }
    }
}
