//! Scripted in-memory browser.
//!
//! `MockBrowser` serves registered [`MockDocument`]s by URL. An element
//! matches a selector when the selector is listed on the element, so tests
//! state exactly which strategies a page satisfies. Every driver call is
//! recorded in a shared call history, and launch/close counters make
//! teardown guarantees observable.

use crate::driver::{
    BrowserDriver, Launcher, PageDriver, Screenshot, ScreenshotTarget, SessionConfig, Viewport,
};
use crate::locator::Selector;
use crate::network::UrlPattern;
use crate::result::{PageWalkError, PageWalkResult};
use crate::wait::LoadState;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// PNG signature followed by a marker; enough for size/validity checks
const FAKE_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, b'm', b'o', b'c', b'k'];

// =============================================================================
// DOCUMENTS
// =============================================================================

/// A scripted element
#[derive(Debug, Clone, Default)]
pub struct MockElement {
    selectors: Vec<Selector>,
    hidden: bool,
    disabled: bool,
    min_width: Option<u32>,
    max_width: Option<u32>,
    text: Option<String>,
    attributes: HashMap<String, String>,
    value: String,
    checked: bool,
    popup_url: Option<String>,
    navigates_to: Option<String>,
}

impl MockElement {
    /// Element matched by `selector`
    #[must_use]
    pub fn new(selector: Selector) -> Self {
        Self {
            selectors: vec![selector],
            ..Self::default()
        }
    }

    /// Also match `selector`
    #[must_use]
    pub fn also(mut self, selector: Selector) -> Self {
        self.selectors.push(selector);
        self
    }

    /// Set text content
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Present in the DOM but not rendered
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Disabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Only visible when the viewport is at least `width` wide
    #[must_use]
    pub const fn visible_from(mut self, width: u32) -> Self {
        self.min_width = Some(width);
        self
    }

    /// Only visible when the viewport is at most `width` wide
    #[must_use]
    pub const fn visible_up_to(mut self, width: u32) -> Self {
        self.max_width = Some(width);
        self
    }

    /// Clicking opens `url` in a new tab
    #[must_use]
    pub fn opens_popup(mut self, url: impl Into<String>) -> Self {
        self.popup_url = Some(url.into());
        self
    }

    /// Clicking navigates the tab to `url`
    #[must_use]
    pub fn navigates_to(mut self, url: impl Into<String>) -> Self {
        self.navigates_to = Some(url.into());
        self
    }

    fn matches(&self, selector: &Selector) -> bool {
        self.selectors.contains(selector)
    }

    fn visible_at(&self, viewport: Viewport) -> bool {
        !self.hidden
            && self.min_width.map_or(true, |w| viewport.width >= w)
            && self.max_width.map_or(true, |w| viewport.width <= w)
    }
}

/// A scripted page
#[derive(Debug, Clone, Default)]
pub struct MockDocument {
    title: String,
    content: String,
    elements: Vec<MockElement>,
}

impl MockDocument {
    /// Document with `title`
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set serialized HTML
    #[must_use]
    pub fn content(mut self, html: impl Into<String>) -> Self {
        self.content = html.into();
        self
    }

    /// Add an element
    #[must_use]
    pub fn element(mut self, element: MockElement) -> Self {
        self.elements.push(element);
        self
    }

    fn not_found() -> Self {
        Self::new("404 Not Found")
            .content("<html><body><h1>404</h1><p>Not Found</p></body></html>")
            .element(MockElement::new(Selector::css("body")))
    }

    fn matching(&self, selector: &Selector) -> impl Iterator<Item = &MockElement> {
        let selector = selector.clone();
        self.elements.iter().filter(move |e| e.matches(&selector))
    }
}

// =============================================================================
// BROWSER
// =============================================================================

#[derive(Debug, Default)]
struct MockState {
    documents: HashMap<String, MockDocument>,
    navigation_timeouts: HashMap<String, u32>,
    fail_launch: bool,
    calls: Vec<String>,
    launches: usize,
    browser_closes: usize,
    pages_opened: usize,
    pages_closed: usize,
}

impl MockState {
    fn document(&self, url: &str) -> MockDocument {
        self.documents
            .get(url)
            .or_else(|| self.documents.get(url.trim_end_matches('/')))
            .cloned()
            .unwrap_or_else(MockDocument::not_found)
    }
}

/// Scripted browser; also the [`Launcher`] that starts it
#[derive(Debug, Clone, Default)]
pub struct MockBrowser {
    state: Arc<Mutex<MockState>>,
}

impl MockBrowser {
    /// Create an empty mock browser; unknown URLs serve a 404 page
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `document` at `url`
    #[must_use]
    pub fn with_document(self, url: impl Into<String>, document: MockDocument) -> Self {
        self.lock().documents.insert(url.into(), document);
        self
    }

    /// Time out the next `times` navigations to `url`
    #[must_use]
    pub fn with_navigation_timeouts(self, url: impl Into<String>, times: u32) -> Self {
        self.lock().navigation_timeouts.insert(url.into(), times);
        self
    }

    /// Make every launch fail
    #[must_use]
    pub fn with_failing_launch(self) -> Self {
        self.lock().fail_launch = true;
        self
    }

    /// Recorded calls, oldest first
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// Check if a call starting with `prefix` was recorded
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.lock().calls.iter().any(|c| c.starts_with(prefix))
    }

    /// Number of recorded calls starting with `prefix`
    #[must_use]
    pub fn call_count(&self, prefix: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    /// Browsers launched
    #[must_use]
    pub fn launches(&self) -> usize {
        self.lock().launches
    }

    /// Browser close calls
    #[must_use]
    pub fn browser_closes(&self) -> usize {
        self.lock().browser_closes
    }

    /// Tabs opened, popups included
    #[must_use]
    pub fn pages_opened(&self) -> usize {
        self.lock().pages_opened
    }

    /// Tab close calls
    #[must_use]
    pub fn pages_closed(&self) -> usize {
        self.lock().pages_closed
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: String) {
        self.lock().calls.push(call);
    }
}

#[async_trait]
impl Launcher for MockBrowser {
    async fn launch(&self, config: &SessionConfig) -> PageWalkResult<Box<dyn BrowserDriver>> {
        let mut state = self.lock();
        state.calls.push(format!("launch:{}", config.engine));
        if state.fail_launch {
            return Err(PageWalkError::BrowserLaunch {
                message: "mock launch failure".to_string(),
            });
        }
        state.launches += 1;
        drop(state);
        Ok(Box::new(MockBrowserDriver {
            browser: self.clone(),
            viewport: config.viewport,
            closed: false,
        }))
    }
}

#[derive(Debug)]
struct MockBrowserDriver {
    browser: MockBrowser,
    viewport: Viewport,
    closed: bool,
}

#[async_trait]
impl BrowserDriver for MockBrowserDriver {
    async fn new_page(&mut self) -> PageWalkResult<Box<dyn PageDriver>> {
        if self.closed {
            return Err(PageWalkError::SessionClosed);
        }
        Ok(Box::new(MockPage::open(
            self.browser.clone(),
            "about:blank",
            self.viewport,
        )))
    }

    async fn close(&mut self) -> PageWalkResult<()> {
        self.closed = true;
        let mut state = self.browser.lock();
        state.browser_closes += 1;
        state.calls.push("browser_close".to_string());
        Ok(())
    }
}

// =============================================================================
// PAGE
// =============================================================================

#[derive(Debug)]
struct MockPage {
    browser: MockBrowser,
    url: String,
    document: MockDocument,
    viewport: Viewport,
    blocked: Vec<UrlPattern>,
    closed: bool,
}

impl MockPage {
    fn open(browser: MockBrowser, url: &str, viewport: Viewport) -> Self {
        let document = {
            let mut state = browser.lock();
            state.pages_opened += 1;
            state.calls.push(format!("new_page:{url}"));
            if url == "about:blank" {
                MockDocument::default()
            } else {
                state.document(url)
            }
        };
        Self {
            browser,
            url: url.to_string(),
            document,
            viewport,
            blocked: Vec::new(),
            closed: false,
        }
    }

    fn ensure_open(&self) -> PageWalkResult<()> {
        if self.closed {
            Err(PageWalkError::SessionClosed)
        } else {
            Ok(())
        }
    }

    fn element(&self, selector: &Selector, nth: usize) -> Option<&MockElement> {
        self.document.matching(selector).nth(nth)
    }

    fn element_mut(&mut self, selector: &Selector, nth: usize) -> PageWalkResult<&mut MockElement> {
        self.document
            .elements
            .iter_mut()
            .filter(|e| e.matches(selector))
            .nth(nth)
            .ok_or_else(|| PageWalkError::page(format!("no element {selector} at index {nth}")))
    }

    fn load(&mut self, url: &str) {
        self.document = self.browser.lock().document(url);
        self.url = url.to_string();
    }
}

#[async_trait]
impl PageDriver for MockPage {
    async fn goto(
        &mut self,
        url: &str,
        wait_until: LoadState,
        timeout: Duration,
    ) -> PageWalkResult<()> {
        self.ensure_open()?;
        {
            let mut state = self.browser.lock();
            state.calls.push(format!("goto:{url}:{wait_until}"));
            if let Some(remaining) = state.navigation_timeouts.get_mut(url) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(PageWalkError::timeout(
                        format!("navigation to {url}"),
                        timeout.as_millis() as u64,
                    ));
                }
            }
        }
        self.load(url);
        Ok(())
    }

    async fn reload(&mut self, wait_until: LoadState, _timeout: Duration) -> PageWalkResult<()> {
        self.ensure_open()?;
        self.browser.record(format!("reload:{wait_until}"));
        let url = self.url.clone();
        self.load(&url);
        Ok(())
    }

    async fn url(&self) -> PageWalkResult<String> {
        self.ensure_open()?;
        Ok(self.url.clone())
    }

    async fn title(&self) -> PageWalkResult<String> {
        self.ensure_open()?;
        Ok(self.document.title.clone())
    }

    async fn content(&self) -> PageWalkResult<String> {
        self.ensure_open()?;
        Ok(self.document.content.clone())
    }

    async fn count(&self, selector: &Selector) -> PageWalkResult<usize> {
        self.ensure_open()?;
        Ok(self.document.matching(selector).count())
    }

    async fn is_visible(&self, selector: &Selector, nth: usize) -> PageWalkResult<bool> {
        self.ensure_open()?;
        Ok(self
            .element(selector, nth)
            .is_some_and(|e| e.visible_at(self.viewport)))
    }

    async fn is_enabled(&self, selector: &Selector, nth: usize) -> PageWalkResult<bool> {
        self.ensure_open()?;
        Ok(self.element(selector, nth).is_some_and(|e| !e.disabled))
    }

    async fn text_content(
        &self,
        selector: &Selector,
        nth: usize,
    ) -> PageWalkResult<Option<String>> {
        self.ensure_open()?;
        Ok(self.element(selector, nth).and_then(|e| e.text.clone()))
    }

    async fn attribute(
        &self,
        selector: &Selector,
        nth: usize,
        name: &str,
    ) -> PageWalkResult<Option<String>> {
        self.ensure_open()?;
        Ok(self
            .element(selector, nth)
            .and_then(|e| e.attributes.get(name).cloned()))
    }

    async fn fill(&mut self, selector: &Selector, nth: usize, value: &str) -> PageWalkResult<()> {
        self.ensure_open()?;
        self.element_mut(selector, nth)?.value = value.to_string();
        self.browser.record(format!("fill:{selector}#{nth}={value}"));
        Ok(())
    }

    async fn click(&mut self, selector: &Selector, nth: usize) -> PageWalkResult<()> {
        self.ensure_open()?;
        let element = self.element_mut(selector, nth)?;
        if element.attributes.get("type").map(String::as_str) == Some("checkbox") {
            element.checked = !element.checked;
        }
        let target = element.navigates_to.clone();
        self.browser.record(format!("click:{selector}#{nth}"));
        if let Some(url) = target {
            self.load(&url);
        }
        Ok(())
    }

    async fn press(&mut self, selector: &Selector, nth: usize, key: &str) -> PageWalkResult<()> {
        self.ensure_open()?;
        self.element_mut(selector, nth)?;
        self.browser.record(format!("press:{selector}#{nth}:{key}"));
        Ok(())
    }

    async fn keyboard_press(&mut self, key: &str) -> PageWalkResult<()> {
        self.ensure_open()?;
        self.browser.record(format!("keyboard:{key}"));
        Ok(())
    }

    async fn check(&mut self, selector: &Selector, nth: usize) -> PageWalkResult<()> {
        self.ensure_open()?;
        self.element_mut(selector, nth)?.checked = true;
        self.browser.record(format!("check:{selector}#{nth}"));
        Ok(())
    }

    async fn set_viewport(&mut self, viewport: Viewport) -> PageWalkResult<()> {
        self.ensure_open()?;
        self.viewport = viewport;
        self.browser.record(format!("viewport:{viewport}"));
        Ok(())
    }

    async fn viewport(&self) -> PageWalkResult<Viewport> {
        self.ensure_open()?;
        Ok(self.viewport)
    }

    async fn screenshot(&self, target: &ScreenshotTarget) -> PageWalkResult<Screenshot> {
        self.ensure_open()?;
        let label = match target {
            ScreenshotTarget::Viewport => "viewport".to_string(),
            ScreenshotTarget::FullPage => "full_page".to_string(),
            ScreenshotTarget::Element { selector, nth } => {
                if self.element(selector, *nth).is_none() {
                    return Err(PageWalkError::Screenshot {
                        message: format!("no element {selector} at index {nth}"),
                    });
                }
                format!("{selector}#{nth}")
            }
        };
        self.browser.record(format!("screenshot:{label}"));
        Ok(Screenshot::new(FAKE_PNG.to_vec()))
    }

    async fn click_for_popup(
        &mut self,
        selector: &Selector,
        nth: usize,
        timeout: Duration,
    ) -> PageWalkResult<Box<dyn PageDriver>> {
        self.ensure_open()?;
        let popup_url = self.element_mut(selector, nth)?.popup_url.clone();
        self.browser.record(format!("click:{selector}#{nth}"));
        match popup_url {
            Some(url) => Ok(Box::new(MockPage::open(
                self.browser.clone(),
                &url,
                self.viewport,
            ))),
            None => Err(PageWalkError::timeout(
                format!("popup from {selector}"),
                timeout.as_millis() as u64,
            )),
        }
    }

    async fn block_requests(&mut self, pattern: UrlPattern) -> PageWalkResult<()> {
        self.ensure_open()?;
        self.browser.record(format!("block:{pattern}"));
        self.blocked.push(pattern);
        Ok(())
    }

    async fn close(&mut self) -> PageWalkResult<()> {
        if !self.closed {
            self.closed = true;
            let mut state = self.browser.lock();
            state.pages_closed += 1;
            state.calls.push(format!("page_close:{}", self.url));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const HOME: &str = "https://friendfilter.com";

    fn browser() -> MockBrowser {
        MockBrowser::new().with_document(
            HOME,
            MockDocument::new("FriendFilter")
                .element(MockElement::new(Selector::css("body")))
                .element(MockElement::new(Selector::css("h1")).text("Clean up your feed"))
                .element(
                    MockElement::new(Selector::text_exact("Add to Chrome"))
                        .opens_popup("https://chrome.google.com/webstore/detail/ff"),
                )
                .element(
                    MockElement::new(Selector::css(".hamburger")).visible_up_to(768),
                )
                .element(
                    MockElement::new(Selector::css("input[type=\"email\"]")).attr("type", "email"),
                ),
        )
    }

    async fn open_page(browser: &MockBrowser) -> Box<dyn PageDriver> {
        let mut driver = browser.launch(&SessionConfig::default()).await.unwrap();
        let mut page = driver.new_page().await.unwrap();
        page.goto(HOME, LoadState::DomContentLoaded, Duration::from_secs(1))
            .await
            .unwrap();
        page
    }

    mod document_tests {
        use super::*;

        #[tokio::test]
        async fn test_goto_serves_registered_document() {
            let browser = browser();
            let page = open_page(&browser).await;
            assert_eq!(page.title().await.unwrap(), "FriendFilter");
            assert_eq!(page.count(&Selector::css("h1")).await.unwrap(), 1);
            assert_eq!(
                page.text_content(&Selector::css("h1"), 0).await.unwrap(),
                Some("Clean up your feed".to_string())
            );
            assert!(browser.was_called("goto:https://friendfilter.com"));
        }

        #[tokio::test]
        async fn test_unknown_url_serves_not_found() {
            let browser = browser();
            let mut page = open_page(&browser).await;
            page.goto(
                "https://friendfilter.com/nonexistent-page",
                LoadState::Load,
                Duration::from_secs(1),
            )
            .await
            .unwrap();
            assert!(page.content().await.unwrap().contains("404"));
        }

        #[tokio::test]
        async fn test_navigation_timeouts_are_consumed() {
            let browser = browser().with_navigation_timeouts(HOME, 1);
            let mut driver = browser.launch(&SessionConfig::default()).await.unwrap();
            let mut page = driver.new_page().await.unwrap();
            let timeout = Duration::from_millis(10);
            let first = page.goto(HOME, LoadState::Load, timeout).await;
            assert!(first.unwrap_err().is_timeout());
            page.goto(HOME, LoadState::Load, timeout).await.unwrap();
        }
    }

    mod element_tests {
        use super::*;

        #[tokio::test]
        async fn test_visibility_follows_viewport() {
            let browser = browser();
            let mut page = open_page(&browser).await;
            let burger = Selector::css(".hamburger");
            assert!(!page.is_visible(&burger, 0).await.unwrap());
            page.set_viewport(Viewport::MOBILE).await.unwrap();
            assert!(page.is_visible(&burger, 0).await.unwrap());
            assert_eq!(page.viewport().await.unwrap(), Viewport::MOBILE);
        }

        #[tokio::test]
        async fn test_interacting_with_missing_element_errors() {
            let browser = browser();
            let mut page = open_page(&browser).await;
            let missing = Selector::css("#missing");
            assert!(page.click(&missing, 0).await.is_err());
            assert!(!page.is_visible(&missing, 0).await.unwrap());
            assert!(!browser.was_called("click:"));
        }

        #[tokio::test]
        async fn test_fill_is_recorded() {
            let browser = browser();
            let mut page = open_page(&browser).await;
            page.fill(&Selector::css("input[type=\"email\"]"), 0, "a@b.c")
                .await
                .unwrap();
            assert_eq!(browser.call_count("fill:"), 1);
        }

        #[tokio::test]
        async fn test_popup_opens_new_page() {
            let browser = browser();
            let mut page = open_page(&browser).await;
            let popup = page
                .click_for_popup(&Selector::text_exact("Add to Chrome"), 0, Duration::from_secs(1))
                .await
                .unwrap();
            assert!(popup.url().await.unwrap().contains("chrome.google.com"));
            assert_eq!(browser.pages_opened(), 2);
        }

        #[tokio::test]
        async fn test_popup_without_target_times_out() {
            let browser = browser();
            let mut page = open_page(&browser).await;
            let Err(err) = page
                .click_for_popup(&Selector::css("h1"), 0, Duration::from_millis(5))
                .await
            else {
                panic!("a click that opens nothing must not yield a popup");
            };
            assert!(err.is_timeout());
        }
    }

    mod lifecycle_tests {
        use super::*;

        #[tokio::test]
        async fn test_closed_page_rejects_calls() {
            let browser = browser();
            let mut page = open_page(&browser).await;
            page.close().await.unwrap();
            page.close().await.unwrap();
            assert_eq!(browser.pages_closed(), 1);
            assert!(matches!(
                page.url().await,
                Err(PageWalkError::SessionClosed)
            ));
        }

        #[tokio::test]
        async fn test_failing_launch() {
            let browser = MockBrowser::new().with_failing_launch();
            let result = browser.launch(&SessionConfig::default()).await;
            assert!(matches!(result, Err(PageWalkError::BrowserLaunch { .. })));
            assert_eq!(browser.launches(), 0);
        }
    }
}
