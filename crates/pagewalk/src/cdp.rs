//! Chromium driver over the DevTools protocol.
//!
//! Each [`Session`](crate::Session) gets its own browser process, so
//! cookies, storage and tabs never leak between scenarios. Element lookups
//! evaluate the selector's JavaScript in the page; interactions tag the
//! resolved element and act on it through chromiumoxide's element handle.

use crate::driver::{
    BrowserDriver, BrowserEngine, Launcher, PageDriver, Screenshot, ScreenshotTarget,
    SessionConfig, Viewport,
};
use crate::locator::Selector;
use crate::network::UrlPattern;
use crate::result::{PageWalkError, PageWalkResult};
use crate::setup;
use crate::wait::{poll_until, LoadState, WaitOptions, DEFAULT_POLL_INTERVAL_MS};
use async_trait::async_trait;
use base64::Engine;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams, EventRequestPaused, FailRequestParams, RequestPattern,
};
use chromiumoxide::cdp::browser_protocol::network::{ErrorReason, SetUserAgentOverrideParams};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams, Viewport as ClipRect,
};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fmt::Display;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Attribute marking the element an interaction targets
const TARGET_ATTR: &str = "data-pagewalk-target";

/// Launches Chromium through chromiumoxide
#[derive(Debug, Clone, Copy, Default)]
pub struct CdpLauncher;

impl CdpLauncher {
    /// Create a launcher
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Launcher for CdpLauncher {
    async fn launch(&self, config: &SessionConfig) -> PageWalkResult<Box<dyn BrowserDriver>> {
        if config.engine != BrowserEngine::Chromium {
            return Err(PageWalkError::UnsupportedBrowser {
                engine: config.engine.to_string(),
            });
        }

        let mut builder = CdpConfig::builder()
            .window_size(config.viewport.width, config.viewport.height)
            .request_timeout(config.navigation_timeout);
        if !config.headless {
            builder = builder.with_head();
        }
        if !config.sandbox {
            builder = builder.no_sandbox();
        }
        let executable = match &config.executable_path {
            Some(path) => Some(setup::find_browser(Some(path))?.path),
            None => setup::find_browser(None).ok().map(|found| found.path),
        };
        if let Some(path) = executable {
            builder = builder.chrome_executable(path);
        }

        let cdp_config = builder
            .build()
            .map_err(|message| PageWalkError::BrowserLaunch { message })?;

        let (browser, mut handler) =
            CdpBrowser::launch(cdp_config)
                .await
                .map_err(|e| PageWalkError::BrowserLaunch {
                    message: e.to_string(),
                })?;

        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        tracing::debug!(headless = config.headless, "chromium launched");
        Ok(Box::new(CdpBrowserDriver {
            inner: Arc::new(Mutex::new(browser)),
            handle,
            config: config.clone(),
            closed: false,
        }))
    }
}

struct CdpBrowserDriver {
    inner: Arc<Mutex<CdpBrowser>>,
    handle: JoinHandle<()>,
    config: SessionConfig,
    closed: bool,
}

#[async_trait]
impl BrowserDriver for CdpBrowserDriver {
    async fn new_page(&mut self) -> PageWalkResult<Box<dyn PageDriver>> {
        if self.closed {
            return Err(PageWalkError::SessionClosed);
        }
        let page = self
            .inner
            .lock()
            .await
            .new_page("about:blank")
            .await
            .map_err(page_error)?;
        if let Some(params) = user_agent_override(&self.config) {
            page.set_user_agent(params).await.map_err(page_error)?;
        }
        let mut driver = CdpPageDriver::new(page, Arc::clone(&self.inner), self.config.viewport);
        driver.set_viewport(self.config.viewport).await?;
        Ok(Box::new(driver))
    }

    async fn close(&mut self) -> PageWalkResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let mut browser = self.inner.lock().await;
        let closed = browser.close().await;
        if let Err(err) = browser.wait().await {
            tracing::debug!(error = %err, "waiting for chromium exit failed");
        }
        self.handle.abort();
        closed.map(drop).map_err(|e| PageWalkError::BrowserLaunch {
            message: e.to_string(),
        })
    }
}

struct CdpPageDriver {
    page: Option<CdpPage>,
    browser: Arc<Mutex<CdpBrowser>>,
    viewport: Viewport,
    blocked: Arc<StdMutex<Vec<UrlPattern>>>,
    interceptor: Option<JoinHandle<()>>,
}

impl CdpPageDriver {
    fn new(page: CdpPage, browser: Arc<Mutex<CdpBrowser>>, viewport: Viewport) -> Self {
        Self {
            page: Some(page),
            browser,
            viewport,
            blocked: Arc::new(StdMutex::new(Vec::new())),
            interceptor: None,
        }
    }

    fn page(&self) -> PageWalkResult<&CdpPage> {
        self.page.as_ref().ok_or(PageWalkError::SessionClosed)
    }

    /// Evaluate `expr` and decode its JSON-serialized value
    async fn eval<T: DeserializeOwned>(&self, expr: &str) -> PageWalkResult<T> {
        let json: String = self
            .page()?
            .evaluate(format!("JSON.stringify(({expr}) ?? null)"))
            .await
            .map_err(page_error)?
            .into_value()
            .map_err(page_error)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Tag the n-th match and return a handle to it
    async fn target(&self, selector: &Selector, nth: usize) -> PageWalkResult<Element> {
        let tag = selector.nth_js(nth, &mark_js("el"));
        let found: Option<bool> = self.eval(&tag).await?;
        if found != Some(true) {
            return Err(PageWalkError::Input {
                message: format!("no element {selector} at index {nth}"),
            });
        }
        self.tagged().await
    }

    async fn tagged(&self) -> PageWalkResult<Element> {
        self.page()?
            .find_element(format!("[{TARGET_ATTR}]"))
            .await
            .map_err(input_error)
    }

    async fn settle(&self, what: &str, wait_until: LoadState, timeout: Duration) -> PageWalkResult<()> {
        let options = WaitOptions::new().with_timeout(timeout.as_millis() as u64);
        poll_until(what, &options, || async {
            let state: String = self.eval("document.readyState").await?;
            Ok(wait_until.is_reached(&state))
        })
        .await
    }

    async fn target_ids(&self) -> PageWalkResult<HashSet<String>> {
        let pages = self.browser.lock().await.pages().await.map_err(page_error)?;
        Ok(pages.iter().map(|p| p.target_id().as_ref().to_string()).collect())
    }
}

/// Network-domain override for the configured user agent, if any
fn user_agent_override(config: &SessionConfig) -> Option<SetUserAgentOverrideParams> {
    config
        .user_agent
        .as_ref()
        .map(|ua| SetUserAgentOverrideParams::new(ua.clone()))
}

/// JS function body tagging `el` as the interaction target
fn mark_js(el: &str) -> String {
    format!(
        "{el} => {{ document.querySelectorAll('[{TARGET_ATTR}]').forEach(e => e.removeAttribute('{TARGET_ATTR}')); \
           {el}.setAttribute('{TARGET_ATTR}', ''); {el}.scrollIntoView({{block: 'center', inline: 'center'}}); return true; }}"
    )
}

const VISIBLE_JS: &str = "el => { const r = el.getBoundingClientRect(); const s = getComputedStyle(el); \
     return r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none'; }";

fn page_error(e: impl Display) -> PageWalkError {
    PageWalkError::page(e.to_string())
}

fn input_error(e: impl Display) -> PageWalkError {
    PageWalkError::Input {
        message: e.to_string(),
    }
}

fn screenshot_error(e: impl Display) -> PageWalkError {
    PageWalkError::Screenshot {
        message: e.to_string(),
    }
}

#[async_trait]
impl PageDriver for CdpPageDriver {
    async fn goto(&mut self, url: &str, wait_until: LoadState, timeout: Duration) -> PageWalkResult<()> {
        let what = format!("navigation to {url}");
        let page = self.page()?;
        match tokio::time::timeout(timeout, page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                return Err(PageWalkError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })
            }
            Err(_) => return Err(PageWalkError::timeout(what, timeout.as_millis() as u64)),
        }
        self.settle(&what, wait_until, timeout).await
    }

    async fn reload(&mut self, wait_until: LoadState, timeout: Duration) -> PageWalkResult<()> {
        let page = self.page()?;
        match tokio::time::timeout(timeout, page.reload()).await {
            Ok(result) => result.map(drop).map_err(page_error)?,
            Err(_) => return Err(PageWalkError::timeout("reload", timeout.as_millis() as u64)),
        }
        self.settle("reload", wait_until, timeout).await
    }

    async fn url(&self) -> PageWalkResult<String> {
        Ok(self.page()?.url().await.map_err(page_error)?.unwrap_or_default())
    }

    async fn title(&self) -> PageWalkResult<String> {
        Ok(self
            .page()?
            .get_title()
            .await
            .map_err(page_error)?
            .unwrap_or_default())
    }

    async fn content(&self) -> PageWalkResult<String> {
        self.page()?.content().await.map_err(page_error)
    }

    async fn count(&self, selector: &Selector) -> PageWalkResult<usize> {
        self.eval(&selector.count_js()).await
    }

    async fn is_visible(&self, selector: &Selector, nth: usize) -> PageWalkResult<bool> {
        let visible: Option<bool> = self.eval(&selector.nth_js(nth, VISIBLE_JS)).await?;
        Ok(visible.unwrap_or(false))
    }

    async fn is_enabled(&self, selector: &Selector, nth: usize) -> PageWalkResult<bool> {
        let enabled: Option<bool> = self.eval(&selector.nth_js(nth, "el => !el.disabled")).await?;
        Ok(enabled.unwrap_or(false))
    }

    async fn text_content(&self, selector: &Selector, nth: usize) -> PageWalkResult<Option<String>> {
        self.eval(&selector.nth_js(nth, "el => el.textContent")).await
    }

    async fn attribute(
        &self,
        selector: &Selector,
        nth: usize,
        name: &str,
    ) -> PageWalkResult<Option<String>> {
        let body = format!("el => el.getAttribute({name:?})");
        self.eval(&selector.nth_js(nth, &body)).await
    }

    async fn fill(&mut self, selector: &Selector, nth: usize, value: &str) -> PageWalkResult<()> {
        let element = self.target(selector, nth).await?;
        let cleared: Option<bool> = self
            .eval(&selector.nth_js(
                nth,
                "el => { el.focus(); el.value = ''; el.dispatchEvent(new Event('input', {bubbles: true})); return true; }",
            ))
            .await?;
        if cleared != Some(true) {
            return Err(input_error(format!("{selector} detached before fill")));
        }
        element.type_str(value).await.map_err(input_error)?;
        Ok(())
    }

    async fn click(&mut self, selector: &Selector, nth: usize) -> PageWalkResult<()> {
        let element = self.target(selector, nth).await?;
        element.click().await.map_err(input_error)?;
        Ok(())
    }

    async fn press(&mut self, selector: &Selector, nth: usize, key: &str) -> PageWalkResult<()> {
        let element = self.target(selector, nth).await?;
        element.focus().await.map_err(input_error)?;
        element.press_key(key).await.map_err(input_error)?;
        Ok(())
    }

    async fn keyboard_press(&mut self, key: &str) -> PageWalkResult<()> {
        let tag = format!("({})(document.activeElement || document.body)", mark_js("el"));
        let _: bool = self.eval(&tag).await?;
        self.tagged()
            .await?
            .press_key(key)
            .await
            .map_err(input_error)?;
        Ok(())
    }

    async fn check(&mut self, selector: &Selector, nth: usize) -> PageWalkResult<()> {
        let checked: Option<bool> = self.eval(&selector.nth_js(nth, "el => !!el.checked")).await?;
        if checked == Some(true) {
            return Ok(());
        }
        self.click(selector, nth).await
    }

    async fn set_viewport(&mut self, viewport: Viewport) -> PageWalkResult<()> {
        let params = SetDeviceMetricsOverrideParams::builder()
            .width(i64::from(viewport.width))
            .height(i64::from(viewport.height))
            .device_scale_factor(1.0)
            .mobile(viewport.is_compact())
            .build()
            .map_err(page_error)?;
        self.page()?.execute(params).await.map_err(page_error)?;
        self.viewport = viewport;
        Ok(())
    }

    async fn viewport(&self) -> PageWalkResult<Viewport> {
        self.page()?;
        Ok(self.viewport)
    }

    async fn screenshot(&self, target: &ScreenshotTarget) -> PageWalkResult<Screenshot> {
        let page = self.page()?;
        let data = match target {
            ScreenshotTarget::Element { selector, nth } => self
                .target(selector, *nth)
                .await
                .map_err(screenshot_error)?
                .screenshot(CaptureScreenshotFormat::Png)
                .await
                .map_err(screenshot_error)?,
            ScreenshotTarget::Viewport | ScreenshotTarget::FullPage => {
                let mut params = CaptureScreenshotParams::builder().format(CaptureScreenshotFormat::Png);
                if *target == ScreenshotTarget::FullPage {
                    let (width, height): (f64, f64) = self
                        .eval("[document.documentElement.scrollWidth, document.documentElement.scrollHeight]")
                        .await?;
                    let clip = ClipRect::builder()
                        .x(0.0)
                        .y(0.0)
                        .width(width)
                        .height(height)
                        .scale(1.0)
                        .build()
                        .map_err(screenshot_error)?;
                    params = params.capture_beyond_viewport(true).clip(clip);
                }
                let capture = page.execute(params.build()).await.map_err(screenshot_error)?;
                base64::engine::general_purpose::STANDARD
                    .decode(&capture.data)
                    .map_err(screenshot_error)?
            }
        };
        Ok(Screenshot::new(data))
    }

    async fn click_for_popup(
        &mut self,
        selector: &Selector,
        nth: usize,
        timeout: Duration,
    ) -> PageWalkResult<Box<dyn PageDriver>> {
        let before = self.target_ids().await?;
        self.click(selector, nth).await?;

        let deadline = Instant::now() + timeout;
        let page = loop {
            let pages = self.browser.lock().await.pages().await.map_err(page_error)?;
            if let Some(page) = pages
                .into_iter()
                .find(|p| !before.contains(p.target_id().as_ref()))
            {
                break page;
            }
            if Instant::now() >= deadline {
                return Err(PageWalkError::timeout("popup to open", timeout.as_millis() as u64));
            }
            tokio::time::sleep(Duration::from_millis(DEFAULT_POLL_INTERVAL_MS)).await;
        };

        let driver = Self::new(page, Arc::clone(&self.browser), self.viewport);
        let options = WaitOptions::new().with_timeout(timeout.as_millis() as u64);
        // A popup starts at about:blank before its first navigation commits.
        if let Err(err) = poll_until("popup navigation", &options, || async {
            Ok(driver.url().await? != "about:blank")
        })
        .await
        {
            tracing::debug!(error = %err, "popup still blank");
        }
        Ok(Box::new(driver))
    }

    async fn block_requests(&mut self, pattern: UrlPattern) -> PageWalkResult<()> {
        let page = self.page()?.clone();
        let fetch_patterns: Vec<RequestPattern> = {
            let mut blocked = self.blocked.lock().unwrap_or_else(PoisonError::into_inner);
            blocked.push(pattern);
            blocked
                .iter()
                .map(|p| RequestPattern::builder().url_pattern(p.to_fetch_pattern()).build())
                .collect()
        };

        if self.interceptor.is_none() {
            let mut paused = page
                .event_listener::<EventRequestPaused>()
                .await
                .map_err(page_error)?;
            let blocked = Arc::clone(&self.blocked);
            let interceptor_page = page.clone();
            self.interceptor = Some(tokio::spawn(async move {
                while let Some(event) = paused.next().await {
                    let url = &event.request.url;
                    let block = blocked
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .iter()
                        .any(|p| p.matches(url));
                    let outcome = if block {
                        tracing::debug!(url, "request blocked");
                        interceptor_page
                            .execute(FailRequestParams::new(
                                event.request_id.clone(),
                                ErrorReason::BlockedByClient,
                            ))
                            .await
                            .map(drop)
                    } else {
                        interceptor_page
                            .execute(ContinueRequestParams::new(event.request_id.clone()))
                            .await
                            .map(drop)
                    };
                    if let Err(err) = outcome {
                        tracing::debug!(url, error = %err, "request interception failed");
                    }
                }
            }));
        }

        page.execute(EnableParams::builder().patterns(fetch_patterns).build())
            .await
            .map_err(page_error)?;
        Ok(())
    }

    async fn close(&mut self) -> PageWalkResult<()> {
        if let Some(handle) = self.interceptor.take() {
            handle.abort();
        }
        match self.page.take() {
            Some(page) => page.close().await.map_err(page_error),
            None => Ok(()),
        }
    }
}
