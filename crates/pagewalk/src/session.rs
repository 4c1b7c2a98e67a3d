//! Browser session lifecycle.
//!
//! A [`Session`] owns one browser, its isolated context and one active tab.
//! It moves `Open -> Closed` exactly once. [`Session::scoped`] runs a body
//! against a fresh session and closes it whatever the body does: return,
//! fail, time out or panic.

use crate::driver::{BrowserDriver, Launcher, PageDriver, SessionConfig};
use crate::result::{PageWalkError, PageWalkResult};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Browser running, tab usable
    Open,
    /// Browser released; every page call fails
    Closed,
}

/// Exclusive browser session for one scenario or demo
pub struct Session {
    browser: Option<Box<dyn BrowserDriver>>,
    page: Option<Box<dyn PageDriver>>,
    config: SessionConfig,
    state: SessionState,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Launch a browser and open one tab
    pub async fn open(launcher: &dyn Launcher, config: SessionConfig) -> PageWalkResult<Self> {
        tracing::debug!(
            engine = %config.engine,
            headless = config.headless,
            viewport = %config.viewport,
            "opening browser session"
        );
        let mut browser = launcher.launch(&config).await?;
        let page = match browser.new_page().await {
            Ok(page) => page,
            Err(err) => {
                if let Err(close_err) = browser.close().await {
                    tracing::warn!(error = %close_err, "failed to close browser after page error");
                }
                return Err(err);
            }
        };
        Ok(Self {
            browser: Some(browser),
            page: Some(page),
            config,
            state: SessionState::Open,
        })
    }

    /// Run `body` against a fresh session, closing it exactly once afterwards
    pub async fn scoped<R, F>(launcher: &dyn Launcher, config: SessionConfig, body: F) -> PageWalkResult<R>
    where
        F: for<'a> FnOnce(&'a mut Session) -> BoxFuture<'a, PageWalkResult<R>> + Send,
        R: Send,
    {
        Self::scoped_with_timeout(launcher, config, None, body).await
    }

    /// [`Session::scoped`] with an upper bound on the body's run time.
    ///
    /// On expiry the body is dropped, the session is still closed, and the
    /// result is a [`PageWalkError::Timeout`].
    pub async fn scoped_with_timeout<R, F>(
        launcher: &dyn Launcher,
        config: SessionConfig,
        limit: Option<Duration>,
        body: F,
    ) -> PageWalkResult<R>
    where
        F: for<'a> FnOnce(&'a mut Session) -> BoxFuture<'a, PageWalkResult<R>> + Send,
        R: Send,
    {
        Self::scoped_with(launcher, config, limit, &(), move |session, _| body(session)).await
    }

    /// Scoped run whose body also borrows `env` for the session's lifetime.
    ///
    /// Scenario and demo bodies take their settings this way.
    pub async fn scoped_with<E, R, F>(
        launcher: &dyn Launcher,
        config: SessionConfig,
        limit: Option<Duration>,
        env: &E,
        body: F,
    ) -> PageWalkResult<R>
    where
        E: ?Sized + Sync,
        F: for<'a> FnOnce(&'a mut Session, &'a E) -> BoxFuture<'a, PageWalkResult<R>> + Send,
        R: Send,
    {
        let mut session = Self::open(launcher, config).await?;

        let outcome = {
            let guarded = AssertUnwindSafe(async { body(&mut session, env).await }).catch_unwind();
            match limit {
                Some(limit) => match tokio::time::timeout(limit, guarded).await {
                    Ok(outcome) => outcome,
                    Err(_) => Ok(Err(PageWalkError::timeout(
                        "scenario to finish",
                        limit.as_millis() as u64,
                    ))),
                },
                None => guarded.await,
            }
        };

        let closed = session.close().await;
        let result = match outcome {
            Ok(result) => result,
            Err(payload) => Err(PageWalkError::Panicked {
                message: panic_message(payload.as_ref()),
            }),
        };

        match (result, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(close_err)) => Err(close_err),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(close_err)) => {
                tracing::warn!(error = %close_err, "session close failed after scenario error");
                Err(err)
            }
        }
    }

    /// Active tab
    pub fn page(&mut self) -> PageWalkResult<&mut dyn PageDriver> {
        match self.page.as_mut() {
            Some(page) => Ok(&mut **page),
            None => Err(PageWalkError::SessionClosed),
        }
    }

    /// Configuration the session was opened with
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the session is still open
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    /// Release the tab and the browser. Closing a closed session is a no-op.
    pub async fn close(&mut self) -> PageWalkResult<()> {
        if self.state == SessionState::Closed {
            return Ok(());
        }
        self.state = SessionState::Closed;

        let mut first_error = None;
        if let Some(mut page) = self.page.take() {
            if let Err(err) = page.close().await {
                tracing::debug!(error = %err, "page close failed");
                first_error.get_or_insert(err);
            }
        }
        if let Some(mut browser) = self.browser.take() {
            if let Err(err) = browser.close().await {
                tracing::warn!(error = %err, "browser close failed");
                first_error.get_or_insert(err);
            }
        }
        tracing::debug!("browser session closed");

        first_error.map_or(Ok(()), Err)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.state == SessionState::Open {
            tracing::warn!("session dropped while open; browser process may leak");
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
