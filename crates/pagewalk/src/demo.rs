//! Narrated demos.
//!
//! A demo drives the same page objects as the scenarios but never asserts.
//! Each step prints a numbered narration line, errors are narrated rather
//! than raised, and the session is released and the closing banner printed
//! on every path.

use crate::catalog;
use crate::config::Settings;
use crate::driver::{Launcher, PageDriver, ScreenshotTarget, Viewport};
use crate::locator::{LocatorSpec, Selector};
use crate::page_object::{PageContext, PageObject};
use crate::pages::{AdminDashboard, AdminLoginPage, LandingPage, UserManagement};
use crate::result::PageWalkResult;
use crate::session::Session;
use crate::wait::LoadState;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Width of the banner rule
const RULE_WIDTH: usize = 60;

/// Demo body: drives a session, narrating through the [`Narrator`]
pub type DemoBody = for<'a> fn(&'a mut Session, &'a Narrator) -> BoxFuture<'a, PageWalkResult<()>>;

/// A registered demo
#[derive(Clone, Copy)]
pub struct Demo {
    /// Command-line name
    pub name: &'static str,
    /// Banner title
    pub description: &'static str,
    /// Whether the demo runs headless unless told otherwise
    pub headless_default: bool,
    /// Body
    pub body: DemoBody,
}

impl std::fmt::Debug for Demo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Demo")
            .field("name", &self.name)
            .field("headless_default", &self.headless_default)
            .finish_non_exhaustive()
    }
}

static DEMOS: [Demo; 4] = [
    Demo {
        name: "homepage",
        description: "FriendFilter homepage walkthrough",
        headless_default: true,
        body: homepage,
    },
    Demo {
        name: "practical",
        description: "Practical FriendFilter checks",
        headless_default: true,
        body: practical,
    },
    Demo {
        name: "visual",
        description: "Visual walkthrough with a browser window",
        headless_default: false,
        body: visual,
    },
    Demo {
        name: "admin",
        description: "Admin backend login and user management",
        headless_default: true,
        body: admin,
    },
];

/// Every built-in demo
#[must_use]
pub fn demos() -> &'static [Demo] {
    &DEMOS
}

/// Built-in demo by name
#[must_use]
pub fn demo(name: &str) -> Option<&'static Demo> {
    DEMOS.iter().find(|d| d.name == name)
}

/// Names of the built-in demos
#[must_use]
pub fn demo_names() -> Vec<&'static str> {
    DEMOS.iter().map(|d| d.name).collect()
}

/// Numbered, best-effort narration of a demo run
#[derive(Debug)]
pub struct Narrator {
    settings: Settings,
    echo: bool,
    steps: AtomicUsize,
    lines: Mutex<Vec<String>>,
    screenshots: Mutex<Vec<PathBuf>>,
}

impl Narrator {
    /// Narrator printing to stdout
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            echo: true,
            steps: AtomicUsize::new(0),
            lines: Mutex::new(Vec::new()),
            screenshots: Mutex::new(Vec::new()),
        }
    }

    /// Narrator that only records
    #[must_use]
    pub fn silent(settings: Settings) -> Self {
        Self {
            echo: false,
            ..Self::new(settings)
        }
    }

    /// Settings the demo runs with
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Narrate the next numbered step; returns its number
    pub fn step(&self, message: impl std::fmt::Display) -> usize {
        let n = self.steps.fetch_add(1, Ordering::Relaxed) + 1;
        self.line(format!("{n}. {message}"));
        n
    }

    /// Narrate a detail of the current step
    pub fn detail(&self, message: impl std::fmt::Display) {
        self.line(format!("   {message}"));
    }

    /// Capture a screenshot into the screenshot directory
    pub async fn screenshot(
        &self,
        page: &dyn PageDriver,
        target: &ScreenshotTarget,
        name: &str,
    ) -> PageWalkResult<PathBuf> {
        let path = self.settings.screenshot_path(name);
        page.screenshot(target).await?.save(&path).await?;
        self.detail(format!("screenshot saved: {}", path.display()));
        lock(&self.screenshots).push(path.clone());
        Ok(path)
    }

    /// Steps narrated so far
    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps.load(Ordering::Relaxed)
    }

    /// Every narration line, banners included
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        lock(&self.lines).clone()
    }

    /// Screenshots written so far
    #[must_use]
    pub fn screenshots(&self) -> Vec<PathBuf> {
        lock(&self.screenshots).clone()
    }

    fn line(&self, text: String) {
        tracing::debug!(line = %text, "demo");
        if self.echo {
            println!("{text}");
        }
        lock(&self.lines).push(text);
    }

    fn banner(&self, title: &str) {
        self.line(title.to_string());
        self.line("=".repeat(RULE_WIDTH));
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What a demo run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoOutcome {
    /// Numbered steps narrated
    pub steps: usize,
    /// Screenshots written
    pub screenshots: Vec<PathBuf>,
    /// Narrated error, if the demo stopped early
    pub error: Option<String>,
}

impl DemoOutcome {
    /// Whether the demo reached its end
    #[must_use]
    pub const fn completed(&self) -> bool {
        self.error.is_none()
    }
}

/// Run `demo` over a fresh session.
///
/// `headless` overrides the demo's own preference when set. The session is
/// closed and the "finished" banner printed whether or not the body fails.
pub async fn run_demo(
    launcher: &dyn Launcher,
    demo: &Demo,
    narrator: &Narrator,
    headless: Option<bool>,
) -> DemoOutcome {
    let settings = narrator.settings();
    let headless = headless.unwrap_or(demo.headless_default && settings.browser.headless);
    let config = settings.session_config().headless(headless);

    narrator.banner(&format!("Starting demo: {}", demo.description));
    tracing::info!(demo = demo.name, headless, "running demo");

    let result = Session::scoped_with(launcher, config, None, narrator, demo.body).await;
    let error = match result {
        Ok(()) => None,
        Err(err) => {
            narrator.line(format!("Demo failed: {err}"));
            tracing::warn!(demo = demo.name, error = %err, "demo failed");
            Some(err.to_string())
        }
    };

    narrator.line(String::new());
    narrator.banner(&format!("Demo finished: {}", demo.name));

    DemoOutcome {
        steps: narrator.steps(),
        screenshots: narrator.screenshots(),
        error,
    }
}

fn spec(name: &str, selector: &str) -> LocatorSpec {
    LocatorSpec::new(name, vec![Selector::css(selector)])
}

fn load_rating(elapsed: Duration) -> &'static str {
    match elapsed.as_millis() {
        0..=2_999 => "good",
        3_000..=4_999 => "acceptable",
        _ => "slow",
    }
}

async fn timed_reload(ctx: &mut PageContext<'_>, timeout: Duration) -> PageWalkResult<Duration> {
    let start = Instant::now();
    ctx.page().reload(LoadState::DomContentLoaded, timeout).await?;
    ctx.wait_visible("body").await?;
    Ok(start.elapsed())
}

async fn count_each(
    ctx: &PageContext<'_>,
    narrator: &Narrator,
    probes: &[(&str, &str)],
) -> PageWalkResult<()> {
    for (label, selector) in probes {
        let count = ctx.count(&spec(label, selector)).await?;
        narrator.detail(format!("{label}: {count} found"));
    }
    Ok(())
}

fn homepage<'a>(session: &'a mut Session, narrator: &'a Narrator) -> BoxFuture<'a, PageWalkResult<()>> {
    async move {
        let nav_timeout = session.config().navigation_timeout;
        let mut landing = LandingPage::new(session, narrator.settings())?;

        narrator.step("Loading website...");
        landing.load().await?;
        narrator.detail("website loaded");

        narrator.step("Checking page title...");
        let ctx = landing.context();
        narrator.detail(format!("page title: {}", ctx.page().title().await?));

        narrator.step("Taking screenshot...");
        narrator
            .screenshot(ctx.page(), &ScreenshotTarget::Viewport, "friendfilter_homepage")
            .await?;

        narrator.step("Looking for Chrome extension button...");
        if ctx.is_present("chrome_extension_button").await? {
            narrator.detail("Chrome extension button found");
        } else {
            let alternatives = LocatorSpec::new(
                "chrome_alternatives",
                vec![
                    Selector::css("a[href*=\"chrome\"]"),
                    Selector::text("Install"),
                ],
            );
            let count = ctx.count(&alternatives).await?;
            narrator.detail(format!("no exact match; {count} Chrome-related candidates"));
        }

        narrator.step("Checking page structure...");
        count_each(
            ctx,
            narrator,
            &[
                ("Navigation", "nav"),
                ("Main content", "main"),
                ("Footer", "footer"),
                ("Buttons", "button"),
                ("Links", "a"),
            ],
        )
        .await?;

        narrator.step("Testing responsive design...");
        ctx.page().set_viewport(Viewport::MOBILE).await?;
        ctx.wait_visible("body").await?;
        narrator
            .screenshot(ctx.page(), &ScreenshotTarget::Viewport, "friendfilter_mobile")
            .await?;
        ctx.page().set_viewport(Viewport::DESKTOP).await?;

        narrator.step("Checking for forms...");
        count_each(ctx, narrator, &[("Forms", "form"), ("Input fields", "input")]).await?;

        narrator.step("Measuring page load performance...");
        let elapsed = timed_reload(ctx, nav_timeout).await?;
        narrator.detail(format!(
            "page load time: {:.2}s ({})",
            elapsed.as_secs_f64(),
            load_rating(elapsed)
        ));

        narrator.step("Final verification...");
        let visible = ctx.is_visible("body").await?;
        narrator.detail(format!("page body visible: {visible}"));
        Ok(())
    }
    .boxed()
}

fn practical<'a>(session: &'a mut Session, narrator: &'a Narrator) -> BoxFuture<'a, PageWalkResult<()>> {
    async move {
        let nav_timeout = session.config().navigation_timeout;
        let mut ctx = PageContext::new(session, &narrator.settings().site.base_url, catalog::common())?;

        narrator.step("Page loading and basic elements");
        ctx.navigate("").await?;
        narrator.detail(format!("page title: {}", ctx.page().title().await?));
        narrator.detail(format!("body visible: {}", ctx.is_visible("body").await?));

        narrator.step("Chrome extension integration");
        let store_links = spec("chrome_store_links", "a[href*=\"chrome.google.com\"]");
        let count = ctx.count(&store_links).await?;
        narrator.detail(format!("Chrome Web Store links found: {count}"));
        if let Some(located) = ctx.resolve(&store_links).await? {
            let text = ctx.text(&store_links).await?.unwrap_or_default();
            let href = ctx.attribute(&store_links, 0, "href").await?.unwrap_or_default();
            let target = ctx.attribute(&store_links, 0, "target").await?;
            let enabled = ctx.page().is_enabled(&located.selector, 0).await?;
            narrator.detail(format!("primary CTA text: {:?}", text.trim()));
            narrator.detail(format!("extension URL: {href}"));
            narrator.detail(format!("link is clickable: {enabled}"));
            narrator.detail(format!(
                "opens in new tab: {}",
                target.as_deref() == Some("_blank")
            ));
        }

        narrator.step("Navigation structure");
        let nav = Selector::css("nav a, header a");
        let count = ctx.page().count(&nav).await?;
        narrator.detail(format!("navigation links found: {count}"));
        for i in 0..count.min(5) {
            let text = ctx.page().text_content(&nav, i).await?.unwrap_or_default();
            let href = ctx.page().attribute(&nav, i, "href").await?.unwrap_or_default();
            if !text.trim().is_empty() {
                narrator.detail(format!("{} -> {href}", text.trim()));
            }
        }

        narrator.step("Responsive design");
        let chrome = spec("chrome_button", "a[href*=\"chrome\"]");
        for (label, viewport) in [
            ("Desktop", Viewport::DESKTOP),
            ("Tablet", Viewport::TABLET),
            ("Mobile", Viewport::MOBILE),
        ] {
            ctx.page().set_viewport(viewport).await?;
            ctx.wait_visible("body").await?;
            narrator.detail(format!(
                "{label} ({viewport}): body visible {}, Chrome button visible {}",
                ctx.is_visible("body").await?,
                ctx.is_visible(&chrome).await?
            ));
        }
        ctx.page().set_viewport(Viewport::DESKTOP).await?;

        narrator.step("Performance");
        let elapsed = timed_reload(&mut ctx, nav_timeout).await?;
        narrator.detail(format!(
            "page reload time: {:.2}s ({})",
            elapsed.as_secs_f64(),
            load_rating(elapsed)
        ));

        narrator.step("Content verification");
        count_each(
            &ctx,
            narrator,
            &[
                ("Headings", "h1, h2, h3"),
                ("Images", "img"),
                ("Buttons", "button, .btn"),
                ("Forms", "form"),
                ("Videos", "video, iframe"),
            ],
        )
        .await?;

        narrator.step("Error handling");
        match ctx.navigate("/nonexistent-page").await {
            Ok(()) => narrator.detail("404 page handling: custom error page served"),
            Err(err) => narrator.detail(format!("404 page handling: browser error ({err})")),
        }
        ctx.navigate("").await?;

        narrator.step("Screenshot capture");
        narrator
            .screenshot(ctx.page(), &ScreenshotTarget::FullPage, "friendfilter_full_demo")
            .await?;
        if let Some(header) = ctx.resolve("header").await? {
            let target = ScreenshotTarget::Element {
                selector: header.selector,
                nth: 0,
            };
            narrator
                .screenshot(ctx.page(), &target, "friendfilter_header")
                .await?;
        }
        Ok(())
    }
    .boxed()
}

fn visual<'a>(session: &'a mut Session, narrator: &'a Narrator) -> BoxFuture<'a, PageWalkResult<()>> {
    async move {
        let mut landing = LandingPage::new(session, narrator.settings())?;

        narrator.step("Navigating to the homepage...");
        landing.load().await?;
        let ctx = landing.context();
        ctx.wait_visible("body").await?;

        narrator.step("Finding the Chrome extension button...");
        let store_button = spec("chrome_store_button", "a[href*=\"chrome.google.com\"]");
        match ctx.text(&store_button).await? {
            Some(text) => narrator.detail(format!("found button: {:?}", text.trim())),
            None => narrator.detail("no Chrome Web Store button on this page"),
        }

        narrator.step("Walking viewports...");
        for (label, viewport) in [
            ("tablet", Viewport::TABLET),
            ("mobile", Viewport::MOBILE),
            ("desktop", Viewport::DESKTOP),
        ] {
            narrator.detail(format!("switching to {label} view ({viewport})"));
            ctx.page().set_viewport(viewport).await?;
            ctx.wait_visible("body").await?;
            narrator
                .screenshot(ctx.page(), &ScreenshotTarget::Viewport, &format!("visual_{label}"))
                .await?;
        }

        narrator.step("Inspecting navigation links...");
        let nav = Selector::css("nav a, header a");
        let count = ctx.page().count(&nav).await?;
        narrator.detail(format!("{count} navigation links"));
        for i in 0..count.min(5) {
            if !ctx.page().is_visible(&nav, i).await? {
                continue;
            }
            if let Some(text) = ctx.page().text_content(&nav, i).await? {
                if !text.trim().is_empty() {
                    narrator.detail(format!("link: {:?}", text.trim()));
                }
            }
        }

        narrator.step("Taking a full-page screenshot...");
        narrator
            .screenshot(ctx.page(), &ScreenshotTarget::FullPage, "visual_demo_screenshot")
            .await?;

        narrator.step("Looking for interactive elements...");
        let inputs = ctx.count(&spec("inputs", "input")).await?;
        if inputs == 0 {
            narrator.detail("no input fields on this page");
        } else {
            narrator.detail(format!("{inputs} input fields"));
        }
        Ok(())
    }
    .boxed()
}

async fn admin_steps(session: &mut Session, narrator: &Narrator) -> PageWalkResult<()> {
    let settings = narrator.settings();
    let credentials = settings.admin_credentials()?;

    narrator.step("Opening the admin login page...");
    let mut login = AdminLoginPage::new(&mut *session, settings)?;
    login.load().await?;

    narrator.step(format!("Logging in as {}...", credentials.email));
    let submitted = login.login(credentials, settings.admin.remember_me).await?;
    narrator.detail(format!("login submitted: {submitted}"));

    narrator.step("Opening the backend...");
    let mut dashboard = AdminDashboard::new(&mut *session, settings)?;
    dashboard.navigate_to_backend().await?;

    narrator.step("Opening the users table...");
    dashboard.go_to_users().await?;

    narrator.step(format!("Editing user {}...", settings.admin.user_name));
    let mut users = UserManagement::new(&mut *session, settings)?;
    let edited = users.edit_user(&settings.admin.user_name).await?;
    narrator.detail(format!("edit opened: {edited}"));

    narrator.step("Opening the accounts table...");
    let mut dashboard = AdminDashboard::new(&mut *session, settings)?;
    dashboard.go_to_accounts().await?;

    narrator.step(format!("Viewing account {}...", settings.admin.account_name));
    let mut accounts = UserManagement::new(&mut *session, settings)?;
    accounts.view_account(&settings.admin.account_name).await
}

fn admin<'a>(session: &'a mut Session, narrator: &'a Narrator) -> BoxFuture<'a, PageWalkResult<()>> {
    async move {
        let outcome = admin_steps(&mut *session, narrator).await;
        if outcome.is_err() {
            if let Ok(page) = session.page() {
                if let Err(err) = narrator
                    .screenshot(page, &ScreenshotTarget::Viewport, "admin_failure")
                    .await
                {
                    narrator.detail(format!("failure screenshot not captured: {err}"));
                }
            }
        }
        outcome
    }
    .boxed()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::Credentials;
    use crate::mock::{MockBrowser, MockDocument, MockElement};

    const HOME: &str = "https://friendfilter.com";

    fn settings(dir: &std::path::Path) -> Settings {
        let mut settings = Settings {
            screenshot_dir: dir.to_path_buf(),
            ..Settings::default()
        };
        settings.browser.element_timeout_ms = 100;
        settings
    }

    fn site() -> MockBrowser {
        MockBrowser::new().with_document(
            HOME,
            MockDocument::new("FriendFilter - Filter your friends")
                .element(MockElement::new(Selector::css("body")))
                .element(
                    MockElement::new(Selector::css("header"))
                        .also(Selector::css("nav a, header a"))
                        .text("Pricing"),
                )
                .element(
                    MockElement::new(Selector::text_exact("Add to Chrome"))
                        .also(Selector::css("a[href*=\"chrome.google.com\"]"))
                        .also(Selector::css("a[href*=\"chrome\"]"))
                        .attr("href", "https://chrome.google.com/webstore/detail/friendfilter")
                        .attr("target", "_blank")
                        .text("Add to Chrome"),
                ),
        )
    }

    mod registry_tests {
        use super::*;

        #[test]
        fn test_builtin_demos() {
            assert_eq!(demo_names(), vec!["homepage", "practical", "visual", "admin"]);
            assert!(!demo("visual").unwrap().headless_default);
            assert!(demo("nope").is_none());
        }

        #[test]
        fn test_load_rating() {
            assert_eq!(load_rating(Duration::from_millis(800)), "good");
            assert_eq!(load_rating(Duration::from_millis(3_500)), "acceptable");
            assert_eq!(load_rating(Duration::from_secs(9)), "slow");
        }
    }

    mod narration_tests {
        use super::*;

        #[test]
        fn test_steps_are_numbered() {
            let narrator = Narrator::silent(Settings::default());
            assert_eq!(narrator.step("first"), 1);
            narrator.detail("detail");
            assert_eq!(narrator.step("second"), 2);
            assert_eq!(narrator.lines(), vec!["1. first", "   detail", "2. second"]);
            assert_eq!(narrator.steps(), 2);
        }
    }

    mod run_tests {
        use super::*;

        #[tokio::test]
        async fn test_homepage_demo_completes() {
            let dir = tempfile::tempdir().unwrap();
            let browser = site();
            let narrator = Narrator::silent(settings(dir.path()));
            let outcome = run_demo(&browser, demo("homepage").unwrap(), &narrator, None).await;

            assert!(outcome.completed(), "{:?}", outcome.error);
            assert_eq!(outcome.steps, 9);
            assert_eq!(outcome.screenshots.len(), 2);
            assert!(dir.path().join("friendfilter_homepage.png").exists());
            assert!(dir.path().join("friendfilter_mobile.png").exists());
            assert!(narrator.lines().iter().any(|l| l.contains("Chrome extension button found")));
            assert_eq!(browser.browser_closes(), 1);
        }

        #[tokio::test]
        async fn test_practical_demo_completes() {
            let dir = tempfile::tempdir().unwrap();
            let browser = site();
            let narrator = Narrator::silent(settings(dir.path()));
            let outcome = run_demo(&browser, demo("practical").unwrap(), &narrator, None).await;

            assert!(outcome.completed(), "{:?}", outcome.error);
            assert_eq!(outcome.steps, 8);
            assert_eq!(outcome.screenshots.len(), 2);
            let lines = narrator.lines();
            assert!(lines.iter().any(|l| l.contains("opens in new tab: true")));
            assert!(lines.iter().any(|l| l.contains("Pricing ->")));
            assert!(browser.was_called("goto:https://friendfilter.com/nonexistent-page"));
        }

        #[tokio::test]
        async fn test_visual_demo_honors_headless_override() {
            let dir = tempfile::tempdir().unwrap();
            let browser = site();
            let narrator = Narrator::silent(settings(dir.path()));
            let outcome = run_demo(&browser, demo("visual").unwrap(), &narrator, Some(true)).await;
            assert!(outcome.completed(), "{:?}", outcome.error);
            assert_eq!(outcome.screenshots.len(), 4);
        }

        #[tokio::test]
        async fn test_admin_demo_without_credentials_still_finishes() {
            let dir = tempfile::tempdir().unwrap();
            let browser = MockBrowser::new();
            let narrator = Narrator::silent(settings(dir.path()));
            let outcome = run_demo(&browser, demo("admin").unwrap(), &narrator, None).await;

            let error = outcome.error.clone().unwrap();
            assert!(error.contains("Missing credentials"));
            assert_eq!(outcome.steps, 0);
            let lines = narrator.lines();
            assert!(lines.iter().any(|l| l.starts_with("Demo failed")));
            assert!(lines.iter().any(|l| l.starts_with("Demo finished: admin")));
            assert_eq!(browser.browser_closes(), 1);
        }

        #[tokio::test]
        async fn test_admin_demo_failure_captures_screenshot() {
            let dir = tempfile::tempdir().unwrap();
            let browser = MockBrowser::new();
            let mut settings = settings(dir.path());
            settings.admin.credentials = Some(Credentials::new("ops@example.com", "pw"));
            settings.browser.navigation_timeout_ms = 100;
            let narrator = Narrator::silent(settings);
            let outcome = run_demo(&browser, demo("admin").unwrap(), &narrator, None).await;

            assert!(!outcome.completed());
            assert_eq!(outcome.screenshots, vec![dir.path().join("admin_failure.png")]);
            assert!(narrator.lines().last().unwrap().starts_with('='));
        }

        #[tokio::test]
        async fn test_launch_failure_is_narrated() {
            let dir = tempfile::tempdir().unwrap();
            let browser = MockBrowser::new().with_failing_launch();
            let narrator = Narrator::silent(settings(dir.path()));
            let outcome = run_demo(&browser, demo("homepage").unwrap(), &narrator, None).await;
            assert!(outcome.error.unwrap().contains("launch"));
            assert!(narrator.lines().iter().any(|l| l.starts_with("Demo finished")));
        }
    }
}
