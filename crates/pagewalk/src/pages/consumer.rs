//! Consumer site pages.

use crate::catalog::{self, LocatorCatalog, NAV_LINKS};
use crate::config::Settings;
use crate::driver::PageDriver;
use crate::page_object::{PageContext, PageObject};
use crate::result::PageWalkResult;
use crate::session::Session;

/// Landing page at the site root
#[derive(Debug)]
pub struct LandingPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> LandingPage<'a> {
    /// Bind the session's tab
    pub fn new(session: &'a mut Session, settings: &'a Settings) -> PageWalkResult<Self> {
        Ok(Self {
            ctx: PageContext::new(session, &settings.site.base_url, catalog::landing())?,
        })
    }

    /// Trimmed text of the main heading; empty when there is none
    pub async fn main_heading(&self) -> PageWalkResult<String> {
        Ok(self
            .ctx
            .text("main_heading")
            .await?
            .map(|text| text.trim().to_string())
            .unwrap_or_default())
    }

    /// Click "Add to Chrome" and capture the store tab it opens
    pub async fn click_chrome_extension_button(
        &mut self,
    ) -> PageWalkResult<Option<Box<dyn PageDriver>>> {
        self.ctx.popup_if_present("chrome_extension_button").await
    }

    /// Whether the extension button is visible
    pub async fn chrome_extension_button_visible(&self) -> PageWalkResult<bool> {
        self.ctx.is_visible("chrome_extension_button").await
    }

    /// Click the first call-to-action
    pub async fn click_cta_button(&mut self) -> PageWalkResult<bool> {
        self.ctx.click_if_present("cta_button").await
    }

    /// Navigation entries present on the page, in menu order
    pub async fn nav_links_present(&self) -> PageWalkResult<Vec<&'static str>> {
        let mut present = Vec::new();
        for name in NAV_LINKS {
            if self.ctx.is_present(name).await? {
                present.push(name);
            }
        }
        Ok(present)
    }

    /// Whether the collapsed mobile menu toggle is present
    pub async fn mobile_menu_present(&self) -> PageWalkResult<bool> {
        self.ctx.is_present("mobile_menu").await
    }

    /// Whether the collapsed mobile menu toggle is visible
    pub async fn mobile_menu_visible(&self) -> PageWalkResult<bool> {
        self.ctx.is_visible("mobile_menu").await
    }
}

impl<'a> PageObject<'a> for LandingPage<'a> {
    fn page_name(&self) -> &'static str {
        "landing"
    }

    fn catalog(&self) -> &'static LocatorCatalog {
        catalog::landing()
    }

    fn context(&mut self) -> &mut PageContext<'a> {
        &mut self.ctx
    }
}

/// Login, signup and password reset forms
#[derive(Debug)]
pub struct AuthPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> AuthPage<'a> {
    /// Bind the session's tab
    pub fn new(session: &'a mut Session, settings: &'a Settings) -> PageWalkResult<Self> {
        Ok(Self {
            ctx: PageContext::new(session, &settings.site.base_url, catalog::auth())?,
        })
    }

    /// Fill the email field
    pub async fn fill_email(&mut self, email: &str) -> PageWalkResult<bool> {
        self.ctx.fill_if_present("email_input", email).await
    }

    /// Fill the password field
    pub async fn fill_password(&mut self, password: &str) -> PageWalkResult<bool> {
        self.ctx.fill_if_present("password_input", password).await
    }

    /// Fill the password confirmation field
    pub async fn fill_confirm_password(&mut self, password: &str) -> PageWalkResult<bool> {
        self.ctx
            .fill_if_present("confirm_password_input", password)
            .await
    }

    /// Click the submit button
    pub async fn submit(&mut self) -> PageWalkResult<bool> {
        self.ctx.click_if_present("submit_button").await
    }

    /// Click "Forgot Password"
    pub async fn click_forgot_password(&mut self) -> PageWalkResult<bool> {
        self.ctx.click_if_present("forgot_password_link").await
    }

    /// Displayed error message; empty when there is none
    pub async fn error_message(&self) -> PageWalkResult<String> {
        Ok(self
            .ctx
            .text("error_message")
            .await?
            .unwrap_or_default())
    }

    /// Fill email and password, then submit. Returns whether submit was clicked.
    pub async fn login(&mut self, email: &str, password: &str) -> PageWalkResult<bool> {
        self.fill_email(email).await?;
        self.fill_password(password).await?;
        self.submit().await
    }

    /// Fill the signup form, then submit. Returns whether submit was clicked.
    pub async fn signup(
        &mut self,
        email: &str,
        password: &str,
        confirm_password: Option<&str>,
    ) -> PageWalkResult<bool> {
        self.fill_email(email).await?;
        self.fill_password(password).await?;
        if let Some(confirm) = confirm_password {
            self.fill_confirm_password(confirm).await?;
        }
        self.submit().await
    }

    /// Follow the first login entry point and wait for the email field.
    /// Returns whether a login form is showing.
    pub async fn open_login(&mut self) -> PageWalkResult<bool> {
        if !self.ctx.click_if_present("login_link").await? {
            return Ok(false);
        }
        self.ctx.wait_visible("email_input").await
    }

    /// Follow the first signup entry point and wait for the email field.
    /// Returns whether a signup form is showing.
    pub async fn open_signup(&mut self) -> PageWalkResult<bool> {
        if !self.ctx.click_if_present("signup_link").await? {
            return Ok(false);
        }
        self.ctx.wait_visible("email_input").await
    }

    /// Start a password reset for `email`. Returns whether the reset form
    /// was submitted.
    pub async fn request_password_reset(&mut self, email: &str) -> PageWalkResult<bool> {
        if !self.click_forgot_password().await? {
            return Ok(false);
        }
        if !self.ctx.wait_visible("email_input").await? {
            return Ok(false);
        }
        self.fill_email(email).await?;
        self.ctx.click_if_present("reset_button").await
    }

    /// Whether the email field is visible
    pub async fn email_visible(&self) -> PageWalkResult<bool> {
        self.ctx.is_visible("email_input").await
    }

    /// Whether the password field is visible
    pub async fn password_visible(&self) -> PageWalkResult<bool> {
        self.ctx.is_visible("password_input").await
    }

    /// Whether a password field exists at all
    pub async fn password_present(&self) -> PageWalkResult<bool> {
        self.ctx.is_present("password_input").await
    }
}

impl<'a> PageObject<'a> for AuthPage<'a> {
    fn page_name(&self) -> &'static str {
        "auth"
    }

    fn catalog(&self) -> &'static LocatorCatalog {
        catalog::auth()
    }

    fn context(&mut self) -> &mut PageContext<'a> {
        &mut self.ctx
    }
}

/// Pricing page
#[derive(Debug)]
pub struct PricingPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> PricingPage<'a> {
    /// Bind the session's tab
    pub fn new(session: &'a mut Session, settings: &'a Settings) -> PageWalkResult<Self> {
        Ok(Self {
            ctx: PageContext::new(session, &settings.site.base_url, catalog::pricing())?,
        })
    }

    /// Number of plan cards
    pub async fn pricing_card_count(&self) -> PageWalkResult<usize> {
        self.ctx.count("pricing_cards").await
    }

    /// Whether the n-th plan card is visible
    pub async fn card_visible(&self, index: usize) -> PageWalkResult<bool> {
        self.ctx.is_nth_visible("pricing_cards", index).await
    }

    /// Click the plan button at `index`; skipped when there are fewer buttons
    pub async fn select_plan(&mut self, index: usize) -> PageWalkResult<bool> {
        self.ctx
            .click_nth_if_present("select_plan_buttons", index)
            .await
    }

    /// Flip monthly/yearly billing
    pub async fn toggle_billing_period(&mut self) -> PageWalkResult<bool> {
        self.ctx.click_if_present("billing_toggle").await
    }

    /// Current URL
    pub async fn current_url(&mut self) -> PageWalkResult<String> {
        self.ctx.page().url().await
    }
}

impl<'a> PageObject<'a> for PricingPage<'a> {
    fn path(&self) -> &'static str {
        "/pricing"
    }

    fn page_name(&self) -> &'static str {
        "pricing"
    }

    fn catalog(&self) -> &'static LocatorCatalog {
        catalog::pricing()
    }

    fn context(&mut self) -> &mut PageContext<'a> {
        &mut self.ctx
    }
}

/// Connection list filters on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionFilter {
    /// Active connections
    Active,
    /// Archived connections
    Archived,
    /// Everything
    All,
}

impl ConnectionFilter {
    /// Every filter, in toolbar order
    pub const ALL: [Self; 3] = [Self::Active, Self::Archived, Self::All];

    const fn catalog_name(self) -> &'static str {
        match self {
            Self::Active => "filter_active",
            Self::Archived => "filter_archived",
            Self::All => "filter_all",
        }
    }
}

impl std::fmt::Display for ConnectionFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Active => "Active",
            Self::Archived => "Archived",
            Self::All => "All",
        };
        write!(f, "{label}")
    }
}

/// Sections checked by the dashboard layout scenario
const DASHBOARD_SECTIONS: [&str; 4] = [
    "dashboard_container",
    "metrics_section",
    "connections_count",
    "whitelist_section",
];

/// Signed-in dashboard
#[derive(Debug)]
pub struct DashboardPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> DashboardPage<'a> {
    /// Bind the session's tab
    pub fn new(session: &'a mut Session, settings: &'a Settings) -> PageWalkResult<Self> {
        Ok(Self {
            ctx: PageContext::new(session, &settings.site.base_url, catalog::dashboard())?,
        })
    }

    /// Type `query` into the search box and press Enter
    pub async fn search_connections(&mut self, query: &str) -> PageWalkResult<bool> {
        if !self.ctx.fill_if_present("search_input", query).await? {
            return Ok(false);
        }
        self.ctx.press_if_present("search_input", "Enter").await
    }

    /// Whether the search box is visible
    pub async fn search_visible(&self) -> PageWalkResult<bool> {
        self.ctx.is_visible("search_input").await
    }

    /// Click a connection filter
    pub async fn filter_connections(&mut self, filter: ConnectionFilter) -> PageWalkResult<bool> {
        self.ctx.click_if_present(filter.catalog_name()).await
    }

    /// Connection count display; "0" when there is none
    pub async fn connections_count(&self) -> PageWalkResult<String> {
        Ok(self
            .ctx
            .text("connections_count")
            .await?
            .map_or_else(|| "0".to_string(), |text| text.trim().to_string()))
    }

    /// Visibility of each dashboard section that is present
    pub async fn section_visibility(&self) -> PageWalkResult<Vec<(&'static str, bool)>> {
        let mut sections = Vec::new();
        for name in DASHBOARD_SECTIONS {
            if self.ctx.is_present(name).await? {
                sections.push((name, self.ctx.is_visible(name).await?));
            }
        }
        Ok(sections)
    }
}

impl<'a> PageObject<'a> for DashboardPage<'a> {
    fn path(&self) -> &'static str {
        "/dashboard"
    }

    fn page_name(&self) -> &'static str {
        "dashboard"
    }

    fn catalog(&self) -> &'static LocatorCatalog {
        catalog::dashboard()
    }

    fn loaded_marker(&self) -> &'static str {
        "dashboard_container"
    }

    fn context(&mut self) -> &mut PageContext<'a> {
        &mut self.ctx
    }
}

/// Browser extension information, shown on the landing page
#[derive(Debug)]
pub struct ExtensionPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> ExtensionPage<'a> {
    /// Bind the session's tab
    pub fn new(session: &'a mut Session, settings: &'a Settings) -> PageWalkResult<Self> {
        Ok(Self {
            ctx: PageContext::new(session, &settings.site.base_url, catalog::extension())?,
        })
    }

    /// Click the Chrome Web Store link and capture the store tab
    pub async fn click_chrome_store_link(&mut self) -> PageWalkResult<Option<Box<dyn PageDriver>>> {
        self.ctx.popup_if_present("chrome_store_link").await
    }

    /// Store link target; empty when there is no link
    pub async fn chrome_store_url(&self) -> PageWalkResult<String> {
        Ok(self
            .ctx
            .attribute("chrome_store_link", 0, "href")
            .await?
            .unwrap_or_default())
    }

    /// Whether the store link is present
    pub async fn chrome_store_link_present(&self) -> PageWalkResult<bool> {
        self.ctx.is_present("chrome_store_link").await
    }

    /// Whether the store link is visible
    pub async fn chrome_store_link_visible(&self) -> PageWalkResult<bool> {
        self.ctx.is_visible("chrome_store_link").await
    }

    /// Whether permissions information is on the page
    pub async fn permissions_displayed(&self) -> PageWalkResult<bool> {
        self.ctx.is_present("permissions_info").await
    }

    /// Whether privacy information is on the page
    pub async fn privacy_info_displayed(&self) -> PageWalkResult<bool> {
        self.ctx.is_present("privacy_info").await
    }

    /// Whether the first permissions or privacy block is visible
    pub async fn permissions_or_privacy_visible(&self) -> PageWalkResult<bool> {
        Ok(self.ctx.is_visible("permissions_info").await?
            || self.ctx.is_visible("privacy_info").await?)
    }
}

impl<'a> PageObject<'a> for ExtensionPage<'a> {
    fn page_name(&self) -> &'static str {
        "extension"
    }

    fn catalog(&self) -> &'static LocatorCatalog {
        catalog::extension()
    }

    fn context(&mut self) -> &mut PageContext<'a> {
        &mut self.ctx
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::locator::Selector;
    use crate::mock::{MockBrowser, MockDocument, MockElement};

    const HOME: &str = "https://friendfilter.com";

    async fn session(browser: &MockBrowser, settings: &Settings) -> Session {
        Session::open(browser, settings.session_config()).await.unwrap()
    }

    mod landing_tests {
        use super::*;

        fn browser() -> MockBrowser {
            MockBrowser::new().with_document(
                HOME,
                MockDocument::new("FriendFilter - Clean up your friends list")
                    .element(MockElement::new(Selector::css("body")))
                    .element(MockElement::new(Selector::css("h1")).text("  Filter your friends \n"))
                    .element(
                        MockElement::new(Selector::text_exact("Add to Chrome"))
                            .opens_popup("https://chrome.google.com/webstore/detail/friendfilter"),
                    )
                    .element(MockElement::new(Selector::text_exact("Pricing")))
                    .element(MockElement::new(Selector::text_exact("Home"))),
            )
        }

        #[tokio::test]
        async fn test_load_and_query() {
            let browser = browser();
            let settings = Settings::default();
            let mut session = session(&browser, &settings).await;
            let mut landing = LandingPage::new(&mut session, &settings).unwrap();
            landing.load().await.unwrap();
            assert!(landing.is_loaded().await.unwrap());
            assert!(landing.is_loaded().await.unwrap());
            assert_eq!(landing.main_heading().await.unwrap(), "Filter your friends");
            assert_eq!(
                landing.nav_links_present().await.unwrap(),
                vec!["nav_home", "nav_pricing"]
            );
            drop(landing);
            session.close().await.unwrap();
        }

        #[tokio::test]
        async fn test_extension_popup() {
            let browser = browser();
            let settings = Settings::default();
            let mut session = session(&browser, &settings).await;
            let mut landing = LandingPage::new(&mut session, &settings).unwrap();
            landing.load().await.unwrap();
            let mut popup = landing.click_chrome_extension_button().await.unwrap().unwrap();
            assert!(popup.url().await.unwrap().contains("chrome.google.com"));
            popup.close().await.unwrap();
            assert!(!landing.click_cta_button().await.unwrap());
            drop(landing);
            session.close().await.unwrap();
        }

        #[tokio::test]
        async fn test_empty_page_degrades() {
            let browser = MockBrowser::new();
            let settings = Settings::default();
            let mut session = session(&browser, &settings).await;
            let mut landing = LandingPage::new(&mut session, &settings).unwrap();
            landing.load().await.unwrap();
            assert_eq!(landing.main_heading().await.unwrap(), "");
            assert!(landing.click_chrome_extension_button().await.unwrap().is_none());
            assert!(landing.nav_links_present().await.unwrap().is_empty());
            drop(landing);
            session.close().await.unwrap();
        }
    }

    mod auth_tests {
        use super::*;

        fn browser() -> MockBrowser {
            MockBrowser::new().with_document(
                HOME,
                MockDocument::new("FriendFilter")
                    .element(MockElement::new(Selector::css("input[type=\"email\"]")))
                    .element(MockElement::new(Selector::css("input[type=\"password\"]")))
                    .element(MockElement::new(Selector::css("button[type=\"submit\"]"))),
            )
        }

        #[tokio::test]
        async fn test_login_fills_and_submits_once() {
            let browser = browser();
            let settings = Settings::default();
            let mut session = session(&browser, &settings).await;
            let mut auth = AuthPage::new(&mut session, &settings).unwrap();
            auth.load().await.unwrap();
            assert!(auth.login("user@example.com", "pw").await.unwrap());
            drop(auth);
            session.close().await.unwrap();
            assert!(browser.was_called("fill:css=input[type=\"email\"]#0=user@example.com"));
            assert!(browser.was_called("fill:css=input[type=\"password\"]#0=pw"));
            assert_eq!(browser.call_count("click:"), 1);
        }

        #[tokio::test]
        async fn test_signup_skips_missing_confirmation() {
            let browser = browser();
            let settings = Settings::default();
            let mut session = session(&browser, &settings).await;
            let mut auth = AuthPage::new(&mut session, &settings).unwrap();
            auth.load().await.unwrap();
            assert!(auth.signup("a@b.c", "pw", Some("pw")).await.unwrap());
            assert_eq!(auth.error_message().await.unwrap(), "");
            drop(auth);
            session.close().await.unwrap();
            assert_eq!(browser.call_count("fill:"), 2);
        }

        #[tokio::test]
        async fn test_open_login_without_entry_point() {
            let browser = browser();
            let settings = Settings::default();
            let mut session = session(&browser, &settings).await;
            let mut auth = AuthPage::new(&mut session, &settings).unwrap();
            auth.load().await.unwrap();
            assert!(!auth.open_login().await.unwrap());
            assert!(!auth.request_password_reset("a@b.c").await.unwrap());
            drop(auth);
            session.close().await.unwrap();
        }
    }

    mod dashboard_tests {
        use super::*;

        fn browser() -> MockBrowser {
            MockBrowser::new().with_document(
                format!("{HOME}/dashboard"),
                MockDocument::new("Dashboard")
                    .element(MockElement::new(Selector::css(".dashboard")))
                    .element(MockElement::new(Selector::css(".stats")).text(" 42 "))
                    .element(MockElement::new(Selector::css("input[type=\"search\"]")))
                    .element(MockElement::new(Selector::text_exact("Archived"))),
            )
        }

        #[tokio::test]
        async fn test_dashboard_operations() {
            let browser = browser();
            let settings = Settings::default();
            let mut session = session(&browser, &settings).await;
            let mut dashboard = DashboardPage::new(&mut session, &settings).unwrap();
            dashboard.load().await.unwrap();
            assert!(dashboard.is_loaded().await.unwrap());
            assert_eq!(dashboard.connections_count().await.unwrap(), "42");
            assert!(dashboard.search_connections("test search").await.unwrap());
            assert!(!dashboard.filter_connections(ConnectionFilter::Active).await.unwrap());
            assert!(dashboard.filter_connections(ConnectionFilter::Archived).await.unwrap());
            let sections = dashboard.section_visibility().await.unwrap();
            assert_eq!(
                sections,
                vec![("dashboard_container", true), ("connections_count", true)]
            );
            drop(dashboard);
            session.close().await.unwrap();
            assert!(browser.was_called("press:css=input[type=\"search\"]#0:Enter"));
        }

        #[tokio::test]
        async fn test_connections_count_defaults_to_zero() {
            let browser = MockBrowser::new();
            let settings = Settings::default();
            let mut session = session(&browser, &settings).await;
            let mut dashboard = DashboardPage::new(&mut session, &settings).unwrap();
            dashboard.load().await.unwrap();
            assert!(!dashboard.is_loaded().await.unwrap());
            assert_eq!(dashboard.connections_count().await.unwrap(), "0");
            drop(dashboard);
            session.close().await.unwrap();
        }
    }

    mod pricing_tests {
        use super::*;

        #[tokio::test]
        async fn test_select_plan_out_of_range_is_noop() {
            let browser = MockBrowser::new().with_document(
                format!("{HOME}/pricing"),
                MockDocument::new("Pricing")
                    .element(MockElement::new(Selector::css(".plan-card")))
                    .element(MockElement::new(Selector::css(".plan-card")).hidden())
                    .element(MockElement::new(Selector::text_exact("Choose Plan"))),
            );
            let settings = Settings::default();
            let mut session = session(&browser, &settings).await;
            let mut pricing = PricingPage::new(&mut session, &settings).unwrap();
            pricing.load().await.unwrap();
            assert_eq!(pricing.pricing_card_count().await.unwrap(), 2);
            assert!(pricing.card_visible(0).await.unwrap());
            assert!(!pricing.card_visible(1).await.unwrap());
            assert!(!pricing.select_plan(3).await.unwrap());
            assert!(pricing.select_plan(0).await.unwrap());
            drop(pricing);
            session.close().await.unwrap();
            assert_eq!(browser.call_count("click:"), 1);
        }
    }

    mod extension_tests {
        use super::*;

        #[tokio::test]
        async fn test_store_url() {
            let url = "https://chrome.google.com/webstore/detail/friendfilter/abc";
            let browser = MockBrowser::new().with_document(
                HOME,
                MockDocument::new("FriendFilter")
                    .element(
                        MockElement::new(Selector::css("a[href*=\"chrome.google.com/webstore\"]"))
                            .attr("href", url),
                    )
                    .element(MockElement::new(Selector::text_exact("Privacy"))),
            );
            let settings = Settings::default();
            let mut session = session(&browser, &settings).await;
            let mut extension = ExtensionPage::new(&mut session, &settings).unwrap();
            extension.load().await.unwrap();
            assert_eq!(extension.chrome_store_url().await.unwrap(), url);
            assert!(extension.privacy_info_displayed().await.unwrap());
            assert!(!extension.permissions_displayed().await.unwrap());
            drop(extension);
            session.close().await.unwrap();
        }
    }
}
