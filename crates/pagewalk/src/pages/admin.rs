//! Admin backend pages.
//!
//! The admin panel is driven by accessible roles and names. Every step is
//! gated like the consumer pages; the flows that must land somewhere check
//! the resulting URL instead of trusting the clicks.

use crate::catalog::{self, LocatorCatalog};
use crate::config::{Credentials, Settings};
use crate::network::UrlPattern;
use crate::page_object::{PageContext, PageObject};
use crate::result::{PageWalkError, PageWalkResult};
use crate::session::Session;

/// URL the users table lives at
pub const USERS_URL_PATTERN: &str = "**/admin/users";

/// URL an account detail view lives at
pub const ACCOUNT_VIEW_URL_PATTERN: &str = "**/view";

async fn expect_url(ctx: &mut PageContext<'_>, pattern: &str) -> PageWalkResult<()> {
    let pattern = UrlPattern::parse(pattern);
    if ctx.wait_for_url(&pattern).await? {
        return Ok(());
    }
    let actual = ctx.page().url().await?;
    Err(PageWalkError::assertion(format!(
        "expected URL matching {pattern}, got {actual}"
    )))
}

/// Admin login form
#[derive(Debug)]
pub struct AdminLoginPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> AdminLoginPage<'a> {
    /// Bind the session's tab
    pub fn new(session: &'a mut Session, settings: &'a Settings) -> PageWalkResult<Self> {
        Ok(Self {
            ctx: PageContext::new(session, &settings.admin.base_url, catalog::admin_login())?,
        })
    }

    /// Log in: open the form, fill it, optionally tick "Remember me",
    /// submit and accept the terms prompt. Returns whether the login
    /// button was clicked.
    pub async fn login(&mut self, credentials: &Credentials, remember_me: bool) -> PageWalkResult<bool> {
        tracing::info!(remember_me, "admin login");
        if self.ctx.click_if_present("login_link").await? {
            self.ctx.wait_visible("email_input").await?;
        }
        self.ctx
            .fill_if_present("email_input", &credentials.email)
            .await?;
        self.ctx
            .fill_if_present("password_input", &credentials.password)
            .await?;
        if remember_me {
            self.ctx.check_if_present("remember_me").await?;
        }
        let submitted = self.ctx.click_if_present("login_button").await?;
        self.ctx.click_if_present("accept_terms").await?;
        Ok(submitted)
    }
}

impl<'a> PageObject<'a> for AdminLoginPage<'a> {
    fn page_name(&self) -> &'static str {
        "admin_login"
    }

    fn catalog(&self) -> &'static LocatorCatalog {
        catalog::admin_login()
    }

    fn context(&mut self) -> &mut PageContext<'a> {
        &mut self.ctx
    }
}

/// Admin navigation after login
#[derive(Debug)]
pub struct AdminDashboard<'a> {
    ctx: PageContext<'a>,
}

impl<'a> AdminDashboard<'a> {
    /// Bind the session's tab
    pub fn new(session: &'a mut Session, settings: &'a Settings) -> PageWalkResult<Self> {
        Ok(Self {
            ctx: PageContext::new(session, &settings.admin.base_url, catalog::admin_dashboard())?,
        })
    }

    /// Open the backend area
    pub async fn navigate_to_backend(&mut self) -> PageWalkResult<bool> {
        self.ctx.click_if_present("backend_link").await
    }

    /// Open the users table; fails unless the URL ends up on it
    pub async fn go_to_users(&mut self) -> PageWalkResult<()> {
        self.ctx.click_if_present("users_link").await?;
        expect_url(&mut self.ctx, USERS_URL_PATTERN).await
    }

    /// Open the accounts table
    pub async fn go_to_accounts(&mut self) -> PageWalkResult<bool> {
        self.ctx.click_if_present("accounts_link").await
    }
}

impl<'a> PageObject<'a> for AdminDashboard<'a> {
    fn page_name(&self) -> &'static str {
        "admin_dashboard"
    }

    fn catalog(&self) -> &'static LocatorCatalog {
        catalog::admin_dashboard()
    }

    fn context(&mut self) -> &mut PageContext<'a> {
        &mut self.ctx
    }
}

/// Users and accounts tables
#[derive(Debug)]
pub struct UserManagement<'a> {
    ctx: PageContext<'a>,
}

impl<'a> UserManagement<'a> {
    /// Bind the session's tab
    pub fn new(session: &'a mut Session, settings: &'a Settings) -> PageWalkResult<Self> {
        Ok(Self {
            ctx: PageContext::new(session, &settings.admin.base_url, catalog::user_management())?,
        })
    }

    /// Open the row menu for user `name` and follow "Edit".
    /// Returns whether the edit link was clicked.
    pub async fn edit_user(&mut self, name: &str) -> PageWalkResult<bool> {
        let row = catalog::row_buttons(name);
        if !self.ctx.click_if_present(&row).await? {
            return Ok(false);
        }
        self.ctx.click_if_present("edit_link").await
    }

    /// Open the row menu for account `name` and follow "View"; fails unless
    /// the URL ends up on the account view
    pub async fn view_account(&mut self, name: &str) -> PageWalkResult<()> {
        let row = catalog::row_buttons(name);
        // The first row button is the checkbox toggle; the menu is second.
        if self.ctx.click_nth_if_present(&row, 1).await? {
            self.ctx.click_if_present("view_link").await?;
        }
        expect_url(&mut self.ctx, ACCOUNT_VIEW_URL_PATTERN).await
    }
}

impl<'a> PageObject<'a> for UserManagement<'a> {
    fn page_name(&self) -> &'static str {
        "user_management"
    }

    fn catalog(&self) -> &'static LocatorCatalog {
        catalog::user_management()
    }

    fn context(&mut self) -> &mut PageContext<'a> {
        &mut self.ctx
    }
}
