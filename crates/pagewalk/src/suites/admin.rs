//! Admin backend suite.
//!
//! Both scenarios need admin credentials; without them they fail with
//! [`crate::PageWalkError::MissingCredentials`] before touching the site.

use crate::config::Settings;
use crate::driver::ScreenshotTarget;
use crate::page_object::PageObject;
use crate::pages::{AdminDashboard, AdminLoginPage, UserManagement};
use crate::result::PageWalkResult;
use crate::scenario::{Category, Scenario, ScenarioFuture, Suite};
use crate::session::Session;
use futures::FutureExt;
use std::path::Path;

pub(crate) const SUITE: Suite = Suite {
    name: "admin backend",
    category: Category::Admin,
    scenarios: &[
        Scenario::new(
            "login_and_user_management",
            "Log in, open the users table, edit a user and view an account",
            login_and_user_management,
        ),
        Scenario::new(
            "complete_admin_workflow",
            "Full admin workflow; captures a screenshot when it fails",
            complete_admin_workflow,
        ),
    ],
};

/// Login, users table, user edit, accounts table, account view
async fn admin_workflow(session: &mut Session, settings: &Settings) -> PageWalkResult<()> {
    let credentials = settings.admin_credentials()?;

    let mut login = AdminLoginPage::new(&mut *session, settings)?;
    login.load().await?;
    login.login(credentials, settings.admin.remember_me).await?;

    let mut dashboard = AdminDashboard::new(&mut *session, settings)?;
    dashboard.navigate_to_backend().await?;
    dashboard.go_to_users().await?;

    let mut users = UserManagement::new(&mut *session, settings)?;
    users.edit_user(&settings.admin.user_name).await?;

    let mut dashboard = AdminDashboard::new(&mut *session, settings)?;
    dashboard.go_to_accounts().await?;

    let mut accounts = UserManagement::new(&mut *session, settings)?;
    accounts.view_account(&settings.admin.account_name).await
}

async fn capture_failure(session: &mut Session, path: &Path) -> PageWalkResult<()> {
    let shot = session.page()?.screenshot(&ScreenshotTarget::Viewport).await?;
    shot.save(path).await
}

fn login_and_user_management<'a>(
    session: &'a mut Session,
    settings: &'a Settings,
) -> ScenarioFuture<'a> {
    admin_workflow(session, settings).boxed()
}

fn complete_admin_workflow<'a>(
    session: &'a mut Session,
    settings: &'a Settings,
) -> ScenarioFuture<'a> {
    async move {
        let outcome = admin_workflow(&mut *session, settings).await;
        if let Err(err) = &outcome {
            let path = settings.screenshot_path("admin_failure");
            tracing::warn!(error = %err, path = %path.display(), "admin workflow failed; capturing screenshot");
            if let Err(shot_err) = capture_failure(session, &path).await {
                tracing::warn!(error = %shot_err, "failure screenshot not captured");
            }
        }
        outcome
    }
    .boxed()
}
