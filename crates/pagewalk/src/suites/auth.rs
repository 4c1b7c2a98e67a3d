use crate::assertion::{expect_visible, expect_visible_if_present};
use crate::config::Settings;
use crate::page_object::PageObject;
use crate::pages::AuthPage;
use crate::scenario::{Category, Scenario, ScenarioFuture, Suite};
use crate::session::Session;
use futures::FutureExt;

pub(crate) const SUITE: Suite = Suite {
    name: "user authentication",
    category: Category::Auth,
    scenarios: &[
        Scenario::new(
            "signup_form",
            "Signup entry point opens a form with visible credentials fields",
            signup_form,
        ),
        Scenario::new(
            "login_form",
            "Login entry point opens a form with visible email and password",
            login_form,
        ),
        Scenario::new(
            "password_reset_flow",
            "Forgot Password accepts an email and submits",
            password_reset_flow,
        ),
    ],
};

fn signup_form<'a>(session: &'a mut Session, settings: &'a Settings) -> ScenarioFuture<'a> {
    async move {
        let mut auth = AuthPage::new(session, settings)?;
        auth.load().await?;
        if !auth.open_signup().await? {
            return Ok(());
        }
        let ctx = auth.context();
        expect_visible_if_present(ctx, "email_input").await?;
        expect_visible_if_present(ctx, "password_input").await
    }
    .boxed()
}

fn login_form<'a>(session: &'a mut Session, settings: &'a Settings) -> ScenarioFuture<'a> {
    async move {
        let mut auth = AuthPage::new(session, settings)?;
        auth.load().await?;
        auth.open_login().await?;
        let ctx = auth.context();
        if ctx.is_present("email_input").await? && ctx.is_present("password_input").await? {
            expect_visible(ctx, "email_input").await?;
            expect_visible(ctx, "password_input").await?;
        }
        Ok(())
    }
    .boxed()
}

fn password_reset_flow<'a>(session: &'a mut Session, settings: &'a Settings) -> ScenarioFuture<'a> {
    async move {
        let mut auth = AuthPage::new(session, settings)?;
        auth.load().await?;
        if !auth.click_forgot_password().await? {
            return Ok(());
        }
        if !auth.context().is_present("email_input").await? {
            return Ok(());
        }
        expect_visible(auth.context(), "email_input").await?;
        auth.fill_email(&settings.site.probe_email).await?;
        auth.context().click_if_present("reset_button").await?;
        Ok(())
    }
    .boxed()
}
