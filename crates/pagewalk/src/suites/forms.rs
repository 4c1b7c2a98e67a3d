use crate::assertion::{expect_visible, expect_visible_if_present};
use crate::catalog;
use crate::config::Settings;
use crate::page_object::PageContext;
use crate::scenario::{Category, Scenario, ScenarioFuture, Suite};
use crate::session::Session;
use futures::FutureExt;

pub(crate) const SUITE: Suite = Suite {
    name: "form validation",
    category: Category::Forms,
    scenarios: &[
        Scenario::new(
            "email_validation",
            "An invalid email shows a validation message when the site has one",
            email_validation,
        ),
        Scenario::new(
            "required_fields",
            "Submitting with required fields empty keeps the page usable",
            required_fields,
        ),
    ],
};

fn email_validation<'a>(session: &'a mut Session, settings: &'a Settings) -> ScenarioFuture<'a> {
    async move {
        let mut ctx = PageContext::new(session, &settings.site.base_url, catalog::common())?;
        ctx.navigate("").await?;
        if !ctx.fill_if_present("email_field", "invalid-email").await? {
            return Ok(());
        }
        ctx.press_if_present("email_field", "Tab").await?;
        expect_visible_if_present(&ctx, "validation_message").await
    }
    .boxed()
}

fn required_fields<'a>(session: &'a mut Session, settings: &'a Settings) -> ScenarioFuture<'a> {
    async move {
        let mut ctx = PageContext::new(session, &settings.site.base_url, catalog::common())?;
        ctx.navigate("").await?;
        if !ctx.is_present("required_fields").await? {
            return Ok(());
        }
        ctx.click_if_present("submit_button").await?;
        expect_visible(&ctx, "body").await
    }
    .boxed()
}
