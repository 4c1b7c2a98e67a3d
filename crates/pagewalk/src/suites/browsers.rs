//! Compatibility across viewports.
//!
//! Each scenario gets a fresh session opened at its own viewport.

use crate::assertion::{expect_visible, Assertion};
use crate::catalog;
use crate::config::Settings;
use crate::driver::Viewport;
use crate::page_object::PageContext;
use crate::scenario::{Category, Scenario, ScenarioFuture, Suite};
use crate::session::Session;
use futures::FutureExt;

pub(crate) const SUITE: Suite = Suite {
    name: "cross-viewport compatibility",
    category: Category::Browsers,
    scenarios: &[
        Scenario::new("desktop", "Homepage renders on a desktop screen", renders)
            .at_viewport(Viewport::DESKTOP),
        Scenario::new("tablet", "Homepage renders on a tablet", renders)
            .at_viewport(Viewport::TABLET),
        Scenario::new("mobile", "Homepage renders on a phone", renders)
            .at_viewport(Viewport::MOBILE),
        Scenario::new(
            "viewport_round_trip",
            "Body stays visible when shrinking to mobile and back",
            viewport_round_trip,
        )
        .at_viewport(Viewport::DESKTOP),
    ],
};

fn renders<'a>(session: &'a mut Session, settings: &'a Settings) -> ScenarioFuture<'a> {
    async move {
        let mut ctx = PageContext::new(session, &settings.site.base_url, catalog::common())?;
        ctx.navigate("").await?;
        expect_visible(&ctx, "body").await
    }
    .boxed()
}

fn viewport_round_trip<'a>(session: &'a mut Session, settings: &'a Settings) -> ScenarioFuture<'a> {
    async move {
        let mut ctx = PageContext::new(session, &settings.site.base_url, catalog::common())?;
        ctx.navigate("").await?;
        for viewport in [Viewport::DESKTOP, Viewport::MOBILE, Viewport::DESKTOP] {
            ctx.page().set_viewport(viewport).await?;
            let actual = ctx.page().viewport().await?;
            Assertion::equals(&viewport, &actual).into_result()?;
            expect_visible(&ctx, "body").await?;
        }
        Ok(())
    }
    .boxed()
}
