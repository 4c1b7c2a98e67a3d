use crate::assertion::expect_visible_if_present;
use crate::catalog::{self, LANDMARKS};
use crate::config::Settings;
use crate::page_object::PageContext;
use crate::scenario::{Category, Scenario, ScenarioFuture, Suite};
use crate::session::Session;
use futures::FutureExt;

/// Tab presses in the keyboard walk
const TAB_STOPS: usize = 5;

pub(crate) const SUITE: Suite = Suite {
    name: "accessibility",
    category: Category::Accessibility,
    scenarios: &[
        Scenario::new(
            "keyboard_navigation",
            "Tab moves through the first focusable elements",
            keyboard_navigation,
        ),
        Scenario::new(
            "aria_landmarks",
            "ARIA landmarks that exist are visible",
            aria_landmarks,
        ),
    ],
};

fn keyboard_navigation<'a>(session: &'a mut Session, settings: &'a Settings) -> ScenarioFuture<'a> {
    async move {
        let mut ctx = PageContext::new(session, &settings.site.base_url, catalog::common())?;
        ctx.navigate("").await?;
        let stops = ctx.count("focusable").await?.min(TAB_STOPS);
        for _ in 0..stops {
            ctx.page().keyboard_press("Tab").await?;
        }
        Ok(())
    }
    .boxed()
}

fn aria_landmarks<'a>(session: &'a mut Session, settings: &'a Settings) -> ScenarioFuture<'a> {
    async move {
        let mut ctx = PageContext::new(session, &settings.site.base_url, catalog::common())?;
        ctx.navigate("").await?;
        for landmark in LANDMARKS {
            expect_visible_if_present(&ctx, landmark).await?;
        }
        Ok(())
    }
    .boxed()
}
