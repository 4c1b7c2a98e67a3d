use crate::assertion::{expect_title_contains, expect_visible, expect_visible_if_present, Assertion};
use crate::catalog::NAV_LINKS;
use crate::config::Settings;
use crate::driver::Viewport;
use crate::page_object::PageObject;
use crate::pages::LandingPage;
use crate::scenario::{Category, Scenario, ScenarioFuture, Suite};
use crate::session::Session;
use futures::FutureExt;

pub(crate) const SUITE: Suite = Suite {
    name: "landing page",
    category: Category::Landing,
    scenarios: &[
        Scenario::new(
            "homepage_loads_successfully",
            "Homepage title names the product and the body renders",
            homepage_loads_successfully,
        ),
        Scenario::new(
            "chrome_extension_button",
            "\"Add to Chrome\" opens the Chrome Web Store",
            chrome_extension_button,
        ),
        Scenario::new(
            "navigation_menu",
            "Every navigation entry on the page is visible and clickable",
            navigation_menu,
        ),
        Scenario::new(
            "responsive_design",
            "Page renders at desktop, tablet and mobile widths",
            responsive_design,
        ),
    ],
};

fn homepage_loads_successfully<'a>(
    session: &'a mut Session,
    settings: &'a Settings,
) -> ScenarioFuture<'a> {
    async move {
        let mut landing = LandingPage::new(session, settings)?;
        landing.load().await?;
        let ctx = landing.context();
        expect_title_contains(ctx.page(), &settings.site.expected_title).await?;
        expect_visible(ctx, "body").await
    }
    .boxed()
}

fn chrome_extension_button<'a>(
    session: &'a mut Session,
    settings: &'a Settings,
) -> ScenarioFuture<'a> {
    async move {
        let mut landing = LandingPage::new(session, settings)?;
        landing.load().await?;
        expect_visible_if_present(landing.context(), "chrome_extension_button").await?;

        let Some(mut store) = landing.click_chrome_extension_button().await? else {
            return Ok(());
        };
        let url = store.url().await;
        store.close().await?;
        Assertion::contains(&url?, "chrome.google.com").into_result()
    }
    .boxed()
}

fn navigation_menu<'a>(session: &'a mut Session, settings: &'a Settings) -> ScenarioFuture<'a> {
    async move {
        let mut landing = LandingPage::new(session, settings)?;
        landing.load().await?;
        let ctx = landing.context();
        for link in NAV_LINKS {
            if !ctx.is_present(link).await? {
                continue;
            }
            expect_visible(ctx, link).await?;
            ctx.click_if_present(link).await?;
            ctx.wait_visible("body").await?;
        }
        Ok(())
    }
    .boxed()
}

fn responsive_design<'a>(session: &'a mut Session, settings: &'a Settings) -> ScenarioFuture<'a> {
    async move {
        let mut landing = LandingPage::new(session, settings)?;
        for viewport in [Viewport::DESKTOP, Viewport::TABLET, Viewport::MOBILE] {
            landing.context().page().set_viewport(viewport).await?;
            landing.load().await?;
            expect_visible(landing.context(), "body").await?;
            if viewport.is_compact() {
                expect_visible_if_present(landing.context(), "mobile_menu").await?;
            }
        }
        Ok(())
    }
    .boxed()
}
