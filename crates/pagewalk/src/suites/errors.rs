use crate::assertion::{expect_visible, Assertion};
use crate::catalog;
use crate::config::Settings;
use crate::network::UrlPattern;
use crate::page_object::PageContext;
use crate::scenario::{Category, Scenario, ScenarioFuture, Suite};
use crate::session::Session;
use futures::FutureExt;

/// Path no site should serve
const MISSING_PATH: &str = "/nonexistent-page";

/// Requests aborted by the blocked-API scenario
const API_PATTERN: &str = "**/api/**";

pub(crate) const SUITE: Suite = Suite {
    name: "error handling",
    category: Category::Errors,
    scenarios: &[
        Scenario::new(
            "not_found_page",
            "Unknown paths serve a 404 page",
            not_found_page,
        ),
        Scenario::new(
            "blocked_api_requests",
            "Page still renders when API calls fail",
            blocked_api_requests,
        ),
    ],
};

fn not_found_page<'a>(session: &'a mut Session, settings: &'a Settings) -> ScenarioFuture<'a> {
    async move {
        let mut ctx = PageContext::new(session, &settings.site.base_url, catalog::common())?;
        ctx.navigate(MISSING_PATH).await?;
        let content = ctx.page().content().await?;
        Assertion::contains_any(&content, &["404", "Not Found"]).into_result()
    }
    .boxed()
}

fn blocked_api_requests<'a>(session: &'a mut Session, settings: &'a Settings) -> ScenarioFuture<'a> {
    async move {
        let mut ctx = PageContext::new(session, &settings.site.base_url, catalog::common())?;
        ctx.page()
            .block_requests(UrlPattern::parse(API_PATTERN))
            .await?;
        ctx.navigate("").await?;
        expect_visible(&ctx, "body").await
    }
    .boxed()
}
