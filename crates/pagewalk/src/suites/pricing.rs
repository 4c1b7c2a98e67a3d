use crate::assertion::{expect_all_visible, expect_url_contains_any};
use crate::config::Settings;
use crate::network::UrlPattern;
use crate::page_object::PageObject;
use crate::pages::PricingPage;
use crate::scenario::{Category, Scenario, ScenarioFuture, Suite};
use crate::session::Session;
use futures::FutureExt;

/// Where choosing a plan is expected to lead
const PLAN_DESTINATIONS: [&str; 3] = ["signup", "payment", "checkout"];

pub(crate) const SUITE: Suite = Suite {
    name: "pricing page",
    category: Category::Pricing,
    scenarios: &[
        Scenario::new(
            "pricing_plans_display",
            "Every plan card is visible",
            pricing_plans_display,
        ),
        Scenario::new(
            "plan_selection",
            "Choosing a plan leads to signup or payment",
            plan_selection,
        ),
    ],
};

fn pricing_plans_display<'a>(session: &'a mut Session, settings: &'a Settings) -> ScenarioFuture<'a> {
    async move {
        let mut pricing = PricingPage::new(session, settings)?;
        pricing.load().await?;
        expect_all_visible(pricing.context(), "pricing_cards").await
    }
    .boxed()
}

fn plan_selection<'a>(session: &'a mut Session, settings: &'a Settings) -> ScenarioFuture<'a> {
    async move {
        let mut pricing = PricingPage::new(session, settings)?;
        pricing.load().await?;
        if !pricing.select_plan(0).await? {
            return Ok(());
        }
        let destination = UrlPattern::Regex(PLAN_DESTINATIONS.join("|"));
        let ctx = pricing.context();
        if ctx.wait_for_url(&destination).await? {
            return Ok(());
        }
        expect_url_contains_any(ctx.page(), &PLAN_DESTINATIONS).await
    }
    .boxed()
}
