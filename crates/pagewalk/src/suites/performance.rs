use crate::assertion::Assertion;
use crate::catalog::{self, META_TAGS};
use crate::config::Settings;
use crate::page_object::PageContext;
use crate::scenario::{Category, Scenario, ScenarioFuture, Suite};
use crate::session::Session;
use futures::FutureExt;
use std::time::Instant;

pub(crate) const SUITE: Suite = Suite {
    name: "performance and SEO",
    category: Category::Performance,
    scenarios: &[
        Scenario::new(
            "page_load_time",
            "Homepage reaches DOMContentLoaded within the configured budget",
            page_load_time,
        ),
        Scenario::new(
            "meta_tags",
            "SEO meta tags that exist carry content",
            meta_tags,
        ),
        Scenario::new(
            "image_alt_text",
            "Every image has an alt attribute",
            image_alt_text,
        ),
    ],
};

fn page_load_time<'a>(session: &'a mut Session, settings: &'a Settings) -> ScenarioFuture<'a> {
    async move {
        let mut ctx = PageContext::new(session, &settings.site.base_url, catalog::common())?;
        let start = Instant::now();
        ctx.navigate("").await?;
        let elapsed = start.elapsed().as_millis();
        tracing::info!(elapsed_ms = elapsed as u64, "homepage loaded");
        Assertion::at_most("page load time (ms)", elapsed, u128::from(settings.site.max_load_ms))
            .into_result()
    }
    .boxed()
}

fn meta_tags<'a>(session: &'a mut Session, settings: &'a Settings) -> ScenarioFuture<'a> {
    async move {
        let mut ctx = PageContext::new(session, &settings.site.base_url, catalog::common())?;
        ctx.navigate("").await?;
        for tag in META_TAGS {
            if !ctx.is_present(tag).await? {
                continue;
            }
            let content = ctx.attribute(tag, 0, "content").await?;
            Assertion::non_empty(tag, content.as_deref()).into_result()?;
        }
        Ok(())
    }
    .boxed()
}

fn image_alt_text<'a>(session: &'a mut Session, settings: &'a Settings) -> ScenarioFuture<'a> {
    async move {
        let mut ctx = PageContext::new(session, &settings.site.base_url, catalog::common())?;
        ctx.navigate("").await?;
        let count = ctx.count("images").await?;
        for nth in 0..count {
            // An empty alt marks a decorative image and is fine.
            let alt = ctx.attribute("images", nth, "alt").await?;
            Assertion::is_true(alt.is_some(), &format!("image #{nth} has no alt attribute"))
                .into_result()?;
        }
        Ok(())
    }
    .boxed()
}
