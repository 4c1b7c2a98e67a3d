use crate::assertion::expect_visible;
use crate::config::Settings;
use crate::page_object::PageObject;
use crate::pages::{ConnectionFilter, DashboardPage};
use crate::result::PageWalkError;
use crate::scenario::{Category, Scenario, ScenarioFuture, Suite};
use crate::session::Session;
use futures::FutureExt;

pub(crate) const SUITE: Suite = Suite {
    name: "dashboard",
    category: Category::Dashboard,
    scenarios: &[
        Scenario::new(
            "dashboard_elements",
            "Dashboard sections that exist are visible",
            dashboard_elements,
        ),
        Scenario::new(
            "connection_filtering",
            "Each connection filter can be applied",
            connection_filtering,
        ),
        Scenario::new(
            "search_functionality",
            "Search box accepts a query and submits it",
            search_functionality,
        ),
    ],
};

fn dashboard_elements<'a>(session: &'a mut Session, settings: &'a Settings) -> ScenarioFuture<'a> {
    async move {
        let mut dashboard = DashboardPage::new(session, settings)?;
        dashboard.load().await?;
        let hidden: Vec<_> = dashboard
            .section_visibility()
            .await?
            .into_iter()
            .filter_map(|(name, visible)| (!visible).then_some(name))
            .collect();
        if hidden.is_empty() {
            Ok(())
        } else {
            Err(PageWalkError::assertion(format!(
                "dashboard sections present but hidden: {}",
                hidden.join(", ")
            )))
        }
    }
    .boxed()
}

fn connection_filtering<'a>(session: &'a mut Session, settings: &'a Settings) -> ScenarioFuture<'a> {
    async move {
        let mut dashboard = DashboardPage::new(session, settings)?;
        dashboard.load().await?;
        for filter in ConnectionFilter::ALL {
            if dashboard.filter_connections(filter).await? {
                tracing::debug!(%filter, "connection filter applied");
            }
        }
        Ok(())
    }
    .boxed()
}

fn search_functionality<'a>(session: &'a mut Session, settings: &'a Settings) -> ScenarioFuture<'a> {
    async move {
        let mut dashboard = DashboardPage::new(session, settings)?;
        dashboard.load().await?;
        if !dashboard.context().is_present("search_input").await? {
            return Ok(());
        }
        expect_visible(dashboard.context(), "search_input").await?;
        dashboard.search_connections("test search").await?;
        Ok(())
    }
    .boxed()
}
