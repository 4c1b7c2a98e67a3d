use crate::assertion::{expect_visible, Assertion};
use crate::config::Settings;
use crate::page_object::PageObject;
use crate::pages::ExtensionPage;
use crate::scenario::{Category, Scenario, ScenarioFuture, Suite};
use crate::session::Session;
use futures::FutureExt;

pub(crate) const SUITE: Suite = Suite {
    name: "extension features",
    category: Category::Extension,
    scenarios: &[
        Scenario::new(
            "extension_download_links",
            "Chrome Web Store link is visible and points at the store",
            extension_download_links,
        ),
        Scenario::new(
            "extension_permissions_info",
            "Permissions or privacy information is visible when shown",
            extension_permissions_info,
        ),
    ],
};

fn extension_download_links<'a>(session: &'a mut Session, settings: &'a Settings) -> ScenarioFuture<'a> {
    async move {
        let mut extension = ExtensionPage::new(session, settings)?;
        extension.load().await?;
        if !extension.chrome_store_link_present().await? {
            return Ok(());
        }
        expect_visible(extension.context(), "chrome_store_link").await?;
        let href = extension.chrome_store_url().await?;
        Assertion::contains(&href, "chrome.google.com/webstore").into_result()
    }
    .boxed()
}

fn extension_permissions_info<'a>(session: &'a mut Session, settings: &'a Settings) -> ScenarioFuture<'a> {
    async move {
        let mut extension = ExtensionPage::new(session, settings)?;
        extension.load().await?;
        let shown =
            extension.permissions_displayed().await? || extension.privacy_info_displayed().await?;
        if !shown {
            return Ok(());
        }
        Assertion::is_true(
            extension.permissions_or_privacy_visible().await?,
            "permissions and privacy information are present but hidden",
        )
        .into_result()
    }
    .boxed()
}
