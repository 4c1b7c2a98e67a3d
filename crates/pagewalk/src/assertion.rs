//! Assertions for scenario validation.
//!
//! [`Assertion`] holds pure value checks; the `expect_*` functions check
//! live page state. Everything ends in [`PageWalkError::AssertionFailed`],
//! which fails the scenario.

use crate::driver::PageDriver;
use crate::page_object::{PageContext, Target};
use crate::result::{PageWalkError, PageWalkResult};
use std::fmt::Debug;

/// Result of an assertion
#[derive(Debug, Clone)]
pub struct AssertionResult {
    /// Whether the assertion passed
    pub passed: bool,
    /// Human-readable message
    pub message: String,
}

impl AssertionResult {
    /// Create a passing assertion result
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            message: String::new(),
        }
    }

    /// Create a failing assertion result
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }

    /// Turn a failure into [`PageWalkError::AssertionFailed`]
    pub fn into_result(self) -> PageWalkResult<()> {
        if self.passed {
            Ok(())
        } else {
            Err(PageWalkError::assertion(self.message))
        }
    }
}

/// Value assertions
#[derive(Debug)]
pub struct Assertion;

impl Assertion {
    /// Assert two values are equal
    #[must_use]
    pub fn equals<T: PartialEq + Debug>(expected: &T, actual: &T) -> AssertionResult {
        if expected == actual {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("expected {expected:?}, got {actual:?}"))
        }
    }

    /// Assert a string contains a substring
    #[must_use]
    pub fn contains(haystack: &str, needle: &str) -> AssertionResult {
        if haystack.contains(needle) {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("expected '{haystack}' to contain '{needle}'"))
        }
    }

    /// Assert a string contains at least one of `needles`
    #[must_use]
    pub fn contains_any(haystack: &str, needles: &[&str]) -> AssertionResult {
        if needles.iter().any(|needle| haystack.contains(needle)) {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!(
                "expected '{haystack}' to contain one of {needles:?}"
            ))
        }
    }

    /// Assert a condition is true
    #[must_use]
    pub fn is_true(condition: bool, message: &str) -> AssertionResult {
        if condition {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(message)
        }
    }

    /// Assert `value` does not exceed `max`
    #[must_use]
    pub fn at_most(what: &str, value: u128, max: u128) -> AssertionResult {
        if value <= max {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("{what} too high: {value} > {max}"))
        }
    }

    /// Assert an optional string is present and non-empty
    #[must_use]
    pub fn non_empty(what: &str, value: Option<&str>) -> AssertionResult {
        match value {
            Some(v) if !v.trim().is_empty() => AssertionResult::pass(),
            Some(_) => AssertionResult::fail(format!("{what} is empty")),
            None => AssertionResult::fail(format!("{what} is missing")),
        }
    }
}

/// Wait for `target` to become visible; fail when it never does
pub async fn expect_visible<T: Target + ?Sized>(
    ctx: &PageContext<'_>,
    target: &T,
) -> PageWalkResult<()> {
    if ctx.wait_visible(target).await? {
        Ok(())
    } else {
        Err(PageWalkError::assertion(format!(
            "expected {} on {} to be visible",
            target.label(),
            ctx.catalog().page()
        )))
    }
}

/// When `target` is present, expect it to become visible. Absence passes.
pub async fn expect_visible_if_present<T: Target + ?Sized>(
    ctx: &PageContext<'_>,
    target: &T,
) -> PageWalkResult<()> {
    if ctx.is_present(target).await? {
        expect_visible(ctx, target).await
    } else {
        Ok(())
    }
}

/// Expect every present match of `target` to be visible
pub async fn expect_all_visible<T: Target + ?Sized>(
    ctx: &PageContext<'_>,
    target: &T,
) -> PageWalkResult<()> {
    let count = ctx.count(target).await?;
    for nth in 0..count {
        if !ctx.is_nth_visible(target, nth).await? {
            return Err(PageWalkError::assertion(format!(
                "expected {} #{nth} of {count} to be visible",
                target.label()
            )));
        }
    }
    Ok(())
}

/// Expect the page title to contain `needle`
pub async fn expect_title_contains(page: &dyn PageDriver, needle: &str) -> PageWalkResult<()> {
    let title = page.title().await?;
    Assertion::contains(&title, needle).into_result()
}

/// Expect the page URL to contain at least one of `needles`
pub async fn expect_url_contains_any(page: &dyn PageDriver, needles: &[&str]) -> PageWalkResult<()> {
    let url = page.url().await?;
    Assertion::contains_any(&url, needles).into_result()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod value_tests {
        use super::*;

        #[test]
        fn test_equals() {
            assert!(Assertion::equals(&1, &1).passed);
            let failed = Assertion::equals(&"a", &"b");
            assert!(!failed.passed);
            assert!(failed.message.contains("expected \"a\""));
        }

        #[test]
        fn test_contains_any() {
            let url = "https://friendfilter.com/checkout?plan=pro";
            assert!(Assertion::contains_any(url, &["signup", "checkout"]).passed);
            assert!(!Assertion::contains_any(url, &["signup", "payment"]).passed);
        }

        #[test]
        fn test_at_most() {
            assert!(Assertion::at_most("load time", 4_999, 5_000).passed);
            let failed = Assertion::at_most("load time", 5_001, 5_000);
            assert_eq!(failed.message, "load time too high: 5001 > 5000");
        }

        #[test]
        fn test_non_empty() {
            assert!(Assertion::non_empty("meta", Some("x")).passed);
            assert!(!Assertion::non_empty("meta", Some("  ")).passed);
            assert!(!Assertion::non_empty("meta", None).passed);
        }

        #[test]
        fn test_into_result() {
            assert!(AssertionResult::pass().into_result().is_ok());
            let err = AssertionResult::fail("nope").into_result().unwrap_err();
            assert!(matches!(err, PageWalkError::AssertionFailed { .. }));
        }
    }

    mod page_tests {
        use super::*;
        use crate::catalog;
        use crate::driver::SessionConfig;
        use crate::locator::Selector;
        use crate::mock::{MockBrowser, MockDocument, MockElement};
        use crate::session::Session;
        use std::time::Duration;

        const HOME: &str = "https://friendfilter.com";

        fn site() -> MockBrowser {
            MockBrowser::new().with_document(
                HOME,
                MockDocument::new("FriendFilter - Home")
                    .element(MockElement::new(Selector::css("body")))
                    .element(MockElement::new(Selector::css("h1")).hidden())
                    .element(MockElement::new(Selector::css("img")))
                    .element(MockElement::new(Selector::css("img")).hidden()),
            )
        }

        #[tokio::test]
        async fn test_page_expectations() {
            let browser = site();
            let config = SessionConfig::default().element_timeout(Duration::from_millis(30));
            let mut session = Session::open(&browser, config).await.unwrap();
            let mut ctx = PageContext::new(&mut session, HOME, catalog::common()).unwrap();
            ctx.navigate("").await.unwrap();

            expect_visible(&ctx, "body").await.unwrap();
            expect_visible_if_present(&ctx, "forms").await.unwrap();
            assert!(expect_all_visible(&ctx, "images").await.is_err());
            expect_title_contains(ctx.page(), "FriendFilter").await.unwrap();
            expect_url_contains_any(ctx.page(), &["friendfilter"]).await.unwrap();
            assert!(expect_title_contains(ctx.page(), "Acme").await.is_err());

            let heading = crate::locator::LocatorSpec::new("heading", vec![Selector::css("h1")]);
            let err = expect_visible_if_present(&ctx, &heading).await.unwrap_err();
            assert!(err.to_string().contains("heading"));

            drop(ctx);
            session.close().await.unwrap();
        }
    }
}
