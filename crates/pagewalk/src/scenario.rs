//! Scenarios, suites and category selection.
//!
//! Scenarios are registered in an explicit static table (see
//! [`crate::suites::registry`]); nothing is discovered at runtime.

use crate::config::Settings;
use crate::driver::Viewport;
use crate::result::{PageWalkError, PageWalkResult};
use crate::session::Session;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

/// Future returned by a scenario body
pub type ScenarioFuture<'a> = BoxFuture<'a, PageWalkResult<()>>;

/// Scenario body: drives page objects over an exclusive session
pub type ScenarioBody = for<'a> fn(&'a mut Session, &'a Settings) -> ScenarioFuture<'a>;

/// Suite category, as selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Landing page
    Landing,
    /// Signup, login and password reset
    Auth,
    /// Pricing plans
    Pricing,
    /// Signed-in dashboard
    Dashboard,
    /// Browser extension links and information
    Extension,
    /// Form validation
    Forms,
    /// Load time and SEO
    Performance,
    /// Keyboard and ARIA checks
    Accessibility,
    /// Viewport compatibility
    Browsers,
    /// 404 and failed requests
    Errors,
    /// Admin backend
    Admin,
}

impl Category {
    /// Every category, in registry order
    pub const ALL: [Self; 11] = [
        Self::Landing,
        Self::Auth,
        Self::Pricing,
        Self::Dashboard,
        Self::Extension,
        Self::Forms,
        Self::Performance,
        Self::Accessibility,
        Self::Browsers,
        Self::Errors,
        Self::Admin,
    ];

    /// Command-line name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Landing => "landing",
            Self::Auth => "auth",
            Self::Pricing => "pricing",
            Self::Dashboard => "dashboard",
            Self::Extension => "extension",
            Self::Forms => "forms",
            Self::Performance => "performance",
            Self::Accessibility => "accessibility",
            Self::Browsers => "browsers",
            Self::Errors => "errors",
            Self::Admin => "admin",
        }
    }

    /// Whether `all` includes this category. The admin backend needs
    /// credentials and is only run when asked for.
    #[must_use]
    pub const fn in_all(self) -> bool {
        !matches!(self, Self::Admin)
    }

    /// Look up a category by command-line name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Names accepted by [`Selection::parse`], `all` last
    #[must_use]
    pub fn valid_names() -> Vec<String> {
        Self::ALL
            .iter()
            .map(|c| c.name().to_string())
            .chain(std::iter::once(Selection::ALL_NAME.to_string()))
            .collect()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One setup, act, assert, teardown unit
#[derive(Clone, Copy)]
pub struct Scenario {
    /// Unique name within its suite
    pub name: &'static str,
    /// One-line description
    pub description: &'static str,
    /// Viewport override; `None` keeps the configured one
    pub viewport: Option<Viewport>,
    /// Body
    pub body: ScenarioBody,
}

impl Scenario {
    /// Scenario with the configured viewport
    #[must_use]
    pub const fn new(name: &'static str, description: &'static str, body: ScenarioBody) -> Self {
        Self {
            name,
            description,
            viewport: None,
            body,
        }
    }

    /// Run at a fixed viewport
    #[must_use]
    pub const fn at_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = Some(viewport);
        self
    }
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}

/// Scenarios of one category
#[derive(Debug, Clone, Copy)]
pub struct Suite {
    /// Suite name
    pub name: &'static str,
    /// Category the suite is selected by
    pub category: Category,
    /// Scenarios, in execution order
    pub scenarios: &'static [Scenario],
}

impl Suite {
    /// Number of scenarios
    #[must_use]
    pub const fn len(&self) -> usize {
        self.scenarios.len()
    }

    /// Whether the suite has no scenarios
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

/// What a run covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Every category included in `all`
    All,
    /// One category
    Category(Category),
}

impl Selection {
    /// Name selecting every category
    pub const ALL_NAME: &'static str = "all";

    /// Parse a command-line category name.
    ///
    /// Unknown names are a usage error listing the valid names.
    pub fn parse(name: &str) -> PageWalkResult<Self> {
        let name = name.trim().to_ascii_lowercase();
        if name == Self::ALL_NAME {
            return Ok(Self::All);
        }
        Category::from_name(&name)
            .map(Self::Category)
            .ok_or_else(|| PageWalkError::UnknownCategory {
                name,
                valid: Category::valid_names(),
            })
    }

    /// Whether `category` is part of this selection
    #[must_use]
    pub const fn includes(self, category: Category) -> bool {
        match self {
            Self::All => category.in_all(),
            Self::Category(selected) => selected as u8 == category as u8,
        }
    }

    /// Suites of `registry` in this selection, in registry order
    #[must_use]
    pub fn suites<'r>(self, registry: &'r [Suite]) -> Vec<&'r Suite> {
        registry
            .iter()
            .filter(|suite| self.includes(suite.category))
            .collect()
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "{}", Self::ALL_NAME),
            Self::Category(category) => write!(f, "{category}"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use futures::FutureExt;

    fn noop<'a>(_session: &'a mut Session, _settings: &'a Settings) -> ScenarioFuture<'a> {
        async { Ok(()) }.boxed()
    }

    const LANDING: &[Scenario] = &[Scenario::new("a", "first", noop), Scenario::new("b", "second", noop)];
    const ADMIN: &[Scenario] = &[Scenario::new("c", "admin", noop)];

    fn registry() -> Vec<Suite> {
        vec![
            Suite {
                name: "landing page",
                category: Category::Landing,
                scenarios: LANDING,
            },
            Suite {
                name: "admin backend",
                category: Category::Admin,
                scenarios: ADMIN,
            },
        ]
    }

    mod category_tests {
        use super::*;

        #[test]
        fn test_names_round_trip() {
            for category in Category::ALL {
                assert_eq!(Category::from_name(category.name()), Some(category));
            }
        }

        #[test]
        fn test_valid_names_end_with_all() {
            let names = Category::valid_names();
            assert_eq!(names.len(), 12);
            assert_eq!(names.last().map(String::as_str), Some("all"));
        }

        #[test]
        fn test_serde_lowercase() {
            let json = serde_json::to_string(&Category::Accessibility).unwrap();
            assert_eq!(json, "\"accessibility\"");
        }
    }

    mod selection_tests {
        use super::*;

        #[test]
        fn test_parse_known() {
            assert_eq!(Selection::parse("all").unwrap(), Selection::All);
            assert_eq!(
                Selection::parse(" Landing ").unwrap(),
                Selection::Category(Category::Landing)
            );
        }

        #[test]
        fn test_parse_unknown_lists_valid() {
            match Selection::parse("bogus").unwrap_err() {
                PageWalkError::UnknownCategory { name, valid } => {
                    assert_eq!(name, "bogus");
                    assert!(valid.contains(&"landing".to_string()));
                    assert!(valid.contains(&"all".to_string()));
                }
                other => panic!("unexpected error {other:?}"),
            }
        }

        #[test]
        fn test_category_selects_only_its_suite() {
            let registry = registry();
            let suites = Selection::Category(Category::Landing).suites(&registry);
            assert_eq!(suites.len(), 1);
            assert_eq!(suites[0].category, Category::Landing);
        }

        #[test]
        fn test_all_skips_admin() {
            let registry = registry();
            let suites = Selection::All.suites(&registry);
            assert!(suites.iter().all(|s| s.category != Category::Admin));
            assert_eq!(Selection::Category(Category::Admin).suites(&registry).len(), 1);
        }

        #[test]
        fn test_scenario_builder() {
            let scenario = Scenario::new("mobile", "", noop).at_viewport(Viewport::MOBILE);
            assert_eq!(scenario.viewport, Some(Viewport::MOBILE));
            assert_eq!(LANDING.len(), 2);
        }
    }
}
