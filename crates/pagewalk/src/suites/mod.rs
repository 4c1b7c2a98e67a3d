//! Registered suites, one per category.

mod accessibility;
mod admin;
mod auth;
mod browsers;
mod dashboard;
mod errors;
mod extension;
mod forms;
mod landing;
mod performance;
mod pricing;

use crate::scenario::{Category, Suite};

static SUITES: [Suite; 11] = [
    landing::SUITE,
    auth::SUITE,
    pricing::SUITE,
    dashboard::SUITE,
    extension::SUITE,
    forms::SUITE,
    performance::SUITE,
    accessibility::SUITE,
    browsers::SUITE,
    errors::SUITE,
    admin::SUITE,
];

/// Every registered suite, in execution order
#[must_use]
pub fn registry() -> &'static [Suite] {
    &SUITES
}

/// Suite registered for `category`
#[must_use]
pub fn suite(category: Category) -> Option<&'static Suite> {
    SUITES.iter().find(|suite| suite.category == category)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_one_suite_per_category() {
        for category in Category::ALL {
            assert_eq!(
                registry().iter().filter(|s| s.category == category).count(),
                1,
                "{category}"
            );
        }
    }

    #[test]
    fn test_scenario_names_unique_within_suite() {
        for suite in registry() {
            let names: HashSet<_> = suite.scenarios.iter().map(|s| s.name).collect();
            assert_eq!(names.len(), suite.len(), "{}", suite.name);
            assert!(!suite.is_empty());
        }
    }

    #[test]
    fn test_registry_follows_category_order() {
        let order: Vec<_> = registry().iter().map(|s| s.category).collect();
        assert_eq!(order, Category::ALL.to_vec());
    }

    #[test]
    fn test_suite_lookup() {
        assert_eq!(suite(Category::Errors).unwrap().name, "error handling");
    }
}
