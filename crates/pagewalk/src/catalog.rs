//! Locator catalogs.
//!
//! One catalog per logical page maps semantic element names to their
//! ordered selector strategies. Catalogs are pure data, built once and
//! shared for the life of the process.

use crate::locator::{LocatorSpec, Selector};
use std::sync::OnceLock;

/// Semantic name to selector strategies, for one logical page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorCatalog {
    page: &'static str,
    specs: Vec<LocatorSpec>,
}

impl LocatorCatalog {
    /// Empty catalog for `page`
    #[must_use]
    pub fn new(page: &'static str) -> Self {
        Self {
            page,
            specs: Vec::new(),
        }
    }

    /// Add or replace the spec for `name`
    #[must_use]
    pub fn with(mut self, name: &str, strategies: Vec<Selector>) -> Self {
        self.specs.retain(|s| s.name() != name);
        self.specs.push(LocatorSpec::new(name, strategies));
        self
    }

    /// Logical page this catalog describes
    #[must_use]
    pub const fn page(&self) -> &'static str {
        self.page
    }

    /// Spec registered under `name`
    #[must_use]
    pub fn spec(&self, name: &str) -> Option<&LocatorSpec> {
        self.specs.iter().find(|s| s.name() == name)
    }

    /// Strategies for `name`; empty for unknown names
    #[must_use]
    pub fn strategies(&self, name: &str) -> &[Selector] {
        self.spec(name)
            .map(LocatorSpec::strategies)
            .unwrap_or_default()
    }

    /// Registered names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(LocatorSpec::name)
    }

    /// Number of registered names
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

fn css(s: &str) -> Selector {
    Selector::css(s)
}

fn text(s: &str) -> Selector {
    Selector::text_exact(s)
}

/// Consumer site landing page
pub fn landing() -> &'static LocatorCatalog {
    static CATALOG: OnceLock<LocatorCatalog> = OnceLock::new();
    CATALOG.get_or_init(|| {
        LocatorCatalog::new("landing")
            .with("body", vec![css("body")])
            .with("main_heading", vec![css("h1")])
            .with("chrome_extension_button", vec![text("Add to Chrome")])
            .with("navigation_menu", vec![css("nav")])
            .with("cta_button", vec![text("Get Started"), text("Start Free Trial")])
            .with("features_section", vec![css(".features"), css("#features")])
            .with(
                "mobile_menu",
                vec![
                    Selector::test_id("mobile-menu"),
                    css(".hamburger"),
                    css(".menu-toggle"),
                ],
            )
            .with("nav_home", vec![text("Home")])
            .with("nav_features", vec![text("Features")])
            .with("nav_pricing", vec![text("Pricing")])
            .with("nav_about", vec![text("About")])
            .with("nav_contact", vec![text("Contact")])
    })
}

/// Navigation entries probed by the navigation menu checks, in order
pub const NAV_LINKS: [&str; 5] = [
    "nav_home",
    "nav_features",
    "nav_pricing",
    "nav_about",
    "nav_contact",
];

/// Consumer site login and signup forms
pub fn auth() -> &'static LocatorCatalog {
    static CATALOG: OnceLock<LocatorCatalog> = OnceLock::new();
    CATALOG.get_or_init(|| {
        LocatorCatalog::new("auth")
            .with(
                "email_input",
                vec![css("input[type=\"email\"]"), css("input[name=\"email\"]")],
            )
            .with(
                "password_input",
                vec![
                    css("input[type=\"password\"]"),
                    css("input[name=\"password\"]"),
                ],
            )
            .with(
                "confirm_password_input",
                vec![
                    css("input[name=\"confirm_password\"]"),
                    css("input[name=\"password_confirmation\"]"),
                ],
            )
            .with(
                "submit_button",
                vec![
                    css("button[type=\"submit\"]"),
                    css("input[type=\"submit\"]"),
                ],
            )
            .with(
                "signup_link",
                vec![
                    text("Sign Up"),
                    text("Register"),
                    text("Get Started"),
                    text("Start Free Trial"),
                    Selector::test_id("signup-button"),
                ],
            )
            .with(
                "login_link",
                vec![
                    text("Log In"),
                    text("Login"),
                    text("Sign In"),
                    Selector::test_id("login-button"),
                ],
            )
            .with("forgot_password_link", vec![text("Forgot Password")])
            .with(
                "reset_button",
                vec![text("Reset Password"), css("[type=\"submit\"]")],
            )
            .with(
                "error_message",
                vec![css(".error"), css(".alert-error"), css("[role=\"alert\"]")],
            )
    })
}

/// Consumer site pricing page
pub fn pricing() -> &'static LocatorCatalog {
    static CATALOG: OnceLock<LocatorCatalog> = OnceLock::new();
    CATALOG.get_or_init(|| {
        LocatorCatalog::new("pricing")
            .with(
                "pricing_cards",
                vec![
                    css(".pricing-card"),
                    css(".plan-card"),
                    Selector::test_id("pricing-plan"),
                ],
            )
            .with(
                "select_plan_buttons",
                vec![text("Select Plan"), text("Choose Plan"), text("Get Started")],
            )
            .with("free_plan", vec![text("Free"), css(".free-plan")])
            .with(
                "premium_plan",
                vec![text("Premium"), text("Pro"), css(".premium-plan")],
            )
            .with(
                "billing_toggle",
                vec![css(".billing-toggle"), css("input[type=\"checkbox\"]")],
            )
    })
}

/// Consumer site dashboard
pub fn dashboard() -> &'static LocatorCatalog {
    static CATALOG: OnceLock<LocatorCatalog> = OnceLock::new();
    CATALOG.get_or_init(|| {
        LocatorCatalog::new("dashboard")
            .with(
                "dashboard_container",
                vec![css(".dashboard"), Selector::test_id("dashboard")],
            )
            .with(
                "metrics_section",
                vec![Selector::test_id("metrics"), css(".metrics")],
            )
            .with(
                "connections_count",
                vec![css(".connections-count"), css(".stats")],
            )
            .with(
                "search_input",
                vec![
                    css("input[type=\"search\"]"),
                    css("input[placeholder*=\"search\" i]"),
                ],
            )
            .with(
                "whitelist_section",
                vec![
                    css(".whitelist"),
                    css(".whitelist-section"),
                    Selector::test_id("whitelist"),
                ],
            )
            .with(
                "settings_button",
                vec![text("Settings"), Selector::test_id("settings")],
            )
            .with("filter_active", vec![text("Active")])
            .with("filter_archived", vec![text("Archived")])
            .with("filter_all", vec![text("All Connections"), text("All")])
    })
}

/// Consumer site browser extension information
pub fn extension() -> &'static LocatorCatalog {
    static CATALOG: OnceLock<LocatorCatalog> = OnceLock::new();
    CATALOG.get_or_init(|| {
        LocatorCatalog::new("extension")
            .with(
                "chrome_store_link",
                vec![css("a[href*=\"chrome.google.com/webstore\"]")],
            )
            .with("download_button", vec![text("Download"), text("Install")])
            .with(
                "permissions_info",
                vec![css(".permissions"), text("Permissions")],
            )
            .with("privacy_info", vec![css(".privacy"), text("Privacy")])
            .with(
                "installation_steps",
                vec![css(".installation-steps"), css(".setup-guide")],
            )
    })
}

/// Site-wide probes used by form, SEO, accessibility and error checks
pub fn common() -> &'static LocatorCatalog {
    static CATALOG: OnceLock<LocatorCatalog> = OnceLock::new();
    CATALOG.get_or_init(|| {
        LocatorCatalog::new("common")
            .with("body", vec![css("body")])
            .with("email_field", vec![css("input[type=\"email\"]")])
            .with(
                "validation_message",
                vec![css(".error"), css(".invalid"), css("[role=\"alert\"]")],
            )
            .with(
                "required_fields",
                vec![css("input[required], textarea[required], select[required]")],
            )
            .with(
                "submit_button",
                vec![
                    css("button[type=\"submit\"]"),
                    css("input[type=\"submit\"]"),
                ],
            )
            .with(
                "focusable",
                vec![css("a, button, input, select, textarea, [tabindex]")],
            )
            .with("images", vec![css("img")])
            .with("meta_description", vec![css("meta[name=\"description\"]")])
            .with("meta_og_title", vec![css("meta[property=\"og:title\"]")])
            .with(
                "meta_og_description",
                vec![css("meta[property=\"og:description\"]")],
            )
            .with("meta_viewport", vec![css("meta[name=\"viewport\"]")])
            .with("landmark_main", vec![css("[role=\"main\"]")])
            .with("landmark_navigation", vec![css("[role=\"navigation\"]")])
            .with("landmark_banner", vec![css("[role=\"banner\"]")])
            .with("landmark_contentinfo", vec![css("[role=\"contentinfo\"]")])
            .with("header", vec![css("header"), css("[role=\"banner\"]")])
            .with("forms", vec![css("form")])
            .with("links", vec![css("a[href]")])
            .with("buttons", vec![css("button")])
    })
}

/// SEO meta tags that must carry non-empty content when present
pub const META_TAGS: [&str; 4] = [
    "meta_description",
    "meta_og_title",
    "meta_og_description",
    "meta_viewport",
];

/// ARIA landmarks that must be visible when present
pub const LANDMARKS: [&str; 4] = [
    "landmark_main",
    "landmark_navigation",
    "landmark_banner",
    "landmark_contentinfo",
];

/// Admin backend login flow
pub fn admin_login() -> &'static LocatorCatalog {
    static CATALOG: OnceLock<LocatorCatalog> = OnceLock::new();
    CATALOG.get_or_init(|| {
        LocatorCatalog::new("admin_login")
            .with("login_link", vec![Selector::role_named("link", "Log in")])
            .with(
                "email_input",
                vec![
                    Selector::role_named("textbox", "Email"),
                    css("input[type=\"email\"]"),
                ],
            )
            .with(
                "password_input",
                vec![
                    Selector::role_named("textbox", "Password"),
                    css("input[type=\"password\"]"),
                ],
            )
            .with(
                "remember_me",
                vec![Selector::role_named("checkbox", "Remember me")],
            )
            .with("login_button", vec![Selector::role_named("button", "Log in")])
            .with("accept_terms", vec![Selector::role_named("button", "Accept")])
    })
}

/// Admin backend navigation
pub fn admin_dashboard() -> &'static LocatorCatalog {
    static CATALOG: OnceLock<LocatorCatalog> = OnceLock::new();
    CATALOG.get_or_init(|| {
        LocatorCatalog::new("admin_dashboard")
            .with("backend_link", vec![Selector::text("Backend")])
            .with("users_link", vec![Selector::role_named("link", "Users")])
            .with("accounts_link", vec![Selector::role_named("link", "Accounts")])
    })
}

/// Admin backend user and account tables
pub fn user_management() -> &'static LocatorCatalog {
    static CATALOG: OnceLock<LocatorCatalog> = OnceLock::new();
    CATALOG.get_or_init(|| {
        LocatorCatalog::new("user_management")
            .with("edit_link", vec![Selector::role_named("link", "Edit")])
            .with("view_link", vec![Selector::role_named("link", "View")])
    })
}

/// Action buttons inside the table row whose accessible name contains `name`
#[must_use]
pub fn row_buttons(name: &str) -> LocatorSpec {
    LocatorSpec::new(
        format!("row_buttons[{name}]"),
        vec![Selector::role_named("row", name).within(Selector::role("button"))],
    )
}

/// Every catalog, for listing and validation
pub fn all() -> [&'static LocatorCatalog; 9] {
    [
        landing(),
        auth(),
        pricing(),
        dashboard(),
        extension(),
        common(),
        admin_login(),
        admin_dashboard(),
        user_management(),
    ]
}
