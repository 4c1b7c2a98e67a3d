//! Selector strategies and locator specs.
//!
//! A [`Selector`] is one rule for finding DOM elements. A [`LocatorSpec`]
//! groups equivalent selectors for one semantic element; the first strategy
//! that matches at least one element wins.
//!
//! Selectors compile to JavaScript expressions that evaluate to an array of
//! elements, so the CDP backend can count, inspect and act on the n-th match
//! without a selector engine of its own.

use std::fmt;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// CSS selector (e.g., "button.primary")
    Css(String),
    /// Visible text selector
    Text {
        /// Text to match
        text: String,
        /// Require the whole trimmed text to equal `text`
        exact: bool,
    },
    /// ARIA role with optional accessible name
    Role {
        /// Role name (link, button, textbox, checkbox, row, ...)
        role: String,
        /// Accessible name to match
        name: Option<String>,
        /// Require the whole accessible name to equal `name`
        exact: bool,
    },
    /// Test ID selector (data-testid attribute)
    TestId(String),
    /// Elements matching `inner` inside elements matching `scope`
    Within {
        /// Outer selector
        scope: Box<Selector>,
        /// Inner selector, resolved relative to each scope match
        inner: Box<Selector>,
    },
}

/// Tags whose text is never rendered, as a JS array body
const TEXT_SKIPPED_TAGS: &str =
    "'HEAD', 'TITLE', 'SCRIPT', 'STYLE', 'NOSCRIPT', 'TEMPLATE', 'META', 'LINK'";

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a substring, case-insensitive text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            exact: false,
        }
    }

    /// Create an exact text selector
    #[must_use]
    pub fn text_exact(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            exact: true,
        }
    }

    /// Create a role selector without a name filter
    #[must_use]
    pub fn role(role: impl Into<String>) -> Self {
        Self::Role {
            role: role.into(),
            name: None,
            exact: false,
        }
    }

    /// Create a role selector filtered by accessible name (substring match)
    #[must_use]
    pub fn role_named(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Role {
            role: role.into(),
            name: Some(name.into()),
            exact: false,
        }
    }

    /// Create a test ID selector
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    /// Scope `inner` to descendants of this selector's matches
    #[must_use]
    pub fn within(self, inner: Selector) -> Self {
        Self::Within {
            scope: Box::new(self),
            inner: Box::new(inner),
        }
    }

    /// JavaScript expression evaluating to the array of matches under `root`.
    ///
    /// Text strategies never match non-rendered nodes such as `<script>`.
    ///
    /// `root` must be a JS expression for a `Document` or `Element`.
    #[must_use]
    pub fn collect_js(&self, root: &str) -> String {
        match self {
            Self::Css(css) => format!("Array.from(({root}).querySelectorAll({css:?}))"),
            Self::TestId(id) => {
                let css = format!("[data-testid=\"{id}\"]");
                format!("Array.from(({root}).querySelectorAll({css:?}))")
            }
            Self::Text { text, exact } => format!(
                "((root, want, exact) => {{ \
                   const skip = new Set([{TEXT_SKIPPED_TAGS}]); \
                   const m = el => {{ if (skip.has(el.tagName)) return false; \
                     const t = (el.innerText ?? el.textContent ?? '').trim(); \
                     return exact ? t === want : t.toLowerCase().includes(want.toLowerCase()); }}; \
                   return Array.from(root.querySelectorAll('*')) \
                     .filter(el => m(el) && !Array.from(el.children).some(m)); \
                 }})(({root}), {text:?}, {exact})"
            ),
            Self::Role { role, name, exact } => {
                let implicit = implicit_role_css(role);
                let name_js = name
                    .as_deref()
                    .map_or_else(|| "null".to_string(), |n| format!("{n:?}"));
                format!(
                    "((root, want, exact) => {{ \
                       const accName = el => {{ \
                         const label = el.getAttribute('aria-label'); \
                         if (label) return label.trim(); \
                         const byId = (el.getAttribute('aria-labelledby') || '').split(/\\s+/) \
                           .map(id => document.getElementById(id)).filter(Boolean) \
                           .map(n => n.textContent.trim()).join(' '); \
                         if (byId) return byId; \
                         const labels = el.labels ? Array.from(el.labels).map(l => l.textContent.trim()).join(' ') : ''; \
                         const own = (el.innerText ?? el.textContent ?? '').trim(); \
                         return [labels, el.getAttribute('placeholder') || '', own, el.value && el.type === 'submit' ? el.value : ''] \
                           .filter(Boolean).join(' ').replace(/\\s+/g, ' ').trim(); \
                       }}; \
                       return Array.from(root.querySelectorAll({implicit:?})).filter(el => {{ \
                         if (want === null) return true; \
                         const n = accName(el); \
                         return exact ? n === want : n.toLowerCase().includes(want.toLowerCase()); \
                       }}); \
                     }})(({root}), {name_js}, {exact})"
                )
            }
            Self::Within { scope, inner } => {
                let scopes = scope.collect_js(root);
                let inner_js = inner.collect_js("s");
                format!(
                    "(() => {{ const out = []; \
                       for (const s of {scopes}) {{ for (const e of {inner_js}) {{ if (!out.includes(e)) out.push(e); }} }} \
                       return out; }})()"
                )
            }
        }
    }

    /// JavaScript expression evaluating to the number of matches
    #[must_use]
    pub fn count_js(&self) -> String {
        format!("({}).length", self.collect_js("document"))
    }

    /// JavaScript expression applying `body` (a JS function of one element)
    /// to the `nth` match; evaluates to `null` when there is no such match.
    #[must_use]
    pub fn nth_js(&self, nth: usize, body: &str) -> String {
        format!(
            "(() => {{ const el = ({})[{nth}]; if (!el) return null; return ({body})(el); }})()",
            self.collect_js("document")
        )
    }
}

/// CSS matching elements that carry `role` explicitly or implicitly.
fn implicit_role_css(role: &str) -> String {
    let implicit = match role {
        "link" => "a[href], area[href]",
        "button" => "button, input[type=button], input[type=submit], input[type=reset]",
        "textbox" => {
            "input:not([type]), input[type=text], input[type=email], input[type=password], \
             input[type=search], input[type=tel], input[type=url], textarea"
        }
        "checkbox" => "input[type=checkbox]",
        "radio" => "input[type=radio]",
        "row" => "tr",
        "cell" => "td",
        "heading" => "h1, h2, h3, h4, h5, h6",
        "navigation" => "nav",
        "main" => "main",
        "banner" => "header",
        "contentinfo" => "footer",
        "form" => "form",
        "img" => "img",
        _ => "",
    };
    if implicit.is_empty() {
        format!("[role={role:?}]")
    } else {
        format!("{implicit}, [role={role:?}]")
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(css) => write!(f, "css={css}"),
            Self::Text { text, exact: true } => write!(f, "text={text:?}"),
            Self::Text { text, exact: false } => write!(f, "text={text}"),
            Self::Role {
                role,
                name: Some(name),
                ..
            } => write!(f, "role={role}[name={name:?}]"),
            Self::Role { role, name: None, .. } => write!(f, "role={role}"),
            Self::TestId(id) => write!(f, "data-testid={id}"),
            Self::Within { scope, inner } => write!(f, "{scope} >> {inner}"),
        }
    }
}

/// Ordered, equivalent selector strategies for one semantic element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorSpec {
    name: String,
    strategies: Vec<Selector>,
}

impl LocatorSpec {
    /// Create a locator spec from its strategies, in priority order
    #[must_use]
    pub fn new(name: impl Into<String>, strategies: Vec<Selector>) -> Self {
        Self {
            name: name.into(),
            strategies,
        }
    }

    /// Semantic name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Strategies in priority order
    #[must_use]
    pub fn strategies(&self) -> &[Selector] {
        &self.strategies
    }
}

/// A spec resolved against the live page: the winning strategy and its
/// match count (always at least one).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    /// Strategy that matched
    pub selector: Selector,
    /// Number of matching elements
    pub count: usize,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod selector_tests {
        use super::*;

        #[test]
        fn test_css_collect() {
            let js = Selector::css("nav a").collect_js("document");
            assert_eq!(js, "Array.from((document).querySelectorAll(\"nav a\"))");
        }

        #[test]
        fn test_test_id_collect() {
            let js = Selector::test_id("pricing-plan").collect_js("document");
            assert!(js.contains("data-testid"));
            assert!(js.contains("pricing-plan"));
        }

        #[test]
        fn test_text_skips_non_rendered_tags() {
            let js = Selector::text("Add to Chrome").collect_js("document");
            assert!(js.contains("skip.has(el.tagName)"));
            for tag in ["'TITLE'", "'SCRIPT'", "'STYLE'", "'NOSCRIPT'"] {
                assert!(js.contains(tag), "{tag} not skipped");
            }
        }

        #[test]
        fn test_role_uses_implicit_tags() {
            let js = Selector::role_named("link", "Log in").count_js();
            assert!(js.contains("a[href]"));
            assert!(js.contains("[role=\\\"link\\\"]"));
            assert!(js.contains("\"Log in\""));
            assert!(js.ends_with(".length"));
        }

        #[test]
        fn test_unknown_role_falls_back_to_attribute() {
            assert_eq!(implicit_role_css("alert"), "[role=\"alert\"]");
        }

        #[test]
        fn test_within_scopes_inner() {
            let sel = Selector::role_named("row", "Joy Kumar").within(Selector::role("button"));
            let js = sel.collect_js("document");
            assert!(js.contains("for (const s of"));
            assert!(js.contains("(s)"));
        }

        #[test]
        fn test_nth_js_wraps_body() {
            let js = Selector::css("h1").nth_js(2, "el => el.textContent");
            assert!(js.contains("[2]"));
            assert!(js.contains("return null"));
        }

        #[test]
        fn test_display() {
            assert_eq!(Selector::css("nav").to_string(), "css=nav");
            assert_eq!(
                Selector::text_exact("Add to Chrome").to_string(),
                "text=\"Add to Chrome\""
            );
            assert_eq!(
                Selector::role_named("button", "Accept").to_string(),
                "role=button[name=\"Accept\"]"
            );
            assert_eq!(
                Selector::css("tr")
                    .within(Selector::role("button"))
                    .to_string(),
                "css=tr >> role=button"
            );
        }
    }

    mod locator_spec_tests {
        use super::*;

        #[test]
        fn test_strategies_keep_order() {
            let spec = LocatorSpec::new(
                "email",
                vec![
                    Selector::css("input[type=\"email\"]"),
                    Selector::css("input[name=\"email\"]"),
                ],
            );
            assert_eq!(spec.name(), "email");
            assert_eq!(spec.strategies()[0], Selector::css("input[type=\"email\"]"));
            assert_eq!(spec.strategies().len(), 2);
        }
    }

    proptest! {
        #[test]
        fn prop_text_selector_escapes_quotes(text in "[ -~]{0,40}") {
            let js = Selector::text(text.clone()).collect_js("document");
            // Debug formatting yields a valid, fully escaped JS string literal
            let literal = format!("{text:?}");
            prop_assert!(js.contains(&literal));
        }

        #[test]
        fn prop_count_js_is_length_of_collect(css in "[a-z]{1,10}") {
            let sel = Selector::css(css);
            prop_assert_eq!(sel.count_js(), format!("({}).length", sel.collect_js("document")));
        }
    }
}
