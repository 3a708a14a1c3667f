//! Locator abstraction for element selection.
//!
//! A [`Locator`] is pure data: a [`Selector`] plus auto-wait options and a
//! human-readable description used in failure messages. Nothing is resolved
//! until a [`PageDriver`](crate::PageDriver) is asked about it, and every ask
//! re-resolves against the live document.
//!
//! Selectors compile to a JavaScript expression yielding an array of
//! elements, which keeps `:has`-style containment and text filtering working
//! on engines without native support and lets selectors nest (`nth`, `last`,
//! scoped lookups inside a matched element).

use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Default timeout for auto-waiting (5 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Default polling interval for auto-waiting (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// CSS selector (e.g., "#generate-btn")
    Css(String),
    /// CSS selector filtered by contained text
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text content to match
        text: String,
    },
    /// CSS selector filtered to elements containing a descendant
    CssHas {
        /// Base CSS selector
        css: String,
        /// Descendant CSS selector
        descendant: String,
    },
    /// The `index`-th match of another selector
    Nth {
        /// Selector to index into
        base: Box<Selector>,
        /// Zero-based index
        index: usize,
    },
    /// The last match of another selector
    Last(Box<Selector>),
    /// Matches of `inner` inside the first match of `scope`
    Scoped {
        /// Scope element
        scope: Box<Selector>,
        /// Selector evaluated relative to the scope
        inner: Box<Selector>,
    },
}

/// Quote a string as a JavaScript literal
fn js_str(s: &str) -> String {
    Value::from(s).to_string()
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a CSS selector filtered by text
    #[must_use]
    pub fn css_with_text(css: impl Into<String>, text: impl Into<String>) -> Self {
        Self::CssWithText {
            css: css.into(),
            text: text.into(),
        }
    }

    /// Create a CSS selector filtered by descendant containment
    #[must_use]
    pub fn css_has(css: impl Into<String>, descendant: impl Into<String>) -> Self {
        Self::CssHas {
            css: css.into(),
            descendant: descendant.into(),
        }
    }

    /// Innermost selector that is not an `Nth`/`Last` wrapper
    #[must_use]
    pub fn unindexed(&self) -> &Self {
        match self {
            Self::Nth { base, .. } | Self::Last(base) => base.unindexed(),
            other => other,
        }
    }

    /// JavaScript expression evaluating to an array of matched elements
    /// below `root` (a JS expression for a node, e.g. `document`)
    #[must_use]
    pub fn to_all_query(&self, root: &str) -> String {
        match self {
            Self::Css(s) => format!("Array.from({root}.querySelectorAll({}))", js_str(s)),
            Self::CssWithText { css, text } => format!(
                "Array.from({root}.querySelectorAll({})).filter(el => (el.textContent || '').includes({}))",
                js_str(css),
                js_str(text)
            ),
            Self::CssHas { css, descendant } => format!(
                "Array.from({root}.querySelectorAll({})).filter(el => el.querySelector({}) !== null)",
                js_str(css),
                js_str(descendant)
            ),
            Self::Nth { base, index } => {
                format!("({}).slice({index}, {})", base.to_all_query(root), index + 1)
            }
            Self::Last(base) => format!("({}).slice(-1)", base.to_all_query(root)),
            Self::Scoped { scope, inner } => format!(
                "({}).slice(0, 1).flatMap(scope => {})",
                scope.to_all_query(root),
                inner.to_all_query("scope")
            ),
        }
    }

    /// JavaScript expression for the first match (or `null`)
    #[must_use]
    pub fn to_query(&self) -> String {
        format!("(({})[0] ?? null)", self.to_all_query("document"))
    }

    /// JavaScript expression counting matches
    #[must_use]
    pub fn to_count_query(&self) -> String {
        format!("({}).length", self.to_all_query("document"))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => f.write_str(s),
            Self::CssWithText { css, text } => write!(f, "{css}:has-text({text:?})"),
            Self::CssHas { css, descendant } => write!(f, "{css}:has({descendant})"),
            Self::Nth { base, index } => write!(f, "{base} >> nth={index}"),
            Self::Last(base) => write!(f, "{base} >> last"),
            Self::Scoped { scope, inner } => write!(f, "{scope} {inner}"),
        }
    }
}

/// Locator options for customizing auto-wait behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorOptions {
    /// Timeout for auto-waiting
    pub timeout: Duration,
    /// Polling interval for auto-waiting
    pub poll_interval: Duration,
}

impl Default for LocatorOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

/// A locator for finding and interacting with elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    selector: Selector,
    options: LocatorOptions,
    description: Option<String>,
}

impl Locator {
    /// Create a new locator with a CSS selector
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::Css(selector.into()))
    }

    /// Create a locator from a selector
    #[must_use]
    pub fn from_selector(selector: Selector) -> Self {
        Self {
            selector,
            options: LocatorOptions::default(),
            description: None,
        }
    }

    /// Filter by text content
    ///
    /// Only CSS selectors can be combined with a text filter; any other
    /// selector is scoped instead so the filter is never silently lost.
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        let text = text.into();
        let selector = match self.selector {
            Selector::Css(css) => Selector::CssWithText { css, text },
            other => Selector::Scoped {
                scope: Box::new(other),
                inner: Box::new(Selector::CssWithText {
                    css: "*".to_string(),
                    text,
                }),
            },
        };
        Self { selector, ..self }
    }

    /// The `index`-th match (zero-based)
    #[must_use]
    pub fn nth(self, index: usize) -> Self {
        Self {
            selector: Selector::Nth {
                base: Box::new(self.selector),
                index,
            },
            ..self
        }
    }

    /// The first match
    #[must_use]
    pub fn first(self) -> Self {
        self.nth(0)
    }

    /// The last match
    #[must_use]
    pub fn last(self) -> Self {
        Self {
            selector: Selector::Last(Box::new(self.selector)),
            ..self
        }
    }

    /// Matches of `inner` inside the first element this locator matches
    #[must_use]
    pub fn within(&self, inner: Selector) -> Self {
        Self {
            selector: Selector::Scoped {
                scope: Box::new(self.selector.clone()),
                inner: Box::new(inner),
            },
            options: self.options.clone(),
            description: None,
        }
    }

    /// Set a custom timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    /// Attach a human-readable name used in failure messages
    #[must_use]
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Get the options
    #[must_use]
    pub const fn options(&self) -> &LocatorOptions {
        &self.options
    }

    /// Description if set, otherwise the selector itself
    #[must_use]
    pub fn description(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| self.selector.to_string())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod selector_tests {
        use super::*;

        #[test]
        fn test_css_selector() {
            let query = Selector::css("#generate-btn").to_query();
            assert!(query.contains("querySelectorAll"));
            assert!(query.contains("#generate-btn"));
            assert!(query.contains("[0]"));
        }

        #[test]
        fn test_text_selector_escapes_quotes() {
            let selector = Selector::css_with_text("h2", r#"say "hi""#);
            let query = selector.to_count_query();
            assert!(query.contains(r#""say \"hi\"""#));
            assert!(query.contains("textContent"));
            assert!(query.ends_with(".length"));
        }

        #[test]
        fn test_has_selector() {
            let selector = Selector::css_has(".class-option", r#"img[alt="Łotrzyk"]"#);
            let query = selector.to_count_query();
            assert!(query.contains("el.querySelector("));
            assert!(query.contains("Łotrzyk"));
        }

        #[test]
        fn test_nth_and_last() {
            let nth = Selector::Nth {
                base: Box::new(Selector::css("li")),
                index: 2,
            };
            assert!(nth.to_count_query().contains(".slice(2, 3)"));
            let last = Selector::Last(Box::new(Selector::css("li")));
            assert!(last.to_count_query().contains(".slice(-1)"));
        }

        #[test]
        fn test_scoped_query_uses_scope_root() {
            let selector = Selector::Scoped {
                scope: Box::new(Selector::css("#character-cards > div")),
                inner: Box::new(Selector::css("h4")),
            };
            let query = selector.to_all_query("document");
            assert!(query.contains("flatMap(scope =>"));
            assert!(query.contains("scope.querySelectorAll(\"h4\")"));
        }

        #[test]
        fn test_unindexed() {
            let base = Selector::css("#character-cards > div");
            let wrapped = Selector::Last(Box::new(Selector::Nth {
                base: Box::new(base.clone()),
                index: 1,
            }));
            assert_eq!(wrapped.unindexed(), &base);
        }

        #[test]
        fn test_display() {
            assert_eq!(Selector::css("#name").to_string(), "#name");
            assert_eq!(
                Selector::css_has(".class-option", "img").to_string(),
                ".class-option:has(img)"
            );
        }
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_locator_new() {
            let locator = Locator::new("#name");
            assert!(matches!(locator.selector(), Selector::Css(_)));
            assert_eq!(locator.description(), "#name");
        }

        #[test]
        fn test_locator_with_text() {
            let locator = Locator::new("h2").with_text("Twoje postacie");
            assert!(matches!(locator.selector(), Selector::CssWithText { .. }));
        }

        #[test]
        fn test_with_text_on_indexed_locator_scopes() {
            let locator = Locator::new("li").first().with_text("Siła");
            assert!(matches!(locator.selector(), Selector::Scoped { .. }));
        }

        #[test]
        fn test_locator_indexing() {
            let locator = Locator::new("li").nth(3);
            assert!(matches!(locator.selector(), Selector::Nth { index: 3, .. }));
            let last = Locator::new("li").last();
            assert!(matches!(last.selector(), Selector::Last(_)));
        }

        #[test]
        fn test_within_drops_description() {
            let card = Locator::new("#character-cards > div").described("card");
            let name = card.within(Selector::css("h4"));
            assert_eq!(name.description(), "#character-cards > div h4");
        }

        #[test]
        fn test_locator_timeout() {
            let locator = Locator::new("button").with_timeout(Duration::from_secs(10));
            assert_eq!(locator.options().timeout, Duration::from_secs(10));
        }

        #[test]
        fn test_locator_options_default() {
            let opts = LocatorOptions::default();
            assert_eq!(opts.timeout, Duration::from_millis(5000));
            assert_eq!(opts.poll_interval, Duration::from_millis(50));
        }
    }
}
