//! PageDriver - the primitive seam between the page objects and a browser.
//!
//! The page objects never talk to a browser directly. They ask a
//! [`PageDriver`] a small set of questions (how many elements match, is the
//! first one visible, what does it say) and issue a small set of actions
//! (fill, select, click, navigate). Every call re-resolves its locator
//! against the current document.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  PageDriver (object-safe, &self, Send + Sync)                │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌───────────────────────┐    ┌──────────────────────────┐   │
//! │  │  ChromiumDriver       │    │  SimulatedCreator        │   │
//! │  │  (feature "browser")  │    │  (in-process model)      │   │
//! │  │  CDP via chromiumoxide│    │  deterministic timing,   │   │
//! │  │  one browser context  │    │  fault injection         │   │
//! │  └───────────────────────┘    └──────────────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! All methods take `&self` so two bounded polls can observe the same page
//! concurrently during the submit race.

use async_trait::async_trait;
use std::fmt;

use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};

/// Primitive operations the verification core needs from a page
#[async_trait]
pub trait PageDriver: Send + Sync + fmt::Debug {
    /// Navigate to URL and wait for the load
    async fn goto(&self, url: &str) -> ProbeResult<()>;

    /// Reload the current page
    async fn reload(&self) -> ProbeResult<()>;

    /// Current URL
    async fn current_url(&self) -> ProbeResult<String>;

    /// Document title
    async fn title(&self) -> ProbeResult<String>;

    /// Evaluate a script in the page
    async fn evaluate(&self, script: &str) -> ProbeResult<serde_json::Value>;

    /// Clear the origin's localStorage
    async fn clear_local_storage(&self) -> ProbeResult<()>;

    /// Number of elements matching the locator
    async fn count(&self, locator: &Locator) -> ProbeResult<usize>;

    /// Whether the first match is rendered and visible
    async fn is_visible(&self, locator: &Locator) -> ProbeResult<bool>;

    /// Text content of the first match
    async fn text_content(&self, locator: &Locator) -> ProbeResult<Option<String>>;

    /// Text content of every match
    async fn all_text_contents(&self, locator: &Locator) -> ProbeResult<Vec<String>>;

    /// Current value of the first matching form control
    async fn input_value(&self, locator: &Locator) -> ProbeResult<Option<String>>;

    /// Attribute of the first match
    async fn attribute(&self, locator: &Locator, name: &str) -> ProbeResult<Option<String>>;

    /// Whether the first match carries a CSS class
    async fn has_class(&self, locator: &Locator, class: &str) -> ProbeResult<bool>;

    /// Replace the value of a text or number field
    async fn fill(&self, locator: &Locator, value: &str) -> ProbeResult<()>;

    /// Choose an option of a `<select>` by value or label
    async fn select_option(&self, locator: &Locator, value: &str) -> ProbeResult<()>;

    /// Click the first match
    async fn click(&self, locator: &Locator) -> ProbeResult<()>;

    /// Release the page
    async fn close(&self) -> ProbeResult<()>;

    /// Whether at least one element matches
    async fn is_attached(&self, locator: &Locator) -> ProbeResult<bool> {
        Ok(self.count(locator).await? > 0)
    }
}

/// Error for an action aimed at an element that is not in the document
#[must_use]
pub fn no_element(action: &str, locator: &Locator) -> ProbeError {
    ProbeError::driver(format!("{action}: no element matches {locator}"))
}

/// Collapse runs of whitespace and trim, the way rendered text is compared
#[must_use]
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
