//! party-probe: page objects and synchronization for the party character creator
//!
//! Verifies an external single-page application where players name a
//! character, pick a race and a class, spend attribute points and add the
//! character to a roster. The page is driven through a [`PageDriver`]
//! (Chromium over CDP, or the in-process [`SimulatedCreator`]) and every
//! mutation is followed by a bounded wait for its expected resulting state.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   PARTY-PROBE Architecture                      │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   catalog / steps ──► CharacterCreatorPage                      │
//! │                         ├── CharacterForm ──► SubmitProtocol    │
//! │                         ├── Roster                              │
//! │                         └── TextChecks                          │
//! │                                │                                │
//! │              LocatorRegistry + Waiter + expect()                │
//! │                                │                                │
//! │                   PageDriver (Chromium | simulator)             │
//! │                                                                 │
//! │   Budget: pure point arithmetic, consulted offline by fixtures  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use party_probe::{fixtures, steps, CharacterCreatorPage, HarnessConfig, ScenarioTracker, SimulatedCreator};
//! use std::sync::Arc;
//!
//! # async fn demo() -> party_probe::ProbeResult<()> {
//! let page = CharacterCreatorPage::new(Arc::new(SimulatedCreator::new()), HarnessConfig::default());
//! page.open_fresh().await?;
//! let mut tracker = ScenarioTracker::new("demo");
//! steps::add_character_to_list(&page, &mut tracker, &fixtures::legolas()).await?;
//! assert_eq!(page.roster().count().await?, 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

#[cfg(feature = "browser")]
mod browser;
pub mod budget;
pub mod catalog;
mod config;
mod context;
mod draft;
mod driver;
mod expect;
pub mod fixtures;
mod form;
mod harness;
mod locator;
mod page;
mod page_object;
mod registry;
mod result;
mod roster;
mod scenario;
pub mod simulator;
pub mod steps;
mod sync;
mod texts;
pub mod wait;

#[cfg(feature = "browser")]
pub use browser::{Browser, ChromiumDriver};
pub use budget::{Budget, ValidAllocations};
pub use catalog::Scenario;
pub use config::{
    BrowserSettings, HarnessConfig, Timeouts, DEFAULT_BASE_URL, ENV_CHROMIUM, ENV_HEADLESS,
    ENV_TIMEOUT_MS, ENV_URL,
};
pub use context::PageContext;
pub use draft::{CharacterClass, CharacterDraft, Race, Stat, Stats};
pub use driver::{normalize_text, PageDriver};
pub use expect::{expect, Expect, ExpectAssertion, Observed};
pub use form::{parse_points, CharacterForm};
pub use harness::{
    FailureKind, ScenarioResult, SessionFactory, SimulatedSessions, SuiteResults, TestHarness,
};
pub use locator::{Locator, LocatorOptions, Selector};
pub use page::CharacterCreatorPage;
pub use page_object::PageObject;
pub use registry::{CardField, LocatorRegistry, UiElement};
pub use result::{ProbeError, ProbeResult};
pub use roster::{RenderedCard, Roster};
pub use scenario::{ScenarioState, ScenarioTracker};
pub use simulator::{Faults, PopupMode, SimulatedCreator, SimulatorOptions};
pub use sync::{PopupClassifier, PopupKind, SubmitOutcome, SubmitProtocol, SubmitReport};
pub use texts::{TextChecks, UiCopy};
pub use wait::{ExpectedState, FirstOf, WaitOptions, WaitResult, Waiter};

/// Prelude for scenario code
pub mod prelude {
    pub use super::{
        expect, fixtures, steps, CharacterClass, CharacterCreatorPage, CharacterDraft,
        HarnessConfig, PageDriver, ProbeError, ProbeResult, Race, ScenarioTracker, Stat, Stats,
    };
}
