//! Submit synchronization protocol.
//!
//! Clicking "add character" has two possible visible effects and the page
//! gives no ordering guarantee between them: a feedback popup and a new
//! roster card. The protocol:
//!
//! 1. record the card count,
//! 2. click submit,
//! 3. race "popup visible" against "a card beyond the recorded count",
//! 4. if a popup won, classify its text; dismiss it either way, then fail
//!    with the literal text unless it was an acknowledgment,
//! 5. confirm the roster holds exactly one more card than before,
//! 6. if the card won, watch briefly for a popup that follows it and handle
//!    it like step 4.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::context::PageContext;
use crate::driver::{normalize_text, PageDriver};
use crate::locator::Locator;
use crate::registry::UiElement;
use crate::result::{ProbeError, ProbeResult};
use crate::roster::Roster;
use crate::wait::{ExpectedState, FirstOf};

/// What the submit click produced besides the card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmitOutcome {
    /// An acknowledgment popup with this text was shown and dismissed
    Popup(String),
    /// The card appeared first, then an acknowledgment popup that was dismissed
    LatePopup(String),
    /// The card appeared without any popup
    NoPopup,
}

/// Result of a successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReport {
    /// Popup observation
    pub outcome: SubmitOutcome,
    /// Card count before the click
    pub before: usize,
    /// Card count after the roster settled
    pub after: usize,
}

/// How a popup reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupKind {
    /// The character was accepted
    Acknowledgment,
    /// The submission was refused
    Rejection,
}

/// Words that turn a following marker into its opposite
const NEGATIONS: &[&str] = &["nie", "not", "no"];

/// Classifies popup text by case-insensitive markers
///
/// A marker only counts as a whole word (or phrase) that is not directly
/// preceded by a negation, so "Nie dodano postaci" reads as a rejection.
#[derive(Debug, Clone)]
pub struct PopupClassifier {
    markers: Vec<String>,
}

impl PopupClassifier {
    /// Create a classifier; blank markers are ignored
    #[must_use]
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let markers = markers
            .into_iter()
            .map(|m| m.as_ref().trim().to_lowercase())
            .filter(|m| !m.is_empty())
            .collect();
        Self { markers }
    }

    /// Classify popup text
    #[must_use]
    pub fn classify(&self, text: &str) -> PopupKind {
        let text = text.to_lowercase();
        if self.markers.iter().any(|m| affirms(&text, m)) {
            PopupKind::Acknowledgment
        } else {
            PopupKind::Rejection
        }
    }
}

fn affirms(text: &str, marker: &str) -> bool {
    text.match_indices(marker).any(|(start, _)| {
        let (before, after) = (&text[..start], &text[start + marker.len()..]);
        let bounded = !before.chars().next_back().is_some_and(char::is_alphanumeric)
            && !after.chars().next().is_some_and(char::is_alphanumeric);
        let negated = before
            .split(|c: char| !c.is_alphanumeric())
            .rev()
            .find(|word| !word.is_empty())
            .is_some_and(|word| NEGATIONS.contains(&word));
        bounded && !negated
    })
}

/// One run of the submit protocol against a session
#[derive(Debug)]
pub struct SubmitProtocol<'a> {
    ctx: &'a PageContext,
    roster: Roster,
    classifier: PopupClassifier,
}

impl<'a> SubmitProtocol<'a> {
    /// Prepare the protocol for a session
    #[must_use]
    pub fn new(ctx: &'a PageContext) -> Self {
        Self {
            ctx,
            roster: Roster::new(ctx.clone()),
            classifier: PopupClassifier::new(&ctx.config().ack_markers),
        }
    }

    /// Click submit and synchronize on its effects
    pub async fn run(&self) -> ProbeResult<SubmitReport> {
        let before = self.roster.count().await?;
        debug!(before, "submitting character");
        self.ctx
            .driver()
            .click(&self.ctx.locate(UiElement::SubmitButton))
            .await?;

        let outcome = match self.race(before).await? {
            FirstOf::First(text) => {
                debug!(popup = %text, "popup appeared");
                self.handle_popup(text, SubmitOutcome::Popup).await?
            }
            FirstOf::Second(count) => {
                debug!(count, "card rendered before any popup");
                SubmitOutcome::NoPopup
            }
        };

        let after = match self.roster.wait_for_count(before + 1).await {
            Err(ProbeError::Timeout { awaited, ms }) => {
                return Err(match &outcome {
                    SubmitOutcome::Popup(text) => {
                        ProbeError::timeout(format!("{awaited} after popup \"{text}\""), ms)
                    }
                    _ => ProbeError::Timeout { awaited, ms },
                })
            }
            other => other?,
        };

        let outcome = match outcome {
            SubmitOutcome::NoPopup => match self.late_popup().await? {
                Some(text) => {
                    debug!(popup = %text, "popup followed the card");
                    self.handle_popup(text, SubmitOutcome::LatePopup).await?
                }
                None => SubmitOutcome::NoPopup,
            },
            outcome => outcome,
        };

        info!(before, after, ?outcome, "submission accepted");
        Ok(SubmitReport {
            outcome,
            before,
            after,
        })
    }

    /// Dismiss the popup; acknowledgments become `accepted(text)`, anything
    /// else fails with the literal text
    async fn handle_popup(
        &self,
        text: String,
        accepted: fn(String) -> SubmitOutcome,
    ) -> ProbeResult<SubmitOutcome> {
        match self.classifier.classify(&text) {
            PopupKind::Acknowledgment => {
                self.dismiss_popup().await?;
                Ok(accepted(text))
            }
            PopupKind::Rejection => {
                if let Err(e) = self.dismiss_popup().await {
                    warn!(error = %e, "could not dismiss rejection popup");
                }
                Err(ProbeError::Rejection { message: text })
            }
        }
    }

    /// Popup text if one shows up within the late popup bound
    async fn late_popup(&self) -> ProbeResult<Option<String>> {
        let driver = self.ctx.driver();
        let popup = self.ctx.locate(UiElement::Popup);
        let popup = &popup;
        let seen = self
            .ctx
            .waiter(self.ctx.config().timeouts.late_popup())
            .until_some(&ExpectedState::PopupVisible, || async move {
                popup_text(driver, popup).await
            })
            .await;
        match seen {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.is_timeout() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn race(&self, before: usize) -> ProbeResult<FirstOf<String, usize>> {
        let driver = self.ctx.driver();
        let popup = self.ctx.locate(UiElement::Popup);
        let cards = self.ctx.locate(UiElement::RosterCards);
        let (popup, cards) = (&popup, &cards);

        self.ctx
            .waiter(self.ctx.config().timeouts.submit())
            .first_of(
                (&ExpectedState::PopupVisible, || async move {
                    popup_text(driver, popup).await
                }),
                (&ExpectedState::RosterGrewFrom(before), || async move {
                    let n = driver.count(cards).await?;
                    Ok((n > before).then_some(n))
                }),
            )
            .await
    }

    /// Close the popup and wait for it to go away
    pub async fn dismiss_popup(&self) -> ProbeResult<()> {
        let driver = self.ctx.driver();
        let close = self.ctx.locate(UiElement::PopupClose);
        if driver.is_attached(&close).await? {
            driver.click(&close).await?;
        }
        let popup = self.ctx.locate(UiElement::Popup);
        let popup = &popup;
        self.ctx
            .waiter(self.ctx.config().timeouts.action())
            .until(&ExpectedState::PopupHidden, || async move {
                Ok(!driver.is_visible(popup).await?)
            })
            .await?;
        Ok(())
    }
}

async fn popup_text(driver: &dyn PageDriver, popup: &Locator) -> ProbeResult<Option<String>> {
    if driver.is_visible(popup).await? {
        let text = driver.text_content(popup).await?.unwrap_or_default();
        Ok(Some(normalize_text(&text)))
    } else {
        Ok(None)
    }
}
