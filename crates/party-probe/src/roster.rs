//! Roster component: read-only queries over the rendered character cards.
//!
//! Every query first waits (bounded) for the card container to attach. A
//! container that never shows up is reported as an empty roster, not an
//! error, so `count()` on a fresh page is always safe.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::context::PageContext;
use crate::driver::normalize_text;
use crate::locator::Locator;
use crate::registry::{CardField, UiElement};
use crate::result::{ProbeError, ProbeResult};
use crate::wait::ExpectedState;

/// Text snapshot of one rendered card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedCard {
    /// Name heading
    pub name: String,
    /// Race line, e.g. `Rasa: Elf`
    pub race_line: String,
    /// Class line, e.g. `Klasa: Zwiadowca`
    pub class_line: String,
    /// One line per stat, e.g. `Siła: 15`
    pub stat_lines: Vec<String>,
    /// Delete button label
    pub delete_label: String,
}

/// Queries over the roster
#[derive(Debug, Clone)]
pub struct Roster {
    ctx: PageContext,
}

impl Roster {
    /// Create the component
    #[must_use]
    pub const fn new(ctx: PageContext) -> Self {
        Self { ctx }
    }

    fn cards(&self) -> Locator {
        self.ctx.locate(UiElement::RosterCards)
    }

    /// Wait for the container; `false` if it never attached
    pub async fn wait_attached(&self) -> ProbeResult<bool> {
        let driver = self.ctx.driver();
        let container = self.ctx.locate(UiElement::RosterContainer);
        let container = &container;
        let waited = self
            .ctx
            .waiter(self.ctx.config().timeouts.roster())
            .until(&ExpectedState::RosterAttached, || async move {
                driver.is_attached(container).await
            })
            .await;
        match waited {
            Ok(_) => Ok(true),
            Err(e) if e.is_timeout() => {
                warn!(error = %e, "roster container never attached, treating roster as empty");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Number of rendered cards; 0 when there is no roster at all
    pub async fn count(&self) -> ProbeResult<usize> {
        if !self.wait_attached().await? {
            return Ok(0);
        }
        let count = self.ctx.driver().count(&self.cards()).await?;
        debug!(count, "roster count");
        Ok(count)
    }

    /// Whether the roster shows no cards
    pub async fn is_empty(&self) -> ProbeResult<bool> {
        Ok(self.count().await? == 0)
    }

    /// Whether any card text contains `name`
    pub async fn contains_by_name(&self, name: &str) -> ProbeResult<bool> {
        if !self.wait_attached().await? {
            return Ok(false);
        }
        let text = self
            .ctx
            .driver()
            .text_content(&self.ctx.locate(UiElement::RosterContainer))
            .await?
            .unwrap_or_default();
        Ok(normalize_text(&text).contains(&normalize_text(name)))
    }

    /// Wait until at least one card is visible
    pub async fn wait_for_card(&self) -> ProbeResult<()> {
        let driver = self.ctx.driver();
        let first = self.cards().first();
        let first = &first;
        self.ctx
            .waiter(self.ctx.config().timeouts.roster())
            .until(&ExpectedState::CardRendered, || async move {
                driver.is_visible(first).await
            })
            .await?;
        Ok(())
    }

    /// Wait until exactly `expected` cards are rendered
    ///
    /// Times out if the roster never grows that far. Overshooting is an
    /// assertion mismatch: cards are only ever appended one per submission.
    pub async fn wait_for_count(&self, expected: usize) -> ProbeResult<usize> {
        let driver = self.ctx.driver();
        let cards = self.cards();
        let cards = &cards;
        let reached = self
            .ctx
            .waiter(self.ctx.config().timeouts.roster())
            .until_some(&ExpectedState::RosterCount(expected), || async move {
                let n = driver.count(cards).await?;
                Ok((n >= expected).then_some(n))
            })
            .await?;
        if reached == expected {
            Ok(reached)
        } else {
            Err(ProbeError::mismatch("roster count", expected, reached))
        }
    }

    /// Name headings of every card, in render order
    pub async fn names(&self) -> ProbeResult<Vec<String>> {
        let count = self.count().await?;
        let registry = self.ctx.registry();
        let mut names = Vec::with_capacity(count);
        for index in 0..count {
            let name = registry.card_field(&registry.card(index), CardField::Name);
            let text = self.ctx.driver().text_content(&name).await?;
            names.push(normalize_text(&text.unwrap_or_default()));
        }
        Ok(names)
    }

    /// Snapshot of the card at `index`
    pub async fn card(&self, index: usize) -> ProbeResult<RenderedCard> {
        let card = self.ctx.registry().card(index);
        if !self.ctx.driver().is_attached(&card).await? {
            let count = self.count().await?;
            return Err(ProbeError::mismatch(
                format!("roster card #{index}"),
                "a rendered card",
                format!("{count} cards"),
            ));
        }
        self.read_card(&card).await
    }

    /// Snapshot of the most recently added card
    pub async fn latest_card(&self) -> ProbeResult<RenderedCard> {
        let count = self.count().await?;
        if count == 0 {
            return Err(ProbeError::mismatch("roster count", "at least 1", 0));
        }
        self.card(count - 1).await
    }

    async fn read_card(&self, card: &Locator) -> ProbeResult<RenderedCard> {
        let registry = self.ctx.registry();
        let driver = self.ctx.driver();
        let text = |field| {
            let locator = registry.card_field(card, field);
            async move {
                Ok::<_, ProbeError>(normalize_text(
                    &driver.text_content(&locator).await?.unwrap_or_default(),
                ))
            }
        };
        let stat_lines = driver
            .all_text_contents(&registry.card_field(card, CardField::StatLines))
            .await?
            .iter()
            .map(|line| normalize_text(line))
            .collect();
        Ok(RenderedCard {
            name: text(CardField::Name).await?,
            race_line: text(CardField::Race).await?,
            class_line: text(CardField::Class).await?,
            stat_lines,
            delete_label: text(CardField::Delete).await?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::HarnessConfig;
    use crate::driver::PageDriver;
    use crate::simulator::{Faults, SimulatedCreator, SimulatorOptions};
    use std::sync::Arc;

    async fn roster_on(sim: SimulatedCreator) -> (Arc<SimulatedCreator>, Roster) {
        let sim = Arc::new(sim);
        sim.goto("https://howlingtesters.pl/party/").await.unwrap();
        let ctx = PageContext::new(sim.clone(), HarnessConfig::default());
        (sim, Roster::new(ctx))
    }

    mod query_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_empty_roster() {
            let (_, roster) = roster_on(SimulatedCreator::new()).await;
            assert_eq!(roster.count().await.unwrap(), 0);
            assert!(roster.is_empty().await.unwrap());
            assert!(!roster.contains_by_name("Legolas").await.unwrap());
            assert!(roster.names().await.unwrap().is_empty());
        }

        #[tokio::test(start_paused = true)]
        async fn test_missing_container_counts_zero() {
            let options = SimulatorOptions {
                faults: Faults {
                    detached_roster: true,
                    ..Faults::default()
                },
                ..SimulatorOptions::default()
            };
            let (_, roster) = roster_on(SimulatedCreator::with_options(options)).await;
            assert_eq!(roster.count().await.unwrap(), 0);
            assert!(!roster.contains_by_name("Gimli").await.unwrap());
        }

        #[tokio::test(start_paused = true)]
        async fn test_latest_card_on_empty_roster_is_mismatch() {
            let (_, roster) = roster_on(SimulatedCreator::new()).await;
            let err = roster.latest_card().await.unwrap_err();
            assert!(err.is_mismatch());
        }

        #[tokio::test(start_paused = true)]
        async fn test_wait_for_card_times_out() {
            let (_, roster) = roster_on(SimulatedCreator::new()).await;
            let err = roster.wait_for_card().await.unwrap_err();
            assert!(err.is_timeout());
            assert!(err.to_string().contains("roster card visible"));
        }
    }
}
