//! Form component: intention-level operations on the creation form.

use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, info};

use crate::context::PageContext;
use crate::draft::{CharacterClass, CharacterDraft, Race, Stat, Stats};
use crate::registry::{UiElement, SELECTED_MARKER};
use crate::result::{ProbeError, ProbeResult};
use crate::sync::{SubmitProtocol, SubmitReport};
use crate::wait::ExpectedState;

fn number_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"-?\d+").ok()).as_ref()
}

/// Last integer in a readout such as `Punkty do wydania: 15`
#[must_use]
pub fn parse_points(readout: &str) -> Option<i64> {
    number_pattern()?
        .find_iter(readout)
        .last()
        .and_then(|m| m.as_str().parse().ok())
}

/// The character creation form
#[derive(Debug, Clone)]
pub struct CharacterForm {
    ctx: PageContext,
}

impl CharacterForm {
    /// Create the component
    #[must_use]
    pub const fn new(ctx: PageContext) -> Self {
        Self { ctx }
    }

    /// Type a name
    pub async fn set_name(&self, name: &str) -> ProbeResult<()> {
        debug!(name, "setting name");
        self.ctx
            .driver()
            .fill(&self.ctx.locate(UiElement::NameInput), name)
            .await
    }

    /// Choose a race
    pub async fn select_race(&self, race: Race) -> ProbeResult<()> {
        debug!(%race, "selecting race");
        self.ctx
            .driver()
            .select_option(&self.ctx.locate(UiElement::RaceSelect), race.label())
            .await
    }

    /// Pick a class and confirm it is the only one selected
    pub async fn select_class(&self, class: CharacterClass) -> ProbeResult<()> {
        debug!(%class, "selecting class");
        let driver = self.ctx.driver();
        let button = self.ctx.registry().class_button(class);
        driver.click(&button).await?;

        let waiter = self.ctx.waiter(self.ctx.config().timeouts.action());
        let button = &button;
        waiter
            .until(&ExpectedState::ClassSelected(class), || async move {
                driver.has_class(button, SELECTED_MARKER).await
            })
            .await?;

        let selected = self.ctx.locate(UiElement::SelectedClass);
        let selected = &selected;
        let single = waiter
            .until(&ExpectedState::SingleClassSelected, || async move {
                Ok(driver.count(selected).await? == 1)
            })
            .await;
        match single {
            Ok(_) => Ok(()),
            Err(e) if e.is_timeout() => {
                let actual = driver.count(selected).await?;
                Err(ProbeError::mismatch("selected class markers", 1, actual))
            }
            Err(e) => Err(e),
        }
    }

    /// Write all four stats, then wait for the readout to recalculate
    pub async fn set_stats(&self, stats: Stats) -> ProbeResult<()> {
        debug!(%stats, "setting stats");
        let driver = self.ctx.driver();
        for stat in Stat::ALL {
            driver
                .fill(&self.ctx.registry().stat_input(stat), &stats.get(stat).to_string())
                .await?;
        }
        let readout = self.ctx.locate(UiElement::PointsLeft);
        let readout = &readout;
        self.ctx
            .waiter(self.ctx.config().timeouts.action())
            .until(&ExpectedState::PointsReadoutPopulated, || async move {
                let text = driver.text_content(readout).await?.unwrap_or_default();
                Ok(!text.trim().is_empty())
            })
            .await?;
        Ok(())
    }

    /// Apply every field of a draft, in form order
    pub async fn fill(&self, draft: &CharacterDraft) -> ProbeResult<()> {
        info!(name = %draft.name, race = %draft.race, class = %draft.class, stats = %draft.stats, "filling form");
        self.set_name(&draft.name).await?;
        self.select_race(draft.race).await?;
        self.select_class(draft.class).await?;
        self.set_stats(draft.stats).await
    }

    /// Click submit and run the synchronization protocol
    pub async fn submit(&self) -> ProbeResult<SubmitReport> {
        SubmitProtocol::new(&self.ctx).run().await
    }

    /// Current value of the name field
    pub async fn name_value(&self) -> ProbeResult<String> {
        Ok(self
            .ctx
            .driver()
            .input_value(&self.ctx.locate(UiElement::NameInput))
            .await?
            .unwrap_or_default())
    }

    /// Current race selection
    pub async fn race_value(&self) -> ProbeResult<Race> {
        let value = self
            .ctx
            .driver()
            .input_value(&self.ctx.locate(UiElement::RaceSelect))
            .await?
            .unwrap_or_default();
        value
            .parse()
            .map_err(|_| ProbeError::mismatch("race selector value", "a known race", value))
    }

    /// The selected class; `None` when nothing is selected
    ///
    /// More than one selected class violates the single-choice rule and is
    /// reported as a mismatch.
    pub async fn selected_class(&self) -> ProbeResult<Option<CharacterClass>> {
        let driver = self.ctx.driver();
        let mut selected = Vec::new();
        for class in CharacterClass::ALL {
            if driver
                .has_class(&self.ctx.registry().class_button(class), SELECTED_MARKER)
                .await?
            {
                selected.push(class);
            }
        }
        match selected.as_slice() {
            [] => Ok(None),
            [one] => Ok(Some(*one)),
            many => Err(ProbeError::mismatch(
                "selected class markers",
                1,
                many.len(),
            )),
        }
    }

    /// Integer shown by the points readout
    pub async fn points_left(&self) -> ProbeResult<i64> {
        let text = self
            .ctx
            .driver()
            .text_content(&self.ctx.locate(UiElement::PointsLeft))
            .await?
            .unwrap_or_default();
        parse_points(&text).ok_or_else(|| ProbeError::mismatch("points readout", "a number", text))
    }

    /// Current values of the four stat inputs
    pub async fn stat_values(&self) -> ProbeResult<Stats> {
        let mut values = [0u32; 4];
        for (slot, stat) in values.iter_mut().zip(Stat::ALL) {
            let raw = self
                .ctx
                .driver()
                .input_value(&self.ctx.registry().stat_input(stat))
                .await?
                .unwrap_or_default();
            *slot = raw.trim().parse().map_err(|_| {
                ProbeError::mismatch(format!("{} input", stat.label()), "a number", &raw)
            })?;
        }
        Ok(Stats::from(values))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_parse_points() {
            assert_eq!(parse_points("15"), Some(15));
            assert_eq!(parse_points("Punkty do wydania: 40"), Some(40));
            assert_eq!(parse_points("Punkty do wydania: -5"), Some(-5));
            assert_eq!(parse_points(""), None);
            assert_eq!(parse_points("Punkty do wydania:"), None);
        }
    }

    proptest! {
        #[test]
        fn prop_parse_points_reads_last_integer(n in -1000i64..1000) {
            let readout = format!("Punkty do wydania: {n}");
            prop_assert_eq!(parse_points(&readout), Some(n));
        }
    }
}
