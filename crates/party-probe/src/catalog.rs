//! Named end-to-end scenarios.
//!
//! Each scenario starts from a fresh page (navigate, dismiss the cookie
//! banner, clear localStorage) and runs to completion or its first error.

use futures::future::{BoxFuture, FutureExt};
use tracing::info;

use crate::draft::{CharacterClass, Race, Stats};
use crate::fixtures;
use crate::page::CharacterCreatorPage;
use crate::registry::UiElement;
use crate::result::{ProbeError, ProbeResult};
use crate::scenario::ScenarioTracker;
use crate::steps;

/// Scenario entry point
pub type ScenarioFn = for<'a> fn(&'a CharacterCreatorPage) -> BoxFuture<'a, ProbeResult<()>>;

/// A runnable scenario
#[derive(Clone, Copy)]
pub struct Scenario {
    /// Identifier used on the command line
    pub name: &'static str,
    /// One-line description
    pub summary: &'static str,
    /// Body
    pub run: ScenarioFn,
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("summary", &self.summary)
            .finish_non_exhaustive()
    }
}

impl Scenario {
    /// Run against a page
    pub async fn execute(&self, page: &CharacterCreatorPage) -> ProbeResult<()> {
        info!(scenario = self.name, "starting scenario");
        (self.run)(page).await
    }
}

/// Every scenario, in suite order
#[must_use]
pub fn all() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "page_title",
            summary: "document title matches the expected copy",
            run: |page| page_title(page).boxed(),
        },
        Scenario {
            name: "enter_name",
            summary: "name field is empty by default and reads back what was typed",
            run: |page| enter_name(page).boxed(),
        },
        Scenario {
            name: "select_race",
            summary: "all four races are offered and each selection reads back",
            run: |page| select_race(page).boxed(),
        },
        Scenario {
            name: "select_class",
            summary: "all four classes are visible and each can be selected",
            run: |page| select_class(page).boxed(),
        },
        Scenario {
            name: "class_single_choice",
            summary: "selecting a second class deselects the first",
            run: |page| class_single_choice(page).boxed(),
        },
        Scenario {
            name: "distribute_points",
            summary: "points readout goes 15, 40, 40, 0",
            run: |page| distribute_points(page).boxed(),
        },
        Scenario {
            name: "add_character",
            summary: "Legolas is added and the card matches",
            run: |page| add_character(page).boxed(),
        },
        Scenario {
            name: "add_four_characters",
            summary: "four characters are added one after another",
            run: |page| add_four_characters(page).boxed(),
        },
        Scenario {
            name: "reject_unspent_points",
            summary: "submission with unspent points is refused",
            run: |page| reject_unspent_points(page).boxed(),
        },
        Scenario {
            name: "text_display",
            summary: "static copy before and card copy after adding a character",
            run: |page| text_display(page).boxed(),
        },
    ]
}

/// Look a scenario up by name
#[must_use]
pub fn find(name: &str) -> Option<Scenario> {
    all().into_iter().find(|s| s.name == name)
}

async fn page_title(page: &CharacterCreatorPage) -> ProbeResult<()> {
    page.open_fresh().await?;
    let title = page.title().await?;
    let expected = &page.config().copy.page_title;
    if &title == expected {
        Ok(())
    } else {
        Err(ProbeError::mismatch("page title", expected, title))
    }
}

async fn enter_name(page: &CharacterCreatorPage) -> ProbeResult<()> {
    page.open_fresh().await?;
    let ctx = page.context();
    let name = ctx.locate(UiElement::NameInput);
    ctx.expect(name.clone()).to_be_visible().await?;
    ctx.expect(name.clone()).to_have_value("").await?;
    page.form().set_name("Legolas").await?;
    ctx.expect(name).to_have_value("Legolas").await
}

async fn select_race(page: &CharacterCreatorPage) -> ProbeResult<()> {
    page.open_fresh().await?;
    page.texts().verify_race_options().await?;
    for race in Race::ALL {
        page.form().select_race(race).await?;
        let selected = page.form().race_value().await?;
        if selected != race {
            return Err(ProbeError::mismatch("race selector value", race, selected));
        }
    }
    Ok(())
}

async fn select_class(page: &CharacterCreatorPage) -> ProbeResult<()> {
    page.open_fresh().await?;
    let ctx = page.context();
    for class in CharacterClass::ALL {
        ctx.expect(ctx.registry().class_button(class))
            .to_be_visible()
            .await?;
        page.form().select_class(class).await?;
        let selected = page.form().selected_class().await?;
        if selected != Some(class) {
            return Err(ProbeError::mismatch(
                "selected class",
                class,
                selected.map_or_else(|| "<none>".to_string(), |c| c.to_string()),
            ));
        }
    }
    Ok(())
}

async fn class_single_choice(page: &CharacterCreatorPage) -> ProbeResult<()> {
    page.open_fresh().await?;
    page.form().select_class(CharacterClass::Warrior).await?;
    page.form().select_class(CharacterClass::Wizard).await?;
    let ctx = page.context();
    ctx.expect(ctx.locate(UiElement::SelectedClass))
        .to_have_count(1)
        .await?;
    match page.form().selected_class().await? {
        Some(CharacterClass::Wizard) => Ok(()),
        other => Err(ProbeError::mismatch(
            "selected class",
            CharacterClass::Wizard,
            format!("{other:?}"),
        )),
    }
}

async fn distribute_points(page: &CharacterCreatorPage) -> ProbeResult<()> {
    page.open_fresh().await?;
    let budget = page.config().budget;
    let initial = page.form().points_left().await?;
    let partial = Stats::new(5, 4, 3, 3);
    let full = fixtures::legolas().stats;
    let readouts = steps::distribute_points(page, &[partial, partial, full]).await?;

    let observed: Vec<i64> = std::iter::once(initial).chain(readouts).collect();
    let expected = vec![
        budget.remaining(&budget.starting_stats()),
        budget.remaining(&partial),
        budget.remaining(&partial),
        budget.remaining(&full),
    ];
    if observed == expected {
        Ok(())
    } else {
        Err(ProbeError::mismatch(
            "points readouts",
            format!("{expected:?}"),
            format!("{observed:?}"),
        ))
    }
}

async fn add_character(page: &CharacterCreatorPage) -> ProbeResult<()> {
    page.open_fresh().await?;
    let draft = fixtures::legolas();
    draft.ensure_submit_ready(&page.config().budget)?;
    let mut tracker = ScenarioTracker::new("add_character");
    steps::add_character_to_list(page, &mut tracker, &draft).await?;

    let count = page.roster().count().await?;
    if count != 1 {
        return Err(ProbeError::mismatch("roster count", 1, count));
    }
    let card = page.roster().latest_card().await?;
    if card.name != draft.name {
        return Err(ProbeError::mismatch("latest card name", &draft.name, card.name));
    }
    Ok(())
}

async fn add_four_characters(page: &CharacterCreatorPage) -> ProbeResult<()> {
    page.open_fresh().await?;
    let party = fixtures::four_characters();
    for draft in &party {
        draft.ensure_submit_ready(&page.config().budget)?;
    }
    steps::create_party(page, &party).await?;
    let names = page.roster().names().await?;
    let expected: Vec<String> = party.into_iter().map(|d| d.name).collect();
    if names == expected {
        Ok(())
    } else {
        Err(ProbeError::mismatch(
            "roster names",
            expected.join(", "),
            names.join(", "),
        ))
    }
}

async fn reject_unspent_points(page: &CharacterCreatorPage) -> ProbeResult<()> {
    page.open_fresh().await?;
    let draft = fixtures::unspent();
    if draft.is_submit_ready(&page.config().budget) {
        return Err(ProbeError::InvalidDraft {
            name: draft.name,
            reason: "expected unspent points".to_string(),
        });
    }
    steps::expect_rejection(page, &draft).await?;
    Ok(())
}

async fn text_display(page: &CharacterCreatorPage) -> ProbeResult<()> {
    page.open_fresh().await?;
    page.texts().verify_form_section().await?;
    page.texts().verify_list_section_empty().await?;
    let mut tracker = ScenarioTracker::new("text_display");
    steps::add_character_to_list(page, &mut tracker, &fixtures::legolas()).await?;
    page.texts().verify_latest_card(&fixtures::legolas()).await
}
