//! Static copy and bulk text checks.
//!
//! [`UiCopy`] holds the text the page is expected to show, defaulting to the
//! live Polish copy. [`TextChecks`] walks the form and list sections and
//! fails at the first element whose text, value or visibility is off.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::PageContext;
use crate::draft::{CharacterClass, CharacterDraft, Race, Stat};
use crate::registry::{CardField, UiElement};
use crate::result::ProbeResult;

/// Expected static copy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiCopy {
    /// Document title
    pub page_title: String,
    /// Main heading
    pub main_title: String,
    /// Fragment of the paragraph under the main heading
    pub description: String,
    /// Form section title
    pub form_title: String,
    /// Name field label
    pub name_label: String,
    /// Name field placeholder
    pub name_placeholder: String,
    /// Race selector label
    pub race_label: String,
    /// Heading above the class tiles
    pub class_heading: String,
    /// Heading above the stat inputs
    pub stats_heading: String,
    /// Text before the points readout
    pub points_label: String,
    /// Submit button text
    pub submit_text: String,
    /// Roster section title
    pub list_title: String,
    /// Strength label
    pub strength_label: String,
    /// Dexterity label
    pub dexterity_label: String,
    /// Energy label
    pub energy_label: String,
    /// Health label
    pub health_label: String,
    /// Prefix of a card's race line
    pub card_race_prefix: String,
    /// Prefix of a card's class line
    pub card_class_prefix: String,
    /// Card delete button text
    pub delete_text: String,
}

impl Default for UiCopy {
    fn default() -> Self {
        Self {
            page_title: "party - Howling Testers".to_string(),
            main_title: "Stwórz drużynę".to_string(),
            description: "Wybierz imiona, rasy i klasy".to_string(),
            form_title: "Stwórz swoją postać".to_string(),
            name_label: "Imię postaci:".to_string(),
            name_placeholder: "Wpisz imię...".to_string(),
            race_label: "Rasa:".to_string(),
            class_heading: "Wybierz klasę:".to_string(),
            stats_heading: "Cechy postaci".to_string(),
            points_label: "Punkty do wydania:".to_string(),
            submit_text: "Dodaj postać".to_string(),
            list_title: "Twoje postacie".to_string(),
            strength_label: "Siła:".to_string(),
            dexterity_label: "Spryt:".to_string(),
            energy_label: "Energia:".to_string(),
            health_label: "Zdrowie:".to_string(),
            card_race_prefix: "Rasa: ".to_string(),
            card_class_prefix: "Klasa: ".to_string(),
            delete_text: "Usuń".to_string(),
        }
    }
}

impl UiCopy {
    /// Label of one stat, colon included
    #[must_use]
    pub fn stat_label(&self, stat: Stat) -> &str {
        match stat {
            Stat::Strength => &self.strength_label,
            Stat::Dexterity => &self.dexterity_label,
            Stat::Energy => &self.energy_label,
            Stat::Health => &self.health_label,
        }
    }

    /// Card line for a stat value, e.g. `Siła: 15`
    #[must_use]
    pub fn stat_line(&self, stat: Stat, value: u32) -> String {
        format!("{} {value}", self.stat_label(stat))
    }

    /// Card line for a race, e.g. `Rasa: Elf`
    #[must_use]
    pub fn race_line(&self, race: Race) -> String {
        format!("{}{race}", self.card_race_prefix)
    }

    /// Card line for a class, e.g. `Klasa: Zwiadowca`
    #[must_use]
    pub fn class_line(&self, class: CharacterClass) -> String {
        format!("{}{class}", self.card_class_prefix)
    }
}

/// Bulk static-copy and card checks
#[derive(Debug, Clone)]
pub struct TextChecks {
    ctx: PageContext,
}

impl TextChecks {
    /// Create the component
    #[must_use]
    pub const fn new(ctx: PageContext) -> Self {
        Self { ctx }
    }

    fn copy(&self) -> &UiCopy {
        &self.ctx.config().copy
    }

    /// Main heading and description
    pub async fn verify_page_headers(&self) -> ProbeResult<()> {
        let copy = self.copy();
        self.ctx
            .expect(self.ctx.locate(UiElement::MainTitle))
            .to_have_text(&copy.main_title)
            .await?;
        self.ctx
            .expect(self.ctx.locate(UiElement::MainDescription))
            .to_contain_text(&copy.description)
            .await
    }

    /// Form title, name field and race selector with their labels
    pub async fn verify_form_fields_and_labels(&self) -> ProbeResult<()> {
        let copy = self.copy();
        let ctx = &self.ctx;
        ctx.expect(ctx.locate(UiElement::FormTitle))
            .to_have_text(&copy.form_title)
            .await?;
        ctx.expect(ctx.locate(UiElement::NameLabel))
            .to_have_text(&copy.name_label)
            .await?;
        let name = ctx.locate(UiElement::NameInput);
        ctx.expect(name.clone()).to_be_visible().await?;
        ctx.expect(name)
            .to_have_attribute("placeholder", &copy.name_placeholder)
            .await?;
        ctx.expect(ctx.locate(UiElement::RaceLabel))
            .to_have_text(&copy.race_label)
            .await?;
        ctx.expect(ctx.locate(UiElement::RaceSelect))
            .to_be_visible()
            .await
    }

    /// One option per race, labelled
    pub async fn verify_race_options(&self) -> ProbeResult<()> {
        for race in Race::ALL {
            let option = self.ctx.locate(UiElement::RaceOption(race));
            self.ctx.expect(option.clone()).to_have_count(1).await?;
            self.ctx.expect(option).to_have_text(race.label()).await?;
        }
        Ok(())
    }

    /// Class heading plus one visible, captioned tile per class
    pub async fn verify_class_options(&self) -> ProbeResult<()> {
        self.ctx
            .expect(self.ctx.locate(UiElement::ClassHeading))
            .to_have_text(&self.copy().class_heading)
            .await?;
        for class in CharacterClass::ALL {
            self.ctx
                .expect(self.ctx.registry().class_button(class))
                .to_be_visible()
                .await?;
            self.ctx
                .expect(self.ctx.locate(UiElement::ClassLabel(class)))
                .to_have_text(class.label())
                .await?;
        }
        Ok(())
    }

    /// Stats heading plus one labelled, visible input per stat
    pub async fn verify_stat_labels(&self) -> ProbeResult<()> {
        let copy = self.copy();
        self.ctx
            .expect(self.ctx.locate(UiElement::StatsHeading))
            .to_have_text(&copy.stats_heading)
            .await?;
        for stat in Stat::ALL {
            self.ctx
                .expect(self.ctx.locate(UiElement::StatLabel(stat)))
                .to_have_text(copy.stat_label(stat))
                .await?;
            self.ctx
                .expect(self.ctx.registry().stat_input(stat))
                .to_be_visible()
                .await?;
        }
        Ok(())
    }

    /// Points heading, submit button and list title
    pub async fn verify_action_buttons_and_sections(&self) -> ProbeResult<()> {
        let copy = self.copy();
        let ctx = &self.ctx;
        ctx.expect(ctx.locate(UiElement::PointsHeading))
            .to_contain_text(&copy.points_label)
            .await?;
        let submit = ctx.locate(UiElement::SubmitButton);
        ctx.expect(submit.clone()).to_be_visible().await?;
        ctx.expect(submit).to_have_text(&copy.submit_text).await?;
        ctx.expect(ctx.locate(UiElement::ListTitle))
            .to_have_text(&copy.list_title)
            .await
    }

    /// Every static check of the form section
    pub async fn verify_form_section(&self) -> ProbeResult<()> {
        debug!("verifying form section");
        self.verify_page_headers().await?;
        self.verify_form_fields_and_labels().await?;
        self.verify_race_options().await?;
        self.verify_class_options().await?;
        self.verify_stat_labels().await?;
        self.verify_action_buttons_and_sections().await
    }

    /// List title shown and no cards rendered
    pub async fn verify_list_section_empty(&self) -> ProbeResult<()> {
        debug!("verifying empty list section");
        self.ctx
            .expect(self.ctx.locate(UiElement::ListTitle))
            .to_have_text(&self.copy().list_title)
            .await?;
        self.ctx
            .expect(self.ctx.locate(UiElement::RosterCards))
            .to_have_count(0)
            .await
    }

    /// The most recent card shows exactly the draft
    pub async fn verify_latest_card(&self, draft: &CharacterDraft) -> ProbeResult<()> {
        debug!(name = %draft.name, "verifying latest card");
        let copy = self.copy();
        let registry = self.ctx.registry();
        let card = registry.latest_card();

        self.ctx
            .expect(registry.card_field(&card, CardField::Name))
            .to_have_text(&draft.name)
            .await?;
        self.ctx
            .expect(registry.card_field(&card, CardField::Race))
            .to_have_text(copy.race_line(draft.race))
            .await?;
        self.ctx
            .expect(registry.card_field(&card, CardField::Class))
            .to_have_text(copy.class_line(draft.class))
            .await?;

        let lines = registry.card_field(&card, CardField::StatLines);
        self.ctx.expect(lines.clone()).to_have_count(Stat::ALL.len()).await?;
        for (index, stat) in Stat::ALL.into_iter().enumerate() {
            let line = lines
                .clone()
                .nth(index)
                .described(format!("latest card {} line", stat.label()));
            self.ctx
                .expect(line)
                .to_have_text(copy.stat_line(stat, draft.stats.get(stat)))
                .await?;
        }

        self.ctx
            .expect(registry.card_field(&card, CardField::Delete))
            .to_have_text(&copy.delete_text)
            .await
    }
}
