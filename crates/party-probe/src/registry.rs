//! Locator registry: logical UI element names mapped to lookup strategies.
//!
//! Every selector the harness knows about lives here. When the markup of
//! the character creator changes, this is the only file that should.

use std::fmt;

use crate::draft::{CharacterClass, Race, Stat};
use crate::locator::{Locator, Selector};

/// Class-option tile; buttons are matched by the `alt` of their image
pub const CLASS_OPTION: &str = ".class-option";
/// Marker class carried by the selected class tile
pub const SELECTED_MARKER: &str = "selected";
/// Roster container
pub const ROSTER_CONTAINER: &str = "#character-cards";
/// One rendered card inside the roster container
pub const ROSTER_CARD: &str = "#character-cards > div";
/// Cookie banner accept button
pub const COOKIE_ACCEPT: &str = r#"button[data-cky-tag="accept-button"]"#;

/// A logical element of the character creator page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiElement {
    /// Name text field
    NameInput,
    /// Race `<select>`
    RaceSelect,
    /// One race `<option>`
    RaceOption(Race),
    /// Clickable class tile
    ClassButton(CharacterClass),
    /// Caption under a class tile
    ClassLabel(CharacterClass),
    /// Whichever class tile(s) currently carry the selected marker
    SelectedClass,
    /// Numeric stat input
    StatInput(Stat),
    /// Label of a stat input
    StatLabel(Stat),
    /// "Add character" button
    SubmitButton,
    /// Points-remaining readout
    PointsLeft,
    /// Heading that wraps the points readout
    PointsHeading,
    /// Feedback popup
    Popup,
    /// Popup close control
    PopupClose,
    /// Cookie consent accept button
    CookieAccept,
    /// Container the cards render into
    RosterContainer,
    /// Every rendered card
    RosterCards,
    /// Page title heading
    MainTitle,
    /// Paragraph under the page title
    MainDescription,
    /// Form section title
    FormTitle,
    /// Label of the name field
    NameLabel,
    /// Label of the race selector
    RaceLabel,
    /// Heading above the class tiles
    ClassHeading,
    /// Heading above the stat inputs
    StatsHeading,
    /// Roster section title
    ListTitle,
}

impl UiElement {
    /// Every element, parameterized variants expanded
    #[must_use]
    pub fn all() -> Vec<Self> {
        let mut all = vec![
            Self::NameInput,
            Self::RaceSelect,
            Self::SelectedClass,
            Self::SubmitButton,
            Self::PointsLeft,
            Self::PointsHeading,
            Self::Popup,
            Self::PopupClose,
            Self::CookieAccept,
            Self::RosterContainer,
            Self::RosterCards,
            Self::MainTitle,
            Self::MainDescription,
            Self::FormTitle,
            Self::NameLabel,
            Self::RaceLabel,
            Self::ClassHeading,
            Self::StatsHeading,
            Self::ListTitle,
        ];
        all.extend(Race::ALL.into_iter().map(Self::RaceOption));
        all.extend(CharacterClass::ALL.into_iter().map(Self::ClassButton));
        all.extend(CharacterClass::ALL.into_iter().map(Self::ClassLabel));
        all.extend(Stat::ALL.into_iter().map(Self::StatInput));
        all.extend(Stat::ALL.into_iter().map(Self::StatLabel));
        all
    }
}

impl fmt::Display for UiElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NameInput => f.write_str("name field"),
            Self::RaceSelect => f.write_str("race selector"),
            Self::RaceOption(r) => write!(f, "race option '{r}'"),
            Self::ClassButton(c) => write!(f, "class button '{c}'"),
            Self::ClassLabel(c) => write!(f, "class label '{c}'"),
            Self::SelectedClass => f.write_str("selected class"),
            Self::StatInput(s) => write!(f, "{} input", s.label()),
            Self::StatLabel(s) => write!(f, "{} label", s.label()),
            Self::SubmitButton => f.write_str("submit button"),
            Self::PointsLeft => f.write_str("points readout"),
            Self::PointsHeading => f.write_str("points heading"),
            Self::Popup => f.write_str("popup"),
            Self::PopupClose => f.write_str("popup close button"),
            Self::CookieAccept => f.write_str("cookie accept button"),
            Self::RosterContainer => f.write_str("roster container"),
            Self::RosterCards => f.write_str("roster cards"),
            Self::MainTitle => f.write_str("main title"),
            Self::MainDescription => f.write_str("main description"),
            Self::FormTitle => f.write_str("form title"),
            Self::NameLabel => f.write_str("name label"),
            Self::RaceLabel => f.write_str("race label"),
            Self::ClassHeading => f.write_str("class heading"),
            Self::StatsHeading => f.write_str("stats heading"),
            Self::ListTitle => f.write_str("list title"),
        }
    }
}

/// A field inside one roster card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardField {
    /// Name heading
    Name,
    /// "Rasa: …" line
    Race,
    /// "Klasa: …" line
    Class,
    /// Stat list items, one per stat
    StatLines,
    /// Delete button
    Delete,
}

impl CardField {
    /// Every card field
    pub const ALL: [Self; 5] = [
        Self::Name,
        Self::Race,
        Self::Class,
        Self::StatLines,
        Self::Delete,
    ];
}

/// Maps [`UiElement`]s to [`Locator`]s
#[derive(Debug, Clone, Default)]
pub struct LocatorRegistry;

impl LocatorRegistry {
    /// Create the registry for the live markup
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn selector(element: UiElement) -> Selector {
        match element {
            UiElement::NameInput => Selector::css("#name"),
            UiElement::RaceSelect => Selector::css("#race"),
            UiElement::RaceOption(r) => Selector::css(format!(r#"#race option[value="{r}"]"#)),
            UiElement::ClassButton(c) => {
                Selector::css_has(CLASS_OPTION, format!(r#"img[alt="{c}"]"#))
            }
            UiElement::ClassLabel(c) => {
                Selector::css_with_text(format!("{CLASS_OPTION} p"), c.label())
            }
            UiElement::SelectedClass => {
                Selector::css(format!("{CLASS_OPTION}.{SELECTED_MARKER}"))
            }
            UiElement::StatInput(s) => Selector::css(format!("#{}", s.field_id())),
            UiElement::StatLabel(s) => Selector::css(format!(r#"label[for="{}"]"#, s.field_id())),
            UiElement::SubmitButton => Selector::css("#generate-btn"),
            UiElement::PointsLeft => Selector::css("#points-left"),
            UiElement::PointsHeading => Selector::css_has("h2", "#points-left"),
            UiElement::Popup => Selector::css("#popup"),
            UiElement::PopupClose => Selector::css("#popup-close"),
            UiElement::CookieAccept => Selector::css(COOKIE_ACCEPT),
            UiElement::RosterContainer => Selector::css(ROSTER_CONTAINER),
            UiElement::RosterCards => Selector::css(ROSTER_CARD),
            UiElement::MainTitle => Selector::css("h1"),
            UiElement::MainDescription => Selector::css("h1 + p"),
            UiElement::FormTitle => Selector::css_with_text("h2", "Stwórz swoją postać"),
            UiElement::NameLabel => Selector::css(r#"label[for="name"]"#),
            UiElement::RaceLabel => Selector::css(r#"label[for="race"]"#),
            UiElement::ClassHeading => Selector::css_with_text("h3", "Wybierz klasę"),
            UiElement::StatsHeading => Selector::css_with_text("h3", "Cechy postaci"),
            UiElement::ListTitle => Selector::css_with_text("h2", "Twoje postacie"),
        }
    }

    /// Locator for a logical element
    #[must_use]
    pub fn locate(&self, element: UiElement) -> Locator {
        Locator::from_selector(Self::selector(element)).described(element.to_string())
    }

    /// Class tile for one class
    #[must_use]
    pub fn class_button(&self, class: CharacterClass) -> Locator {
        self.locate(UiElement::ClassButton(class))
    }

    /// Stat input for one stat
    #[must_use]
    pub fn stat_input(&self, stat: Stat) -> Locator {
        self.locate(UiElement::StatInput(stat))
    }

    /// Selector of a field, relative to its card
    #[must_use]
    pub fn card_field_selector(field: CardField) -> Selector {
        match field {
            CardField::Name => Selector::css("h4"),
            CardField::Race => Selector::css_with_text("p", "Rasa:"),
            CardField::Class => Selector::css_with_text("p", "Klasa:"),
            CardField::StatLines => Selector::css("ul li"),
            CardField::Delete => Selector::css_with_text("button", "Usuń"),
        }
    }

    /// The `index`-th rendered card
    #[must_use]
    pub fn card(&self, index: usize) -> Locator {
        self.locate(UiElement::RosterCards)
            .nth(index)
            .described(format!("roster card #{index}"))
    }

    /// The most recently rendered card
    #[must_use]
    pub fn latest_card(&self) -> Locator {
        self.locate(UiElement::RosterCards)
            .last()
            .described("latest roster card")
    }

    /// A field of a card locator
    #[must_use]
    pub fn card_field(&self, card: &Locator, field: CardField) -> Locator {
        let description = format!("{card} {field:?}").to_lowercase();
        card.within(Self::card_field_selector(field))
            .described(description)
    }

    /// Reverse lookup: which element a (non-scoped) selector denotes
    ///
    /// `Nth`/`Last` wrappers are looked through; resolving the index is left
    /// to the caller.
    #[must_use]
    pub fn identify(&self, selector: &Selector) -> Option<UiElement> {
        let base = selector.unindexed();
        UiElement::all()
            .into_iter()
            .find(|element| &Self::selector(*element) == base)
    }

    /// Reverse lookup for a card-relative selector
    #[must_use]
    pub fn identify_card_field(&self, selector: &Selector) -> Option<CardField> {
        let base = selector.unindexed();
        CardField::ALL
            .into_iter()
            .find(|field| &Self::card_field_selector(*field) == base)
    }
}
