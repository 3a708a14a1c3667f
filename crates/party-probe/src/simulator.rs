//! In-process model of the character creator.
//!
//! [`SimulatedCreator`] implements [`PageDriver`] without a browser. It keeps
//! the page state in memory and answers locator queries by mapping them back
//! to logical elements through the [`LocatorRegistry`]. Its timing is
//! deliberately asynchronous (class markers settle, the readout recalculates,
//! popups and cards appear after a delay) so the synchronization protocol is
//! exercised the way the live page exercises it.
//!
//! [`Faults`] switch on misbehaviours the harness must catch.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::budget::Budget;
use crate::driver::{no_element, PageDriver};
use crate::draft::{CharacterClass, CharacterDraft, Race, Stat, Stats};
use crate::locator::{Locator, Selector};
use crate::registry::{CardField, LocatorRegistry, UiElement, SELECTED_MARKER};
use crate::result::{ProbeError, ProbeResult};
use crate::texts::UiCopy;

/// What a valid submission shows besides the new card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PopupMode {
    /// An acknowledgment popup
    #[default]
    Acknowledge,
    /// Nothing; the card just appears
    Silent,
}

/// Misbehaviours to inject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Faults {
    /// Selecting a class leaves the previous one marked
    pub sticky_class_selection: bool,
    /// Submit clicks have no effect at all
    pub ignore_submit: bool,
    /// Every accepted submission renders two cards
    pub duplicate_cards: bool,
    /// The roster container is never rendered
    pub detached_roster: bool,
    /// The popup close button does nothing
    pub stuck_popup: bool,
    /// Allocations that leave points unspent are accepted
    pub accept_unspent: bool,
}

/// Behaviour of the simulated page
#[derive(Debug, Clone)]
pub struct SimulatorOptions {
    /// Popup behaviour on accepted submissions
    pub popup_mode: PopupMode,
    /// Acknowledgment popup text
    pub ack_message: String,
    /// Popup text when points are left unspent or a stat is not a number
    pub rejection_message: String,
    /// Popup text when no class is selected
    pub missing_class_message: String,
    /// Delay before a clicked class tile shows the selected marker
    pub select_settle: Duration,
    /// Delay before the points readout shows the recalculated value
    pub readout_delay: Duration,
    /// Delay before a popup becomes visible
    pub popup_delay: Duration,
    /// Delay before a new card becomes visible
    pub render_delay: Duration,
    /// Show the cookie consent banner on first load
    pub cookie_banner: bool,
    /// Name the page substitutes for a blank one, if any
    pub default_name: Option<String>,
    /// Point budget the page enforces
    pub budget: Budget,
    /// Static copy the page renders
    pub copy: UiCopy,
    /// Injected faults
    pub faults: Faults,
}

impl Default for SimulatorOptions {
    fn default() -> Self {
        Self {
            popup_mode: PopupMode::Acknowledge,
            ack_message: "Dodano postać do drużyny!".to_string(),
            rejection_message: "Musisz wydać wszystkie punkty!".to_string(),
            missing_class_message: "Wybierz klasę postaci!".to_string(),
            select_settle: Duration::from_millis(40),
            readout_delay: Duration::from_millis(20),
            popup_delay: Duration::from_millis(30),
            render_delay: Duration::from_millis(60),
            cookie_banner: false,
            default_name: None,
            budget: Budget::default(),
            copy: UiCopy::default(),
            faults: Faults::default(),
        }
    }
}

#[derive(Debug, Clone)]
struct Popup {
    text: String,
    visible_at: Instant,
}

#[derive(Debug, Clone)]
struct Card {
    draft: CharacterDraft,
    visible_at: Instant,
}

#[derive(Debug)]
struct AppState {
    url: Option<String>,
    closed: bool,
    name: String,
    race: Race,
    selected: Vec<(CharacterClass, Instant)>,
    stats: [String; 4],
    readout_ready_at: Instant,
    popup: Option<Popup>,
    cards: Vec<Card>,
    storage: Vec<CharacterDraft>,
    cookie_visible: bool,
    cookie_accepted: bool,
    history: Vec<String>,
}

/// Something a selector resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    El(UiElement),
    Card(usize),
    Field(usize, CardField, usize),
}

/// Simulated character creator page
#[derive(Debug)]
pub struct SimulatedCreator {
    id: Uuid,
    options: SimulatorOptions,
    registry: LocatorRegistry,
    state: Mutex<AppState>,
}

impl Default for SimulatedCreator {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedCreator {
    /// Simulator with default behaviour
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(SimulatorOptions::default())
    }

    /// Simulator with custom behaviour
    #[must_use]
    pub fn with_options(options: SimulatorOptions) -> Self {
        let baseline = options.budget.baseline.to_string();
        let state = AppState {
            url: None,
            closed: false,
            name: String::new(),
            race: Race::Human,
            selected: Vec::new(),
            stats: [
                baseline.clone(),
                baseline.clone(),
                baseline.clone(),
                baseline,
            ],
            readout_ready_at: Instant::now(),
            popup: None,
            cards: Vec::new(),
            storage: Vec::new(),
            cookie_visible: false,
            cookie_accepted: false,
            history: Vec::new(),
        };
        Self {
            id: Uuid::new_v4(),
            options,
            registry: LocatorRegistry::new(),
            state: Mutex::new(state),
        }
    }

    /// Session identifier
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Behaviour of this simulator
    #[must_use]
    pub const fn options(&self) -> &SimulatorOptions {
        &self.options
    }

    fn state(&self) -> MutexGuard<'_, AppState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every recorded action, oldest first
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state().history.clone()
    }

    /// Whether an action with this prefix was recorded
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.state().history.iter().any(|h| h.starts_with(prefix))
    }

    /// Put characters into localStorage, as a previous visit would have
    pub fn seed_storage(&self, drafts: Vec<CharacterDraft>) {
        self.state().storage = drafts;
    }

    /// Characters currently persisted in localStorage
    #[must_use]
    pub fn stored(&self) -> Vec<CharacterDraft> {
        self.state().storage.clone()
    }

    /// Characters with a card in the document, rendered or not yet visible
    #[must_use]
    pub fn rendered(&self) -> Vec<CharacterDraft> {
        self.state().cards.iter().map(|c| c.draft.clone()).collect()
    }

    fn record(state: &mut AppState, entry: String) {
        debug!(action = %entry, "simulated page action");
        state.history.push(entry);
    }

    fn ensure_open(state: &AppState) -> ProbeResult<()> {
        if state.closed {
            Err(ProbeError::driver("page has been closed"))
        } else {
            Ok(())
        }
    }

    fn load(&self, state: &mut AppState, url: &str) {
        let now = Instant::now();
        state.url = Some(url.to_string());
        state.name.clear();
        state.race = Race::Human;
        state.selected.clear();
        let baseline = self.options.budget.baseline.to_string();
        state.stats = [
            baseline.clone(),
            baseline.clone(),
            baseline.clone(),
            baseline,
        ];
        state.readout_ready_at = now;
        state.popup = None;
        state.cards = state
            .storage
            .iter()
            .map(|draft| Card {
                draft: draft.clone(),
                visible_at: now,
            })
            .collect();
        state.cookie_visible = self.options.cookie_banner && !state.cookie_accepted;
    }

    fn resolve(&self, state: &AppState, selector: &Selector, now: Instant) -> Vec<Node> {
        if state.url.is_none() {
            return Vec::new();
        }
        match selector {
            Selector::Nth { base, index } => self
                .resolve(state, base, now)
                .into_iter()
                .nth(*index)
                .into_iter()
                .collect(),
            Selector::Last(base) => self.resolve(state, base, now).pop().into_iter().collect(),
            Selector::Scoped { scope, inner } => match self.resolve(state, scope, now).first() {
                Some(Node::Card(index)) => self
                    .registry
                    .identify_card_field(inner)
                    .map(|field| {
                        let matches = if field == CardField::StatLines {
                            Stat::ALL.len()
                        } else {
                            1
                        };
                        (0..matches).map(|k| Node::Field(*index, field, k)).collect()
                    })
                    .unwrap_or_default(),
                _ => Vec::new(),
            },
            other => match self.registry.identify(other) {
                Some(UiElement::RosterCards) => {
                    if self.options.faults.detached_roster {
                        return Vec::new();
                    }
                    state
                        .cards
                        .iter()
                        .enumerate()
                        .filter(|(_, card)| card.visible_at <= now)
                        .map(|(i, _)| Node::Card(i))
                        .collect()
                }
                Some(UiElement::SelectedClass) => state
                    .selected
                    .iter()
                    .filter(|(_, at)| *at <= now)
                    .map(|(class, _)| Node::El(UiElement::ClassButton(*class)))
                    .collect(),
                Some(element) if self.exists(state, element, now) => vec![Node::El(element)],
                _ => Vec::new(),
            },
        }
    }

    fn exists(&self, state: &AppState, element: UiElement, now: Instant) -> bool {
        match element {
            UiElement::PopupClose => popup_visible(state, now),
            UiElement::CookieAccept => state.cookie_visible,
            UiElement::RosterContainer => !self.options.faults.detached_roster,
            _ => true,
        }
    }

    fn first(&self, state: &AppState, locator: &Locator) -> Option<Node> {
        self.resolve(state, locator.selector(), Instant::now())
            .into_iter()
            .next()
    }

    fn visible(state: &AppState, node: Node, now: Instant) -> bool {
        match node {
            Node::El(UiElement::Popup) => popup_visible(state, now),
            Node::El(UiElement::CookieAccept) => state.cookie_visible,
            _ => true,
        }
    }

    fn points_text(&self, state: &AppState, now: Instant) -> String {
        if now < state.readout_ready_at {
            return String::new();
        }
        parse_stats(&state.stats).map_or_else(
            || "NaN".to_string(),
            |stats| self.options.budget.remaining(&stats).to_string(),
        )
    }

    fn card_text(&self, draft: &CharacterDraft) -> String {
        let copy = &self.options.copy;
        let mut lines = vec![
            draft.name.clone(),
            copy.race_line(draft.race),
            copy.class_line(draft.class),
        ];
        lines.extend(
            Stat::ALL
                .into_iter()
                .map(|stat| copy.stat_line(stat, draft.stats.get(stat))),
        );
        lines.push(copy.delete_text.clone());
        lines.join("\n")
    }

    fn text(&self, state: &AppState, node: Node, now: Instant) -> String {
        let copy = &self.options.copy;
        match node {
            Node::Card(i) => state
                .cards
                .get(i)
                .map(|card| self.card_text(&card.draft))
                .unwrap_or_default(),
            Node::Field(i, field, k) => {
                let Some(card) = state.cards.get(i) else {
                    return String::new();
                };
                let draft = &card.draft;
                match field {
                    CardField::Name => draft.name.clone(),
                    CardField::Race => copy.race_line(draft.race),
                    CardField::Class => copy.class_line(draft.class),
                    CardField::StatLines => Stat::ALL
                        .get(k)
                        .map(|stat| copy.stat_line(*stat, draft.stats.get(*stat)))
                        .unwrap_or_default(),
                    CardField::Delete => copy.delete_text.clone(),
                }
            }
            Node::El(element) => match element {
                UiElement::NameInput | UiElement::StatInput(_) => String::new(),
                UiElement::RaceSelect => Race::ALL
                    .iter()
                    .map(|r| r.label())
                    .collect::<Vec<_>>()
                    .join("\n"),
                UiElement::RaceOption(race) => race.label().to_string(),
                UiElement::ClassButton(class) | UiElement::ClassLabel(class) => {
                    class.label().to_string()
                }
                UiElement::SelectedClass => String::new(),
                UiElement::StatLabel(stat) => copy.stat_label(stat).to_string(),
                UiElement::SubmitButton => copy.submit_text.clone(),
                UiElement::PointsLeft => self.points_text(state, now),
                UiElement::PointsHeading => {
                    format!("{} {}", copy.points_label, self.points_text(state, now))
                }
                UiElement::Popup => state
                    .popup
                    .as_ref()
                    .filter(|_| popup_visible(state, now))
                    .map(|p| p.text.clone())
                    .unwrap_or_default(),
                UiElement::PopupClose => "×".to_string(),
                UiElement::CookieAccept => "Akceptuj wszystkie".to_string(),
                UiElement::RosterContainer => state
                    .cards
                    .iter()
                    .filter(|card| card.visible_at <= now)
                    .map(|card| self.card_text(&card.draft))
                    .collect::<Vec<_>>()
                    .join("\n"),
                UiElement::RosterCards => String::new(),
                UiElement::MainTitle => copy.main_title.clone(),
                UiElement::MainDescription => format!(
                    "{} swoich bohaterów, a następnie rozdziel punkty cech.",
                    copy.description
                ),
                UiElement::FormTitle => copy.form_title.clone(),
                UiElement::NameLabel => copy.name_label.clone(),
                UiElement::RaceLabel => copy.race_label.clone(),
                UiElement::ClassHeading => copy.class_heading.clone(),
                UiElement::StatsHeading => copy.stats_heading.clone(),
                UiElement::ListTitle => copy.list_title.clone(),
            },
        }
    }

    fn submit(&self, state: &mut AppState, now: Instant) {
        let faults = self.options.faults;
        if faults.ignore_submit {
            return;
        }
        let popup_at = now + self.options.popup_delay;
        let settled_class = state
            .selected
            .iter()
            .rev()
            .find(|(_, at)| *at <= now)
            .map(|(class, _)| *class);
        let Some(class) = settled_class else {
            state.popup = Some(Popup {
                text: self.options.missing_class_message.clone(),
                visible_at: popup_at,
            });
            return;
        };
        let stats = parse_stats(&state.stats);
        let valid = stats.is_some_and(|s| self.options.budget.is_valid(&s));
        let stats = match stats {
            Some(stats) if valid || faults.accept_unspent => stats,
            _ => {
                state.popup = Some(Popup {
                    text: self.options.rejection_message.clone(),
                    visible_at: popup_at,
                });
                return;
            }
        };

        let name = match (&self.options.default_name, state.name.trim().is_empty()) {
            (Some(fallback), true) => fallback.clone(),
            _ => state.name.clone(),
        };
        let draft = CharacterDraft::new(name, state.race, class, stats);
        let visible_at = now + self.options.render_delay;
        state.cards.push(Card {
            draft: draft.clone(),
            visible_at,
        });
        if faults.duplicate_cards {
            state.cards.push(Card {
                draft: draft.clone(),
                visible_at,
            });
        }
        state.storage.push(draft);
        if self.options.popup_mode == PopupMode::Acknowledge {
            state.popup = Some(Popup {
                text: self.options.ack_message.clone(),
                visible_at: popup_at,
            });
        }
    }

    fn click_node(&self, state: &mut AppState, node: Node, now: Instant) {
        match node {
            Node::El(UiElement::ClassButton(class)) => {
                let settle = now + self.options.select_settle;
                if self.options.faults.sticky_class_selection {
                    state.selected.retain(|(c, _)| *c != class);
                    state.selected.push((class, settle));
                } else {
                    state.selected = vec![(class, settle)];
                }
            }
            Node::El(UiElement::SubmitButton) => self.submit(state, now),
            Node::El(UiElement::PopupClose) => {
                if !self.options.faults.stuck_popup {
                    state.popup = None;
                }
            }
            Node::El(UiElement::CookieAccept) => {
                state.cookie_visible = false;
                state.cookie_accepted = true;
            }
            Node::Field(index, CardField::Delete, _) => {
                if index < state.cards.len() {
                    let removed = state.cards.remove(index);
                    if let Some(pos) = state.storage.iter().position(|d| *d == removed.draft) {
                        state.storage.remove(pos);
                    }
                }
            }
            _ => {}
        }
    }
}

fn popup_visible(state: &AppState, now: Instant) -> bool {
    state.popup.as_ref().is_some_and(|p| p.visible_at <= now)
}

fn parse_stats(raw: &[String; 4]) -> Option<Stats> {
    let mut values = [0u32; 4];
    for (slot, text) in values.iter_mut().zip(raw) {
        *slot = text.trim().parse().ok()?;
    }
    Some(Stats::from(values))
}

fn host_of(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    rest.split(['/', ':', '?', '#']).next().unwrap_or(rest)
}

#[async_trait]
impl PageDriver for SimulatedCreator {
    async fn goto(&self, url: &str) -> ProbeResult<()> {
        let mut state = self.state();
        Self::ensure_open(&state)?;
        Self::record(&mut state, format!("goto:{url}"));
        if host_of(url).ends_with(".invalid") {
            return Err(ProbeError::driver("net::ERR_NAME_NOT_RESOLVED"));
        }
        self.load(&mut state, url);
        Ok(())
    }

    async fn reload(&self) -> ProbeResult<()> {
        let mut state = self.state();
        Self::ensure_open(&state)?;
        Self::record(&mut state, "reload".to_string());
        let url = state
            .url
            .clone()
            .ok_or_else(|| ProbeError::driver("reload before any navigation"))?;
        self.load(&mut state, &url);
        Ok(())
    }

    async fn current_url(&self) -> ProbeResult<String> {
        Ok(self.state().url.clone().unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn title(&self) -> ProbeResult<String> {
        let state = self.state();
        Ok(if state.url.is_some() {
            self.options.copy.page_title.clone()
        } else {
            String::new()
        })
    }

    async fn evaluate(&self, script: &str) -> ProbeResult<Value> {
        let mut state = self.state();
        Self::ensure_open(&state)?;
        Self::record(&mut state, "evaluate".to_string());
        if script.contains("localStorage.clear()") {
            state.storage.clear();
            return Ok(Value::Null);
        }
        if script.trim() == "document.title" {
            let title = if state.url.is_some() {
                self.options.copy.page_title.clone()
            } else {
                String::new()
            };
            return Ok(Value::String(title));
        }
        Ok(Value::Null)
    }

    async fn clear_local_storage(&self) -> ProbeResult<()> {
        let mut state = self.state();
        Self::ensure_open(&state)?;
        Self::record(&mut state, "clear_local_storage".to_string());
        state.storage.clear();
        Ok(())
    }

    async fn count(&self, locator: &Locator) -> ProbeResult<usize> {
        let state = self.state();
        Ok(self.resolve(&state, locator.selector(), Instant::now()).len())
    }

    async fn is_visible(&self, locator: &Locator) -> ProbeResult<bool> {
        let state = self.state();
        let now = Instant::now();
        Ok(self
            .resolve(&state, locator.selector(), now)
            .first()
            .is_some_and(|node| Self::visible(&state, *node, now)))
    }

    async fn text_content(&self, locator: &Locator) -> ProbeResult<Option<String>> {
        let state = self.state();
        let now = Instant::now();
        Ok(self
            .resolve(&state, locator.selector(), now)
            .first()
            .map(|node| self.text(&state, *node, now)))
    }

    async fn all_text_contents(&self, locator: &Locator) -> ProbeResult<Vec<String>> {
        let state = self.state();
        let now = Instant::now();
        Ok(self
            .resolve(&state, locator.selector(), now)
            .into_iter()
            .map(|node| self.text(&state, node, now))
            .collect())
    }

    async fn input_value(&self, locator: &Locator) -> ProbeResult<Option<String>> {
        let state = self.state();
        Ok(match self.first(&state, locator) {
            Some(Node::El(UiElement::NameInput)) => Some(state.name.clone()),
            Some(Node::El(UiElement::RaceSelect)) => Some(state.race.label().to_string()),
            Some(Node::El(UiElement::StatInput(stat))) => {
                Some(state.stats[stat_slot(stat)].clone())
            }
            _ => None,
        })
    }

    async fn attribute(&self, locator: &Locator, name: &str) -> ProbeResult<Option<String>> {
        let state = self.state();
        Ok(match (self.first(&state, locator), name) {
            (Some(Node::El(UiElement::NameInput)), "placeholder") => {
                Some(self.options.copy.name_placeholder.clone())
            }
            (Some(Node::El(UiElement::StatInput(_))), "type") => Some("number".to_string()),
            (Some(Node::El(UiElement::RaceOption(race))), "value") => {
                Some(race.label().to_string())
            }
            (Some(Node::El(UiElement::StatLabel(stat))), "for") => {
                Some(stat.field_id().to_string())
            }
            _ => None,
        })
    }

    async fn has_class(&self, locator: &Locator, class: &str) -> ProbeResult<bool> {
        let state = self.state();
        let now = Instant::now();
        Ok(match self.first(&state, locator) {
            Some(Node::El(UiElement::ClassButton(c))) => match class {
                SELECTED_MARKER => state
                    .selected
                    .iter()
                    .any(|(selected, at)| *selected == c && *at <= now),
                "class-option" => true,
                _ => false,
            },
            _ => false,
        })
    }

    async fn fill(&self, locator: &Locator, value: &str) -> ProbeResult<()> {
        let mut state = self.state();
        Self::ensure_open(&state)?;
        Self::record(&mut state, format!("fill:{locator}={value}"));
        match self.first(&state, locator) {
            Some(Node::El(UiElement::NameInput)) => {
                state.name = value.to_string();
                Ok(())
            }
            Some(Node::El(UiElement::StatInput(stat))) => {
                state.stats[stat_slot(stat)] = value.to_string();
                state.readout_ready_at = Instant::now() + self.options.readout_delay;
                Ok(())
            }
            Some(_) => Err(ProbeError::driver(format!("fill: {locator} is not a text field"))),
            None => Err(no_element("fill", locator)),
        }
    }

    async fn select_option(&self, locator: &Locator, value: &str) -> ProbeResult<()> {
        let mut state = self.state();
        Self::ensure_open(&state)?;
        Self::record(&mut state, format!("select:{locator}={value}"));
        match self.first(&state, locator) {
            Some(Node::El(UiElement::RaceSelect)) => {
                let race = value
                    .parse::<Race>()
                    .map_err(|_| ProbeError::driver(format!("select: no option '{value}'")))?;
                state.race = race;
                Ok(())
            }
            Some(_) => Err(ProbeError::driver(format!("select: {locator} is not a <select>"))),
            None => Err(no_element("select", locator)),
        }
    }

    async fn click(&self, locator: &Locator) -> ProbeResult<()> {
        let mut state = self.state();
        Self::ensure_open(&state)?;
        Self::record(&mut state, format!("click:{locator}"));
        let now = Instant::now();
        let node = self
            .resolve(&state, locator.selector(), now)
            .into_iter()
            .next()
            .ok_or_else(|| no_element("click", locator))?;
        self.click_node(&mut state, node, now);
        Ok(())
    }

    async fn close(&self) -> ProbeResult<()> {
        let mut state = self.state();
        Self::record(&mut state, "close".to_string());
        state.closed = true;
        Ok(())
    }
}

const fn stat_slot(stat: Stat) -> usize {
    match stat {
        Stat::Strength => 0,
        Stat::Dexterity => 1,
        Stat::Energy => 2,
        Stat::Health => 3,
    }
}
