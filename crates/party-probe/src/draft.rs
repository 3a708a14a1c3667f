//! Character drafts: the in-memory candidates a scenario fills in and submits.
//!
//! The application speaks Polish, so every variant knows the label the page
//! renders for it. Labels round-trip through [`FromStr`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::budget::Budget;
use crate::result::{ProbeError, ProbeResult};

/// Playable race
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Race {
    /// Człowiek
    Human,
    /// Elf
    Elf,
    /// Krasnolud
    Dwarf,
    /// Ork
    Orc,
}

impl Race {
    /// Every race in the order the selector lists them
    pub const ALL: [Self; 4] = [Self::Human, Self::Elf, Self::Dwarf, Self::Orc];

    /// Label rendered by the page (also the `<option>` value)
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Human => "Człowiek",
            Self::Elf => "Elf",
            Self::Dwarf => "Krasnolud",
            Self::Orc => "Ork",
        }
    }
}

impl fmt::Display for Race {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Race {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|r| r.label() == s || format!("{r:?}").eq_ignore_ascii_case(s))
            .ok_or_else(|| ProbeError::config(format!("unknown race '{s}'")))
    }
}

/// Character class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterClass {
    /// Wojownik
    Warrior,
    /// Łotrzyk
    Rogue,
    /// Czarodziej
    Wizard,
    /// Zwiadowca
    Ranger,
}

impl CharacterClass {
    /// Every class in the order the page lays them out
    pub const ALL: [Self; 4] = [Self::Warrior, Self::Rogue, Self::Wizard, Self::Ranger];

    /// Label rendered by the page; also the accessible `alt` of the class image
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Warrior => "Wojownik",
            Self::Rogue => "Łotrzyk",
            Self::Wizard => "Czarodziej",
            Self::Ranger => "Zwiadowca",
        }
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CharacterClass {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label() == s || format!("{c:?}").eq_ignore_ascii_case(s))
            .ok_or_else(|| ProbeError::config(format!("unknown class '{s}'")))
    }
}

/// One of the four attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    /// Siła
    Strength,
    /// Spryt
    Dexterity,
    /// Energia
    Energy,
    /// Zdrowie
    Health,
}

impl Stat {
    /// Every stat in form order
    pub const ALL: [Self; 4] = [Self::Strength, Self::Dexterity, Self::Energy, Self::Health];

    /// `id` of the numeric input
    #[must_use]
    pub const fn field_id(self) -> &'static str {
        match self {
            Self::Strength => "strength",
            Self::Dexterity => "dexterity",
            Self::Energy => "energy",
            Self::Health => "health",
        }
    }

    /// Label text without the trailing colon
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Strength => "Siła",
            Self::Dexterity => "Spryt",
            Self::Energy => "Energia",
            Self::Health => "Zdrowie",
        }
    }
}

/// The four attribute values of a draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stats {
    /// Strength
    pub strength: u32,
    /// Dexterity
    pub dexterity: u32,
    /// Energy
    pub energy: u32,
    /// Health
    pub health: u32,
}

impl Stats {
    /// Create a stat block in form order
    #[must_use]
    pub const fn new(strength: u32, dexterity: u32, energy: u32, health: u32) -> Self {
        Self {
            strength,
            dexterity,
            energy,
            health,
        }
    }

    /// Value of one stat
    #[must_use]
    pub const fn get(&self, stat: Stat) -> u32 {
        match stat {
            Stat::Strength => self.strength,
            Stat::Dexterity => self.dexterity,
            Stat::Energy => self.energy,
            Stat::Health => self.health,
        }
    }

    /// Values in form order
    #[must_use]
    pub const fn to_array(&self) -> [u32; 4] {
        [self.strength, self.dexterity, self.energy, self.health]
    }
}

impl From<[u32; 4]> for Stats {
    fn from(v: [u32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.strength, self.dexterity, self.energy, self.health
        )
    }
}

/// A candidate character held in test memory, never persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterDraft {
    /// Character name
    pub name: String,
    /// Race
    pub race: Race,
    /// Class
    pub class: CharacterClass,
    /// Attribute allocation
    pub stats: Stats,
}

impl CharacterDraft {
    /// Create a draft
    #[must_use]
    pub fn new(name: impl Into<String>, race: Race, class: CharacterClass, stats: Stats) -> Self {
        Self {
            name: name.into(),
            race,
            class,
            stats,
        }
    }

    /// Whether the allocation spends the whole budget
    #[must_use]
    pub fn is_submit_ready(&self, budget: &Budget) -> bool {
        budget.is_valid(&self.stats)
    }

    /// Fail unless the draft is submit-ready under `budget`
    pub fn ensure_submit_ready(&self, budget: &Budget) -> ProbeResult<()> {
        let remaining = budget.remaining(&self.stats);
        if remaining == 0 {
            Ok(())
        } else {
            Err(ProbeError::InvalidDraft {
                name: self.name.clone(),
                reason: format!("{remaining} points left unspent (stats {})", self.stats),
            })
        }
    }
}
