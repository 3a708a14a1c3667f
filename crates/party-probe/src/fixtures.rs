//! Literal character tables used by the scenarios.
//!
//! Every valid fixture spends exactly the default budget; the unit tests
//! below hold that invariant so scenarios never discover a bad fixture
//! through a rejection popup.

use crate::draft::{CharacterClass, CharacterDraft, Race, Stats};

/// Elf ranger, 15/15/15/10
#[must_use]
pub fn legolas() -> CharacterDraft {
    CharacterDraft::new(
        "Legolas",
        Race::Elf,
        CharacterClass::Ranger,
        Stats::new(15, 15, 15, 10),
    )
}

/// Dwarf warrior, 15/10/15/15
#[must_use]
pub fn gimli() -> CharacterDraft {
    CharacterDraft::new(
        "Gimli",
        Race::Dwarf,
        CharacterClass::Warrior,
        Stats::new(15, 10, 15, 15),
    )
}

/// Human wizard, 10/15/15/15
#[must_use]
pub fn gandalf() -> CharacterDraft {
    CharacterDraft::new(
        "Gandalf",
        Race::Human,
        CharacterClass::Wizard,
        Stats::new(10, 15, 15, 15),
    )
}

/// Orc rogue, 15/15/10/15
#[must_use]
pub fn aragorn() -> CharacterDraft {
    CharacterDraft::new(
        "Aragorn",
        Race::Orc,
        CharacterClass::Rogue,
        Stats::new(15, 15, 10, 15),
    )
}

/// The party added one after another by the multi-character scenario
#[must_use]
pub fn four_characters() -> Vec<CharacterDraft> {
    vec![
        CharacterDraft::new(
            "Aragorn",
            Race::Human,
            CharacterClass::Warrior,
            Stats::new(15, 15, 15, 10),
        ),
        CharacterDraft::new(
            "Legolas",
            Race::Elf,
            CharacterClass::Ranger,
            Stats::new(10, 20, 15, 10),
        ),
        CharacterDraft::new(
            "Gimli",
            Race::Dwarf,
            CharacterClass::Warrior,
            Stats::new(20, 10, 15, 10),
        ),
        CharacterDraft::new(
            "Gandalf",
            Race::Human,
            CharacterClass::Wizard,
            Stats::new(10, 10, 25, 10),
        ),
    ]
}

/// Untouched stats: 15 points left unspent
#[must_use]
pub fn unspent() -> CharacterDraft {
    CharacterDraft::new(
        "Boromir",
        Race::Human,
        CharacterClass::Warrior,
        Stats::new(10, 10, 10, 10),
    )
}

/// Over budget by five points
#[must_use]
pub fn overspent() -> CharacterDraft {
    CharacterDraft::new(
        "Saruman",
        Race::Human,
        CharacterClass::Wizard,
        Stats::new(10, 10, 30, 10),
    )
}

/// Every named fixture, valid and invalid, for listings
#[must_use]
pub fn catalog() -> Vec<(&'static str, CharacterDraft)> {
    let mut entries = vec![
        ("legolas", legolas()),
        ("gimli", gimli()),
        ("gandalf", gandalf()),
        ("aragorn", aragorn()),
    ];
    entries.extend(
        four_characters()
            .into_iter()
            .map(|draft| ("four_characters", draft)),
    );
    entries.push(("unspent", unspent()));
    entries.push(("overspent", overspent()));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::Budget;

    #[test]
    fn test_valid_fixtures_spend_whole_budget() {
        let budget = Budget::default();
        for draft in [legolas(), gimli(), gandalf(), aragorn()]
            .into_iter()
            .chain(four_characters())
        {
            assert!(
                draft.is_submit_ready(&budget),
                "{} has {} points left",
                draft.name,
                budget.remaining(&draft.stats)
            );
        }
    }

    #[test]
    fn test_invalid_fixtures_fail_budget() {
        let budget = Budget::default();
        assert_eq!(budget.remaining(&unspent().stats), 15);
        assert_eq!(budget.remaining(&overspent().stats), -5);
        assert!(unspent().ensure_submit_ready(&budget).is_err());
    }

    #[test]
    fn test_four_characters_have_distinct_names() {
        let party = four_characters();
        let mut names: Vec<_> = party.iter().map(|d| d.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 4);
    }

    #[test]
    fn test_catalog_lists_everything() {
        let entries = catalog();
        assert_eq!(entries.len(), 10);
        assert_eq!(entries[0].1, legolas());
    }
}
