//! Character creation flows against the simulated creator.
//!
//! Covers the submit synchronization protocol end to end: popup and
//! no-popup submissions, rejections, and the faults the protocol must catch.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use party_probe::prelude::*;
use party_probe::{
    Faults, PopupMode, SimulatedCreator, SimulatorOptions, SubmitOutcome, UiElement,
};
use std::sync::Arc;
use std::time::Duration;

async fn fresh(options: SimulatorOptions) -> (Arc<SimulatedCreator>, CharacterCreatorPage) {
    let sim = Arc::new(SimulatedCreator::with_options(options));
    let page = CharacterCreatorPage::new(sim.clone(), HarnessConfig::default());
    page.open_fresh().await.expect("page should open");
    (sim, page)
}

// ============================================================================
// Single character
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_legolas_added_with_matching_card() {
    let (_, page) = fresh(SimulatorOptions::default()).await;
    let draft = fixtures::legolas();

    page.form().fill(&draft).await.unwrap();
    assert_eq!(page.form().points_left().await.unwrap(), 0);
    let report = page.form().submit().await.unwrap();
    assert!(matches!(report.outcome, SubmitOutcome::Popup(ref t) if t.contains("Dodano")));
    assert_eq!((report.before, report.after), (0, 1));

    let card = page.roster().latest_card().await.unwrap();
    assert_eq!(card.name, "Legolas");
    assert_eq!(card.race_line, "Rasa: Elf");
    assert_eq!(card.class_line, "Klasa: Zwiadowca");
    assert_eq!(
        card.stat_lines,
        vec!["Siła: 15", "Spryt: 15", "Energia: 15", "Zdrowie: 10"]
    );
    assert!(page.roster().contains_by_name("Legolas").await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_silent_page_card_wins_the_race() {
    let (_, page) = fresh(SimulatorOptions {
        popup_mode: PopupMode::Silent,
        ..SimulatorOptions::default()
    })
    .await;
    page.form().fill(&fixtures::gimli()).await.unwrap();
    let report = page.form().submit().await.unwrap();
    assert_eq!(report.outcome, SubmitOutcome::NoPopup);
    assert_eq!(report.after, 1);
}

#[tokio::test(start_paused = true)]
async fn test_popup_after_card_is_dismissed() {
    let (sim, page) = fresh(SimulatorOptions {
        popup_delay: Duration::from_millis(250),
        render_delay: Duration::from_millis(100),
        ..SimulatorOptions::default()
    })
    .await;
    page.form().fill(&fixtures::gandalf()).await.unwrap();
    let report = page.form().submit().await.unwrap();
    assert!(matches!(report.outcome, SubmitOutcome::LatePopup(ref t) if t.contains("Dodano")));
    assert_eq!(sim.rendered().len(), 1);
    assert!(sim.was_called("click:popup close button"));
    let ctx = page.context();
    ctx.expect(ctx.locate(UiElement::Popup))
        .to_be_hidden()
        .await
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_blank_name_uses_page_default() {
    let (sim, page) = fresh(SimulatorOptions {
        default_name: Some("Bezimienny".to_string()),
        ..SimulatorOptions::default()
    })
    .await;
    let mut draft = fixtures::aragorn();
    draft.name = String::new();
    page.form().fill(&draft).await.unwrap();
    page.form().submit().await.unwrap();
    assert_eq!(sim.rendered()[0].name, "Bezimienny");
    assert_eq!(page.roster().names().await.unwrap(), vec!["Bezimienny"]);
}

// ============================================================================
// Party
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_four_characters_in_order() {
    let (_, page) = fresh(SimulatorOptions::default()).await;
    let party = fixtures::four_characters();
    let reports = steps::create_party(&page, &party).await.unwrap();
    assert_eq!(reports.len(), 4);
    assert_eq!(
        page.roster().names().await.unwrap(),
        vec!["Aragorn", "Legolas", "Gimli", "Gandalf"]
    );
    let count_first = page.roster().count().await.unwrap();
    let count_second = page.roster().count().await.unwrap();
    assert_eq!(count_first, count_second);
}

#[tokio::test(start_paused = true)]
async fn test_contains_by_name_is_idempotent() {
    let (_, page) = fresh(SimulatorOptions::default()).await;
    steps::create_party(&page, &fixtures::four_characters())
        .await
        .unwrap();
    let roster = page.roster();

    let present = roster.contains_by_name("Gimli").await.unwrap();
    assert!(present);
    assert_eq!(roster.contains_by_name("Gimli").await.unwrap(), present);

    let absent = roster.contains_by_name("Boromir").await.unwrap();
    assert!(!absent);
    assert_eq!(roster.contains_by_name("Boromir").await.unwrap(), absent);
    assert_eq!(roster.count().await.unwrap(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_roster_survives_reload_but_not_reset() {
    let (_, page) = fresh(SimulatorOptions::default()).await;
    let mut tracker = ScenarioTracker::new("persist");
    steps::add_character_to_list(&page, &mut tracker, &fixtures::legolas())
        .await
        .unwrap();
    page.goto().await.unwrap();
    assert_eq!(page.roster().count().await.unwrap(), 1);
    page.clear_client_state().await.unwrap();
    assert!(page.roster().is_empty().await.unwrap());
}

// ============================================================================
// Rejections and faults
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_unspent_points_rejected_with_literal_text() {
    let (sim, page) = fresh(SimulatorOptions::default()).await;
    page.form().fill(&fixtures::unspent()).await.unwrap();
    let err = page.form().submit().await.unwrap_err();
    match err {
        ProbeError::Rejection { message } => {
            assert_eq!(message, "Musisz wydać wszystkie punkty!");
        }
        other => panic!("expected rejection, got {other}"),
    }
    // Dismissal was still attempted.
    assert!(sim.was_called("click:popup close button"));
    assert!(page.roster().is_empty().await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_negated_acknowledgment_wording_is_a_rejection() {
    let message = "Nie dodano postaci: musisz wydać wszystkie punkty!";
    let (_, page) = fresh(SimulatorOptions {
        rejection_message: message.to_string(),
        ..SimulatorOptions::default()
    })
    .await;
    page.form().fill(&fixtures::unspent()).await.unwrap();
    match page.form().submit().await.unwrap_err() {
        ProbeError::Rejection { message: shown } => assert_eq!(shown, message),
        other => panic!("expected rejection, got {other}"),
    }
    assert!(page.roster().is_empty().await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_overspent_points_rejected() {
    let (_, page) = fresh(SimulatorOptions::default()).await;
    let message = steps::expect_rejection(&page, &fixtures::overspent())
        .await
        .unwrap();
    assert!(message.contains("punkty"));
}

#[tokio::test(start_paused = true)]
async fn test_ignored_submit_times_out_naming_both_states() {
    let (_, page) = fresh(SimulatorOptions {
        faults: Faults {
            ignore_submit: true,
            ..Faults::default()
        },
        ..SimulatorOptions::default()
    })
    .await;
    page.form().fill(&fixtures::legolas()).await.unwrap();
    let err = page.form().submit().await.unwrap_err();
    assert!(err.is_timeout());
    let text = err.to_string();
    assert!(text.contains("popup visible"), "{text}");
    assert!(text.contains("new roster card"), "{text}");
}

#[tokio::test(start_paused = true)]
async fn test_sticky_class_is_a_mismatch() {
    let (_, page) = fresh(SimulatorOptions {
        faults: Faults {
            sticky_class_selection: true,
            ..Faults::default()
        },
        ..SimulatorOptions::default()
    })
    .await;
    page.form()
        .select_class(CharacterClass::Warrior)
        .await
        .unwrap();
    let err = page
        .form()
        .select_class(CharacterClass::Wizard)
        .await
        .unwrap_err();
    assert!(err.is_mismatch());
    assert!(page.form().selected_class().await.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_stuck_popup_fails_dismissal() {
    let (_, page) = fresh(SimulatorOptions {
        faults: Faults {
            stuck_popup: true,
            ..Faults::default()
        },
        ..SimulatorOptions::default()
    })
    .await;
    page.form().fill(&fixtures::legolas()).await.unwrap();
    let err = page.form().submit().await.unwrap_err();
    assert!(err.is_timeout());
    assert!(err.to_string().contains("popup hidden"));
}

#[tokio::test(start_paused = true)]
async fn test_detached_roster_counts_as_empty() {
    let (_, page) = fresh(SimulatorOptions {
        faults: Faults {
            detached_roster: true,
            ..Faults::default()
        },
        ..SimulatorOptions::default()
    })
    .await;
    assert_eq!(page.roster().count().await.unwrap(), 0);
    assert!(!page.roster().contains_by_name("Legolas").await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_acknowledged_but_missing_card_names_the_popup() {
    let (_, page) = fresh(SimulatorOptions {
        faults: Faults {
            detached_roster: true,
            ..Faults::default()
        },
        ..SimulatorOptions::default()
    })
    .await;
    page.form().fill(&fixtures::legolas()).await.unwrap();
    let err = page.form().submit().await.unwrap_err();
    assert!(err.is_timeout());
    let text = err.to_string();
    assert!(text.contains("roster count 1"), "{text}");
    assert!(text.contains("Dodano postać do drużyny!"), "{text}");
}
