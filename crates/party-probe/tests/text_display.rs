//! Static copy and card copy checks against the simulated creator.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use party_probe::prelude::*;
use party_probe::{SimulatedCreator, SimulatorOptions, UiCopy, UiElement};
use std::sync::Arc;

async fn fresh_with(config: HarnessConfig, options: SimulatorOptions) -> CharacterCreatorPage {
    let page = CharacterCreatorPage::new(
        Arc::new(SimulatedCreator::with_options(options)),
        config,
    );
    page.open_fresh().await.expect("page should open");
    page
}

async fn fresh() -> CharacterCreatorPage {
    fresh_with(HarnessConfig::default(), SimulatorOptions::default()).await
}

#[tokio::test(start_paused = true)]
async fn test_form_section_before_adding() {
    let page = fresh().await;
    page.texts().verify_form_section().await.unwrap();
    page.texts().verify_list_section_empty().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_latest_card_after_adding() {
    let page = fresh().await;
    let mut tracker = ScenarioTracker::new("text");
    steps::add_character_to_list(&page, &mut tracker, &fixtures::legolas())
        .await
        .unwrap();
    page.texts()
        .verify_latest_card(&fixtures::legolas())
        .await
        .unwrap();
    let err = page.texts().verify_list_section_empty().await.unwrap_err();
    assert!(err.is_mismatch());
}

#[tokio::test(start_paused = true)]
async fn test_latest_card_against_wrong_draft_names_the_field() {
    let page = fresh().await;
    let mut tracker = ScenarioTracker::new("text");
    steps::add_character_to_list(&page, &mut tracker, &fixtures::gimli())
        .await
        .unwrap();
    let mut wrong = fixtures::gimli();
    wrong.race = Race::Orc;
    let err = page.texts().verify_latest_card(&wrong).await.unwrap_err();
    let text = err.to_string();
    assert!(text.contains("latest roster card race"), "{text}");
    assert!(text.contains("Rasa: Ork"), "{text}");
    assert!(text.contains("Rasa: Krasnolud"), "{text}");
}

#[tokio::test(start_paused = true)]
async fn test_copy_drift_is_reported_with_both_values() {
    let mut config = HarnessConfig::default();
    config.copy.main_title = "Stwórz bohatera".to_string();
    let page = fresh_with(config, SimulatorOptions::default()).await;
    let err = page.texts().verify_page_headers().await.unwrap_err();
    match err {
        ProbeError::AssertionMismatch {
            subject,
            expected,
            actual,
        } => {
            assert_eq!(subject, "main title");
            assert_eq!(expected, "Stwórz bohatera");
            assert_eq!(actual, "Stwórz drużynę");
        }
        other => panic!("expected mismatch, got {other}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_copy_is_configurable_per_page() {
    let copy = UiCopy {
        list_title: "Drużyna".to_string(),
        ..UiCopy::default()
    };
    let mut config = HarnessConfig::default();
    config.copy = copy.clone();
    let page = fresh_with(
        config,
        SimulatorOptions {
            copy,
            ..SimulatorOptions::default()
        },
    )
    .await;
    let ctx = page.context();
    ctx.expect(ctx.locate(UiElement::ListTitle))
        .to_have_text("Drużyna")
        .await
        .unwrap();
}
