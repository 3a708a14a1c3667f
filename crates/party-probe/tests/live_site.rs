//! Scenarios against the live page through Chromium.
//!
//! Needs network access and a Chromium install; run with
//! `cargo test -p party-probe --features browser -- --ignored`.
//! `PARTY_PROBE_URL` and `PARTY_PROBE_CHROMIUM` are honoured.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use party_probe::prelude::*;
use party_probe::{catalog, Browser};
use std::sync::Arc;

async fn launch() -> (Browser, HarnessConfig) {
    let config = HarnessConfig::load(None).expect("config should load");
    let mut settings = config.browser.clone();
    settings.sandbox = false;
    let browser = Browser::launch(settings).await.expect("chromium should launch");
    (browser, config)
}

async fn run(name: &str) {
    let (browser, config) = launch().await;
    let driver = browser.new_session().await.expect("session should open");
    let page = CharacterCreatorPage::new(Arc::new(driver), config);
    let scenario = catalog::find(name).expect("scenario exists");
    let outcome = scenario.execute(&page).await;
    page.close().await.ok();
    browser.close().await.ok();
    outcome.unwrap_or_else(|e| panic!("{name}: {e}"));
}

#[tokio::test]
#[ignore = "requires Chromium and network access"]
async fn test_live_page_title() {
    run("page_title").await;
}

#[tokio::test]
#[ignore = "requires Chromium and network access"]
async fn test_live_class_single_choice() {
    run("class_single_choice").await;
}

#[tokio::test]
#[ignore = "requires Chromium and network access"]
async fn test_live_distribute_points() {
    run("distribute_points").await;
}

#[tokio::test]
#[ignore = "requires Chromium and network access"]
async fn test_live_add_character() {
    run("add_character").await;
}

#[tokio::test]
#[ignore = "requires Chromium and network access"]
async fn test_live_add_four_characters() {
    run("add_four_characters").await;
}

#[tokio::test]
#[ignore = "requires Chromium and network access"]
async fn test_live_text_display() {
    run("text_display").await;
}

#[tokio::test]
#[ignore = "requires Chromium and network access"]
async fn test_live_sessions_are_isolated() {
    let (browser, config) = launch().await;
    let first = CharacterCreatorPage::new(
        Arc::new(browser.new_session().await.unwrap()),
        config.clone(),
    );
    let second = CharacterCreatorPage::new(Arc::new(browser.new_session().await.unwrap()), config);
    first.open_fresh().await.unwrap();
    second.open_fresh().await.unwrap();

    let mut tracker = ScenarioTracker::new("isolation");
    steps::add_character_to_list(&first, &mut tracker, &fixtures::legolas())
        .await
        .unwrap();
    second.goto().await.unwrap();
    assert!(second.roster().is_empty().await.unwrap());

    first.close().await.ok();
    second.close().await.ok();
    browser.close().await.ok();
}
