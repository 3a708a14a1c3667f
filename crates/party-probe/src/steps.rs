//! Reusable multi-step flows over the page façade.

use tracing::{info, info_span, Instrument};

use crate::draft::{CharacterDraft, Stats};
use crate::page::CharacterCreatorPage;
use crate::result::{ProbeError, ProbeResult};
use crate::scenario::{ScenarioState, ScenarioTracker};
use crate::sync::SubmitReport;

/// Apply a draft to the form without submitting
pub async fn fill_form(
    page: &CharacterCreatorPage,
    tracker: &mut ScenarioTracker,
    draft: &CharacterDraft,
) -> ProbeResult<()> {
    tracker.track(page.form().fill(draft)).await?;
    tracker.advance(ScenarioState::FormFilled)
}

/// Fill, submit, wait for the card and check it against the draft
pub async fn add_character_to_list(
    page: &CharacterCreatorPage,
    tracker: &mut ScenarioTracker,
    draft: &CharacterDraft,
) -> ProbeResult<SubmitReport> {
    let span = info_span!("add_character", name = %draft.name);
    async {
        fill_form(page, tracker, draft).await?;
        let report = tracker.track(page.form().submit()).await?;
        tracker.advance(ScenarioState::Submitted(report.outcome.clone()))?;
        tracker.advance(ScenarioState::RosterUpdated)?;

        tracker.track(page.texts().verify_latest_card(draft)).await?;
        if !tracker.track(page.roster().contains_by_name(&draft.name)).await? {
            return Err(tracker.fail(ProbeError::mismatch(
                "roster names",
                &draft.name,
                "<absent>",
            )));
        }
        tracker.advance(ScenarioState::Verified)?;
        info!(count = report.after, "character added");
        Ok(report)
    }
    .instrument(span)
    .await
}

/// Add drafts one by one, checking the roster grows by exactly one each time
pub async fn create_party(
    page: &CharacterCreatorPage,
    drafts: &[CharacterDraft],
) -> ProbeResult<Vec<SubmitReport>> {
    let mut tracker = ScenarioTracker::new("create party");
    let mut reports = Vec::with_capacity(drafts.len());
    let start = tracker.track(page.roster().count()).await?;

    for (i, draft) in drafts.iter().enumerate() {
        let report = add_character_to_list(page, &mut tracker, draft).await?;
        let expected = start + i + 1;
        let count = tracker.track(page.roster().count()).await?;
        if count != expected {
            return Err(tracker.fail(ProbeError::mismatch("roster count", expected, count)));
        }
        reports.push(report);
    }

    for draft in drafts {
        if !tracker.track(page.roster().contains_by_name(&draft.name)).await? {
            return Err(tracker.fail(ProbeError::mismatch(
                "party member",
                &draft.name,
                "<absent>",
            )));
        }
    }
    info!(size = drafts.len(), "party created");
    Ok(reports)
}

/// Submit a draft that must be refused; returns the popup text
///
/// Fails when the submission is accepted or when the roster grows anyway.
pub async fn expect_rejection(
    page: &CharacterCreatorPage,
    draft: &CharacterDraft,
) -> ProbeResult<String> {
    let span = info_span!("expect_rejection", name = %draft.name);
    async {
        let before = page.roster().count().await?;
        page.form().fill(draft).await?;
        let message = match page.form().submit().await {
            Err(ProbeError::Rejection { message }) => message,
            Err(e) => return Err(e),
            Ok(report) => {
                return Err(ProbeError::mismatch(
                    "submission outcome",
                    "rejection popup",
                    format!("accepted ({:?})", report.outcome),
                ))
            }
        };
        let after = page.roster().count().await?;
        if after != before {
            return Err(ProbeError::mismatch("roster count after rejection", before, after));
        }
        info!(%message, "submission rejected as expected");
        Ok(message)
    }
    .instrument(span)
    .await
}

/// Apply each allocation in turn and read back the points readout after each
pub async fn distribute_points(
    page: &CharacterCreatorPage,
    allocations: &[Stats],
) -> ProbeResult<Vec<i64>> {
    let mut readouts = Vec::with_capacity(allocations.len());
    for stats in allocations {
        page.form().set_stats(*stats).await?;
        readouts.push(page.form().points_left().await?);
    }
    Ok(readouts)
}
