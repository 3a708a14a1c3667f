//! Per-scenario state machine.
//!
//! ```text
//! Idle ──► FormFilled ──► Submitted{Popup|NoPopup} ──► RosterUpdated ──► Verified
//!   ▲                                                                      │
//!   └─────────────── (Verified ──► FormFilled for the next character) ◄───┘
//!
//! any state ──► Failed(reason)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

use crate::result::{ProbeError, ProbeResult};
use crate::sync::SubmitOutcome;

/// Where a scenario stands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioState {
    /// Nothing done yet
    Idle,
    /// The form holds a draft
    FormFilled,
    /// Submit clicked and its popup outcome observed
    Submitted(SubmitOutcome),
    /// The roster grew by one
    RosterUpdated,
    /// The new card matched the draft
    Verified,
    /// Terminal failure
    Failed(String),
}

impl ScenarioState {
    /// Whether moving to `next` is allowed
    #[must_use]
    pub fn can_transition_to(&self, next: &Self) -> bool {
        matches!(
            (self, next),
            (_, Self::Failed(_))
                | (Self::Idle | Self::FormFilled | Self::Verified, Self::FormFilled)
                | (Self::FormFilled, Self::Submitted(_))
                | (Self::Submitted(_), Self::RosterUpdated)
                | (Self::RosterUpdated, Self::Verified)
        ) && !matches!(self, Self::Failed(_))
    }

    /// Whether the state is terminal-failed
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for ScenarioState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::FormFilled => write!(f, "form filled"),
            Self::Submitted(SubmitOutcome::Popup(text)) => write!(f, "submitted (popup '{text}')"),
            Self::Submitted(SubmitOutcome::LatePopup(text)) => {
                write!(f, "submitted (late popup '{text}')")
            }
            Self::Submitted(SubmitOutcome::NoPopup) => write!(f, "submitted (no popup)"),
            Self::RosterUpdated => write!(f, "roster updated"),
            Self::Verified => write!(f, "verified"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Validates and logs a scenario's transitions
#[derive(Debug, Clone)]
pub struct ScenarioTracker {
    scenario: String,
    state: ScenarioState,
    history: Vec<ScenarioState>,
}

impl ScenarioTracker {
    /// Start tracking in [`ScenarioState::Idle`]
    #[must_use]
    pub fn new(scenario: impl Into<String>) -> Self {
        Self {
            scenario: scenario.into(),
            state: ScenarioState::Idle,
            history: vec![ScenarioState::Idle],
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> &ScenarioState {
        &self.state
    }

    /// Every state visited, oldest first
    #[must_use]
    pub fn history(&self) -> &[ScenarioState] {
        &self.history
    }

    /// Move to `next`, rejecting illegal transitions
    pub fn advance(&mut self, next: ScenarioState) -> ProbeResult<()> {
        if !self.state.can_transition_to(&next) {
            return Err(ProbeError::InvalidState {
                message: format!(
                    "{}: cannot go from {} to {}",
                    self.scenario, self.state, next
                ),
            });
        }
        info!(scenario = %self.scenario, from = %self.state, to = %next, "scenario transition");
        self.history.push(next.clone());
        self.state = next;
        Ok(())
    }

    /// Record a failure and hand the error back
    pub fn fail(&mut self, error: ProbeError) -> ProbeError {
        if !self.state.is_failed() {
            warn!(scenario = %self.scenario, from = %self.state, %error, "scenario failed");
            let failed = ScenarioState::Failed(error.to_string());
            self.history.push(failed.clone());
            self.state = failed;
        }
        error
    }

    /// Run `step`, moving to [`ScenarioState::Failed`] if it errors
    pub async fn track<T, F>(&mut self, step: F) -> ProbeResult<T>
    where
        F: std::future::Future<Output = ProbeResult<T>>,
    {
        match step.await {
            Ok(value) => Ok(value),
            Err(e) => Err(self.fail(e)),
        }
    }
}
