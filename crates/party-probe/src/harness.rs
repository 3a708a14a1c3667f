//! Suite runner: one isolated session per scenario.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::catalog::Scenario;
use crate::config::HarnessConfig;
use crate::driver::PageDriver;
use crate::page::CharacterCreatorPage;
use crate::result::{ProbeError, ProbeResult};
use crate::simulator::{SimulatedCreator, SimulatorOptions};

/// Opens isolated page sessions
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// A fresh page with its own client state
    async fn open_session(&self) -> ProbeResult<Arc<dyn PageDriver>>;
}

/// Sessions backed by [`SimulatedCreator`]
#[derive(Debug, Clone, Default)]
pub struct SimulatedSessions {
    options: SimulatorOptions,
}

impl SimulatedSessions {
    /// Factory producing simulators with these options
    #[must_use]
    pub const fn new(options: SimulatorOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl SessionFactory for SimulatedSessions {
    async fn open_session(&self) -> ProbeResult<Arc<dyn PageDriver>> {
        Ok(Arc::new(SimulatedCreator::with_options(self.options.clone())))
    }
}

/// Coarse failure category for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// An awaited state never materialized
    Timeout,
    /// The page refused a submission
    Rejection,
    /// Observed and expected values differ
    Mismatch,
    /// Browser, driver, config or I/O trouble
    Infrastructure,
}

impl From<&ProbeError> for FailureKind {
    fn from(error: &ProbeError) -> Self {
        match error {
            ProbeError::Timeout { .. } => Self::Timeout,
            ProbeError::Rejection { .. } => Self::Rejection,
            ProbeError::AssertionMismatch { .. } => Self::Mismatch,
            _ => Self::Infrastructure,
        }
    }
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Scenario name
    pub name: String,
    /// Whether the scenario passed
    pub passed: bool,
    /// Whether the scenario was never started
    #[serde(default)]
    pub skipped: bool,
    /// Error message if failed
    pub error: Option<String>,
    /// Failure category if failed
    pub failure: Option<FailureKind>,
    /// Scenario duration
    #[serde(with = "duration_ms")]
    pub duration: Duration,
}

impl ScenarioResult {
    /// Create a passing result
    #[must_use]
    pub fn pass(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            skipped: false,
            error: None,
            failure: None,
            duration: Duration::ZERO,
        }
    }

    /// Create a failing result
    #[must_use]
    pub fn fail(name: impl Into<String>, error: &ProbeError) -> Self {
        Self {
            name: name.into(),
            passed: false,
            skipped: false,
            error: Some(error.to_string()),
            failure: Some(FailureKind::from(error)),
            duration: Duration::ZERO,
        }
    }

    /// Create a result for a scenario that was not run
    #[must_use]
    pub fn skip(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            skipped: true,
            error: None,
            failure: None,
            duration: Duration::ZERO,
        }
    }

    /// Set duration
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Results from running a suite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResults {
    /// Suite name
    pub suite_name: String,
    /// Individual results, in catalog order
    pub results: Vec<ScenarioResult>,
    /// Total duration
    #[serde(with = "duration_ms")]
    pub duration: Duration,
}

impl SuiteResults {
    /// Check if every scenario passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    /// Count passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    /// Count failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| !r.passed && !r.skipped)
            .count()
    }

    /// Count skipped scenarios
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.results.iter().filter(|r| r.skipped).count()
    }

    /// Get total scenario count
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Get failed scenarios
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioResult> {
        self.results
            .iter()
            .filter(|r| !r.passed && !r.skipped)
            .collect()
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

/// Runs scenarios against sessions from a [`SessionFactory`]
#[derive(Debug, Clone)]
pub struct TestHarness {
    /// Stop starting scenarios after the first failure
    pub fail_fast: bool,
    /// Concurrent sessions
    pub jobs: usize,
    config: HarnessConfig,
}

impl TestHarness {
    /// Create a harness running one scenario at a time
    #[must_use]
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            fail_fast: false,
            jobs: 1,
            config,
        }
    }

    /// Enable fail-fast mode
    #[must_use]
    pub const fn with_fail_fast(mut self) -> Self {
        self.fail_fast = true;
        self
    }

    /// Run up to `jobs` sessions at once
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Configuration each page is built with
    #[must_use]
    pub const fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Run one scenario in its own session
    pub async fn run_scenario(
        &self,
        scenario: &Scenario,
        factory: &dyn SessionFactory,
    ) -> ScenarioResult {
        let start = Instant::now();
        let driver = match factory.open_session().await {
            Ok(driver) => driver,
            Err(e) => {
                error!(scenario = scenario.name, error = %e, "could not open session");
                return ScenarioResult::fail(scenario.name, &e).with_duration(start.elapsed());
            }
        };
        let page = CharacterCreatorPage::new(driver, self.config.clone());
        let outcome = scenario.execute(&page).await;
        if let Err(e) = page.close().await {
            warn!(scenario = scenario.name, error = %e, "could not close session");
        }
        let result = match outcome {
            Ok(()) => {
                info!(scenario = scenario.name, "scenario passed");
                ScenarioResult::pass(scenario.name)
            }
            Err(e) => {
                error!(scenario = scenario.name, error = %e, "scenario failed");
                ScenarioResult::fail(scenario.name, &e)
            }
        };
        result.with_duration(start.elapsed())
    }

    /// Run a suite, calling `on_result` as each scenario finishes
    pub async fn run<F>(
        &self,
        suite_name: &str,
        scenarios: &[Scenario],
        factory: &dyn SessionFactory,
        on_result: F,
    ) -> SuiteResults
    where
        F: Fn(&ScenarioResult) + Send + Sync,
    {
        let start = Instant::now();
        let failed = AtomicBool::new(false);
        let (failed, on_result) = (&failed, &on_result);

        let mut indexed: Vec<(usize, ScenarioResult)> = stream::iter(scenarios.iter().enumerate())
            .map(|(index, scenario)| async move {
                let result = if self.fail_fast && failed.load(Ordering::SeqCst) {
                    ScenarioResult::skip(scenario.name)
                } else {
                    self.run_scenario(scenario, factory).await
                };
                if !result.passed && !result.skipped {
                    failed.store(true, Ordering::SeqCst);
                }
                on_result(&result);
                (index, result)
            })
            .buffer_unordered(self.jobs)
            .collect()
            .await;
        indexed.sort_by_key(|(index, _)| *index);

        SuiteResults {
            suite_name: suite_name.to_string(),
            results: indexed.into_iter().map(|(_, r)| r).collect(),
            duration: start.elapsed(),
        }
    }
}
