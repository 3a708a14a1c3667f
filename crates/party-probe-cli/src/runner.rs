//! Subcommand implementations

use chrono::{DateTime, Utc};
use party_probe::{
    catalog, fixtures, Budget, HarnessConfig, Scenario, SessionFactory, SimulatedSessions,
    Stats, SuiteResults, TestHarness,
};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::commands::{BudgetArgs, FixturesArgs, ListArgs, RunArgs, Target};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;

/// Report file written by `run --report`
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    /// When the run finished
    pub generated_at: DateTime<Utc>,
    /// `live` or `simulated`
    pub target: &'static str,
    /// Page the scenarios ran against
    pub base_url: &'a str,
    /// Per-scenario results
    pub suite: &'a SuiteResults,
}

#[derive(Serialize)]
struct ScenarioEntry {
    name: &'static str,
    summary: &'static str,
}

/// Print the scenario catalog
pub fn list(args: &ListArgs, out: &mut impl Write) -> CliResult<()> {
    let scenarios = catalog::all();
    if args.json {
        let entries: Vec<_> = scenarios
            .iter()
            .map(|s| ScenarioEntry {
                name: s.name,
                summary: s.summary,
            })
            .collect();
        serde_json::to_writer_pretty(&mut *out, &entries)?;
        writeln!(out)?;
        return Ok(());
    }
    let width = scenarios.iter().map(|s| s.name.len()).max().unwrap_or(0);
    for scenario in &scenarios {
        writeln!(out, "{:<width$}  {}", scenario.name, scenario.summary)?;
    }
    Ok(())
}

/// Print the point arithmetic for one allocation
pub fn budget(args: &BudgetArgs, out: &mut impl Write) -> CliResult<()> {
    let budget = Budget::new(args.baseline, args.pool);
    let stats = Stats::new(args.strength, args.dexterity, args.energy, args.health);
    let remaining = budget.remaining(&stats);

    writeln!(
        out,
        "Budget:     baseline {} + pool {} = {} total",
        budget.baseline,
        budget.pool,
        budget.total()
    )?;
    writeln!(out, "Allocation: {stats}")?;
    writeln!(out, "Remaining:  {remaining}")?;
    writeln!(
        out,
        "Valid:      {}",
        if budget.is_valid(&stats) { "yes" } else { "no" }
    )?;

    if let Some(n) = args.examples {
        let baseline = budget.baseline;
        writeln!(out, "Valid allocations (every stat >= {baseline}):")?;
        for example in budget.allocations_from_baseline().take(n) {
            writeln!(out, "  {example}")?;
        }
    }
    Ok(())
}

/// Print the fixture characters
pub fn fixtures(args: &FixturesArgs, out: &mut impl Write) -> CliResult<()> {
    let entries = fixtures::catalog();
    if args.json {
        let drafts: Vec<_> = entries
            .iter()
            .map(|(group, draft)| serde_json::json!({ "fixture": group, "draft": draft }))
            .collect();
        serde_json::to_writer_pretty(&mut *out, &drafts)?;
        writeln!(out)?;
        return Ok(());
    }
    let budget = Budget::default();
    for (group, draft) in &entries {
        writeln!(
            out,
            "{:<16} {:<10} {:<6} {:<8} {:<12} remaining {}",
            group,
            draft.name,
            draft.race.label(),
            draft.class.label(),
            draft.stats.to_string(),
            budget.remaining(&draft.stats)
        )?;
    }
    Ok(())
}

/// Pick scenarios by name, keeping catalog order; all when `names` is empty
pub fn select_scenarios(names: &[String]) -> CliResult<Vec<Scenario>> {
    let all = catalog::all();
    if let Some(unknown) = names.iter().find(|n| !all.iter().any(|s| s.name == n.as_str())) {
        return Err(CliError::UnknownScenario {
            name: unknown.clone(),
        });
    }
    if names.is_empty() {
        return Ok(all);
    }
    Ok(all
        .into_iter()
        .filter(|s| names.iter().any(|n| n == s.name))
        .collect())
}

/// File, environment, then command-line overrides
pub fn harness_config(args: &RunArgs) -> CliResult<HarnessConfig> {
    let mut config = HarnessConfig::load(args.config.as_deref())?;
    if let Some(url) = &args.url {
        config.base_url.clone_from(url);
    }
    if args.headed {
        config.browser.headless = false;
    }
    if args.no_sandbox {
        config.browser.sandbox = false;
    }
    if let Some(ms) = args.timeout {
        config.timeouts = config.timeouts.uniform(ms);
    }
    config.validate()?;
    Ok(config)
}

/// Executes `run`
#[derive(Debug)]
pub struct ScenarioRunner {
    config: CliConfig,
    harness: HarnessConfig,
    scenarios: Vec<Scenario>,
    target: Target,
    jobs: usize,
    fail_fast: bool,
}

impl ScenarioRunner {
    /// Resolve configuration and scenario selection
    pub fn new(config: CliConfig, args: &RunArgs) -> CliResult<Self> {
        if args.jobs == 0 {
            return Err(CliError::invalid_argument("--jobs must be at least 1"));
        }
        Ok(Self {
            config,
            harness: harness_config(args)?,
            scenarios: select_scenarios(&args.scenarios)?,
            target: args.target,
            jobs: args.jobs,
            fail_fast: args.fail_fast,
        })
    }

    /// Harness configuration in effect
    #[must_use]
    pub const fn harness_config(&self) -> &HarnessConfig {
        &self.harness
    }

    /// Scenarios that will run
    #[must_use]
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Run the selection and optionally write a report
    pub fn run(&self, report: Option<&Path>) -> CliResult<SuiteResults> {
        let runtime = tokio::runtime::Runtime::new().map_err(|e| CliError::Runtime {
            message: e.to_string(),
        })?;
        let results = runtime.block_on(self.run_async())?;
        if let Some(path) = report {
            self.write_report(path, &results)?;
        }
        if results.failed_count() > 0 {
            return Err(CliError::ScenariosFailed {
                failed: results.failed_count(),
                total: results.total(),
            });
        }
        Ok(results)
    }

    async fn run_async(&self) -> CliResult<SuiteResults> {
        info!(
            target_kind = self.target.as_str(),
            url = %self.harness.base_url,
            scenarios = self.scenarios.len(),
            "starting run"
        );
        match self.target {
            Target::Simulated => Ok(self.run_with(&SimulatedSessions::default()).await),
            Target::Live => self.run_live().await,
        }
    }

    #[cfg(feature = "browser")]
    async fn run_live(&self) -> CliResult<SuiteResults> {
        let browser = party_probe::Browser::launch(self.harness.browser.clone()).await?;
        let results = self.run_with(&browser).await;
        if let Err(e) = browser.close().await {
            tracing::warn!(error = %e, "browser shutdown failed");
        }
        Ok(results)
    }

    #[cfg(not(feature = "browser"))]
    async fn run_live(&self) -> CliResult<SuiteResults> {
        Err(CliError::invalid_argument(
            "live target needs the `browser` feature; use --target simulated",
        ))
    }

    async fn run_with(&self, factory: &dyn SessionFactory) -> SuiteResults {
        let verbosity = self.config.verbosity;
        let mut reporter = ProgressReporter::new(self.config.color.should_color(), verbosity.is_quiet());
        reporter.header(&format!(
            "party-probe: {} ({})",
            self.harness.base_url,
            self.target.as_str()
        ));
        reporter.start_progress(self.scenarios.len() as u64, "scenarios");

        let mut harness = TestHarness::new(self.harness.clone()).with_jobs(self.jobs);
        if self.fail_fast {
            harness = harness.with_fail_fast();
        }
        let results = harness
            .run("character-creation", &self.scenarios, factory, |result| {
                reporter.scenario_result(result);
            })
            .await;

        reporter.finish();
        reporter.summary(
            results.passed_count(),
            results.failed_count(),
            results.skipped_count(),
            results.duration,
        );
        results
    }

    fn write_report(&self, path: &Path, results: &SuiteResults) -> CliResult<()> {
        let report = RunReport {
            generated_at: Utc::now(),
            target: self.target.as_str(),
            base_url: &self.harness.base_url,
            suite: results,
        };
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::report_generation(e.to_string()))?;
        std::fs::write(path, json)?;
        debug!(path = %path.display(), "report written");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::Parser;

    fn run_args(argv: &[&str]) -> RunArgs {
        let mut full = vec!["run"];
        full.extend_from_slice(argv);
        RunArgs::parse_from(full)
    }

    mod selection_tests {
        use super::*;

        #[test]
        fn test_empty_selects_everything() {
            assert_eq!(select_scenarios(&[]).unwrap().len(), catalog::all().len());
        }

        #[test]
        fn test_selection_keeps_catalog_order() {
            let names = vec!["add_character".to_string(), "page_title".to_string()];
            let picked: Vec<_> = select_scenarios(&names)
                .unwrap()
                .into_iter()
                .map(|s| s.name)
                .collect();
            assert_eq!(picked, vec!["page_title", "add_character"]);
        }

        #[test]
        fn test_unknown_name_is_an_error() {
            let err = select_scenarios(&["teleport".to_string()]).unwrap_err();
            assert!(matches!(err, CliError::UnknownScenario { name } if name == "teleport"));
        }
    }

    mod config_tests {
        use super::*;

        #[test]
        fn test_overrides_apply() {
            let config = harness_config(&run_args(&[
                "--url",
                "http://localhost:8080/",
                "--headed",
                "--no-sandbox",
                "--timeout",
                "900",
            ]))
            .unwrap();
            assert_eq!(config.base_url, "http://localhost:8080/");
            assert!(!config.browser.headless);
            assert!(!config.browser.sandbox);
            assert_eq!(config.timeouts.submit_ms, 900);
        }

        #[test]
        fn test_non_http_url_rejected() {
            let err = harness_config(&run_args(&["--url", "ftp://example.com"])).unwrap_err();
            assert!(matches!(err, CliError::Probe(_)));
        }

        #[test]
        fn test_zero_jobs_rejected() {
            let err = ScenarioRunner::new(CliConfig::default(), &run_args(&["-j", "0"])).unwrap_err();
            assert!(matches!(err, CliError::InvalidArgument { .. }));
        }
    }

    mod output_tests {
        use super::*;

        #[test]
        fn test_budget_output() {
            let args = BudgetArgs {
                strength: 5,
                dexterity: 4,
                energy: 3,
                health: 3,
                baseline: 10,
                pool: 15,
                examples: None,
            };
            let mut out = Vec::new();
            budget(&args, &mut out).unwrap();
            let text = String::from_utf8(out).unwrap();
            assert!(text.contains("Remaining:  40"));
            assert!(text.contains("Valid:      no"));
        }

        #[test]
        fn test_budget_examples_respect_baseline() {
            let args = BudgetArgs {
                strength: 15,
                dexterity: 15,
                energy: 15,
                health: 10,
                baseline: 10,
                pool: 15,
                examples: Some(2),
            };
            let mut out = Vec::new();
            budget(&args, &mut out).unwrap();
            let text = String::from_utf8(out).unwrap();
            assert!(text.contains("Valid:      yes"));
            assert!(text.contains("  10/10/10/25"));
            assert!(text.contains("  10/10/11/24"));
        }

        #[test]
        fn test_budget_examples_with_large_baseline() {
            let args = BudgetArgs {
                strength: 1000,
                dexterity: 1000,
                energy: 1000,
                health: 1015,
                baseline: 1000,
                pool: 15,
                examples: Some(2),
            };
            let mut out = Vec::new();
            budget(&args, &mut out).unwrap();
            let text = String::from_utf8(out).unwrap();
            assert!(text.contains("Valid:      yes"));
            assert!(text.contains("  1000/1000/1000/1015"));
            assert!(text.contains("  1000/1000/1001/1014"));
        }

        #[test]
        fn test_list_json() {
            let mut out = Vec::new();
            list(&ListArgs { json: true }, &mut out).unwrap();
            let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
            assert_eq!(parsed.as_array().unwrap().len(), catalog::all().len());
            assert_eq!(parsed[0]["name"], "page_title");
        }

        #[test]
        fn test_fixtures_table() {
            let mut out = Vec::new();
            fixtures(&FixturesArgs { json: false }, &mut out).unwrap();
            let text = String::from_utf8(out).unwrap();
            assert!(text.contains("Legolas"));
            assert!(text.contains("remaining -5"));
        }
    }

    #[test]
    fn test_simulated_run_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let config = CliConfig::new().with_verbosity(crate::config::Verbosity::Quiet);
        let runner = ScenarioRunner::new(
            config,
            &run_args(&["--target", "simulated", "-s", "page_title"]),
        )
        .unwrap();
        let results = runner.run(Some(&path)).unwrap();
        assert!(results.all_passed());

        let report: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(report["target"], "simulated");
        assert_eq!(report["suite"]["results"][0]["name"], "page_title");
        assert!(report["generated_at"].is_string());
    }
}
