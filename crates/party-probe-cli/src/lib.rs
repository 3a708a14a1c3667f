//! party-probe CLI library
//!
//! Command-line front end for the character creator harness: list the
//! scenario catalog, run it against the live page or the simulator, and
//! check point allocations offline.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
mod output;
mod runner;

pub use commands::{
    BudgetArgs, Cli, ColorArg, Commands, FixturesArgs, ListArgs, RunArgs, Target,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{format_duration, ProgressReporter};
pub use runner::{budget, fixtures, harness_config, list, select_scenarios, RunReport, ScenarioRunner};
