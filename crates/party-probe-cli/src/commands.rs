//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// party-probe: verification scenarios for the party character creator
#[derive(Parser, Debug)]
#[command(name = "party-probe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the scenario catalog
    List(ListArgs),

    /// Run scenarios against the live page or the simulator
    Run(RunArgs),

    /// Point budget arithmetic for one allocation
    Budget(BudgetArgs),

    /// Show the fixture characters
    Fixtures(FixturesArgs),
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Where scenarios run
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Target {
    /// Chromium against the configured URL
    #[default]
    Live,
    /// The in-process simulated page
    Simulated,
}

impl Target {
    /// Name used in reports
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Simulated => "simulated",
        }
    }
}

/// Arguments for the run command
#[derive(Parser, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct RunArgs {
    /// Scenario to run (repeatable; all when omitted)
    #[arg(short, long = "scenario", value_name = "NAME")]
    pub scenarios: Vec<String>,

    /// Where to run
    #[arg(long, value_enum, default_value_t = Target::Live)]
    pub target: Target,

    /// Page URL (overrides config and PARTY_PROBE_URL)
    #[arg(long)]
    pub url: Option<String>,

    /// Concurrent isolated sessions
    #[arg(short = 'j', long, default_value = "1")]
    pub jobs: usize,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Disable the Chromium sandbox (containers/CI)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Stop starting scenarios after the first failure
    #[arg(long)]
    pub fail_fast: bool,

    /// Bound for every interaction wait, in milliseconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write a JSON report here
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Arguments for the budget command
#[derive(Parser, Debug)]
pub struct BudgetArgs {
    /// Strength
    pub strength: u32,
    /// Dexterity
    pub dexterity: u32,
    /// Energy
    pub energy: u32,
    /// Health
    pub health: u32,

    /// Starting value of every stat
    #[arg(long, default_value = "10")]
    pub baseline: u32,

    /// Points to distribute on top of the baseline
    #[arg(long, default_value = "15")]
    pub pool: u32,

    /// Also list this many valid allocations
    #[arg(long, value_name = "N")]
    pub examples: Option<usize>,
}

/// Arguments for the fixtures command
#[derive(Parser, Debug)]
pub struct FixturesArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Color argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
