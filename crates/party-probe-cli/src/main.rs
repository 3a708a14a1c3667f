//! party-probe: drive the character creator scenarios from the shell
//!
//! ```bash
//! party-probe list
//! party-probe run                                   # every scenario, live page
//! party-probe run -s add_character --target simulated
//! party-probe run -j 4 --report report.json
//! party-probe budget 15 15 15 10
//! ```

use clap::Parser;
use party_probe_cli::{
    budget, fixtures, list, Cli, CliConfig, CliResult, ColorChoice, Commands, ScenarioRunner,
    Verbosity,
};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_tracing(config.verbosity);

    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Commands::List(args) => list(&args, &mut stdout),
        Commands::Budget(args) => budget(&args, &mut stdout),
        Commands::Fixtures(args) => fixtures(&args, &mut stdout),
        Commands::Run(args) => {
            let runner = ScenarioRunner::new(config, &args)?;
            runner.run(args.report.as_deref()).map(|_| ())
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(ColorChoice::from(cli.color.clone()))
}

fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
