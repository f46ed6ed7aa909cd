use std::io;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing::error;
use tracing_subscriber::EnvFilter;

use rescuebot::{
    config::Config,
    import::{import_scenarios, ImportError},
    menu::{Menu, MenuSettings},
    rng::scenario_rng,
};

const WELCOME: &str = include_str!("../assets/welcome.ascii");

#[derive(Debug, Parser)]
#[command(author, version, about = "RescueBot disaster triage assistant")]
struct Cli {
    /// Scenarios CSV file to judge or simulate instead of generated ones
    #[arg(short = 's', long)]
    scenarios: Option<PathBuf>,

    /// Decision log path (uses the configured log path when omitted)
    #[arg(short = 'l', long)]
    log: Option<PathBuf>,

    /// Path to a YAML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Seed for reproducible scenario generation
    #[arg(long)]
    seed: Option<u64>,

    /// Print audit reports as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::from_yaml(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    init_tracing(&config.logging.level);

    print!("{WELCOME}");

    let imported = match &cli.scenarios {
        Some(path) => match import_scenarios(path) {
            Ok(outcome) => {
                for warning in &outcome.warnings {
                    println!("{warning}");
                }
                println!("{} scenarios imported.", outcome.scenarios.len());
                Some(outcome.scenarios)
            }
            Err(ImportError::NotFound(_)) => {
                println!("could not find scenarios file.");
                Cli::command().print_help()?;
                process::exit(1);
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("importing scenarios from {}", path.display()))
            }
        },
        None => None,
    };

    let settings = MenuSettings {
        log_path: cli.log.unwrap_or(config.log_path),
        batch_size: config.batch_size,
        min_simulations: config.min_simulations,
        json: cli.json,
    };
    let rng = scenario_rng(cli.seed.or(config.random_seed));

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut menu = Menu::new(stdin.lock(), stdout.lock(), rng, settings);
    if let Some(scenarios) = imported {
        menu = menu.with_scenarios(scenarios);
    }
    if let Err(err) = menu.run() {
        error!(%err, "RescueBot stopped");
        process::exit(1);
    }
    Ok(())
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
