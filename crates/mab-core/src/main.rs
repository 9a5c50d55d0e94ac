//! Social Bandit Experiment Runner
//!
//! Runs one experiment from a TOML configuration and writes the history
//! tables to an output directory.

use clap::Parser;
use std::collections::BTreeSet;
use std::error::Error;
use std::path::PathBuf;
use tracing::{error, info};

use mab_core::config::ExperimentConfig;
use mab_core::output::{self, ExportFormat};
use mab_core::{setup, OptionId};

/// Command line arguments for the experiment runner
#[derive(Parser, Debug)]
#[command(name = "mab_experiment")]
#[command(about = "Social imitation vs. reinforcement on a regime-switching bandit")]
struct Args {
    /// TOML configuration file (defaults to experiment.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for reproducibility (overrides the config)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of rounds to simulate (overrides the config)
    #[arg(long)]
    rounds: Option<u64>,

    /// Experiment id used in output file names (overrides the config)
    #[arg(long)]
    experiment_id: Option<u64>,

    /// Directory for the exported tables
    #[arg(long, default_value = "output")]
    output: PathBuf,

    /// Table encoding
    #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
    format: ExportFormat,

    /// Run every phase on the calling thread
    #[arg(long)]
    sequential: bool,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    if args.print_default_config {
        println!("{}", ExperimentConfig::default().to_toml()?);
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => ExperimentConfig::load(path)?,
        None => ExperimentConfig::load_or_default(),
    };
    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }
    if let Some(rounds) = args.rounds {
        config.simulation.rounds = rounds;
    }
    if let Some(experiment_id) = args.experiment_id {
        config.simulation.experiment_id = experiment_id;
    }
    if args.sequential {
        config.simulation.parallel = false;
    }
    config.validate()?;

    info!("Experiment {}", config.simulation.experiment_id);
    info!("Seed: {}", config.simulation.seed);
    info!("Rounds: {}", config.simulation.rounds);
    info!(
        "Agents: {} (softmax_prob {}, memory {:?})",
        config.agents.count, config.agents.softmax_prob, config.agents.memory
    );

    let mut simulation = setup::build_simulation(&config)?;
    let outcome = simulation.run(config.simulation.rounds);

    // Whatever completed is still exported, even if the run aborted
    let record = simulation.record();
    let paths = output::write_record(&record, &args.output, args.format)?;
    output::write_summary(&record, &args.output)?;
    for path in &paths {
        info!("  Wrote {}", path.display());
    }

    let options: BTreeSet<OptionId> = simulation
        .environment()
        .regimes()
        .iter()
        .flat_map(|regime| regime.options())
        .collect();
    for option in options {
        info!(
            "  {}: chosen in {:.1}% of agent-rounds",
            option,
            record.option_share(option) * 100.0
        );
    }

    outcome?;
    info!(
        "Simulation complete. Ran {} rounds.",
        simulation.round_num()
    );
    Ok(())
}
