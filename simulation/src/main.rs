//! Habitat headless runner
//!
//! Seeds a world from a JSON config (or the built-in defaults) and steps it.

use clap::Parser;
use simulation::{FieldStats, SimulationConfig, SimulationWorld};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Run the habitat simulation without a display
#[derive(Parser, Debug)]
#[command(name = "habitat")]
#[command(about = "Step a predator/prey grid simulation and log population counts")]
struct Args {
    /// JSON config file; built-in dinosaur ecosystem when omitted
    config: Option<std::path::PathBuf>,

    /// Number of steps to run
    #[arg(long, default_value_t = 500)]
    steps: u64,

    /// Run exactly one step
    #[arg(long, conflicts_with = "steps")]
    step: bool,

    /// Override the config's random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Log every tick
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    info!("Habitat simulation starting (seed {})", config.seed);
    let mut world = SimulationWorld::new(config)?;
    world.seed_population();

    let steps = if args.step { 1 } else { args.steps };
    let start = std::time::Instant::now();
    let mut stats = FieldStats;
    let mut done = 0;
    while done < steps {
        let chunk = (steps - done).min(50);
        let summary = world.run(chunk, &mut stats);
        done += summary.steps_run;
        let snap = &summary.final_snapshot;
        info!(
            "Step {} [{} / {}]: {:?}",
            snap.step, snap.time_of_day, snap.weather, snap.counts
        );
        if summary.stopped_early {
            info!("Population no longer viable, stopping");
            break;
        }
    }

    let elapsed = start.elapsed();
    info!(
        "Finished: {} steps in {:?}, {} actors alive",
        world.step(),
        elapsed,
        world.population()
    );

    Ok(())
}
