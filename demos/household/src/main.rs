//! household — runs a huum scenario and writes its series to CSV.
//!
//! ```text
//! household --scenario demos/household/scenario.toml --output output/household
//! ```
//!
//! `RUST_LOG` takes precedence over `--log-level`; `huum::arbiter=trace`
//! shows every want draw.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use huum_output::{OutputFilter, SimOutputObserver};
use huum_sim::{ScenarioData, SimBuilder};

#[derive(Parser)]
#[command(name = "household", about = "Household utility usage simulation")]
struct Cli {
    /// Scenario file (TOML)
    #[arg(short, long, default_value = "demos/household/scenario.toml")]
    scenario: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = "output/household")]
    output: PathBuf,

    /// Override the scenario's seed
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many ticks instead of at the scenario's end
    #[arg(long)]
    ticks: Option<u64>,

    /// Override the output filter: none, all or changes
    #[arg(long)]
    filter: Option<OutputFilter>,

    /// Default log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    // 1. Load and build.
    let data = ScenarioData::load(&cli.scenario)
        .with_context(|| format!("loading {}", cli.scenario.display()))?;
    let mut builder = SimBuilder::new(data);
    if let Some(seed) = cli.seed {
        builder = builder.seed(seed);
    }
    let mut sim = builder.build().context("building the scenario")?;
    info!(
        title = %sim.title,
        start = %sim.config.start,
        end = %sim.config.end,
        ticks = sim.clock.total_ticks(),
        seed = sim.config.seed,
        "scenario ready"
    );

    // 2. Set up output.
    let mut obs = SimOutputObserver::new(&cli.output, &sim.output)?;
    if let Some(filter) = cli.filter {
        obs = obs.with_filter(filter);
    }

    // 3. Run.
    let t0 = Instant::now();
    match cli.ticks {
        Some(n) => {
            sim.run_ticks(n, &mut obs)?;
            sim.finish(&mut obs);
        }
        None => sim.run(&mut obs)?,
    }
    let elapsed = t0.elapsed();

    if let Some(e) = obs.take_error() {
        bail!("output error: {e}");
    }

    // 4. Summary.
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  ticks           : {}", sim.clock.current_tick.0);
    println!("  effects executed: {}", sim.world.executed());
    println!("  files written   : {} ({} filter) in {}", obs.file_count(), obs.filter(), cli.output.display());
    println!();

    println!("{:<12} {:<16} {:<20}", "Agent", "Status", "Next change");
    println!("{}", "-".repeat(48));
    for agent in &sim.world.agents {
        println!(
            "{:<12} {:<16} {:<20}",
            agent.name,
            agent.lifecycle.status(),
            agent.lifecycle.next_change().to_string(),
        );
    }
    println!();

    println!("{:<16} {:>12}", "Storage", "Volume");
    println!("{}", "-".repeat(29));
    for storage in &sim.world.storages {
        println!("{:<16} {:>12.2}", storage.name, storage.volume());
    }

    Ok(())
}
