//! Asynchronous: the agent plays while the network keeps running.
//!
//! Best actions are read back by first-spike timing, progress toward the
//! goal is rewarded, and lack of progress is punished and triggers one step
//! of exploration.
//!
//! Usage:
//!   asynchronous --steps 12 --seed 7 --output async_report.json

use anyhow::{Context, Result};
use clap::Parser;
use gridworld_agent::{async_learner, init_tracing, shared_game, AgentConfig};

#[derive(Parser)]
#[command(name = "asynchronous", about = "Live actor-critic training with first-spike decoding")]
struct Args {
    /// JSON config file (defaults are used when omitted)
    #[arg(long, short)]
    config: Option<String>,

    /// Number of steps (overrides the config)
    #[arg(long)]
    steps: Option<usize>,

    /// Wall-clock ms per simulated ms (overrides the config)
    #[arg(long)]
    time_scale: Option<f64>,

    /// Exploration seed
    #[arg(long)]
    seed: Option<u64>,

    /// Report output path
    #[arg(long, short, default_value = "async_report.json")]
    output: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing("info");

    let mut config = match &args.config {
        Some(path) => AgentConfig::load(path).with_context(|| format!("Failed to load config: {}", path))?,
        None => AgentConfig::default(),
    };
    if let Some(steps) = args.steps {
        config.learning.steps = steps;
    }
    if let Some(scale) = args.time_scale {
        config.time_scale = scale;
    }
    if args.seed.is_some() {
        config.learning.seed = args.seed;
    }
    config.validate()?;

    eprintln!("========================================");
    eprintln!("  ASYNCHRONOUS -- Live Actor-Critic");
    eprintln!("========================================");
    eprintln!("  Steps:      {}", config.learning.steps);
    eprintln!("  Budget:     {} ms simulated", config.learning.steps as f64 * config.learning.step_budget_ms);
    eprintln!("  Time scale: {}", config.time_scale);
    eprintln!("  Output:     {}", args.output);
    eprintln!();

    let game = shared_game(&config)?;
    let report = async_learner::run(config, game).await?;

    eprintln!();
    eprintln!("  History:");
    for record in &report.history {
        eprintln!("    {}", record);
    }
    eprintln!("  Reached goal: {}", report.reached_goal);

    report
        .write_json(&args.output)
        .with_context(|| format!("Failed to write report: {}", args.output))?;
    eprintln!("  Report written to {}", args.output);
    Ok(())
}
