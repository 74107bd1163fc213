//! Synchronous: train the actor-critic network episode by episode.
//!
//! Each episode replays the best action learned for every step so far, runs
//! the network, then plays whatever it fired. With `--iterations` the agent
//! instead repeats vision-suggested moves on a single step.
//!
//! Usage:
//!   synchronous --steps 3 --output sync_report.json

use anyhow::{Context, Result};
use clap::Parser;
use gridworld_agent::sync_learner::SyncLearner;
use gridworld_agent::{init_tracing, shared_game, Action, AgentConfig};

#[derive(Parser)]
#[command(name = "synchronous", about = "Episode-by-episode actor-critic training")]
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

    /// Run the vision-driven single-step iterations instead
    #[arg(long)]
    iterations: bool,

    /// Report output path
    #[arg(long, short, default_value = "sync_report.json")]
    output: String,
}

fn main() -> Result<()> {
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
    config.validate()?;

    eprintln!("========================================");
    eprintln!("  SYNCHRONOUS -- Actor-Critic Episodes");
    eprintln!("========================================");
    eprintln!("  Mode:       {}", if args.iterations { "vision iterations" } else { "episodes" });
    eprintln!("  Steps:      {}", config.learning.steps);
    eprintln!("  Time scale: {}", config.time_scale);
    eprintln!("  Output:     {}", args.output);
    eprintln!();

    let game = shared_game(&config)?;
    let learner = SyncLearner::new(config, game)?;
    let report = if args.iterations {
        learner.vision_iterations()?
    } else {
        learner.run()?
    };

    eprintln!();
    eprintln!("  History:");
    for record in &report.history {
        eprintln!("    {}", record);
    }
    eprintln!("  Latest weights:");
    for (step, series) in report.weights.steps.iter().enumerate() {
        let latest: Vec<String> = Action::ALL
            .into_iter()
            .filter_map(|a| series.series(a).last().map(|w| format!("{}={:.4}", a, w)))
            .collect();
        eprintln!("    step {}: {}", step, latest.join(" "));
    }
    eprintln!("  Reached goal: {}", report.reached_goal);

    report
        .write_json(&args.output)
        .with_context(|| format!("Failed to write report: {}", args.output))?;
    eprintln!("  Report written to {}", args.output);
    Ok(())
}
