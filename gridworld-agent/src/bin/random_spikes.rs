//! Random Spikes: press keys on the game from randomly timed spikes.
//!
//! Six senders fire the six keyboard neurons at uniform random intervals.
//! The state population's output is applied to the game as key presses
//! and releases.
//!
//! Usage:
//!   random-spikes --run-ms 13000 --output random_spikes.json

use anyhow::{Context, Result};
use clap::Parser;
use gridworld_agent::{init_tracing, random_spikes, shared_game, AgentConfig};

#[derive(Parser)]
#[command(name = "random-spikes", about = "Drive the game from random keyboard spikes")]
struct Args {
    /// JSON config file (defaults are used when omitted)
    #[arg(long, short)]
    config: Option<String>,

    /// Simulated run length in ms (overrides the config)
    #[arg(long)]
    run_ms: Option<f64>,

    /// Wall-clock ms per simulated ms (overrides the config)
    #[arg(long)]
    time_scale: Option<f64>,

    /// Recording output path
    #[arg(long, short, default_value = "random_spikes.json")]
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
    if let Some(run_ms) = args.run_ms {
        config.random.run_ms = run_ms;
    }
    if let Some(scale) = args.time_scale {
        config.time_scale = scale;
    }
    config.validate()?;

    eprintln!("========================================");
    eprintln!("  RANDOM SPIKES -- Keyboard Neurons");
    eprintln!("========================================");
    eprintln!("  Run:          {} ms", config.random.run_ms);
    eprintln!("  First spike:  {} ms", config.random.initial_delay_ms);
    eprintln!("  Max interval: {} ms", config.random.max_interval_ms);
    eprintln!();

    let game = shared_game(&config)?;
    let recording = random_spikes::run(config, game.clone()).await?;

    for (neuron, train) in recording.spikes.iter().enumerate() {
        eprintln!("  neuron {}: {} spikes", neuron, train.len());
    }
    eprintln!("  Final position: {:?}", game.position());

    std::fs::write(&args.output, serde_json::to_string_pretty(&recording)?)
        .with_context(|| format!("Failed to write recording: {}", args.output))?;
    eprintln!("  Recording written to {}", args.output);
    Ok(())
}
