//! Spikes With Vision: steer the keyboard neurons from template matching.
//!
//! A horizontal task turns the character toward the goal once a second; a
//! jump task adds a jump whenever the goal is above.
//!
//! Usage:
//!   spikes-with-vision --run-ms 13000 --output vision_spikes.json

use anyhow::{Context, Result};
use clap::Parser;
use gridworld_agent::{init_tracing, shared_game, vision_input, AgentConfig};

#[derive(Parser)]
#[command(name = "spikes-with-vision", about = "Drive the keyboard neurons from vision")]
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
    #[arg(long, short, default_value = "vision_spikes.json")]
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
    eprintln!("  SPIKES WITH VISION");
    eprintln!("========================================");
    eprintln!("  Run:               {} ms", config.random.run_ms);
    eprintln!("  Horizontal period: {} ms", config.random.horizontal_period_ms);
    eprintln!("  Jump period:       {} ms", config.random.jump_period_ms);
    eprintln!();

    let game = shared_game(&config)?;
    let recording = vision_input::run(config, game.clone()).await?;

    eprintln!("  State spikes: {}", recording.spike_count());
    eprintln!("  Final position: {:?}", game.position());
    eprintln!("  Reached goal: {}", game.reached_goal());

    std::fs::write(&args.output, serde_json::to_string_pretty(&recording)?)
        .with_context(|| format!("Failed to write recording: {}", args.output))?;
    eprintln!("  Recording written to {}", args.output);
    Ok(())
}
