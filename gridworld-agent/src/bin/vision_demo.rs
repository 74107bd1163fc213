//! Vision Demo: find the character and the goal in one capture.
//!
//! Prints both positions and the offset between them, and saves the frame
//! with green boxes around the matches.
//!
//! Usage:
//!   vision-demo --output screen_capture.ppm

use anyhow::{Context, Result};
use clap::Parser;
use gridworld_agent::{init_tracing, shared_game, AgentConfig, Vision};

#[derive(Parser)]
#[command(name = "vision-demo", about = "Locate character and goal by template matching")]
struct Args {
    /// JSON config file (defaults are used when omitted)
    #[arg(long, short)]
    config: Option<String>,

    /// Annotated frame output path (binary PPM)
    #[arg(long, short, default_value = "screen_capture.ppm")]
    output: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing("info");

    let config = match &args.config {
        Some(path) => AgentConfig::load(path).with_context(|| format!("Failed to load config: {}", path))?,
        None => AgentConfig::default(),
    };

    let game = shared_game(&config)?;
    let vision = game.with(|g| Vision::for_game(g, config.vision.clone()));
    let mut frame = game.capture(config.vision.region)?;
    let detection = vision.detect(&frame)?;

    eprintln!("========================================");
    eprintln!("  VISION DEMO");
    eprintln!("========================================");
    eprintln!("  Frame:     {}x{}", frame.width(), frame.height());
    eprintln!("  Character: {:?} (score {:.4})", detection.character, detection.character_score);
    eprintln!("  Goal:      {:?} (score {:.4})", detection.goal, detection.goal_score);
    eprintln!("  xOffset:   {}", detection.offset.0);
    eprintln!("  yOffset:   {}", detection.offset.1);

    vision.annotate(&mut frame, &detection);
    frame
        .save(&args.output)
        .with_context(|| format!("Failed to write frame: {}", args.output))?;
    eprintln!("  Annotated frame written to {}", args.output);
    Ok(())
}
