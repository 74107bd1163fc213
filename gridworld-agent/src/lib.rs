//! Gridworld Agent: spiking actor-critic agents that learn to play a small
//! platformer from template-matched vision.

pub mod action;
pub mod async_learner;
pub mod config;
pub mod error;
pub mod frame;
pub mod game;
pub mod history;
pub mod network;
pub mod random_spikes;
pub mod reinforcement;
pub mod sync_learner;
pub mod vision;
pub mod vision_input;

pub use action::{Action, Key, KeyCommand};
pub use config::AgentConfig;
pub use error::{AgentError, Result};
pub use frame::{Frame, Region};
pub use game::{GameConfig, Platformer, SharedGame};
pub use history::{RunReport, StepOutcome, StepRecord, WeightHistory};
pub use vision::{Detection, Vision};

/// Install the global `tracing` subscriber. `RUST_LOG` overrides `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Build the live game a config describes.
pub fn shared_game(config: &AgentConfig) -> Result<SharedGame> {
    let game = Platformer::new(config.game.clone())?;
    Ok(SharedGame::new(game, config.time_scale))
}
