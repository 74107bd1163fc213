//! Vision input: the keyboard neurons are driven by what vision sees instead
//! of at random.
//!
//! - A horizontal task looks every `horizontal_period_ms` and turns the
//!   character toward the goal.
//! - A jump task looks every `jump_period_ms`, adds a jump when the goal is
//!   above, then lets go of space.
//! - Each press the state population emits is held for `hold_ms`.

use std::sync::Arc;

use spike_sim::{Recording, SimConfig, SpikeSender};
use tracing::{debug, info, warn};

use crate::action::{Key, KeyCommand};
use crate::config::AgentConfig;
use crate::error::{AgentError, Result};
use crate::game::SharedGame;
use crate::network::{StateActorNetwork, STATE, STATE_INPUT};
use crate::vision::Vision;

/// Neurons that turn the character toward a goal `dx` pixels away.
pub fn horizontal_commands(dx: i64) -> [KeyCommand; 2] {
    if dx > 0 {
        [KeyCommand::Release(Key::Left), KeyCommand::Press(Key::Right)]
    } else {
        [KeyCommand::Release(Key::Right), KeyCommand::Press(Key::Left)]
    }
}

fn send(sender: &SpikeSender, commands: &[KeyCommand]) -> Result<()> {
    let ids: Vec<usize> = commands.iter().filter_map(|c| c.neuron()).collect();
    sender.send_spikes(STATE_INPUT, &ids)?;
    Ok(())
}

struct Looker {
    game: SharedGame,
    vision: Arc<Vision>,
    sender: SpikeSender,
    config: AgentConfig,
}

impl Looker {
    async fn offset(&self) -> Result<(i64, i64)> {
        let region = self.config.vision.region;
        let game = self.game.clone();
        let vision = Arc::clone(&self.vision);
        let detection = tokio::task::spawn_blocking(move || vision.detect(&game.capture(region)?))
            .await
            .map_err(|e| AgentError::Task(e.to_string()))??;
        Ok(detection.offset)
    }

    async fn horizontal(self) -> Result<()> {
        tokio::time::sleep(self.game.scaled(self.config.random.initial_delay_ms)).await;
        loop {
            let (dx, _) = self.offset().await?;
            send(&self.sender, &horizontal_commands(dx))?;
            tokio::time::sleep(self.game.scaled(self.config.random.horizontal_period_ms)).await;
        }
    }

    async fn jump(self) -> Result<()> {
        tokio::time::sleep(self.game.scaled(self.config.random.initial_delay_ms)).await;
        loop {
            let (dx, dy) = self.offset().await?;
            if dy < 0 {
                let [a, b] = horizontal_commands(dx);
                send(&self.sender, &[a, b, KeyCommand::Press(Key::Space)])?;
            }
            tokio::time::sleep(self.game.scaled(self.config.random.jump_period_ms)).await;
            send(&self.sender, &[KeyCommand::Release(Key::Space)])?;
        }
    }
}

/// Run the demo and return the state population's recording.
pub async fn run(config: AgentConfig, game: SharedGame) -> Result<Recording> {
    config.validate()?;
    let sim_config = SimConfig {
        time_scale: Some(config.time_scale),
        ..SimConfig::default()
    };
    let mut net = StateActorNetwork::build(sim_config)?;
    let mut rx = net.sim.live_receiver(&[STATE])?;
    let sender = net.sim.spike_sender();
    let vision = Arc::new(game.with(|g| Vision::for_game(g, config.vision.clone())));

    let looker = |config: &AgentConfig| Looker {
        game: game.clone(),
        vision: Arc::clone(&vision),
        sender: sender.clone(),
        config: config.clone(),
    };
    let tasks = [
        tokio::spawn(looker(&config).horizontal()),
        tokio::spawn(looker(&config).jump()),
    ];

    let keyboard = {
        let game = game.clone();
        let hold_ms = config.timing.hold_ms;
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                for id in event.neuron_ids {
                    // Releases are implied by the hold
                    if let Some(KeyCommand::Press(key)) = KeyCommand::from_neuron(id) {
                        debug!(?key, "holding");
                        game.press(key);
                        tokio::time::sleep(game.scaled(hold_ms)).await;
                        game.release(key);
                    }
                }
            }
        })
    };

    let run_ms = config.random.run_ms;
    let (net, summary) = tokio::task::spawn_blocking(move || {
        let summary = net.sim.run(run_ms);
        (net, summary)
    })
    .await
    .map_err(|e| AgentError::Task(e.to_string()))?;

    for task in tasks {
        task.abort();
        match task.await {
            Ok(Err(e)) => warn!(error = %e, "vision task stopped early"),
            Ok(Ok(())) | Err(_) => {}
        }
    }
    keyboard.abort();
    info!(spikes = summary.spikes, simulated_ms = summary.end_ms, "vision input finished");

    Ok(net.sim.get_data(net.state)?)
}
