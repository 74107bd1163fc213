//! Random spikes: six independent senders fire the keyboard neurons at random
//! intervals, and whatever the state population emits is pressed on the game.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spike_sim::{Recording, SimConfig};
use tracing::{debug, info};

use crate::action::KeyCommand;
use crate::config::AgentConfig;
use crate::error::{AgentError, Result};
use crate::game::SharedGame;
use crate::network::{StateActorNetwork, STATE, STATE_INPUT};

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

    let mut senders = Vec::with_capacity(KeyCommand::COUNT);
    for neuron in 0..KeyCommand::COUNT {
        let sender = sender.clone();
        let game = game.clone();
        let initial = config.random.initial_delay_ms;
        let max_gap = config.random.max_interval_ms;
        let mut rng = match config.learning.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(neuron as u64)),
            None => StdRng::from_entropy(),
        };
        senders.push(tokio::spawn(async move {
            tokio::time::sleep(game.scaled(initial)).await;
            // Ends once the simulation stops accepting spikes
            while sender.send_spike(STATE_INPUT, neuron).is_ok() {
                let gap = rng.gen_range(0.0..=max_gap);
                tokio::time::sleep(game.scaled(gap)).await;
            }
        }));
    }

    let keyboard = {
        let game = game.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                for id in event.neuron_ids {
                    match KeyCommand::from_neuron(id) {
                        Some(KeyCommand::Press(key)) => game.press(key),
                        Some(KeyCommand::Release(key)) => game.release(key),
                        None => continue,
                    }
                    debug!(neuron = id, time_ms = event.time_ms, "key command");
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

    for task in &senders {
        task.abort();
    }
    keyboard.abort();
    info!(spikes = summary.spikes, simulated_ms = summary.end_ms, "random spikes finished");

    Ok(net.sim.get_data(net.state)?)
}
