//! Asynchronous learner: the agent acts while the simulation keeps running.
//!
//! The network runs on a blocking thread in real time. The agent talks to it
//! only through live spikes:
//! - `input` spikes store the chosen action of a step and, repeated, reward it
//! - `critic_input` spikes just before `input` spikes punish it
//! - a `first_spike_trigger` spike replays a whole step, and the first `post`
//!   neuron of that step to cross threshold is its current best action

use std::collections::BTreeSet;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use spike_sim::{LiveSpikeReceiver, SimConfig, SpikeSender};
use tracing::{debug, info, warn};

use crate::action::{Action, Key};
use crate::config::AgentConfig;
use crate::error::{AgentError, Result};
use crate::game::SharedGame;
use crate::history::{ProgressTracker, RunReport, StepOutcome, StepRecord, WeightHistory};
use crate::network::{
    first_in_block, ActorCriticNetwork, ActorCriticOptions, FIRST_SPIKE_TRIGGER, INPUT, POST,
};
use crate::reinforcement::{self, TimedSpike};
use crate::vision::{Detection, Vision};

/// Run the asynchronous learner to completion.
pub async fn run(config: AgentConfig, game: SharedGame) -> Result<RunReport> {
    config.validate()?;
    let steps = config.learning.steps;
    let sim_config = SimConfig {
        time_scale: Some(config.time_scale),
        ..SimConfig::default()
    };
    let mut net = ActorCriticNetwork::build(sim_config, ActorCriticOptions::asynchronous(steps))?;
    let rx = net.sim.live_receiver(&[POST])?;
    let sender = net.sim.spike_sender();
    let handle = net.sim.handle();

    let budget = steps as f64 * config.learning.step_budget_ms;
    let sim_task = tokio::task::spawn_blocking(move || {
        let summary = net.sim.run(budget);
        (net, summary)
    });

    let mut agent = Agent::new(config, game.clone(), sender, rx);
    let outcome = agent.play().await;

    // Stop the network whether or not the agent finished cleanly
    handle.stop();
    let (net, summary) = sim_task.await.map_err(|e| AgentError::Task(e.to_string()))?;
    info!(
        simulated_ms = summary.end_ms,
        stopped_early = summary.stopped_early,
        "simulation finished"
    );
    outcome?;

    let final_weights = net.weights()?;
    let mut weights = WeightHistory::new(steps);
    weights.record(&final_weights);

    Ok(RunReport {
        mode: "asynchronous".into(),
        steps,
        history: agent.history,
        weights,
        final_weights,
        reached_goal: game.reached_goal(),
        recording: Some(net.sim.get_data(net.post)?),
    })
}

/// Judges each step against the one before and decides when to explore.
#[derive(Debug, Clone)]
pub struct Critic {
    progress: ProgressTracker,
    exploring: bool,
    did_explore: bool,
}

impl Critic {
    pub fn new(tolerance_px: i64) -> Self {
        Self {
            progress: ProgressTracker::new(tolerance_px),
            exploring: false,
            did_explore: false,
        }
    }

    /// Whether the next action should be explored instead of suggested.
    pub fn exploring(&self) -> bool {
        self.exploring
    }

    /// Score the offset seen after a step. A better step stops exploring; a
    /// worse one starts it unless the step before was already explored.
    pub fn assess(&mut self, offset: (i64, i64)) -> StepOutcome {
        let outcome = self.progress.assess(offset);
        match outcome {
            StepOutcome::Baseline => {}
            StepOutcome::Better => self.exploring = false,
            StepOutcome::Worse => {
                if !self.did_explore {
                    self.exploring = true;
                }
            }
        }
        self.did_explore = self.exploring;
        outcome
    }
}

/// A random action heading the other way from `suggested`.
pub fn explore<R: Rng + ?Sized>(suggested: Action, rng: &mut R) -> Action {
    let other: Vec<Action> = Action::ALL
        .into_iter()
        .filter(|a| a.is_rightward() != suggested.is_rightward())
        .collect();
    other.choose(rng).copied().unwrap_or(suggested)
}

struct Agent {
    config: AgentConfig,
    game: SharedGame,
    vision: Arc<Vision>,
    sender: SpikeSender,
    rx: LiveSpikeReceiver,
    rng: StdRng,

    /// Chosen post neuron for each step reached so far.
    best_actions: Vec<usize>,
    next_action: usize,
    critic: Critic,
    history: Vec<StepRecord>,
}

impl Agent {
    fn new(config: AgentConfig, game: SharedGame, sender: SpikeSender, rx: LiveSpikeReceiver) -> Self {
        let vision = Arc::new(game.with(|g| Vision::for_game(g, config.vision.clone())));
        let rng = match config.learning.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let critic = Critic::new(config.vision.tolerance_px);
        Self {
            config,
            game,
            vision,
            sender,
            rx,
            rng,
            best_actions: Vec::new(),
            next_action: 0,
            critic,
            history: Vec::new(),
        }
    }

    async fn pause(&self, ms: f64) {
        tokio::time::sleep(self.game.scaled(ms)).await;
    }

    async fn restart_game(&self) {
        self.game.tap(Key::Escape, self.config.timing.restart_gap_ms).await;
    }

    /// Template matching is CPU bound, so it runs off the async workers.
    async fn observe(&self) -> Result<Detection> {
        let region = self.config.vision.region;
        let vision = Arc::clone(&self.vision);
        let game = self.game.clone();
        tokio::task::spawn_blocking(move || vision.stable_detection(|| game.capture(region)))
            .await
            .map_err(|e| AgentError::Task(e.to_string()))?
    }

    async fn play(&mut self) -> Result<()> {
        let steps = self.config.learning.steps;

        self.restart_game().await;
        let detection = self.observe().await?;
        let first = Action::suggest(detection.offset.0, detection.offset.1);
        self.next_action = first.neuron(0);
        info!(offset = ?detection.offset, action = %first, "first action from vision");

        for i in 0..steps {
            for j in 0..=i {
                if j < i {
                    self.decode(j).await?;
                } else {
                    debug!(step = j, neuron = self.next_action, "sending next move");
                    self.best_actions.push(self.next_action);
                    self.sender.send_spike(INPUT, self.next_action)?;
                }
            }

            self.pause(self.config.timing.settle_ms).await;
            let commands = self.execute().await;
            self.pause(self.config.timing.observe_delay_ms).await;
            self.judge(i + 1, &commands).await?;

            if self.game.reached_goal() {
                info!(step = i, "goal reached");
            }
            self.restart_game().await;
        }
        Ok(())
    }

    /// Ask the network for step `j`'s best action by first-spike timing.
    /// Keeps the stored action if nothing answers in time.
    async fn decode(&mut self, j: usize) -> Result<()> {
        self.rx.drain();
        self.sender.send_spike(FIRST_SPIKE_TRIGGER, j)?;

        let window = self.game.scaled(self.config.timing.decode_window_ms);
        let rx = &mut self.rx;
        let first = tokio::time::timeout(window, async {
            while let Some(event) = rx.recv().await {
                if let Some(id) = first_in_block(&event, j) {
                    return Some(id);
                }
            }
            None
        })
        .await;

        match first {
            Ok(Some(id)) => {
                debug!(step = j, neuron = id, action = %Action::from_neuron(id), "first spike");
                self.best_actions[j] = id;
            }
            _ => {
                warn!(step = j, kept = self.best_actions[j], "no first spike in window");
            }
        }
        Ok(())
    }

    /// Perform every stored action once, in neuron order.
    async fn execute(&self) -> Vec<usize> {
        let commands: Vec<usize> = self
            .best_actions
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        for &id in &commands {
            self.pause(self.config.timing.action_settle_ms).await;
            let action = Action::from_neuron(id);
            debug!(neuron = id, %action, "executing");
            self.game.perform_async(action, self.config.timing.action_hold_ms).await;
        }
        commands
    }

    /// Send a schedule on the game clock, measured from its start.
    async fn reinforce(&self, schedule: &[TimedSpike]) -> Result<()> {
        let start = tokio::time::Instant::now();
        for spike in schedule {
            tokio::time::sleep_until(start + self.game.scaled(spike.at_ms)).await;
            self.sender.send_spike(spike.label, spike.neuron)?;
        }
        Ok(())
    }

    /// Look at the result of `step`, pick the next action and reinforce.
    async fn judge(&mut self, step: usize, commands: &[usize]) -> Result<()> {
        let steps = self.config.learning.steps;
        let detection = self.observe().await?;
        let (dx, dy) = detection.offset;
        let suggested = Action::suggest(dx, dy);

        // The choice follows the flag as it stood before this step is scored
        let explored = self.critic.exploring();
        let chosen = if explored {
            let pick = explore(suggested, &mut self.rng);
            info!(%suggested, explored = %pick, "exploring");
            pick
        } else {
            suggested
        };
        self.next_action = chosen.neuron(step);

        let outcome = self.critic.assess(detection.offset);
        let schedule = match outcome {
            StepOutcome::Baseline => Vec::new(),
            StepOutcome::Better => reinforcement::reward(commands, step, steps, &self.config.timing),
            StepOutcome::Worse => reinforcement::punish(commands, step, steps, &self.config.timing),
        };
        debug!(?outcome, spikes = schedule.len(), "reinforcing");
        self.reinforce(&schedule).await?;

        let record = StepRecord {
            step,
            actions: commands.iter().map(|&id| Action::from_neuron(id)).collect(),
            outcome,
            x_offset: dx,
            y_offset: dy,
            explored,
        };
        info!("{}", record);
        self.history.push(record);
        Ok(())
    }
}
