//! Synchronous learner: the simulation and the game take turns.
//!
//! Each episode replays the best known action for every step reached so far,
//! runs the network for a growing stretch of simulated time, reads the
//! plastic weights back, then executes whatever the post population fired.

use std::collections::BTreeSet;

use spike_sim::{LiveSpikeReceiver, SimConfig};
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::config::AgentConfig;
use crate::error::Result;
use crate::game::SharedGame;
use crate::history::{ProgressTracker, RunReport, StepRecord, WeightHistory};
use crate::network::{best_action, block_weights, ActorCriticNetwork, ActorCriticOptions, INPUT, POST};
use crate::vision::{Detection, Vision};

/// Start callbacks registered for the current episode.
const EPISODE_CALLBACKS: &str = "episode";

pub struct SyncLearner {
    config: AgentConfig,
    game: SharedGame,
    vision: Vision,
    net: ActorCriticNetwork,
    rx: LiveSpikeReceiver,
}

impl SyncLearner {
    /// Build a learner with `config.learning.steps` steps.
    pub fn new(config: AgentConfig, game: SharedGame) -> Result<Self> {
        config.validate()?;
        let steps = config.learning.steps;
        let sim_config = SimConfig {
            time_scale: Some(config.time_scale),
            ..SimConfig::default()
        };
        let mut net = ActorCriticNetwork::build(sim_config, ActorCriticOptions::synchronous(steps))?;
        let rx = net.sim.live_receiver(&[POST])?;
        let vision = game.with(|g| Vision::for_game(g, config.vision.clone()));

        Ok(Self {
            config,
            game,
            vision,
            net,
            rx,
        })
    }

    pub fn network(&self) -> &ActorCriticNetwork {
        &self.net
    }

    fn observe(&self) -> Result<Detection> {
        let region = self.config.vision.region;
        self.vision.stable_detection(|| self.game.capture(region))
    }

    /// Register a start callback that spikes input neuron `neuron`.
    fn schedule(&mut self, neuron: usize) {
        self.net.sim.add_start_callback(
            EPISODE_CALLBACKS,
            Box::new(move |sender| {
                if let Err(e) = sender.send_spike(INPUT, neuron) {
                    warn!(neuron, error = %e, "start spike rejected");
                }
            }),
        );
    }

    /// Post neurons that fired since the last call, sorted and deduplicated.
    fn fired(&mut self) -> BTreeSet<usize> {
        let mut fired = BTreeSet::new();
        while let Some(event) = self.rx.try_recv() {
            fired.extend(event.neuron_ids);
        }
        fired
    }

    fn execute(&self, fired: &BTreeSet<usize>) -> Vec<Action> {
        let hold = self.config.timing.hold_ms;
        fired
            .iter()
            .map(|&id| {
                let action = Action::from_neuron(id);
                debug!(neuron = id, %action, "executing");
                self.game.perform(action, hold);
                action
            })
            .collect()
    }

    /// Run every episode and return the report.
    pub fn run(mut self) -> Result<RunReport> {
        let steps = self.net.steps;
        let mut weights_history = WeightHistory::new(steps);
        let mut history = Vec::with_capacity(steps);
        let mut progress = ProgressTracker::new(self.config.vision.tolerance_px);
        let mut weights = self.net.weights()?;

        for i in 0..steps {
            self.game.restart();

            if i == 0 {
                let detection = self.observe()?;
                let action = Action::suggest(detection.offset.0, detection.offset.1);
                info!(offset = ?detection.offset, %action, "first action from vision");
                self.schedule(action.neuron(0));
            } else {
                for j in 0..=i {
                    let action = best_action(&block_weights(&weights, j)?);
                    debug!(step = j, %action, "replaying best action");
                    self.schedule(action.neuron(j));
                }
            }

            self.rx.drain();
            let duration = self.config.learning.base_run_ms + i as f64 * self.config.learning.run_increment_ms;
            let summary = self.net.sim.run(duration);
            info!(episode = i, duration, spikes = summary.spikes, "episode simulated");

            weights = self.net.weights()?;
            weights_history.record(&weights);

            let fired = self.fired();
            let actions = self.execute(&fired);
            let detection = self.observe()?;
            let record = StepRecord {
                step: i,
                actions,
                outcome: progress.assess(detection.offset),
                x_offset: detection.offset.0,
                y_offset: detection.offset.1,
                explored: false,
            };
            info!("{}", record);
            history.push(record);

            self.net.sim.clear_start_callbacks(EPISODE_CALLBACKS);
        }

        Ok(RunReport {
            mode: "synchronous".into(),
            steps,
            history,
            weights: weights_history,
            final_weights: weights,
            reached_goal: self.game.reached_goal(),
            recording: Some(self.net.sim.get_data(self.net.post)?),
        })
    }

    /// Vision-driven iterations on step 0's block.
    ///
    /// Each iteration adds a start callback for the action vision suggests
    /// right now. Callbacks accumulate, so later runs replay every earlier
    /// suggestion too.
    pub fn vision_iterations(mut self) -> Result<RunReport> {
        let iterations = self.config.learning.iterations;
        let mut weights_history = WeightHistory::new(1);
        let mut history = Vec::with_capacity(iterations);
        let mut progress = ProgressTracker::new(self.config.vision.tolerance_px);

        for it in 0..iterations {
            let detection = self.observe()?;
            let action = Action::suggest(detection.offset.0, detection.offset.1);
            info!(iteration = it, offset = ?detection.offset, %action, "vision suggestion");
            self.schedule(action.neuron(0));

            self.rx.drain();
            self.net.sim.run(self.config.learning.iteration_run_ms);

            let w = self.net.action_weights(0)?;
            weights_history.record(&w);

            let fired = self.fired();
            let actions = self.execute(&fired);
            history.push(StepRecord {
                step: it,
                actions,
                outcome: progress.assess(detection.offset),
                x_offset: detection.offset.0,
                y_offset: detection.offset.1,
                explored: false,
            });
        }

        Ok(RunReport {
            mode: "vision-iterations".into(),
            steps: 1,
            history,
            weights: weights_history,
            final_weights: self.net.weights()?,
            reached_goal: self.game.reached_goal(),
            recording: Some(self.net.sim.get_data(self.net.post)?),
        })
    }
}
