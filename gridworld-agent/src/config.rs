//! Agent configuration, loaded from JSON.
//!
//! Every field has a default, so a config file only needs the values it
//! changes. All durations are in game/simulation milliseconds; `time_scale`
//! converts them to wall-clock time.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};
use crate::game::GameConfig;
use crate::vision::VisionConfig;

/// Pauses and hold times used while acting on the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Key hold per action in the synchronous learner and the vision-input demo.
    pub hold_ms: f64,
    /// Pause between sending a step's spikes and executing its actions.
    pub settle_ms: f64,
    /// How long to wait for a first-spike answer.
    pub decode_window_ms: f64,
    /// Pause before each action in the asynchronous learner.
    pub action_settle_ms: f64,
    /// Key hold per action in the asynchronous learner.
    pub action_hold_ms: f64,
    /// Pause between acting and looking at the result.
    pub observe_delay_ms: f64,
    /// Gap between key taps when restarting the level.
    pub restart_gap_ms: f64,
    /// Gap between successive reward spikes, so each lands in its own
    /// timestep.
    pub reinforce_gap_ms: f64,
    /// Punishment: how far a critic spike leads its input spike. The post
    /// cell must fire a few ms before the pre cell, not in the same step.
    pub punish_lead_ms: f64,
    /// Punishment: spacing between rounds. Long enough for the pre cell's
    /// burst to die out before the next pair.
    pub punish_interval_ms: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            hold_ms: 1000.0,
            settle_ms: 1500.0,
            decode_window_ms: 1000.0,
            action_settle_ms: 150.0,
            action_hold_ms: 500.0,
            observe_delay_ms: 500.0,
            restart_gap_ms: 200.0,
            reinforce_gap_ms: 5.0,
            punish_lead_ms: 3.0,
            punish_interval_ms: 300.0,
        }
    }
}

/// Episode counts and simulation lengths for the learners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    /// Number of steps (and episodes).
    pub steps: usize,
    /// Synchronous learner: length of the first episode.
    pub base_run_ms: f64,
    /// Synchronous learner: added per later episode.
    pub run_increment_ms: f64,
    /// Asynchronous learner: simulated time budget per step.
    pub step_budget_ms: f64,
    /// Vision iterations: how many iterations to run.
    pub iterations: usize,
    /// Vision iterations: simulated time per iteration.
    pub iteration_run_ms: f64,
    /// Seed for exploration. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            steps: 3,
            base_run_ms: 2000.0,
            run_increment_ms: 3000.0,
            step_budget_ms: 10000.0,
            iterations: 10,
            iteration_run_ms: 3000.0,
            seed: None,
        }
    }
}

/// Settings for the random-spike and vision-input demos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomConfig {
    /// Wait before the first spike.
    pub initial_delay_ms: f64,
    /// Upper bound of the uniform gap between spikes.
    pub max_interval_ms: f64,
    /// Length of the simulation.
    pub run_ms: f64,
    /// Vision-input demo: period of the horizontal task.
    pub horizontal_period_ms: f64,
    /// Vision-input demo: period of the jump task.
    pub jump_period_ms: f64,
}

impl Default for RandomConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 12000.0,
            max_interval_ms: 3000.0,
            run_ms: 13000.0,
            horizontal_period_ms: 1000.0,
            jump_period_ms: 2000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Wall-clock milliseconds per simulated millisecond.
    pub time_scale: f64,
    pub game: GameConfig,
    pub vision: VisionConfig,
    pub timing: TimingConfig,
    pub learning: LearningConfig,
    pub random: RandomConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            game: GameConfig::default(),
            vision: VisionConfig::default(),
            timing: TimingConfig::default(),
            learning: LearningConfig::default(),
            random: RandomConfig::default(),
        }
    }
}

impl AgentConfig {
    /// Read and validate a JSON config.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: AgentConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.time_scale > 0.0 && self.time_scale.is_finite()) {
            return Err(AgentError::Config(format!(
                "time_scale must be positive, got {}",
                self.time_scale
            )));
        }
        if self.learning.steps == 0 {
            return Err(AgentError::Config("learning.steps must be at least 1".into()));
        }
        if self.game.move_interval_ms <= 0.0 {
            return Err(AgentError::Config("game.move_interval_ms must be positive".into()));
        }
        if self.game.cell_size == 0 {
            return Err(AgentError::Config("game.cell_size must be positive".into()));
        }
        if self.timing.reinforce_gap_ms <= 0.0 {
            return Err(AgentError::Config("timing.reinforce_gap_ms must be positive".into()));
        }
        if !(self.timing.punish_lead_ms > 0.0 && self.timing.punish_lead_ms < self.timing.punish_interval_ms) {
            return Err(AgentError::Config(
                "timing.punish_lead_ms must be positive and shorter than timing.punish_interval_ms".into(),
            ));
        }
        if self.random.max_interval_ms < 0.0 {
            return Err(AgentError::Config("random.max_interval_ms must not be negative".into()));
        }
        Ok(())
    }
}
