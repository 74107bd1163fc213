//! Episode history, weight series and the JSON run report.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use spike_sim::Recording;

use crate::action::{Action, ACTIONS_PER_STEP};
use crate::error::Result;

/// How a step compared with the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOutcome {
    /// First measured step; nothing to compare against.
    Baseline,
    Better,
    Worse,
}

/// What happened in one step of a learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: usize,
    /// Actions executed, in execution order.
    pub actions: Vec<Action>,
    pub outcome: StepOutcome,
    pub x_offset: i64,
    pub y_offset: i64,
    pub explored: bool,
}

impl fmt::Display for StepRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {}: ", self.step)?;
        for a in &self.actions {
            write!(f, " {}, ", a.describe())?;
        }
        match self.outcome {
            StepOutcome::Baseline => write!(f, " baseline")?,
            StepOutcome::Better => write!(f, " better than previous step")?,
            StepOutcome::Worse => write!(f, " worse than previous step")?,
        }
        if self.explored {
            write!(f, " (explored)")?;
        }
        Ok(())
    }
}

/// One weight series per action for a single step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionSeries {
    pub right: Vec<f64>,
    pub left: Vec<f64>,
    pub jump_right: Vec<f64>,
    pub jump_left: Vec<f64>,
}

impl ActionSeries {
    pub fn push(&mut self, w: [f64; ACTIONS_PER_STEP]) {
        self.right.push(w[0]);
        self.left.push(w[1]);
        self.jump_right.push(w[2]);
        self.jump_left.push(w[3]);
    }

    pub fn series(&self, action: Action) -> &[f64] {
        match action {
            Action::Right => &self.right,
            Action::Left => &self.left,
            Action::JumpRight => &self.jump_right,
            Action::JumpLeft => &self.jump_left,
        }
    }

    pub fn len(&self) -> usize {
        self.right.len()
    }

    pub fn is_empty(&self) -> bool {
        self.right.is_empty()
    }
}

/// How the plastic weights moved over a run, one [`ActionSeries`] per step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightHistory {
    pub steps: Vec<ActionSeries>,
}

impl WeightHistory {
    pub fn new(steps: usize) -> Self {
        Self {
            steps: vec![ActionSeries::default(); steps],
        }
    }

    /// Append a sample for every step block of a flat weight vector.
    pub fn record(&mut self, weights: &[f64]) {
        for (series, block) in self.steps.iter_mut().zip(weights.chunks_exact(ACTIONS_PER_STEP)) {
            let mut w = [0.0; ACTIONS_PER_STEP];
            w.copy_from_slice(block);
            series.push(w);
        }
    }

    /// Number of samples taken.
    pub fn samples(&self) -> usize {
        self.steps.first().map_or(0, ActionSeries::len)
    }
}

/// Everything a learner run produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub mode: String,
    pub steps: usize,
    pub history: Vec<StepRecord>,
    pub weights: WeightHistory,
    pub final_weights: Vec<f64>,
    pub reached_goal: bool,
    /// Recorded spikes of the output population.
    pub recording: Option<Recording>,
}

impl RunReport {
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut w = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut w, self)?;
        w.flush()?;
        Ok(())
    }

    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let r = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(r)?)
    }
}

/// Tracks whether the agent is getting closer to the goal.
///
/// A step is better when either absolute offset shrank by more than the
/// tolerance since the previous step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressTracker {
    tolerance: i64,
    prev: Option<(i64, i64)>,
}

impl ProgressTracker {
    pub fn new(tolerance: i64) -> Self {
        Self { tolerance, prev: None }
    }

    /// Compare `offset` with the last one seen and remember it.
    pub fn assess(&mut self, offset: (i64, i64)) -> StepOutcome {
        let now = (offset.0.abs(), offset.1.abs());
        let outcome = match self.prev {
            None => StepOutcome::Baseline,
            Some((px, py)) if now.0 + self.tolerance < px || now.1 + self.tolerance < py => {
                StepOutcome::Better
            }
            Some(_) => StepOutcome::Worse,
        };
        self.prev = Some(now);
        outcome
    }

    pub fn previous(&self) -> Option<(i64, i64)> {
        self.prev
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_needs_more_than_tolerance() {
        let mut p = ProgressTracker::new(5);
        assert_eq!(p.assess((100, -40)), StepOutcome::Baseline);
        assert_eq!(p.assess((-95, 40)), StepOutcome::Worse, "5 px is within tolerance");
        assert_eq!(p.assess((80, 40)), StepOutcome::Better);
        assert_eq!(p.assess((80, 10)), StepOutcome::Better);
        assert_eq!(p.assess((90, 12)), StepOutcome::Worse);
        assert_eq!(p.previous(), Some((90, 12)));
    }

    #[test]
    fn test_weight_history_splits_blocks_by_action() {
        let mut history = WeightHistory::new(2);
        history.record(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        history.record(&[1.5, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.5]);

        assert_eq!(history.samples(), 2);
        assert_eq!(history.steps[0].series(Action::Right), &[1.0, 1.5]);
        assert_eq!(history.steps[0].series(Action::JumpLeft), &[4.0, 4.0]);
        assert_eq!(history.steps[1].series(Action::Left), &[6.0, 6.0]);
        assert_eq!(history.steps[1].series(Action::JumpLeft), &[8.0, 8.5]);
    }
}
