//! Reward and punishment as timed spike schedules.
//!
//! A reward spike on `input` makes `pre` fire, and `pre` then drives its `post`
//! neuron, so the pair is pre-then-post and the weight grows. A punishment
//! first makes `post` fire through `critic_input`, then `pre` a few ms later
//! through `input`. That pair is post-then-pre and the weight shrinks.
//!
//! Punishment rounds are spaced further apart than the post cell's refractory
//! period so every round gets its own post spike. Commands use disjoint
//! neurons, so their spikes can share a round.

use crate::config::TimingConfig;
use crate::network::{CRITIC_INPUT, INPUT};

/// One live spike, `at_ms` after the schedule starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedSpike {
    pub at_ms: f64,
    pub label: &'static str,
    pub neuron: usize,
}

/// Spikes owed to the `k`-th command judged after `step` of a `steps` run.
/// Earlier steps and earlier commands get more.
pub fn spike_count(steps: usize, step: usize, k: usize) -> usize {
    (steps + k + 1).saturating_sub(step)
}

/// Input spikes that strengthen every command's weight.
pub fn reward(commands: &[usize], step: usize, steps: usize, timing: &TimingConfig) -> Vec<TimedSpike> {
    rounds(commands, step, steps)
        .into_iter()
        .enumerate()
        .flat_map(|(r, due)| {
            let at_ms = r as f64 * timing.reinforce_gap_ms;
            due.into_iter().map(move |neuron| TimedSpike {
                at_ms,
                label: INPUT,
                neuron,
            })
        })
        .collect()
}

/// Critic-then-input pairs that weaken every command's weight.
pub fn punish(commands: &[usize], step: usize, steps: usize, timing: &TimingConfig) -> Vec<TimedSpike> {
    let mut out = Vec::new();
    for (r, due) in rounds(commands, step, steps).into_iter().enumerate() {
        let at_ms = r as f64 * timing.punish_interval_ms;
        out.extend(due.iter().map(|&neuron| TimedSpike {
            at_ms,
            label: CRITIC_INPUT,
            neuron,
        }));
        out.extend(due.iter().map(|&neuron| TimedSpike {
            at_ms: at_ms + timing.punish_lead_ms,
            label: INPUT,
            neuron,
        }));
    }
    out
}

/// Commands still owed a spike in each round.
fn rounds(commands: &[usize], step: usize, steps: usize) -> Vec<Vec<usize>> {
    let owed: Vec<usize> = (0..commands.len()).map(|k| spike_count(steps, step, k)).collect();
    let n = owed.iter().copied().max().unwrap_or(0);
    (0..n)
        .map(|r| {
            commands
                .iter()
                .zip(&owed)
                .filter(|&(_, &o)| r < o)
                .map(|(&c, _)| c)
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spike_count_shrinks_with_step() {
        assert_eq!(spike_count(3, 1, 0), 3);
        assert_eq!(spike_count(3, 3, 0), 1);
        assert_eq!(spike_count(3, 3, 2), 3);
        assert_eq!(spike_count(0, 5, 0), 0);
    }

    #[test]
    fn test_rounds_drop_commands_that_are_paid() {
        // Owed 2 and 3
        let r = rounds(&[4, 9], 2, 3);
        assert_eq!(r, vec![vec![4, 9], vec![4, 9], vec![9]]);
        assert!(rounds(&[], 1, 3).is_empty());
    }
}
