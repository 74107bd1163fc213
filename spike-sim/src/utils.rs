//! Utility functions shared by the neuron, synapse and projection code.
//!
//! Timing conversions live here so every component rounds delays and
//! decays traces the same way.

use crate::constants::{MAX_DELAY_STEPS, MIN_DELAY_STEPS};
use crate::error::{Result, SimError};

/// Multiplicative decay applied to an exponential trace over one timestep.
///
/// A non-positive time constant decays to zero immediately.
///
/// # Examples
///
/// ```
/// use spike_sim::utils::decay_factor;
///
/// let d = decay_factor(1.0, 20.0);
/// assert!((d - (-1.0_f64 / 20.0).exp()).abs() < 1e-12);
/// assert_eq!(decay_factor(1.0, 0.0), 0.0);
/// ```
pub fn decay_factor(dt: f64, tau: f64) -> f64 {
    if tau <= 0.0 {
        0.0
    } else {
        (-dt / tau).exp()
    }
}

/// Convert a delay in milliseconds to whole timesteps.
///
/// Delays are rounded to the nearest step and raised to `MIN_DELAY_STEPS`,
/// so a zero delay still arrives on the following step. Negative,
/// non-finite, or over-long delays are rejected.
///
/// # Examples
///
/// ```
/// use spike_sim::utils::delay_steps;
///
/// assert_eq!(delay_steps(2.0, 1.0).unwrap(), 2);
/// assert_eq!(delay_steps(0.0, 1.0).unwrap(), 1);
/// assert!(delay_steps(-1.0, 1.0).is_err());
/// ```
pub fn delay_steps(delay_ms: f64, dt: f64) -> Result<usize> {
    if !delay_ms.is_finite() || delay_ms < 0.0 {
        return Err(SimError::InvalidDelay(delay_ms));
    }
    let steps = ((delay_ms / dt).round() as usize).max(MIN_DELAY_STEPS);
    if steps > MAX_DELAY_STEPS {
        return Err(SimError::InvalidDelay(delay_ms));
    }
    Ok(steps)
}
