//! The current-based leaky integrate-and-fire neuron.
//!
//! - Membrane integrates with forward Euler at the simulator timestep
//! - Excitatory and inhibitory synaptic currents decay exponentially
//! - Refractory period clamps the membrane to `v_reset`
//! - A spike resets the membrane and starts the refractory clock

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::utils::decay_factor;

/// Parameters of an `IF_curr_exp` cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IfCurrExp {
    /// Membrane capacitance (nF).
    pub cm: f64,
    /// Membrane time constant (ms).
    pub tau_m: f64,
    /// Refractory period (ms).
    pub tau_refrac: f64,
    /// Excitatory current decay (ms).
    pub tau_syn_e: f64,
    /// Inhibitory current decay (ms).
    pub tau_syn_i: f64,
    pub v_rest: f64,
    pub v_reset: f64,
    pub v_thresh: f64,
    /// Constant bias current (nA).
    pub i_offset: f64,
}

impl Default for IfCurrExp {
    fn default() -> Self {
        Self {
            cm: DEFAULT_CM,
            tau_m: DEFAULT_TAU_M,
            tau_refrac: DEFAULT_TAU_REFRAC,
            tau_syn_e: DEFAULT_TAU_SYN_E,
            tau_syn_i: DEFAULT_TAU_SYN_I,
            v_rest: DEFAULT_V_REST,
            v_reset: DEFAULT_V_RESET,
            v_thresh: DEFAULT_V_THRESH,
            i_offset: DEFAULT_I_OFFSET,
        }
    }
}

impl IfCurrExp {
    /// Override the excitatory synaptic time constant.
    pub fn with_tau_syn_e(mut self, tau_syn_e: f64) -> Self {
        self.tau_syn_e = tau_syn_e;
        self
    }

    /// Override the refractory period.
    pub fn with_tau_refrac(mut self, tau_refrac: f64) -> Self {
        self.tau_refrac = tau_refrac;
        self
    }

    /// Override the bias current.
    pub fn with_i_offset(mut self, i_offset: f64) -> Self {
        self.i_offset = i_offset;
        self
    }
}

/// Per-neuron dynamic state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeuronState {
    /// Membrane potential (mV).
    pub v: f64,

    /// Excitatory synaptic current (nA).
    pub i_syn_e: f64,

    /// Inhibitory synaptic current (nA), stored as a positive magnitude.
    pub i_syn_i: f64,

    /// Remaining refractory time (ms).
    pub refractory_ms: f64,
}

impl NeuronState {
    /// A neuron at rest with no synaptic input.
    pub fn at_rest(params: &IfCurrExp) -> Self {
        Self {
            v: params.v_rest,
            i_syn_e: 0.0,
            i_syn_i: 0.0,
            refractory_ms: 0.0,
        }
    }

    /// Deliver one synaptic event. Negative weights land on the inhibitory current.
    pub fn receive(&mut self, weight: f64) {
        if weight >= 0.0 {
            self.i_syn_e += weight;
        } else {
            self.i_syn_i -= weight;
        }
    }

    /// Advance one timestep. Returns true if the neuron fired.
    pub fn step(&mut self, params: &IfCurrExp, dt: f64) -> bool {
        self.advance(params, dt).is_some()
    }

    /// Advance one timestep.
    ///
    /// On a spike, returns where in the step the threshold was crossed, in ms
    /// after the step began. The crossing is interpolated linearly between
    /// the membrane values at either end of the step, so a cell driven harder
    /// crosses earlier even when both fire in the same step.
    pub fn advance(&mut self, params: &IfCurrExp, dt: f64) -> Option<f64> {
        let mut crossing = None;

        if self.refractory_ms > 0.0 {
            self.refractory_ms -= dt;
            self.v = params.v_reset;
        } else {
            let v0 = self.v;
            let current = self.i_syn_e - self.i_syn_i + params.i_offset;
            self.v += dt * ((params.v_rest - self.v) / params.tau_m + current / params.cm);

            if self.v >= params.v_thresh {
                let frac = if self.v > v0 {
                    ((params.v_thresh - v0) / (self.v - v0)).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                crossing = Some(frac * dt);
                self.v = params.v_reset;
                self.refractory_ms = params.tau_refrac;
            }
        }

        // Currents decay after they have driven the membrane this step
        self.i_syn_e *= decay_factor(dt, params.tau_syn_e);
        self.i_syn_i *= decay_factor(dt, params.tau_syn_i);

        crossing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_is_stable() {
        let params = IfCurrExp::default();
        let mut state = NeuronState::at_rest(&params);
        for _ in 0..100 {
            assert!(!state.step(&params, 1.0));
        }
        assert!((state.v - params.v_rest).abs() < 1e-9);
    }

    #[test]
    fn test_negative_weight_is_inhibitory() {
        let params = IfCurrExp::default();
        let mut state = NeuronState::at_rest(&params);
        state.receive(-3.0);
        assert_eq!(state.i_syn_e, 0.0);
        assert_eq!(state.i_syn_i, 3.0);
        state.step(&params, 1.0);
        assert!(state.v < params.v_rest, "inhibition should hyperpolarise");
    }
}
