//! Constants for the spiking simulator.
//!
//! Neuron defaults follow the standard current-based integrate-and-fire cell
//! (`IF_curr_exp`). Plasticity defaults are the values the gridworld
//! learners were tuned with.

// =============================================================================
// Timing
// =============================================================================

/// Default integration timestep in milliseconds.
pub const DEFAULT_TIMESTEP_MS: f64 = 1.0;

/// Longest synaptic delay a projection may carry, in timesteps.
/// Delivery slots are kept in a ring buffer of this length + 1.
pub const MAX_DELAY_STEPS: usize = 144;

/// Shortest synaptic delay, in timesteps. A spike can never reach its
/// target within the step that produced it.
pub const MIN_DELAY_STEPS: usize = 1;

// =============================================================================
// IF_curr_exp defaults
// =============================================================================

/// Membrane capacitance (nF).
pub const DEFAULT_CM: f64 = 1.0;

/// Membrane time constant (ms).
pub const DEFAULT_TAU_M: f64 = 20.0;

/// Refractory period (ms).
pub const DEFAULT_TAU_REFRAC: f64 = 0.1;

/// Excitatory synaptic current decay (ms).
pub const DEFAULT_TAU_SYN_E: f64 = 5.0;

/// Inhibitory synaptic current decay (ms).
pub const DEFAULT_TAU_SYN_I: f64 = 5.0;

/// Resting potential (mV).
pub const DEFAULT_V_REST: f64 = -65.0;

/// Post-spike reset potential (mV).
pub const DEFAULT_V_RESET: f64 = -65.0;

/// Firing threshold (mV).
pub const DEFAULT_V_THRESH: f64 = -50.0;

/// Constant injected current (nA).
pub const DEFAULT_I_OFFSET: f64 = 0.0;

// =============================================================================
// Spike-pair STDP defaults
// =============================================================================

/// Potentiation window (ms).
pub const DEFAULT_TAU_PLUS: f64 = 50.0;

/// Depression window (ms).
pub const DEFAULT_TAU_MINUS: f64 = 50.0;

/// Potentiation amplitude, as a fraction of the weight range.
pub const DEFAULT_A_PLUS: f64 = 0.001;

/// Depression amplitude, as a fraction of the weight range.
pub const DEFAULT_A_MINUS: f64 = 0.001;

/// Lower weight bound for additive weight dependence.
pub const DEFAULT_W_MIN: f64 = -5.0;

/// Upper weight bound for additive weight dependence.
pub const DEFAULT_W_MAX: f64 = 5.0;

/// Initial weight of a plastic synapse.
pub const DEFAULT_STDP_WEIGHT: f64 = 2.0;

/// Delay of a plastic synapse (ms).
pub const DEFAULT_STDP_DELAY_MS: f64 = 1.0;
