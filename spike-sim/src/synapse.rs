//! Synapse types: static connections and spike-pair STDP.

use serde::{Deserialize, Serialize};

use crate::constants::*;

/// A fixed-weight connection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaticSynapse {
    pub weight: f64,
    /// Delay in milliseconds.
    pub delay: f64,
}

impl StaticSynapse {
    pub fn new(weight: f64, delay: f64) -> Self {
        Self { weight, delay }
    }
}

/// Timing dependence: nearest-pair exponential windows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpikePairRule {
    pub tau_plus: f64,
    pub tau_minus: f64,
    pub a_plus: f64,
    pub a_minus: f64,
}

impl Default for SpikePairRule {
    fn default() -> Self {
        Self {
            tau_plus: DEFAULT_TAU_PLUS,
            tau_minus: DEFAULT_TAU_MINUS,
            a_plus: DEFAULT_A_PLUS,
            a_minus: DEFAULT_A_MINUS,
        }
    }
}

/// Weight dependence: changes are independent of the current weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdditiveWeightDependence {
    pub w_min: f64,
    pub w_max: f64,
}

impl Default for AdditiveWeightDependence {
    fn default() -> Self {
        Self {
            w_min: DEFAULT_W_MIN,
            w_max: DEFAULT_W_MAX,
        }
    }
}

impl AdditiveWeightDependence {
    /// Width of the allowed weight range. Amplitudes are scaled by it.
    pub fn range(&self) -> f64 {
        self.w_max - self.w_min
    }

    pub fn clamp(&self, weight: f64) -> f64 {
        weight.clamp(self.w_min, self.w_max)
    }
}

/// Plastic synapse: spike-pair timing with additive weight dependence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StdpMechanism {
    pub timing: SpikePairRule,
    pub weight_dependence: AdditiveWeightDependence,
    /// Initial weight of every synapse.
    pub weight: f64,
    /// Delay in milliseconds.
    pub delay: f64,
}

impl Default for StdpMechanism {
    fn default() -> Self {
        Self {
            timing: SpikePairRule::default(),
            weight_dependence: AdditiveWeightDependence::default(),
            weight: DEFAULT_STDP_WEIGHT,
            delay: DEFAULT_STDP_DELAY_MS,
        }
    }
}

impl StdpMechanism {
    /// Weight after a post spike, given the presynaptic trace.
    pub fn potentiate(&self, weight: f64, pre_trace: f64) -> f64 {
        let dw = self.timing.a_plus * self.weight_dependence.range() * pre_trace;
        self.weight_dependence.clamp(weight + dw)
    }

    /// Weight after a pre spike, given the postsynaptic trace.
    pub fn depress(&self, weight: f64, post_trace: f64) -> f64 {
        let dw = self.timing.a_minus * self.weight_dependence.range() * post_trace;
        self.weight_dependence.clamp(weight - dw)
    }
}

/// The synapse model a projection is built with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SynapseType {
    Static(StaticSynapse),
    Stdp(StdpMechanism),
}

impl SynapseType {
    pub fn initial_weight(&self) -> f64 {
        match self {
            SynapseType::Static(s) => s.weight,
            SynapseType::Stdp(s) => s.weight,
        }
    }

    pub fn delay(&self) -> f64 {
        match self {
            SynapseType::Static(s) => s.delay,
            SynapseType::Stdp(s) => s.delay,
        }
    }

    pub fn plasticity(&self) -> Option<&StdpMechanism> {
        match self {
            SynapseType::Static(_) => None,
            SynapseType::Stdp(s) => Some(s),
        }
    }
}

impl From<StaticSynapse> for SynapseType {
    fn from(s: StaticSynapse) -> Self {
        SynapseType::Static(s)
    }
}

impl From<StdpMechanism> for SynapseType {
    fn from(s: StdpMechanism) -> Self {
        SynapseType::Stdp(s)
    }
}
