//! Projections: the synapses between two populations.
//!
//! Plastic projections keep one exponential trace per pre neuron and one per
//! post neuron. A pre spike reads the post trace and depresses. A post spike
//! reads the pre trace and potentiates.

use serde::{Deserialize, Serialize};

use crate::connector::Connector;
use crate::error::Result;
use crate::population::PopulationId;
use crate::synapse::SynapseType;
use crate::utils::{decay_factor, delay_steps};

/// Index of a projection inside a [`Simulator`](crate::simulator::Simulator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectionId(pub usize);

/// One connection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Synapse {
    pub pre: usize,
    pub post: usize,
    pub weight: f64,
}

/// An event leaving a projection, bound for the post population.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynapticEvent {
    pub post: usize,
    pub weight: f64,
}

#[derive(Debug, Clone)]
pub struct Projection {
    pub pre: PopulationId,
    pub post: PopulationId,
    pub synapse_type: SynapseType,
    delay: usize,
    synapses: Vec<Synapse>,

    /// Synapse indices by pre neuron / by post neuron.
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,

    pre_trace: Vec<f64>,
    post_trace: Vec<f64>,
}

impl Projection {
    pub fn new(
        pre: PopulationId,
        post: PopulationId,
        pre_size: usize,
        post_size: usize,
        connector: &Connector,
        synapse_type: SynapseType,
        dt: f64,
    ) -> Result<Self> {
        let delay = delay_steps(synapse_type.delay(), dt)?;
        let weight = synapse_type.initial_weight();

        let synapses: Vec<Synapse> = connector
            .connections(pre_size, post_size)?
            .into_iter()
            .map(|(pre, post)| Synapse { pre, post, weight })
            .collect();

        let mut outgoing = vec![Vec::new(); pre_size];
        let mut incoming = vec![Vec::new(); post_size];
        for (k, s) in synapses.iter().enumerate() {
            outgoing[s.pre].push(k);
            incoming[s.post].push(k);
        }

        Ok(Self {
            pre,
            post,
            synapse_type,
            delay,
            synapses,
            outgoing,
            incoming,
            pre_trace: vec![0.0; pre_size],
            post_trace: vec![0.0; post_size],
        })
    }

    /// Delay in timesteps.
    pub fn delay_steps(&self) -> usize {
        self.delay
    }

    /// Current weights in connection order.
    pub fn weights(&self) -> Vec<f64> {
        self.synapses.iter().map(|s| s.weight).collect()
    }

    pub fn synapses(&self) -> &[Synapse] {
        &self.synapses
    }

    /// Apply one timestep of pre/post activity.
    ///
    /// Traces decay first. Pre spikes are handled before post spikes, so a
    /// pre spike in the same step as a post spike counts as causal.
    /// Returns the events to deliver to the post population.
    pub fn step(&mut self, dt: f64, pre_spikes: &[usize], post_spikes: &[usize]) -> Vec<SynapticEvent> {
        let mut events = Vec::new();
        let stdp = self.synapse_type.plasticity().copied();

        if let Some(rule) = &stdp {
            let d_pre = decay_factor(dt, rule.timing.tau_plus);
            let d_post = decay_factor(dt, rule.timing.tau_minus);
            self.pre_trace.iter_mut().for_each(|t| *t *= d_pre);
            self.post_trace.iter_mut().for_each(|t| *t *= d_post);
        }

        for &i in pre_spikes {
            let Some(targets) = self.outgoing.get(i) else {
                continue;
            };
            for &k in targets {
                let syn = &mut self.synapses[k];
                if let Some(rule) = &stdp {
                    syn.weight = rule.depress(syn.weight, self.post_trace[syn.post]);
                }
                events.push(SynapticEvent {
                    post: syn.post,
                    weight: syn.weight,
                });
            }
            if stdp.is_some() {
                self.pre_trace[i] += 1.0;
            }
        }

        if let Some(rule) = &stdp {
            for &j in post_spikes {
                let Some(sources) = self.incoming.get(j) else {
                    continue;
                };
                for &k in sources {
                    let syn = &mut self.synapses[k];
                    syn.weight = rule.potentiate(syn.weight, self.pre_trace[syn.pre]);
                }
                self.post_trace[j] += 1.0;
            }
        }

        events
    }
}
