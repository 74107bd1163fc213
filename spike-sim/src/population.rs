//! Populations: groups of identical cells sharing a label.
//!
//! A population owns its neuron state, the ring buffer of synaptic input
//! waiting to be delivered, and anything it has been asked to record.

use serde::{Deserialize, Serialize};

use crate::constants::MAX_DELAY_STEPS;
use crate::neuron::{IfCurrExp, NeuronState};

/// Index of a population inside a [`Simulator`](crate::simulator::Simulator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PopulationId(pub usize);

/// What kind of cell a population is made of.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CellType {
    /// Emits a spike only when one is injected from outside.
    SpikeInjector,
    /// Current-based leaky integrate-and-fire neuron.
    IfCurrExp(IfCurrExp),
}

/// Which variables to record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordVariables {
    pub spikes: bool,
    pub v: bool,
}

impl RecordVariables {
    pub fn spikes_and_v() -> Self {
        Self { spikes: true, v: true }
    }

    pub fn spikes() -> Self {
        Self { spikes: true, v: false }
    }
}

/// Recorded data for one population.
///
/// `spikes[i]` is the spike train of neuron i (ms). `v[i]` is its membrane
/// trace, one sample per timestep. Injectors have no membrane, so their
/// `v` stays empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub label: String,
    pub spikes: Vec<Vec<f64>>,
    pub v: Vec<Vec<f64>>,
}

impl Recording {
    /// Total number of recorded spikes across all neurons.
    pub fn spike_count(&self) -> usize {
        self.spikes.iter().map(Vec::len).sum()
    }
}

/// A spike emitted during one timestep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spike {
    pub neuron: usize,
    /// Threshold crossing, in ms after the start of the step. Injected
    /// spikes sit at 0.
    pub offset_ms: f64,
}

/// A population of cells.
#[derive(Debug, Clone)]
pub struct Population {
    pub label: String,
    pub cell: CellType,
    states: Vec<NeuronState>,

    /// Excitatory and inhibitory input per delay slot: [slot][neuron].
    pending_e: Vec<Vec<f64>>,
    pending_i: Vec<Vec<f64>>,

    record: RecordVariables,
    recording: Recording,
    pub live_output: bool,
}

impl Population {
    pub fn new(label: &str, size: usize, cell: CellType) -> Self {
        let params = match cell {
            CellType::IfCurrExp(p) => p,
            CellType::SpikeInjector => IfCurrExp::default(),
        };
        let slots = MAX_DELAY_STEPS + 1;

        Self {
            label: label.to_string(),
            cell,
            states: vec![NeuronState::at_rest(&params); size],
            pending_e: vec![vec![0.0; size]; slots],
            pending_i: vec![vec![0.0; size]; slots],
            record: RecordVariables::default(),
            recording: Recording {
                label: label.to_string(),
                spikes: vec![Vec::new(); size],
                v: vec![Vec::new(); size],
            },
            live_output: false,
        }
    }

    /// Number of neurons.
    pub fn size(&self) -> usize {
        self.states.len()
    }

    pub fn is_injector(&self) -> bool {
        matches!(self.cell, CellType::SpikeInjector)
    }

    /// Membrane state of neuron `i`.
    pub fn state(&self, i: usize) -> Option<&NeuronState> {
        self.states.get(i)
    }

    pub fn set_record(&mut self, vars: RecordVariables) {
        self.record = vars;
    }

    /// Queue a synaptic event to arrive `delay` steps after `now`.
    pub fn schedule(&mut self, now: u64, delay: usize, neuron: usize, weight: f64) {
        let slot = ((now + delay as u64) % self.pending_e.len() as u64) as usize;
        if weight >= 0.0 {
            self.pending_e[slot][neuron] += weight;
        } else {
            self.pending_i[slot][neuron] += weight;
        }
    }

    /// Advance every neuron one timestep.
    ///
    /// Input due at `now` is delivered first. For injectors, `injected`
    /// lists the neurons told to fire this step. Returns the spikes emitted,
    /// without duplicates, earliest threshold crossing first; equal
    /// crossings keep index order.
    pub fn step(&mut self, now: u64, dt: f64, injected: &[usize]) -> Vec<Spike> {
        let slot = (now % self.pending_e.len() as u64) as usize;
        let mut fired = Vec::new();

        match self.cell {
            CellType::SpikeInjector => {
                let mut ids: Vec<usize> = injected
                    .iter()
                    .copied()
                    .filter(|&i| i < self.states.len())
                    .collect();
                ids.sort_unstable();
                ids.dedup();
                fired.extend(ids.into_iter().map(|neuron| Spike {
                    neuron,
                    offset_ms: 0.0,
                }));
                self.pending_e[slot].iter_mut().for_each(|w| *w = 0.0);
                self.pending_i[slot].iter_mut().for_each(|w| *w = 0.0);
            }
            CellType::IfCurrExp(params) => {
                for (i, state) in self.states.iter_mut().enumerate() {
                    let e = std::mem::take(&mut self.pending_e[slot][i]);
                    let inh = std::mem::take(&mut self.pending_i[slot][i]);
                    if e != 0.0 {
                        state.receive(e);
                    }
                    if inh != 0.0 {
                        state.receive(inh);
                    }
                    if let Some(offset_ms) = state.advance(&params, dt) {
                        fired.push(Spike { neuron: i, offset_ms });
                    }
                }
                // Stable, so ties stay in index order
                fired.sort_by(|a: &Spike, b: &Spike| a.offset_ms.total_cmp(&b.offset_ms));
            }
        }

        let time_ms = now as f64 * dt;
        if self.record.spikes {
            for spike in &fired {
                self.recording.spikes[spike.neuron].push(time_ms);
            }
        }
        if self.record.v && !self.is_injector() {
            for (i, state) in self.states.iter().enumerate() {
                self.recording.v[i].push(state.v);
            }
        }

        fired
    }

    /// Everything recorded so far.
    pub fn recording(&self) -> &Recording {
        &self.recording
    }
}
