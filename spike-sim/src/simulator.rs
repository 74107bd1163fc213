//! The Simulator: owns populations and projections and advances them in lockstep.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::connector::Connector;
use crate::constants::DEFAULT_TIMESTEP_MS;
use crate::error::{Result, SimError};
use crate::live::{
    InjectedSpikes, LabelEntry, LabelTable, LiveSpikeEvent, LiveSpikeReceiver, SimulationHandle,
    SpikeSender, Subscriber,
};
use crate::population::{CellType, Population, PopulationId, RecordVariables, Recording, Spike};
use crate::projection::{Projection, ProjectionId};
use crate::synapse::SynapseType;

/// Called with the simulator's spike sender at the start of every `run`.
pub type StartCallback = Box<dyn FnMut(&SpikeSender) + Send>;

/// Simulator settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Integration timestep (ms).
    pub timestep_ms: f64,

    /// Wall-clock milliseconds per simulated millisecond.
    /// `None` runs as fast as possible; `Some(1.0)` runs in real time.
    pub time_scale: Option<f64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            timestep_ms: DEFAULT_TIMESTEP_MS,
            time_scale: None,
        }
    }
}

/// What a call to [`Simulator::run`] did.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub start_ms: f64,
    pub end_ms: f64,
    pub steps: u64,
    pub spikes: usize,
    pub stopped_early: bool,
}

/// A network of populations and projections.
pub struct Simulator {
    config: SimConfig,

    /// Current timestep. Time continues across runs.
    now: u64,

    populations: Vec<Population>,
    projections: Vec<Projection>,

    labels: LabelTable,
    inject_rx: mpsc::UnboundedReceiver<InjectedSpikes>,
    sender: SpikeSender,
    subscribers: Vec<Subscriber>,
    start_callbacks: Vec<(String, StartCallback)>,
    handle: SimulationHandle,
}

impl Simulator {
    /// Create an empty simulator.
    pub fn new(config: SimConfig) -> Self {
        let labels: LabelTable = Arc::new(RwLock::new(Default::default()));
        let (tx, inject_rx) = mpsc::unbounded_channel();
        let sender = SpikeSender::new(tx, Arc::clone(&labels));

        Self {
            handle: SimulationHandle::new(config.timestep_ms),
            config,
            now: 0,
            populations: Vec::new(),
            projections: Vec::new(),
            labels,
            inject_rx,
            sender,
            subscribers: Vec::new(),
            start_callbacks: Vec::new(),
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Simulated time (ms).
    pub fn time_ms(&self) -> f64 {
        self.now as f64 * self.config.timestep_ms
    }

    /// Cross-thread handle for stopping the run and reading the clock.
    pub fn handle(&self) -> SimulationHandle {
        self.handle.clone()
    }

    /// A sender for injecting spikes by label.
    ///
    /// Spikes sent while no run is in progress are delivered on the first
    /// step of the next run.
    pub fn spike_sender(&self) -> SpikeSender {
        self.sender.clone()
    }

    // ========================================================================
    // NETWORK CONSTRUCTION
    // ========================================================================

    /// Add a population. Labels must be unique.
    pub fn population(&mut self, label: &str, size: usize, cell: CellType) -> Result<PopulationId> {
        let mut table = self.labels.write().unwrap_or_else(|e| e.into_inner());
        if table.contains_key(label) {
            return Err(SimError::DuplicateLabel(label.to_string()));
        }

        let id = self.populations.len();
        let population = Population::new(label, size, cell);
        table.insert(
            label.to_string(),
            LabelEntry {
                id,
                size,
                injector: population.is_injector(),
            },
        );
        self.populations.push(population);

        debug!(label, size, "population created");
        Ok(PopulationId(id))
    }

    /// Connect two populations.
    pub fn projection(
        &mut self,
        pre: PopulationId,
        post: PopulationId,
        connector: Connector,
        synapse: impl Into<SynapseType>,
    ) -> Result<ProjectionId> {
        let pre_size = self.population_ref(pre)?.size();
        let post_size = self.population_ref(post)?.size();

        let projection = Projection::new(
            pre,
            post,
            pre_size,
            post_size,
            &connector,
            synapse.into(),
            self.config.timestep_ms,
        )?;

        let id = self.projections.len();
        debug!(
            pre = %self.populations[pre.0].label,
            post = %self.populations[post.0].label,
            synapses = projection.synapses().len(),
            delay_steps = projection.delay_steps(),
            "projection created"
        );
        self.projections.push(projection);
        Ok(ProjectionId(id))
    }

    /// Choose what to record for a population.
    pub fn record(&mut self, pop: PopulationId, vars: RecordVariables) -> Result<()> {
        self.population_mut(pop)?.set_record(vars);
        Ok(())
    }

    /// Publish this population's spikes to live receivers.
    pub fn activate_live_output_for(&mut self, pop: PopulationId) -> Result<()> {
        self.population_mut(pop)?.live_output = true;
        Ok(())
    }

    /// Subscribe to live output from the given labels.
    ///
    /// Live output is switched on for each label that does not have it yet.
    pub fn live_receiver(&mut self, labels: &[&str]) -> Result<LiveSpikeReceiver> {
        let mut wanted = HashSet::new();
        for &label in labels {
            let id = self.id_of(label)?;
            self.populations[id.0].live_output = true;
            wanted.insert(label.to_string());
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(Subscriber { labels: wanted, tx });
        Ok(LiveSpikeReceiver::new(rx))
    }

    /// Register a callback to run at the start of every subsequent `run`.
    pub fn add_start_callback(&mut self, label: &str, callback: StartCallback) {
        self.start_callbacks.push((label.to_string(), callback));
    }

    /// Drop every start callback registered under `label`.
    pub fn clear_start_callbacks(&mut self, label: &str) {
        self.start_callbacks.retain(|(l, _)| l != label);
    }

    pub fn start_callback_count(&self) -> usize {
        self.start_callbacks.len()
    }

    // ========================================================================
    // INSPECTION
    // ========================================================================

    pub fn id_of(&self, label: &str) -> Result<PopulationId> {
        let table = self.labels.read().unwrap_or_else(|e| e.into_inner());
        table
            .get(label)
            .map(|e| PopulationId(e.id))
            .ok_or_else(|| SimError::UnknownLabel(label.to_string()))
    }

    pub fn population_ref(&self, pop: PopulationId) -> Result<&Population> {
        self.populations
            .get(pop.0)
            .ok_or(SimError::UnknownPopulation(pop.0))
    }

    fn population_mut(&mut self, pop: PopulationId) -> Result<&mut Population> {
        self.populations
            .get_mut(pop.0)
            .ok_or(SimError::UnknownPopulation(pop.0))
    }

    pub fn projection_ref(&self, proj: ProjectionId) -> Result<&Projection> {
        self.projections
            .get(proj.0)
            .ok_or(SimError::UnknownProjection(proj.0))
    }

    /// Current weights of a projection, in connection order.
    pub fn weights(&self, proj: ProjectionId) -> Result<Vec<f64>> {
        Ok(self.projection_ref(proj)?.weights())
    }

    /// Recorded data for a population.
    pub fn get_data(&self, pop: PopulationId) -> Result<Recording> {
        Ok(self.population_ref(pop)?.recording().clone())
    }

    // ========================================================================
    // EXECUTION
    // ========================================================================

    /// Run for `duration_ms` of simulated time.
    ///
    /// Start callbacks fire first. The run ends early if the handle has been
    /// stopped. When `time_scale` is set, each step is paced against the
    /// wall clock; a run that falls behind catches up without sleeping.
    pub fn run(&mut self, duration_ms: f64) -> RunSummary {
        let dt = self.config.timestep_ms;
        let steps = (duration_ms / dt).round().max(0.0) as u64;
        let start_ms = self.time_ms();

        for (_, callback) in self.start_callbacks.iter_mut() {
            callback(&self.sender);
        }

        debug!(start_ms, duration_ms, steps, "run started");

        let wall_start = Instant::now();
        let mut spikes = 0;
        let mut done = 0;
        let mut stopped_early = false;

        for k in 0..steps {
            if self.handle.is_stopped() {
                stopped_early = true;
                break;
            }
            spikes += self.step();
            done += 1;

            if let Some(scale) = self.config.time_scale {
                let target = wall_start + Duration::from_secs_f64((k + 1) as f64 * dt * scale / 1000.0);
                let now = Instant::now();
                if target > now {
                    thread::sleep(target - now);
                }
            }
        }

        let summary = RunSummary {
            start_ms,
            end_ms: self.time_ms(),
            steps: done,
            spikes,
            stopped_early,
        };
        debug!(?summary, "run finished");
        summary
    }

    /// Advance one timestep. Returns the number of spikes emitted.
    fn step(&mut self) -> usize {
        let dt = self.config.timestep_ms;
        let now = self.now;

        // 1. INJECT
        let mut injected: Vec<Vec<usize>> = vec![Vec::new(); self.populations.len()];
        while let Ok(msg) = self.inject_rx.try_recv() {
            if let Some(slot) = injected.get_mut(msg.population) {
                slot.extend(msg.neuron_ids);
            }
        }

        // 2-3. DELIVER + INTEGRATE
        let fired: Vec<Vec<Spike>> = self
            .populations
            .iter_mut()
            .zip(injected.iter())
            .map(|(pop, inj)| pop.step(now, dt, inj))
            .collect();
        let ids: Vec<Vec<usize>> = fired
            .iter()
            .map(|spikes| spikes.iter().map(|s| s.neuron).collect())
            .collect();

        // 4. PROPAGATE (schedule delayed events, apply STDP)
        for proj in &mut self.projections {
            let events = proj.step(dt, &ids[proj.pre.0], &ids[proj.post.0]);
            let delay = proj.delay_steps();
            let target = &mut self.populations[proj.post.0];
            for e in events {
                target.schedule(now, delay, e.post, e.weight);
            }
        }

        // 5. PUBLISH
        let time_ms = now as f64 * dt;
        for ((pop, spikes), neuron_ids) in self.populations.iter().zip(&fired).zip(&ids) {
            if !pop.live_output || neuron_ids.is_empty() {
                continue;
            }
            trace!(label = %pop.label, time_ms, ?neuron_ids, "live spikes");
            let event = LiveSpikeEvent {
                label: pop.label.clone(),
                time_ms,
                neuron_ids: neuron_ids.clone(),
                offsets_ms: spikes.iter().map(|s| s.offset_ms).collect(),
            };
            // Receivers that have been dropped are pruned here
            self.subscribers
                .retain(|s| !s.labels.contains(&pop.label) || s.tx.send(event.clone()).is_ok());
        }

        self.now += 1;
        self.handle.set_step(self.now);

        ids.iter().map(Vec::len).sum()
    }
}
