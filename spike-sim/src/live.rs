//! Live spike I/O between a running simulation and other threads.
//!
//! Injection goes through a [`SpikeSender`], which is cheap to clone and can be
//! moved into any thread or task. Output spikes from populations with live
//! output enabled are published to every [`LiveSpikeReceiver`] subscribed to
//! their label. Both directions use unbounded `tokio::sync::mpsc` channels, so
//! the simulation loop never blocks on a slow consumer.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::mpsc;

use crate::error::{Result, SimError};

/// Spikes to emit from an injector population on the next timestep.
#[derive(Debug, Clone, PartialEq)]
pub struct InjectedSpikes {
    pub population: usize,
    pub neuron_ids: Vec<usize>,
}

/// Spikes one population emitted during one timestep.
///
/// `neuron_ids` is ordered by threshold crossing, earliest first.
/// `offsets_ms[k]` is when neuron `neuron_ids[k]` crossed, in ms after
/// `time_ms`.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveSpikeEvent {
    pub label: String,
    pub time_ms: f64,
    pub neuron_ids: Vec<usize>,
    pub offsets_ms: Vec<f64>,
}

impl LiveSpikeEvent {
    /// The earliest neuron in the event that `keep` accepts.
    pub fn first_where(&self, keep: impl Fn(usize) -> bool) -> Option<usize> {
        self.neuron_ids.iter().copied().find(|&id| keep(id))
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct LabelEntry {
    pub id: usize,
    pub size: usize,
    pub injector: bool,
}

/// Label directory shared between the simulator and its senders.
pub(crate) type LabelTable = Arc<RwLock<HashMap<String, LabelEntry>>>;

/// Handle for injecting spikes into injector populations by label.
#[derive(Debug, Clone)]
pub struct SpikeSender {
    tx: mpsc::UnboundedSender<InjectedSpikes>,
    labels: LabelTable,
}

impl SpikeSender {
    pub(crate) fn new(tx: mpsc::UnboundedSender<InjectedSpikes>, labels: LabelTable) -> Self {
        Self { tx, labels }
    }

    /// Inject one spike into neuron `neuron_id` of the injector `label`.
    pub fn send_spike(&self, label: &str, neuron_id: usize) -> Result<()> {
        self.send_spikes(label, &[neuron_id])
    }

    /// Inject a spike into each listed neuron of the injector `label`.
    pub fn send_spikes(&self, label: &str, neuron_ids: &[usize]) -> Result<()> {
        let entry = {
            let table = self.labels.read().unwrap_or_else(|e| e.into_inner());
            *table
                .get(label)
                .ok_or_else(|| SimError::UnknownLabel(label.to_string()))?
        };
        if !entry.injector {
            return Err(SimError::NotInjector(label.to_string()));
        }
        if let Some(&bad) = neuron_ids.iter().find(|&&i| i >= entry.size) {
            return Err(SimError::IndexOutOfRange {
                label: label.to_string(),
                index: bad,
                size: entry.size,
            });
        }

        self.tx
            .send(InjectedSpikes {
                population: entry.id,
                neuron_ids: neuron_ids.to_vec(),
            })
            .map_err(|_| SimError::Disconnected)
    }
}

/// Receives output spikes for a fixed set of population labels.
#[derive(Debug)]
pub struct LiveSpikeReceiver {
    rx: mpsc::UnboundedReceiver<LiveSpikeEvent>,
}

impl LiveSpikeReceiver {
    pub(crate) fn new(rx: mpsc::UnboundedReceiver<LiveSpikeEvent>) -> Self {
        Self { rx }
    }

    /// Wait for the next event. `None` once the simulator is gone.
    pub async fn recv(&mut self) -> Option<LiveSpikeEvent> {
        self.rx.recv().await
    }

    /// Blocking variant for plain threads. Must not be called from async code.
    pub fn blocking_recv(&mut self) -> Option<LiveSpikeEvent> {
        self.rx.blocking_recv()
    }

    /// Next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<LiveSpikeEvent> {
        self.rx.try_recv().ok()
    }

    /// Discard everything queued so far. Returns how many events were dropped.
    pub fn drain(&mut self) -> usize {
        let mut n = 0;
        while self.rx.try_recv().is_ok() {
            n += 1;
        }
        n
    }
}

/// Subscriber slot held by the simulator.
#[derive(Debug)]
pub(crate) struct Subscriber {
    pub labels: HashSet<String>,
    pub tx: mpsc::UnboundedSender<LiveSpikeEvent>,
}

/// Cross-thread view of a running simulation: current time and a stop flag.
#[derive(Debug, Clone)]
pub struct SimulationHandle {
    stop: Arc<AtomicBool>,
    now_step: Arc<AtomicU64>,
    dt: f64,
}

impl SimulationHandle {
    pub(crate) fn new(dt: f64) -> Self {
        Self {
            stop: Arc::new(AtomicBool::new(false)),
            now_step: Arc::new(AtomicU64::new(0)),
            dt,
        }
    }

    /// Ask the simulation to stop at the end of the current timestep.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Simulated time in milliseconds.
    pub fn time_ms(&self) -> f64 {
        self.now_step.load(Ordering::Relaxed) as f64 * self.dt
    }

    pub(crate) fn set_step(&self, step: u64) {
        self.now_step.store(step, Ordering::Relaxed);
    }
}
