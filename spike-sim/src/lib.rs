//! Spike Sim: a small current-based LIF simulator with spike-pair STDP.
//!
//! Networks are built from labelled populations joined by projections, run
//! for a number of milliseconds at a time, and driven from other threads
//! through live spike injection and live output subscriptions.

pub mod connector;
pub mod constants;
pub mod error;
pub mod live;
pub mod neuron;
pub mod population;
pub mod projection;
pub mod simulator;
pub mod synapse;
pub mod utils;

pub use connector::Connector;
pub use error::{Result, SimError};
pub use live::{LiveSpikeEvent, LiveSpikeReceiver, SimulationHandle, SpikeSender};
pub use neuron::IfCurrExp;
pub use population::{CellType, PopulationId, RecordVariables, Recording, Spike};
pub use projection::ProjectionId;
pub use simulator::{RunSummary, SimConfig, Simulator, StartCallback};
pub use synapse::{AdditiveWeightDependence, SpikePairRule, StaticSynapse, StdpMechanism, SynapseType};
