//! Errors raised while building or driving a simulation.

use thiserror::Error;

/// Result alias for simulator operations.
pub type Result<T> = std::result::Result<T, SimError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    #[error("population label {0:?} is already in use")]
    DuplicateLabel(String),

    #[error("no population labelled {0:?}")]
    UnknownLabel(String),

    #[error("population id {0} does not exist")]
    UnknownPopulation(usize),

    #[error("projection id {0} does not exist")]
    UnknownProjection(usize),

    #[error("neuron {index} is out of range for {label:?} (size {size})")]
    IndexOutOfRange {
        label: String,
        index: usize,
        size: usize,
    },

    #[error("connector cannot join {pre} neurons to {post} neurons: {reason}")]
    ConnectorMismatch {
        pre: usize,
        post: usize,
        reason: &'static str,
    },

    #[error("delay of {0} ms is outside the supported range")]
    InvalidDelay(f64),

    #[error("population {0:?} is not a spike injector")]
    NotInjector(String),

    #[error("simulation is no longer accepting spikes")]
    Disconnected,
}
