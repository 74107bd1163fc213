//! Connectors: rules that expand into explicit (pre, post) index pairs.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Connector {
    /// Neuron i connects to neuron i. Populations must be the same size.
    OneToOne,
    /// Every pre neuron connects to every post neuron.
    AllToAll,
    /// Explicit list of (pre, post) pairs.
    FromList(Vec<(usize, usize)>),
}

impl Connector {
    /// Expand into (pre, post) pairs, validating against population sizes.
    pub fn connections(&self, pre_size: usize, post_size: usize) -> Result<Vec<(usize, usize)>> {
        match self {
            Connector::OneToOne => {
                if pre_size != post_size {
                    return Err(SimError::ConnectorMismatch {
                        pre: pre_size,
                        post: post_size,
                        reason: "one-to-one needs populations of equal size",
                    });
                }
                Ok((0..pre_size).map(|i| (i, i)).collect())
            }
            Connector::AllToAll => Ok((0..pre_size)
                .flat_map(|i| (0..post_size).map(move |j| (i, j)))
                .collect()),
            Connector::FromList(pairs) => {
                if pairs
                    .iter()
                    .any(|&(pre, post)| pre >= pre_size || post >= post_size)
                {
                    return Err(SimError::ConnectorMismatch {
                        pre: pre_size,
                        post: post_size,
                        reason: "list entry outside population bounds",
                    });
                }
                Ok(pairs.clone())
            }
        }
    }
}
