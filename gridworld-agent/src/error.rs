//! Errors raised by the agent, its environment and its vision routine.

use spike_sim::SimError;
use thiserror::Error;

/// Result alias for agent operations.
pub type Result<T> = std::result::Result<T, AgentError>;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("simulator: {0}")]
    Sim(#[from] SimError),

    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("level line {line}: {reason}")]
    Level { line: usize, reason: String },

    #[error("frame: {0}")]
    Frame(String),

    #[error("template is {template_w}x{template_h} but image is only {image_w}x{image_h}")]
    TemplateTooLarge {
        template_w: usize,
        template_h: usize,
        image_w: usize,
        image_h: usize,
    },

    #[error("invalid config: {0}")]
    Config(String),

    #[error("simulation task failed: {0}")]
    Task(String),
}
