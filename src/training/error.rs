use thiserror::Error;

use crate::agent::AgentError;
use crate::environment::EnvironmentError;

/// Errors surfaced by the training loop.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrainingError {
    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(
        "Agent table is {agent_states}x{agent_actions} but the environment is {env_states}x{env_actions}"
    )]
    ShapeMismatch {
        agent_states: usize,
        agent_actions: usize,
        env_states: usize,
        env_actions: usize,
    },
}
