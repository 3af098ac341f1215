use thiserror::Error;

/// Errors raised while building a [`QLearningAgent`](super::QLearningAgent).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AgentError {
    #[error("Hyperparameter {name} = {value} is out of range (expected {expected})")]
    InvalidHyperparameter {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("Q-table needs at least one state and one action, got {n_states}x{n_actions}")]
    EmptyTable { n_states: usize, n_actions: usize },
}
