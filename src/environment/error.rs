use thiserror::Error;

use crate::types::ActionId;

/// Errors raised by [`DiscreteEnvironment`](super::DiscreteEnvironment) implementations.
///
/// Every variant is a caller precondition violation; nothing here is transient.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvironmentError {
    #[error("Invalid environment configuration: {reason}")]
    Configuration { reason: String },

    #[error("Action {action} is outside the action space [0, {n_actions})")]
    InvalidAction { action: ActionId, n_actions: usize },

    #[error("step() called before reset(): the episode has no current state")]
    UninitializedEpisode,
}

impl EnvironmentError {
    pub(crate) fn configuration(reason: impl Into<String>) -> Self {
        EnvironmentError::Configuration {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_display() {
        let e = EnvironmentError::configuration("start (0, 0) is a wall");
        assert_eq!(
            e.to_string(),
            "Invalid environment configuration: start (0, 0) is a wall"
        );
    }

    #[test]
    fn invalid_action_display() {
        let e = EnvironmentError::InvalidAction {
            action: 7,
            n_actions: 4,
        };
        assert_eq!(e.to_string(), "Action 7 is outside the action space [0, 4)");
    }

    #[test]
    fn uninitialized_display() {
        let e = EnvironmentError::UninitializedEpisode;
        assert!(e.to_string().contains("before reset()"));
    }
}
