//! Hyperparameters for the tabular Q-learning agent.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::error::AgentError;

/// Learning and exploration hyperparameters.
///
/// Exploration starts at `epsilon_start` and is multiplied by
/// `epsilon_decay` once per finished episode, never dropping below
/// `epsilon_min`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AgentConfig {
    /// Learning rate α, in (0, 1].
    pub alpha: f64,
    /// Discount factor γ, in [0, 1].
    pub gamma: f64,
    /// Initial exploration probability.
    pub epsilon_start: f64,
    /// Exploration floor.
    pub epsilon_min: f64,
    /// Multiplicative decay per episode, in (0, 1].
    pub epsilon_decay: f64,
}

impl AgentConfig {
    /// Checks every hyperparameter against its admissible range.
    pub fn validate(&self) -> Result<(), AgentError> {
        check("alpha", self.alpha, self.alpha > 0.0 && self.alpha <= 1.0, "0 < alpha <= 1")?;
        check("gamma", self.gamma, (0.0..=1.0).contains(&self.gamma), "0 <= gamma <= 1")?;
        check(
            "epsilon_start",
            self.epsilon_start,
            (0.0..=1.0).contains(&self.epsilon_start),
            "0 <= epsilon_start <= 1",
        )?;
        check(
            "epsilon_min",
            self.epsilon_min,
            self.epsilon_min >= 0.0 && self.epsilon_min <= self.epsilon_start,
            "0 <= epsilon_min <= epsilon_start",
        )?;
        check(
            "epsilon_decay",
            self.epsilon_decay,
            self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0,
            "0 < epsilon_decay <= 1",
        )
    }
}

fn check(name: &'static str, value: f64, ok: bool, expected: &'static str) -> Result<(), AgentError> {
    if ok {
        Ok(())
    } else {
        Err(AgentError::InvalidHyperparameter {
            name,
            value,
            expected,
        })
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            alpha: 0.9,
            gamma: 0.75,
            epsilon_start: 1.0,
            epsilon_min: 0.05,
            epsilon_decay: 0.995,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(AgentConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_alpha() {
        let cfg = AgentConfig {
            alpha: 0.0,
            ..AgentConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(AgentError::InvalidHyperparameter { name: "alpha", .. })
        ));
    }

    #[test]
    fn rejects_floor_above_start() {
        let cfg = AgentConfig {
            epsilon_start: 0.1,
            epsilon_min: 0.2,
            ..AgentConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(AgentError::InvalidHyperparameter {
                name: "epsilon_min",
                ..
            })
        ));
    }

    #[test]
    fn rejects_nan() {
        let cfg = AgentConfig {
            gamma: f64::NAN,
            ..AgentConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
