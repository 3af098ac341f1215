//! Training-loop settings.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Episode budget for [`Trainer`](super::Trainer).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrainingConfig {
    /// Number of episodes to run.
    pub num_episodes: usize,
    /// Per-episode step budget of the loop itself; independent of the
    /// environment's own step cap.
    pub max_steps: usize,
    /// Emit a debug log line every this many episodes (0 disables).
    pub log_interval: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            num_episodes: 1000,
            max_steps: 100,
            log_interval: 100,
        }
    }
}
