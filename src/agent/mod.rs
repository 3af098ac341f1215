//! Tabular Q-learning agent.
//!
//! ```
//! use qroute::agent::{AgentConfig, QLearningAgent};
//!
//! let mut agent = QLearningAgent::new(12, 12, AgentConfig::default()).unwrap();
//! agent.update(0, 1, 1.0, 1, &[0, 2, 5]);
//! assert!(agent.q_table().get(0, 1) > 0.0);
//! ```

pub mod config;
pub mod error;
pub mod q_learning;
pub mod q_table;

pub use config::AgentConfig;
pub use error::AgentError;
pub use q_learning::QLearningAgent;
pub use q_table::QTable;
