//! qroute - tabular Q-learning for shortest-path routing
//!
//! Discrete environments (a fixed warehouse graph and a grid world with
//! walls and bottlenecks), an ε-greedy Q-learning agent, an episodic
//! training loop, and greedy policy extraction with self-loop breaking.

pub mod agent;
pub mod environment;
pub mod rollout;
pub mod training;
pub mod types;

pub use agent::{AgentConfig, QLearningAgent, QTable};
pub use environment::{DiscreteEnvironment, EnvironmentError, GridWorld, WarehouseEnv};
pub use rollout::{GreedyRollout, Rollout};
pub use training::{train_seeded, Trainer, TrainingConfig, TrainingReport};
pub use types::{ActionId, Coord, Direction, StateId};
