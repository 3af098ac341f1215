//! Discrete episodic environments.
//!
//! Both environments share the [`DiscreteEnvironment`] contract but nothing
//! else: the warehouse graph is a dense reward matrix, the grid world is a map
//! of walls and bottleneck cells.
//!
//! # Lifecycle
//!
//! 1. Construct the environment from its configuration.
//! 2. Call [`DiscreteEnvironment::reset`] to start an episode.
//! 3. Repeatedly call [`DiscreteEnvironment::step`] until the returned
//!    [`Transition`] is `done`.

pub mod error;
pub mod grid;
pub mod warehouse;

pub use error::EnvironmentError;
pub use grid::{GridMap, GridStepInfo, GridWorld, GridWorldConfig, MapConfig, RewardConfig};
pub use warehouse::{RewardMatrix, WarehouseConfig, WarehouseEnv, WarehouseStepInfo};

use crate::types::{ActionId, StateId};

/// Result of a single environment step.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<I> {
    /// State after the step.
    pub next_state: StateId,
    /// Reward attached to the transition.
    pub reward: f64,
    /// Whether the episode is over (goal reached or step cap hit).
    pub done: bool,
    /// Whether the episode ended because the goal was reached.
    pub reached_goal: bool,
    /// Variant-specific details about the step.
    pub info: I,
}

/// Per-step details an environment reports alongside each [`Transition`].
pub trait StepInfo {
    /// Number of steps taken in the current episode, this one included.
    fn step_count(&self) -> usize;

    /// Severity of the bottleneck entered by this step (0 if none).
    fn bottleneck_level(&self) -> u8 {
        0
    }
}

/// A finite MDP with episodic resets.
pub trait DiscreteEnvironment {
    /// Typed step details returned with every transition.
    type Info: StepInfo + Clone + std::fmt::Debug;

    /// Size of the state space.
    fn n_states(&self) -> usize;

    /// Size of the action space.
    fn n_actions(&self) -> usize;

    /// Actions whose transition is legal from `state`, in ascending index order.
    ///
    /// May be empty for dead-end states.
    fn valid_actions(&self, state: StateId) -> Vec<ActionId>;

    /// State reached by taking `action` from `state` without touching the
    /// live episode. Illegal or out-of-range actions resolve to `state`.
    fn destination(&self, state: StateId, action: ActionId) -> StateId;

    /// Starts a new episode and returns the start state.
    fn reset(&mut self) -> StateId;

    /// Applies `action` to the live episode.
    fn step(&mut self, action: ActionId) -> Result<Transition<Self::Info>, EnvironmentError>;

    /// Current state of the live episode, `None` before the first reset.
    fn current_state(&self) -> Option<StateId>;

    /// Steps taken in the live episode.
    fn step_count(&self) -> usize;
}
