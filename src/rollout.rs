//! Greedy policy extraction from a trained agent.
//!
//! [`GreedyRollout`] replays the learned policy without exploration and
//! records the path it takes. [`grid_value_map`] and [`grid_policy_map`] lay
//! the learned values and greedy moves out on the grid for rendering.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::agent::QLearningAgent;
use crate::environment::{DiscreteEnvironment, EnvironmentError, GridWorld, StepInfo};
use crate::types::{ActionId, Direction, StateId, FALLBACK_ACTION};

/// Path and return of one greedy episode.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rollout {
    /// Visited states, start state first.
    pub states: Vec<StateId>,
    /// Sum of the rewards collected.
    pub total_reward: f64,
    /// Whether the goal was reached within the hop budget.
    pub reached_goal: bool,
    /// Bottleneck cells entered.
    pub bottleneck_hits: u32,
    /// Summed severity of the bottlenecks entered.
    pub bottleneck_severity: u32,
    /// How often a self-loop was replaced by a tied alternative.
    pub cycle_breaks: u32,
}

impl Rollout {
    /// Number of moves made.
    pub fn hops(&self) -> usize {
        self.states.len().saturating_sub(1)
    }
}

/// Greedy evaluation with a hop budget.
///
/// Running out of hops before the goal is a normal outcome, reported
/// through [`Rollout::reached_goal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GreedyRollout {
    max_hops: usize,
}

impl Default for GreedyRollout {
    fn default() -> Self {
        Self { max_hops: 200 }
    }
}

impl GreedyRollout {
    pub fn new(max_hops: usize) -> Self {
        Self { max_hops }
    }

    pub fn max_hops(&self) -> usize {
        self.max_hops
    }

    /// Resets `env` and follows the greedy policy until the episode ends
    /// or the hop budget is spent.
    pub fn run<E>(&self, env: &mut E, agent: &QLearningAgent) -> Result<Rollout, EnvironmentError>
    where
        E: DiscreteEnvironment,
    {
        let mut state = env.reset();
        let mut rollout = Rollout {
            states: vec![state],
            total_reward: 0.0,
            reached_goal: false,
            bottleneck_hits: 0,
            bottleneck_severity: 0,
            cycle_breaks: 0,
        };

        for _ in 0..self.max_hops {
            let (action, broke_cycle) = select_greedy(env, agent, state);
            if broke_cycle {
                rollout.cycle_breaks += 1;
            }

            let transition = env.step(action)?;
            rollout.total_reward += transition.reward;
            rollout.states.push(transition.next_state);

            let level = transition.info.bottleneck_level();
            if level > 0 {
                rollout.bottleneck_hits += 1;
                rollout.bottleneck_severity += u32::from(level);
            }

            state = transition.next_state;
            if transition.done {
                rollout.reached_goal = transition.reached_goal;
                break;
            }
        }

        tracing::debug!(
            hops = rollout.hops(),
            reached_goal = rollout.reached_goal,
            total_reward = rollout.total_reward,
            "greedy rollout finished"
        );
        Ok(rollout)
    }
}

/// Greedy action at `state`, avoiding self-loops where a tie allows it.
///
/// If the greedy action would leave the agent where it is, the first
/// tied-maximum valid action (in index order) that moves somewhere else is
/// taken instead. Returns the action and whether that substitution happened.
pub fn select_greedy<E>(env: &E, agent: &QLearningAgent, state: StateId) -> (ActionId, bool)
where
    E: DiscreteEnvironment,
{
    let valid = env.valid_actions(state);
    let Some(greedy) = agent.predict_action(state, &valid) else {
        return (FALLBACK_ACTION, false);
    };
    if env.destination(state, greedy) != state {
        return (greedy, false);
    }

    agent
        .q_table()
        .tied_best(state, &valid)
        .into_iter()
        .find(|&a| env.destination(state, a) != state)
        .map_or((greedy, false), |a| (a, true))
}

/// Greedy state value of every grid cell, indexed `[row][col]`.
///
/// Walls and cells without valid moves are `None`.
pub fn grid_value_map(env: &GridWorld, agent: &QLearningAgent) -> Vec<Vec<Option<f64>>> {
    let map = env.map();
    let mut values = vec![vec![None; map.cols()]; map.rows()];
    for state in 0..env.n_states() {
        let cell = env.coord_of(state);
        values[cell.row][cell.col] = agent.state_value(state, &env.valid_actions(state));
    }
    values
}

/// Greedy move of every grid cell, indexed `[row][col]`.
///
/// Walls and cells without valid moves are `None`.
pub fn grid_policy_map(env: &GridWorld, agent: &QLearningAgent) -> Vec<Vec<Option<Direction>>> {
    let map = env.map();
    let mut policy = vec![vec![None; map.cols()]; map.rows()];
    for state in 0..env.n_states() {
        let cell = env.coord_of(state);
        policy[cell.row][cell.col] = agent
            .predict_action(state, &env.valid_actions(state))
            .and_then(Direction::from_index);
    }
    policy
}
