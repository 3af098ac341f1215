//! Fixed-topology warehouse graph.
//!
//! The graph is encoded directly in a square reward matrix `R[s][a]`: a
//! positive entry means node `s` connects to node `a` and moving there pays
//! `R[s][a]`. The action identifier *is* the destination node, so the action
//! space has the same size as the state space.

use petgraph::algo::dijkstra;
use petgraph::graph::{DiGraph, NodeIndex};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::error::EnvironmentError;
use super::{DiscreteEnvironment, StepInfo, Transition};
use crate::types::{ActionId, StateId};

/// Reward for an ordinary corridor move in the default layout.
pub const CORRIDOR_REWARD: f64 = 1.0;

/// Reward for any move arriving directly at the goal node.
pub const GOAL_ARRIVAL_REWARD: f64 = 1000.0;

/// Node count of the default warehouse layout.
pub const DEFAULT_NODES: usize = 12;

/// Goal node of the default warehouse layout.
pub const DEFAULT_GOAL: StateId = 11;

/// Undirected corridors of the default warehouse layout.
pub const DEFAULT_EDGES: [(StateId, StateId); 14] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 7),
    (7, 11),
    (1, 5),
    (5, 6),
    (6, 10),
    (2, 6),
    (3, 4),
    (4, 8),
    (8, 9),
    (9, 10),
    (10, 11),
];

/// Dense square reward matrix describing a directed reward graph.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardMatrix {
    n: usize,
    values: Vec<f64>,
}

impl RewardMatrix {
    /// An `n × n` matrix with every move illegal.
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            values: vec![0.0; n * n],
        }
    }

    /// Builds a matrix from explicit rows. Every row must have as many
    /// entries as there are rows.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, EnvironmentError> {
        let n = rows.len();
        if n == 0 {
            return Err(EnvironmentError::configuration("reward matrix is empty"));
        }
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != n) {
            return Err(EnvironmentError::configuration(format!(
                "reward matrix must be square: row {} has {} entries, expected {}",
                i,
                row.len(),
                n
            )));
        }
        Ok(Self {
            n,
            values: rows.into_iter().flatten().collect(),
        })
    }

    /// Builds an `n`-node matrix from undirected edges paying `edge_reward`
    /// in both directions, then raises every edge entering `goal` to
    /// `goal_reward`.
    pub fn from_edges(
        n: usize,
        edges: &[(StateId, StateId)],
        edge_reward: f64,
        goal: StateId,
        goal_reward: f64,
    ) -> Result<Self, EnvironmentError> {
        if n == 0 {
            return Err(EnvironmentError::configuration("reward matrix is empty"));
        }
        if goal >= n {
            return Err(EnvironmentError::configuration(format!(
                "goal node {} is outside [0, {})",
                goal, n
            )));
        }
        if let Some(&(a, b)) = edges.iter().find(|(a, b)| *a >= n || *b >= n) {
            return Err(EnvironmentError::configuration(format!(
                "edge ({}, {}) references a node outside [0, {})",
                a, b, n
            )));
        }

        let mut matrix = Self::zeros(n);
        for &(a, b) in edges {
            matrix.connect(a, b, edge_reward);
        }
        matrix.reward_arrivals(goal, goal_reward);
        Ok(matrix)
    }

    /// The 12-node default layout: corridor moves pay 1, arriving at node 11
    /// pays 1000.
    pub fn warehouse_default() -> Self {
        let mut matrix = Self::zeros(DEFAULT_NODES);
        for &(a, b) in DEFAULT_EDGES.iter() {
            matrix.connect(a, b, CORRIDOR_REWARD);
        }
        matrix.reward_arrivals(DEFAULT_GOAL, GOAL_ARRIVAL_REWARD);
        matrix
    }

    fn connect(&mut self, a: StateId, b: StateId, reward: f64) {
        self.set(a, b, reward);
        self.set(b, a, reward);
    }

    fn reward_arrivals(&mut self, goal: StateId, reward: f64) {
        for s in 0..self.n {
            if self.get(s, goal) > 0.0 {
                self.set(s, goal, reward);
            }
        }
    }

    /// Number of nodes.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Reward for moving from `from` to `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is `>= n`.
    pub fn get(&self, from: StateId, to: StateId) -> f64 {
        assert!(from < self.n && to < self.n, "node index out of range");
        self.values[from * self.n + to]
    }

    /// Overwrites the reward for moving from `from` to `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is `>= n`.
    pub fn set(&mut self, from: StateId, to: StateId, reward: f64) {
        assert!(from < self.n && to < self.n, "node index out of range");
        self.values[from * self.n + to] = reward;
    }

    /// Rewards for every move out of `from`.
    pub fn row(&self, from: StateId) -> &[f64] {
        &self.values[from * self.n..(from + 1) * self.n]
    }

    /// Destinations with a positive reward from `from`, ascending.
    pub fn legal_moves(&self, from: StateId) -> Vec<ActionId> {
        self.row(from)
            .iter()
            .enumerate()
            .filter(|(_, &r)| r > 0.0)
            .map(|(a, _)| a)
            .collect()
    }

    /// Directed graph of the legal moves, weighted by reward.
    ///
    /// Node `i` of the graph is state `i`.
    pub fn topology(&self) -> DiGraph<(), f64> {
        let mut graph = DiGraph::with_capacity(self.n, self.n);
        for _ in 0..self.n {
            graph.add_node(());
        }
        for from in 0..self.n {
            for to in self.legal_moves(from) {
                graph.add_edge(
                    NodeIndex::new(from),
                    NodeIndex::new(to),
                    self.get(from, to),
                );
            }
        }
        graph
    }

    /// Fewest moves needed to go from `from` to `to`, `None` if unreachable.
    pub fn shortest_hops(&self, from: StateId, to: StateId) -> Option<usize> {
        let graph = self.topology();
        dijkstra(&graph, NodeIndex::new(from), Some(NodeIndex::new(to)), |_| 1usize)
            .get(&NodeIndex::new(to))
            .copied()
    }

    /// Longest shortest-path hop count between any two mutually reachable nodes.
    pub fn diameter(&self) -> usize {
        let graph = self.topology();
        (0..self.n)
            .filter_map(|from| {
                dijkstra(&graph, NodeIndex::new(from), None, |_| 1usize)
                    .into_values()
                    .max()
            })
            .max()
            .unwrap_or(0)
    }
}

/// Configuration for [`WarehouseEnv`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WarehouseConfig {
    /// Node every episode starts from.
    pub start: StateId,
    /// Terminal node.
    pub goal: StateId,
    /// Step cap per episode.
    pub max_steps: usize,
    /// Reward for an illegal move (the agent stays where it is).
    pub illegal_move_penalty: f64,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            start: 0,
            goal: DEFAULT_GOAL,
            max_steps: 100,
            illegal_move_penalty: -10.0,
        }
    }
}

/// Step details for [`WarehouseEnv`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarehouseStepInfo {
    /// Node occupied after the step.
    pub node: StateId,
    /// Steps taken so far in the episode.
    pub step_count: usize,
    /// Whether the move was illegal and the agent stayed in place.
    pub illegal_move: bool,
}

impl StepInfo for WarehouseStepInfo {
    fn step_count(&self) -> usize {
        self.step_count
    }
}

/// Warehouse routing environment over a [`RewardMatrix`].
#[derive(Debug, Clone)]
pub struct WarehouseEnv {
    rewards: RewardMatrix,
    config: WarehouseConfig,
    state: Option<StateId>,
    steps: usize,
}

impl WarehouseEnv {
    /// Creates the environment, checking that start and goal are nodes of the
    /// matrix and that the step cap is positive.
    pub fn new(rewards: RewardMatrix, config: WarehouseConfig) -> Result<Self, EnvironmentError> {
        let n = rewards.n();
        if config.start >= n || config.goal >= n {
            return Err(EnvironmentError::configuration(format!(
                "start {} and goal {} must be nodes in [0, {})",
                config.start, config.goal, n
            )));
        }
        if config.max_steps == 0 {
            return Err(EnvironmentError::configuration("max_steps must be positive"));
        }
        Ok(Self {
            rewards,
            config,
            state: None,
            steps: 0,
        })
    }

    /// The default 12-node layout with the default configuration.
    pub fn warehouse_default() -> Self {
        Self {
            rewards: RewardMatrix::warehouse_default(),
            config: WarehouseConfig::default(),
            state: None,
            steps: 0,
        }
    }

    pub fn rewards(&self) -> &RewardMatrix {
        &self.rewards
    }

    pub fn config(&self) -> &WarehouseConfig {
        &self.config
    }

    pub fn goal(&self) -> StateId {
        self.config.goal
    }
}

impl DiscreteEnvironment for WarehouseEnv {
    type Info = WarehouseStepInfo;

    fn n_states(&self) -> usize {
        self.rewards.n()
    }

    fn n_actions(&self) -> usize {
        self.rewards.n()
    }

    fn valid_actions(&self, state: StateId) -> Vec<ActionId> {
        self.rewards.legal_moves(state)
    }

    fn destination(&self, state: StateId, action: ActionId) -> StateId {
        if action < self.n_actions() && self.rewards.get(state, action) > 0.0 {
            action
        } else {
            state
        }
    }

    fn reset(&mut self) -> StateId {
        self.state = Some(self.config.start);
        self.steps = 0;
        self.config.start
    }

    fn step(&mut self, action: ActionId) -> Result<Transition<Self::Info>, EnvironmentError> {
        let state = self.state.ok_or(EnvironmentError::UninitializedEpisode)?;
        let n_actions = self.n_actions();
        if action >= n_actions {
            return Err(EnvironmentError::InvalidAction { action, n_actions });
        }

        let edge_reward = self.rewards.get(state, action);
        let illegal_move = edge_reward <= 0.0;
        let (next_state, reward) = if illegal_move {
            tracing::trace!(state, action, "illegal warehouse move");
            (state, self.config.illegal_move_penalty)
        } else {
            (action, edge_reward)
        };

        self.state = Some(next_state);
        self.steps += 1;

        let reached_goal = next_state == self.config.goal;
        let done = reached_goal || self.steps >= self.config.max_steps;

        Ok(Transition {
            next_state,
            reward,
            done,
            reached_goal,
            info: WarehouseStepInfo {
                node: next_state,
                step_count: self.steps,
                illegal_move,
            },
        })
    }

    fn current_state(&self) -> Option<StateId> {
        self.state
    }

    fn step_count(&self) -> usize {
        self.steps
    }
}
