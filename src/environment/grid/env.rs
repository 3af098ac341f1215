//! Grid-world environment with walls and bottleneck costs.

use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::map::GridMap;
use crate::environment::error::EnvironmentError;
use crate::environment::{DiscreteEnvironment, StepInfo, Transition};
use crate::types::{ActionId, Coord, Direction, StateId};

/// Reward shaping for [`GridWorld`].
///
/// A legal move pays `step_cost`, plus `bottleneck_base_penalty × level`
/// when it enters a bottleneck, plus `goal_reward` when it enters the goal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RewardConfig {
    pub step_cost: f64,
    pub goal_reward: f64,
    /// Paid instead of `step_cost` when a move hits a wall or the border.
    pub invalid_move_penalty: f64,
    /// Per-severity-level bottleneck cost (negative).
    pub bottleneck_base_penalty: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            step_cost: -1.0,
            goal_reward: 100.0,
            invalid_move_penalty: -10.0,
            bottleneck_base_penalty: -6.0,
        }
    }
}

/// Episode configuration for [`GridWorld`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridWorldConfig {
    pub start: Coord,
    pub goal: Coord,
    /// Step cap per episode.
    pub max_steps: usize,
    pub rewards: RewardConfig,
}

impl GridWorldConfig {
    /// Default episode settings between `start` and `goal`.
    pub fn new(start: Coord, goal: Coord) -> Self {
        Self {
            start,
            goal,
            ..Self::default()
        }
    }
}

impl Default for GridWorldConfig {
    fn default() -> Self {
        Self {
            start: Coord::new(0, 0),
            goal: Coord::new(5, 5),
            max_steps: 200,
            rewards: RewardConfig::default(),
        }
    }
}

/// Step details for [`GridWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridStepInfo {
    /// Cell occupied after the step.
    pub coord: Coord,
    /// Steps taken so far in the episode.
    pub step_count: usize,
    /// Severity of the bottleneck entered (0 if none, or if the move was invalid).
    pub bottleneck_level: u8,
}

impl StepInfo for GridStepInfo {
    fn step_count(&self) -> usize {
        self.step_count
    }

    fn bottleneck_level(&self) -> u8 {
        self.bottleneck_level
    }
}

/// A 4-directional grid world over a [`GridMap`].
///
/// States are the traversable cells numbered in row-major order at
/// construction; the numbering never changes for the lifetime of the
/// instance, so a Q-table trained here is meaningless on another map.
#[derive(Debug, Clone)]
pub struct GridWorld {
    map: GridMap,
    config: GridWorldConfig,
    coord_to_state: HashMap<Coord, StateId>,
    state_to_coord: Vec<Coord>,
    position: Option<Coord>,
    steps: usize,
}

impl GridWorld {
    /// Creates the environment.
    ///
    /// Fails when start or goal lies outside the grid or on a wall, or when
    /// the step cap is zero.
    pub fn new(map: GridMap, config: GridWorldConfig) -> Result<Self, EnvironmentError> {
        check_endpoints(&map, config.start, config.goal)?;
        if config.max_steps == 0 {
            return Err(EnvironmentError::configuration("max_steps must be positive"));
        }

        let state_to_coord: Vec<Coord> = map.traversable_cells().collect();
        let coord_to_state = state_to_coord
            .iter()
            .enumerate()
            .map(|(state, coord)| (*coord, state))
            .collect();

        Ok(Self {
            map,
            config,
            coord_to_state,
            state_to_coord,
            position: None,
            steps: 0,
        })
    }

    /// Moves the start and goal. The live episode, if any, is left untouched
    /// until the next reset.
    pub fn set_start_goal(&mut self, start: Coord, goal: Coord) -> Result<(), EnvironmentError> {
        check_endpoints(&self.map, start, goal)?;
        self.config.start = start;
        self.config.goal = goal;
        Ok(())
    }

    pub fn map(&self) -> &GridMap {
        &self.map
    }

    pub fn config(&self) -> &GridWorldConfig {
        &self.config
    }

    pub fn start(&self) -> Coord {
        self.config.start
    }

    pub fn goal(&self) -> Coord {
        self.config.goal
    }

    /// Current cell of the live episode.
    pub fn position(&self) -> Option<Coord> {
        self.position
    }

    /// State id of a traversable cell.
    pub fn state_of(&self, coord: Coord) -> Option<StateId> {
        self.coord_to_state.get(&coord).copied()
    }

    /// Cell of a state id.
    ///
    /// # Panics
    ///
    /// Panics if `state >= n_states()`.
    pub fn coord_of(&self, state: StateId) -> Coord {
        self.state_to_coord[state]
    }

    /// Translates a state path into cells.
    pub fn coords(&self, states: &[StateId]) -> Vec<Coord> {
        states.iter().map(|&s| self.coord_of(s)).collect()
    }

    fn neighbour(&self, cell: Coord, direction: Direction) -> Option<Coord> {
        cell.offset(direction, self.map.rows(), self.map.cols())
            .filter(|next| !self.map.is_wall(*next))
    }
}

fn check_endpoints(map: &GridMap, start: Coord, goal: Coord) -> Result<(), EnvironmentError> {
    for (name, cell) in [("start", start), ("goal", goal)] {
        if !map.contains(cell) {
            return Err(EnvironmentError::configuration(format!(
                "{} {} is outside the {}x{} grid",
                name,
                cell,
                map.rows(),
                map.cols()
            )));
        }
        if map.is_wall(cell) {
            return Err(EnvironmentError::configuration(format!(
                "{} {} lies on a wall",
                name, cell
            )));
        }
    }
    Ok(())
}

impl DiscreteEnvironment for GridWorld {
    type Info = GridStepInfo;

    fn n_states(&self) -> usize {
        self.state_to_coord.len()
    }

    fn n_actions(&self) -> usize {
        Direction::ALL.len()
    }

    fn valid_actions(&self, state: StateId) -> Vec<ActionId> {
        let cell = self.coord_of(state);
        Direction::ALL
            .iter()
            .filter(|dir| self.neighbour(cell, **dir).is_some())
            .map(Direction::index)
            .collect()
    }

    fn destination(&self, state: StateId, action: ActionId) -> StateId {
        let cell = self.coord_of(state);
        Direction::from_index(action)
            .and_then(|dir| self.neighbour(cell, dir))
            .and_then(|next| self.state_of(next))
            .unwrap_or(state)
    }

    fn reset(&mut self) -> StateId {
        self.position = Some(self.config.start);
        self.steps = 0;
        self.coord_to_state[&self.config.start]
    }

    fn step(&mut self, action: ActionId) -> Result<Transition<Self::Info>, EnvironmentError> {
        let cell = self.position.ok_or(EnvironmentError::UninitializedEpisode)?;
        let direction = Direction::from_index(action).ok_or(EnvironmentError::InvalidAction {
            action,
            n_actions: self.n_actions(),
        })?;

        self.steps += 1;
        let rewards = &self.config.rewards;

        let (next, reward, bottleneck_level) = match self.neighbour(cell, direction) {
            None => {
                tracing::trace!(%cell, %direction, "blocked grid move");
                (cell, rewards.invalid_move_penalty, 0)
            }
            Some(next) => {
                let mut reward = rewards.step_cost;
                let level = self.map.bottleneck_level(next);
                if level > 0 {
                    reward += rewards.bottleneck_base_penalty * f64::from(level);
                }
                if next == self.config.goal {
                    reward += rewards.goal_reward;
                }
                (next, reward, level)
            }
        };

        self.position = Some(next);
        let reached_goal = next == self.config.goal;
        let done = reached_goal || self.steps >= self.config.max_steps;

        Ok(Transition {
            next_state: self.coord_to_state[&next],
            reward,
            done,
            reached_goal,
            info: GridStepInfo {
                coord: next,
                step_count: self.steps,
                bottleneck_level,
            },
        })
    }

    fn current_state(&self) -> Option<StateId> {
        self.position.and_then(|cell| self.state_of(cell))
    }

    fn step_count(&self) -> usize {
        self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 3x3 grid, wall in the centre, level-2 bottleneck at (0, 1).
    fn small_world() -> GridWorld {
        let map = GridMap::open(3, 3)
            .unwrap()
            .with_walls([Coord::new(1, 1)])
            .unwrap()
            .with_bottleneck(Coord::new(0, 1), 2)
            .unwrap();
        GridWorld::new(map, GridWorldConfig::new(Coord::new(0, 0), Coord::new(2, 2))).unwrap()
    }

    #[test]
    fn states_enumerate_traversable_cells_row_major() {
        let env = small_world();
        assert_eq!(env.n_states(), 8);
        assert_eq!(env.n_actions(), 4);
        assert_eq!(env.state_of(Coord::new(0, 0)), Some(0));
        assert_eq!(env.state_of(Coord::new(1, 0)), Some(3));
        assert_eq!(env.state_of(Coord::new(1, 1)), None);
        assert_eq!(env.state_of(Coord::new(1, 2)), Some(4));
        for s in 0..env.n_states() {
            assert_eq!(env.state_of(env.coord_of(s)), Some(s));
        }
    }

    #[test]
    fn construction_rejects_wall_endpoints() {
        let map = GridMap::open(3, 3)
            .unwrap()
            .with_walls([Coord::new(1, 1)])
            .unwrap();
        let err = GridWorld::new(
            map.clone(),
            GridWorldConfig::new(Coord::new(1, 1), Coord::new(2, 2)),
        )
        .unwrap_err();
        assert!(matches!(err, EnvironmentError::Configuration { .. }));

        let err =
            GridWorld::new(map, GridWorldConfig::new(Coord::new(0, 0), Coord::new(1, 1))).unwrap_err();
        assert!(matches!(err, EnvironmentError::Configuration { .. }));
    }

    #[test]
    fn construction_rejects_out_of_bounds_goal() {
        let map = GridMap::open(3, 3).unwrap();
        assert!(GridWorld::new(map, GridWorldConfig::new(Coord::new(0, 0), Coord::new(3, 0))).is_err());
    }

    #[test]
    fn valid_actions_exclude_walls_and_borders() {
        let env = small_world();
        let up = Direction::Up.index();
        let right = Direction::Right.index();
        let down = Direction::Down.index();
        let left = Direction::Left.index();

        // (0, 1): wall below, border above.
        let s = env.state_of(Coord::new(0, 1)).unwrap();
        assert_eq!(env.valid_actions(s), vec![right, left]);

        // (1, 0): wall to the right, border to the left.
        let s = env.state_of(Coord::new(1, 0)).unwrap();
        assert_eq!(env.valid_actions(s), vec![up, down]);
    }

    #[test]
    fn valid_actions_lead_to_traversable_cells() {
        let mut env = small_world();
        for s in 0..env.n_states() {
            for a in env.valid_actions(s) {
                env.set_start_goal(env.coord_of(s), Coord::new(2, 2)).unwrap();
                env.reset();
                let t = env.step(a).unwrap();
                assert!(env.map().is_traversable(t.info.coord));
                assert_ne!(t.next_state, s);
                assert_eq!(t.next_state, env.destination(s, a));
            }
        }
    }

    #[test]
    fn invalid_move_penalizes_and_stays() {
        let mut env = small_world();
        let start = env.reset();
        let t = env.step(Direction::Up.index()).unwrap();
        assert_eq!(t.next_state, start);
        assert_eq!(t.reward, -10.0);
        assert!(!t.done);
        assert_eq!(t.info.coord, Coord::new(0, 0));
        assert_eq!(t.info.bottleneck_level, 0);
        assert_eq!(t.info.step_count, 1);
    }

    #[test]
    fn bottleneck_adds_scaled_penalty() {
        let mut env = small_world();
        env.reset();
        let t = env.step(Direction::Right.index()).unwrap();
        assert_eq!(t.info.coord, Coord::new(0, 1));
        assert_eq!(t.info.bottleneck_level, 2);
        assert_eq!(t.reward, -1.0 + -6.0 * 2.0);
    }

    #[test]
    fn reaching_goal_pays_and_terminates() {
        let mut env = small_world();
        env.reset();
        for dir in [Direction::Down, Direction::Down, Direction::Right] {
            assert!(!env.step(dir.index()).unwrap().done);
        }
        let t = env.step(Direction::Right.index()).unwrap();
        assert_eq!(t.info.coord, Coord::new(2, 2));
        assert_eq!(t.reward, -1.0 + 100.0);
        assert!(t.done);
        assert!(t.reached_goal);
    }

    #[test]
    fn step_cap_terminates() {
        let map = GridMap::open(2, 2).unwrap();
        let mut config = GridWorldConfig::new(Coord::new(0, 0), Coord::new(1, 1));
        config.max_steps = 2;
        let mut env = GridWorld::new(map, config).unwrap();
        env.reset();
        assert!(!env.step(Direction::Up.index()).unwrap().done);
        let t = env.step(Direction::Up.index()).unwrap();
        assert!(t.done);
        assert!(!t.reached_goal);
    }

    #[test]
    fn step_errors() {
        let mut env = small_world();
        assert_eq!(
            env.step(0).unwrap_err(),
            EnvironmentError::UninitializedEpisode
        );
        env.reset();
        assert_eq!(
            env.step(4).unwrap_err(),
            EnvironmentError::InvalidAction {
                action: 4,
                n_actions: 4
            }
        );
    }

    #[test]
    fn reset_is_idempotent() {
        let mut env = small_world();
        let first = env.reset();
        env.step(Direction::Down.index()).unwrap();
        assert_eq!(env.reset(), first);
        assert_eq!(env.reset(), first);
        assert_eq!(env.step_count(), 0);
        assert_eq!(env.position(), Some(Coord::new(0, 0)));
    }

    #[test]
    fn set_start_goal_validates_and_keeps_live_episode() {
        let mut env = small_world();
        env.reset();
        env.step(Direction::Down.index()).unwrap();

        assert!(env.set_start_goal(Coord::new(1, 1), Coord::new(2, 2)).is_err());
        assert_eq!(env.start(), Coord::new(0, 0));

        env.set_start_goal(Coord::new(2, 0), Coord::new(0, 2)).unwrap();
        assert_eq!(env.position(), Some(Coord::new(1, 0)));
        assert_eq!(env.step_count(), 1);
        assert_eq!(env.reset(), env.state_of(Coord::new(2, 0)).unwrap());
    }

    #[test]
    fn coords_translate_paths() {
        let env = small_world();
        assert_eq!(
            env.coords(&[0, 3, 5]),
            vec![Coord::new(0, 0), Coord::new(1, 0), Coord::new(2, 0)]
        );
    }
}
