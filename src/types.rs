//! Core types shared by the environments, the agent, and the training loop.
//!
//! States and actions are plain indices into the agent's value table. Grid
//! environments additionally speak in terms of [`Coord`] cells and the four
//! compass [`Direction`]s.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Index of a state in `[0, n_states)`.
pub type StateId = usize;

/// Index of an action in `[0, n_actions)`.
pub type ActionId = usize;

/// Action returned when a state offers no valid actions.
///
/// Environments treat it under their ordinary illegal-move rules.
pub const FALLBACK_ACTION: ActionId = 0;

/// Movement direction on a grid, in action-index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// All directions ordered by action index (UP, RIGHT, DOWN, LEFT).
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Returns the action index of this direction.
    pub fn index(&self) -> ActionId {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }

    /// Maps an action index back to its direction.
    pub fn from_index(action: ActionId) -> Option<Direction> {
        Self::ALL.get(action).copied()
    }

    /// Row/column delta applied by this direction.
    pub fn delta(&self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Right => (0, 1),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Right => write!(f, "right"),
            Direction::Down => write!(f, "down"),
            Direction::Left => write!(f, "left"),
        }
    }
}

/// A `(row, col)` cell on a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    /// Creates a new coordinate.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// The neighbouring cell in `direction`, or `None` when it would leave the
    /// `rows × cols` rectangle.
    pub fn offset(&self, direction: Direction, rows: usize, cols: usize) -> Option<Coord> {
        let (dr, dc) = direction.delta();
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        (row < rows && col < cols).then_some(Coord { row, col })
    }

    /// Whether this cell lies inside a `rows × cols` rectangle.
    pub fn in_bounds(&self, rows: usize, cols: usize) -> bool {
        self.row < rows && self.col < cols
    }
}

impl From<(usize, usize)> for Coord {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
