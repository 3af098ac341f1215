//! Grid maps: walls, bottleneck cells, and random map generation.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use petgraph::algo::has_path_connecting;
use petgraph::graphmap::UnGraphMap;
use rand::seq::SliceRandom;
use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::environment::error::EnvironmentError;
use crate::types::{Coord, Direction};

/// Highest bottleneck severity.
pub const MAX_BOTTLENECK_LEVEL: u8 = 3;

/// Probability that a corridor neighbour is added when widening the carved path.
const CORRIDOR_WIDEN_PROBABILITY: f64 = 0.25;

/// Parameters for [`GridMap::random`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MapConfig {
    pub rows: usize,
    pub cols: usize,
    /// Fraction of all cells turned into walls (capped by the available cells).
    pub wall_ratio: f64,
    /// Fraction of all cells turned into bottlenecks (capped by the free cells).
    pub bottleneck_ratio: f64,
}

impl MapConfig {
    /// Top-left corner; the carved corridor starts here.
    pub fn start(&self) -> Coord {
        Coord::new(0, 0)
    }

    /// Bottom-right corner; the carved corridor ends here.
    pub fn goal(&self) -> Coord {
        Coord::new(self.rows.saturating_sub(1), self.cols.saturating_sub(1))
    }

    fn validate(&self) -> Result<(), EnvironmentError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(EnvironmentError::configuration(format!(
                "grid must have at least one cell, got {}x{}",
                self.rows, self.cols
            )));
        }
        for (name, ratio) in [
            ("wall_ratio", self.wall_ratio),
            ("bottleneck_ratio", self.bottleneck_ratio),
        ] {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(EnvironmentError::configuration(format!(
                    "{} must lie in [0, 1], got {}",
                    name, ratio
                )));
            }
        }
        Ok(())
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            rows: 12,
            cols: 12,
            wall_ratio: 0.18,
            bottleneck_ratio: 0.12,
        }
    }
}

/// A rectangular grid with impassable walls and costly bottleneck cells.
///
/// Bottlenecks are traversable; entering one costs extra in proportion to
/// its severity level (1 = low, 2 = medium, 3 = high).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridMap {
    rows: usize,
    cols: usize,
    walls: BTreeSet<Coord>,
    bottlenecks: BTreeMap<Coord, u8>,
}

impl GridMap {
    /// A `rows × cols` grid with no walls and no bottlenecks.
    pub fn open(rows: usize, cols: usize) -> Result<Self, EnvironmentError> {
        if rows == 0 || cols == 0 {
            return Err(EnvironmentError::configuration(format!(
                "grid must have at least one cell, got {}x{}",
                rows, cols
            )));
        }
        Ok(Self {
            rows,
            cols,
            walls: BTreeSet::new(),
            bottlenecks: BTreeMap::new(),
        })
    }

    /// Adds walls. A wall replaces any bottleneck on the same cell.
    pub fn with_walls<I>(mut self, walls: I) -> Result<Self, EnvironmentError>
    where
        I: IntoIterator<Item = Coord>,
    {
        for cell in walls {
            self.check_in_bounds(cell)?;
            self.bottlenecks.remove(&cell);
            self.walls.insert(cell);
        }
        Ok(self)
    }

    /// Marks `cell` as a bottleneck of severity `level` (1..=3).
    pub fn with_bottleneck(mut self, cell: Coord, level: u8) -> Result<Self, EnvironmentError> {
        self.check_in_bounds(cell)?;
        if level == 0 || level > MAX_BOTTLENECK_LEVEL {
            return Err(EnvironmentError::configuration(format!(
                "bottleneck level must be in 1..={}, got {}",
                MAX_BOTTLENECK_LEVEL, level
            )));
        }
        if self.is_wall(cell) {
            return Err(EnvironmentError::configuration(format!(
                "bottleneck {} would sit on a wall",
                cell
            )));
        }
        self.bottlenecks.insert(cell, level);
        Ok(self)
    }

    /// Generates a random map whose top-left and bottom-right corners are
    /// always connected.
    ///
    /// A monotone right/down corridor is carved between the corners and
    /// randomly widened; walls are only placed outside it. Bottlenecks go on
    /// the remaining free cells with severities 1/2/3 drawn at 60/30/10 %.
    pub fn random<R: Rng + ?Sized>(config: &MapConfig, rng: &mut R) -> Result<Self, EnvironmentError> {
        config.validate()?;
        let (rows, cols) = (config.rows, config.cols);
        let start = config.start();
        let goal = config.goal();

        let corridor = carve_corridor(rows, cols, start, goal, rng);

        let all_cells: Vec<Coord> = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| Coord::new(row, col)))
            .collect();
        let total = (rows * cols) as f64;

        let wall_candidates: Vec<Coord> = all_cells
            .iter()
            .copied()
            .filter(|c| !corridor.contains(c) && *c != start && *c != goal)
            .collect();
        let target_walls = ((total * config.wall_ratio) as usize).min(wall_candidates.len());
        let walls: BTreeSet<Coord> = wall_candidates
            .choose_multiple(rng, target_walls)
            .copied()
            .collect();

        let free_cells: Vec<Coord> = all_cells
            .iter()
            .copied()
            .filter(|c| !walls.contains(c) && *c != start && *c != goal)
            .collect();
        let target_bottlenecks =
            ((total * config.bottleneck_ratio) as usize).min(free_cells.len());
        let chosen: Vec<Coord> = free_cells
            .choose_multiple(rng, target_bottlenecks)
            .copied()
            .collect();

        let mut bottlenecks = BTreeMap::new();
        for cell in chosen {
            let p: f64 = rng.gen();
            let level = if p < 0.60 {
                1
            } else if p < 0.90 {
                2
            } else {
                3
            };
            bottlenecks.insert(cell, level);
        }

        tracing::debug!(
            rows,
            cols,
            walls = walls.len(),
            bottlenecks = bottlenecks.len(),
            "generated random grid map"
        );

        Ok(Self {
            rows,
            cols,
            walls,
            bottlenecks,
        })
    }

    fn check_in_bounds(&self, cell: Coord) -> Result<(), EnvironmentError> {
        if cell.in_bounds(self.rows, self.cols) {
            Ok(())
        } else {
            Err(EnvironmentError::configuration(format!(
                "cell {} is outside the {}x{} grid",
                cell, self.rows, self.cols
            )))
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn walls(&self) -> &BTreeSet<Coord> {
        &self.walls
    }

    pub fn bottlenecks(&self) -> &BTreeMap<Coord, u8> {
        &self.bottlenecks
    }

    pub fn contains(&self, cell: Coord) -> bool {
        cell.in_bounds(self.rows, self.cols)
    }

    pub fn is_wall(&self, cell: Coord) -> bool {
        self.walls.contains(&cell)
    }

    /// In bounds and not a wall.
    pub fn is_traversable(&self, cell: Coord) -> bool {
        self.contains(cell) && !self.is_wall(cell)
    }

    /// Bottleneck severity of `cell` (0 when it is not a bottleneck).
    pub fn bottleneck_level(&self, cell: Coord) -> u8 {
        self.bottlenecks.get(&cell).copied().unwrap_or(0)
    }

    /// Non-wall cells in row-major order.
    pub fn traversable_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.rows)
            .flat_map(move |row| (0..self.cols).map(move |col| Coord::new(row, col)))
            .filter(move |c| !self.is_wall(*c))
    }

    /// 4-connected adjacency between traversable cells.
    pub fn connectivity(&self) -> UnGraphMap<Coord, ()> {
        let mut graph = UnGraphMap::new();
        for cell in self.traversable_cells() {
            graph.add_node(cell);
            // Right and down cover every undirected edge once.
            for dir in [Direction::Right, Direction::Down] {
                if let Some(next) = cell.offset(dir, self.rows, self.cols) {
                    if !self.is_wall(next) {
                        graph.add_edge(cell, next, ());
                    }
                }
            }
        }
        graph
    }

    /// Whether `to` can be reached from `from` through traversable cells.
    pub fn is_reachable(&self, from: Coord, to: Coord) -> bool {
        if !self.is_traversable(from) || !self.is_traversable(to) {
            return false;
        }
        has_path_connecting(&self.connectivity(), from, to, None)
    }
}

fn carve_corridor<R: Rng + ?Sized>(
    rows: usize,
    cols: usize,
    start: Coord,
    goal: Coord,
    rng: &mut R,
) -> HashSet<Coord> {
    let mut path = vec![start];
    let mut cell = start;
    while cell.row < goal.row || cell.col < goal.col {
        let mut moves = Vec::with_capacity(2);
        if cell.row < goal.row {
            moves.push(Direction::Down);
        }
        if cell.col < goal.col {
            moves.push(Direction::Right);
        }
        let Some(&dir) = moves.choose(rng) else {
            break;
        };
        let Some(next) = cell.offset(dir, rows, cols) else {
            break;
        };
        cell = next;
        path.push(cell);
    }

    let mut corridor: HashSet<Coord> = path.iter().copied().collect();
    for cell in &path {
        for dir in Direction::ALL {
            if let Some(next) = cell.offset(dir, rows, cols) {
                if rng.gen::<f64>() < CORRIDOR_WIDEN_PROBABILITY {
                    corridor.insert(next);
                }
            }
        }
    }
    corridor
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn open_map_rejects_empty_grid() {
        assert!(GridMap::open(0, 3).is_err());
        assert!(GridMap::open(3, 0).is_err());
    }

    #[test]
    fn wall_overrides_bottleneck() {
        let map = GridMap::open(3, 3)
            .unwrap()
            .with_bottleneck(Coord::new(1, 1), 2)
            .unwrap()
            .with_walls([Coord::new(1, 1)])
            .unwrap();
        assert!(map.is_wall(Coord::new(1, 1)));
        assert_eq!(map.bottleneck_level(Coord::new(1, 1)), 0);
    }

    #[test]
    fn bottleneck_level_is_validated() {
        let map = GridMap::open(3, 3).unwrap();
        assert!(map.clone().with_bottleneck(Coord::new(0, 1), 0).is_err());
        assert!(map.clone().with_bottleneck(Coord::new(0, 1), 4).is_err());
        assert!(map.with_bottleneck(Coord::new(5, 1), 1).is_err());
    }

    #[test]
    fn traversable_cells_are_row_major() {
        let map = GridMap::open(2, 2)
            .unwrap()
            .with_walls([Coord::new(0, 1)])
            .unwrap();
        let cells: Vec<_> = map.traversable_cells().collect();
        assert_eq!(
            cells,
            vec![Coord::new(0, 0), Coord::new(1, 0), Coord::new(1, 1)]
        );
    }

    #[test]
    fn reachability_respects_walls() {
        // Full wall column splits the grid in two.
        let map = GridMap::open(3, 3)
            .unwrap()
            .with_walls([Coord::new(0, 1), Coord::new(1, 1), Coord::new(2, 1)])
            .unwrap();
        assert!(map.is_reachable(Coord::new(0, 0), Coord::new(2, 0)));
        assert!(!map.is_reachable(Coord::new(0, 0), Coord::new(0, 2)));
        assert!(!map.is_reachable(Coord::new(0, 0), Coord::new(1, 1)));
    }

    #[test]
    fn random_map_keeps_corners_connected() {
        let config = MapConfig::default();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let map = GridMap::random(&config, &mut rng).unwrap();
            assert!(!map.is_wall(config.start()));
            assert!(!map.is_wall(config.goal()));
            assert!(map.is_reachable(config.start(), config.goal()), "seed {}", seed);
        }
    }

    #[test]
    fn random_map_respects_ratios() {
        let config = MapConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        let map = GridMap::random(&config, &mut rng).unwrap();
        assert!(map.walls().len() <= (144.0 * 0.18) as usize);
        assert!(map.bottlenecks().len() <= (144.0 * 0.12) as usize);
        for (cell, level) in map.bottlenecks() {
            assert!(!map.is_wall(*cell));
            assert!((1..=MAX_BOTTLENECK_LEVEL).contains(level));
            assert_ne!(*cell, config.start());
            assert_ne!(*cell, config.goal());
        }
    }

    #[test]
    fn random_map_is_deterministic_per_seed() {
        let config = MapConfig::default();
        let a = GridMap::random(&config, &mut StdRng::seed_from_u64(3)).unwrap();
        let b = GridMap::random(&config, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn random_map_rejects_bad_ratio() {
        let config = MapConfig {
            wall_ratio: 1.5,
            ..MapConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        assert!(GridMap::random(&config, &mut rng).is_err());
    }
}
