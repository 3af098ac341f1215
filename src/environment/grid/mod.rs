//! Grid-world variant: a rectangular map of walls and bottleneck cells.

pub mod env;
pub mod map;

pub use env::{GridStepInfo, GridWorld, GridWorldConfig, RewardConfig};
pub use map::{GridMap, MapConfig, MAX_BOTTLENECK_LEVEL};
