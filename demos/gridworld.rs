// Demonstration: learn a route across a randomly generated grid.
//
//   cargo run --example gridworld -- --episodes 2000 --seed 7 --rows 12 --cols 12

use std::env;

use rand::rngs::StdRng;
use rand::SeedableRng;

use qroute::environment::{GridMap, GridWorld, GridWorldConfig, MapConfig};
use qroute::rollout::{grid_policy_map, grid_value_map};
use qroute::{train_seeded, AgentConfig, Coord, Direction, GreedyRollout, TrainingConfig};

fn main() {
    tracing_subscriber::fmt().init();

    let args: Vec<String> = env::args().collect();
    let episodes: usize = arg_value(&args, "--episodes")
        .and_then(|s| s.parse().ok())
        .unwrap_or(2000);
    let seed: u64 = arg_value(&args, "--seed")
        .and_then(|s| s.parse().ok())
        .unwrap_or(7);
    let defaults = MapConfig::default();
    let map_config = MapConfig {
        rows: arg_value(&args, "--rows")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.rows),
        cols: arg_value(&args, "--cols")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.cols),
        ..defaults
    };

    let mut rng = StdRng::seed_from_u64(seed);
    let map = match GridMap::random(&map_config, &mut rng) {
        Ok(map) => map,
        Err(e) => {
            eprintln!("Map generation failed: {}", e);
            std::process::exit(2);
        }
    };
    let world_config = GridWorldConfig::new(map_config.start(), map_config.goal());
    let max_steps = world_config.max_steps;
    let mut env = match GridWorld::new(map, world_config) {
        Ok(env) => env,
        Err(e) => {
            eprintln!("Invalid grid world: {}", e);
            std::process::exit(2);
        }
    };

    let config = TrainingConfig {
        num_episodes: episodes,
        max_steps,
        ..TrainingConfig::default()
    };
    let outcome = match train_seeded(&mut env, AgentConfig::default(), config, seed) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Training failed: {}", e);
            std::process::exit(1);
        }
    };
    println!("{}", outcome.report);

    let rollout = match GreedyRollout::default().run(&mut env, &outcome.agent) {
        Ok(rollout) => rollout,
        Err(e) => {
            eprintln!("Rollout failed: {}", e);
            std::process::exit(1);
        }
    };
    let path = env.coords(&rollout.states);

    println!(
        "\nGreedy path: {} hops, reached goal: {}, bottlenecks: {} (severity {}), cycle breaks: {}",
        rollout.hops(),
        rollout.reached_goal,
        rollout.bottleneck_hits,
        rollout.bottleneck_severity,
        rollout.cycle_breaks
    );
    render_path(&env, &path);

    println!("\nGreedy policy:");
    for row in grid_policy_map(&env, &outcome.agent) {
        let line: String = row
            .iter()
            .map(|cell| match cell {
                Some(Direction::Up) => '^',
                Some(Direction::Right) => '>',
                Some(Direction::Down) => 'v',
                Some(Direction::Left) => '<',
                None => '#',
            })
            .collect();
        println!("  {}", line);
    }

    println!("\nState values:");
    for row in grid_value_map(&env, &outcome.agent) {
        let line: Vec<String> = row
            .iter()
            .map(|v| v.map_or_else(|| "   ####".to_string(), |v| format!("{:>7.1}", v)))
            .collect();
        println!("  {}", line.join(""));
    }
}

fn render_path(env: &GridWorld, path: &[Coord]) {
    let map = env.map();
    for row in 0..map.rows() {
        let line: String = (0..map.cols())
            .map(|col| {
                let cell = Coord::new(row, col);
                if cell == env.start() {
                    'S'
                } else if cell == env.goal() {
                    'G'
                } else if map.is_wall(cell) {
                    '#'
                } else if path.contains(&cell) {
                    '*'
                } else if map.bottleneck_level(cell) > 0 {
                    char::from(b'0' + map.bottleneck_level(cell))
                } else {
                    '.'
                }
            })
            .collect();
        println!("  {}", line);
    }
}

fn arg_value<'a>(args: &'a [String], key: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}
