// Demonstration: learn a route through the default warehouse graph.
//
//   cargo run --example warehouse -- --episodes 1000 --seed 42

use std::env;

use qroute::environment::{DiscreteEnvironment, WarehouseEnv};
use qroute::{train_seeded, AgentConfig, GreedyRollout, TrainingConfig};

fn main() {
    tracing_subscriber::fmt().init();

    let args: Vec<String> = env::args().collect();
    let episodes: usize = arg_value(&args, "--episodes")
        .and_then(|s| s.parse().ok())
        .unwrap_or(1000);
    let seed: u64 = arg_value(&args, "--seed")
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);

    let mut env = WarehouseEnv::warehouse_default();
    let config = TrainingConfig {
        num_episodes: episodes,
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

    let greedy = GreedyRollout::new(50);
    let rollout = match greedy.run(&mut env, &outcome.agent) {
        Ok(rollout) => rollout,
        Err(e) => {
            eprintln!("Rollout failed: {}", e);
            std::process::exit(1);
        }
    };

    let path: Vec<String> = rollout.states.iter().map(|s| s.to_string()).collect();
    println!(
        "Greedy route {} -> {}: {}",
        env.config().start,
        env.goal(),
        path.join(" -> ")
    );
    println!(
        "Hops: {} (shortest possible: {})",
        rollout.hops(),
        env.rewards()
            .shortest_hops(env.config().start, env.goal())
            .map_or_else(|| "unreachable".to_string(), |h| h.to_string())
    );
    if !rollout.reached_goal {
        println!("Goal not reached within {} hops.", greedy.max_hops());
    }

    println!("\nLearned values:");
    for state in 0..env.n_states() {
        let value = outcome
            .agent
            .state_value(state, &env.valid_actions(state))
            .unwrap_or(0.0);
        println!("  node {:>2}: {:>9.2}", state, value);
    }
}

fn arg_value<'a>(args: &'a [String], key: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}
