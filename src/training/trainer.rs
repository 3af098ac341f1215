//! Episodic Q-learning loop.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::TrainingConfig;
use super::error::TrainingError;
use super::metrics::{EpisodeStats, TrainingReport};
use crate::agent::{AgentConfig, QLearningAgent};
use crate::environment::{DiscreteEnvironment, EnvironmentError, StepInfo};

/// A trained agent together with the metrics of its run.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub agent: QLearningAgent,
    pub report: TrainingReport,
}

/// Drives an agent through repeated episodes of an environment.
///
/// Every transition is fed straight back into [`QLearningAgent::update`];
/// exploration decays exactly once per episode, whether the episode reached
/// the goal or ran out of steps.
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Runs `num_episodes` episodes, drawing all randomness from `rng`.
    ///
    /// Given the same agent, environment and seed, the resulting table and
    /// report are bit-identical.
    pub fn train<E, R>(
        &self,
        env: &mut E,
        agent: &mut QLearningAgent,
        rng: &mut R,
    ) -> Result<TrainingReport, TrainingError>
    where
        E: DiscreteEnvironment,
        R: Rng + ?Sized,
    {
        let table = agent.q_table();
        if table.n_states() != env.n_states() || table.n_actions() != env.n_actions() {
            return Err(TrainingError::ShapeMismatch {
                agent_states: table.n_states(),
                agent_actions: table.n_actions(),
                env_states: env.n_states(),
                env_actions: env.n_actions(),
            });
        }

        let mut report = TrainingReport::with_capacity(self.config.num_episodes);

        for episode in 0..self.config.num_episodes {
            let stats = self.run_episode(env, agent, rng)?;
            let epsilon = agent.decay_epsilon();
            report.record(stats);

            if self.config.log_interval > 0 && (episode + 1) % self.config.log_interval == 0 {
                tracing::debug!(
                    episode = episode + 1,
                    total_return = stats.total_return,
                    steps = stats.steps,
                    reached_goal = stats.reached_goal,
                    epsilon,
                    "episode finished"
                );
            }
        }

        report.final_epsilon = agent.epsilon();
        tracing::info!(
            episodes = report.num_episodes(),
            goals_reached = report.goals_reached(),
            final_epsilon = report.final_epsilon,
            "training finished"
        );
        Ok(report)
    }

    fn run_episode<E, R>(
        &self,
        env: &mut E,
        agent: &mut QLearningAgent,
        rng: &mut R,
    ) -> Result<EpisodeStats, EnvironmentError>
    where
        E: DiscreteEnvironment,
        R: Rng + ?Sized,
    {
        let mut state = env.reset();
        let mut stats = EpisodeStats {
            total_return: 0.0,
            steps: 0,
            reached_goal: false,
            bottleneck_hits: 0,
        };

        for t in 0..self.config.max_steps {
            let valid = env.valid_actions(state);
            let action = agent.choose_action(state, &valid, rng);
            let transition = env.step(action)?;

            stats.total_return += transition.reward;
            stats.steps = t + 1;
            if transition.info.bottleneck_level() > 0 {
                stats.bottleneck_hits += 1;
            }

            let valid_next = env.valid_actions(transition.next_state);
            agent.update(
                state,
                action,
                transition.reward,
                transition.next_state,
                &valid_next,
            );
            state = transition.next_state;

            if transition.done {
                stats.reached_goal = transition.reached_goal;
                break;
            }
        }

        Ok(stats)
    }
}

/// Builds an agent sized to `env`, seeds a fresh [`StdRng`] and trains.
pub fn train_seeded<E>(
    env: &mut E,
    agent_config: AgentConfig,
    config: TrainingConfig,
    seed: u64,
) -> Result<TrainingOutcome, TrainingError>
where
    E: DiscreteEnvironment,
{
    let mut rng = StdRng::seed_from_u64(seed);
    let mut agent = QLearningAgent::new(env.n_states(), env.n_actions(), agent_config)?;
    let report = Trainer::new(config).train(env, &mut agent, &mut rng)?;
    Ok(TrainingOutcome { agent, report })
}
