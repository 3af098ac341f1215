//! Tabular Q-learning agent with ε-greedy exploration.

use rand::Rng;

use super::config::AgentConfig;
use super::error::AgentError;
use super::q_table::QTable;
use crate::types::{ActionId, StateId, FALLBACK_ACTION};

/// Off-policy TD control agent.
///
/// Owns its [`QTable`]; [`QLearningAgent::update`] is the only way the
/// table changes. Randomness comes from the caller so that a whole run can
/// be replayed from one seed.
#[derive(Debug, Clone)]
pub struct QLearningAgent {
    q_table: QTable,
    config: AgentConfig,
    epsilon: f64,
}

impl QLearningAgent {
    /// Creates an agent with a zeroed `n_states × n_actions` table.
    pub fn new(n_states: usize, n_actions: usize, config: AgentConfig) -> Result<Self, AgentError> {
        if n_states == 0 || n_actions == 0 {
            return Err(AgentError::EmptyTable {
                n_states,
                n_actions,
            });
        }
        config.validate()?;
        Ok(Self {
            q_table: QTable::new(n_states, n_actions),
            epsilon: config.epsilon_start,
            config,
        })
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Current exploration probability.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// ε-greedy action selection.
    ///
    /// With probability ε a uniformly random element of `valid_actions` is
    /// returned, otherwise the greedy one. An empty set yields
    /// [`FALLBACK_ACTION`], which the environment treats as an ordinary
    /// illegal move.
    pub fn choose_action<R: Rng + ?Sized>(
        &self,
        state: StateId,
        valid_actions: &[ActionId],
        rng: &mut R,
    ) -> ActionId {
        if valid_actions.is_empty() {
            return FALLBACK_ACTION;
        }
        if rng.gen::<f64>() < self.epsilon {
            return valid_actions[rng.gen_range(0..valid_actions.len())];
        }
        self.q_table
            .greedy_over(state, valid_actions)
            .unwrap_or(FALLBACK_ACTION)
    }

    /// Greedy action among `valid_actions`, ties broken by order of
    /// appearance. `None` when `valid_actions` is empty.
    pub fn predict_action(&self, state: StateId, valid_actions: &[ActionId]) -> Option<ActionId> {
        self.q_table.greedy_over(state, valid_actions)
    }

    /// Value of `state` under the greedy policy restricted to `valid_actions`.
    pub fn state_value(&self, state: StateId, valid_actions: &[ActionId]) -> Option<f64> {
        self.q_table.max_over(state, valid_actions)
    }

    /// Q-learning update:
    ///
    /// ```text
    /// Q(s,a) ← Q(s,a) + α [r + γ max_{a' ∈ valid_next} Q(s',a') − Q(s,a)]
    /// ```
    ///
    /// An empty `valid_actions_next` contributes zero future value.
    /// Returns the TD error.
    pub fn update(
        &mut self,
        state: StateId,
        action: ActionId,
        reward: f64,
        next_state: StateId,
        valid_actions_next: &[ActionId],
    ) -> f64 {
        let best_next = self
            .q_table
            .max_over(next_state, valid_actions_next)
            .unwrap_or(0.0);
        let td_target = reward + self.config.gamma * best_next;
        self.q_table
            .td_update(state, action, td_target, self.config.alpha)
    }

    /// Geometric decay of ε, floored at `epsilon_min`. Call once per
    /// finished episode.
    pub fn decay_epsilon(&mut self) -> f64 {
        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_min);
        self.epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn agent(config: AgentConfig) -> QLearningAgent {
        QLearningAgent::new(4, 3, config).unwrap()
    }

    /// α = 1, γ = 0 makes `update` a direct write of the reward.
    fn writer() -> QLearningAgent {
        agent(AgentConfig {
            alpha: 1.0,
            gamma: 0.0,
            ..AgentConfig::default()
        })
    }

    #[test]
    fn new_rejects_empty_table() {
        assert!(matches!(
            QLearningAgent::new(0, 3, AgentConfig::default()),
            Err(AgentError::EmptyTable { .. })
        ));
    }

    #[test]
    fn new_rejects_invalid_config() {
        let cfg = AgentConfig {
            epsilon_decay: 0.0,
            ..AgentConfig::default()
        };
        assert!(QLearningAgent::new(2, 2, cfg).is_err());
    }

    #[test]
    fn choose_action_falls_back_on_empty_set() {
        let a = agent(AgentConfig::default());
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(a.choose_action(0, &[], &mut rng), FALLBACK_ACTION);
    }

    #[test]
    fn choose_action_stays_within_valid_set() {
        let a = agent(AgentConfig::default());
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            let chosen = a.choose_action(0, &[1, 2], &mut rng);
            assert!(chosen == 1 || chosen == 2);
        }
    }

    #[test]
    fn choose_action_explores_both_options_at_full_epsilon() {
        let a = agent(AgentConfig::default());
        let mut rng = StdRng::seed_from_u64(2);
        let picks: Vec<_> = (0..100).map(|_| a.choose_action(0, &[0, 2], &mut rng)).collect();
        assert!(picks.contains(&0));
        assert!(picks.contains(&2));
    }

    #[test]
    fn choose_action_is_greedy_without_exploration() {
        let mut a = agent(AgentConfig {
            alpha: 1.0,
            gamma: 0.0,
            epsilon_start: 0.0,
            epsilon_min: 0.0,
            ..AgentConfig::default()
        });
        a.update(1, 2, 5.0, 0, &[]);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            assert_eq!(a.choose_action(1, &[0, 1, 2], &mut rng), 2);
        }
    }

    #[test]
    fn predict_action_breaks_ties_by_order() {
        let mut a = writer();
        a.update(0, 1, 3.0, 0, &[]);
        a.update(0, 2, 3.0, 0, &[]);
        assert_eq!(a.predict_action(0, &[0, 1, 2]), Some(1));
        assert_eq!(a.predict_action(0, &[2, 1]), Some(2));
        assert_eq!(a.predict_action(0, &[0]), Some(0));
        assert_eq!(a.predict_action(0, &[]), None);
    }

    #[test]
    fn update_applies_bellman_target() {
        let mut a = agent(AgentConfig {
            alpha: 0.5,
            gamma: 0.9,
            ..AgentConfig::default()
        });
        // Seed Q(1, ·) = [1, 2, 0] with two full-rate writes.
        let mut w = writer();
        w.update(1, 0, 1.0, 0, &[]);
        w.update(1, 1, 2.0, 0, &[]);
        a.q_table = w.q_table.clone();

        let err = a.update(0, 2, 1.0, 1, &[0, 1]);
        // target = 1 + 0.9 * 2 = 2.8; Q = 0 + 0.5 * 2.8
        assert!((err - 2.8).abs() < 1e-12);
        assert!((a.q_table().get(0, 2) - 1.4).abs() < 1e-12);
    }

    #[test]
    fn update_touches_only_one_entry() {
        let mut a = agent(AgentConfig::default());
        a.update(3, 1, -10.0, 2, &[0, 1, 2]);
        for s in 0..4 {
            for act in 0..3 {
                let q = a.q_table().get(s, act);
                if (s, act) == (3, 1) {
                    assert_ne!(q, 0.0);
                } else {
                    assert_eq!(q, 0.0);
                }
            }
        }
    }

    #[test]
    fn update_contracts_toward_target() {
        let mut a = agent(AgentConfig {
            alpha: 0.3,
            gamma: 0.5,
            ..AgentConfig::default()
        });
        let target = 4.0;
        let mut prev_gap = f64::INFINITY;
        for _ in 0..20 {
            a.update(0, 0, target, 2, &[]);
            let gap = (target - a.q_table().get(0, 0)).abs();
            assert!(gap < prev_gap);
            prev_gap = gap;
        }
    }

    #[test]
    fn update_at_target_is_fixed_point() {
        let mut a = writer();
        a.update(0, 0, 2.0, 1, &[]);
        let err = a.update(0, 0, 2.0, 1, &[]);
        assert_eq!(err, 0.0);
        assert_eq!(a.q_table().get(0, 0), 2.0);
    }

    #[test]
    fn empty_next_actions_mean_zero_future_value() {
        let mut a = agent(AgentConfig {
            alpha: 1.0,
            gamma: 0.9,
            ..AgentConfig::default()
        });
        a.update(1, 0, 50.0, 0, &[]);
        a.update(0, 0, 1.0, 1, &[]);
        assert_eq!(a.q_table().get(0, 0), 1.0 + 0.9 * 0.0);
    }

    #[test]
    fn epsilon_decay_is_monotone_and_floored() {
        let mut a = agent(AgentConfig {
            epsilon_start: 1.0,
            epsilon_min: 0.1,
            epsilon_decay: 0.7,
            ..AgentConfig::default()
        });
        let mut prev = a.epsilon();
        for _ in 0..50 {
            let eps = a.decay_epsilon();
            assert!(eps <= prev);
            assert!(eps >= 0.1);
            prev = eps;
        }
        assert_eq!(a.epsilon(), 0.1);
    }
}
