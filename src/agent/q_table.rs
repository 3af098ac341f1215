//! Dense state × action value table.

use crate::types::{ActionId, StateId};

/// Q-table mapping `(state, action)` pairs to value estimates.
///
/// Stored row-major and initialised to zero. An entry that was never
/// updated is indistinguishable from one that converged to zero.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    n_states: usize,
    n_actions: usize,
    values: Vec<f64>,
}

impl QTable {
    /// Creates a zero-filled table.
    pub fn new(n_states: usize, n_actions: usize) -> Self {
        Self {
            n_states,
            n_actions,
            values: vec![0.0; n_states * n_actions],
        }
    }

    pub fn n_states(&self) -> usize {
        self.n_states
    }

    pub fn n_actions(&self) -> usize {
        self.n_actions
    }

    #[inline]
    fn index(&self, state: StateId, action: ActionId) -> usize {
        assert!(
            state < self.n_states && action < self.n_actions,
            "Q-table index ({}, {}) out of range for {}x{} table",
            state,
            action,
            self.n_states,
            self.n_actions
        );
        state * self.n_actions + action
    }

    /// Q-value for a state-action pair.
    ///
    /// # Panics
    ///
    /// Panics if `state` or `action` is out of range.
    pub fn get(&self, state: StateId, action: ActionId) -> f64 {
        self.values[self.index(state, action)]
    }

    /// All action values of `state`.
    pub fn row(&self, state: StateId) -> &[f64] {
        let start = self.index(state, 0);
        &self.values[start..start + self.n_actions]
    }

    /// Flat row-major view of the whole table.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Maximum Q-value over `actions`, `None` if `actions` is empty.
    pub fn max_over(&self, state: StateId, actions: &[ActionId]) -> Option<f64> {
        actions
            .iter()
            .map(|&a| self.get(state, a))
            .fold(None, |best, q| match best {
                Some(b) if b >= q => Some(b),
                _ => Some(q),
            })
    }

    /// Highest-valued action among `actions`; ties go to the earliest entry.
    pub fn greedy_over(&self, state: StateId, actions: &[ActionId]) -> Option<ActionId> {
        let mut best: Option<(ActionId, f64)> = None;
        for &action in actions {
            let q = self.get(state, action);
            match best {
                Some((_, b)) if q <= b => {}
                _ => best = Some((action, q)),
            }
        }
        best.map(|(action, _)| action)
    }

    /// Every action in `actions` whose value equals the maximum, in the
    /// order given.
    pub fn tied_best(&self, state: StateId, actions: &[ActionId]) -> Vec<ActionId> {
        match self.max_over(state, actions) {
            Some(max) => actions
                .iter()
                .copied()
                .filter(|&a| self.get(state, a) == max)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Moves `Q[state, action]` a fraction `alpha` of the way toward `target`
    /// and returns the TD error.
    pub(crate) fn td_update(&mut self, state: StateId, action: ActionId, target: f64, alpha: f64) -> f64 {
        let idx = self.index(state, action);
        let td_error = target - self.values[idx];
        self.values[idx] += alpha * td_error;
        td_error
    }
}
