//! Per-episode training metrics.
//!
//! Collected by the [`Trainer`](super::Trainer) and consumed by whatever
//! plots learning curves or summarises a run.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What happened in one episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct EpisodeStats {
    pub total_return: f64,
    pub steps: usize,
    pub reached_goal: bool,
    pub bottleneck_hits: u32,
}

/// Metrics of a whole training run.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrainingReport {
    /// Undiscounted return of every episode.
    pub episode_returns: Vec<f64>,
    /// Steps taken in every episode.
    pub episode_lengths: Vec<usize>,
    /// Steps to the goal, one entry per episode that reached it.
    pub steps_to_goal: Vec<usize>,
    /// Whether each episode reached the goal.
    pub reached_goal: Vec<bool>,
    /// Bottleneck cells entered during each episode.
    pub bottleneck_hits: Vec<u32>,
    /// Exploration rate after the last decay.
    pub final_epsilon: f64,
}

impl TrainingReport {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self {
            episode_returns: Vec::with_capacity(n),
            episode_lengths: Vec::with_capacity(n),
            steps_to_goal: Vec::new(),
            reached_goal: Vec::with_capacity(n),
            bottleneck_hits: Vec::with_capacity(n),
            final_epsilon: 0.0,
        }
    }

    pub(crate) fn record(&mut self, episode: EpisodeStats) {
        self.episode_returns.push(episode.total_return);
        self.episode_lengths.push(episode.steps);
        if episode.reached_goal {
            self.steps_to_goal.push(episode.steps);
        }
        self.reached_goal.push(episode.reached_goal);
        self.bottleneck_hits.push(episode.bottleneck_hits);
    }

    /// Number of episodes recorded.
    pub fn num_episodes(&self) -> usize {
        self.episode_returns.len()
    }

    /// Number of episodes that reached the goal.
    pub fn goals_reached(&self) -> usize {
        self.steps_to_goal.len()
    }

    /// Fraction of episodes that reached the goal (0 for an empty run).
    pub fn success_rate(&self) -> f64 {
        if self.num_episodes() == 0 {
            0.0
        } else {
            self.goals_reached() as f64 / self.num_episodes() as f64
        }
    }

    /// Mean return over the last `n` episodes, `None` for an empty run.
    pub fn mean_return_last(&self, n: usize) -> Option<f64> {
        let n = n.min(self.num_episodes());
        if n == 0 {
            return None;
        }
        let tail = &self.episode_returns[self.num_episodes() - n..];
        Some(tail.iter().sum::<f64>() / n as f64)
    }

    /// Sliding-window mean of the episode returns.
    ///
    /// Only full windows are averaged, so the result has
    /// `num_episodes - window + 1` entries (none if the run is shorter than
    /// the window or `window` is zero).
    pub fn moving_average(&self, window: usize) -> Vec<f64> {
        if window == 0 {
            return Vec::new();
        }
        self.episode_returns
            .windows(window)
            .map(|w| w.iter().sum::<f64>() / window as f64)
            .collect()
    }
}

impl fmt::Display for TrainingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Training Report ({} episodes) ===", self.num_episodes())?;
        writeln!(
            f,
            "  Goal reached:            {} ({:.1}%)",
            self.goals_reached(),
            self.success_rate() * 100.0
        )?;
        if let Some(mean) = self.mean_return_last(100) {
            writeln!(f, "  Mean return (last 100):  {:.2}", mean)?;
        }
        if !self.steps_to_goal.is_empty() {
            let mean_steps =
                self.steps_to_goal.iter().sum::<usize>() as f64 / self.steps_to_goal.len() as f64;
            writeln!(f, "  Mean steps to goal:      {:.1}", mean_steps)?;
        }
        let hits: u32 = self.bottleneck_hits.iter().sum();
        if hits > 0 {
            writeln!(f, "  Bottleneck hits:         {}", hits)?;
        }
        write!(f, "  Final epsilon:           {:.4}", self.final_epsilon)
    }
}
