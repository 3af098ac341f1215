//! Training loop, its configuration, and run metrics.

pub mod config;
pub mod error;
pub mod metrics;
pub mod trainer;

pub use config::TrainingConfig;
pub use error::TrainingError;
pub use metrics::TrainingReport;
pub use trainer::{train_seeded, Trainer, TrainingOutcome};
