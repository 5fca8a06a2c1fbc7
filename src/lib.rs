//! Segmint: customer segmentation from (annual income, spending score) pairs.
//!
//! Two halves, used in strict producer/consumer order: an offline trainer
//! that fits a scaler and a K-Means partition over a customer table and
//! persists the results as flat artifacts, and a predictor that loads those
//! artifacts once at startup and answers point queries, served over a small
//! REST surface.

pub mod artifacts;
pub mod cli;
pub mod data;
pub mod error;
pub mod model;
pub mod predictor;
pub mod scaler;
pub mod segments;
pub mod server;
pub mod viz;

// Re-export public items for easier access
pub use cli::{Cli, Command};
pub use data::{load_training_data, TrainingData};
pub use error::{ArtifactError, ValidationError};
pub use model::{fit_kmeans, KMeansModel};
pub use predictor::{Prediction, Predictor, RawValue};
pub use scaler::StandardScaler;
pub use segments::Segment;

/// Number of customer segments. The descriptor table, the centroid table,
/// and the partition model are all index-aligned on these 5 ids.
pub const N_SEGMENTS: usize = 5;

/// Number of input features: annual income, spending score.
pub const N_FEATURES: usize = 2;

/// Common result type used throughout the training pipeline
pub type Result<T> = anyhow::Result<T>;
