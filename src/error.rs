//! Error taxonomy for the serving path.
//!
//! Validation failures are recoverable and become user-facing messages;
//! artifact failures are fatal at startup. Everything on the offline
//! training path uses `anyhow` instead, since training is a one-shot run
//! where any failure aborts.

use std::path::PathBuf;
use thiserror::Error;

/// Malformed or out-of-range prediction input. Recovered at the request
/// boundary; the process keeps serving.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid number")]
    InvalidNumber,

    #[error("Spending Score must be between 1 and 100.")]
    ScoreOutOfRange,

    #[error("income must be non-negative")]
    NegativeIncome,

    #[error("Missing 'income' or 'score' in request body")]
    MissingField,
}

/// Missing or unusable persisted state at predictor startup. Fatal: the
/// process refuses to start serving.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact {} is missing (run `segmint train` first)", path.display())]
    Missing { path: PathBuf },

    #[error("artifact {} has format version {found}, expected {expected}", path.display())]
    IncompatibleVersion {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    #[error("artifact {} is corrupt: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("artifacts are inconsistent: {reason}")]
    Inconsistent { reason: String },

    #[error("failed to read artifact {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
