//! Online segment assignment over artifacts loaded once at startup.

use crate::artifacts::{self, CentroidEntry};
use crate::error::{ArtifactError, ValidationError};
use crate::model::nearest_centroid;
use crate::scaler::StandardScaler;
use crate::segments::Segment;
use crate::N_SEGMENTS;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A prediction input as it arrives off the wire: either a JSON number or a
/// numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Parse into a finite f64.
    pub fn parse(&self) -> Result<f64, ValidationError> {
        let value = match self {
            RawValue::Number(v) => *v,
            RawValue::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ValidationError::InvalidNumber)?,
        };
        if !value.is_finite() {
            return Err(ValidationError::InvalidNumber);
        }
        Ok(value)
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Number(v)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

/// Successful segment assignment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub segment_id: usize,
    pub label: &'static str,
    pub color: &'static str,
    pub description: &'static str,
    pub centroid_income: f64,
    pub centroid_score: f64,
}

/// Loaded artifacts plus the assignment rule. All state is read-only after
/// `load`, so a `Predictor` can be shared freely across threads.
#[derive(Debug)]
pub struct Predictor {
    scaler: StandardScaler,
    /// Scaled centroids, row i is segment id i
    centroids: Array2<f64>,
    /// Original-unit centroid table, index i is segment id i
    table: [CentroidEntry; N_SEGMENTS],
}

impl Predictor {
    /// Load scaler, partition model, and centroid table from `dir`.
    ///
    /// Any missing, corrupt, version-incompatible, or mutually inconsistent
    /// artifact fails the load; callers treat that as fatal.
    pub fn load(dir: &Path) -> Result<Predictor, ArtifactError> {
        let scaler = artifacts::load_scaler(dir)?;
        let centroids = artifacts::load_model_centroids(dir)?;
        let table = artifacts::load_centroid_table(dir)?;

        // The centroid table must be the inverse-transformed image of the
        // model centroids; a mismatch means the artifacts were written by
        // different training runs.
        for (id, entry) in table.iter().enumerate() {
            let expected = scaler.inverse_point([centroids[[id, 0]], centroids[[id, 1]]]);
            if (expected[0] - entry.income).abs() > 1e-6 || (expected[1] - entry.score).abs() > 1e-6
            {
                return Err(ArtifactError::Inconsistent {
                    reason: format!(
                        "centroid table entry {} does not match the partition model",
                        id
                    ),
                });
            }
        }

        Ok(Predictor {
            scaler,
            centroids,
            table,
        })
    }

    /// Assign a segment to one (income, score) query.
    ///
    /// Pure: no side effects, no mutation of loaded state. Validation
    /// failures are returned to the caller; the spending-score range is
    /// checked before the income sign, so the score error wins when both
    /// are out of range.
    pub fn predict(&self, income: &RawValue, score: &RawValue) -> Result<Prediction, ValidationError> {
        let income = income.parse()?;
        let score = score.parse()?;

        if !(1.0..=100.0).contains(&score) {
            return Err(ValidationError::ScoreOutOfRange);
        }
        if income < 0.0 {
            return Err(ValidationError::NegativeIncome);
        }

        let scaled = self.scaler.transform_point([income, score]);
        let segment_id = nearest_centroid(scaled, &self.centroids);
        // load() guarantees exactly N_SEGMENTS centroids, so the id is valid
        let segment = Segment::from_id(segment_id).unwrap_or(Segment::Average);
        let centroid = self.table[segment_id];

        Ok(Prediction {
            segment_id,
            label: segment.label(),
            color: segment.color(),
            description: segment.description(),
            centroid_income: centroid.income,
            centroid_score: centroid.score,
        })
    }

    /// Convenience wrapper for already-numeric inputs.
    pub fn predict_values(&self, income: f64, score: f64) -> Result<Prediction, ValidationError> {
        self.predict(&RawValue::Number(income), &RawValue::Number(score))
    }

    /// The loaded original-unit centroid table, ordered by segment id.
    pub fn centroid_table(&self) -> &[CentroidEntry; N_SEGMENTS] {
        &self.table
    }
}
