//! Training-table loading and feature preparation using Polars.

use crate::scaler::StandardScaler;
use anyhow::Context;
use ndarray::Array2;
use polars::prelude::*;
use std::path::Path;

/// CSV column holding annual income in k$.
pub const INCOME_COLUMN: &str = "Annual Income (k$)";
/// CSV column holding the spending score (1-100).
pub const SCORE_COLUMN: &str = "Spending Score (1-100)";

/// The immutable training table plus the scaler fitted on it.
#[derive(Debug)]
pub struct TrainingData {
    /// (income, score) per customer in original units, shape (n, 2)
    pub raw: Array2<f64>,
    /// Standardized features, shape (n, 2)
    pub scaled: Array2<f64>,
    /// Scaler fitted on `raw`
    pub scaler: StandardScaler,
}

impl TrainingData {
    pub fn n_samples(&self) -> usize {
        self.raw.nrows()
    }
}

/// Load the customer CSV, validate it, and fit the feature scaler.
///
/// The table must be non-empty, both feature columns must be present, and
/// neither may contain missing values. Any violation aborts: training is a
/// one-shot offline run with nothing to recover to.
pub fn load_training_data(path: &Path) -> crate::Result<TrainingData> {
    let df = CsvReader::from_path(path)
        .with_context(|| format!("failed to open dataset {}", path.display()))?
        .has_header(true)
        .finish()
        .with_context(|| format!("failed to parse dataset {}", path.display()))?;

    if df.height() == 0 {
        anyhow::bail!("dataset {} is empty", path.display());
    }

    let income = extract_column(&df, INCOME_COLUMN)?;
    let score = extract_column(&df, SCORE_COLUMN)?;

    let n_samples = income.len();
    let mut raw_data = Vec::with_capacity(n_samples * 2);
    for i in 0..n_samples {
        raw_data.extend_from_slice(&[income[i], score[i]]);
    }
    let raw = Array2::from_shape_vec((n_samples, 2), raw_data)?;

    let scaler = StandardScaler::fit(&raw)?;
    let scaled = scaler.transform(&raw);

    Ok(TrainingData { raw, scaled, scaler })
}

/// Pull one feature column out as f64, rejecting missing values.
fn extract_column(df: &DataFrame, name: &str) -> crate::Result<Vec<f64>> {
    let series = df
        .column(name)
        .with_context(|| format!("dataset is missing required column '{}'", name))?;

    if series.null_count() > 0 {
        anyhow::bail!(
            "column '{}' contains {} missing value(s)",
            name,
            series.null_count()
        );
    }

    let values: Vec<f64> = series
        .cast(&DataType::Float64)
        .with_context(|| format!("column '{}' is not numeric", name))?
        .f64()?
        .into_no_null_iter()
        .collect();

    Ok(values)
}
