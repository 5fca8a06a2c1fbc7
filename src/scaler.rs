//! Per-feature standardization (zero mean, unit variance) and its inverse.
//!
//! The scaler is fitted once by the trainer, persisted, and loaded read-only
//! by the predictor, so it is an explicit serde-serializable struct rather
//! than an opaque fitted object.

use crate::N_FEATURES;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Fitted standardization parameters for the two features.
///
/// Uses the population standard deviation (ddof = 0), matching the usual
/// StandardScaler convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: [f64; N_FEATURES],
    pub std: [f64; N_FEATURES],
}

impl StandardScaler {
    /// Fit mean and std per feature over the full table.
    ///
    /// Fails on an empty table or a degenerate (all-equal) feature column,
    /// since a zero std makes the transform undefined.
    pub fn fit(data: &Array2<f64>) -> crate::Result<StandardScaler> {
        if data.nrows() == 0 {
            anyhow::bail!("cannot fit scaler on an empty table");
        }
        if data.ncols() != N_FEATURES {
            anyhow::bail!(
                "expected {} feature columns, got {}",
                N_FEATURES,
                data.ncols()
            );
        }

        let n = data.nrows() as f64;
        let mut mean = [0.0; N_FEATURES];
        let mut std = [0.0; N_FEATURES];

        for j in 0..N_FEATURES {
            let col = data.column(j);
            mean[j] = col.sum() / n;
            let var = col.iter().map(|x| (x - mean[j]).powi(2)).sum::<f64>() / n;
            std[j] = var.sqrt();
            if std[j] <= f64::EPSILON {
                anyhow::bail!(
                    "feature column {} is degenerate (all values equal); cannot standardize",
                    j
                );
            }
        }

        Ok(StandardScaler { mean, std })
    }

    /// Apply (x - mean) / std to every row.
    pub fn transform(&self, data: &Array2<f64>) -> Array2<f64> {
        let mut out = data.clone();
        for mut row in out.rows_mut() {
            for j in 0..N_FEATURES {
                row[j] = (row[j] - self.mean[j]) / self.std[j];
            }
        }
        out
    }

    /// Scale a single (income, score) point.
    pub fn transform_point(&self, point: [f64; N_FEATURES]) -> [f64; N_FEATURES] {
        let mut out = [0.0; N_FEATURES];
        for j in 0..N_FEATURES {
            out[j] = (point[j] - self.mean[j]) / self.std[j];
        }
        out
    }

    /// Map a scaled point back to original units: x * std + mean.
    pub fn inverse_point(&self, point: [f64; N_FEATURES]) -> [f64; N_FEATURES] {
        let mut out = [0.0; N_FEATURES];
        for j in 0..N_FEATURES {
            out[j] = point[j] * self.std[j] + self.mean[j];
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn sample_table() -> Array2<f64> {
        array![[10.0, 20.0], [20.0, 40.0], [30.0, 60.0], [40.0, 80.0]]
    }

    #[test]
    fn fit_computes_mean_and_population_std() {
        let scaler = StandardScaler::fit(&sample_table()).unwrap();
        assert_relative_eq!(scaler.mean[0], 25.0);
        assert_relative_eq!(scaler.mean[1], 50.0);
        // population std of {10,20,30,40} = sqrt(125)
        assert_relative_eq!(scaler.std[0], 125.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn transform_centers_and_scales() {
        let table = sample_table();
        let scaler = StandardScaler::fit(&table).unwrap();
        let scaled = scaler.transform(&table);
        for j in 0..N_FEATURES {
            let col = scaled.column(j);
            let mean = col.sum() / col.len() as f64;
            assert_relative_eq!(mean, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn inverse_round_trips() {
        let scaler = StandardScaler::fit(&sample_table()).unwrap();
        let point = [33.5, 71.2];
        let back = scaler.inverse_point(scaler.transform_point(point));
        assert_relative_eq!(back[0], point[0], epsilon = 1e-9);
        assert_relative_eq!(back[1], point[1], epsilon = 1e-9);
    }

    #[test]
    fn degenerate_column_is_rejected() {
        let table = array![[5.0, 1.0], [5.0, 2.0], [5.0, 3.0]];
        assert!(StandardScaler::fit(&table).is_err());
    }

    #[test]
    fn empty_table_is_rejected() {
        let table = Array2::<f64>::zeros((0, 2));
        assert!(StandardScaler::fit(&table).is_err());
    }
}
