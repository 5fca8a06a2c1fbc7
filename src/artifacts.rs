//! Durable artifact layout shared by the trainer and the predictor.
//!
//! Three flat files, overwritten wholesale on every training run: scaler
//! state, partition model state (both versioned JSON), and the original-unit
//! centroid table (plain keyed JSON, kept human-inspectable). Loading is
//! strict: a predictor must be able to tell missing from incompatible from
//! corrupt.

use crate::error::ArtifactError;
use crate::model::KMeansModel;
use crate::scaler::StandardScaler;
use crate::{N_FEATURES, N_SEGMENTS};
use anyhow::Context;
use ndarray::Array2;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const SCALER_FILE: &str = "scaler.json";
pub const MODEL_FILE: &str = "model.json";
pub const CENTROIDS_FILE: &str = "centroids.json";

/// Bumped whenever the persisted schema changes shape.
pub const FORMAT_VERSION: u32 = 1;

/// Persisted scaler state.
#[derive(Debug, Serialize, Deserialize)]
pub struct ScalerArtifact {
    pub format_version: u32,
    pub mean: [f64; N_FEATURES],
    pub std: [f64; N_FEATURES],
}

/// Persisted partition model state: centroids in scaled space, row i is
/// segment id i.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub n_clusters: usize,
    pub centroids: Vec<[f64; N_FEATURES]>,
}

/// One row of the original-unit centroid table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CentroidEntry {
    pub income: f64,
    pub score: f64,
}

/// Write all three artifacts, overwriting any prior versions.
pub fn save_artifacts(
    dir: &Path,
    scaler: &StandardScaler,
    model: &KMeansModel,
) -> crate::Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create artifact directory {}", dir.display()))?;

    let scaler_artifact = ScalerArtifact {
        format_version: FORMAT_VERSION,
        mean: scaler.mean,
        std: scaler.std,
    };
    write_json(&dir.join(SCALER_FILE), &scaler_artifact)?;

    let model_artifact = ModelArtifact {
        format_version: FORMAT_VERSION,
        n_clusters: model.n_clusters,
        centroids: model
            .centroids
            .rows()
            .into_iter()
            .map(|row| [row[0], row[1]])
            .collect(),
    };
    write_json(&dir.join(MODEL_FILE), &model_artifact)?;

    let table: BTreeMap<String, CentroidEntry> = model
        .centroids_original(scaler)
        .into_iter()
        .enumerate()
        .map(|(id, [income, score])| (id.to_string(), CentroidEntry { income, score }))
        .collect();
    write_json(&dir.join(CENTROIDS_FILE), &table)?;

    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> crate::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Load and validate the scaler artifact.
pub fn load_scaler(dir: &Path) -> Result<StandardScaler, ArtifactError> {
    let path = dir.join(SCALER_FILE);
    let artifact: ScalerArtifact = read_json(&path)?;
    check_version(&path, artifact.format_version)?;

    if artifact.std.iter().any(|s| *s <= 0.0) {
        return Err(ArtifactError::Corrupt {
            path,
            reason: "scaler std must be positive for both features".into(),
        });
    }

    Ok(StandardScaler {
        mean: artifact.mean,
        std: artifact.std,
    })
}

/// Load and validate the partition model artifact. Returns the scaled
/// centroids with row i holding segment id i.
pub fn load_model_centroids(dir: &Path) -> Result<Array2<f64>, ArtifactError> {
    let path = dir.join(MODEL_FILE);
    let artifact: ModelArtifact = read_json(&path)?;
    check_version(&path, artifact.format_version)?;

    if artifact.n_clusters != N_SEGMENTS || artifact.centroids.len() != N_SEGMENTS {
        return Err(ArtifactError::Corrupt {
            path,
            reason: format!(
                "expected {} centroids, found {} (n_clusters = {})",
                N_SEGMENTS,
                artifact.centroids.len(),
                artifact.n_clusters
            ),
        });
    }

    let flat: Vec<f64> = artifact.centroids.iter().flatten().copied().collect();
    Array2::from_shape_vec((N_SEGMENTS, N_FEATURES), flat).map_err(|e| ArtifactError::Corrupt {
        path,
        reason: e.to_string(),
    })
}

/// Load the original-unit centroid table, checking that it carries exactly
/// one entry per segment id 0-4.
pub fn load_centroid_table(dir: &Path) -> Result<[CentroidEntry; N_SEGMENTS], ArtifactError> {
    let path = dir.join(CENTROIDS_FILE);
    let raw: BTreeMap<String, CentroidEntry> = read_json(&path)?;

    if raw.len() != N_SEGMENTS {
        return Err(ArtifactError::Inconsistent {
            reason: format!(
                "centroid table has {} entries, expected {}",
                raw.len(),
                N_SEGMENTS
            ),
        });
    }

    let mut table = [CentroidEntry {
        income: 0.0,
        score: 0.0,
    }; N_SEGMENTS];
    for id in 0..N_SEGMENTS {
        let entry = raw
            .get(&id.to_string())
            .ok_or_else(|| ArtifactError::Inconsistent {
                reason: format!("centroid table is missing segment id {}", id),
            })?;
        table[id] = *entry;
    }

    Ok(table)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ArtifactError::Missing {
            path: PathBuf::from(path),
        },
        _ => ArtifactError::Io {
            path: PathBuf::from(path),
            source: e,
        },
    })?;

    serde_json::from_str(&text).map_err(|e| ArtifactError::Corrupt {
        path: PathBuf::from(path),
        reason: e.to_string(),
    })
}

fn check_version(path: &Path, found: u32) -> Result<(), ArtifactError> {
    if found != FORMAT_VERSION {
        return Err(ArtifactError::IncompatibleVersion {
            path: PathBuf::from(path),
            found,
            expected: FORMAT_VERSION,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use tempfile::tempdir;

    fn sample_model() -> (StandardScaler, KMeansModel) {
        let scaler = StandardScaler {
            mean: [50.0, 50.0],
            std: [25.0, 25.0],
        };
        let model = KMeansModel {
            n_clusters: N_SEGMENTS,
            centroids: array![
                [-1.0, -1.0],
                [1.0, 1.0],
                [-1.0, 1.0],
                [1.0, -1.0],
                [0.0, 0.0]
            ],
            labels: ndarray::Array1::zeros(0),
            inertia: 0.0,
        };
        (scaler, model)
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let (scaler, model) = sample_model();
        save_artifacts(dir.path(), &scaler, &model).unwrap();

        let loaded_scaler = load_scaler(dir.path()).unwrap();
        assert_eq!(loaded_scaler, scaler);

        let centroids = load_model_centroids(dir.path()).unwrap();
        assert_eq!(centroids, model.centroids);

        let table = load_centroid_table(dir.path()).unwrap();
        // Segment 0 centroid (-1, -1) in scaled space -> (25, 25) original
        assert_eq!(table[0], CentroidEntry { income: 25.0, score: 25.0 });
        assert_eq!(table[4], CentroidEntry { income: 50.0, score: 50.0 });
    }

    #[test]
    fn missing_artifact_is_distinguished() {
        let dir = tempdir().unwrap();
        match load_scaler(dir.path()) {
            Err(ArtifactError::Missing { .. }) => {}
            other => panic!("expected Missing, got {:?}", other.err()),
        }
    }

    #[test]
    fn corrupt_artifact_is_distinguished() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(SCALER_FILE), "not json at all").unwrap();
        match load_scaler(dir.path()) {
            Err(ArtifactError::Corrupt { .. }) => {}
            other => panic!("expected Corrupt, got {:?}", other.err()),
        }
    }

    #[test]
    fn version_mismatch_is_distinguished() {
        let dir = tempdir().unwrap();
        let artifact = ScalerArtifact {
            format_version: FORMAT_VERSION + 1,
            mean: [0.0, 0.0],
            std: [1.0, 1.0],
        };
        write_json(&dir.path().join(SCALER_FILE), &artifact).unwrap();
        match load_scaler(dir.path()) {
            Err(ArtifactError::IncompatibleVersion { found, .. }) => {
                assert_eq!(found, FORMAT_VERSION + 1);
            }
            other => panic!("expected IncompatibleVersion, got {:?}", other.err()),
        }
    }

    #[test]
    fn centroid_table_must_cover_all_ids() {
        let dir = tempdir().unwrap();
        let mut table = BTreeMap::new();
        for id in 0..4 {
            table.insert(id.to_string(), CentroidEntry { income: 1.0, score: 2.0 });
        }
        // Five entries, but "5" instead of "4"
        table.insert("5".to_string(), CentroidEntry { income: 1.0, score: 2.0 });
        write_json(&dir.path().join(CENTROIDS_FILE), &table).unwrap();

        match load_centroid_table(dir.path()) {
            Err(ArtifactError::Inconsistent { reason }) => {
                assert!(reason.contains("missing segment id 4"));
            }
            other => panic!("expected Inconsistent, got {:?}", other.err()),
        }
    }

    #[test]
    fn centroid_table_rejects_wrong_cardinality() {
        let dir = tempdir().unwrap();
        let mut table = BTreeMap::new();
        table.insert("0".to_string(), CentroidEntry { income: 1.0, score: 2.0 });
        write_json(&dir.path().join(CENTROIDS_FILE), &table).unwrap();

        assert!(matches!(
            load_centroid_table(dir.path()),
            Err(ArtifactError::Inconsistent { .. })
        ));
    }
}
