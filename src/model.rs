//! K-Means partition model: fitting, segment alignment, and assignment.

use crate::data::TrainingData;
use crate::scaler::StandardScaler;
use crate::segments::Segment;
use crate::{N_FEATURES, N_SEGMENTS};
use linfa::prelude::*;
use linfa_clustering::KMeans;
use linfa_nn::distance::L2Dist;
use ndarray::{Array1, Array2};
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

/// Fitted partition model with segment-aligned centroids.
#[derive(Debug)]
pub struct KMeansModel {
    /// Number of clusters (always 5)
    pub n_clusters: usize,
    /// Centroids in scaled space, row i belongs to segment id i
    pub centroids: Array2<f64>,
    /// Segment id assigned to each training record
    pub labels: Array1<usize>,
    /// Within-cluster sum of squares
    pub inertia: f64,
}

impl KMeansModel {
    /// Get per-segment record counts.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.n_clusters];
        for &label in self.labels.iter() {
            if label < self.n_clusters {
                sizes[label] += 1;
            }
        }
        sizes
    }

    /// Centroids mapped back to original units via the inverse scaler
    /// transform, ordered by segment id.
    pub fn centroids_original(&self, scaler: &StandardScaler) -> Vec<[f64; N_FEATURES]> {
        self.centroids
            .rows()
            .into_iter()
            .map(|row| scaler.inverse_point([row[0], row[1]]))
            .collect()
    }
}

/// Fit K-Means over the scaled training table.
///
/// The RNG is seeded so repeated runs over the same table produce identical
/// centroids and assignments. After fitting, centroids are re-ordered so
/// that row i always carries the semantics of segment id i, regardless of
/// the order the solver happened to emit them in.
pub fn fit_kmeans(
    data: &TrainingData,
    max_iters: usize,
    tolerance: f64,
    seed: u64,
) -> crate::Result<KMeansModel> {
    let n_samples = data.n_samples();
    if n_samples < N_SEGMENTS {
        anyhow::bail!(
            "number of records ({}) must be at least the number of segments ({})",
            n_samples,
            N_SEGMENTS
        );
    }

    // Dummy targets: linfa datasets are supervised-shaped even for clustering
    let targets: Array1<usize> = Array1::zeros(n_samples);
    let dataset = Dataset::new(data.scaled.clone(), targets);

    let rng = Xoshiro256Plus::seed_from_u64(seed);
    let model = KMeans::params_with(N_SEGMENTS, rng, L2Dist)
        .max_n_iterations(max_iters as u64)
        .tolerance(tolerance)
        .fit(&dataset)?;

    let raw_labels = model.predict(&dataset);
    let raw_centroids = model.centroids().clone();

    // Permute solver output into canonical segment order
    let perm = align_to_segments(&raw_centroids);
    let mut centroid_rows = Vec::with_capacity(N_SEGMENTS * N_FEATURES);
    for &cluster in perm.iter() {
        centroid_rows.extend(raw_centroids.row(cluster).iter().copied());
    }
    let centroids = Array2::from_shape_vec((N_SEGMENTS, N_FEATURES), centroid_rows)?;

    let mut inverse = [0usize; N_SEGMENTS];
    for (segment_id, &cluster) in perm.iter().enumerate() {
        inverse[cluster] = segment_id;
    }
    let labels = raw_labels.mapv(|c| inverse[c]);

    let inertia = compute_inertia(&data.scaled, &labels, &centroids);

    Ok(KMeansModel {
        n_clusters: N_SEGMENTS,
        centroids,
        labels,
        inertia,
    })
}

/// Match each fitted centroid to a segment id.
///
/// Every segment has a fixed anchor in scaled space (quadrant corners plus
/// the origin for the average segment). Pairs are assigned globally
/// greedily by increasing distance, so the id -> meaning contract holds for
/// any solver ordering and any seed. Returns `perm` where `perm[segment_id]`
/// is the fitted cluster index.
fn align_to_segments(centroids: &Array2<f64>) -> [usize; N_SEGMENTS] {
    let mut pairs: Vec<(f64, usize, usize)> = Vec::with_capacity(N_SEGMENTS * N_SEGMENTS);
    for (segment_id, segment) in Segment::ALL.iter().enumerate() {
        let anchor = segment.anchor();
        for (cluster, row) in centroids.rows().into_iter().enumerate() {
            let dist = (row[0] - anchor[0]).powi(2) + (row[1] - anchor[1]).powi(2);
            pairs.push((dist, segment_id, cluster));
        }
    }
    // Total order: distance, then indices, so exact ties stay deterministic
    pairs.sort_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.1.cmp(&b.1))
            .then(a.2.cmp(&b.2))
    });

    let mut perm = [usize::MAX; N_SEGMENTS];
    let mut cluster_taken = [false; N_SEGMENTS];
    let mut assigned = 0;
    for (_, segment_id, cluster) in pairs {
        if perm[segment_id] != usize::MAX || cluster_taken[cluster] {
            continue;
        }
        perm[segment_id] = cluster;
        cluster_taken[cluster] = true;
        assigned += 1;
        if assigned == N_SEGMENTS {
            break;
        }
    }
    perm
}

/// Index of the nearest centroid under Euclidean distance.
///
/// Strict comparison keeps the lowest segment id on an exact tie; that
/// tie-break is part of the assignment contract.
pub fn nearest_centroid(point: [f64; N_FEATURES], centroids: &Array2<f64>) -> usize {
    let mut min_distance = f64::INFINITY;
    let mut closest = 0;

    for (idx, centroid) in centroids.rows().into_iter().enumerate() {
        let distance = point
            .iter()
            .zip(centroid.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>();

        if distance < min_distance {
            min_distance = distance;
            closest = idx;
        }
    }

    closest
}

/// Compute within-cluster sum of squares (inertia)
fn compute_inertia(features: &Array2<f64>, labels: &Array1<usize>, centroids: &Array2<f64>) -> f64 {
    let mut inertia = 0.0;

    for (i, &cluster) in labels.iter().enumerate() {
        if cluster < centroids.nrows() {
            let point = features.row(i);
            let centroid = centroids.row(cluster);
            inertia += point
                .iter()
                .zip(centroid.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>();
        }
    }

    inertia
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaler::StandardScaler;
    use ndarray::array;

    /// Five tight blobs, one per segment archetype, in original units.
    fn blob_data() -> TrainingData {
        let anchors = [
            (20.0, 20.0),
            (85.0, 85.0),
            (20.0, 85.0),
            (85.0, 20.0),
            (50.0, 50.0),
        ];
        let mut rows = Vec::new();
        for (cx, cy) in anchors {
            for dx in [-3.0, 0.0, 3.0] {
                for dy in [-3.0, 0.0, 3.0] {
                    rows.extend_from_slice(&[cx + dx, cy + dy]);
                }
            }
        }
        let raw = Array2::from_shape_vec((45, 2), rows).unwrap();
        let scaler = StandardScaler::fit(&raw).unwrap();
        let scaled = scaler.transform(&raw);
        TrainingData { raw, scaled, scaler }
    }

    #[test]
    fn fit_produces_five_aligned_centroids() {
        let data = blob_data();
        let model = fit_kmeans(&data, 300, 1e-4, 42).unwrap();

        assert_eq!(model.n_clusters, 5);
        assert_eq!(model.centroids.shape(), &[5, 2]);
        assert_eq!(model.labels.len(), 45);
        assert!(model.inertia.is_finite() && model.inertia >= 0.0);

        let sizes = model.cluster_sizes();
        assert_eq!(sizes.iter().sum::<usize>(), 45);

        // Segment 0 centroid must sit in the low/low quadrant of scaled space
        assert!(model.centroids[[0, 0]] < 0.0 && model.centroids[[0, 1]] < 0.0);
        // Segment 1 in high/high
        assert!(model.centroids[[1, 0]] > 0.0 && model.centroids[[1, 1]] > 0.0);
    }

    #[test]
    fn fit_is_deterministic_for_a_fixed_seed() {
        let data = blob_data();
        let a = fit_kmeans(&data, 300, 1e-4, 42).unwrap();
        let b = fit_kmeans(&data, 300, 1e-4, 42).unwrap();

        assert_eq!(a.centroids, b.centroids);
        assert_eq!(a.labels, b.labels);
    }

    #[test]
    fn fit_rejects_too_few_records() {
        let raw = array![[10.0, 20.0], [30.0, 40.0], [50.0, 60.0]];
        let scaler = StandardScaler::fit(&raw).unwrap();
        let scaled = scaler.transform(&raw);
        let data = TrainingData { raw, scaled, scaler };

        assert!(fit_kmeans(&data, 300, 1e-4, 42).is_err());
    }

    #[test]
    fn alignment_recovers_shuffled_anchors() {
        // Anchors in the order: high/low, average, low/high, high/high, low/low
        let shuffled = array![
            [1.1, -0.9],
            [0.05, -0.1],
            [-1.2, 0.8],
            [0.9, 1.2],
            [-0.8, -1.1]
        ];
        let perm = align_to_segments(&shuffled);
        assert_eq!(perm, [4, 3, 2, 0, 1]);
    }

    #[test]
    fn nearest_centroid_breaks_ties_toward_lowest_id() {
        let centroids = array![[0.0, 0.0], [0.0, 2.0]];
        // Equidistant from both rows
        assert_eq!(nearest_centroid([0.0, 1.0], &centroids), 0);
    }

    #[test]
    fn nearest_centroid_picks_the_closest() {
        let centroids = array![[-1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]];
        assert_eq!(nearest_centroid([0.9, 1.2], &centroids), 1);
        assert_eq!(nearest_centroid([-1.1, 0.7], &centroids), 2);
    }

    #[test]
    fn original_unit_centroids_round_trip_through_scaler() {
        let data = blob_data();
        let model = fit_kmeans(&data, 300, 1e-4, 42).unwrap();
        let original = model.centroids_original(&data.scaler);

        for (i, point) in original.iter().enumerate() {
            let rescaled = data.scaler.transform_point(*point);
            assert!((rescaled[0] - model.centroids[[i, 0]]).abs() < 1e-9);
            assert!((rescaled[1] - model.centroids[[i, 1]]).abs() < 1e-9);
        }
    }
}
