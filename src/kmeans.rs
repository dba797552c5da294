// Copyright Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Deterministic k-means partitioning of booth coordinates

use crate::booth::{Booth, Centroid};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KMeansConfig {
    /// Base seed. Restart `r` is seeded with `seed + r`.
    pub seed: u64,
    pub restarts: usize,
    pub max_iterations: usize,
    /// Convergence threshold, relative to the mean per-axis variance of the input.
    pub tolerance: f64,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            restarts: 10,
            max_iterations: 300,
            tolerance: 1e-4,
        }
    }
}

/// Outcome of the best k-means restart.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansRun {
    pub labels: Vec<usize>,
    pub centers: Vec<[f64; 2]>,
    pub inertia: f64,
    pub iterations: usize,
}

/// Partition booths into `n_clusters` groups over raw (latitude, longitude).
///
/// `n_clusters` is clamped to the number of booths. On success every booth gets
/// a `cluster` label in `[0, k)` and the `k` centroids are returned in label order.
/// Returns an empty vector and leaves the booths untouched when there is nothing
/// to cluster or any booth is missing a coordinate.
pub fn cluster_booths(
    booths: &mut [Booth],
    n_clusters: usize,
    config: &KMeansConfig,
) -> Vec<Centroid> {
    if booths.is_empty() {
        return vec![];
    }

    let coords: Option<Vec<[f64; 2]>> = booths
        .iter()
        .map(|b| b.coordinates().map(|(lat, lon)| [lat, lon]))
        .collect();

    let Some(coords) = coords else {
        tracing::warn!(
            "Skipping clustering: {} booths supplied but some lack coordinates",
            booths.len()
        );
        return vec![];
    };

    let k = n_clusters.min(coords.len());
    if k < 1 {
        return vec![];
    }

    let Some(run) = kmeans(&coords, k, config) else {
        return vec![];
    };

    tracing::debug!(
        "k-means settled on {} clusters for {} booths (inertia {:.6e}, {} iterations)",
        k,
        coords.len(),
        run.inertia,
        run.iterations
    );

    for (booth, &label) in booths.iter_mut().zip(run.labels.iter()) {
        booth.cluster = Some(label);
    }

    run.centers.into_iter().map(Centroid::from).collect()
}

/// Best-of-`restarts` k-means with k-means++ seeding.
///
/// Restarts run in parallel but each owns a seeded RNG, and the winner is the
/// lowest inertia with ties going to the lowest restart index, so the result
/// does not depend on scheduling.
pub fn kmeans(points: &[[f64; 2]], k: usize, config: &KMeansConfig) -> Option<KMeansRun> {
    if points.is_empty() || k == 0 {
        return None;
    }
    let k = k.min(points.len());
    let tol = scaled_tolerance(points, config.tolerance);

    let runs: Vec<KMeansRun> = (0..config.restarts.max(1))
        .into_par_iter()
        .map(|restart| {
            let mut rng = ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(restart as u64));
            let init = kmeans_plus_plus(points, k, &mut rng);
            lloyd(points, init, config.max_iterations.max(1), tol)
        })
        .collect();

    runs.into_iter().min_by(|a, b| a.inertia.total_cmp(&b.inertia))
}

fn sq_dist(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)
}

fn scaled_tolerance(points: &[[f64; 2]], tolerance: f64) -> f64 {
    let n = points.len() as f64;
    let mut variance = 0.0;
    for axis in 0..2 {
        let mean = points.iter().map(|p| p[axis]).sum::<f64>() / n;
        variance += points.iter().map(|p| (p[axis] - mean).powi(2)).sum::<f64>() / n;
    }
    tolerance * variance / 2.0
}

/// Greedy k-means++: each new center is the best of `2 + ln(k)` candidates
/// sampled proportionally to squared distance from the existing centers.
fn kmeans_plus_plus(points: &[[f64; 2]], k: usize, rng: &mut ChaCha8Rng) -> Vec<[f64; 2]> {
    let n = points.len();
    let local_trials = 2 + (k as f64).ln() as usize;

    let mut centers: Vec<[f64; 2]> = Vec::with_capacity(k);
    centers.push(points[rng.random_range(0..n)]);

    let mut closest: Vec<f64> = points.iter().map(|p| sq_dist(p, &centers[0])).collect();
    let mut potential: f64 = closest.iter().sum();

    for _ in 1..k {
        if potential <= 0.0 {
            // every point already sits on a center
            centers.push(points[rng.random_range(0..n)]);
            continue;
        }

        let mut best: Option<(usize, f64, Vec<f64>)> = None;
        for _ in 0..local_trials {
            let target = rng.random::<f64>() * potential;
            let candidate = sample_index(&closest, target);

            let dists: Vec<f64> = closest
                .iter()
                .zip(points.iter())
                .map(|(d, p)| d.min(sq_dist(p, &points[candidate])))
                .collect();
            let pot: f64 = dists.iter().sum();

            let better = match &best {
                Some((_, best_pot, _)) => pot < *best_pot,
                None => true,
            };
            if better {
                best = Some((candidate, pot, dists));
            }
        }

        if let Some((candidate, pot, dists)) = best {
            centers.push(points[candidate]);
            closest = dists;
            potential = pot;
        }
    }

    centers
}

/// Index whose cumulative weight first exceeds `target`.
fn sample_index(weights: &[f64], target: f64) -> usize {
    let mut acc = 0.0;
    let mut last_positive = 0;
    for (i, w) in weights.iter().enumerate() {
        if *w > 0.0 {
            last_positive = i;
        }
        acc += w;
        if acc > target {
            return i;
        }
    }
    last_positive
}

fn assign(points: &[[f64; 2]], centers: &[[f64; 2]], labels: &mut [usize]) {
    for (label, p) in labels.iter_mut().zip(points.iter()) {
        let mut best_cluster = 0;
        let mut best_dist = f64::INFINITY;
        for (j, ctr) in centers.iter().enumerate() {
            let dist = sq_dist(p, ctr);
            if dist < best_dist {
                best_dist = dist;
                best_cluster = j;
            }
        }
        *label = best_cluster;
    }
}

fn lloyd(
    points: &[[f64; 2]],
    mut centers: Vec<[f64; 2]>,
    max_iterations: usize,
    tol: f64,
) -> KMeansRun {
    let k = centers.len();
    let mut labels = vec![0usize; points.len()];
    let mut iterations = 0;

    for iter in 0..max_iterations {
        iterations = iter + 1;
        assign(points, &centers, &mut labels);

        let mut sums = vec![[0.0, 0.0]; k];
        let mut counts = vec![0usize; k];
        for (p, &cluster) in points.iter().zip(labels.iter()) {
            sums[cluster][0] += p[0];
            sums[cluster][1] += p[1];
            counts[cluster] += 1;
        }

        relocate_empty_clusters(points, &centers, &mut labels, &mut sums, &mut counts);

        let mut shift = 0.0;
        for j in 0..k {
            if counts[j] > 0 {
                let next = [sums[j][0] / counts[j] as f64, sums[j][1] / counts[j] as f64];
                shift += sq_dist(&centers[j], &next);
                centers[j] = next;
            }
        }

        if shift <= tol {
            break;
        }
    }

    assign(points, &centers, &mut labels);
    let inertia = points
        .iter()
        .zip(labels.iter())
        .map(|(p, &cluster)| sq_dist(p, &centers[cluster]))
        .sum();

    KMeansRun {
        labels,
        centers,
        inertia,
        iterations,
    }
}

/// Give each empty cluster the point farthest from its own center,
/// taken only from clusters that can spare one.
fn relocate_empty_clusters(
    points: &[[f64; 2]],
    centers: &[[f64; 2]],
    labels: &mut [usize],
    sums: &mut [[f64; 2]],
    counts: &mut [usize],
) {
    let empty: Vec<usize> = (0..counts.len()).filter(|&j| counts[j] == 0).collect();
    if empty.is_empty() {
        return;
    }

    let mut by_distance: Vec<(usize, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| (i, sq_dist(p, &centers[labels[i]])))
        .collect();
    by_distance.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut donors = by_distance.into_iter();
    for j in empty {
        let Some((i, _)) = donors.find(|(i, _)| counts[labels[*i]] > 1) else {
            break;
        };
        let from = labels[i];
        let p = points[i];
        counts[from] -= 1;
        sums[from][0] -= p[0];
        sums[from][1] -= p[1];

        labels[i] = j;
        counts[j] = 1;
        sums[j] = p;
    }
}
