// Copyright Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Constituency-level clustering and sampling-point selection

use crate::booth::{Booth, Centroid};
use crate::cluster_count::cluster_count_with;
use crate::config::SamplingConfig;
use crate::distance::rank_by_distance;
use crate::kmeans::cluster_booths;
use crate::selection::{ClusterPick, SelectionTier};
use itertools::Itertools;
use rayon::prelude::*;
use serde::Serialize;

/// Everything one run produces. Built once, never mutated afterwards.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SelectionResult {
    pub total_booths: usize,
    /// Representatives in cluster-id order, closest first within a cluster.
    pub selected_booths: Vec<Booth>,
    /// Positions in `clustered_booths` of each entry of `selected_booths`.
    pub selected_indices: Vec<usize>,
    pub is_complete: bool,
    /// Empty when complete.
    pub reason: String,
    pub incomplete_clusters: Vec<usize>,
    pub cluster_centers: Vec<Centroid>,
    pub clustered_booths: Vec<Booth>,
}

impl SelectionResult {
    fn rejected(booths: Vec<Booth>, reason: String) -> Self {
        Self {
            total_booths: booths.len(),
            selected_booths: vec![],
            selected_indices: vec![],
            is_complete: false,
            reason,
            incomplete_clusters: vec![],
            cluster_centers: vec![],
            clustered_booths: booths,
        }
    }

    /// Whether the booth at `index` in `clustered_booths` was picked.
    pub fn is_selected(&self, index: usize) -> bool {
        self.selected_indices.contains(&index)
    }
}

/// Cluster the constituency's booths and pick sampling points with default settings.
pub fn process_constituency(booths: Vec<Booth>, samples_per_ac: i64) -> SelectionResult {
    process_constituency_with(booths, samples_per_ac, &SamplingConfig::default())
}

pub fn process_constituency_with(
    mut booths: Vec<Booth>,
    samples_per_ac: i64,
    config: &SamplingConfig,
) -> SelectionResult {
    let total_booths = booths.len();
    let n_clusters = cluster_count_with(samples_per_ac, config.samples_per_cluster);

    if n_clusters < 1 {
        return SelectionResult::rejected(
            booths,
            format!(
                "insufficient samples requested (minimum {})",
                config.samples_per_cluster
            ),
        );
    }

    let n_clusters = usize::try_from(n_clusters).unwrap_or(usize::MAX);
    if total_booths < n_clusters {
        return SelectionResult::rejected(
            booths,
            format!(
                "Total booths ({}) < Required clusters ({})",
                total_booths, n_clusters
            ),
        );
    }

    let centers = cluster_booths(&mut booths, n_clusters, &config.kmeans);
    if centers.is_empty() {
        return SelectionResult::rejected(
            booths,
            "booth coordinates missing; no clusters formed".to_string(),
        );
    }

    tracing::info!(
        "Clustered {} booths into {} clusters for {} samples",
        total_booths,
        centers.len(),
        samples_per_ac
    );

    let picks = select_per_cluster(&booths, &centers, config);

    let incomplete_clusters: Vec<usize> = picks
        .iter()
        .enumerate()
        .filter(|(_, pick)| pick.booths.len() < config.booths_per_cluster)
        .map(|(cluster_id, _)| cluster_id)
        .collect();

    let selected_indices: Vec<usize> = picks
        .iter()
        .flat_map(|pick| pick.booths.iter().map(|r| r.index))
        .collect();
    let selected_booths: Vec<Booth> = selected_indices
        .iter()
        .map(|&index| booths[index].clone())
        .collect();

    let is_complete = incomplete_clusters.is_empty();
    let reason = if is_complete {
        String::new()
    } else {
        format!(
            "Could not find {} booths within {}km for cluster(s): [{}]",
            config.booths_per_cluster,
            config.extended_band.max_m / 1000.0,
            incomplete_clusters.iter().join(", ")
        )
    };

    SelectionResult {
        total_booths,
        selected_booths,
        selected_indices,
        is_complete,
        reason,
        incomplete_clusters,
        cluster_centers: centers,
        clustered_booths: booths,
    }
}

/// Run the banded selector for every cluster id in `[0, centers.len())`.
///
/// Members are grouped into an arena keyed by cluster id first, so each
/// cluster's selection reads only its own booths and centroid.
fn select_per_cluster(
    booths: &[Booth],
    centers: &[Centroid],
    config: &SamplingConfig,
) -> Vec<ClusterPick> {
    let mut members: Vec<Vec<usize>> = vec![vec![]; centers.len()];
    for (index, booth) in booths.iter().enumerate() {
        if let Some(cluster) = booth.cluster.filter(|&c| c < centers.len()) {
            members[cluster].push(index);
        }
    }

    let selector = config.selector();

    members
        .par_iter()
        .zip(centers.par_iter())
        .enumerate()
        .map(|(cluster_id, (member_indices, centroid))| {
            let ranked = rank_by_distance(centroid.point(), booths, member_indices);
            let pick = selector.select(&ranked);

            match pick.tier {
                SelectionTier::Fallback if pick.booths.len() >= selector.max_booths => {
                    tracing::warn!(
                        "Cluster {} filled by fallback: no booth between {}m and {}m of center",
                        cluster_id,
                        selector.extended.min_m,
                        selector.extended.max_m
                    );
                }
                _ => {
                    tracing::debug!(
                        "Cluster {}: {} members, {} picked via {:?}",
                        cluster_id,
                        member_indices.len(),
                        pick.booths.len(),
                        pick.tier
                    );
                }
            }

            pick
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::geodesic_distance;
    use crate::selection::DistanceBand;

    /// Booths spread over a few kilometres around a point, enough for two per cluster.
    fn spread(prefix: &str, lat: f64, lon: f64) -> Vec<Booth> {
        let offsets = [
            (0.0, 0.0),
            (0.008, 0.0),
            (-0.008, 0.0),
            (0.0, 0.008),
            (0.0, -0.008),
            (0.012, 0.012),
            (-0.012, -0.012),
        ];
        offsets
            .iter()
            .enumerate()
            .map(|(i, (dlat, dlon))| {
                Booth::new(format!("{}-{}", prefix, i), lat + dlat, lon + dlon)
            })
            .collect()
    }

    #[test]
    fn test_insufficient_samples() {
        let result = process_constituency(spread("a", 12.9, 77.5), 10);
        assert!(!result.is_complete);
        assert_eq!(result.reason, "insufficient samples requested (minimum 25)");
        assert!(result.selected_booths.is_empty());
        assert!(result.cluster_centers.is_empty());
        assert_eq!(result.total_booths, 7);
        assert!(result.clustered_booths.iter().all(|b| b.cluster.is_none()));
    }

    #[test]
    fn test_booth_shortfall_skips_clustering() {
        let booths = vec![
            Booth::new("1", 12.90, 77.50),
            Booth::new("2", 12.91, 77.51),
            Booth::new("3", 12.92, 77.52),
        ];
        let result = process_constituency(booths, 100);
        assert!(!result.is_complete);
        assert_eq!(result.reason, "Total booths (3) < Required clusters (4)");
        assert!(result.selected_booths.is_empty());
        assert!(result.cluster_centers.is_empty());
        assert!(result.clustered_booths.iter().all(|b| b.cluster.is_none()));
    }

    #[test]
    fn test_complete_selection_across_clusters() {
        let mut booths = spread("a", 12.90, 77.50);
        booths.extend(spread("b", 13.40, 78.00));
        let result = process_constituency(booths, 50);

        assert_eq!(result.cluster_centers.len(), 2);
        assert!(result.is_complete, "{}", result.reason);
        assert!(result.reason.is_empty());
        assert_eq!(result.selected_booths.len(), 4);
        assert!(result.clustered_booths.iter().all(|b| b.cluster.is_some()));

        for cluster in 0..2 {
            let picked: Vec<&Booth> = result
                .selected_booths
                .iter()
                .filter(|b| b.cluster == Some(cluster))
                .collect();
            assert_eq!(picked.len(), 2);

            let center = result.cluster_centers[cluster].point();
            for booth in picked {
                let d = geodesic_distance(center, booth.point().unwrap());
                assert!(
                    DistanceBand::new(500.0, 2000.0).contains(d),
                    "{} at {}m",
                    booth.id,
                    d
                );
                assert!(result.clustered_booths.contains(booth));
            }
        }
    }

    #[test]
    fn test_selection_bounded_per_cluster() {
        let mut booths = Vec::new();
        for i in 0..6 {
            booths.extend(spread(&i.to_string(), 12.0 + i as f64 * 0.3, 77.0));
        }
        let result = process_constituency(booths, 150);
        let k = result.cluster_centers.len();
        assert_eq!(k, 6);
        assert!(result.selected_booths.len() <= 2 * k);
        for cluster in 0..k {
            let count = result
                .selected_booths
                .iter()
                .filter(|b| b.cluster == Some(cluster))
                .count();
            assert!(count <= 2);
        }
        let mut ids: Vec<&str> = result
            .selected_booths
            .iter()
            .map(|b| b.id.as_str())
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), result.selected_booths.len());
    }

    #[test]
    fn test_two_booth_cluster_in_band_is_complete() {
        // Centroid lands midway, about 995m from each booth.
        let booths = vec![Booth::new("n", 0.009, 0.0), Booth::new("s", -0.009, 0.0)];
        let result = process_constituency(booths, 25);
        assert!(result.is_complete);
        assert_eq!(result.selected_booths.len(), 2);
    }

    #[test]
    fn test_single_booth_cluster_is_incomplete_by_count() {
        let result = process_constituency(vec![Booth::new("only", 12.9, 77.5)], 25);
        assert!(!result.is_complete);
        assert_eq!(result.selected_booths.len(), 1);
        assert_eq!(result.incomplete_clusters, vec![0]);
        assert_eq!(
            result.reason,
            "Could not find 2 booths within 3km for cluster(s): [0]"
        );
    }

    #[test]
    fn test_out_of_band_fallback_still_reports_complete() {
        // Two booths about 25m from their center: no band is satisfied,
        // but the count matches so the cluster counts as complete.
        let booths = vec![
            Booth::new("x", 0.000225, 0.0),
            Booth::new("y", -0.000225, 0.0),
        ];
        let result = process_constituency(booths, 25);
        assert!(result.is_complete);
        assert_eq!(result.selected_booths.len(), 2);
        assert!(result.reason.is_empty());
    }

    #[test]
    fn test_missing_coordinates_reported() {
        let mut booths = spread("a", 12.9, 77.5);
        booths[2].longitude = None;
        let result = process_constituency(booths, 25);
        assert!(!result.is_complete);
        assert_eq!(result.reason, "booth coordinates missing; no clusters formed");
        assert!(result.cluster_centers.is_empty());
    }

    #[test]
    fn test_deterministic_results() {
        let mut booths = Vec::new();
        for i in 0..4 {
            let lat = 12.0 + i as f64 * 0.05;
            let lon = 77.0 + i as f64 * 0.03;
            booths.extend(spread(&i.to_string(), lat, lon));
        }
        let a = process_constituency(booths.clone(), 75);
        let b = process_constituency(booths, 75);
        assert_eq!(a, b);
    }

    #[test]
    fn test_custom_booths_per_cluster() {
        let config = SamplingConfig {
            booths_per_cluster: 3,
            ..SamplingConfig::default()
        };
        let result = process_constituency_with(spread("a", 12.9, 77.5), 25, &config);
        assert_eq!(result.selected_booths.len(), 3);
    }

    #[test]
    fn test_huge_target_reports_shortfall() {
        let result = process_constituency(vec![Booth::new("only", 12.9, 77.5)], i64::MAX);
        assert!(!result.is_complete);
        assert_eq!(
            result.reason,
            format!("Total booths (1) < Required clusters ({})", i64::MAX / 25)
        );
        assert!(result.cluster_centers.is_empty());
    }

    #[test]
    fn test_selection_membership_ignores_duplicate_ids() {
        // Two booths share an id; only the picked positions count as selected.
        let booths = vec![
            Booth::new("5", 0.009, 0.0),
            Booth::new("5", -0.009, 0.0),
            Booth::new("s", 0.0, 0.0001),
        ];
        let result = process_constituency(booths, 25);
        assert_eq!(result.selected_booths.len(), 2);
        let mut picked = result.selected_indices.clone();
        picked.sort();
        assert_eq!(picked, vec![0, 1]);

        let flagged = (0..result.clustered_booths.len())
            .filter(|&i| result.is_selected(i))
            .count();
        assert_eq!(flagged, result.selected_booths.len());
        assert!(!result.is_selected(2));

        for (booth, &index) in result.selected_booths.iter().zip(&result.selected_indices) {
            assert_eq!(booth, &result.clustered_booths[index]);
        }
    }
}
