use crate::booth::Booth;
use geo::{Distance, Geodesic};
use geo_types::Point;

/// A booth index paired with its distance from a reference point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedBooth {
    /// Position of the booth in the slice it was ranked from.
    pub index: usize,
    /// Geodesic distance in metres.
    pub distance_m: f64,
}

/// Geodesic (WGS84 ellipsoid) distance between two points, in metres.
pub fn geodesic_distance(p1: Point<f64>, p2: Point<f64>) -> f64 {
    Geodesic.distance(p1, p2)
}

/// Rank `members` of `booths` by distance from `reference`, closest first.
///
/// The sort is stable, so equal distances keep the order of `members`.
/// Booths without usable coordinates are left out.
pub fn rank_by_distance(
    reference: Point<f64>,
    booths: &[Booth],
    members: &[usize],
) -> Vec<RankedBooth> {
    let mut ranked: Vec<RankedBooth> = members
        .iter()
        .filter_map(|&index| {
            booths[index].point().map(|p| RankedBooth {
                index,
                distance_m: geodesic_distance(reference, p),
            })
        })
        .collect();

    ranked.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
    ranked
}
