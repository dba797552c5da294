// Copyright Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Representative booth selection by distance bands around a cluster center

use crate::distance::RankedBooth;
use serde::{Deserialize, Serialize};

/// Inclusive distance interval in metres.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DistanceBand {
    pub min_m: f64,
    pub max_m: f64,
}

impl DistanceBand {
    pub const fn new(min_m: f64, max_m: f64) -> Self {
        Self { min_m, max_m }
    }

    pub fn contains(&self, distance_m: f64) -> bool {
        distance_m >= self.min_m && distance_m <= self.max_m
    }
}

pub const PREFERRED_BAND: DistanceBand = DistanceBand::new(500.0, 2000.0);
pub const EXTENDED_BAND: DistanceBand = DistanceBand::new(500.0, 3000.0);
pub const DEFAULT_BOOTHS_PER_CLUSTER: usize = 2;

/// Which rung of the ladder produced a selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SelectionTier {
    /// Enough booths inside the preferred band.
    Preferred,
    /// Enough booths inside the extended band.
    Extended,
    /// Some, but not enough, booths inside the extended band.
    PartialExtended,
    /// Nothing inside the extended band; closest booths regardless of distance.
    Fallback,
    /// The cluster had no booths at all.
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterPick {
    pub tier: SelectionTier,
    pub booths: Vec<RankedBooth>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandedSelector {
    pub preferred: DistanceBand,
    pub extended: DistanceBand,
    pub max_booths: usize,
}

impl Default for BandedSelector {
    fn default() -> Self {
        Self {
            preferred: PREFERRED_BAND,
            extended: EXTENDED_BAND,
            max_booths: DEFAULT_BOOTHS_PER_CLUSTER,
        }
    }
}

impl BandedSelector {
    pub fn new(preferred: DistanceBand, extended: DistanceBand, max_booths: usize) -> Self {
        Self {
            preferred,
            extended,
            max_booths,
        }
    }

    /// Pick up to `max_booths` booths from a list sorted ascending by distance.
    ///
    /// Every rung filters the full list. A `Fallback` pick can hold
    /// `max_booths` booths that sit outside both bands; callers judging
    /// completeness by count will see such a cluster as complete.
    pub fn select(&self, ranked: &[RankedBooth]) -> ClusterPick {
        if ranked.is_empty() {
            return ClusterPick {
                tier: SelectionTier::Empty,
                booths: vec![],
            };
        }

        let full_bands = [
            (SelectionTier::Preferred, self.preferred),
            (SelectionTier::Extended, self.extended),
        ];
        for (tier, band) in full_bands {
            let in_band = self.within(ranked, band);
            if in_band.len() >= self.max_booths {
                return ClusterPick {
                    tier,
                    booths: in_band.into_iter().take(self.max_booths).collect(),
                };
            }
        }

        let extended = self.within(ranked, self.extended);
        if !extended.is_empty() {
            return ClusterPick {
                tier: SelectionTier::PartialExtended,
                booths: extended,
            };
        }

        ClusterPick {
            tier: SelectionTier::Fallback,
            booths: ranked.iter().take(self.max_booths).copied().collect(),
        }
    }

    fn within(&self, ranked: &[RankedBooth], band: DistanceBand) -> Vec<RankedBooth> {
        ranked
            .iter()
            .filter(|r| band.contains(r.distance_m))
            .copied()
            .collect()
    }
}
