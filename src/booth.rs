// Copyright Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Polling booth records and the geometry they carry through clustering

use geo_types::Point;
use serde::{Deserialize, Serialize};

/// A polling booth inside one assembly constituency.
///
/// Coordinates are optional because upstream sources are not always complete;
/// a booth with a missing or non-finite coordinate cannot be clustered.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Booth {
    pub id: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub booth_number: Option<String>,
    pub booth_name: Option<String>,
    /// Cluster label, set by the clusterer. `None` before clustering runs.
    #[serde(default)]
    pub cluster: Option<usize>,
}

impl Booth {
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            latitude: Some(latitude),
            longitude: Some(longitude),
            booth_number: None,
            booth_name: None,
            cluster: None,
        }
    }

    pub fn with_number(mut self, booth_number: impl Into<String>) -> Self {
        self.booth_number = Some(booth_number.into());
        self
    }

    pub fn with_name(mut self, booth_name: impl Into<String>) -> Self {
        self.booth_name = Some(booth_name.into());
        self
    }

    /// `(latitude, longitude)` if both are present and finite.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some((lat, lon)),
            _ => None,
        }
    }

    /// geo_types point (x = longitude, y = latitude).
    pub fn point(&self) -> Option<Point<f64>> {
        self.coordinates().map(|(lat, lon)| Point::new(lon, lat))
    }
}

/// Geometric center of one cluster. Not necessarily the location of any booth.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Centroid {
    pub latitude: f64,
    pub longitude: f64,
}

impl Centroid {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

impl From<[f64; 2]> for Centroid {
    fn from(c: [f64; 2]) -> Self {
        Centroid::new(c[0], c[1])
    }
}
