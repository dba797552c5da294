use crate::cluster_count::SAMPLES_PER_CLUSTER;
use crate::kmeans::KMeansConfig;
use crate::selection::{
    BandedSelector, DEFAULT_BOOTHS_PER_CLUSTER, DistanceBand, EXTENDED_BAND, PREFERRED_BAND,
};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SamplingConfig {
    pub samples_per_cluster: i64,
    pub booths_per_cluster: usize,
    pub preferred_band: DistanceBand,
    pub extended_band: DistanceBand,
    pub kmeans: KMeansConfig,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            samples_per_cluster: SAMPLES_PER_CLUSTER,
            booths_per_cluster: DEFAULT_BOOTHS_PER_CLUSTER,
            preferred_band: PREFERRED_BAND,
            extended_band: EXTENDED_BAND,
            kmeans: KMeansConfig::default(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error reading config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid config '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("Invalid sampling setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn check_band(field: &'static str, band: &DistanceBand) -> Result<(), ConfigError> {
    if !band.min_m.is_finite() || !band.max_m.is_finite() || band.min_m < 0.0 {
        return Err(ConfigError::Invalid {
            field,
            reason: format!(
                "bounds must be finite and non-negative, got [{}, {}]",
                band.min_m, band.max_m
            ),
        });
    }
    if band.min_m > band.max_m {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("min_m {} exceeds max_m {}", band.min_m, band.max_m),
        });
    }
    Ok(())
}

impl SamplingConfig {
    pub fn selector(&self) -> BandedSelector {
        BandedSelector::new(
            self.preferred_band,
            self.extended_band,
            self.booths_per_cluster,
        )
    }

    /// Parse a RON document. Omitted fields keep their defaults.
    pub fn from_ron_str(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }

    /// Reject settings that would make every run fail or every band empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.samples_per_cluster <= 0 {
            return Err(ConfigError::Invalid {
                field: "samples_per_cluster",
                reason: format!("must be positive, got {}", self.samples_per_cluster),
            });
        }
        if self.booths_per_cluster == 0 {
            return Err(ConfigError::Invalid {
                field: "booths_per_cluster",
                reason: String::from("must be at least 1"),
            });
        }
        check_band("preferred_band", &self.preferred_band)?;
        check_band("extended_band", &self.extended_band)?;
        if !self.kmeans.tolerance.is_finite() || self.kmeans.tolerance < 0.0 {
            return Err(ConfigError::Invalid {
                field: "kmeans.tolerance",
                reason: format!(
                    "must be finite and non-negative, got {}",
                    self.kmeans.tolerance
                ),
            });
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ron_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }
}
