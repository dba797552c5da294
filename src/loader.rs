use crate::booth::Booth;
use serde::Deserialize;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoothLoadError {
    #[error("I/O error opening booth file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed booth row: {0}")]
    Csv(#[from] csv::Error),
}

/// One CSV row. Every column is optional so partially filled sheets still load;
/// unparseable coordinates are read as missing.
#[derive(Debug, Deserialize)]
struct BoothRow {
    id: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    latitude: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    longitude: Option<f64>,
    #[serde(alias = "booth_number")]
    booth: Option<String>,
    booth_name: Option<String>,
}

impl BoothRow {
    fn into_booth(self, row_index: usize) -> Booth {
        Booth {
            id: self
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| row_index.to_string()),
            latitude: self.latitude,
            longitude: self.longitude,
            booth_number: self.booth,
            booth_name: self.booth_name,
            cluster: None,
        }
    }
}

/// Read booths from CSV with a header row.
///
/// Recognised columns: `latitude`, `longitude`, `id`, `booth` (or
/// `booth_number`), `booth_name`. Rows without an `id` are keyed by their
/// zero-based row position.
pub fn read_booths<R: Read>(reader: R) -> Result<Vec<Booth>, BoothLoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut booths = Vec::new();
    for (row_index, row) in rdr.deserialize::<BoothRow>().enumerate() {
        booths.push(row?.into_booth(row_index));
    }
    Ok(booths)
}

pub fn load_booths_csv(path: &Path) -> Result<Vec<Booth>, BoothLoadError> {
    let file = File::open(path).map_err(|source| BoothLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let booths = read_booths(file)?;
    tracing::info!("Loaded {} booths from {:?}", booths.len(), path);
    Ok(booths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_columns() {
        let data = "id,booth,booth_name,latitude,longitude\n\
                    B1,12,Govt School,12.971,77.594\n\
                    B2,13,Panchayat Office,12.980,77.601\n";
        let booths = read_booths(data.as_bytes()).unwrap();
        assert_eq!(booths.len(), 2);
        assert_eq!(booths[0].id, "B1");
        assert_eq!(booths[0].booth_number.as_deref(), Some("12"));
        assert_eq!(booths[1].booth_name.as_deref(), Some("Panchayat Office"));
        assert_eq!(booths[1].coordinates(), Some((12.980, 77.601)));
        assert!(booths.iter().all(|b| b.cluster.is_none()));
    }

    #[test]
    fn test_missing_id_uses_row_position() {
        let data = "latitude,longitude\n12.0,77.0\n12.1,77.1\n";
        let booths = read_booths(data.as_bytes()).unwrap();
        assert_eq!(booths[0].id, "0");
        assert_eq!(booths[1].id, "1");
    }

    #[test]
    fn test_bad_or_absent_coordinates_become_missing() {
        let data = "id,latitude,longitude\nA,,77.0\nB,not-a-number,77.1\n";
        let booths = read_booths(data.as_bytes()).unwrap();
        assert!(booths.iter().all(|b| b.coordinates().is_none()));

        let data = "id,booth_name\nA,Hall\n";
        let booths = read_booths(data.as_bytes()).unwrap();
        assert_eq!(booths[0].latitude, None);
        assert_eq!(booths[0].booth_name.as_deref(), Some("Hall"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_booths_csv(Path::new("/nonexistent/booths.csv")).unwrap_err();
        assert!(matches!(err, BoothLoadError::Io { .. }));
    }
}
