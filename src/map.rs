// Copyright Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// GeoJSON rendering of a selection run for browsing on any slippy map

use crate::booth::Booth;
use crate::orchestrator::SelectionResult;
use geojson::{Feature, FeatureCollection, GeoJson, JsonObject, JsonValue};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CLUSTER_COLORS: [&str; 30] = [
    "#FF0000", "#00FF00", "#0000FF", "#FFFF00", "#FF00FF", "#00FFFF", "#800000", "#008000",
    "#000080", "#808000", "#800080", "#008080", "#FFA500", "#A52A2A", "#DEB887", "#5F9EA0",
    "#7FFF00", "#D2691E", "#FF7F50", "#6495ED", "#DC143C", "#00FFFF", "#00008B", "#008B8B",
    "#B8860B", "#A9A9A9", "#006400", "#BDB76B", "#8B008B", "#556B2F",
];

const UNCLUSTERED_COLOR: &str = "blue";
const CENTROID_COLOR: &str = "black";

#[derive(Error, Debug)]
pub enum MapError {
    #[error("I/O error writing map '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub fn cluster_color(cluster_id: usize) -> &'static str {
    CLUSTER_COLORS[cluster_id % CLUSTER_COLORS.len()]
}

fn popup_text(booth: &Booth, lat: f64, lon: f64) -> String {
    let mut popup = String::new();
    if let Some(cluster) = booth.cluster {
        popup.push_str(&format!("Cluster: {}<br>", cluster));
    }
    if let Some(number) = &booth.booth_number {
        popup.push_str(&format!("Booth: {}<br>", number));
    }
    if let Some(name) = &booth.booth_name {
        popup.push_str(&format!("Name: {}<br>", name));
    }
    popup.push_str(&format!("Lat: {:.6}<br>Lon: {:.6}", lat, lon));
    popup
}

fn point_feature(lat: f64, lon: f64, properties: JsonObject) -> Feature {
    let point = geo_types::Point::new(lon, lat);
    Feature {
        bbox: None,
        geometry: Some(geojson::Geometry {
            bbox: None,
            value: geojson::Value::from(&point),
            foreign_members: None,
        }),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn booth_feature(booth: &Booth, selected: bool) -> Option<Feature> {
    let (lat, lon) = booth.coordinates()?;

    let mut properties = JsonObject::new();
    properties.insert(String::from("kind"), JsonValue::from("booth"));
    properties.insert(String::from("id"), JsonValue::from(booth.id.clone()));
    properties.insert(String::from("selected"), JsonValue::from(selected));
    properties.insert(
        String::from("cluster"),
        booth.cluster.map(JsonValue::from).unwrap_or(JsonValue::Null),
    );

    let color = booth.cluster.map(cluster_color).unwrap_or(UNCLUSTERED_COLOR);
    properties.insert(String::from("color"), JsonValue::from(color));

    let (marker, tooltip) = match (selected, booth.cluster) {
        (true, Some(c)) => ("star", format!("Selected - Cluster {}", c)),
        (true, None) => ("star", String::from("Selected")),
        (false, Some(c)) => ("circle", format!("Cluster {}", c)),
        (false, None) => ("circle", String::new()),
    };
    properties.insert(String::from("marker"), JsonValue::from(marker));
    properties.insert(String::from("tooltip"), JsonValue::from(tooltip));
    properties.insert(
        String::from("popup"),
        JsonValue::from(popup_text(booth, lat, lon)),
    );

    Some(point_feature(lat, lon, properties))
}

/// Render every booth (colored by cluster, selected ones starred) and every
/// centroid into one feature collection titled with the constituency.
pub fn render_geojson(
    result: &SelectionResult,
    ac_name: &str,
    ac_code: &str,
) -> FeatureCollection {
    let mut features: Vec<Feature> = result
        .clustered_booths
        .iter()
        .enumerate()
        .filter_map(|(index, booth)| booth_feature(booth, result.is_selected(index)))
        .collect();

    for (cluster_id, center) in result.cluster_centers.iter().enumerate() {
        let mut properties = JsonObject::new();
        properties.insert(String::from("kind"), JsonValue::from("centroid"));
        properties.insert(String::from("cluster"), JsonValue::from(cluster_id));
        properties.insert(String::from("color"), JsonValue::from(CENTROID_COLOR));
        properties.insert(String::from("marker"), JsonValue::from("bullseye"));
        properties.insert(
            String::from("tooltip"),
            JsonValue::from(format!("Cluster {} Centroid", cluster_id)),
        );
        properties.insert(
            String::from("popup"),
            JsonValue::from(format!("Cluster {} Center", cluster_id)),
        );
        features.push(point_feature(center.latitude, center.longitude, properties));
    }

    let mut foreign_members = JsonObject::new();
    foreign_members.insert(
        String::from("title"),
        JsonValue::from(format!("{} ({})", ac_name, ac_code)),
    );
    foreign_members.insert(
        String::from("total_booths"),
        JsonValue::from(result.clustered_booths.len()),
    );
    foreign_members.insert(
        String::from("selected_booths"),
        JsonValue::from(result.selected_booths.len()),
    );

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(foreign_members),
    }
}

pub fn map_file_name(ac_code: &str, ac_name: &str) -> String {
    let safe_name = ac_name.replace([' ', '/'], "_");
    format!("{}_{}_map.geojson", ac_code, safe_name)
}

/// Write the collection under `output_dir`, creating it if needed.
pub fn save_map(
    collection: FeatureCollection,
    output_dir: &Path,
    ac_code: &str,
    ac_name: &str,
) -> Result<PathBuf, MapError> {
    std::fs::create_dir_all(output_dir).map_err(|source| MapError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let path = output_dir.join(map_file_name(ac_code, ac_name));
    let serialized = GeoJson::from(collection).to_string();
    std::fs::write(&path, serialized).map_err(|source| MapError::Io {
        path: path.clone(),
        source,
    })?;

    Ok(path)
}
