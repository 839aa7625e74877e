//! Input loading.
//!
//! Reads study sites from a CSV table and country outlines from GeoJSON,
//! turning both into geographic values ready for projection.

use serde::Serialize;
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::InputConfig;
use crate::error::{MapError, Result};
use crate::geo::{
    geometry_from_geojson, is_missing, parse_coordinate, validate_points, GeoPoint, Geometry,
    Layer, LayerKind,
};
use crate::logging::log_load_stats;

/// A row left out because a coordinate was missing or unparseable
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRow {
    /// 1-based data row number (header excluded)
    pub row: usize,
    pub id: String,
    pub reason: String,
}

/// Sites read from a table
#[derive(Debug, Clone, Default, Serialize)]
pub struct SiteTable {
    pub points: Vec<GeoPoint>,
    pub skipped: Vec<SkippedRow>,
    pub rows_read: usize,
}

/// Load and validate sites from a CSV file
pub fn load_sites(path: &Path, config: &InputConfig) -> Result<SiteTable> {
    if !path.exists() {
        return Err(MapError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File not found: {}", path.display()),
        )));
    }

    let file = std::fs::File::open(path)?;
    let table = read_sites(file, config)?;

    log_load_stats(
        &path.display().to_string(),
        table.rows_read,
        table.points.len(),
        table.skipped.len(),
    );

    Ok(table)
}

/// Read sites from any CSV source.
///
/// Rows with a missing coordinate are skipped and reported; rows with an
/// out-of-range coordinate fail the whole read.
pub fn read_sites<R: Read>(reader: R, config: &InputConfig) -> Result<SiteTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let id_idx = find_column(&headers, &config.id_column).ok();
    let lon_idx = find_column(&headers, &config.lon_column)?;
    let lat_idx = find_column(&headers, &config.lat_column)?;

    if id_idx.is_none() {
        warn!(
            column = config.id_column.as_str(),
            "Identifier column not found, using row numbers"
        );
    }

    let mut table = SiteTable::default();

    for (idx, result) in csv_reader.records().enumerate() {
        let row = idx + 1;
        let record = result?;
        table.rows_read += 1;

        let id = id_idx
            .and_then(|i| record.get(i))
            .filter(|raw| !is_missing(raw))
            .map(str::to_string)
            .unwrap_or_else(|| row.to_string());

        let lon_raw = record.get(lon_idx).unwrap_or("");
        let lat_raw = record.get(lat_idx).unwrap_or("");

        match (parse_coordinate(lon_raw), parse_coordinate(lat_raw)) {
            (Some(lon), Some(lat)) => table.points.push(GeoPoint { id, lon, lat }),
            (lon, lat) => {
                let mut missing = Vec::new();
                if lon.is_none() {
                    missing.push(format!("{}='{}'", config.lon_column, lon_raw));
                }
                if lat.is_none() {
                    missing.push(format!("{}='{}'", config.lat_column, lat_raw));
                }
                let reason = format!("missing or unparseable {}", missing.join(", "));
                warn!(row = row, id = id.as_str(), reason = reason.as_str(), "Skipping row");
                table.skipped.push(SkippedRow { row, id, reason });
            }
        }
    }

    validate_points(&table.points)?;

    debug!(
        kept = table.points.len(),
        skipped = table.skipped.len(),
        "Sites parsed"
    );

    Ok(table)
}

/// Locate a column by exact name, falling back to a case-insensitive match
fn find_column(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .or_else(|| headers.iter().position(|h| h.eq_ignore_ascii_case(name)))
        .ok_or_else(|| MapError::DataNotFound {
            message: format!(
                "Column '{}' not found; available columns: {}",
                name,
                headers.iter().collect::<Vec<_>>().join(", ")
            ),
        })
}

/// Load country outlines from a GeoJSON file
pub fn load_basemap(path: &Path) -> Result<Layer> {
    let content = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;
    let layer = parse_basemap(&value)?;

    info!(
        file_path = %path.display(),
        geometries = layer.geometries.len(),
        coords = layer.coord_count(),
        "Basemap loaded"
    );

    Ok(layer)
}

/// Collect geometries from a FeatureCollection, Feature, GeometryCollection
/// or bare geometry
pub fn parse_basemap(value: &Value) -> Result<Layer> {
    let mut geometries = Vec::new();
    collect_geometries(value, &mut geometries)?;

    if geometries.is_empty() {
        return Err(MapError::DataNotFound {
            message: "Basemap contains no geometries".to_string(),
        });
    }

    Ok(Layer::new(LayerKind::Countries, "countries", geometries))
}

fn collect_geometries(value: &Value, out: &mut Vec<Geometry>) -> Result<()> {
    match value.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {
            let features = value
                .get("features")
                .and_then(Value::as_array)
                .ok_or_else(|| MapError::InvalidParameter {
                    param: "geojson".to_string(),
                    message: "FeatureCollection has no \"features\" array".to_string(),
                })?;
            for feature in features {
                collect_geometries(feature, out)?;
            }
            Ok(())
        }
        Some("Feature") => match value.get("geometry") {
            Some(Value::Null) | None => {
                debug!("Skipping feature without geometry");
                Ok(())
            }
            Some(geometry) => collect_geometries(geometry, out),
        },
        Some("GeometryCollection") => {
            for geometry in value
                .get("geometries")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
            {
                collect_geometries(geometry, out)?;
            }
            Ok(())
        }
        _ => {
            out.push(geometry_from_geojson(value)?);
            Ok(())
        }
    }
}
