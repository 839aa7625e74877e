//! Test data generation utilities.
//!
//! Writes small site tables and basemaps with known contents.

#![allow(dead_code)]

use serde_json::json;
use std::path::{Path, PathBuf};

/// Sites spread over both hemispheres, in a fixed order
pub const SITES_CSV: &str = "\
id,longitude,latitude
origin,0,0
lima,-77.04,-12.05
tromso,18.96,69.65
wellington,174.78,-41.29
";

/// Write `contents` as `name` inside `dir` and return the path
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// Write the standard site table
pub fn create_sites_csv(dir: &Path) -> PathBuf {
    write_file(dir, "sites.csv", SITES_CSV)
}

/// Write a basemap with two crude "countries", one of them with a hole
pub fn create_basemap_geojson(dir: &Path) -> PathBuf {
    let basemap = json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"name": "square"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [
                        [[-20, -20], [20, -20], [20, 20], [-20, 20], [-20, -20]],
                        [[-5, -5], [5, -5], [5, 5], [-5, 5], [-5, -5]]
                    ]
                }
            },
            {
                "type": "Feature",
                "properties": {"name": "islands"},
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[100, 10], [110, 10], [110, 20], [100, 10]]],
                        [[[-150, -60], [-140, -60], [-140, -50], [-150, -60]]]
                    ]
                }
            }
        ]
    });
    write_file(dir, "countries.geojson", &basemap.to_string())
}
