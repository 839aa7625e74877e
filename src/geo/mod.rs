//! Geographic point types and coordinate validation.
//!
//! Study sites arrive as text from a tabular source; this module turns the
//! raw cells into validated [`GeoPoint`]s and defines the planar
//! [`ProjectedPoint`] they become after projection.

pub mod geometry;

pub use geo_types::{Coord, Geometry, LineString, MultiPolygon, Polygon};
pub use geometry::{geometry_from_geojson, GeometryExt, Layer, LayerKind};

use serde::{Deserialize, Serialize};

use crate::error::{MapError, Result};

/// Cell values treated as missing (compared case-insensitively after trimming)
pub const MISSING_SENTINELS: &[&str] = &["na", "n/a", "null", ""];

/// Valid longitude range in degrees
pub const LON_RANGE: std::ops::RangeInclusive<f64> = -180.0..=180.0;

/// Valid latitude range in degrees
pub const LAT_RANGE: std::ops::RangeInclusive<f64> = -90.0..=90.0;

/// A geographic observation in degrees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Opaque identifier copied from the source row
    pub id: String,
    /// Longitude in degrees east
    pub lon: f64,
    /// Latitude in degrees north
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(id: impl Into<String>, lon: f64, lat: f64) -> Self {
        Self {
            id: id.into(),
            lon,
            lat,
        }
    }

    /// The point as an `x = lon, y = lat` coordinate
    pub fn coord(&self) -> Coord {
        Coord {
            x: self.lon,
            y: self.lat,
        }
    }

    /// Check the point lies inside the geographic domain.
    ///
    /// Out-of-range values are rejected, never clamped.
    pub fn validate(&self) -> Result<()> {
        if !LON_RANGE.contains(&self.lon) {
            return Err(MapError::validation(format!(
                "point {}: longitude {} is outside [-180, 180]",
                self.id, self.lon
            )));
        }
        if !LAT_RANGE.contains(&self.lat) {
            return Err(MapError::validation(format!(
                "point {}: latitude {} is outside [-90, 90]",
                self.id, self.lat
            )));
        }
        Ok(())
    }
}

/// A point in projected planar units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPoint {
    /// Identifier of the [`GeoPoint`] this was projected from
    pub id: String,
    pub x: f64,
    pub y: f64,
}

/// Validate every point, failing on the first out-of-range coordinate
pub fn validate_points(points: &[GeoPoint]) -> Result<()> {
    points.iter().try_for_each(GeoPoint::validate)
}

/// Parse a raw table cell into a coordinate value.
///
/// Returns `None` for missing sentinels and for anything that is not a
/// finite number. Missing values are never coerced to zero.
pub fn parse_coordinate(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if is_missing(trimmed) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Whether a raw cell is one of the missing-value sentinels
pub fn is_missing(raw: &str) -> bool {
    let trimmed = raw.trim();
    MISSING_SENTINELS
        .iter()
        .any(|sentinel| trimmed.eq_ignore_ascii_case(sentinel))
}

/// Bring a longitude into [-180, 180].
///
/// Values already in range are returned untouched so that the ±180 map
/// edges keep their sign.
pub fn wrap_longitude(lon: f64) -> f64 {
    if LON_RANGE.contains(&lon) {
        return lon;
    }
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_point() {
        assert!(GeoPoint::new("a", 0.0, 0.0).validate().is_ok());
        assert!(GeoPoint::new("a", 180.0, 90.0).validate().is_ok());
        assert!(GeoPoint::new("a", -180.0, -90.0).validate().is_ok());

        let err = GeoPoint::new("a", 200.0, 0.0).validate().unwrap_err();
        assert!(matches!(err, MapError::Validation { .. }));
        assert!(GeoPoint::new("a", 0.0, -90.5).validate().is_err());
        assert!(GeoPoint::new("a", f64::NAN, 0.0).validate().is_err());
    }

    #[test]
    fn test_validate_points_reports_offender() {
        let points = vec![
            GeoPoint::new("ok", 10.0, 10.0),
            GeoPoint::new("bad", 10.0, 95.0),
        ];
        let err = validate_points(&points).unwrap_err();
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate("12.5"), Some(12.5));
        assert_eq!(parse_coordinate("  -3 "), Some(-3.0));
        assert_eq!(parse_coordinate("NA"), None);
        assert_eq!(parse_coordinate("n/a"), None);
        assert_eq!(parse_coordinate("NULL"), None);
        assert_eq!(parse_coordinate(""), None);
        assert_eq!(parse_coordinate("   "), None);
        assert_eq!(parse_coordinate("abc"), None);
        assert_eq!(parse_coordinate("inf"), None);
        assert_eq!(parse_coordinate("NaN"), None);
    }

    #[test]
    fn test_wrap_longitude() {
        assert_eq!(wrap_longitude(0.0), 0.0);
        assert_eq!(wrap_longitude(180.0), 180.0);
        assert_eq!(wrap_longitude(-180.0), -180.0);
        assert_eq!(wrap_longitude(190.0), -170.0);
        assert_eq!(wrap_longitude(-190.0), 170.0);
        assert_eq!(wrap_longitude(370.0), 10.0);
    }
}
