//! Parsing of PROJ-style projection strings.
//!
//! Only the parameters the built-in projections understand are accepted;
//! anything else is reported instead of silently ignored.

use crate::error::{MapError, Result};

/// WGS84 semi-major axis in metres
pub const WGS84_A: f64 = 6_378_137.0;

/// Radius of PROJ's `sphere` ellipsoid in metres
pub const SPHERE_R: f64 = 6_370_997.0;

/// Flags that carry no meaning for the built-in projections
const IGNORED_FLAGS: &[&str] = &["no_defs", "wktext", "type", "towgs84", "b", "rf", "f"];

/// A resolved projection definition
#[derive(Debug, Clone, PartialEq)]
pub struct ProjSpec {
    /// PROJ short name (`robin`, `longlat`)
    pub proj: String,
    /// Central meridian in degrees
    pub lon_0: f64,
    /// Sphere radius in metres
    pub radius: f64,
    /// False easting in metres
    pub x_0: f64,
    /// False northing in metres
    pub y_0: f64,
    /// Output units per metre
    pub to_units: f64,
}

impl ProjSpec {
    fn with_proj(proj: &str) -> Self {
        Self {
            proj: proj.to_string(),
            lon_0: 0.0,
            radius: WGS84_A,
            x_0: 0.0,
            y_0: 0.0,
            to_units: 1.0,
        }
    }

    /// Parse a projection string such as `+proj=robin +lon_0=0 +datum=WGS84`.
    ///
    /// The aliases `robinson`, `ESRI:54030` and `EPSG:4326` are accepted too.
    pub fn parse(spec: &str) -> Result<Self> {
        let trimmed = spec.trim();
        if trimmed.is_empty() {
            return Err(MapError::projection("empty projection specification"));
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "robinson" | "robin" | "esri:54030" => return Ok(Self::with_proj("robin")),
            "epsg:4326" | "longlat" | "lonlat" => return Ok(Self::with_proj("longlat")),
            _ => {}
        }

        let mut proj: Option<String> = None;
        let mut parsed = Self::with_proj("");
        let mut radius_set = false;

        for token in trimmed.split_whitespace() {
            let token = token.trim_start_matches('+');
            let (key, value) = match token.split_once('=') {
                Some((k, v)) => (k, Some(v)),
                None => (token, None),
            };

            match key {
                "proj" => proj = Some(require(key, value)?.to_string()),
                "lon_0" => parsed.lon_0 = number(key, value)?,
                "x_0" => parsed.x_0 = number(key, value)?,
                "y_0" => parsed.y_0 = number(key, value)?,
                "R" => {
                    parsed.radius = number(key, value)?;
                    radius_set = true;
                }
                "a" if !radius_set => parsed.radius = number(key, value)?,
                "a" => {}
                "ellps" | "datum" if !radius_set => {
                    parsed.radius = ellipsoid_radius(require(key, value)?)?;
                }
                "ellps" | "datum" => {}
                "units" => parsed.to_units = units_per_metre(require(key, value)?)?,
                flag if IGNORED_FLAGS.contains(&flag) => {}
                other => {
                    return Err(MapError::projection(format!(
                        "unsupported projection parameter '{}' in '{}'",
                        other, spec
                    )))
                }
            }
        }

        let proj = proj.ok_or_else(|| {
            MapError::projection(format!("no +proj parameter in '{}'", spec))
        })?;
        parsed.proj = match proj.as_str() {
            "latlong" | "lonlat" | "latlon" => "longlat".to_string(),
            _ => proj,
        };

        if !(parsed.radius.is_finite() && parsed.radius > 0.0) {
            return Err(MapError::projection(format!(
                "radius must be positive, got {}",
                parsed.radius
            )));
        }
        if !crate::geo::LON_RANGE.contains(&parsed.lon_0) {
            return Err(MapError::projection(format!(
                "lon_0 must be within [-180, 180], got {}",
                parsed.lon_0
            )));
        }

        Ok(parsed)
    }
}

fn require<'a>(key: &str, value: Option<&'a str>) -> Result<&'a str> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| MapError::projection(format!("parameter '{}' needs a value", key)))
}

fn number(key: &str, value: Option<&str>) -> Result<f64> {
    let raw = require(key, value)?;
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            MapError::projection(format!("parameter '{}' is not a number: {}", key, raw))
        })
}

fn ellipsoid_radius(name: &str) -> Result<f64> {
    match name {
        "WGS84" | "GRS80" | "NAD83" => Ok(WGS84_A),
        "sphere" => Ok(SPHERE_R),
        other => Err(MapError::projection(format!(
            "unknown ellipsoid or datum: {}",
            other
        ))),
    }
}

fn units_per_metre(name: &str) -> Result<f64> {
    match name {
        "m" => Ok(1.0),
        "km" => Ok(0.001),
        other => Err(MapError::projection(format!("unsupported units: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_robinson_string() {
        let spec =
            ProjSpec::parse("+proj=robin +lon_0=0 +x_0=0 +y_0=0 +datum=WGS84 +units=m +no_defs")
                .unwrap();
        assert_eq!(spec.proj, "robin");
        assert_eq!(spec.lon_0, 0.0);
        assert_eq!(spec.radius, WGS84_A);
        assert_eq!(spec.to_units, 1.0);
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(ProjSpec::parse("ESRI:54030").unwrap().proj, "robin");
        assert_eq!(ProjSpec::parse("robinson").unwrap().proj, "robin");
        assert_eq!(ProjSpec::parse("EPSG:4326").unwrap().proj, "longlat");
        assert_eq!(ProjSpec::parse("+proj=latlong").unwrap().proj, "longlat");
    }

    #[test]
    fn test_radius_precedence() {
        let spec = ProjSpec::parse("+proj=robin +R=1 +ellps=WGS84").unwrap();
        assert_eq!(spec.radius, 1.0);
        let spec = ProjSpec::parse("+proj=robin +ellps=sphere").unwrap();
        assert_eq!(spec.radius, SPHERE_R);
        let spec = ProjSpec::parse("+proj=robin +units=km +lon_0=150").unwrap();
        assert_eq!(spec.to_units, 0.001);
        assert_eq!(spec.lon_0, 150.0);
    }

    #[test]
    fn test_parse_errors() {
        assert!(ProjSpec::parse("").is_err());
        assert!(ProjSpec::parse("+lon_0=0").is_err());
        assert!(ProjSpec::parse("+proj=robin +lon_0=abc").is_err());
        assert!(ProjSpec::parse("+proj=robin +lon_0=200").is_err());
        assert!(ProjSpec::parse("+proj=robin +units=ft").is_err());
        assert!(ProjSpec::parse("+proj=robin +ellps=bessel").is_err());
        assert!(ProjSpec::parse("+proj=robin +R=-5").is_err());
        assert!(ProjSpec::parse("+proj=robin +zone=33").is_err());
    }
}
