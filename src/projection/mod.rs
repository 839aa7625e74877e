//! Forward and inverse map projections.
//!
//! The pipeline only ever talks to the [`Projector`] trait; concrete
//! projections are resolved from a PROJ-style string by [`get_projector`].

pub mod robinson;
pub mod spec;

pub use robinson::Robinson;
pub use spec::ProjSpec;

use serde::{Deserialize, Serialize};

use crate::error::{MapError, Result};
use crate::geo::{wrap_longitude, Coord, GeoPoint, ProjectedPoint};

/// Projection used when nothing else is configured
pub const DEFAULT_PROJECTION: &str = "+proj=robin +lon_0=0 +x_0=0 +y_0=0 +datum=WGS84 +units=m +no_defs";

/// Trait for map projections
pub trait Projector: Send + Sync {
    /// Project geographic `(lon, lat)` degrees to planar `(x, y)`
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64)>;

    /// Recover geographic `(lon, lat)` degrees from planar `(x, y)`
    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)>;

    /// Central meridian in degrees
    fn central_meridian(&self) -> f64 {
        0.0
    }

    /// Get the name of this projection
    fn name(&self) -> &str;
}

/// Plate carrée passthrough: planar units are degrees
#[derive(Debug, Clone, Default)]
pub struct LonLat;

impl Projector for LonLat {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        if !lon.is_finite() || !lat.is_finite() {
            return Err(MapError::projection(format!(
                "non-finite input ({}, {})",
                lon, lat
            )));
        }
        Ok((lon, lat))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        self.forward(x, y)
    }

    fn name(&self) -> &str {
        "longlat"
    }
}

/// Resolve a projection string to a projector
pub fn get_projector(projection_spec: &str) -> Result<Box<dyn Projector>> {
    let spec = ProjSpec::parse(projection_spec)?;
    match spec.proj.as_str() {
        "robin" => Ok(Box::new(Robinson::from_spec(&spec))),
        "longlat" => Ok(Box::new(LonLat)),
        other => Err(MapError::projection(format!(
            "unsupported projection: {}",
            other
        ))),
    }
}

/// Planar magnitude used to push labels away from the map edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NudgeOffset {
    pub x: f64,
    pub y: f64,
}

/// Project a geographic point, rejecting non-finite input or output
pub fn project_coord(projector: &dyn Projector, coord: Coord) -> Result<Coord> {
    let (lon, lat) = coord.x_y();
    if !lon.is_finite() || !lat.is_finite() {
        return Err(MapError::projection(format!(
            "cannot project non-finite coordinate ({}, {})",
            lon, lat
        )));
    }

    let (x, y) = projector.forward(lon, lat)?;
    if !x.is_finite() || !y.is_finite() {
        return Err(MapError::projection(format!(
            "{} returned non-finite output for ({}, {})",
            projector.name(),
            lon,
            lat
        )));
    }
    Ok(Coord { x, y })
}

/// Project points with an already-resolved projector.
///
/// The output keeps input order and ids. The first failure aborts the
/// whole call; rows are never dropped.
pub fn project_points_with(
    points: &[GeoPoint],
    projector: &dyn Projector,
) -> Result<Vec<ProjectedPoint>> {
    points
        .iter()
        .map(|point| {
            let Coord { x, y } = project_coord(projector, point.coord()).map_err(|e| {
                MapError::projection(format!("point {}: {}", point.id, e))
            })?;
            Ok(ProjectedPoint {
                id: point.id.clone(),
                x,
                y,
            })
        })
        .collect()
}

/// Project points with the projection described by `projection_spec`
pub fn project_points(points: &[GeoPoint], projection_spec: &str) -> Result<Vec<ProjectedPoint>> {
    let projector = get_projector(projection_spec)?;
    project_points_with(points, projector.as_ref())
}

/// Planar size of a small geographic offset.
///
/// The offset is measured from the projection's own origin so that the
/// central meridian and false easting/northing do not leak into it.
pub fn project_offset(projector: &dyn Projector, dlon: f64, dlat: f64) -> Result<NudgeOffset> {
    let lon_0 = projector.central_meridian();
    let origin = project_coord(projector, Coord { x: lon_0, y: 0.0 })?;
    let offset = project_coord(
        projector,
        Coord {
            x: wrap_longitude(lon_0 + dlon),
            y: dlat,
        },
    )?;
    Ok(NudgeOffset {
        x: offset.x - origin.x,
        y: offset.y - origin.y,
    })
}
