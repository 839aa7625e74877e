//! Graticule lines, the map outline and graticule labels.
//!
//! Everything here is generated in geographic coordinates and densified so
//! the curvature of the projected lines survives. Lines, outline and labels
//! are laid out around the central meridian `lon_0`; the map edges sit at
//! `lon_0 - 180` and `lon_0 + 180`, kept unwrapped so the two edges stay
//! distinct.

pub mod nudge;
pub mod shift;

pub use nudge::{apply_label_nudge, apply_label_nudge_about, nudge_sign};
pub use shift::{
    apply_longitude_shift, apply_longitude_shift_about, compute_longitude_shift,
    meridian_offsets, mirror_shift_sequence, ShiftTable,
};

use serde::{Deserialize, Serialize};

use crate::error::{MapError, Result};
use crate::geo::{wrap_longitude, Coord, Geometry, Layer, LayerKind, LineString, Polygon};
use crate::projection::{project_coord, Projector};

/// Which kind of graticule value a label annotates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// A meridian value, placed on the top and bottom pole lines
    Longitude,
    /// A parallel value, placed on the left and right map edges
    Latitude,
}

/// A tick label at a graticule position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraticuleLabel {
    pub axis: Axis,
    /// The graticule value in degrees
    pub value: f64,
    /// Placement longitude; edge labels carry the unwrapped edge longitude
    pub lon: f64,
    pub lat: f64,
    pub text: String,
}

impl GraticuleLabel {
    /// Create a label whose text is derived from `value`
    pub fn new(axis: Axis, value: f64, lon: f64, lat: f64) -> Self {
        Self {
            axis,
            value,
            lon,
            lat,
            text: format_degrees(axis, value),
        }
    }
}

/// A label with its planar position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedLabel {
    pub label: GraticuleLabel,
    pub x: f64,
    pub y: f64,
}

/// Graticule spacing and sampling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraticuleSpec {
    /// Meridian spacing in degrees
    pub lon_step: f64,
    /// Parallel spacing in degrees
    pub lat_step: f64,
    /// Sampling interval along each line in degrees
    pub resolution: f64,
    /// Central meridian the layout is built around
    #[serde(default)]
    pub lon_0: f64,
}

impl Default for GraticuleSpec {
    fn default() -> Self {
        Self {
            lon_step: 20.0,
            lat_step: 10.0,
            resolution: 1.0,
            lon_0: 0.0,
        }
    }
}

impl GraticuleSpec {
    pub fn validate(&self) -> Result<()> {
        check_step("lon_step", self.lon_step, 180.0)?;
        check_step("lat_step", self.lat_step, 90.0)?;
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(MapError::InvalidParameter {
                param: "resolution".to_string(),
                message: format!("must be a positive number, got {}", self.resolution),
            });
        }
        if !crate::geo::LON_RANGE.contains(&self.lon_0) {
            return Err(MapError::InvalidParameter {
                param: "lon_0".to_string(),
                message: format!("must lie in [-180, 180], got {}", self.lon_0),
            });
        }
        Ok(())
    }

    /// The same spacing laid out around another central meridian
    pub fn centred_on(self, lon_0: f64) -> Self {
        Self { lon_0, ..self }
    }

    /// Meridian longitudes from edge to edge inclusive, unwrapped
    pub fn meridians(&self) -> Vec<f64> {
        steps(self.west_edge(), self.east_edge(), self.lon_step)
    }

    /// Longitude of the left map edge
    pub fn west_edge(&self) -> f64 {
        self.lon_0 - 180.0
    }

    /// Longitude of the right map edge
    pub fn east_edge(&self) -> f64 {
        self.lon_0 + 180.0
    }

    /// Parallel values strictly between the poles
    pub fn parallels(&self) -> Vec<f64> {
        steps(-90.0 + self.lat_step, 90.0 - self.lat_step, self.lat_step)
    }
}

fn check_step(param: &str, step: f64, span: f64) -> Result<()> {
    let count = span / step;
    if !(step.is_finite() && step > 0.0) || (count - count.round()).abs() > 1e-9 {
        return Err(MapError::InvalidParameter {
            param: param.to_string(),
            message: format!("must be a positive divisor of {}, got {}", span, step),
        });
    }
    Ok(())
}

/// Evenly spaced values from `start` to `end` inclusive, free of drift
fn steps(start: f64, end: f64, step: f64) -> Vec<f64> {
    if end < start {
        return Vec::new();
    }
    let n = ((end - start) / step).round() as usize;
    (0..=n).map(|i| start + step * i as f64).collect()
}

/// Sample `from..=to` at roughly `resolution`, always hitting both ends
fn densify(from: f64, to: f64, resolution: f64) -> Vec<f64> {
    let n = ((to - from).abs() / resolution).ceil().max(1.0) as usize;
    (0..=n)
        .map(|i| from + (to - from) * i as f64 / n as f64)
        .collect()
}

/// Meridian and parallel lines as a graticule layer
pub fn graticule_lines(spec: &GraticuleSpec) -> Layer {
    let mut geometries = Vec::new();

    for lon in spec.meridians() {
        let line: Vec<Coord> = densify(-90.0, 90.0, spec.resolution)
            .into_iter()
            .map(|lat| Coord { x: lon, y: lat })
            .collect();
        geometries.push(Geometry::LineString(LineString::from(line)));
    }

    for lat in spec.parallels() {
        let line: Vec<Coord> = densify(spec.west_edge(), spec.east_edge(), spec.resolution)
            .into_iter()
            .map(|lon| Coord { x: lon, y: lat })
            .collect();
        geometries.push(Geometry::LineString(LineString::from(line)));
    }

    Layer::new(LayerKind::Graticule, "graticule", geometries)
}

/// Closed outline of the whole globe, edge meridians at `lon_0 ± 180`
pub fn bounding_box(spec: &GraticuleSpec) -> Layer {
    let (west, east, resolution) = (spec.west_edge(), spec.east_edge(), spec.resolution);
    let at = |x: f64, y: f64| Coord { x, y };
    let mut ring: Vec<Coord> = Vec::new();

    ring.extend(densify(-90.0, 90.0, resolution).into_iter().map(|lat| at(west, lat)));
    ring.extend(densify(west, east, resolution).into_iter().skip(1).map(|lon| at(lon, 90.0)));
    ring.extend(densify(90.0, -90.0, resolution).into_iter().skip(1).map(|lat| at(east, lat)));
    ring.extend(densify(east, west, resolution).into_iter().skip(1).map(|lon| at(lon, -90.0)));

    let outline = Polygon::new(LineString::from(ring), vec![]);
    Layer::new(LayerKind::BoundingBox, "bounding_box", vec![Geometry::Polygon(outline)])
}

/// Tick labels for every interior meridian and parallel.
///
/// Meridian labels appear twice per value, once on each pole line;
/// parallel labels appear twice per value, once on each map edge.
/// Meridian values are the wrapped longitudes `lon_0 + k * lon_step`.
pub fn graticule_labels(spec: &GraticuleSpec) -> Vec<GraticuleLabel> {
    let mut labels = Vec::new();

    for offset in steps(-180.0 + spec.lon_step, 180.0 - spec.lon_step, spec.lon_step) {
        let lon = wrap_longitude(spec.lon_0 + offset);
        labels.push(GraticuleLabel::new(Axis::Longitude, lon, lon, 90.0));
        labels.push(GraticuleLabel::new(Axis::Longitude, lon, lon, -90.0));
    }

    for lat in spec.parallels() {
        labels.push(GraticuleLabel::new(Axis::Latitude, lat, spec.west_edge(), lat));
        labels.push(GraticuleLabel::new(Axis::Latitude, lat, spec.east_edge(), lat));
    }

    labels
}

/// Project labels at their (possibly shifted) geographic positions
pub fn project_labels(
    labels: &[GraticuleLabel],
    projector: &dyn Projector,
) -> Result<Vec<ProjectedLabel>> {
    labels
        .iter()
        .map(|label| {
            let Coord { x, y } = project_coord(
                projector,
                Coord {
                    x: label.lon,
                    y: label.lat,
                },
            )?;
            Ok(ProjectedLabel {
                label: label.clone(),
                x,
                y,
            })
        })
        .collect()
}

/// Label text such as `160°E`, `20°W`, `40°N` or `0°`
pub fn format_degrees(axis: Axis, value: f64) -> String {
    let magnitude = value.abs();
    let number = if magnitude.fract() == 0.0 {
        format!("{:.0}", magnitude)
    } else {
        format!("{}", magnitude)
    };

    let hemisphere = match axis {
        _ if value == 0.0 => "",
        Axis::Longitude if value > 0.0 => "E",
        Axis::Longitude => "W",
        Axis::Latitude if value > 0.0 => "N",
        Axis::Latitude => "S",
    };

    format!("{}°{}", number, hemisphere)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::geometry::GeometryExt;
    use crate::projection::Robinson;

    #[test]
    fn test_format_degrees() {
        assert_eq!(format_degrees(Axis::Longitude, 160.0), "160°E");
        assert_eq!(format_degrees(Axis::Longitude, -20.0), "20°W");
        assert_eq!(format_degrees(Axis::Longitude, 0.0), "0°");
        assert_eq!(format_degrees(Axis::Latitude, 40.0), "40°N");
        assert_eq!(format_degrees(Axis::Latitude, -30.0), "30°S");
        assert_eq!(format_degrees(Axis::Latitude, 22.5), "22.5°N");
    }

    #[test]
    fn test_spec_values() {
        let spec = GraticuleSpec::default();
        let meridians = spec.meridians();
        assert_eq!(meridians.len(), 19);
        assert_eq!(meridians[0], -180.0);
        assert_eq!(meridians[18], 180.0);

        let parallels = spec.parallels();
        assert_eq!(parallels.len(), 17);
        assert_eq!(parallels[0], -80.0);
        assert_eq!(parallels[16], 80.0);
    }

    #[test]
    fn test_spec_validation() {
        assert!(GraticuleSpec::default().validate().is_ok());
        let bad = GraticuleSpec {
            lon_step: 25.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let bad = GraticuleSpec {
            lat_step: 0.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let bad = GraticuleSpec {
            resolution: -1.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        assert!(GraticuleSpec::default().centred_on(200.0).validate().is_err());
    }

    #[test]
    fn test_graticule_lines() {
        let layer = graticule_lines(&GraticuleSpec::default());
        assert_eq!(layer.kind, LayerKind::Graticule);
        assert_eq!(layer.geometries.len(), 19 + 17);

        // Meridians are sampled every degree from pole to pole
        match &layer.geometries[0] {
            Geometry::LineString(line) => {
                assert_eq!(line.0.len(), 181);
                assert_eq!(line.0[0], Coord { x: -180.0, y: -90.0 });
                assert_eq!(line.0[180], Coord { x: -180.0, y: 90.0 });
            }
            other => panic!("expected a line string, got {:?}", other),
        }
    }

    #[test]
    fn test_bounding_box_is_closed() {
        let layer = bounding_box(&GraticuleSpec::default());
        let polygons = layer.geometries[0].polygons();
        let ring = &polygons[0].exterior().0;
        assert_eq!(ring.first(), ring.last());
        assert_eq!(ring.len(), 181 + 360 + 180 + 360);
        assert!(ring.contains(&Coord { x: 180.0, y: 90.0 }));
        assert!(ring.contains(&Coord { x: -180.0, y: -90.0 }));
    }

    #[test]
    fn test_layout_follows_central_meridian() {
        let spec = GraticuleSpec::default().centred_on(150.0);

        let meridians = spec.meridians();
        assert_eq!(meridians.first(), Some(&-30.0));
        assert_eq!(meridians.last(), Some(&330.0));

        let outline = bounding_box(&spec);
        let ring = &outline.geometries[0].polygons()[0].exterior().0;
        assert!(ring.contains(&Coord { x: -30.0, y: 0.0 }));
        assert!(ring.contains(&Coord { x: 330.0, y: 0.0 }));

        let labels = graticule_labels(&spec);
        let edges: Vec<f64> = labels
            .iter()
            .filter(|l| l.axis == Axis::Latitude && l.value == 40.0)
            .map(|l| l.lon)
            .collect();
        assert_eq!(edges, vec![-30.0, 330.0]);

        // Meridian values step away from lon_0 and wrap into [-180, 180]
        let values: Vec<f64> = labels
            .iter()
            .filter(|l| l.axis == Axis::Longitude && l.lat == 90.0)
            .map(|l| l.value)
            .collect();
        assert_eq!(values.len(), 17);
        assert_eq!(values[0], -10.0);
        assert_eq!(values[8], 150.0);
        assert_eq!(values[9], 170.0);
        assert_eq!(values[10], -170.0);
        assert_eq!(values[16], -50.0);
    }

    #[test]
    fn test_graticule_labels() {
        let labels = graticule_labels(&GraticuleSpec::default());
        let meridian: Vec<_> = labels.iter().filter(|l| l.axis == Axis::Longitude).collect();
        let parallel: Vec<_> = labels.iter().filter(|l| l.axis == Axis::Latitude).collect();

        // -160 ... 160 on both pole lines, -80 ... 80 on both edges
        assert_eq!(meridian.len(), 17 * 2);
        assert_eq!(parallel.len(), 17 * 2);

        assert!(meridian.iter().all(|l| l.lat.abs() == 90.0 && l.lon == l.value));
        assert!(parallel.iter().all(|l| l.lon.abs() == 180.0 && l.lat == l.value));
        assert_eq!(meridian[0].text, "160°W");
    }

    #[test]
    fn test_project_labels() {
        let labels = vec![GraticuleLabel::new(Axis::Latitude, 0.0, 0.0, 0.0)];
        let projected = project_labels(&labels, &Robinson::new()).unwrap();
        assert_eq!(projected[0].x, 0.0);
        assert_eq!(projected[0].y, 0.0);
        assert_eq!(projected[0].label, labels[0]);
    }
}
