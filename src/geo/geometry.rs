//! Basemap geometries and layers.
//!
//! Geometries are [`geo_types`] values. The same types carry geographic
//! `(lon, lat)` input and projected `(x, y)` output, so projecting a layer
//! is a coordinate map that keeps every ring and part in place.

use geo_types::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{MapError, Result};

/// Coordinate walks the renderers and the pipeline need from a geometry
pub trait GeometryExt {
    /// Build a new geometry of the same shape by transforming every coordinate.
    ///
    /// `Line`, `Rect` and `Triangle` come back as a `LineString` or `Polygon`,
    /// since their shape does not survive a projection.
    fn try_map_coords<F>(&self, f: &mut F) -> Result<Geometry>
    where
        F: FnMut(Coord) -> Result<Coord>;

    /// Visit every coordinate in storage order
    fn for_each_coord<F: FnMut(Coord)>(&self, f: &mut F);

    /// Total number of coordinates
    fn coord_count(&self) -> usize {
        let mut count = 0;
        self.for_each_coord(&mut |_| count += 1);
        count
    }

    /// Polylines to stroke: line strings as-is, polygon rings closed
    fn paths(&self) -> Vec<&LineString>;

    /// Polygons to fill
    fn polygons(&self) -> Vec<&Polygon>;
}

impl GeometryExt for Geometry {
    fn try_map_coords<F>(&self, f: &mut F) -> Result<Geometry>
    where
        F: FnMut(Coord) -> Result<Coord>,
    {
        Ok(match self {
            Geometry::Point(p) => Geometry::Point(Point(f(p.0)?)),
            Geometry::Line(line) => {
                Geometry::LineString(LineString::from(vec![f(line.start)?, f(line.end)?]))
            }
            Geometry::LineString(ls) => Geometry::LineString(map_line(ls, f)?),
            Geometry::Polygon(p) => Geometry::Polygon(map_polygon(p, f)?),
            Geometry::MultiPoint(mp) => Geometry::MultiPoint(MultiPoint(
                mp.0.iter()
                    .map(|p| Ok(Point(f(p.0)?)))
                    .collect::<Result<_>>()?,
            )),
            Geometry::MultiLineString(mls) => Geometry::MultiLineString(MultiLineString(
                mls.0.iter().map(|ls| map_line(ls, f)).collect::<Result<_>>()?,
            )),
            Geometry::MultiPolygon(mp) => Geometry::MultiPolygon(MultiPolygon(
                mp.0.iter().map(|p| map_polygon(p, f)).collect::<Result<_>>()?,
            )),
            Geometry::GeometryCollection(gc) => Geometry::GeometryCollection(GeometryCollection(
                gc.0.iter().map(|g| g.try_map_coords(f)).collect::<Result<_>>()?,
            )),
            Geometry::Rect(rect) => Geometry::Polygon(map_polygon(&rect.to_polygon(), f)?),
            Geometry::Triangle(tri) => Geometry::Polygon(map_polygon(&tri.to_polygon(), f)?),
        })
    }

    fn for_each_coord<F: FnMut(Coord)>(&self, f: &mut F) {
        match self {
            Geometry::Point(p) => f(p.0),
            Geometry::Line(line) => {
                f(line.start);
                f(line.end);
            }
            Geometry::LineString(ls) => ls.0.iter().for_each(|&c| f(c)),
            Geometry::Polygon(p) => polygon_rings(p)
                .flat_map(|ring| ring.0.iter())
                .for_each(|&c| f(c)),
            Geometry::MultiPoint(mp) => mp.0.iter().for_each(|p| f(p.0)),
            Geometry::MultiLineString(mls) => mls
                .0
                .iter()
                .flat_map(|ls| ls.0.iter())
                .for_each(|&c| f(c)),
            Geometry::MultiPolygon(mp) => mp
                .0
                .iter()
                .flat_map(polygon_rings)
                .flat_map(|ring| ring.0.iter())
                .for_each(|&c| f(c)),
            Geometry::GeometryCollection(gc) => gc.0.iter().for_each(|g| g.for_each_coord(f)),
            Geometry::Rect(rect) => Geometry::Polygon(rect.to_polygon()).for_each_coord(f),
            Geometry::Triangle(tri) => Geometry::Polygon(tri.to_polygon()).for_each_coord(f),
        }
    }

    fn paths(&self) -> Vec<&LineString> {
        match self {
            Geometry::LineString(ls) => vec![ls],
            Geometry::MultiLineString(mls) => mls.0.iter().collect(),
            Geometry::Polygon(p) => polygon_rings(p).collect(),
            Geometry::MultiPolygon(mp) => mp.0.iter().flat_map(polygon_rings).collect(),
            Geometry::GeometryCollection(gc) => gc.0.iter().flat_map(|g| g.paths()).collect(),
            // Projected layers never hold these; see `try_map_coords`
            _ => Vec::new(),
        }
    }

    fn polygons(&self) -> Vec<&Polygon> {
        match self {
            Geometry::Polygon(p) => vec![p],
            Geometry::MultiPolygon(mp) => mp.0.iter().collect(),
            Geometry::GeometryCollection(gc) => {
                gc.0.iter().flat_map(|g| g.polygons()).collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Exterior ring first, then holes
fn polygon_rings(polygon: &Polygon) -> impl Iterator<Item = &LineString> {
    std::iter::once(polygon.exterior()).chain(polygon.interiors().iter())
}

fn map_line<F>(line: &LineString, f: &mut F) -> Result<LineString>
where
    F: FnMut(Coord) -> Result<Coord>,
{
    let coords = line.0.iter().map(|&c| f(c)).collect::<Result<Vec<Coord>>>()?;
    Ok(LineString::from(coords))
}

fn map_polygon<F>(polygon: &Polygon, f: &mut F) -> Result<Polygon>
where
    F: FnMut(Coord) -> Result<Coord>,
{
    let exterior = map_line(polygon.exterior(), f)?;
    let interiors = polygon
        .interiors()
        .iter()
        .map(|ring| map_line(ring, f))
        .collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

/// Which part of the basemap a layer belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Countries,
    Graticule,
    BoundingBox,
}

/// A named collection of geometries drawn together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub kind: LayerKind,
    pub name: String,
    pub geometries: Vec<Geometry>,
}

impl Layer {
    pub fn new(kind: LayerKind, name: impl Into<String>, geometries: Vec<Geometry>) -> Self {
        Self {
            kind,
            name: name.into(),
            geometries,
        }
    }

    /// Transform every geometry, keeping kind and name
    pub fn try_map_coords<F>(&self, mut f: F) -> Result<Layer>
    where
        F: FnMut(Coord) -> Result<Coord>,
    {
        let geometries = self
            .geometries
            .iter()
            .map(|g| g.try_map_coords(&mut f))
            .collect::<Result<_>>()?;
        Ok(Layer::new(self.kind, self.name.clone(), geometries))
    }

    pub fn coord_count(&self) -> usize {
        self.geometries.iter().map(GeometryExt::coord_count).sum()
    }
}

/// Parse a GeoJSON geometry object
pub fn geometry_from_geojson(value: &Value) -> Result<Geometry> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid_geojson("geometry has no \"type\""))?;

    if kind == "GeometryCollection" {
        let members = value
            .get("geometries")
            .ok_or_else(|| invalid_geojson("GeometryCollection has no \"geometries\""))?;
        let geometries = as_array(members)?
            .iter()
            .map(geometry_from_geojson)
            .collect::<Result<_>>()?;
        return Ok(Geometry::GeometryCollection(GeometryCollection(geometries)));
    }

    let coords = value
        .get("coordinates")
        .ok_or_else(|| invalid_geojson(format!("{} has no \"coordinates\"", kind)))?;

    match kind {
        "Point" => Ok(Geometry::Point(Point(parse_position(coords)?))),
        "MultiPoint" => Ok(Geometry::MultiPoint(MultiPoint(
            as_array(coords)?
                .iter()
                .map(|p| parse_position(p).map(Point))
                .collect::<Result<_>>()?,
        ))),
        "LineString" => Ok(Geometry::LineString(parse_line(coords)?)),
        "MultiLineString" => Ok(Geometry::MultiLineString(MultiLineString(
            as_array(coords)?.iter().map(parse_line).collect::<Result<_>>()?,
        ))),
        "Polygon" => Ok(Geometry::Polygon(parse_polygon(coords)?)),
        "MultiPolygon" => Ok(Geometry::MultiPolygon(MultiPolygon(
            as_array(coords)?
                .iter()
                .map(parse_polygon)
                .collect::<Result<_>>()?,
        ))),
        other => Err(invalid_geojson(format!(
            "unsupported geometry type: {}",
            other
        ))),
    }
}

fn invalid_geojson(message: impl Into<String>) -> MapError {
    MapError::InvalidParameter {
        param: "geojson".to_string(),
        message: message.into(),
    }
}

fn as_array(value: &Value) -> Result<&Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| invalid_geojson(format!("expected an array, found {}", value)))
}

fn parse_position(value: &Value) -> Result<Coord> {
    let parts = as_array(value)?;
    if parts.len() < 2 {
        return Err(invalid_geojson(format!(
            "position needs at least two numbers, found {}",
            value
        )));
    }
    let number = |v: &Value| {
        v.as_f64()
            .ok_or_else(|| invalid_geojson(format!("position component is not a number: {}", v)))
    };
    Ok(Coord {
        x: number(&parts[0])?,
        y: number(&parts[1])?,
    })
}

fn parse_line(value: &Value) -> Result<LineString> {
    let coords = as_array(value)?
        .iter()
        .map(parse_position)
        .collect::<Result<Vec<Coord>>>()?;
    Ok(LineString::from(coords))
}

fn parse_polygon(value: &Value) -> Result<Polygon> {
    let mut rings = as_array(value)?
        .iter()
        .map(parse_line)
        .collect::<Result<Vec<_>>>()?
        .into_iter();
    let exterior = rings
        .next()
        .ok_or_else(|| invalid_geojson("polygon has no exterior ring"))?;
    Ok(Polygon::new(exterior, rings.collect()))
}
