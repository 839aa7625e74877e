//! Map composition and output.
//!
//! A [`Scene`] gathers the projected layers, sites and labels; the SVG and
//! PNG writers draw it through a shared [`Viewport`].

pub mod raster;
pub mod style;
pub mod svg;
pub mod text;

pub use raster::{encode_png, render_png};
pub use style::{parse_hex_colour, Style};
pub use svg::render_svg;

use crate::geo::{GeometryExt, Layer, LayerKind, ProjectedPoint};
use crate::graticule::{Axis, ProjectedLabel};

/// Fraction of the shorter canvas side kept free around the map
const MARGIN_FRACTION: f64 = 0.05;

/// Everything drawn on the map, in planar coordinates
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub layers: Vec<Layer>,
    pub sites: Vec<ProjectedPoint>,
    pub labels: Vec<ProjectedLabel>,
}

impl Scene {
    /// First layer of the given kind
    pub fn layer(&self, kind: LayerKind) -> Option<&Layer> {
        self.layers.iter().find(|l| l.kind == kind)
    }

    /// Planar bounds of all layers, sites and labels
    pub fn extent(&self) -> Option<Extent> {
        let mut extent: Option<Extent> = None;
        let mut include = |x: f64, y: f64| match extent.as_mut() {
            Some(e) => e.include(x, y),
            None => extent = Some(Extent::point(x, y)),
        };

        for layer in &self.layers {
            for geometry in &layer.geometries {
                geometry.for_each_coord(&mut |c| include(c.x, c.y));
            }
        }
        self.sites.iter().for_each(|p| include(p.x, p.y));
        self.labels.iter().for_each(|l| include(l.x, l.y));

        extent
    }
}

/// An axis-aligned planar rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    pub fn point(x: f64, y: f64) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    pub fn include(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Maps planar coordinates onto a pixel canvas, preserving aspect ratio
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    /// Pixels per inch, used to convert point sizes
    pub dpi: f64,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
    extent: Extent,
}

impl Viewport {
    /// Fit `extent` into a `width` x `height` canvas, centred, with a margin
    pub fn fit(extent: Extent, width: u32, height: u32, dpi: f64) -> Self {
        let margin = MARGIN_FRACTION * width.min(height) as f64;
        let avail_w = (width as f64 - 2.0 * margin).max(1.0);
        let avail_h = (height as f64 - 2.0 * margin).max(1.0);

        let scale_x = if extent.width() > 0.0 {
            avail_w / extent.width()
        } else {
            f64::INFINITY
        };
        let scale_y = if extent.height() > 0.0 {
            avail_h / extent.height()
        } else {
            f64::INFINITY
        };
        let mut scale = scale_x.min(scale_y);
        if !scale.is_finite() {
            scale = 1.0;
        }

        Self {
            width,
            height,
            dpi,
            scale,
            offset_x: (width as f64 - extent.width() * scale) / 2.0,
            offset_y: (height as f64 - extent.height() * scale) / 2.0,
            extent,
        }
    }

    /// Planar to pixel coordinates, with `y` growing downward
    pub fn to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.offset_x + (x - self.extent.min_x) * self.scale,
            self.offset_y + (self.extent.max_y - y) * self.scale,
        )
    }

    /// Convert a size in points to pixels
    pub fn points(&self, pt: f64) -> f64 {
        pt * self.dpi / 72.0
    }
}

/// Horizontal placement of label text around its anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Start,
    Middle,
    End,
}

/// Vertical placement of label text around its anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    /// Text hangs below the anchor
    Top,
    Middle,
    /// Text sits on the anchor
    Baseline,
}

/// Where label text goes relative to its projected position.
///
/// Meridian labels hang below the south pole line and sit above the north
/// one. Parallel labels grow away from the map on whichever side of the
/// canvas they land, which keeps them outside the outline for any central
/// meridian.
pub fn label_alignment(label: &ProjectedLabel, viewport: &Viewport) -> (HAlign, VAlign) {
    match label.label.axis {
        Axis::Longitude if label.label.lat < 0.0 => (HAlign::Middle, VAlign::Top),
        Axis::Longitude => (HAlign::Middle, VAlign::Baseline),
        Axis::Latitude => {
            let (px, _) = viewport.to_pixel(label.x, label.y);
            if px < viewport.width as f64 / 2.0 {
                (HAlign::End, VAlign::Middle)
            } else {
                (HAlign::Start, VAlign::Middle)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{Geometry, LineString};

    #[test]
    fn test_scene_extent() {
        let scene = Scene {
            layers: vec![Layer::new(
                LayerKind::Graticule,
                "g",
                vec![Geometry::LineString(LineString::from(vec![(-10.0, -5.0), (10.0, 5.0)]))],
            )],
            sites: vec![ProjectedPoint {
                id: "a".to_string(),
                x: 20.0,
                y: 0.0,
            }],
            labels: Vec::new(),
        };
        let extent = scene.extent().unwrap();
        assert_eq!(extent.min_x, -10.0);
        assert_eq!(extent.max_x, 20.0);
        assert_eq!(extent.min_y, -5.0);
        assert_eq!(extent.max_y, 5.0);

        assert!(Scene::default().extent().is_none());
    }

    #[test]
    fn test_viewport_centres_and_flips() {
        let extent = Extent {
            min_x: -100.0,
            min_y: -50.0,
            max_x: 100.0,
            max_y: 50.0,
        };
        let viewport = Viewport::fit(extent, 220, 120, 72.0);

        // Centre maps to centre
        let (cx, cy) = viewport.to_pixel(0.0, 0.0);
        assert!((cx - 110.0).abs() < 1e-9);
        assert!((cy - 60.0).abs() < 1e-9);

        // North is up
        let (_, top) = viewport.to_pixel(0.0, 50.0);
        let (_, bottom) = viewport.to_pixel(0.0, -50.0);
        assert!(top < bottom);

        // The map stays inside the canvas
        let (left, _) = viewport.to_pixel(-100.0, 0.0);
        let (right, _) = viewport.to_pixel(100.0, 0.0);
        assert!(left >= 0.0 && right <= 220.0);

        assert_eq!(viewport.points(72.0), 72.0);
    }

    #[test]
    fn test_label_alignment_follows_canvas_side() {
        use crate::graticule::GraticuleLabel;

        let extent = Extent {
            min_x: -100.0,
            min_y: -50.0,
            max_x: 100.0,
            max_y: 50.0,
        };
        let viewport = Viewport::fit(extent, 200, 100, 72.0);
        let at = |axis, lon: f64, lat: f64, x: f64| ProjectedLabel {
            label: GraticuleLabel::new(axis, lat, lon, lat),
            x,
            y: 0.0,
        };

        // An unwrapped edge longitude still lands on the right
        let right = at(Axis::Latitude, 330.0, 10.0, 100.0);
        assert_eq!(label_alignment(&right, &viewport), (HAlign::Start, VAlign::Middle));
        let left = at(Axis::Latitude, -30.0, 10.0, -100.0);
        assert_eq!(label_alignment(&left, &viewport), (HAlign::End, VAlign::Middle));

        let south = at(Axis::Longitude, 20.0, -90.0, 10.0);
        assert_eq!(label_alignment(&south, &viewport), (HAlign::Middle, VAlign::Top));
        let north = at(Axis::Longitude, 20.0, 90.0, 10.0);
        assert_eq!(label_alignment(&north, &viewport).1, VAlign::Baseline);
    }
}
