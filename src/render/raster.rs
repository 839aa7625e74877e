//! PNG output.
//!
//! Layers are rasterised directly into an RGBA buffer: polygons with an
//! even-odd scanline fill, lines and sites as stamped discs, labels as
//! anti-aliased glyphs from the embedded font.

use ab_glyph::{Font, PxScale};
use image::{ImageBuffer, Rgba, RgbaImage};
use std::io::Cursor;
use tracing::debug;

use super::text::{draw_text, label_font};
use super::{label_alignment, parse_hex_colour, Scene, Style, Viewport};
use crate::error::Result;
use crate::geo::{GeometryExt, Layer, LayerKind, LineString};
use crate::graticule::ProjectedLabel;

/// A position on the canvas in pixels
type Pixel = (f64, f64);

/// Smallest stamp radius that always covers at least one pixel centre
const MIN_STAMP_RADIUS: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// Rasterise the scene at the viewport's pixel size
pub fn render_png(scene: &Scene, viewport: &Viewport, style: &Style) -> Result<RgbaImage> {
    let background = parse_hex_colour(&style.background)?;
    let mut img: RgbaImage = ImageBuffer::from_pixel(viewport.width, viewport.height, Rgba(background));

    let bbox = scene.layer(LayerKind::BoundingBox);

    if let Some(layer) = bbox {
        fill_layer(&mut img, viewport, layer, parse_hex_colour(&style.ocean_fill)?);
    }
    if let Some(layer) = scene.layer(LayerKind::Graticule) {
        let colour = parse_hex_colour(&style.graticule_stroke)?;
        stroke_layer(&mut img, viewport, layer, viewport.points(style.graticule_width), colour);
    }
    if let Some(layer) = scene.layer(LayerKind::Countries) {
        fill_layer(&mut img, viewport, layer, parse_hex_colour(&style.land_fill)?);
        let colour = parse_hex_colour(&style.land_stroke)?;
        stroke_layer(&mut img, viewport, layer, viewport.points(style.land_stroke_width), colour);
    }
    if let Some(layer) = bbox {
        let colour = parse_hex_colour(&style.bbox_stroke)?;
        stroke_layer(&mut img, viewport, layer, viewport.points(style.bbox_width), colour);
    }

    let site_fill = parse_hex_colour(&style.site_fill)?;
    let site_stroke = parse_hex_colour(&style.site_stroke)?;
    let radius = viewport.points(style.site_radius).max(MIN_STAMP_RADIUS);
    let outline = viewport.points(0.25);
    for site in &scene.sites {
        let (px, py) = viewport.to_pixel(site.x, site.y);
        fill_disc(&mut img, px, py, radius, site_stroke);
        fill_disc(&mut img, px, py, (radius - outline).max(MIN_STAMP_RADIUS), site_fill);
    }

    let font_px = viewport.points(style.font_size) as f32;
    if font_px > 0.0 && !scene.labels.is_empty() {
        let font = label_font()?;
        let colour = parse_hex_colour(&style.label_color)?;
        for label in &scene.labels {
            draw_label(&mut img, viewport, &font, PxScale::from(font_px), label, colour);
        }
    }

    debug!(
        width = viewport.width,
        height = viewport.height,
        sites = scene.sites.len(),
        labels = scene.labels.len(),
        "Rasterised scene"
    );

    Ok(img)
}

/// Encode an image as PNG bytes
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, image::ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

fn to_pixels(viewport: &Viewport, line: &LineString) -> Vec<Pixel> {
    line.0.iter().map(|c| viewport.to_pixel(c.x, c.y)).collect()
}

fn fill_layer(img: &mut RgbaImage, viewport: &Viewport, layer: &Layer, colour: [u8; 4]) {
    for geometry in &layer.geometries {
        for polygon in geometry.polygons() {
            let rings: Vec<Vec<Pixel>> = std::iter::once(polygon.exterior())
                .chain(polygon.interiors())
                .map(|ring| to_pixels(viewport, ring))
                .collect();
            fill_polygon(img, &rings, colour);
        }
    }
}

fn stroke_layer(img: &mut RgbaImage, viewport: &Viewport, layer: &Layer, width: f64, colour: [u8; 4]) {
    if width <= 0.0 {
        return;
    }
    for geometry in &layer.geometries {
        for path in geometry.paths() {
            stroke_path(img, &to_pixels(viewport, path), width, colour);
        }
    }
}

/// Even-odd fill sampled at pixel centres
fn fill_polygon(img: &mut RgbaImage, rings: &[Vec<Pixel>], colour: [u8; 4]) {
    let (height, width) = (img.height() as i64, img.width() as i64);

    let (min_y, max_y) = rings
        .iter()
        .flat_map(|r| r.iter())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, y)| {
            (lo.min(y), hi.max(y))
        });
    if !min_y.is_finite() || !max_y.is_finite() {
        return;
    }

    let first_row = (min_y.floor() as i64).max(0);
    let last_row = (max_y.ceil() as i64).min(height - 1);
    let mut crossings: Vec<f64> = Vec::new();

    for row in first_row..=last_row {
        let yc = row as f64 + 0.5;
        crossings.clear();

        for ring in rings.iter().filter(|r| r.len() >= 3) {
            let edges = ring.iter().zip(ring.iter().cycle().skip(1));
            for (&(x0, y0), &(x1, y1)) in edges {
                if (y0 <= yc && yc < y1) || (y1 <= yc && yc < y0) {
                    crossings.push(x0 + (yc - y0) * (x1 - x0) / (y1 - y0));
                }
            }
        }

        crossings.sort_by(|a, b| a.total_cmp(b));
        for span in crossings.chunks_exact(2) {
            // Pixel centres inside [span[0], span[1])
            let start = ((span[0] - 0.5).ceil() as i64).max(0);
            let end = ((span[1] - 0.5).ceil() as i64).min(width);
            for col in start..end {
                blend(img, col, row, colour);
            }
        }
    }
}

fn stroke_path(img: &mut RgbaImage, points: &[Pixel], width: f64, colour: [u8; 4]) {
    let radius = (width / 2.0).max(MIN_STAMP_RADIUS);
    for segment in points.windows(2) {
        let (x0, y0) = segment[0];
        let (x1, y1) = segment[1];
        let length = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
        let steps = (length / 0.5).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            stamp(img, x0 + (x1 - x0) * t, y0 + (y1 - y0) * t, radius, colour);
        }
    }
}

/// Draw a label's text anchored the same way as in the SVG output
fn draw_label<F: Font>(
    img: &mut RgbaImage,
    viewport: &Viewport,
    font: &F,
    scale: PxScale,
    label: &ProjectedLabel,
    colour: [u8; 4],
) {
    let (px, py) = viewport.to_pixel(label.x, label.y);
    let align = label_alignment(label, viewport);
    draw_text(font, scale, (px as f32, py as f32), align, &label.label.text, |x, y, coverage| {
        let alpha = (colour[3] as f32 * coverage.clamp(0.0, 1.0)).round() as u8;
        if alpha > 0 {
            blend(img, x, y, [colour[0], colour[1], colour[2], alpha]);
        }
    });
}

fn fill_disc(img: &mut RgbaImage, cx: f64, cy: f64, radius: f64, colour: [u8; 4]) {
    stamp(img, cx, cy, radius, colour);
}

/// Paint every pixel whose centre lies within `radius` of `(cx, cy)`
fn stamp(img: &mut RgbaImage, cx: f64, cy: f64, radius: f64, colour: [u8; 4]) {
    let r2 = radius * radius;
    let x_start = (cx - radius).floor() as i64;
    let x_end = (cx + radius).ceil() as i64;
    let y_start = (cy - radius).floor() as i64;
    let y_end = (cy + radius).ceil() as i64;

    for py in y_start..=y_end {
        for px in x_start..=x_end {
            let dx = px as f64 + 0.5 - cx;
            let dy = py as f64 + 0.5 - cy;
            if dx * dx + dy * dy <= r2 {
                set_pixel(img, px, py, colour);
            }
        }
    }
}

/// Overwrite a pixel, ignoring coordinates off the canvas
fn set_pixel(img: &mut RgbaImage, x: i64, y: i64, colour: [u8; 4]) {
    if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 {
        return;
    }
    if colour[3] == 255 {
        img.put_pixel(x as u32, y as u32, Rgba(colour));
    } else {
        blend(img, x, y, colour);
    }
}

/// Source-over compositing of `colour` onto a pixel
fn blend(img: &mut RgbaImage, x: i64, y: i64, colour: [u8; 4]) {
    if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 {
        return;
    }
    let dst = img.get_pixel(x as u32, y as u32).0;
    let alpha = colour[3] as f32 / 255.0;
    let mix = |s: u8, d: u8| (s as f32 * alpha + d as f32 * (1.0 - alpha)).round() as u8;
    let out_alpha = (colour[3] as f32 + dst[3] as f32 * (1.0 - alpha)).round() as u8;
    img.put_pixel(
        x as u32,
        y as u32,
        Rgba([
            mix(colour[0], dst[0]),
            mix(colour[1], dst[1]),
            mix(colour[2], dst[2]),
            out_alpha,
        ]),
    );
}
