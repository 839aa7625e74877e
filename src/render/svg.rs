//! SVG output.

use std::fmt::Write;

use super::{label_alignment, HAlign, Scene, Style, VAlign, Viewport};
use crate::geo::{GeometryExt, Layer, LayerKind, LineString};
use crate::graticule::ProjectedLabel;

/// Render the scene as an SVG document of the given physical size
pub fn render_svg(
    scene: &Scene,
    viewport: &Viewport,
    style: &Style,
    width_in: f64,
    height_in: f64,
) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = write_document(&mut out, scene, viewport, style, width_in, height_in);
    out
}

fn write_document(
    out: &mut String,
    scene: &Scene,
    viewport: &Viewport,
    style: &Style,
    width_in: f64,
    height_in: f64,
) -> std::fmt::Result {
    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        out,
        "<!-- Generated by robinson-map {} on {} -->",
        env!("CARGO_PKG_VERSION"),
        chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    )?;
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}in" height="{}in" viewBox="0 0 {} {}">"#,
        width_in, height_in, viewport.width, viewport.height
    )?;
    writeln!(
        out,
        r#"<rect width="100%" height="100%" fill="{}"/>"#,
        style.background
    )?;

    let bbox = scene.layer(LayerKind::BoundingBox);

    if let Some(layer) = bbox {
        write_polygons(out, viewport, layer, &style.ocean_fill, "none", 0.0)?;
    }
    if let Some(layer) = scene.layer(LayerKind::Graticule) {
        let width = viewport.points(style.graticule_width);
        write_lines(out, viewport, layer, &style.graticule_stroke, width)?;
    }
    if let Some(layer) = scene.layer(LayerKind::Countries) {
        write_polygons(
            out,
            viewport,
            layer,
            &style.land_fill,
            &style.land_stroke,
            viewport.points(style.land_stroke_width),
        )?;
    }
    if let Some(layer) = bbox {
        let width = viewport.points(style.bbox_width);
        write_lines(out, viewport, layer, &style.bbox_stroke, width)?;
    }

    writeln!(
        out,
        r#"<g id="sites" fill="{}" stroke="{}" stroke-width="{:.2}">"#,
        style.site_fill,
        style.site_stroke,
        viewport.points(0.25)
    )?;
    let radius = viewport.points(style.site_radius);
    for site in &scene.sites {
        let (px, py) = viewport.to_pixel(site.x, site.y);
        writeln!(
            out,
            r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}"><title>{}</title></circle>"#,
            px,
            py,
            radius,
            escape(&site.id)
        )?;
    }
    writeln!(out, "</g>")?;

    writeln!(
        out,
        r#"<g id="labels" fill="{}" font-family="{}" font-size="{:.2}">"#,
        style.label_color,
        escape(&style.font_family),
        viewport.points(style.font_size)
    )?;
    for label in &scene.labels {
        write_label(out, viewport, label)?;
    }
    writeln!(out, "</g>")?;

    writeln!(out, "</svg>")
}

fn write_polygons(
    out: &mut String,
    viewport: &Viewport,
    layer: &Layer,
    fill: &str,
    stroke: &str,
    stroke_width: f64,
) -> std::fmt::Result {
    writeln!(
        out,
        r#"<g id="{}-fill" fill="{}" fill-rule="evenodd" stroke="{}" stroke-width="{:.2}">"#,
        layer.name, fill, stroke, stroke_width
    )?;
    for geometry in &layer.geometries {
        for polygon in geometry.polygons() {
            let mut d = String::new();
            push_path(&mut d, viewport, polygon.exterior(), true);
            for ring in polygon.interiors() {
                push_path(&mut d, viewport, ring, true);
            }
            if !d.is_empty() {
                writeln!(out, r#"<path d="{}"/>"#, d.trim_end())?;
            }
        }
    }
    writeln!(out, "</g>")
}

fn write_lines(
    out: &mut String,
    viewport: &Viewport,
    layer: &Layer,
    stroke: &str,
    stroke_width: f64,
) -> std::fmt::Result {
    writeln!(
        out,
        r#"<g id="{}-lines" fill="none" stroke="{}" stroke-width="{:.2}" stroke-linejoin="round">"#,
        layer.name, stroke, stroke_width
    )?;
    for geometry in &layer.geometries {
        for path in geometry.paths() {
            let mut d = String::new();
            push_path(&mut d, viewport, path, false);
            if !d.is_empty() {
                writeln!(out, r#"<path d="{}"/>"#, d.trim_end())?;
            }
        }
    }
    writeln!(out, "</g>")
}

fn push_path(d: &mut String, viewport: &Viewport, line: &LineString, close: bool) {
    if line.0.len() < 2 {
        return;
    }
    for (i, c) in line.0.iter().enumerate() {
        let (px, py) = viewport.to_pixel(c.x, c.y);
        let command = if i == 0 { 'M' } else { 'L' };
        let _ = write!(d, "{}{:.2} {:.2} ", command, px, py);
    }
    if close {
        d.push_str("Z ");
    }
}

fn write_label(
    out: &mut String,
    viewport: &Viewport,
    projected: &ProjectedLabel,
) -> std::fmt::Result {
    let (px, py) = viewport.to_pixel(projected.x, projected.y);
    let (h, v) = label_alignment(projected, viewport);
    let anchor = match h {
        HAlign::Start => "start",
        HAlign::Middle => "middle",
        HAlign::End => "end",
    };
    let baseline = match v {
        VAlign::Top => "hanging",
        VAlign::Middle => "middle",
        VAlign::Baseline => "auto",
    };

    writeln!(
        out,
        r#"<text x="{:.2}" y="{:.2}" text-anchor="{}" dominant-baseline="{}">{}</text>"#,
        px,
        py,
        anchor,
        baseline,
        escape(&projected.label.text)
    )
}

/// Escape text for XML content and attributes
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
