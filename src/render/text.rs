//! Label text for the raster output.
//!
//! Glyphs come from DejaVu Sans, embedded at build time so a render never
//! depends on the fonts installed on the host.

use ab_glyph::{point, Font, FontRef, GlyphId, PxScale, ScaleFont};

use super::{HAlign, VAlign};
use crate::error::{MapError, Result};

static LABEL_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// The embedded label font
pub fn label_font() -> Result<FontRef<'static>> {
    FontRef::try_from_slice(LABEL_FONT).map_err(|e| MapError::Render {
        message: format!("Embedded label font is unreadable: {}", e),
    })
}

/// Advance width of `text` in pixels, kerning included
pub fn text_width<F: Font>(font: &F, scale: PxScale, text: &str) -> f32 {
    let scaled = font.as_scaled(scale);
    let mut width = 0.0;
    let mut previous: Option<GlyphId> = None;
    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = previous {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        previous = Some(id);
    }
    width
}

/// Lay `text` out around the anchor `(x, y)` and report glyph coverage.
///
/// `plot` receives canvas pixel coordinates and a coverage in `[0, 1]`;
/// pixels off the canvas are reported too and are the caller's to drop.
pub fn draw_text<F, P>(
    font: &F,
    scale: PxScale,
    anchor: (f32, f32),
    align: (HAlign, VAlign),
    text: &str,
    mut plot: P,
) where
    F: Font,
    P: FnMut(i64, i64, f32),
{
    let scaled = font.as_scaled(scale);
    let width = text_width(font, scale, text);

    let mut caret = match align.0 {
        HAlign::Start => anchor.0,
        HAlign::Middle => anchor.0 - width / 2.0,
        HAlign::End => anchor.0 - width,
    };
    // descent is negative
    let baseline = match align.1 {
        VAlign::Top => anchor.1 + scaled.ascent(),
        VAlign::Middle => anchor.1 + (scaled.ascent() + scaled.descent()) / 2.0,
        VAlign::Baseline => anchor.1,
    };

    let mut previous: Option<GlyphId> = None;
    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = previous {
            caret += scaled.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(scale, point(caret, baseline));
        caret += scaled.h_advance(id);
        previous = Some(id);

        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            let (left, top) = (bounds.min.x as i64, bounds.min.y as i64);
            outlined.draw(|gx, gy, coverage| plot(left + gx as i64, top + gy as i64, coverage));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_font_has_degree_sign() {
        let font = label_font().unwrap();
        assert_ne!(font.glyph_id('°'), GlyphId(0));
        assert_ne!(font.glyph_id('N'), GlyphId(0));
    }

    #[test]
    fn test_text_width_grows_with_text() {
        let font = label_font().unwrap();
        let scale = PxScale::from(12.0);
        let short = text_width(&font, scale, "0°");
        let long = text_width(&font, scale, "160°W");
        assert!(short > 0.0);
        assert!(long > short);
        assert_eq!(text_width(&font, scale, ""), 0.0);
    }

    #[test]
    fn test_alignment_moves_the_ink() {
        let font = label_font().unwrap();
        let scale = PxScale::from(16.0);
        let ink_columns = |h: HAlign| {
            let mut min_x = i64::MAX;
            let mut max_x = i64::MIN;
            draw_text(&font, scale, (100.0, 50.0), (h, VAlign::Middle), "40°N", |x, _, c| {
                if c > 0.5 {
                    min_x = min_x.min(x);
                    max_x = max_x.max(x);
                }
            });
            (min_x, max_x)
        };

        let (start_min, _) = ink_columns(HAlign::Start);
        let (_, end_max) = ink_columns(HAlign::End);
        let (mid_min, mid_max) = ink_columns(HAlign::Middle);
        assert!(start_min >= 99);
        assert!(end_max <= 101);
        assert!(mid_min < 100 && mid_max > 100);
    }
}
