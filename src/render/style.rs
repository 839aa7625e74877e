//! Colours and sizes for map layers.

use serde::{Deserialize, Serialize};

use crate::error::{MapError, Result};

/// Drawing style for every layer of the map.
///
/// Colours are `#rrggbb` or `#rrggbbaa`; sizes are in points (1/72 in).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    pub background: String,
    pub ocean_fill: String,
    pub land_fill: String,
    pub land_stroke: String,
    pub land_stroke_width: f64,
    pub graticule_stroke: String,
    pub graticule_width: f64,
    pub bbox_stroke: String,
    pub bbox_width: f64,
    pub site_fill: String,
    pub site_stroke: String,
    pub site_radius: f64,
    pub label_color: String,
    pub font_size: f64,
    pub font_family: String,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            background: "#ffffff".to_string(),
            ocean_fill: "#eaf2fa".to_string(),
            land_fill: "#d9d9d9".to_string(),
            land_stroke: "#ffffff".to_string(),
            land_stroke_width: 0.3,
            graticule_stroke: "#b3b3b3".to_string(),
            graticule_width: 0.3,
            bbox_stroke: "#000000".to_string(),
            bbox_width: 0.8,
            site_fill: "#d7301f".to_string(),
            site_stroke: "#000000".to_string(),
            site_radius: 2.5,
            label_color: "#4d4d4d".to_string(),
            font_size: 7.0,
            font_family: "sans-serif".to_string(),
        }
    }
}

impl Style {
    /// Check every colour parses and every size is usable
    pub fn validate(&self) -> Result<()> {
        for (name, colour) in self.colours() {
            parse_hex_colour(colour).map_err(|e| MapError::InvalidParameter {
                param: name.to_string(),
                message: e.to_string(),
            })?;
        }

        for (name, size) in [
            ("land_stroke_width", self.land_stroke_width),
            ("graticule_width", self.graticule_width),
            ("bbox_width", self.bbox_width),
            ("site_radius", self.site_radius),
            ("font_size", self.font_size),
        ] {
            if !(size.is_finite() && size >= 0.0) {
                return Err(MapError::InvalidParameter {
                    param: name.to_string(),
                    message: format!("must be a non-negative number, got {}", size),
                });
            }
        }

        Ok(())
    }

    fn colours(&self) -> [(&'static str, &str); 9] {
        [
            ("background", &self.background),
            ("ocean_fill", &self.ocean_fill),
            ("land_fill", &self.land_fill),
            ("land_stroke", &self.land_stroke),
            ("graticule_stroke", &self.graticule_stroke),
            ("bbox_stroke", &self.bbox_stroke),
            ("site_fill", &self.site_fill),
            ("site_stroke", &self.site_stroke),
            ("label_color", &self.label_color),
        ]
    }
}

/// Parse `#rrggbb` or `#rrggbbaa` into RGBA bytes
pub fn parse_hex_colour(colour: &str) -> Result<[u8; 4]> {
    let invalid = || MapError::Render {
        message: format!("invalid colour '{}', expected #rrggbb or #rrggbbaa", colour),
    };

    let hex = colour.strip_prefix('#').ok_or_else(invalid)?;
    if !(hex.len() == 6 || hex.len() == 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    let alpha = if hex.len() == 8 { byte(6)? } else { 255 };
    Ok([byte(0)?, byte(2)?, byte(4)?, alpha])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_colour() {
        assert_eq!(parse_hex_colour("#ff8000").unwrap(), [255, 128, 0, 255]);
        assert_eq!(parse_hex_colour("#00000080").unwrap(), [0, 0, 0, 128]);
        assert_eq!(parse_hex_colour("#ABCDEF").unwrap(), [0xab, 0xcd, 0xef, 255]);
        assert!(parse_hex_colour("ff8000").is_err());
        assert!(parse_hex_colour("#ff80").is_err());
        assert!(parse_hex_colour("#gg0000").is_err());
    }

    #[test]
    fn test_style_validation() {
        assert!(Style::default().validate().is_ok());

        let style = Style {
            land_fill: "grey".to_string(),
            ..Default::default()
        };
        assert!(style.validate().is_err());

        let style = Style {
            site_radius: -1.0,
            ..Default::default()
        };
        assert!(style.validate().is_err());
    }
}
