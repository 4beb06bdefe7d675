//! Color codec: RGB triples, hex strings and named colors.
//!
//! Resolved colors are always stored as strings, either `#rrggbb` or a
//! lowercase CSS color name. Raw float components never leave this module.

use crate::error::{Result, TurtleError};
use serde::{Deserialize, Serialize};

/// Range of RGB components accepted and reported by the turtle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorMode {
    /// Components in `0.0..=1.0`.
    #[default]
    Unit,
    /// Components in `0..=255`.
    Byte,
}

impl ColorMode {
    pub fn scale(self) -> f64 {
        match self {
            ColorMode::Unit => 1.0,
            ColorMode::Byte => 255.0,
        }
    }
}

/// A color as supplied by a caller.
#[derive(Clone, Debug, PartialEq)]
pub enum ColorSpec {
    /// A color name, a hex string, or CSS functional notation.
    Name(String),
    /// An RGB triple interpreted according to the active [`ColorMode`].
    Rgb(f64, f64, f64),
}

impl From<&str> for ColorSpec {
    fn from(value: &str) -> Self {
        ColorSpec::Name(value.to_string())
    }
}

impl From<String> for ColorSpec {
    fn from(value: String) -> Self {
        ColorSpec::Name(value)
    }
}

impl From<(f64, f64, f64)> for ColorSpec {
    fn from((r, g, b): (f64, f64, f64)) -> Self {
        ColorSpec::Rgb(r, g, b)
    }
}

impl From<(u8, u8, u8)> for ColorSpec {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        ColorSpec::Rgb(r as f64, g as f64, b as f64)
    }
}

/// A stored color decoded back for the caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorValue {
    Rgb(f64, f64, f64),
    Name(String),
}

pub fn clamp<T: PartialOrd>(value: T, low: T, high: T) -> T {
    if value < low {
        low
    } else if value > high {
        high
    } else {
        value
    }
}

fn hex(r: u8, g: u8, b: u8) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Normalizes a caller-supplied color into its stored string form.
pub fn build_color(mode: ColorMode, spec: &ColorSpec) -> Result<String> {
    match spec {
        ColorSpec::Rgb(r, g, b) => {
            let (mut r, mut g, mut b) = (*r, *g, *b);
            if mode == ColorMode::Unit && r <= 1.0 && g <= 1.0 && b <= 1.0 {
                r *= 255.0;
                g *= 255.0;
                b *= 255.0;
            }
            // Truncate first, then clamp into the byte range.
            let byte = |c: f64| clamp(c.trunc(), 0.0, 255.0) as u8;
            Ok(hex(byte(r), byte(g), byte(b)))
        }
        ColorSpec::Name(name) => normalize_name(name),
    }
}

fn normalize_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    let parsed = csscolorparser::parse(trimmed)
        .map_err(|_| TurtleError::InvalidColor(name.to_string()))?;
    if trimmed.starts_with('#') || trimmed.contains('(') {
        let [r, g, b, _] = parsed.to_rgba8();
        Ok(hex(r, g, b))
    } else {
        Ok(trimmed.to_ascii_lowercase())
    }
}

/// Decodes a stored color for reporting: hex strings become triples in the
/// active mode, names are returned unchanged.
pub fn decode_color(mode: ColorMode, color: &str) -> ColorValue {
    match parse_hex(color) {
        Some((r, g, b)) => {
            let (r, g, b) = (r as f64, g as f64, b as f64);
            match mode {
                ColorMode::Unit => ColorValue::Rgb(r / 255.0, g / 255.0, b / 255.0),
                ColorMode::Byte => ColorValue::Rgb(r, g, b),
            }
        }
        None => ColorValue::Name(color.to_string()),
    }
}

fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let digits = color.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Resolves any accepted color, named ones included, to byte components.
pub fn to_rgb(color: &str) -> Result<(u8, u8, u8)> {
    if let Some(rgb) = parse_hex(color) {
        return Ok(rgb);
    }
    let parsed =
        csscolorparser::parse(color).map_err(|_| TurtleError::InvalidColor(color.to_string()))?;
    let [r, g, b, _] = parsed.to_rgba8();
    Ok((r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_triples_become_hex() {
        let color = build_color(ColorMode::Byte, &(255u8, 128u8, 0u8).into()).unwrap();
        assert_eq!(color, "#ff8000");
    }

    #[test]
    fn unit_triples_are_scaled() {
        let color = build_color(ColorMode::Unit, &(1.0, 0.5, 0.0).into()).unwrap();
        assert_eq!(color, "#ff7f00");
    }

    #[test]
    fn out_of_range_components_are_clamped() {
        let color = build_color(ColorMode::Byte, &ColorSpec::Rgb(300.0, -4.0, 16.9)).unwrap();
        assert_eq!(color, "#ff0010");
    }

    #[test]
    fn short_hex_is_expanded() {
        assert_eq!(build_color(ColorMode::Unit, &"#ABC".into()).unwrap(), "#aabbcc");
    }

    #[test]
    fn names_are_kept_lowercase() {
        assert_eq!(build_color(ColorMode::Unit, &" Blue ".into()).unwrap(), "blue");
    }

    #[test]
    fn unknown_names_are_rejected() {
        let err = build_color(ColorMode::Unit, &"blurple-ish".into()).unwrap_err();
        assert!(matches!(err, TurtleError::InvalidColor(_)));
    }

    #[test]
    fn decode_follows_mode() {
        assert_eq!(
            decode_color(ColorMode::Byte, "#ff0000"),
            ColorValue::Rgb(255.0, 0.0, 0.0)
        );
        assert_eq!(
            decode_color(ColorMode::Unit, "#ff0000"),
            ColorValue::Rgb(1.0, 0.0, 0.0)
        );
        assert_eq!(
            decode_color(ColorMode::Unit, "red"),
            ColorValue::Name("red".to_string())
        );
    }

    #[test]
    fn named_colors_resolve_to_rgb() {
        assert_eq!(to_rgb("black").unwrap(), (0, 0, 0));
        assert_eq!(to_rgb("#0a0b0c").unwrap(), (10, 11, 12));
    }
}
