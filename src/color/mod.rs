//! Color parsing and canonical representation
//!
//! Accepts the color forms CSS authors actually write (hex in short and long
//! form, `rgb()`, `hsl()`, and named palette entries) and normalizes them all
//! to an 8-bit RGB triple. The canonical text form is lowercase `#rrggbb`.
//!
//! # Submodules
//!
//! - `palette` - Named color table (Tailwind-style scale)

pub mod palette;

use std::fmt;
use std::str::FromStr;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ColorError;

/// An sRGB color with 8-bit channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Pure black (`#000000`)
    pub const BLACK: Color = Color::new(0, 0, 0);

    /// Pure white (`#ffffff`)
    pub const WHITE: Color = Color::new(255, 255, 255);

    /// Create a color from raw channel values
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Normalize a color string to a `Color`.
    ///
    /// Supported forms (leading/trailing whitespace and letter case are
    /// ignored):
    ///
    /// - `#rgb` - short hex, each digit doubled (`#f0c` is `#ff00cc`)
    /// - `#rrggbb` - long hex
    /// - `rgb(r, g, b)` - integer channels 0-255
    /// - `hsl(h, s%, l%)` - hue 0-359, percentages 0-100
    /// - palette names such as `red-500` or `white`
    ///
    /// Out-of-range components are rejected, not clamped: `rgb(300, 0, 0)`
    /// and `hsl(360, 100%, 50%)` are both errors.
    pub fn parse(input: &str) -> Result<Self, ColorError> {
        let trimmed = input.trim();
        let normalized = trimmed.to_ascii_lowercase();

        let parsed = if let Some(digits) = normalized.strip_prefix('#') {
            Self::from_hex_digits(digits)
        } else if normalized.starts_with("rgb(") {
            Self::from_rgb_func(&normalized)
        } else if normalized.starts_with("hsl(") {
            Self::from_hsl_func(&normalized)
        } else {
            palette::lookup(&normalized)
        };

        parsed.ok_or_else(|| ColorError::InvalidColor(trimmed.to_string()))
    }

    /// Canonical lowercase hex form, e.g. `#1e293b`
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    fn from_hex_digits(digits: &str) -> Option<Self> {
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        match digits.len() {
            3 => {
                let mut channels = [0u8; 3];
                for (i, c) in digits.chars().enumerate() {
                    let nibble = c.to_digit(16)? as u8;
                    channels[i] = nibble << 4 | nibble;
                }
                Some(Self::new(channels[0], channels[1], channels[2]))
            }
            6 => {
                let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
                let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
                let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
                Some(Self::new(r, g, b))
            }
            _ => None,
        }
    }

    fn from_rgb_func(value: &str) -> Option<Self> {
        let args = value.strip_prefix("rgb(")?.strip_suffix(')')?;
        let mut parts = args.split(',');
        let r = parse_channel(parts.next()?)?;
        let g = parse_channel(parts.next()?)?;
        let b = parse_channel(parts.next()?)?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self::new(r, g, b))
    }

    fn from_hsl_func(value: &str) -> Option<Self> {
        let args = value.strip_prefix("hsl(")?.strip_suffix(')')?;
        let mut parts = args.split(',');
        let h: u16 = parse_integer(parts.next()?)?;
        let s = parse_percent(parts.next()?)?;
        let l = parse_percent(parts.next()?)?;
        if parts.next().is_some() || h >= 360 {
            return None;
        }
        Some(Self::from_hsl(h, s, l))
    }

    /// Standard HSL-to-RGB conversion over 60-degree hue sectors.
    fn from_hsl(h: u16, s: u8, l: u8) -> Self {
        let s = f64::from(s) / 100.0;
        let l = f64::from(l) / 100.0;

        let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = chroma * (1.0 - ((f64::from(h) / 60.0) % 2.0 - 1.0).abs());
        let m = l - chroma / 2.0;

        let (r, g, b) = match h {
            0..=59 => (chroma, x, 0.0),
            60..=119 => (x, chroma, 0.0),
            120..=179 => (0.0, chroma, x),
            180..=239 => (0.0, x, chroma),
            240..=299 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };

        // (v + m) stays within [0, 1], so the cast cannot overflow.
        Self::new(
            ((r + m) * 255.0).round() as u8,
            ((g + m) * 255.0).round() as u8,
            ((b + m) * 255.0).round() as u8,
        )
    }
}

fn parse_channel(part: &str) -> Option<u8> {
    let digits = part.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // u8 parsing rejects anything above 255.
    digits.parse().ok()
}

fn parse_integer<T: FromStr>(part: &str) -> Option<T> {
    let digits = part.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn parse_percent(part: &str) -> Option<u8> {
    let digits = part.trim().strip_suffix('%')?;
    let value: u8 = parse_integer(digits)?;
    (value <= 100).then_some(value)
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Color::parse(&s).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_long_hex() {
        let color = Color::parse("#1e293b").unwrap();
        assert_eq!(color, Color::new(0x1e, 0x29, 0x3b));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(
            Color::parse("#FF5733").unwrap(),
            Color::parse("#ff5733").unwrap()
        );
        assert_eq!(Color::parse("RED-500").unwrap().to_hex(), "#ef4444");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(Color::parse("  #ffffff  ").unwrap(), Color::WHITE);
    }

    #[test]
    fn test_parse_short_hex_doubles_digits() {
        assert_eq!(Color::parse("#fff").unwrap(), Color::WHITE);
        assert_eq!(Color::parse("#f00").unwrap(), Color::new(255, 0, 0));
        assert_eq!(Color::parse("#abc").unwrap().to_hex(), "#aabbcc");
    }

    #[test]
    fn test_parse_rgb_function() {
        assert_eq!(
            Color::parse("rgb(255, 0, 0)").unwrap(),
            Color::new(255, 0, 0)
        );
        assert_eq!(Color::parse("rgb(0,255,0)").unwrap(), Color::new(0, 255, 0));
        assert_eq!(
            Color::parse("RGB( 30 , 41 , 59 )").unwrap().to_hex(),
            "#1e293b"
        );
    }

    #[test]
    fn test_parse_rgb_rejects_out_of_range() {
        assert!(Color::parse("rgb(256, 0, 0)").is_err());
        assert!(Color::parse("rgb(300, 300, 300)").is_err());
        assert!(Color::parse("rgb(-1, 0, 0)").is_err());
    }

    #[test]
    fn test_parse_rgb_rejects_wrong_arity() {
        assert!(Color::parse("rgb(1, 2)").is_err());
        assert!(Color::parse("rgb(1, 2, 3, 4)").is_err());
        assert!(Color::parse("rgb(1, 2, )").is_err());
    }

    #[test]
    fn test_parse_hsl_primaries() {
        assert_eq!(
            Color::parse("hsl(0, 100%, 50%)").unwrap(),
            Color::new(255, 0, 0)
        );
        assert_eq!(
            Color::parse("hsl(120, 100%, 50%)").unwrap(),
            Color::new(0, 255, 0)
        );
        assert_eq!(
            Color::parse("hsl(240, 100%, 50%)").unwrap(),
            Color::new(0, 0, 255)
        );
    }

    #[test]
    fn test_parse_hsl_grays() {
        assert_eq!(Color::parse("hsl(0, 0%, 100%)").unwrap(), Color::WHITE);
        assert_eq!(Color::parse("hsl(0, 0%, 0%)").unwrap(), Color::BLACK);
        // 50% lightness with no saturation lands on mid gray
        assert_eq!(Color::parse("hsl(180, 0%, 50%)").unwrap().to_hex(), "#808080");
    }

    #[test]
    fn test_parse_hsl_rejects_out_of_range() {
        assert!(Color::parse("hsl(360, 100%, 50%)").is_err());
        assert!(Color::parse("hsl(400, 100%, 50%)").is_err());
        assert!(Color::parse("hsl(0, 101%, 50%)").is_err());
        assert!(Color::parse("hsl(0, 100%, 101%)").is_err());
    }

    #[test]
    fn test_parse_hsl_requires_percent_signs() {
        assert!(Color::parse("hsl(0, 100, 50)").is_err());
    }

    #[test]
    fn test_parse_named_colors() {
        assert_eq!(Color::parse("red-500").unwrap().to_hex(), "#ef4444");
        assert_eq!(Color::parse("blue-500").unwrap().to_hex(), "#3b82f6");
        assert_eq!(Color::parse("white").unwrap(), Color::WHITE);
        assert_eq!(Color::parse("black").unwrap(), Color::BLACK);
    }

    #[test]
    fn test_parse_rejects_unknown_names() {
        assert!(Color::parse("blue-1000").is_err());
        assert!(Color::parse("blu-500").is_err());
        assert!(Color::parse("not a hex").is_err());
    }

    #[test]
    fn test_parse_rejects_malformed_hex() {
        assert!(Color::parse("#GHIJKL").is_err());
        assert!(Color::parse("#12345").is_err());
        assert!(Color::parse("#1234567").is_err());
        assert!(Color::parse("#").is_err());
        assert!(Color::parse("").is_err());
        // from_str_radix would accept a sign here; the grammar must not
        assert!(Color::parse("#+12345").is_err());
    }

    #[test]
    fn test_hex_output_is_lowercase() {
        assert_eq!(Color::parse("#FF5733").unwrap().to_hex(), "#ff5733");
        assert_eq!(Color::new(255, 255, 255).to_hex(), "#ffffff");
    }

    #[test]
    fn test_hex_round_trip() {
        let color = Color::parse("rgb(30, 41, 59)").unwrap();
        assert_eq!(Color::parse(&color.to_hex()).unwrap(), color);
    }

    #[test]
    fn test_display_matches_to_hex() {
        let color = Color::new(0x3b, 0x82, 0xf6);
        assert_eq!(color.to_string(), color.to_hex());
    }

    #[test]
    fn test_from_str() {
        let color: Color = "#3b82f6".parse().unwrap();
        assert_eq!(color, Color::new(0x3b, 0x82, 0xf6));
    }

    #[test]
    fn test_invalid_color_error_carries_input() {
        let err = Color::parse("  #nope ").unwrap_err();
        assert_eq!(err, ColorError::InvalidColor("#nope".to_string()));
    }

    #[test]
    fn test_serde_round_trip() {
        let color = Color::parse("#1e293b").unwrap();
        let json = serde_json::to_string(&color).unwrap();
        assert_eq!(json, "\"#1e293b\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, color);
    }

    #[test]
    fn test_serde_rejects_garbage() {
        let result: Result<Color, _> = serde_json::from_str("\"#zzz\"");
        assert!(result.is_err());
    }
}
