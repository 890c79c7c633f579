//! Color type carried on the wire as a `[r, g, b]` array.

use serde::{Deserialize, Serialize};

/// RGB color tuple.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const RED: Self = Self::new(255, 0, 0);
    pub const GREEN: Self = Self::new(0, 255, 0);
    pub const BLUE: Self = Self::new(0, 0, 255);
    pub const YELLOW: Self = Self::new(255, 255, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const ORANGE: Self = Self::new(255, 165, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Scale brightness by a factor in [0, 1]. Channels truncate toward zero.
    pub fn scale(self, factor: f32) -> Self {
        let f = factor.clamp(0.0, 1.0);
        Self {
            r: (self.r as f32 * f) as u8,
            g: (self.g as f32 * f) as u8,
            b: (self.b as f32 * f) as u8,
        }
    }

    pub fn is_black(self) -> bool {
        self == Self::BLACK
    }

    /// Parse a color string: "#RRGGBB", "r,g,b", or a name like "red".
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() == 6 && hex.is_ascii() {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                return Some(Self::new(r, g, b));
            }
            return None;
        }
        if s.contains(',') {
            let parts: Vec<u8> = s
                .split(',')
                .map(|p| p.trim().parse::<u8>())
                .collect::<Result<_, _>>()
                .ok()?;
            return match parts.as_slice() {
                [r, g, b] => Some(Self::new(*r, *g, *b)),
                _ => None,
            };
        }
        match s.to_ascii_lowercase().as_str() {
            "black" | "off" => Some(Self::BLACK),
            "red" => Some(Self::RED),
            "green" => Some(Self::GREEN),
            "blue" => Some(Self::BLUE),
            "yellow" => Some(Self::YELLOW),
            "white" => Some(Self::WHITE),
            "orange" => Some(Self::ORANGE),
            "cyan" => Some(Self::new(0, 255, 255)),
            "magenta" | "pink" => Some(Self::new(255, 0, 255)),
            "purple" => Some(Self::new(128, 0, 255)),
            _ => None,
        }
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(c: Rgb) -> Self {
        [c.r, c.g, c.b]
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!(Rgb::parse("#FFA500"), Some(Rgb::ORANGE));
        assert_eq!(Rgb::parse("0, 255,0"), Some(Rgb::GREEN));
        assert_eq!(Rgb::parse("Yellow"), Some(Rgb::YELLOW));
        assert_eq!(Rgb::parse("256,0,0"), None);
        assert_eq!(Rgb::parse("1,2"), None);
        assert_eq!(Rgb::parse("#12345"), None);
        assert_eq!(Rgb::parse("mauve"), None);
    }

    #[test]
    fn test_parse_rejects_multibyte_hex() {
        // six bytes, but not six hex digits
        assert_eq!(Rgb::parse("#aé€"), None);
        assert_eq!(Rgb::parse("#ééé"), None);
        assert_eq!(Rgb::parse("#€€"), None);
    }

    #[test]
    fn test_scale_truncates() {
        assert_eq!(Rgb::new(255, 255, 0).scale(0.5), Rgb::new(127, 127, 0));
        assert_eq!(Rgb::WHITE.scale(0.0), Rgb::BLACK);
        assert_eq!(Rgb::WHITE.scale(2.0), Rgb::WHITE);
    }

    #[test]
    fn test_wire_shape_is_array() {
        let json = serde_json::to_string(&Rgb::new(1, 2, 3)).unwrap();
        assert_eq!(json, "[1,2,3]");
        assert!(serde_json::from_str::<Rgb>("[1,2,300]").is_err());
        assert!(serde_json::from_str::<Rgb>("[1,2]").is_err());
    }
}
