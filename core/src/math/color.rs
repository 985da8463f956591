use crate::prelude::{TrackError, TrackResult};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// 8-bit RGB color, serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` or `rrggbb`.
    pub fn from_hex(hex: &str) -> TrackResult<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TrackError::InvalidColor(hex.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| TrackError::InvalidColor(hex.to_string()))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Channel-wise linear blend, `ratio` 0 gives `self`, 1 gives `other`.
    pub fn blend(&self, other: &Rgb, ratio: f64) -> Rgb {
        let ratio = ratio.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| {
            let (a, b) = (f64::from(a), f64::from(b));
            (a + (b - a) * ratio).round().clamp(0.0, 255.0) as u8
        };
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = TrackError;

    fn from_str(s: &str) -> TrackResult<Self> {
        Rgb::from_hex(s)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Rgb::from_hex(&raw).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parsing_accepts_optional_hash() {
        assert_eq!(Rgb::from_hex("#0066cc").unwrap(), Rgb::new(0x00, 0x66, 0xcc));
        assert_eq!(Rgb::from_hex("FF6600").unwrap(), Rgb::new(0xff, 0x66, 0x00));
        assert!(Rgb::from_hex("#12345").is_err());
        assert!(Rgb::from_hex("#gg0000").is_err());
        assert!(Rgb::from_hex("#+fffff").is_err());
    }

    #[test]
    fn blend_rounds_to_nearest_channel_value() {
        let black = Rgb::new(0, 0, 0);
        let white = Rgb::new(255, 255, 255);
        assert_eq!(black.blend(&white, 0.0), black);
        assert_eq!(black.blend(&white, 1.0), white);
        // 127.5 rounds up
        assert_eq!(black.blend(&white, 0.5), Rgb::new(128, 128, 128));
        assert_eq!(
            Rgb::new(255, 0, 0).blend(&Rgb::new(255, 102, 0), 0.25),
            Rgb::new(255, 26, 0)
        );
    }

    #[test]
    fn serializes_as_hex_string() {
        let json = serde_json::to_string(&Rgb::new(0x88, 0x88, 0x88)).unwrap();
        assert_eq!(json, "\"#888888\"");
        let back: Rgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Rgb::new(0x88, 0x88, 0x88));
    }
}
