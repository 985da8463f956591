pub mod encoder;
pub mod palette;

pub use encoder::GradientEncoder;
pub use palette::{FieldPalette, PaletteTable, NO_DATA_COLOR};

use crate::math::color::Rgb;
use crate::prelude::LatLng;
use crate::track::GradientField;
use serde::{Deserialize, Serialize};

/// Closed interval of field values used for normalization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub const UNIT: ValueRange = ValueRange { min: 0.0, max: 1.0 };

    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Maps `value` into [0, 1]; a zero-width range maps everything to 0.
    pub fn normalize(&self, value: f64) -> f64 {
        if self.max == self.min {
            return 0.0;
        }
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

/// Colored piece of a track polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientSegment {
    pub path: Vec<LatLng>,
    pub color: Rgb,
    /// Field value the color encodes; `None` when either end lacked data.
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleStop {
    pub value: f64,
    pub color: Rgb,
}

/// Color scale for a legend bar, sampled at evenly spaced values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    pub field: GradientField,
    pub name: String,
    pub unit: String,
    pub range: ValueRange,
    pub stops: Vec<ScaleStop>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_clamps_and_handles_zero_width() {
        let range = ValueRange::new(10.0, 20.0);
        assert_eq!(range.normalize(15.0), 0.5);
        assert_eq!(range.normalize(0.0), 0.0);
        assert_eq!(range.normalize(25.0), 1.0);
        assert_eq!(ValueRange::new(3.0, 3.0).normalize(3.0), 0.0);
        assert_eq!(range.midpoint(), 15.0);
    }
}
