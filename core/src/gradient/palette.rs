use crate::gradient::ValueRange;
use crate::math::color::Rgb;
use crate::prelude::{TrackError, TrackResult};
use crate::track::GradientField;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Neutral "no data" color for points without a usable value.
pub const NO_DATA_COLOR: Rgb = Rgb::new(0x88, 0x88, 0x88);

const COLD_TO_HOT: [Rgb; 5] = [
    Rgb::new(0x00, 0x66, 0xcc),
    Rgb::new(0x00, 0xcc, 0x66),
    Rgb::new(0xff, 0xcc, 0x00),
    Rgb::new(0xff, 0x66, 0x00),
    Rgb::new(0xcc, 0x00, 0x00),
];

const BAD_TO_GOOD: [Rgb; 5] = [
    Rgb::new(0xff, 0x00, 0x00),
    Rgb::new(0xff, 0x66, 0x00),
    Rgb::new(0xff, 0xcc, 0x00),
    Rgb::new(0x66, 0xcc, 0x00),
    Rgb::new(0x00, 0xcc, 0x00),
];

const LOW_TO_HIGH_PRESSURE: [Rgb; 5] = [
    Rgb::new(0x4b, 0x00, 0x82),
    Rgb::new(0x00, 0x66, 0xcc),
    Rgb::new(0x00, 0xcc, 0xcc),
    Rgb::new(0x66, 0xcc, 0x00),
    Rgb::new(0xff, 0xcc, 0x00),
];

/// Anchor colors and display metadata for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldPalette {
    pub name: String,
    pub unit: String,
    pub colors: Vec<Rgb>,
    /// Used when a track carries no finite value for the field.
    pub default_range: ValueRange,
}

impl FieldPalette {
    pub fn new(
        name: impl Into<String>,
        unit: impl Into<String>,
        colors: Vec<Rgb>,
        default_range: ValueRange,
    ) -> TrackResult<Self> {
        if colors.len() < 2 {
            return Err(TrackError::InvalidPalette(format!(
                "palette needs at least two anchors, got {}",
                colors.len()
            )));
        }
        Ok(Self {
            name: name.into(),
            unit: unit.into(),
            colors,
            default_range,
        })
    }

    fn builtin(name: &str, unit: &str, colors: &[Rgb], min: f64, max: f64) -> Self {
        Self {
            name: name.to_string(),
            unit: unit.to_string(),
            colors: colors.to_vec(),
            default_range: ValueRange::new(min, max),
        }
    }

    pub fn first(&self) -> Rgb {
        self.colors.first().copied().unwrap_or(NO_DATA_COLOR)
    }

    pub fn last(&self) -> Rgb {
        self.colors.last().copied().unwrap_or(NO_DATA_COLOR)
    }

    /// Piecewise-linear lookup across equal-width segments of [0, 1].
    pub fn sample(&self, normalized: f64) -> Rgb {
        let colors = &self.colors;
        if colors.len() < 2 || normalized.is_nan() {
            return self.first();
        }
        if normalized <= 0.0 {
            return self.first();
        }
        if normalized >= 1.0 {
            return self.last();
        }

        let segments = (colors.len() - 1) as f64;
        let scaled = normalized * segments;
        let index = scaled.floor() as usize;
        if index >= colors.len() - 1 {
            return self.last();
        }
        colors[index].blend(&colors[index + 1], scaled - index as f64)
    }
}

/// Fields eligible for gradient rendering, with their palettes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteTable {
    palettes: BTreeMap<GradientField, FieldPalette>,
}

impl PaletteTable {
    pub fn empty() -> Self {
        Self {
            palettes: BTreeMap::new(),
        }
    }

    /// Environmental sensors on top of the default altitude/satellite/battery set.
    pub fn environmental() -> Self {
        let mut table = Self::default();
        table.insert(
            GradientField::WaterTemperature,
            FieldPalette::builtin("Water Temperature", "°C", &COLD_TO_HOT, 0.0, 30.0),
        );
        table.insert(
            GradientField::AirTemperature,
            FieldPalette::builtin("Air Temperature", "°C", &COLD_TO_HOT, -10.0, 40.0),
        );
        table.insert(
            GradientField::AirPressure,
            FieldPalette::builtin("Air Pressure", "hPa", &LOW_TO_HIGH_PRESSURE, 950.0, 1050.0),
        );
        table
    }

    pub fn insert(&mut self, field: GradientField, palette: FieldPalette) {
        self.palettes.insert(field, palette);
    }

    pub fn remove(&mut self, field: GradientField) -> Option<FieldPalette> {
        self.palettes.remove(&field)
    }

    pub fn get(&self, field: GradientField) -> Option<&FieldPalette> {
        self.palettes.get(&field)
    }

    pub fn contains(&self, field: GradientField) -> bool {
        self.palettes.contains_key(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = GradientField> + '_ {
        self.palettes.keys().copied()
    }
}

impl Default for PaletteTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.insert(
            GradientField::Altitude,
            FieldPalette::builtin("Altitude", "m", &COLD_TO_HOT, 0.0, 1000.0),
        );
        table.insert(
            GradientField::Satellites,
            FieldPalette::builtin("Satellites", "count", &BAD_TO_GOOD, 0.0, 12.0),
        );
        table.insert(
            GradientField::Battery,
            FieldPalette::builtin("Battery", "V", &BAD_TO_GOOD, 0.0, 5.0),
        );
        table
    }
}
