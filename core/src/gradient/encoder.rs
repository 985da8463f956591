use crate::gradient::palette::{FieldPalette, PaletteTable, NO_DATA_COLOR};
use crate::gradient::{GradientSegment, Legend, ScaleStop, ValueRange};
use crate::math::color::Rgb;
use crate::math::geodesy::intermediate_point;
use crate::prelude::LatLng;
use crate::telemetry::log::LogManager;
use crate::track::{sorted_by_time, usable_points, GradientField, TelemetryPoint, TimeOrder};

/// Default number of sub-segments drawn between two raw samples.
pub const DEFAULT_SUBDIVISIONS: usize = 5;

/// Maps a numeric telemetry field onto its palette.
///
/// Fields missing from the palette table are not eligible: they render as
/// [`NO_DATA_COLOR`] and produce no gradient segments.
pub struct GradientEncoder {
    palettes: PaletteTable,
    logger: LogManager,
}

impl GradientEncoder {
    pub fn new(palettes: PaletteTable) -> Self {
        Self {
            palettes,
            logger: LogManager::new("GradientEncoder"),
        }
    }

    pub fn palettes(&self) -> &PaletteTable {
        &self.palettes
    }

    pub fn palette(&self, field: GradientField) -> Option<&FieldPalette> {
        self.palettes.get(field)
    }

    pub fn color_for(&self, normalized: f64, field: GradientField) -> Rgb {
        self.palette(field)
            .map(|palette| palette.sample(normalized))
            .unwrap_or(NO_DATA_COLOR)
    }

    /// Observed min/max of `field`, or the field's default range when the
    /// points carry no finite value for it.
    pub fn range_for(&self, points: &[TelemetryPoint], field: GradientField) -> ValueRange {
        self.observed_range(points.iter(), field)
    }

    fn observed_range<'a>(
        &self,
        points: impl Iterator<Item = &'a TelemetryPoint>,
        field: GradientField,
    ) -> ValueRange {
        let observed = points
            .filter_map(|point| point.value(field))
            .fold(None, |range: Option<ValueRange>, value| {
                Some(match range {
                    Some(r) => ValueRange::new(r.min.min(value), r.max.max(value)),
                    None => ValueRange::new(value, value),
                })
            });

        observed.unwrap_or_else(|| {
            self.palette(field)
                .map(|palette| palette.default_range)
                .unwrap_or(ValueRange::UNIT)
        })
    }

    fn color_in_range(&self, value: Option<f64>, range: &ValueRange, field: GradientField) -> Rgb {
        match value.filter(|v| v.is_finite()) {
            Some(v) => self.color_for(range.normalize(v), field),
            None => NO_DATA_COLOR,
        }
    }

    /// One color per input point, in input order.
    pub fn encode(&self, points: &[TelemetryPoint], field: GradientField) -> Vec<Rgb> {
        let range = self.range_for(points, field);
        points
            .iter()
            .map(|point| self.color_in_range(point.value(field), &range, field))
            .collect()
    }

    /// Splits the track into colored sub-segments for a smooth gradient.
    ///
    /// Points with an invalid GPS fix are dropped and the rest ordered by time.
    /// An empty result means "draw the flat track instead".
    pub fn segment_path(
        &self,
        points: &[TelemetryPoint],
        field: Option<GradientField>,
        subdivisions: usize,
    ) -> Vec<GradientSegment> {
        let field = match field {
            Some(field) if self.palettes.contains(field) => field,
            _ => return Vec::new(),
        };
        if points.len() < 2 {
            return Vec::new();
        }

        let ordered = sorted_by_time(usable_points(points), TimeOrder::OldestFirst);
        if ordered.len() < 2 {
            self.logger.declined(&format!(
                "{} of {} points usable for {} gradient",
                ordered.len(),
                points.len(),
                field
            ));
            return Vec::new();
        }

        let subdivisions = subdivisions.max(1);
        let range = self.observed_range(ordered.iter().copied(), field);
        let mut segments = Vec::with_capacity((ordered.len() - 1) * subdivisions);

        for pair in ordered.windows(2) {
            let (start, end) = (pair[0], pair[1]);
            let from = LatLng::new(start.latitude, start.longitude);
            let to = LatLng::new(end.latitude, end.longitude);
            let vertices: Vec<LatLng> = (0..=subdivisions)
                .map(|j| intermediate_point(from, to, j as f64 / subdivisions as f64))
                .collect();

            let endpoints = start.value(field).zip(end.value(field));
            for j in 0..subdivisions {
                let ratio = j as f64 / subdivisions as f64;
                let value = endpoints.map(|(a, b)| a + (b - a) * ratio);
                segments.push(GradientSegment {
                    path: vec![vertices[j], vertices[j + 1]],
                    color: self.color_in_range(value, &range, field),
                    value,
                });
            }
        }

        self.logger.record(&format!(
            "{} {} segments over [{:.2}, {:.2}]",
            segments.len(),
            field,
            range.min,
            range.max
        ));
        segments
    }

    /// Legend scale for `field` over the track's range, or `None` if the field
    /// is not eligible.
    pub fn legend(
        &self,
        points: &[TelemetryPoint],
        field: GradientField,
        steps: usize,
    ) -> Option<Legend> {
        let palette = self.palette(field)?;
        let range = self.range_for(points, field);
        let steps = steps.max(2);
        let step = (range.max - range.min) / (steps - 1) as f64;

        let stops = (0..steps)
            .map(|index| {
                let value = range.min + step * index as f64;
                ScaleStop {
                    value,
                    color: palette.sample(range.normalize(value)),
                }
            })
            .collect();

        Some(Legend {
            field,
            name: palette.name.clone(),
            unit: palette.unit.clone(),
            range,
            stops,
        })
    }
}

impl Default for GradientEncoder {
    fn default() -> Self {
        Self::new(PaletteTable::default())
    }
}
