use crate::math::geodesy::{bearing_deg, haversine_km};
use crate::prelude::LatLng;
use crate::track::TelemetryPoint;

/// Motion between two consecutive reference points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionVector {
    pub distance_km: f64,
    /// From the older point towards the newer one.
    pub bearing_deg: f64,
    pub time_span_min: f64,
    /// km/h, 0 when the two samples share a timestamp.
    pub speed_kmh: f64,
}

impl MotionVector {
    pub fn between(previous: &TelemetryPoint, current: &TelemetryPoint) -> Self {
        let from = LatLng::new(previous.latitude, previous.longitude);
        let to = LatLng::new(current.latitude, current.longitude);

        let distance_km = haversine_km(from, to);
        let time_span_min =
            (current.timestamp - previous.timestamp).num_milliseconds() as f64 / 60_000.0;
        let speed_kmh = if time_span_min > 0.0 {
            distance_km / time_span_min * 60.0
        } else {
            0.0
        };

        Self {
            distance_km,
            bearing_deg: bearing_deg(from, to),
            time_span_min,
            speed_kmh,
        }
    }
}

/// Vectors for each consecutive pair of a newest-first point list.
pub fn motion_vectors(newest_first: &[&TelemetryPoint]) -> Vec<MotionVector> {
    newest_first
        .windows(2)
        .map(|pair| MotionVector::between(pair[1], pair[0]))
        .collect()
}
