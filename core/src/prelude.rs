use serde::{Deserialize, Serialize};

pub use crate::gradient::{GradientEncoder, GradientSegment, Legend, ScaleStop, ValueRange};
pub use crate::math::color::Rgb;
pub use crate::prediction::{PredictedPosition, PredictionConfig, PredictionEngine};
pub use crate::track::{GpsStatus, GradientField, TelemetryPoint};

/// Geographic vertex handed to the rendering collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Common error type for the fallible edges of the library.
///
/// The engines never return this; missing or degenerate input degrades to
/// `None` or an empty list instead.
#[derive(thiserror::Error, Debug)]
pub enum TrackError {
    #[error("invalid prediction config: {0}")]
    InvalidConfig(String),
    #[error("unknown gradient field: {0}")]
    UnknownField(String),
    #[error("invalid color: {0}")]
    InvalidColor(String),
    #[error("invalid palette: {0}")]
    InvalidPalette(String),
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

pub type TrackResult<T> = Result<T, TrackError>;
