pub mod engine;
pub mod vector;

pub use engine::{predict, PredictionEngine};
pub use vector::{motion_vectors, MotionVector};

use crate::prelude::{TrackError, TrackResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User-controlled prediction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionConfig {
    /// How many of the most recent valid points feed the motion estimate.
    pub reference_points: usize,
    /// How far ahead to project.
    pub prediction_minutes: f64,
    pub is_enabled: bool,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            reference_points: 2,
            prediction_minutes: 5.0,
            is_enabled: false,
        }
    }
}

impl PredictionConfig {
    pub fn validate(&self) -> TrackResult<()> {
        if self.reference_points < 2 {
            return Err(TrackError::InvalidConfig(format!(
                "referencePoints must be at least 2, got {}",
                self.reference_points
            )));
        }
        if !self.prediction_minutes.is_finite() || self.prediction_minutes <= 0.0 {
            return Err(TrackError::InvalidConfig(format!(
                "predictionMinutes must be positive, got {}",
                self.prediction_minutes
            )));
        }
        Ok(())
    }
}

/// Forward-projected position for one machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictedPosition {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
    /// 0 (no trust) to 1 (perfectly steady motion).
    pub confidence: f64,
    /// km/h
    pub speed: f64,
    /// Degrees clockwise from true north, [0, 360).
    pub heading: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_disabled_two_points_five_minutes() {
        let config = PredictionConfig::default();
        assert!(!config.is_enabled);
        assert_eq!(config.reference_points, 2);
        assert_eq!(config.prediction_minutes, 5.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let mut config = PredictionConfig {
            reference_points: 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.reference_points = 3;
        config.prediction_minutes = 0.0;
        assert!(config.validate().is_err());

        config.prediction_minutes = f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_uses_camel_case_on_the_wire() {
        let config: PredictionConfig = serde_json::from_str(
            r#"{"referencePoints": 4, "predictionMinutes": 10, "isEnabled": true}"#,
        )
        .unwrap();
        assert_eq!(config.reference_points, 4);
        assert_eq!(config.prediction_minutes, 10.0);
        assert!(config.is_enabled);
    }
}
