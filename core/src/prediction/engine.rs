use crate::math::geodesy::destination;
use crate::math::stats::StatsHelper;
use crate::prediction::vector::motion_vectors;
use crate::prediction::{PredictedPosition, PredictionConfig};
use crate::prelude::LatLng;
use crate::telemetry::log::LogManager;
use crate::track::{sorted_by_time, usable_points, TelemetryPoint, TimeOrder};
use chrono::Duration;

/// Dead-reckoning predictor bound to one configuration.
pub struct PredictionEngine {
    config: PredictionConfig,
    logger: LogManager,
}

impl PredictionEngine {
    pub fn new(config: PredictionConfig) -> Self {
        Self {
            config,
            logger: LogManager::new("PredictionEngine"),
        }
    }

    pub fn config(&self) -> &PredictionConfig {
        &self.config
    }

    /// Projects the track forward, or `None` when the input cannot support a
    /// motion estimate (disabled or invalid config, fewer than two usable
    /// points, no elapsed time).
    pub fn predict(&self, track: &[TelemetryPoint]) -> Option<PredictedPosition> {
        let config = &self.config;
        if !config.is_enabled {
            return None;
        }
        if let Err(err) = config.validate() {
            self.logger.declined(&err.to_string());
            return None;
        }

        let newest_first = sorted_by_time(usable_points(track), TimeOrder::NewestFirst);
        let k = config.reference_points.min(newest_first.len());
        if k < 2 {
            self.logger.declined(&format!(
                "{} usable points of {} supplied",
                newest_first.len(),
                track.len()
            ));
            return None;
        }
        let reference = &newest_first[..k];

        let vectors = motion_vectors(reference);
        let avg_speed = match StatsHelper::weighted_mean(
            vectors.iter().map(|v| (v.speed_kmh, v.time_span_min)),
        ) {
            Some(speed) => speed,
            None => {
                self.logger.declined("reference points share one timestamp");
                return None;
            }
        };

        let bearings: Vec<f64> = vectors.iter().map(|v| v.bearing_deg).collect();
        let speeds: Vec<f64> = vectors.iter().map(|v| v.speed_kmh).collect();
        let avg_bearing = StatsHelper::circular_mean_deg(&bearings);

        let speed_variation = StatsHelper::coefficient_of_variation(&speeds);
        let bearing_variation = StatsHelper::circular_variation(&bearings);
        let confidence = (1.0 - (speed_variation + bearing_variation) / 2.0).clamp(0.0, 1.0);

        let latest = reference[0];
        let travel_km = avg_speed * config.prediction_minutes / 60.0;
        let projected = destination(
            LatLng::new(latest.latitude, latest.longitude),
            travel_km,
            avg_bearing,
        );

        let horizon_ms = (config.prediction_minutes * 60_000.0).round() as i64;
        let timestamp = match Duration::try_milliseconds(horizon_ms)
            .and_then(|horizon| latest.timestamp.checked_add_signed(horizon))
        {
            Some(ts) => ts,
            None => {
                self.logger.declined("prediction horizon overflows the clock");
                return None;
            }
        };

        self.logger.record(&format!(
            "{} -> ({:.6}, {:.6}) at {:.2} km/h heading {:.1} confidence {:.2}",
            latest.machine_id, projected.lat, projected.lng, avg_speed, avg_bearing, confidence
        ));

        Some(PredictedPosition {
            latitude: projected.lat,
            longitude: projected.lng,
            timestamp,
            confidence,
            speed: avg_speed.max(0.0),
            heading: avg_bearing,
        })
    }
}

/// One-shot form of [`PredictionEngine::predict`].
pub fn predict(track: &[TelemetryPoint], config: &PredictionConfig) -> Option<PredictedPosition> {
    PredictionEngine::new(config.clone()).predict(track)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::geodesy::{destination, haversine_km};
    use crate::track::GpsStatus;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
    }

    fn point(seconds: i64, lat: f64, lng: f64) -> TelemetryPoint {
        TelemetryPoint::new("m1", at(seconds), lat, lng)
    }

    fn enabled(reference_points: usize, prediction_minutes: f64) -> PredictionConfig {
        PredictionConfig {
            reference_points,
            prediction_minutes,
            is_enabled: true,
        }
    }

    /// Track heading due north with the given per-minute distances (km).
    fn northbound(step_km: &[f64]) -> Vec<TelemetryPoint> {
        let mut position = LatLng::new(35.0, 135.0);
        let mut track = vec![point(0, position.lat, position.lng)];
        for (i, km) in step_km.iter().enumerate() {
            position = destination(position, *km, 0.0);
            track.push(point(60 * (i as i64 + 1), position.lat, position.lng));
        }
        track
    }

    #[test]
    fn two_point_northbound_track() {
        let track = vec![point(0, 35.0, 135.0), point(60, 35.001, 135.0)];
        let predicted = predict(&track, &enabled(2, 5.0)).unwrap();

        assert!((predicted.speed - 6.67).abs() < 0.02, "speed {}", predicted.speed);
        assert!(predicted.heading < 1e-6 || predicted.heading > 360.0 - 1e-6);
        assert_eq!(predicted.confidence, 1.0);
        assert!(predicted.latitude > 35.001);
        assert!((predicted.longitude - 135.0).abs() < 1e-9);
        assert_eq!(predicted.timestamp, at(60 + 300));

        // five minutes at ~6.67 km/h
        let travelled = haversine_km(
            LatLng::new(35.001, 135.0),
            LatLng::new(predicted.latitude, predicted.longitude),
        );
        assert!((travelled - 0.556).abs() < 0.002, "travelled {travelled}");
    }

    #[test]
    fn disabled_config_returns_none() {
        let track = vec![point(0, 35.0, 135.0), point(60, 35.001, 135.0)];
        let config = PredictionConfig {
            is_enabled: false,
            ..enabled(2, 5.0)
        };
        assert!(predict(&track, &config).is_none());
    }

    #[test]
    fn single_point_returns_none() {
        let track = vec![point(0, 35.0, 135.0)];
        assert!(predict(&track, &enabled(2, 5.0)).is_none());
        assert!(predict(&track, &enabled(10, 60.0)).is_none());
        assert!(predict(&[], &enabled(2, 5.0)).is_none());
    }

    #[test]
    fn all_invalid_gps_points_return_none() {
        let track: Vec<TelemetryPoint> = northbound(&[0.1, 0.1, 0.1])
            .into_iter()
            .map(|p| p.with_gps_status(GpsStatus::Invalid))
            .collect();
        assert!(predict(&track, &enabled(4, 5.0)).is_none());
    }

    #[test]
    fn invalid_points_are_skipped_not_counted() {
        let mut track = vec![point(0, 35.0, 135.0), point(60, 35.001, 135.0)];
        // a bogus fix newer than the rest must not be used as the anchor
        track.push(point(120, 10.0, 10.0).with_gps_status(GpsStatus::Invalid));
        let predicted = predict(&track, &enabled(3, 5.0)).unwrap();
        assert!(predicted.latitude > 35.001 && predicted.latitude < 35.01);
        assert_eq!(predicted.timestamp, at(60 + 300));
    }

    #[test]
    fn invalid_config_returns_none() {
        let track = northbound(&[0.1, 0.1]);
        for minutes in [f64::NAN, 0.0, -5.0, f64::INFINITY] {
            assert!(predict(&track, &enabled(2, minutes)).is_none(), "minutes {minutes}");
        }
        assert!(predict(&track, &enabled(0, 5.0)).is_none());
        assert!(predict(&track, &enabled(1, 5.0)).is_none());
        assert!(predict(&track, &enabled(2, 5.0)).is_some());
    }

    #[test]
    fn shared_timestamps_return_none() {
        let track = vec![
            point(0, 35.0, 135.0),
            point(0, 35.001, 135.0),
            point(0, 35.002, 135.0),
        ];
        assert!(predict(&track, &enabled(3, 5.0)).is_none());
    }

    #[test]
    fn unordered_input_is_sorted_before_use() {
        let mut track = northbound(&[0.2, 0.2, 0.2]);
        track.reverse();
        track.swap(0, 2);
        let predicted = predict(&track, &enabled(4, 1.0)).unwrap();
        assert!((predicted.speed - 12.0).abs() < 1e-6);
        assert!(predicted.confidence > 0.999);
        assert_eq!(predicted.timestamp, at(180 + 60));
    }

    #[test]
    fn only_most_recent_reference_points_are_used() {
        // fast early leg, slow recent legs
        let track = northbound(&[5.0, 0.1, 0.1]);
        let predicted = predict(&track, &enabled(3, 5.0)).unwrap();
        assert!((predicted.speed - 6.0).abs() < 1e-6, "speed {}", predicted.speed);
    }

    #[test]
    fn stationary_machine_predicts_in_place() {
        let track = vec![point(0, 35.0, 135.0), point(60, 35.0, 135.0)];
        let predicted = predict(&track, &enabled(2, 5.0)).unwrap();
        assert_eq!(predicted.speed, 0.0);
        assert_eq!(predicted.heading, 0.0);
        assert!((predicted.latitude - 35.0).abs() < 1e-12);
        // speed variation maxes out, heading variation is zero
        assert!((predicted.confidence - 0.5).abs() < 1e-12);
    }

    #[test]
    fn heading_averages_across_north() {
        // one leg towards 350 degrees, the next towards 10 degrees
        let start = LatLng::new(35.0, 135.0);
        let mid = destination(start, 1.0, 350.0);
        let end = destination(mid, 1.0, 10.0);
        let track = vec![
            point(0, start.lat, start.lng),
            point(60, mid.lat, mid.lng),
            point(120, end.lat, end.lng),
        ];
        let predicted = predict(&track, &enabled(3, 5.0)).unwrap();
        let gap = predicted.heading.min(360.0 - predicted.heading);
        assert!(gap < 0.05, "heading {}", predicted.heading);
        assert!(predicted.latitude > end.lat);
    }

    #[test]
    fn wider_speed_spread_lowers_confidence() {
        let spreads = [0.0, 0.05, 0.1, 0.2, 0.4];
        let confidences: Vec<f64> = spreads
            .iter()
            .map(|spread| {
                let track = northbound(&[0.5 - spread, 0.5 + spread]);
                predict(&track, &enabled(3, 5.0)).unwrap().confidence
            })
            .collect();

        for pair in confidences.windows(2) {
            assert!(pair[1] < pair[0], "confidences {confidences:?}");
        }
    }

    #[test]
    fn outputs_stay_in_range() {
        let tracks = vec![
            northbound(&[0.3, 2.0, 0.01, 1.0]),
            vec![
                point(0, 0.0, 179.999),
                point(30, 0.0, -179.999),
                point(90, 0.001, -179.998),
            ],
            vec![
                point(0, 10.0, 10.0),
                point(10, 10.01, 10.0),
                point(20, 10.0, 10.0),
                point(30, 10.01, 10.0),
            ],
            vec![
                point(0, -45.0, 60.0),
                point(600, -45.1, 60.2),
                point(660, -45.2, 60.1),
            ],
        ];

        for track in tracks {
            for reference_points in 2..=5 {
                let predicted = predict(&track, &enabled(reference_points, 15.0)).unwrap();
                assert!((0.0..=1.0).contains(&predicted.confidence));
                assert!((0.0..360.0).contains(&predicted.heading));
                assert!(predicted.speed >= 0.0);
                assert!((-180.0..180.0).contains(&predicted.longitude));
            }
        }
    }

    #[test]
    fn engine_is_reusable_across_tracks() {
        let engine = PredictionEngine::new(enabled(2, 5.0));
        assert!(engine.predict(&northbound(&[0.1])).is_some());
        assert!(engine.predict(&[]).is_none());
        assert_eq!(engine.config().reference_points, 2);
    }
}
