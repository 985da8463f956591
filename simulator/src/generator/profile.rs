use crate::generator::template::{altitude_wave, battery_drain};
use crate::ingest::comment::gps_status_from_comment;
use crate::ingest::feed::MachineTracks;
use anyhow::Context;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use trackcore::math::geodesy::destination;
use trackcore::track::TelemetryPoint;
use trackcore::LatLng;

/// Configuration for generating synthetic machine tracks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub machines: usize,
    pub points: usize,
    pub interval_secs: u64,
    pub speed_kmh: f64,
    pub speed_jitter_kmh: f64,
    pub heading_deg: f64,
    pub heading_jitter_deg: f64,
    pub origin_lat: f64,
    pub origin_lng: f64,
    pub altitude_base: f64,
    pub altitude_amplitude: f64,
    /// Fraction of samples flagged with a GPS error, [0, 1].
    pub gps_error_rate: f64,
    pub seed: u64,
    pub start: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub scenario: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            machines: 3,
            points: 60,
            interval_secs: 60,
            speed_kmh: 8.0,
            speed_jitter_kmh: 0.5,
            heading_deg: 0.0,
            heading_jitter_deg: 5.0,
            origin_lat: 35.0,
            origin_lng: 135.0,
            altitude_base: 120.0,
            altitude_amplitude: 40.0,
            gps_error_rate: 0.05,
            seed: 0,
            start: None,
            description: None,
            scenario: None,
        }
    }
}

impl GeneratorConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading generator config {}", path_ref.display()))?;
        serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing generator config {}", path_ref.display()))
    }

    fn normalized_machines(&self) -> usize {
        self.machines.max(1)
    }

    fn start_time(&self) -> anyhow::Result<DateTime<Utc>> {
        match self.start {
            Some(start) => Ok(start),
            None => Utc
                .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
                .single()
                .context("building default generator start time"),
        }
    }
}

fn jitter(rng: &mut StdRng, spread: f64) -> f64 {
    if spread > 0.0 {
        rng.gen_range(-spread..=spread)
    } else {
        0.0
    }
}

fn status_comment(gps_ok: bool) -> String {
    if gps_ok {
        "MODE:NORMAL,COMM:OK,GPS:LOCKED,GPS_ERROR:NONE".to_string()
    } else {
        "MODE:NORMAL,COMM:OK,GPS:LOST,GPS_ERROR:ERROR".to_string()
    }
}

fn build_machine_track(
    config: &GeneratorConfig,
    index: usize,
    start: DateTime<Utc>,
    rng: &mut StdRng,
) -> anyhow::Result<Vec<TelemetryPoint>> {
    let machine_id = format!("machine-{:02}", index + 1);
    let fan_out = 360.0 / config.normalized_machines() as f64;
    let heading = config.heading_deg + fan_out * index as f64;
    let interval_secs =
        i64::try_from(config.interval_secs).context("interval_secs does not fit the clock")?;
    let step_hours = config.interval_secs as f64 / 3600.0;

    let altitudes = altitude_wave(
        config.points,
        config.altitude_base,
        config.altitude_amplitude,
        1.0,
    );
    let batteries = battery_drain(config.points, 4.2, 3.4);
    let error_rate = if config.gps_error_rate.is_finite() {
        config.gps_error_rate.clamp(0.0, 1.0)
    } else {
        0.0
    };

    let mut position = LatLng::new(config.origin_lat + 0.01 * index as f64, config.origin_lng);
    let mut track = Vec::with_capacity(config.points);

    for step in 0..config.points {
        if step > 0 {
            let speed = (config.speed_kmh + jitter(rng, config.speed_jitter_kmh)).max(0.0);
            let bearing = heading + jitter(rng, config.heading_jitter_deg);
            position = destination(position, speed * step_hours, bearing);
        }

        let timestamp = interval_secs
            .checked_mul(step as i64)
            .and_then(Duration::try_seconds)
            .and_then(|offset| start.checked_add_signed(offset))
            .context("generated timestamp overflows the clock")?;

        let gps_ok = !rng.gen_bool(error_rate);
        // lost fixes report a scattered position
        let reported = if gps_ok {
            position
        } else {
            LatLng::new(position.lat + jitter(rng, 0.05), position.lng + jitter(rng, 0.05))
        };
        let comment = status_comment(gps_ok);

        let satellites = if gps_ok {
            rng.gen_range(6..=12)
        } else {
            rng.gen_range(0..=3)
        };
        let mut point =
            TelemetryPoint::new(machine_id.clone(), timestamp, reported.lat, reported.lng)
                .with_altitude(altitudes[step])
                .with_satellites(satellites)
                .with_battery(batteries[step]);
        point.gps_status = gps_status_from_comment(&comment);
        point.comment = Some(comment);
        track.push(point);
    }

    Ok(track)
}

pub fn build_tracks_from_config(config: &GeneratorConfig) -> anyhow::Result<MachineTracks> {
    let start = config.start_time()?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut tracks = MachineTracks::new();

    for index in 0..config.normalized_machines() {
        let track = build_machine_track(config, index, start, &mut rng)
            .with_context(|| format!("generating machine {}", index + 1))?;
        if let Some(first) = track.first() {
            tracks.insert(first.machine_id.clone(), track);
        }
    }

    Ok(tracks)
}

#[cfg(test)]
pub fn build_tracks(machines: usize, points: usize) -> anyhow::Result<MachineTracks> {
    let config = GeneratorConfig {
        machines,
        points,
        ..Default::default()
    };
    build_tracks_from_config(&config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackcore::math::geodesy::haversine_km;
    use trackcore::track::GpsStatus;

    #[test]
    fn generator_builds_expected_point_count() {
        let tracks = build_tracks(2, 30).unwrap();
        assert_eq!(tracks.len(), 2);
        assert!(tracks.values().all(|track| track.len() == 30));
        assert!(tracks.contains_key("machine-01"));
    }

    #[test]
    fn generator_is_deterministic_per_seed() {
        let config = GeneratorConfig {
            seed: 42,
            ..Default::default()
        };
        let a = build_tracks_from_config(&config).unwrap();
        let b = build_tracks_from_config(&config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn error_rate_controls_gps_flags() {
        let clean = GeneratorConfig {
            machines: 1,
            points: 20,
            gps_error_rate: 0.0,
            ..Default::default()
        };
        let tracks = build_tracks_from_config(&clean).unwrap();
        assert!(tracks["machine-01"]
            .iter()
            .all(|p| p.gps_status == Some(GpsStatus::Valid)));

        let broken = GeneratorConfig {
            gps_error_rate: 1.0,
            ..clean
        };
        let tracks = build_tracks_from_config(&broken).unwrap();
        assert!(tracks["machine-01"].iter().all(|p| !p.is_usable()));
    }

    #[test]
    fn steady_machine_moves_along_heading() {
        let config = GeneratorConfig {
            machines: 1,
            points: 3,
            speed_kmh: 60.0,
            speed_jitter_kmh: 0.0,
            heading_jitter_deg: 0.0,
            gps_error_rate: 0.0,
            ..Default::default()
        };
        let tracks = build_tracks_from_config(&config).unwrap();
        let track = &tracks["machine-01"];
        // one minute at 60 km/h northwards is one kilometre
        assert!(track[1].latitude > track[0].latitude);
        let leg = haversine_km(
            LatLng::new(track[0].latitude, track[0].longitude),
            LatLng::new(track[1].latitude, track[1].longitude),
        );
        assert!((leg - 1.0).abs() < 1e-9, "leg {leg}");
        assert!((track[2].timestamp - track[0].timestamp).num_seconds() == 120);
    }

    #[test]
    fn generator_config_loads_partial_yaml() {
        use std::io::Write;
        let mut temp = tempfile::NamedTempFile::new().unwrap();
        temp.write_all(b"machines: 5\nseed: 9\nscenario: harbour\n")
            .unwrap();
        let path = temp.into_temp_path();
        let config = GeneratorConfig::load(&path).unwrap();
        assert_eq!(config.machines, 5);
        assert_eq!(config.points, 60);
        assert_eq!(config.scenario.as_deref(), Some("harbour"));
    }
}
