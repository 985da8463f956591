use crate::prelude::{TrackError, TrackResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// GPS usability flag attached by the ingestion layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum GpsStatus {
    Valid,
    Invalid,
}

/// One observation from one machine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryPoint {
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_time: Option<String>,
    pub machine_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub satellites: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_pressure: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gps_status: Option<GpsStatus>,
}

impl TelemetryPoint {
    /// Minimal point with the required fields; optional sensors left empty.
    pub fn new(
        machine_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            timestamp,
            machine_time: None,
            machine_id: machine_id.into(),
            latitude,
            longitude,
            altitude: 0.0,
            satellites: 0,
            battery: None,
            water_temperature: None,
            air_temperature: None,
            air_pressure: None,
            comment: None,
            gps_status: None,
        }
    }

    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = altitude;
        self
    }

    pub fn with_satellites(mut self, satellites: u32) -> Self {
        self.satellites = satellites;
        self
    }

    pub fn with_battery(mut self, battery: f64) -> Self {
        self.battery = Some(battery);
        self
    }

    pub fn with_gps_status(mut self, status: GpsStatus) -> Self {
        self.gps_status = Some(status);
        self
    }

    /// Points without a status are tolerated; only an explicit `Invalid` excludes.
    pub fn is_usable(&self) -> bool {
        self.gps_status != Some(GpsStatus::Invalid)
    }

    /// Finite value of `field`, if the point carries one.
    pub fn value(&self, field: GradientField) -> Option<f64> {
        let raw = match field {
            GradientField::Altitude => Some(self.altitude),
            GradientField::Satellites => Some(f64::from(self.satellites)),
            GradientField::Battery => self.battery,
            GradientField::WaterTemperature => self.water_temperature,
            GradientField::AirTemperature => self.air_temperature,
            GradientField::AirPressure => self.air_pressure,
        };
        raw.filter(|v| v.is_finite())
    }
}

/// Numeric fields that can drive a gradient rendering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum GradientField {
    Altitude,
    Satellites,
    Battery,
    WaterTemperature,
    AirTemperature,
    AirPressure,
}

impl GradientField {
    pub const ALL: [GradientField; 6] = [
        GradientField::Altitude,
        GradientField::Satellites,
        GradientField::Battery,
        GradientField::WaterTemperature,
        GradientField::AirTemperature,
        GradientField::AirPressure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GradientField::Altitude => "altitude",
            GradientField::Satellites => "satellites",
            GradientField::Battery => "battery",
            GradientField::WaterTemperature => "waterTemperature",
            GradientField::AirTemperature => "airTemperature",
            GradientField::AirPressure => "airPressure",
        }
    }
}

impl fmt::Display for GradientField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GradientField {
    type Err = TrackError;

    fn from_str(s: &str) -> TrackResult<Self> {
        let wanted = s.trim();
        // accepts camelCase, snake_case and kebab-case spellings
        let folded = wanted.replace(['_', '-'], "");
        GradientField::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(&folded))
            .ok_or_else(|| TrackError::UnknownField(wanted.to_string()))
    }
}

/// Sort direction for [`sorted_by_time`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOrder {
    OldestFirst,
    NewestFirst,
}

/// Points whose GPS fix may be used for prediction or rendering.
pub fn usable_points(track: &[TelemetryPoint]) -> Vec<&TelemetryPoint> {
    track.iter().filter(|point| point.is_usable()).collect()
}

/// Stable sort by capture time; the feed gives no ordering guarantee.
pub fn sorted_by_time<'a>(
    mut points: Vec<&'a TelemetryPoint>,
    order: TimeOrder,
) -> Vec<&'a TelemetryPoint> {
    match order {
        TimeOrder::OldestFirst => points.sort_by_key(|point| point.timestamp),
        TimeOrder::NewestFirst => points.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
    }
    points
}

/// Parses an RFC 3339 capture time into UTC.
pub fn parse_timestamp(raw: &str) -> TrackResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|err| TrackError::InvalidTimestamp(format!("{raw}: {err}")))
}
