use crate::ingest::comment::resolve_gps_status;
use anyhow::{bail, Context};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use trackcore::track::{parse_timestamp, TelemetryPoint};

/// Per-machine tracks as handed to the engines.
pub type MachineTracks = BTreeMap<String, Vec<TelemetryPoint>>;

/// Raw row as served by the dashboard feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryRow {
    pub timestamp: String,
    #[serde(default)]
    pub machine_time: Option<String>,
    #[serde(default)]
    pub machine_id: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: f64,
    #[serde(default)]
    pub satellites: u32,
    #[serde(default)]
    pub battery: Option<f64>,
    #[serde(default)]
    pub water_temperature: Option<f64>,
    #[serde(default)]
    pub air_temperature: Option<f64>,
    #[serde(default)]
    pub air_pressure: Option<f64>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default, rename = "gps_error")]
    pub gps_error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineFeed {
    pub machine_id: String,
    #[serde(default)]
    pub data: Vec<TelemetryRow>,
}

/// Envelope of both the all-machines and the single-machine responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub machines: Option<Vec<MachineFeed>>,
    #[serde(default)]
    pub machine_id: Option<String>,
    #[serde(default)]
    pub data: Option<Vec<TelemetryRow>>,
}

impl TelemetryRow {
    /// Converts the row, or `None` when its timestamp cannot be parsed.
    pub fn into_point(self, fallback_machine: &str) -> Option<TelemetryPoint> {
        let timestamp = match parse_timestamp(&self.timestamp) {
            Ok(ts) => ts,
            Err(err) => {
                warn!("skipping row for {}: {}", fallback_machine, err);
                return None;
            }
        };
        let gps_status = resolve_gps_status(self.gps_error.as_deref(), self.comment.as_deref());

        Some(TelemetryPoint {
            timestamp,
            machine_time: self.machine_time,
            machine_id: self
                .machine_id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| fallback_machine.to_string()),
            latitude: self.latitude,
            longitude: self.longitude,
            altitude: self.altitude,
            satellites: self.satellites,
            battery: self.battery,
            water_temperature: self.water_temperature,
            air_temperature: self.air_temperature,
            air_pressure: self.air_pressure,
            comment: self.comment,
            gps_status,
        })
    }
}

fn push_rows(tracks: &mut MachineTracks, machine_id: &str, rows: Vec<TelemetryRow>) {
    for row in rows {
        if let Some(point) = row.into_point(machine_id) {
            tracks
                .entry(point.machine_id.clone())
                .or_default()
                .push(point);
        }
    }
}

/// Groups a feed response into per-machine tracks.
pub fn tracks_from_feed(response: FeedResponse) -> anyhow::Result<MachineTracks> {
    if response.status.eq_ignore_ascii_case("error") {
        bail!(
            "feed reported an error: {}",
            response.message.unwrap_or_else(|| "unknown error".into())
        );
    }

    let mut tracks = MachineTracks::new();
    for machine in response.machines.unwrap_or_default() {
        tracks.entry(machine.machine_id.clone()).or_default();
        push_rows(&mut tracks, &machine.machine_id, machine.data);
    }
    if let Some(rows) = response.data {
        let machine_id = response.machine_id.unwrap_or_default();
        push_rows(&mut tracks, &machine_id, rows);
    }
    Ok(tracks)
}

pub fn parse_feed(contents: &str) -> anyhow::Result<MachineTracks> {
    let response: FeedResponse =
        serde_json::from_str(contents).context("decoding feed response")?;
    tracks_from_feed(response)
}

pub fn load_feed<P: AsRef<Path>>(path: P) -> anyhow::Result<MachineTracks> {
    let path_ref = path.as_ref();
    let contents = fs::read_to_string(path_ref)
        .with_context(|| format!("reading feed {}", path_ref.display()))?;
    parse_feed(&contents).with_context(|| format!("parsing feed {}", path_ref.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use trackcore::track::GpsStatus;

    const ALL_MACHINES: &str = r#"{
        "status": "success",
        "machines": [
            {
                "machineId": "boat-1",
                "data": [
                    {"timestamp": "2024-05-01T10:01:00Z", "machineId": "boat-1",
                     "latitude": 35.001, "longitude": 135.0, "altitude": 3,
                     "satellites": 8, "battery": 4.1,
                     "comment": "MODE:NORMAL,GPS_ERROR:NONE"},
                    {"timestamp": "2024-05-01T10:00:00Z", "machineId": "boat-1",
                     "latitude": 35.0, "longitude": 135.0, "altitude": 2,
                     "satellites": 7, "comment": "MODE:NORMAL,GPS_ERROR:ERROR"},
                    {"timestamp": "not a time", "latitude": 0, "longitude": 0}
                ]
            },
            {"machineId": "boat-2", "data": []}
        ]
    }"#;

    #[test]
    fn feed_groups_rows_by_machine() {
        let tracks = parse_feed(ALL_MACHINES).unwrap();
        assert_eq!(tracks.len(), 2);

        let boat = &tracks["boat-1"];
        assert_eq!(boat.len(), 2);
        assert_eq!(boat[0].gps_status, Some(GpsStatus::Valid));
        assert_eq!(boat[1].gps_status, Some(GpsStatus::Invalid));
        assert_eq!(boat[0].battery, Some(4.1));
        assert!(tracks["boat-2"].is_empty());
    }

    #[test]
    fn single_machine_response_uses_envelope_id() {
        let raw = r#"{
            "status": "success",
            "machineId": "rover",
            "data": [
                {"timestamp": "2024-05-01T10:00:00+09:00", "latitude": 35.0,
                 "longitude": 135.0, "gps_error": "GPS_ERROR:NONE"}
            ]
        }"#;
        let tracks = parse_feed(raw).unwrap();
        let rover = &tracks["rover"];
        assert_eq!(rover[0].machine_id, "rover");
        assert_eq!(rover[0].timestamp.to_rfc3339(), "2024-05-01T01:00:00+00:00");
        assert_eq!(rover[0].gps_status, Some(GpsStatus::Valid));
    }

    #[test]
    fn error_status_is_reported() {
        let err = parse_feed(r#"{"status": "error", "message": "quota"}"#).unwrap_err();
        assert!(err.to_string().contains("quota"));
    }

    #[test]
    fn load_feed_reads_file() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(ALL_MACHINES.as_bytes()).unwrap();
        let path = temp.into_temp_path();
        let tracks = load_feed(&path).unwrap();
        assert!(tracks.contains_key("boat-1"));
    }
}
