use crate::ingest::feed::MachineTracks;
use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use trackcore::gradient::{GradientEncoder, GradientSegment, Legend};
use trackcore::prediction::{PredictedPosition, PredictionEngine};
use trackcore::telemetry::{MetricsRecorder, MetricsSnapshot};
use trackcore::track::TelemetryPoint;

/// Everything the map layer draws for one machine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MachineOverlay {
    pub machine_id: String,
    pub point_count: usize,
    pub usable_points: usize,
    pub prediction: Option<PredictedPosition>,
    pub segments: Vec<GradientSegment>,
    pub legend: Option<Legend>,
}

pub struct WorkflowResult {
    pub overlays: Vec<MachineOverlay>,
    pub metrics: MetricsSnapshot,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    fn overlay_for(
        &self,
        machine_id: &str,
        track: &[TelemetryPoint],
        engine: &PredictionEngine,
        encoder: &GradientEncoder,
        metrics: &MetricsRecorder,
    ) -> MachineOverlay {
        let prediction = engine.predict(track);
        if engine.config().is_enabled {
            match prediction {
                Some(_) => metrics.record_prediction(),
                None => metrics.record_declined(),
            }
        }

        let field = self.config.gradient_field;
        let segments = encoder.segment_path(track, field, self.config.subdivisions);
        metrics.record_segments(segments.len());

        let usable: Vec<TelemetryPoint> = track.iter().filter(|p| p.is_usable()).cloned().collect();
        let legend = if segments.is_empty() {
            None
        } else {
            field.and_then(|field| encoder.legend(&usable, field, self.config.legend_steps))
        };

        MachineOverlay {
            machine_id: machine_id.to_string(),
            point_count: track.len(),
            usable_points: usable.len(),
            prediction,
            segments,
            legend,
        }
    }

    pub fn execute(&self, tracks: &MachineTracks) -> anyhow::Result<WorkflowResult> {
        let prediction_config = self.config.to_prediction_config();
        prediction_config
            .validate()
            .context("validating prediction config")?;

        let engine = PredictionEngine::new(prediction_config);
        let encoder = GradientEncoder::new(self.config.palette_table());

        let metrics = MetricsRecorder::new();
        let overlays = tracks
            .iter()
            .map(|(machine_id, track)| {
                self.overlay_for(machine_id, track, &engine, &encoder, &metrics)
            })
            .collect();

        Ok(WorkflowResult {
            overlays,
            metrics: metrics.snapshot(),
        })
    }
}
