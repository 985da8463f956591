use crate::workflow::runner::{MachineOverlay, WorkflowResult};
use serde::{Deserialize, Serialize};
use trackcore::track::GradientField;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VisualizationModel {
    pub gradient_field: Option<GradientField>,
    pub machines: Vec<MachineOverlay>,
    pub prediction_count: usize,
    pub segment_count: usize,
}

impl VisualizationModel {
    pub fn from_result(result: &WorkflowResult, gradient_field: Option<GradientField>) -> Self {
        Self {
            gradient_field,
            machines: result.overlays.clone(),
            prediction_count: result
                .overlays
                .iter()
                .filter(|overlay| overlay.prediction.is_some())
                .count(),
            segment_count: result.overlays.iter().map(|o| o.segments.len()).sum(),
        }
    }
}
