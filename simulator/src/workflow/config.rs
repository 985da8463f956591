use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use trackcore::gradient::encoder::DEFAULT_SUBDIVISIONS;
use trackcore::gradient::PaletteTable;
use trackcore::prediction::PredictionConfig;
use trackcore::track::GradientField;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkflowConfig {
    pub reference_points: usize,
    pub prediction_minutes: f64,
    pub prediction_enabled: bool,
    /// `None` draws the flat track.
    pub gradient_field: Option<GradientField>,
    pub subdivisions: usize,
    pub legend_steps: usize,
    /// Register water/air temperature and air pressure palettes as well.
    pub environmental_fields: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        let prediction = PredictionConfig::default();
        Self {
            reference_points: prediction.reference_points,
            prediction_minutes: prediction.prediction_minutes,
            prediction_enabled: prediction.is_enabled,
            gradient_field: None,
            subdivisions: DEFAULT_SUBDIVISIONS,
            legend_steps: 50,
            environmental_fields: false,
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        config
            .to_prediction_config()
            .validate()
            .with_context(|| format!("validating workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(
        reference_points: usize,
        prediction_minutes: f64,
        prediction_enabled: bool,
        gradient_field: Option<GradientField>,
        subdivisions: usize,
    ) -> Self {
        Self {
            reference_points,
            prediction_minutes,
            prediction_enabled,
            gradient_field,
            subdivisions,
            ..Default::default()
        }
    }

    pub fn to_prediction_config(&self) -> PredictionConfig {
        PredictionConfig {
            reference_points: self.reference_points,
            prediction_minutes: self.prediction_minutes,
            is_enabled: self.prediction_enabled,
        }
    }

    pub fn palette_table(&self) -> PaletteTable {
        if self.environmental_fields {
            PaletteTable::environmental()
        } else {
            PaletteTable::default()
        }
    }
}
