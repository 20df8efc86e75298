use std::{fs::File, io::BufReader, path::Path};

use chrono::{DateTime, Utc};
use flapevo_controller::{Architecture, ArchitectureError, Controller};
use serde::{Deserialize, Serialize};

use super::ModelFileError;

pub const MODEL_TYPE: &str = "enhanced_neural_network";

/// Exported controller weights with the shape they were trained for.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WeightExport {
    pub weights: Vec<f32>,
    pub fitness: f32,
    pub architecture: ArchitectureInfo,
    pub metadata: ExportMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArchitectureInfo {
    pub num_features: usize,
    pub hidden_size: usize,
    pub total_weights: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExportMetadata {
    pub export_timestamp: DateTime<Utc>,
    pub model_type: String,
}

impl From<Architecture> for ArchitectureInfo {
    fn from(architecture: Architecture) -> Self {
        Self {
            num_features: architecture.num_features(),
            hidden_size: architecture.hidden_size(),
            total_weights: architecture.total_weights(),
        }
    }
}

impl WeightExport {
    #[must_use]
    pub fn new(controller: &Controller, fitness: f32, exported_at: DateTime<Utc>) -> Self {
        Self {
            weights: controller.weights().to_vec(),
            fitness,
            architecture: controller.architecture().into(),
            metadata: ExportMetadata {
                export_timestamp: exported_at,
                model_type: MODEL_TYPE.to_owned(),
            },
        }
    }

    /// Reads and validates an export file.
    pub fn open(path: &Path) -> Result<Self, ModelFileError> {
        let file = File::open(path).map_err(|e| ModelFileError::io(path, e))?;
        let export: Self = serde_json::from_reader(BufReader::new(file))
            .map_err(|source| ModelFileError::json(path, source))?;
        export
            .validate()
            .map_err(|source| ModelFileError::architecture(path, source))?;
        Ok(export)
    }

    /// Checks that the declared architecture is supported and matches the
    /// weight count.
    pub fn validate(&self) -> Result<Architecture, ArchitectureError> {
        let ArchitectureInfo {
            num_features,
            hidden_size,
            total_weights,
        } = self.architecture;
        let architecture = Architecture::new(num_features, hidden_size)?;
        if total_weights != architecture.total_weights() {
            return Err(ArchitectureError::WeightCountMismatch {
                expected: architecture.total_weights(),
                actual: total_weights,
            });
        }
        architecture.check_weight_count(self.weights.len())?;
        Ok(architecture)
    }

    /// Rebuilds the controller, carrying over the exported fitness.
    pub fn to_controller(&self) -> Result<Controller, ArchitectureError> {
        let architecture = self.validate()?;
        let controller = Controller::from_weights(architecture, self.weights.clone())?;
        Ok(controller.with_fitness(self.fitness))
    }
}
