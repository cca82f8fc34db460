//! Trained model artifact: the model, its fitted scaler and the feature
//! contract it was trained under, persisted as one JSON file.
//!
//! - Writes are atomic (write `.tmp`, rename into place)
//! - Loads verify format version, contract hash and shapes

use super::linear::LinearSequenceModel;
use super::{ModelError, SequenceModel};
use crate::config::PipelineConfig;
use crate::domain::Timeframe;
use crate::features::MinMaxScaler;
use chrono::{DateTime, Utc};
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub contract: PipelineConfig,
    pub contract_hash: String,
    pub scaler: MinMaxScaler,
    pub model: LinearSequenceModel,
    pub symbol: String,
    pub timeframe: Timeframe,
    pub trained_at: DateTime<Utc>,
    pub training_samples: usize,
    pub final_loss: f64,
}

impl ModelArtifact {
    pub fn new(
        contract: PipelineConfig,
        scaler: MinMaxScaler,
        model: LinearSequenceModel,
        symbol: String,
        timeframe: Timeframe,
        training_samples: usize,
        final_loss: f64,
    ) -> Self {
        let contract_hash = contract.contract_hash();
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            contract,
            contract_hash,
            scaler,
            model,
            symbol,
            timeframe,
            trained_at: Utc::now(),
            training_samples,
            final_loss,
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_vec_pretty(self)?;
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            ModelError::Io(e)
        })?;
        tracing::info!(path = %path.display(), "model artifact saved");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let bytes = fs::read(path)?;
        let artifact: Self = serde_json::from_slice(&bytes)?;
        artifact.verify()?;
        tracing::debug!(
            path = %path.display(),
            contract = %artifact.contract.short_hash(),
            "model artifact loaded"
        );
        Ok(artifact)
    }

    /// Internal consistency of a deserialized artifact.
    pub fn verify(&self) -> Result<(), ModelError> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ModelError::UnsupportedVersion {
                expected: ARTIFACT_FORMAT_VERSION,
                found: self.format_version,
            });
        }
        if self.contract.contract_hash() != self.contract_hash {
            return Err(ModelError::Corrupt(
                "contract hash does not match embedded contract".into(),
            ));
        }
        self.contract
            .validate()
            .map_err(|e| ModelError::Corrupt(e.to_string()))?;
        let n_features = self.contract.n_features();
        if self.scaler.n_features() != n_features {
            return Err(ModelError::Corrupt(format!(
                "scaler has {} features, contract has {n_features}",
                self.scaler.n_features()
            )));
        }
        let expected = (self.contract.window_size, n_features);
        if self.model.input_shape() != expected {
            return Err(ModelError::Corrupt(format!(
                "model shape {:?} does not match contract {expected:?}",
                self.model.input_shape()
            )));
        }
        Ok(())
    }

    /// Whether this artifact was trained under `config`.
    pub fn matches(&self, config: &PipelineConfig) -> bool {
        self.contract_hash == config.contract_hash()
    }

    /// Predict the next close in price units from a scaled window.
    pub fn predict_close(&self, window: ArrayView2<'_, f64>) -> Result<f64, ModelError> {
        let scaled = self.model.predict(window)?;
        let target = self
            .contract
            .target_index()
            .ok_or_else(|| ModelError::Corrupt("contract has no close column".into()))?;
        let price = self.scaler.inverse_value(target, scaled);
        if !price.is_finite() {
            return Err(ModelError::NonFinite);
        }
        Ok(price)
    }
}
