// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's gzipped
// MessagePack recorder at full precision, so a restored model
// samples exactly the digits the trained one did.
//
// What gets saved:
//   1. model_best.mpk.gz  — weights of the best model so far
//                           (lowest test loss)
//   2. best_epoch.json    — which epoch produced those weights
//   3. train_config.json  — ndigit, seed and model architecture
//
// The config is needed to rebuild a model of the right shape
// before the weights can be loaded into it, and to regenerate
// the same train/test split for an exam.
//
// File layout:
//   checkpoints/
//     model_best.mpk.gz
//     best_epoch.json
//     train_config.json
//     metrics.csv          ← written by MetricsLogger
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkGzFileRecorder, Recorder},
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::GptModel;

const MODEL_FILE:  &str = "model_best";
const EPOCH_FILE:  &str = "best_epoch.json";
const CONFIG_FILE: &str = "train_config.json";

type ModelRecorder = NamedMpkGzFileRecorder<FullPrecisionSettings>;

/// Manages saving and loading of model checkpoints.
/// All files are stored in the configured directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager, creating the directory if needed.
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    /// Save model weights as the new best, tagged with its epoch.
    ///
    /// The recorder serialises the record to MessagePack and
    /// gzips it; the extension is added by the recorder.
    pub fn save_model<B: Backend>(
        &self,
        model: &GptModel<B>,
        epoch: usize,
    ) -> Result<()> {
        let path = self.dir.join(MODEL_FILE);

        ModelRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| {
                format!("Failed to save checkpoint to '{}'", path.display())
            })?;

        let epoch_path = self.dir.join(EPOCH_FILE);
        fs::write(&epoch_path, serde_json::to_string(&epoch)?)
            .with_context(|| format!("Failed to write {EPOCH_FILE}"))?;

        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Load the best saved weights into `model`.
    ///
    /// The model must have the architecture recorded in the
    /// saved config or loading will fail.
    pub fn load_model<B: Backend>(
        &self,
        model:  GptModel<B>,
        device: &B::Device,
    ) -> Result<GptModel<B>> {
        let epoch = self.best_epoch()?;
        let path  = self.dir.join(MODEL_FILE);

        tracing::info!("Loading checkpoint from epoch {}", epoch);

        let record = ModelRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display())
            })?;

        Ok(model.load_record(record))
    }

    /// Save the training configuration to JSON.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| {
                format!("Cannot write config to '{}'", path.display())
            })?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    /// Load the training configuration from JSON.
    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(CONFIG_FILE);

        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Make sure you have run 'train' first.",
                    path.display()
                )
            })?;

        serde_json::from_str(&json)
            .with_context(|| format!("Malformed config in '{}'", path.display()))
    }

    /// Epoch of the saved best model.
    pub fn best_epoch(&self) -> Result<usize> {
        let path = self.dir.join(EPOCH_FILE);

        let s = fs::read_to_string(&path)
            .with_context(|| {
                format!("Cannot find '{EPOCH_FILE}'. Have you run 'train' first?")
            })?;

        Ok(serde_json::from_str::<usize>(&s)?)
    }
}
