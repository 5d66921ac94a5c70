// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Build train/test splits    (Layer 4 - data)
//   Step 2: Save config                (Layer 6 - infra)
//   Step 3: Run training loop          (Layer 5 - ml)
//   Step 4: Exam on the train split    (Layer 5 - ml)
//   Step 5: Exam on the test split     (Layer 5 - ml)
//
// Reference: Burn Book §5 (Training)

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::data::{
    codec::{block_size, VOCAB_SIZE},
    dataset::AdditionDataset,
    splitter::DEFAULT_SEED,
};
use crate::domain::problem::{check_ndigit, Split};
use crate::domain::traits::ProblemSource;
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger};
use crate::ml::evaluator::{give_exam, ExamReport};
use crate::ml::model::GptConfig;
use crate::ml::trainer::run_training;

/// Batches of the train split graded after training; the train
/// split is large, so it is only spot-checked.
pub const TRAIN_EXAM_MAX_BATCHES: usize = 50;

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run.
// Saved next to the checkpoint so `exam` and `solve` can rebuild
// the same model and regenerate the same split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub ndigit:          usize,
    pub seed:            u64,
    pub checkpoint_dir:  String,
    pub epochs:          usize,
    pub batch_size:      usize,
    pub lr:              f64,
    pub lr_decay:        bool,
    pub warmup_tokens:   u64,
    pub n_layer:         usize,
    pub n_head:          usize,
    pub n_embd:          usize,
    pub dropout:         f64,
    pub weight_decay:    f64,
    pub grad_norm_clip:  f64,
    pub num_workers:     usize,
    pub exam_batch_size: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            ndigit:          2,
            seed:            DEFAULT_SEED,
            checkpoint_dir:  "checkpoints".to_string(),
            epochs:          50,
            batch_size:      512,
            lr:              6e-4,
            lr_decay:        true,
            warmup_tokens:   1024,
            n_layer:         2,
            n_head:          4,
            n_embd:          128,
            dropout:         0.1,
            weight_decay:    0.1,
            grad_norm_clip:  1.0,
            num_workers:     4,
            exam_batch_size: 1024,
        }
    }
}

impl TrainConfig {
    /// Model architecture implied by this config.
    /// Dropout is passed through; it only acts on autodiff backends.
    pub fn model_config(&self) -> GptConfig {
        GptConfig::new(
            VOCAB_SIZE,
            block_size(self.ndigit),
            self.n_embd,
            self.n_head,
            self.n_layer,
            self.dropout,
        )
    }

    /// Supervised tokens seen by the end of training; the cosine
    /// decay reaches its floor here.
    pub fn final_tokens(&self, train_len: usize) -> u64 {
        (self.epochs * train_len * (self.ndigit + 1)) as u64
    }
}

/// Exam results for both splits after a training run.
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub train_exam: ExamReport,
    pub test_exam:  ExamReport,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<TrainOutcome> {
        let cfg = &self.config;
        check_ndigit(cfg.ndigit)?;
        cfg.model_config().validate()?;

        // ── Step 1: Build the two splits ──────────────────────────────────────
        // Same seed → same permutation → disjoint train/test
        let train_dataset = AdditionDataset::new(cfg.ndigit, Split::Train, cfg.seed)?;
        let test_dataset  = AdditionDataset::new(cfg.ndigit, Split::Test,  cfg.seed)?;
        tracing::info!(
            "{}-digit addition: {} train, {} test problems",
            cfg.ndigit,
            train_dataset.problem_count(),
            test_dataset.problem_count(),
        );

        // ── Step 2: Save config for exams and inference ───────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir)?;
        ckpt_manager.save_config(cfg)?;
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir)?;

        // ── Step 3: Run training loop (Layer 5) ───────────────────────────────
        // The loader consumes its dataset, so exams get fresh copies.
        let model = run_training(
            cfg,
            train_dataset.clone(),
            test_dataset.clone(),
            &ckpt_manager,
            &metrics,
        )?;

        // ── Steps 4–5: Exams ──────────────────────────────────────────────────
        let device = burn::backend::wgpu::WgpuDevice::default();
        let train_exam = give_exam(
            &model, &train_dataset, cfg.exam_batch_size, Some(TRAIN_EXAM_MAX_BATCHES), &device,
        )?;
        tracing::info!("train exam: {}", train_exam);

        let test_exam = give_exam(&model, &test_dataset, cfg.exam_batch_size, None, &device)?;
        tracing::info!("test exam: {}", test_exam);

        Ok(TrainOutcome { train_exam, test_exam })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_config_follows_ndigit() {
        let cfg = TrainConfig { ndigit: 3, ..TrainConfig::default() };
        let model_cfg = cfg.model_config();
        assert_eq!(model_cfg.block_size, 9);
        assert_eq!(model_cfg.vocab_size, 10);
        assert_eq!(model_cfg.n_embd, 128);
    }

    #[test]
    fn test_final_tokens() {
        let cfg = TrainConfig::default();
        // 50 epochs * 9000 problems * 3 supervised digits
        assert_eq!(cfg.final_tokens(9000), 1_350_000);
    }

    #[test]
    fn test_config_json_round_trip() {
        let cfg  = TrainConfig { lr_decay: false, ..TrainConfig::default() };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: TrainConfig = serde_json::from_str(&json).unwrap();
        assert!(!back.lr_decay);
        assert_eq!(back.seed, DEFAULT_SEED);
    }
}
