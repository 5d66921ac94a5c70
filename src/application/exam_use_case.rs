// ============================================================
// Layer 2 — Exam Use Case
// ============================================================
// Grades a saved checkpoint on one split:
//   1. Load config + best weights from the checkpoint dir
//   2. Regenerate the split from the saved ndigit and seed
//   3. Sit the exam (Layer 5)

use anyhow::Result;

use crate::data::dataset::AdditionDataset;
use crate::domain::problem::Split;
use crate::domain::traits::ProblemSource;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::evaluator::{give_exam, ExamReport};
use crate::ml::inferencer::{InferBackend, Inferencer};

pub struct ExamUseCase {
    inferencer: Inferencer,
}

impl ExamUseCase {
    pub fn new(checkpoint_dir: &str) -> Result<Self> {
        let ckpt       = CheckpointManager::new(checkpoint_dir)?;
        let inferencer = Inferencer::<InferBackend>::from_checkpoint(&ckpt, Default::default())?;
        Ok(Self { inferencer })
    }

    pub fn execute(
        &self,
        split:       Split,
        batch_size:  Option<usize>,
        max_batches: Option<usize>,
    ) -> Result<ExamReport> {
        let cfg     = self.inferencer.config();
        let dataset = AdditionDataset::new(cfg.ndigit, split, cfg.seed)?;
        let batch_size = batch_size.unwrap_or(cfg.exam_batch_size);

        tracing::info!(
            "Exam on {} split: {} problems, batch size {}",
            split,
            dataset.problem_count(),
            batch_size
        );

        give_exam(
            self.inferencer.model(),
            &dataset,
            batch_size,
            max_batches,
            self.inferencer.device(),
        )
    }
}
