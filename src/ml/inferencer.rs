// ============================================================
// Layer 5 — Inferencer
// ============================================================
use anyhow::Result;
use burn::{prelude::*, tensor::TensorData};

use crate::application::train_use_case::TrainConfig;
use crate::data::codec::{decode_sum, to_digits};
use crate::domain::problem::AdditionProblem;
use crate::domain::traits::Solver;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::GptModel;
use crate::ml::sampler::{sample, SampleStrategy};

pub type InferBackend = burn::backend::Wgpu;

pub struct Inferencer<B: Backend = InferBackend> {
    model:    GptModel<B>,
    config:   TrainConfig,
    device:   B::Device,
    strategy: SampleStrategy,
}

impl<B: Backend> Inferencer<B> {
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager, device: B::Device) -> Result<Self> {
        let config = ckpt_manager.load_config()?;
        let model: GptModel<B> = config.model_config().init(&device);
        let model  = ckpt_manager.load_model(model, &device)?;
        tracing::info!("Model loaded from checkpoint ({}-digit addition)", config.ndigit);
        Ok(Self::new(model, config, device))
    }

    pub fn new(model: GptModel<B>, config: TrainConfig, device: B::Device) -> Self {
        Self { model, config, device, strategy: SampleStrategy::Greedy }
    }

    pub fn with_strategy(mut self, strategy: SampleStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn model(&self) -> &GptModel<B> { &self.model }

    pub fn config(&self) -> &TrainConfig { &self.config }

    pub fn device(&self) -> &B::Device { &self.device }
}

impl<B: Backend> Solver for Inferencer<B> {
    /// Prompt with the padded digits of a and b, sample the sum.
    fn solve(&self, a: u64, b: u64) -> Result<u64> {
        let ndigit  = self.config.ndigit;
        let problem = AdditionProblem::new(a, b, ndigit)?;

        let mut prompt: Vec<i64> = Vec::with_capacity(2 * ndigit);
        prompt.extend(to_digits(problem.a, ndigit).into_iter().map(i64::from));
        prompt.extend(to_digits(problem.b, ndigit).into_iter().map(i64::from));

        let prompt = Tensor::<B, 2, Int>::from_data(
            TensorData::new(prompt, [1, 2 * ndigit]),
            &self.device,
        );
        let completed = sample(&self.model, prompt, ndigit + 1, self.strategy)?;

        let digits: Vec<u8> = completed
            .into_data()
            .convert::<i64>()
            .to_vec::<i64>()
            .map_err(|e| anyhow::anyhow!("Reading sampled digits: {e:?}"))?
            .into_iter()
            .map(|d| d.clamp(0, 9) as u8)
            .collect();

        let answer = decode_sum(&digits, ndigit)?;
        tracing::debug!("{} + {} → {:?} → {}", a, b, digits, answer);
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn inferencer() -> Inferencer<TestBackend> {
        let device = Default::default();
        let config = TrainConfig { ndigit: 2, n_layer: 1, n_head: 2, n_embd: 16, ..TrainConfig::default() };
        let model  = config.model_config().init(&device);
        Inferencer::new(model, config, device)
    }

    #[test]
    fn test_solve_returns_a_sum_sized_answer() {
        let answer = inferencer().solve(85, 50).unwrap();
        assert!(answer < 1000);
    }

    #[test]
    fn test_solve_rejects_wide_operands() {
        assert!(inferencer().solve(100, 1).is_err());
    }

    #[test]
    fn test_checkpoint_round_trip_gives_same_answers() {
        let tmp  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(tmp.path().to_string_lossy().to_string()).unwrap();

        let original = inferencer();
        ckpt.save_config(original.config()).unwrap();
        ckpt.save_model(original.model(), 1).unwrap();

        let restored = Inferencer::<TestBackend>::from_checkpoint(&ckpt, Default::default()).unwrap();
        for (a, b) in [(6, 39), (85, 50), (0, 0), (99, 99)] {
            assert_eq!(original.solve(a, b).unwrap(), restored.solve(a, b).unwrap());
        }
    }
}
