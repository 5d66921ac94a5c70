// ============================================================
// Layer 4 — Addition Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<AdditionSample>
// into tensors for the model.
//
// How batching works here:
//   Input:  Vec of N AdditionSamples, each 3*ndigit digits long
//   Output: AdditionBatch with tensors of shape [N, 3*ndigit]
//
//   Digits are flattened row by row and reshaped:
//   [s1_d1, ..., s1_dT, s2_d1, ..., sN_dT] → [N, T]
//
//   Ignored targets (None) become IGNORE_INDEX (-100) so the
//   loss can mask them out.
//
// All samples in one dataset share the same length, so no
// padding is needed.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
    tensor::TensorData,
};

use crate::data::codec::IGNORE_INDEX;
use crate::data::dataset::AdditionSample;

// ─── AdditionBatch ────────────────────────────────────────────────────────────
/// A batch of addition samples ready for the model forward pass.
#[derive(Debug, Clone)]
pub struct AdditionBatch<B: Backend> {
    /// Input digits, shape [batch_size, seq_len]
    pub inputs: Tensor<B, 2, Int>,

    /// Next-digit targets, shape [batch_size, seq_len]
    /// IGNORE_INDEX where the target is an operand digit
    pub targets: Tensor<B, 2, Int>,

    /// Number of targets that are not IGNORE_INDEX.
    /// Drives the token-based learning-rate schedule.
    pub supervised_tokens: usize,
}

// ─── AdditionBatcher ──────────────────────────────────────────────────────────
#[derive(Clone, Debug)]
pub struct AdditionBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> AdditionBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<AdditionSample, AdditionBatch<B>> for AdditionBatcher<B> {
    fn batch(&self, items: Vec<AdditionSample>) -> AdditionBatch<B> {
        let batch_size = items.len();
        let seq_len    = items.first().map(|s| s.input.len()).unwrap_or(0);

        let input_flat: Vec<i64> = items
            .iter()
            .flat_map(|s| s.input.iter().map(|&d| i64::from(d)))
            .collect();

        let target_flat: Vec<i64> = items
            .iter()
            .flat_map(|s| {
                s.target
                    .iter()
                    .map(|t| t.map(i64::from).unwrap_or(IGNORE_INDEX))
            })
            .collect();

        let supervised_tokens = items.iter().map(AdditionSample::supervised).sum();

        let inputs = Tensor::<B, 2, Int>::from_data(
            TensorData::new(input_flat, [batch_size, seq_len]),
            &self.device,
        );
        let targets = Tensor::<B, 2, Int>::from_data(
            TensorData::new(target_flat, [batch_size, seq_len]),
            &self.device,
        );

        AdditionBatch { inputs, targets, supervised_tokens }
    }
}
