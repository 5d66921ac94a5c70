// ============================================================
// Layer 5 — Autoregressive Sampler
// ============================================================
// Extends a batch of digit prefixes one token at a time:
//
//   [0,6,3,9]  → model → next digit 0 → [0,6,3,9,0]
//   [0,6,3,9,0] → model → next digit 4 → ...
//
// The context fed to the model is cropped to its block_size.
// Greedy picks the arg-max digit; TopK keeps the k most likely
// digits, rescales by temperature, and draws from a seeded RNG.

use anyhow::{ensure, Result};
use burn::prelude::*;
use burn::tensor::{activation::softmax, TensorData};
use rand::{distributions::WeightedIndex, prelude::Distribution, rngs::StdRng, SeedableRng};

use crate::ml::model::GptModel;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleStrategy {
    Greedy,
    TopK { k: usize, temperature: f64, seed: u64 },
}

/// Append `steps` generated digits to every row of `prefix`.
///
/// prefix: [batch, t] → [batch, t + steps]
pub fn sample<B: Backend>(
    model:    &GptModel<B>,
    prefix:   Tensor<B, 2, Int>,
    steps:    usize,
    strategy: SampleStrategy,
) -> Result<Tensor<B, 2, Int>> {
    let mut rng = match strategy {
        SampleStrategy::TopK { k, temperature, seed } => {
            ensure!(k > 0, "top-k sampling needs k > 0");
            ensure!(temperature > 0.0, "temperature must be positive, got {temperature}");
            Some(StdRng::seed_from_u64(seed))
        }
        SampleStrategy::Greedy => None,
    };

    let mut x = prefix;
    for _ in 0..steps {
        let [batch_size, t] = x.dims();
        let context = if t > model.block_size {
            x.clone().slice([0..batch_size, t - model.block_size..t])
        } else {
            x.clone()
        };

        let logits = model.forward(context);
        let [_, tc, vocab] = logits.dims();
        let last = logits.slice([0..batch_size, tc - 1..tc, 0..vocab]).reshape([batch_size, vocab]);

        let next = match (&strategy, rng.as_mut()) {
            (SampleStrategy::TopK { k, temperature, .. }, Some(rng)) => {
                draw_top_k(last, *k, *temperature, rng)?
            }
            _ => last.argmax(1),
        };
        x = Tensor::cat(vec![x, next], 1);
    }
    Ok(x)
}

/// Draw one digit per row from the renormalised top-k distribution.
fn draw_top_k<B: Backend>(
    logits:      Tensor<B, 2>,
    k:           usize,
    temperature: f64,
    rng:         &mut StdRng,
) -> Result<Tensor<B, 2, Int>> {
    let [batch_size, vocab] = logits.dims();
    let device = logits.device();

    let probs: Vec<f32> = softmax(logits / temperature, 1)
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| anyhow::anyhow!("Reading probabilities: {e:?}"))?;

    let mut picks = Vec::with_capacity(batch_size);
    for row in probs.chunks(vocab) {
        let top = top_k_indices(row, k);
        let weights: Vec<f32> = top.iter().map(|&i| row[i]).collect();
        let dist = WeightedIndex::new(&weights)
            .map_err(|e| anyhow::anyhow!("Bad sampling weights: {e}"))?;
        picks.push(top[dist.sample(rng)] as i64);
    }

    Ok(Tensor::<B, 2, Int>::from_data(TensorData::new(picks, [batch_size, 1]), &device))
}

/// Indices of the `k` largest values, largest first.
pub fn top_k_indices(values: &[f32], k: usize) -> Vec<usize> {
    let mut indexed: Vec<usize> = (0..values.len()).collect();
    indexed.sort_unstable_by(|&a, &b| values[b].total_cmp(&values[a]));
    indexed.truncate(k);
    indexed
}
