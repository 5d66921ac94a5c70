// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains the Burn model and everything that runs it.
//
//   model.rs      — GPT-style decoder
//                   • Token + learned positional embeddings
//                   • Pre-norm blocks: causal multi-head
//                     self-attention, GELU MLP, residuals
//                   • Final layer norm, bias-free digit head
//                   • Masked cross-entropy (ignored targets)
//
//   schedule.rs   — Warmup + cosine learning-rate schedule
//                   driven by supervised tokens seen
//
//   trainer.rs    — The training loop: AdamW steps, test loss
//                   per epoch, metrics, best-model checkpoint
//
//   sampler.rs    — Autoregressive digit generation
//
//   evaluator.rs  — The exam: sample sums, decode, score
//
//   inferencer.rs — Loads a checkpoint and answers `a + b`
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)
//            Vaswani et al. (2017) Attention Is All You Need
//            Radford et al. (2019) GPT-2

/// GPT decoder architecture and masked loss
pub mod model;

/// Token-driven learning-rate schedule
pub mod schedule;

/// Full training loop with test loss and checkpointing
pub mod trainer;

/// Greedy and top-k autoregressive sampling
pub mod sampler;

/// Digit-level arithmetic exam
pub mod evaluator;

/// Inference engine — loads checkpoint and solves sums
pub mod inferencer;
