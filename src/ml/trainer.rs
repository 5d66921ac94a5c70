// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Full train + test loop using Burn's DataLoader and AdamW.
//
// Per step:
//   forward → masked cross-entropy → backward → AdamW step
//   at the scheduled learning rate (warmup + cosine over
//   supervised tokens, see schedule.rs)
//
// Per epoch:
//   mean test loss on the inner backend (no autodiff),
//   one summary line, one metrics row, and a checkpoint
//   whenever test loss beats the best so far.
//
// Key Burn insight:
//   - Training uses Autodiff<Wgpu> for gradients
//   - model.valid() returns the model on the inner backend
//   - The test batcher must also use the inner backend
//
// Reference: Burn Book §5, Loshchilov & Hutter (2019) AdamW

use std::sync::Arc;

use anyhow::Result;
use burn::{
    data::{
        dataloader::{DataLoader, DataLoaderBuilder},
        dataset::Dataset,
    },
    grad_clipping::GradientClippingConfig,
    module::AutodiffModule,
    optim::{AdamWConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::{AdditionBatch, AdditionBatcher},
    dataset::AdditionDataset,
};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::model::GptModel;
use crate::ml::schedule::LrSchedule;

type MyBackend      = burn::backend::Autodiff<burn::backend::Wgpu>;
type MyInnerBackend = burn::backend::Wgpu;

/// Train on the WGPU device and return the final model, ready for inference.
pub fn run_training(
    cfg:           &TrainConfig,
    train_dataset: AdditionDataset,
    test_dataset:  AdditionDataset,
    ckpt_manager:  &CheckpointManager,
    metrics:       &MetricsLogger,
) -> Result<GptModel<MyInnerBackend>> {
    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);
    let model = train_loop::<MyBackend>(cfg, train_dataset, test_dataset, ckpt_manager, metrics, device)?;
    Ok(model.valid())
}

pub fn train_loop<B: AutodiffBackend>(
    cfg:           &TrainConfig,
    train_dataset: AdditionDataset,
    test_dataset:  AdditionDataset,
    ckpt_manager:  &CheckpointManager,
    metrics:       &MetricsLogger,
    device:        B::Device,
) -> Result<GptModel<B>> {

    // ── Build model ───────────────────────────────────────────────────────────
    let model_cfg = cfg.model_config();
    model_cfg.validate()?;
    let mut model: GptModel<B> = model_cfg.init(&device);
    tracing::info!(
        "Model ready: {} layers, {} heads, n_embd={}, {} parameters",
        cfg.n_layer, cfg.n_head, cfg.n_embd, model.param_count()
    );

    // ── AdamW optimiser ───────────────────────────────────────────────────────
    let optim_cfg = AdamWConfig::new()
        .with_beta_1(0.9)
        .with_beta_2(0.95)
        .with_weight_decay(cfg.weight_decay as f32)
        .with_grad_clipping(Some(GradientClippingConfig::Norm(cfg.grad_norm_clip as f32)));
    let mut optim = optim_cfg.init();

    // ── Learning-rate schedule ────────────────────────────────────────────────
    let train_len = train_dataset.len();
    let schedule  = LrSchedule::new(
        cfg.lr,
        cfg.warmup_tokens,
        cfg.final_tokens(train_len),
        cfg.lr_decay,
    );

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_batcher = AdditionBatcher::<B>::new(device.clone());
    let train_loader  = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(cfg.num_workers.max(1))
        .build(train_dataset);

    // ── Test data loader (InnerBackend — no autodiff overhead) ────────────────
    let test_batcher = AdditionBatcher::<B::InnerBackend>::new(device.clone());
    let test_loader  = DataLoaderBuilder::new(test_batcher)
        .batch_size(cfg.batch_size)
        .num_workers(cfg.num_workers.max(1))
        .build(test_dataset);

    let mut tokens: u64       = 0;
    let mut lr                = schedule.lr(0);
    let mut best_test_loss    = f64::INFINITY;

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for (iteration, batch) in train_loader.iter().enumerate() {
            let loss = model.forward_loss(batch.inputs, batch.targets);

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            train_loss_sum += loss_val;
            train_batches  += 1;

            tokens += batch.supervised_tokens as u64;
            lr = schedule.lr(tokens);

            // Backward pass + AdamW update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(lr, model, grads);

            tracing::debug!(
                "epoch {} iter {}: train loss {:.5}. lr {:e}",
                epoch, iteration, loss_val, lr
            );
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else { f64::NAN };

        // ── Test phase ────────────────────────────────────────────────────────
        // dropout disabled for deterministic evaluation
        let model_valid = model.valid();
        let test_loss   = mean_loss(&model_valid, &test_loader);

        println!(
            "Epoch {:>3}/{} | train_loss={:.5} | test_loss={:.5} | lr={:.3e}",
            epoch, cfg.epochs, avg_train_loss, test_loss, lr,
        );

        let epoch_metrics = EpochMetrics::new(epoch, avg_train_loss, test_loss, lr);
        metrics.log(&epoch_metrics)?;

        // A NaN test loss means there was nothing to test on; keep every epoch then.
        if test_loss.is_nan() || epoch_metrics.is_improvement(best_test_loss) {
            if !test_loss.is_nan() {
                best_test_loss = test_loss;
            }
            ckpt_manager.save_model(&model_valid, epoch)?;
            tracing::info!("Checkpoint saved for epoch {}", epoch);
        }
    }

    tracing::info!("Training complete!");
    Ok(model)
}

/// Mean masked loss over every batch of `loader`, NaN if it is empty.
fn mean_loss<B: Backend>(
    model:  &GptModel<B>,
    loader: &Arc<dyn DataLoader<AdditionBatch<B>>>,
) -> f64 {
    let mut loss_sum = 0.0f64;
    let mut batches  = 0usize;

    for batch in loader.iter() {
        let loss: f64 = model
            .forward_loss(batch.inputs, batch.targets)
            .into_scalar()
            .elem::<f64>();
        loss_sum += loss;
        batches  += 1;
    }

    if batches > 0 { loss_sum / batches as f64 } else { f64::NAN }
}
