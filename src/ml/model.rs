use anyhow::{ensure, Result};
use burn::{
    nn::{
        attention::{generate_autoregressive_mask, MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::{gelu, log_softmax},
};

// Config derive supplies Clone, serde and the `new`/`with_*` builders.
#[derive(Config, Debug)]
pub struct GptConfig {
    pub vocab_size: usize,
    pub block_size: usize,
    pub n_embd:     usize,
    pub n_head:     usize,
    pub n_layer:    usize,
    pub dropout:    f64,
}

impl GptConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.n_head > 0, "n_head must be positive");
        ensure!(
            self.n_embd % self.n_head == 0,
            "n_embd ({}) must be divisible by n_head ({})",
            self.n_embd,
            self.n_head
        );
        ensure!(self.block_size > 0, "block_size must be positive");
        Ok(())
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> GptModel<B> {
        let token_embedding    = EmbeddingConfig::new(self.vocab_size, self.n_embd).init(device);
        let position_embedding = EmbeddingConfig::new(self.block_size, self.n_embd).init(device);
        let blocks: Vec<DecoderBlock<B>> = (0..self.n_layer)
            .map(|_| self.build_decoder_block(device))
            .collect();
        let final_norm = LayerNormConfig::new(self.n_embd).init(device);
        let lm_head    = LinearConfig::new(self.n_embd, self.vocab_size)
            .with_bias(false)
            .init(device);
        let dropout    = DropoutConfig::new(self.dropout).init();
        GptModel {
            token_embedding, position_embedding, blocks,
            final_norm, lm_head, dropout,
            block_size: self.block_size,
        }
    }

    fn build_decoder_block<B: Backend>(&self, device: &B::Device) -> DecoderBlock<B> {
        let self_attn = MultiHeadAttentionConfig::new(self.n_embd, self.n_head)
            .with_dropout(self.dropout)
            .init(device);
        let mlp_fc   = LinearConfig::new(self.n_embd, 4 * self.n_embd).init(device);
        let mlp_proj = LinearConfig::new(4 * self.n_embd, self.n_embd).init(device);
        let norm1    = LayerNormConfig::new(self.n_embd).init(device);
        let norm2    = LayerNormConfig::new(self.n_embd).init(device);
        let dropout  = DropoutConfig::new(self.dropout).init();
        DecoderBlock { norm1, self_attn, norm2, mlp_fc, mlp_proj, dropout }
    }
}

/// Pre-norm transformer block: x + attn(ln(x)), then x + mlp(ln(x)).
#[derive(Module, Debug)]
pub struct DecoderBlock<B: Backend> {
    pub norm1:     LayerNorm<B>,
    pub self_attn: MultiHeadAttention<B>,
    pub norm2:     LayerNorm<B>,
    pub mlp_fc:    Linear<B>,
    pub mlp_proj:  Linear<B>,
    pub dropout:   Dropout,
}

impl<B: Backend> DecoderBlock<B> {
    pub fn forward(&self, x: Tensor<B, 3>, causal_mask: Tensor<B, 3, Bool>) -> Tensor<B, 3> {
        let attn_input  = MhaInput::self_attn(self.norm1.forward(x.clone())).mask_attn(causal_mask);
        let attn_output = self.self_attn.forward(attn_input).context;
        let x = x + self.dropout.forward(attn_output);

        let mlp_out = self.mlp_proj.forward(gelu(self.mlp_fc.forward(self.norm2.forward(x.clone()))));
        x + self.dropout.forward(mlp_out)
    }
}

#[derive(Module, Debug)]
pub struct GptModel<B: Backend> {
    pub token_embedding:    Embedding<B>,
    pub position_embedding: Embedding<B>,
    pub blocks:             Vec<DecoderBlock<B>>,
    pub final_norm:         LayerNorm<B>,
    pub lm_head:            Linear<B>,
    pub dropout:            Dropout,
    pub block_size:         usize,
}

impl<B: Backend> GptModel<B> {
    /// input_ids: [batch, seq_len] → logits: [batch, seq_len, vocab]
    ///
    /// seq_len must not exceed block_size; the sampler crops longer contexts.
    pub fn forward(&self, input_ids: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        let [batch_size, seq_len] = input_ids.dims();
        let device = input_ids.device();

        let tok_emb = self.token_embedding.forward(input_ids);
        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &device)
            .unsqueeze::<2>()
            .expand([batch_size, seq_len]);
        let pos_emb = self.position_embedding.forward(positions);

        // Position i may only attend to positions <= i.
        let causal_mask = generate_autoregressive_mask::<B>(batch_size, seq_len, &device);

        let mut x = self.dropout.forward(tok_emb + pos_emb);
        for block in &self.blocks {
            x = block.forward(x, causal_mask.clone());
        }
        let x = self.final_norm.forward(x);

        self.lm_head.forward(x)
    }

    /// Mean cross-entropy over the targets that are not ignored.
    pub fn forward_loss(
        &self,
        inputs:  Tensor<B, 2, Int>,
        targets: Tensor<B, 2, Int>,
    ) -> Tensor<B, 1> {
        let logits = self.forward(inputs);
        masked_cross_entropy(logits, targets)
    }

    /// Number of scalar parameters in the model.
    pub fn param_count(&self) -> usize {
        self.num_params()
    }
}

/// Cross-entropy of `logits` [batch, seq, vocab] against `targets`
/// [batch, seq], skipping every target below zero (the ignore index).
/// Returns a one-element tensor.
pub fn masked_cross_entropy<B: Backend>(
    logits:  Tensor<B, 3>,
    targets: Tensor<B, 2, Int>,
) -> Tensor<B, 1> {
    let [batch_size, seq_len, vocab] = logits.dims();
    let n = batch_size * seq_len;

    let logits  = logits.reshape([n, vocab]);
    let targets = targets.reshape([n, 1]);

    let keep = targets.clone().greater_equal_elem(0).float(); // [n, 1]
    let safe_targets = targets.clamp_min(0);

    let picked = log_softmax(logits, 1).gather(1, safe_targets); // [n, 1]
    let kept   = keep.clone().sum().clamp_min(1.0);

    (picked * keep).sum().neg() / kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::codec::{IGNORE_INDEX, VOCAB_SIZE};
    use burn::backend::NdArray;
    use burn::tensor::TensorData;

    type TestBackend = NdArray;

    fn tiny_config() -> GptConfig {
        GptConfig::new(VOCAB_SIZE, 6, 16, 2, 1, 0.0)
    }

    #[test]
    fn test_forward_shape() {
        let device = Default::default();
        let model: GptModel<TestBackend> = tiny_config().init(&device);
        let input = Tensor::<TestBackend, 2, Int>::from_data(
            TensorData::new(vec![0i64, 6, 3, 9, 0, 4, 8, 5, 5, 0, 1, 3], [2, 6]),
            &device,
        );
        assert_eq!(model.forward(input).dims(), [2, 6, VOCAB_SIZE]);
    }

    #[test]
    fn test_validate_rejects_indivisible_heads() {
        assert!(GptConfig::new(VOCAB_SIZE, 6, 10, 3, 1, 0.0).validate().is_err());
        assert!(tiny_config().validate().is_ok());
    }

    #[test]
    fn test_masked_loss_ignores_marked_targets() {
        let device = Default::default();

        // Uniform logits: every supervised position costs ln(vocab).
        let logits = Tensor::<TestBackend, 3>::zeros([1, 4, VOCAB_SIZE], &device);
        let targets = Tensor::<TestBackend, 2, Int>::from_data(
            TensorData::new(vec![IGNORE_INDEX, IGNORE_INDEX, 3, 7], [1, 4]),
            &device,
        );
        let loss: f32 = masked_cross_entropy(logits, targets).into_scalar().elem::<f32>();
        assert!((loss - (VOCAB_SIZE as f32).ln()).abs() < 1e-4);
    }

    #[test]
    fn test_masked_loss_prefers_correct_digit() {
        let device = Default::default();
        let mut row = vec![0.0f32; VOCAB_SIZE];
        row[5] = 10.0;
        let logits = Tensor::<TestBackend, 3>::from_data(TensorData::new(row, [1, 1, VOCAB_SIZE]), &device);

        let right = Tensor::<TestBackend, 2, Int>::from_data(TensorData::new(vec![5i64], [1, 1]), &device);
        let wrong = Tensor::<TestBackend, 2, Int>::from_data(TensorData::new(vec![2i64], [1, 1]), &device);

        let right_loss: f32 = masked_cross_entropy(logits.clone(), right).into_scalar().elem::<f32>();
        let wrong_loss: f32 = masked_cross_entropy(logits, wrong).into_scalar().elem::<f32>();
        assert!(right_loss < 0.01);
        assert!(wrong_loss > 9.0);
    }
}
