// ============================================================
// Layer 5 — Learning-Rate Schedule
// ============================================================
// Token-driven warmup + cosine decay:
//
//   lr
//   │     ┌──╮
//   │    ╱    ╲__
//   │   ╱        ╲__
//   │  ╱            ╲_______  ← floor at 10% of base
//   └─┴──────────────┴────────  supervised tokens seen
//     warmup        final
//
// Tokens are counted as supervised targets (ndigit+1 per
// sample), not raw sequence positions.

use std::f64::consts::PI;

const MIN_LR_FRACTION: f64 = 0.1;

#[derive(Debug, Clone, Copy)]
pub struct LrSchedule {
    pub base_lr:       f64,
    pub warmup_tokens: u64,
    pub final_tokens:  u64,
    /// When false the rate stays at base_lr throughout.
    pub decay:         bool,
}

impl LrSchedule {
    pub fn new(base_lr: f64, warmup_tokens: u64, final_tokens: u64, decay: bool) -> Self {
        Self { base_lr, warmup_tokens, final_tokens, decay }
    }

    /// Multiplier applied to base_lr after `tokens` supervised tokens.
    pub fn multiplier(&self, tokens: u64) -> f64 {
        if !self.decay {
            return 1.0;
        }
        if tokens < self.warmup_tokens {
            return tokens as f64 / self.warmup_tokens.max(1) as f64;
        }
        let span     = self.final_tokens.saturating_sub(self.warmup_tokens).max(1);
        let progress = (tokens - self.warmup_tokens) as f64 / span as f64;
        // past final_tokens the cosine would come back up; hold the floor instead
        let progress = progress.min(1.0);
        (0.5 * (1.0 + (PI * progress).cos())).max(MIN_LR_FRACTION)
    }

    pub fn lr(&self, tokens: u64) -> f64 {
        self.base_lr * self.multiplier(tokens)
    }
}
