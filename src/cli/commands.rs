// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands: `train`, `exam` and `solve`
// and all their configurable flags.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use crate::application::train_use_case::TrainConfig;
use crate::data::splitter::DEFAULT_SEED;
use crate::domain::problem::Split;

/// The top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the model on n-digit addition, then grade it
    Train(TrainArgs),

    /// Grade a trained checkpoint on the train or test split
    Exam(ExamArgs),

    /// Ask a trained checkpoint to add two numbers
    Solve(SolveArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Number of decimal digits per addend (1-4)
    #[arg(long, default_value_t = 2)]
    pub ndigit: usize,

    /// Seed for the train/test permutation and loader shuffling
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Directory to save model checkpoints, config and metrics
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Number of full passes through the training split
    #[arg(long, default_value_t = 50)]
    pub epochs: usize,

    /// Number of problems per optimisation step
    #[arg(long, default_value_t = 512)]
    pub batch_size: usize,

    /// Peak learning rate
    #[arg(long, default_value_t = 6e-4)]
    pub lr: f64,

    /// Keep the learning rate constant instead of warmup + cosine decay
    #[arg(long)]
    pub no_lr_decay: bool,

    /// Supervised tokens over which the learning rate warms up linearly
    #[arg(long, default_value_t = 1024)]
    pub warmup_tokens: u64,

    /// Number of stacked decoder blocks
    #[arg(long, default_value_t = 2)]
    pub n_layer: usize,

    /// Attention heads per block; n_embd must be divisible by n_head
    #[arg(long, default_value_t = 4)]
    pub n_head: usize,

    /// Embedding width
    #[arg(long, default_value_t = 128)]
    pub n_embd: usize,

    /// Dropout probability for embeddings, attention and residuals
    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    /// AdamW decoupled weight decay
    #[arg(long, default_value_t = 0.1)]
    pub weight_decay: f64,

    /// Clip gradients to this global L2 norm
    #[arg(long, default_value_t = 1.0)]
    pub grad_norm_clip: f64,

    /// Data loader worker threads
    #[arg(long, default_value_t = 4)]
    pub num_workers: usize,

    /// Problems per batch during the post-training exams
    #[arg(long, default_value_t = 1024)]
    pub exam_batch_size: usize,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            ndigit:          a.ndigit,
            seed:            a.seed,
            checkpoint_dir:  a.checkpoint_dir,
            epochs:          a.epochs,
            batch_size:      a.batch_size,
            lr:              a.lr,
            lr_decay:        !a.no_lr_decay,
            warmup_tokens:   a.warmup_tokens,
            n_layer:         a.n_layer,
            n_head:          a.n_head,
            n_embd:          a.n_embd,
            dropout:         a.dropout,
            weight_decay:    a.weight_decay,
            grad_norm_clip:  a.grad_norm_clip,
            num_workers:     a.num_workers,
            exam_batch_size: a.exam_batch_size,
        }
    }
}

/// All arguments for the `exam` command
#[derive(Args, Debug)]
pub struct ExamArgs {
    /// Which split to grade: train or test
    #[arg(long, default_value = "test")]
    pub split: Split,

    /// Directory where checkpoints were saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Problems per batch (defaults to the value used in training)
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Stop after this many batches
    #[arg(long)]
    pub max_batches: Option<usize>,
}

/// All arguments for the `solve` command
#[derive(Args, Debug)]
pub struct SolveArgs {
    /// First addend
    pub a: u64,

    /// Second addend
    pub b: u64,

    /// Directory where checkpoints were saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Sample from the k most likely digits instead of taking the arg-max
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Softmax temperature for top-k sampling
    #[arg(long, default_value_t = 1.0)]
    pub temperature: f64,

    /// Seed for top-k sampling
    #[arg(long, default_value_t = 0)]
    pub sample_seed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_train_defaults_match_config_defaults() {
        let cli = Cli::parse_from(["digit-adder", "train"]);
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: TrainConfig = args.into();
        let default = TrainConfig::default();

        assert_eq!(cfg.ndigit,        default.ndigit);
        assert_eq!(cfg.epochs,        default.epochs);
        assert_eq!(cfg.batch_size,    default.batch_size);
        assert_eq!(cfg.n_embd,        default.n_embd);
        assert_eq!(cfg.warmup_tokens, default.warmup_tokens);
        assert!(cfg.lr_decay);
    }

    #[test]
    fn test_no_lr_decay_flag() {
        let cli = Cli::parse_from(["digit-adder", "train", "--ndigit", "3", "--no-lr-decay"]);
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: TrainConfig = args.into();
        assert_eq!(cfg.ndigit, 3);
        assert!(!cfg.lr_decay);
    }

    #[test]
    fn test_exam_split_parsing() {
        let cli = Cli::parse_from(["digit-adder", "exam", "--split", "train", "--max-batches", "5"]);
        let Commands::Exam(args) = cli.command else { panic!("expected exam") };
        assert_eq!(args.split, Split::Train);
        assert_eq!(args.max_batches, Some(5));

        assert!(Cli::try_parse_from(["digit-adder", "exam", "--split", "valid"]).is_err());
    }

    #[test]
    fn test_solve_positional_operands() {
        let cli = Cli::parse_from(["digit-adder", "solve", "85", "50", "--top-k", "3"]);
        let Commands::Solve(args) = cli.command else { panic!("expected solve") };
        assert_eq!((args.a, args.b), (85, 50));
        assert_eq!(args.top_k, Some(3));
    }
}
