// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting persistence used by the training and exam
// workflows:
//
//   checkpoint.rs — Saving and loading model weights
//                   Uses Burn's NamedMpkGzFileRecorder at full
//                   precision for the best model. Also saves/loads TrainConfig
//                   as JSON so exams can rebuild the model and
//                   regenerate the same split.
//
//   metrics.rs    — Training metrics logging
//                   Writes epoch-level losses and learning rate
//                   to a CSV file.
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;
