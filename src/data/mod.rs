// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between "an index into the problem space" and
// tensor batches for the model.
//
// The pipeline flows in this order:
//
//   problem index space 0..10^(2*ndigit)
//       │
//       ▼
//   splitter          → seeded shuffle, train/test partition
//       │
//       ▼
//   AdditionDataset   → implements Burn's Dataset trait
//       │               (index → problem → codec → (x, y))
//       ▼
//   AdditionBatcher   → stacks samples into tensor batches
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Digit encoding and decoding of addition problems
pub mod codec;

/// Seeded train/test partition of the problem space
pub mod splitter;

/// Implements Burn's Dataset trait for one split
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
