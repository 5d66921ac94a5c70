// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// a specific goal (training, grading, or answering one sum).
//
// Rules for this layer:
//   - No ML math or model code here
//   - No UI or printing here (that's Layer 1)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The training workflow, ending with exams on both splits
pub mod train_use_case;

// Grading a saved checkpoint on one split
pub mod exam_use_case;

// Answering a single `a + b` with a saved checkpoint
pub mod solve_use_case;
