// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The two seams the rest of the system programs against:
//
//   ProblemSource — anything that hands out addition problems
//                   by index (AdditionDataset for one split)
//   Solver        — anything that can answer `a + b`
//                   (the Inferencer, backed by a checkpoint)
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use crate::domain::problem::AdditionProblem;

// ─── ProblemSource ────────────────────────────────────────────────────────────
/// An indexed, finite collection of addition problems.
pub trait ProblemSource {
    /// Addend width shared by every problem in this source.
    fn ndigit(&self) -> usize;

    /// The problem at `index`, or None past the end.
    fn problem(&self, index: usize) -> Option<AdditionProblem>;

    /// Number of problems available.
    fn problem_count(&self) -> usize;
}

// ─── Solver ───────────────────────────────────────────────────────────────────
/// Any component that can compute `a + b`, rightly or wrongly.
pub trait Solver {
    fn solve(&self, a: u64, b: u64) -> Result<u64>;
}
