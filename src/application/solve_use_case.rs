// ============================================================
// Layer 2 — Solve Use Case
// ============================================================
// Asks a trained checkpoint a single `a + b` question and
// reports whether the model got it right.

use anyhow::Result;

use crate::domain::problem::AdditionProblem;
use crate::domain::traits::Solver;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::inferencer::{InferBackend, Inferencer};
use crate::ml::sampler::SampleStrategy;

/// The model's answer next to the true sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Answer {
    pub problem:   AdditionProblem,
    pub predicted: u64,
}

impl Answer {
    pub fn is_correct(&self) -> bool {
        self.predicted == self.problem.sum()
    }
}

pub struct SolveUseCase<S: Solver> {
    solver: S,
    ndigit: usize,
}

impl SolveUseCase<Inferencer> {
    pub fn from_checkpoint(checkpoint_dir: &str, strategy: SampleStrategy) -> Result<Self> {
        let ckpt       = CheckpointManager::new(checkpoint_dir)?;
        let inferencer = Inferencer::<InferBackend>::from_checkpoint(&ckpt, Default::default())?
            .with_strategy(strategy);
        let ndigit     = inferencer.config().ndigit;
        Ok(Self::new(inferencer, ndigit))
    }
}

impl<S: Solver> SolveUseCase<S> {
    pub fn new(solver: S, ndigit: usize) -> Self {
        Self { solver, ndigit }
    }

    pub fn answer(&self, a: u64, b: u64) -> Result<Answer> {
        let problem   = AdditionProblem::new(a, b, self.ndigit)?;
        let predicted = self.solver.solve(a, b)?;
        Ok(Answer { problem, predicted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Adds correctly except when b is 7.
    struct Flaky;

    impl Solver for Flaky {
        fn solve(&self, a: u64, b: u64) -> Result<u64> {
            Ok(if b == 7 { a + b + 1 } else { a + b })
        }
    }

    #[test]
    fn test_answer_checks_against_true_sum() {
        let use_case = SolveUseCase::new(Flaky, 2);
        assert!(use_case.answer(85, 50).unwrap().is_correct());

        let wrong = use_case.answer(10, 7).unwrap();
        assert!(!wrong.is_correct());
        assert_eq!(wrong.predicted, 18);
    }

    #[test]
    fn test_answer_rejects_wide_operands() {
        let use_case = SolveUseCase::new(Flaky, 2);
        assert!(use_case.answer(123, 1).is_err());
    }
}
