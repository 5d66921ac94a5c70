// ============================================================
// Layer 5 — Exam (Arithmetic Accuracy)
// ============================================================
// Grades a model on every problem of a split:
//
//   1. Batch the problems and keep the first 2*ndigit digits
//      (the two addends) as the prompt
//   2. Greedily sample ndigit+1 more digits
//   3. Decode the addends and the sampled sum back to integers
//   4. Count the rows where sampled sum == a + b
//
// The first few wrong answers are kept for the report.

use std::fmt;

use anyhow::{ensure, Result};
use burn::{data::dataloader::batcher::Batcher, data::dataset::Dataset, prelude::*};

use crate::data::batcher::AdditionBatcher;
use crate::data::codec::{decode_sum, digits_to_int};
use crate::data::dataset::AdditionSample;
use crate::domain::problem::AdditionProblem;
use crate::domain::traits::ProblemSource;
use crate::ml::model::GptModel;
use crate::ml::sampler::{sample, SampleStrategy};

/// Number of wrong answers recorded per exam.
pub const MAX_REPORTED_MISTAKES: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Mistake {
    pub problem:   AdditionProblem,
    pub predicted: u64,
}

impl fmt::Display for Mistake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let w = self.problem.ndigit;
        write!(
            f,
            "model claims that {:0w$} + {:0w$} = {:0w1$} (truth is {:0w1$})",
            self.problem.a,
            self.problem.b,
            self.predicted,
            self.problem.sum(),
            w = w,
            w1 = w + 1,
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExamReport {
    pub correct:  usize,
    pub total:    usize,
    pub mistakes: Vec<Mistake>,
}

impl ExamReport {
    /// Fraction of problems answered correctly, 0.0 for an empty exam.
    pub fn score(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }

    fn record(&mut self, problem: AdditionProblem, predicted: u64) {
        self.total += 1;
        if predicted == problem.sum() {
            self.correct += 1;
        } else if self.mistakes.len() < MAX_REPORTED_MISTAKES {
            self.mistakes.push(Mistake { problem, predicted });
        }
    }
}

impl fmt::Display for ExamReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "final score: {}/{} = {:.2}% correct",
            self.correct,
            self.total,
            self.score() * 100.0
        )
    }
}

/// Read one completed row: the prompt holds the addends, the
/// trailing `ndigit + 1` digits are the model's sum.
pub fn grade_row(row: &[u8], ndigit: usize) -> Result<(AdditionProblem, u64)> {
    let prompt_len = 2 * ndigit;
    ensure!(
        row.len() == prompt_len + ndigit + 1,
        "exam row has {} digits, expected {}",
        row.len(),
        prompt_len + ndigit + 1
    );
    let a = digits_to_int(&row[..ndigit]);
    let b = digits_to_int(&row[ndigit..prompt_len]);
    let predicted = decode_sum(row, ndigit)?;
    Ok((AdditionProblem::new(a, b, ndigit)?, predicted))
}

/// Sit the exam over `dataset`, `batch_size` problems at a time.
/// `max_batches` stops early, e.g. to spot-check a large train split.
pub fn give_exam<B, D>(
    model:       &GptModel<B>,
    dataset:     &D,
    batch_size:  usize,
    max_batches: Option<usize>,
    device:      &B::Device,
) -> Result<ExamReport>
where
    B: Backend,
    D: Dataset<AdditionSample> + ProblemSource,
{
    let ndigit     = dataset.ndigit();
    let prompt_len = 2 * ndigit;
    let batcher    = AdditionBatcher::<B>::new(device.clone());
    let batch_size = batch_size.max(1);

    let mut report = ExamReport::default();
    let total = dataset.len();

    for (batch_idx, start) in (0..total).step_by(batch_size).enumerate() {
        if max_batches.is_some_and(|m| batch_idx >= m) {
            break;
        }
        let end   = (start + batch_size).min(total);
        let items: Vec<AdditionSample> = (start..end).filter_map(|i| dataset.get(i)).collect();
        if items.is_empty() {
            continue;
        }

        let batch = batcher.batch(items);
        let [rows, _] = batch.inputs.dims();
        let prompt = batch.inputs.slice([0..rows, 0..prompt_len]);

        let completed = sample(model, prompt, ndigit + 1, SampleStrategy::Greedy)?;
        let width = prompt_len + ndigit + 1;
        let digits: Vec<i64> = completed
            .into_data()
            .convert::<i64>()
            .to_vec::<i64>()
            .map_err(|e| anyhow::anyhow!("Reading sampled digits: {e:?}"))?;

        for row in digits.chunks(width) {
            let row: Vec<u8> = row.iter().map(|&d| d.clamp(0, 9) as u8).collect();
            let (problem, predicted) = grade_row(&row, ndigit)?;
            report.record(problem, predicted);
        }

        tracing::debug!(
            "exam batch {}: {}/{} correct so far",
            batch_idx + 1,
            report.correct,
            report.total
        );
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::codec::VOCAB_SIZE;
    use crate::data::dataset::AdditionDataset;
    use crate::domain::problem::Split;
    use crate::ml::model::GptConfig;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_report_scoring_and_mistake_cap() {
        let mut report = ExamReport::default();
        let p = AdditionProblem::new(6, 39, 2).unwrap();
        report.record(p, 45);
        for _ in 0..9 {
            report.record(p, 46);
        }
        assert_eq!(report.total, 10);
        assert_eq!(report.correct, 1);
        assert_eq!(report.mistakes.len(), MAX_REPORTED_MISTAKES);
        assert!((report.score() - 0.1).abs() < 1e-12);
        assert_eq!(report.to_string(), "final score: 1/10 = 10.00% correct");
    }

    #[test]
    fn test_mistake_message_pads_digits() {
        let m = Mistake { problem: AdditionProblem::new(6, 39, 2).unwrap(), predicted: 46 };
        assert_eq!(m.to_string(), "model claims that 06 + 39 = 046 (truth is 045)");
    }

    #[test]
    fn test_graded_rows_are_scored_against_the_true_sum() {
        let mut report = ExamReport::default();

        let (problem, predicted) = grade_row(&[0, 6, 3, 9, 0, 4, 5], 2).unwrap();
        assert_eq!((problem.a, problem.b, predicted), (6, 39, 45));
        report.record(problem, predicted);

        let (problem, predicted) = grade_row(&[0, 6, 3, 9, 0, 4, 6], 2).unwrap();
        report.record(problem, predicted);

        let (problem, predicted) = grade_row(&[8, 5, 5, 0, 1, 3, 5], 2).unwrap();
        report.record(problem, predicted);

        assert_eq!((report.correct, report.total), (2, 3));
        assert_eq!(report.mistakes.len(), 1);
        assert_eq!(
            report.mistakes[0].to_string(),
            "model claims that 06 + 39 = 046 (truth is 045)"
        );
    }

    #[test]
    fn test_grade_row_rejects_wrong_width() {
        assert!(grade_row(&[0, 6, 3, 9, 0, 4], 2).is_err());
    }

    #[test]
    fn test_empty_report_scores_zero() {
        assert_eq!(ExamReport::default().score(), 0.0);
    }

    #[test]
    fn test_exam_grades_every_problem() {
        let device  = Default::default();
        let model: GptModel<TestBackend> = GptConfig::new(VOCAB_SIZE, 3, 16, 2, 1, 0.0).init(&device);
        let dataset = AdditionDataset::new(1, Split::Test, 5).unwrap();

        let report = give_exam(&model, &dataset, 8, None, &device).unwrap();
        assert_eq!(report.total, dataset.len());
        assert!(report.correct <= report.total);
    }

    #[test]
    fn test_exam_honours_max_batches() {
        let device  = Default::default();
        let model: GptModel<TestBackend> = GptConfig::new(VOCAB_SIZE, 3, 16, 2, 1, 0.0).init(&device);
        let dataset = AdditionDataset::new(1, Split::Train, 5).unwrap();

        let report = give_exam(&model, &dataset, 16, Some(2), &device).unwrap();
        assert_eq!(report.total, 32);
    }
}
