use std::sync::Arc;

use burn::data::dataset::Dataset;
use anyhow::Result;

use crate::data::codec::{encode_problem, index_to_problem, problem_space};
use crate::data::splitter::split_indices;
use crate::domain::problem::{check_ndigit, AdditionProblem, Split, TrainingPair};
use crate::domain::traits::ProblemSource;

/// One training sample: the encoded problem shifted into (x, y).
/// `target[i] == None` marks an operand digit the loss ignores.
pub type AdditionSample = TrainingPair;

/// Every `ndigit`-digit addition problem in one split, served by
/// index into the seeded permutation of the problem space.
/// Clones share the index table.
#[derive(Debug, Clone)]
pub struct AdditionDataset {
    ndigit:  usize,
    indices: Arc<[u32]>,
}

impl AdditionDataset {
    pub fn new(ndigit: usize, split: Split, seed: u64) -> Result<Self> {
        check_ndigit(ndigit)?;
        let total = problem_space(ndigit) as usize;
        let (train, test) = split_indices(total, seed);
        let indices = match split {
            Split::Train => train,
            Split::Test  => test,
        };
        tracing::debug!("{} split: {} of {} problems", split, indices.len(), total);
        Ok(Self { ndigit, indices: indices.into() })
    }
}

impl ProblemSource for AdditionDataset {
    fn ndigit(&self) -> usize { self.ndigit }

    fn problem(&self, index: usize) -> Option<AdditionProblem> {
        let global = *self.indices.get(index)?;
        index_to_problem(u64::from(global), self.ndigit).ok()
    }

    fn problem_count(&self) -> usize { self.indices.len() }
}

impl Dataset<AdditionSample> for AdditionDataset {
    fn get(&self, index: usize) -> Option<AdditionSample> {
        let problem = self.problem(index)?;
        Some(encode_problem(&problem).training_pair())
    }

    fn len(&self) -> usize {
        self.indices.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::splitter::DEFAULT_SEED;
    use std::collections::HashSet;

    #[test]
    fn test_split_sizes() {
        let train = AdditionDataset::new(2, Split::Train, DEFAULT_SEED).unwrap();
        let test  = AdditionDataset::new(2, Split::Test,  DEFAULT_SEED).unwrap();
        assert_eq!(test.len(),  1000);
        assert_eq!(train.len(), 9000);

        let small = AdditionDataset::new(1, Split::Test, DEFAULT_SEED).unwrap();
        assert_eq!(small.len(), 20);
    }

    #[test]
    fn test_splits_do_not_share_problems() {
        let train = AdditionDataset::new(1, Split::Train, 3).unwrap();
        let test  = AdditionDataset::new(1, Split::Test,  3).unwrap();

        let seen: HashSet<(u64, u64)> = (0..train.problem_count())
            .filter_map(|i| train.problem(i))
            .map(|p| (p.a, p.b))
            .collect();
        for i in 0..test.problem_count() {
            let p = test.problem(i).unwrap();
            assert!(!seen.contains(&(p.a, p.b)));
        }
        assert_eq!(seen.len() + test.problem_count(), 100);
    }

    #[test]
    fn test_sample_is_shifted_encoding() {
        let ds     = AdditionDataset::new(2, Split::Test, DEFAULT_SEED).unwrap();
        let p      = ds.problem(0).unwrap();
        let sample = ds.get(0).unwrap();
        let full   = encode_problem(&p);

        assert_eq!(sample.input.len(),  6);
        assert_eq!(sample.target.len(), 6);
        assert_eq!(&sample.input[..], &full.digits()[..6]);
        assert_eq!(sample.target[5], Some(full.digits()[6]));
        assert_eq!(sample.supervised(), 3);
    }

    #[test]
    fn test_clone_shares_index_table() {
        let ds   = AdditionDataset::new(2, Split::Train, DEFAULT_SEED).unwrap();
        let copy = ds.clone();
        assert!(Arc::ptr_eq(&ds.indices, &copy.indices));
        assert_eq!(copy.problem(17), ds.problem(17));
    }

    #[test]
    fn test_get_past_end_is_none() {
        let ds = AdditionDataset::new(1, Split::Test, DEFAULT_SEED).unwrap();
        assert!(ds.get(ds.len()).is_none());
    }

    #[test]
    fn test_rejects_unsupported_ndigit() {
        assert!(AdditionDataset::new(0, Split::Train, DEFAULT_SEED).is_err());
    }
}
