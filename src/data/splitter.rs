// ============================================================
// Layer 4 — Train/Test Splitter
// ============================================================
// Shuffles the problem index space and carves off a test set:
//   - Training set: problems the model sees during training
//   - Test set:     held-out problems the exam grades on
//
// The shuffle is seeded, so the same (ndigit, seed) always
// produces the same partition. Train and test are disjoint
// and together cover every index exactly once.
//
// Test size = min(floor(0.2 * total), 1000)
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom over a
// StdRng seeded from the configured seed.
//
// Reference: rand crate documentation

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Fraction of the problem space held out for testing.
pub const TEST_FRACTION: f64 = 0.2;

/// Upper bound on the test set regardless of problem space size.
pub const MAX_TEST_SIZE: usize = 1000;

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 1337;

/// Number of held-out test problems for a space of `total` problems.
pub fn test_size(total: usize) -> usize {
    (((total as f64) * TEST_FRACTION).floor() as usize).min(MAX_TEST_SIZE)
}

/// Shuffle `items` with a seeded RNG and split into (train, test),
/// where test holds the first `test_len` shuffled items.
pub fn split_train_test<T>(mut items: Vec<T>, test_len: usize, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    items.shuffle(&mut rng);

    let total    = items.len();
    let test_len = test_len.min(total);

    // split_off(n) leaves [0..n] in `items` and returns [n..total]
    let train = items.split_off(test_len);
    let test  = items;

    tracing::debug!(
        "Dataset split: {} train, {} test (seed {})",
        train.len(),
        test.len(),
        seed,
    );

    (train, test)
}

/// Partition the indices `0..total` into (train, test).
pub fn split_indices(total: usize, seed: u64) -> (Vec<u32>, Vec<u32>) {
    let indices: Vec<u32> = (0..total as u32).collect();
    split_train_test(indices, test_size(total), seed)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_size_is_capped() {
        assert_eq!(test_size(100),         20);
        assert_eq!(test_size(10_000),      1000);
        assert_eq!(test_size(1_000_000),   1000);
        assert_eq!(test_size(4),           0);
        assert_eq!(test_size(0),           0);
    }

    #[test]
    fn test_split_is_disjoint_and_complete() {
        let (train, test) = split_indices(10_000, DEFAULT_SEED);
        assert_eq!(test.len(), 1000);
        assert_eq!(train.len(), 9000);

        let train_set: HashSet<u32> = train.iter().copied().collect();
        let test_set:  HashSet<u32> = test.iter().copied().collect();
        assert!(train_set.is_disjoint(&test_set));

        let union: HashSet<u32> = train_set.union(&test_set).copied().collect();
        assert_eq!(union.len(), 10_000);
    }

    #[test]
    fn test_split_is_deterministic() {
        let first  = split_indices(100, 7);
        let second = split_indices(100, 7);
        assert_eq!(first, second);

        let other = split_indices(100, 8);
        assert_ne!(first.1, other.1);
    }

    #[test]
    fn test_empty_dataset() {
        let (train, test) = split_train_test(Vec::<usize>::new(), 10, 1);
        assert!(train.is_empty());
        assert!(test.is_empty());
    }

    #[test]
    fn test_oversized_test_len_takes_everything() {
        let (train, test) = split_train_test((0..10).collect::<Vec<_>>(), 50, 1);
        assert!(train.is_empty());
        assert_eq!(test.len(), 10);
    }
}
