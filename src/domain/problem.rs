// ============================================================
// Layer 3 — Addition Problem Domain Types
// ============================================================
// The plain data behind every training sample:
//
//   AdditionProblem  — two addends a, b of at most `ndigit` digits
//   EncodedSequence  — a ++ b ++ (a+b), zero padded, one digit per slot
//   TrainingPair     — (x, y) for next-digit prediction
//
// Example with ndigit = 2:
//   a = 6, b = 39  →  "06" "39" "045"  →  [0,6,3,9,0,4,5]
//   x = [0,6,3,9,0,4]
//   y = [_,_,_,9,0,4,5]   (first 2*ndigit-1 targets ignored)
//
// The encode/decode arithmetic itself lives in data::codec.

use std::fmt;
use std::str::FromStr;

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

/// Largest addend width a dataset can hold. The split permutation
/// keeps 10^(2*ndigit) indices in memory as u32.
pub const MAX_NDIGIT: usize = 4;

/// Largest addend width the codec accepts: 10^(2*ndigit) must fit in u64.
pub const MAX_ENCODABLE_NDIGIT: usize = 9;

/// Returns 10^ndigit, the number of distinct values per addend.
pub fn operand_space(ndigit: usize) -> u64 {
    10u64.pow(ndigit as u32)
}

/// Fails unless `ndigit` is in `1..=MAX_NDIGIT`. Guards anything that
/// materialises the whole problem space.
pub fn check_ndigit(ndigit: usize) -> Result<()> {
    ensure!(
        (1..=MAX_NDIGIT).contains(&ndigit),
        "ndigit must be between 1 and {MAX_NDIGIT}, got {ndigit}"
    );
    Ok(())
}

/// Fails unless `ndigit` is in `1..=MAX_ENCODABLE_NDIGIT`.
pub fn check_encodable_ndigit(ndigit: usize) -> Result<()> {
    ensure!(
        (1..=MAX_ENCODABLE_NDIGIT).contains(&ndigit),
        "ndigit must be between 1 and {MAX_ENCODABLE_NDIGIT}, got {ndigit}"
    );
    Ok(())
}

// ─── AdditionProblem ─────────────────────────────────────────────────────────
/// One `a + b` problem. Both addends fit in `ndigit` digits,
/// so the sum always fits in `ndigit + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionProblem {
    pub a:      u64,
    pub b:      u64,
    pub ndigit: usize,
}

impl AdditionProblem {
    /// Build a problem, rejecting addends wider than `ndigit` digits.
    pub fn new(a: u64, b: u64, ndigit: usize) -> Result<Self> {
        check_encodable_ndigit(ndigit)?;
        let limit = operand_space(ndigit);
        ensure!(a < limit, "a = {a} does not fit in {ndigit} digits");
        ensure!(b < limit, "b = {b} does not fit in {ndigit} digits");
        Ok(Self { a, b, ndigit })
    }

    pub fn sum(&self) -> u64 {
        self.a + self.b
    }
}

impl fmt::Display for AdditionProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let w = self.ndigit;
        write!(
            f,
            "{:0w$} + {:0w$} = {:0w1$}",
            self.a,
            self.b,
            self.sum(),
            w = w,
            w1 = w + 1
        )
    }
}

// ─── EncodedSequence ─────────────────────────────────────────────────────────
/// Fixed-length digit rendering of a problem: `3 * ndigit + 1` digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedSequence {
    digits: Vec<u8>,
    ndigit: usize,
}

impl EncodedSequence {
    /// Wrap already-rendered digits. Only data::codec builds these.
    pub(crate) fn from_digits(digits: Vec<u8>, ndigit: usize) -> Self {
        debug_assert_eq!(digits.len(), 3 * ndigit + 1);
        Self { digits, ndigit }
    }

    pub fn digits(&self) -> &[u8] {
        &self.digits
    }

    pub fn len(&self) -> usize {
        self.digits.len()
    }

    /// Split into the (x, y) next-digit prediction pair.
    ///
    /// x drops the last digit, y drops the first. The first
    /// `2 * ndigit - 1` targets are the operand digits, which the
    /// model is given rather than asked for, so they are `None`.
    pub fn training_pair(&self) -> TrainingPair {
        let n       = self.digits.len();
        let ignored = 2 * self.ndigit - 1;

        let input = self.digits[..n - 1].to_vec();
        let target = self.digits[1..]
            .iter()
            .enumerate()
            .map(|(i, &d)| if i < ignored { None } else { Some(d) })
            .collect();

        TrainingPair { input, target }
    }
}

// ─── TrainingPair ────────────────────────────────────────────────────────────
/// Input digits and next-digit targets. `None` targets carry no loss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingPair {
    pub input:  Vec<u8>,
    pub target: Vec<Option<u8>>,
}

impl TrainingPair {
    /// Number of targets that contribute to the loss.
    pub fn supervised(&self) -> usize {
        self.target.iter().filter(|t| t.is_some()).count()
    }
}

// ─── Split ───────────────────────────────────────────────────────────────────
/// Which partition of the problem space a dataset draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Split {
    Train,
    Test,
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Split::Train => f.write_str("train"),
            Split::Test  => f.write_str("test"),
        }
    }
}

impl FromStr for Split {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "train" => Ok(Split::Train),
            "test"  => Ok(Split::Test),
            other   => Err(format!("unknown split '{other}', expected 'train' or 'test'")),
        }
    }
}
