// ============================================================
// Layer 4 — Addition Problem Codec
// ============================================================
// Converts addition problems to and from fixed-length digit
// sequences. Every digit is its own token, so the vocabulary
// is just 0..=9.
//
//   encode(85, 50, ndigit=2)
//     a → "85", b → "50", c = 135 → "135"
//     → [8,5, 5,0, 1,3,5]
//
//   decode_sum([.., 1,3,5], ndigit=2)
//     → 1*100 + 3*10 + 5*1 = 135
//
//   index_to_problem(8550, ndigit=2)
//     → a = 8550 / 100 = 85, b = 8550 % 100 = 50
//
// All functions are pure; nothing here touches tensors.

use anyhow::{bail, ensure, Result};

use crate::domain::problem::{check_encodable_ndigit, operand_space, AdditionProblem, EncodedSequence};

/// One token per decimal digit.
pub const VOCAB_SIZE: usize = 10;

/// Target value that the loss skips. Matches the usual
/// cross-entropy ignore index.
pub const IGNORE_INDEX: i64 = -100;

/// Length of an encoded sequence for `ndigit`-digit addends.
pub fn sequence_len(ndigit: usize) -> usize {
    3 * ndigit + 1
}

/// Model context length: the sequence minus its last digit.
pub fn block_size(ndigit: usize) -> usize {
    sequence_len(ndigit) - 1
}

/// Total number of distinct `(a, b)` problems.
pub fn problem_space(ndigit: usize) -> u64 {
    operand_space(ndigit) * operand_space(ndigit)
}

/// Zero-padded big-endian decimal digits of `value`, exactly `width` long.
/// Digits above `width` are dropped, so callers must check range first.
pub fn to_digits(mut value: u64, width: usize) -> Vec<u8> {
    let mut digits = vec![0u8; width];
    for slot in digits.iter_mut().rev() {
        *slot = (value % 10) as u8;
        value /= 10;
    }
    digits
}

/// Big-endian weighted sum: [1,3,5] → 135.
pub fn digits_to_int(digits: &[u8]) -> u64 {
    digits
        .iter()
        .fold(0u64, |acc, &d| acc * 10 + u64::from(d))
}

// ─── Encode ──────────────────────────────────────────────────────────────────

/// Render a validated problem as [a-digits, b-digits, c-digits].
pub fn encode_problem(problem: &AdditionProblem) -> EncodedSequence {
    let nd = problem.ndigit;
    let mut digits = Vec::with_capacity(sequence_len(nd));
    digits.extend(to_digits(problem.a, nd));
    digits.extend(to_digits(problem.b, nd));
    digits.extend(to_digits(problem.sum(), nd + 1));
    EncodedSequence::from_digits(digits, nd)
}

/// Encode `a + b`. Fails if either addend is wider than `ndigit` digits.
pub fn encode(a: u64, b: u64, ndigit: usize) -> Result<EncodedSequence> {
    let problem = AdditionProblem::new(a, b, ndigit)?;
    Ok(encode_problem(&problem))
}

// ─── Decode ──────────────────────────────────────────────────────────────────

/// Interpret the last `ndigit + 1` digits of `digits` as the sum.
/// Used to score model output, which may be any length ≥ ndigit + 1.
pub fn decode_sum(digits: &[u8], ndigit: usize) -> Result<u64> {
    let width = ndigit + 1;
    ensure!(
        digits.len() >= width,
        "need at least {width} digits to decode a sum, got {}",
        digits.len()
    );
    check_digits(digits)?;
    Ok(digits_to_int(&digits[digits.len() - width..]))
}

/// Full inverse of `encode`: recover (a, b, c).
pub fn decode(digits: &[u8], ndigit: usize) -> Result<(u64, u64, u64)> {
    check_encodable_ndigit(ndigit)?;
    ensure!(
        digits.len() == sequence_len(ndigit),
        "expected {} digits for ndigit={ndigit}, got {}",
        sequence_len(ndigit),
        digits.len()
    );
    check_digits(digits)?;

    let a = digits_to_int(&digits[..ndigit]);
    let b = digits_to_int(&digits[ndigit..2 * ndigit]);
    let c = digits_to_int(&digits[2 * ndigit..]);
    Ok((a, b, c))
}

fn check_digits(digits: &[u8]) -> Result<()> {
    if let Some(bad) = digits.iter().find(|&&d| d > 9) {
        bail!("{bad} is not a decimal digit");
    }
    Ok(())
}

// ─── Index mapping ───────────────────────────────────────────────────────────

/// Map a flat index in `[0, 10^(2*ndigit))` to its `(a, b)` problem.
pub fn index_to_problem(index: u64, ndigit: usize) -> Result<AdditionProblem> {
    check_encodable_ndigit(ndigit)?;
    let total = problem_space(ndigit);
    ensure!(index < total, "problem index {index} out of range 0..{total}");

    let nd = operand_space(ndigit);
    AdditionProblem::new(index / nd, index % nd, ndigit)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_examples() {
        assert_eq!(encode(85, 50, 2).unwrap().digits(), &[8, 5, 5, 0, 1, 3, 5]);
        assert_eq!(encode(6, 39, 2).unwrap().digits(), &[0, 6, 3, 9, 0, 4, 5]);
    }

    #[test]
    fn test_encoded_length_is_fixed() {
        for ndigit in 1..=4 {
            let max = operand_space(ndigit) - 1;
            for (a, b) in [(0, 0), (max, max), (max, 0), (1, max)] {
                assert_eq!(encode(a, b, ndigit).unwrap().len(), 3 * ndigit + 1);
            }
        }
    }

    #[test]
    fn test_decode_inverts_encode_exhaustively_for_two_digits() {
        for a in 0..100 {
            for b in 0..100 {
                let seq = encode(a, b, 2).unwrap();
                assert_eq!(decode(seq.digits(), 2).unwrap(), (a, b, a + b));
            }
        }
    }

    #[test]
    fn test_decode_inverts_encode_for_wide_operands() {
        for (a, b) in [(1234, 9876), (9999, 9999), (0, 1), (500, 4500)] {
            let seq = encode(a, b, 4).unwrap();
            assert_eq!(decode(seq.digits(), 4).unwrap(), (a, b, a + b));
        }
    }

    #[test]
    fn test_round_trip_beyond_dataset_widths() {
        for ndigit in 5..=9 {
            let max = operand_space(ndigit) - 1;
            for (a, b) in [(0, 0), (max, max), (max / 3, max / 7), (1, max)] {
                let seq = encode(a, b, ndigit).unwrap();
                assert_eq!(seq.len(), 3 * ndigit + 1);
                assert_eq!(decode(seq.digits(), ndigit).unwrap(), (a, b, a + b));
            }
        }
        assert_eq!(encode(12345, 67890, 5).unwrap().digits()[10..], [0, 8, 0, 2, 3, 5]);
    }

    #[test]
    fn test_index_mapping_beyond_dataset_widths() {
        let p = index_to_problem(1_234_567_890, 5).unwrap();
        assert_eq!((p.a, p.b), (12345, 67890));

        let last = problem_space(9) - 1;
        let p = index_to_problem(last, 9).unwrap();
        assert_eq!((p.a, p.b), (999_999_999, 999_999_999));
        assert!(index_to_problem(0, 10).is_err());
    }

    #[test]
    fn test_encode_rejects_out_of_range() {
        assert!(encode(100, 0, 2).is_err());
        assert!(encode(0, 10, 1).is_err());
    }

    #[test]
    fn test_decode_sum_reads_trailing_digits() {
        // Predicted sequence: prefix plus three sampled digits
        assert_eq!(decode_sum(&[8, 5, 5, 0, 1, 3, 5], 2).unwrap(), 135);
        assert_eq!(decode_sum(&[0, 4, 5], 2).unwrap(), 45);
        assert!(decode_sum(&[4, 5], 2).is_err());
        assert!(decode_sum(&[0, 12, 5], 2).is_err());
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        assert!(decode(&[1, 2, 3], 2).is_err());
    }

    #[test]
    fn test_index_mapping_is_a_bijection() {
        let ndigit = 2;
        let mut seen = std::collections::HashSet::new();
        for idx in 0..problem_space(ndigit) {
            let p = index_to_problem(idx, ndigit).unwrap();
            assert_eq!(p.a * 100 + p.b, idx);
            assert!(seen.insert((p.a, p.b)));
        }
        assert_eq!(seen.len(), 10_000);
        assert!(index_to_problem(10_000, ndigit).is_err());
    }

    #[test]
    fn test_index_mapping_example() {
        let p = index_to_problem(8550, 2).unwrap();
        assert_eq!((p.a, p.b), (85, 50));
    }

    #[test]
    fn test_digits_helpers() {
        assert_eq!(to_digits(45, 3), vec![0, 4, 5]);
        assert_eq!(digits_to_int(&[0, 4, 5]), 45);
        assert_eq!(digits_to_int(&[]), 0);
    }
}
