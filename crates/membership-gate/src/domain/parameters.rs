//! Filter sizing policy
//!
//! Formulas:
//! - m = ceil(-n*ln(p) / (ln(2)^2)), rounded up to a multiple of [`BIT_ALIGNMENT`]
//! - k = max(1, round((m/n) * ln(2)))        -- computed from the unaligned m
//! - FPR(n) = (1 - e^(-kn/m))^k

use serde::{Deserialize, Serialize};
use std::f64::consts::LN_2;

use crate::error::GateError;

/// Bit-array sizes are rounded up to a multiple of this many bits.
pub const BIT_ALIGNMENT: usize = 32;

/// Dimensions of a filter: bit-array size and hash-function count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDimensions {
    /// Number of bits in the filter (m), a multiple of [`BIT_ALIGNMENT`]
    pub bits: usize,
    /// Number of hash functions (k), at least 1
    pub hash_count: usize,
}

/// Compute filter dimensions for `expected_items` at `false_positive_probability`.
///
/// Pure and deterministic. Out-of-range inputs are rejected, never clamped:
/// `expected_items` must be positive and the probability must lie strictly
/// inside `(0, 1)`.
pub fn compute_dimensions(
    expected_items: usize,
    false_positive_probability: f64,
) -> Result<FilterDimensions, GateError> {
    if expected_items == 0 {
        return Err(GateError::InvalidParameter {
            name: "expected_items",
            reason: "must be a positive integer, got 0".to_string(),
        });
    }
    validate_probability(false_positive_probability)?;

    let n = expected_items as f64;
    let raw_bits = (-(n * false_positive_probability.ln()) / (LN_2 * LN_2)).ceil();
    let max_bits = (usize::MAX - BIT_ALIGNMENT) as f64;
    if !raw_bits.is_finite() || raw_bits > max_bits {
        return Err(GateError::InvalidParameter {
            name: "expected_items",
            reason: format!(
                "{expected_items} items at p={false_positive_probability} needs more bits than addressable"
            ),
        });
    }

    let raw_bits = raw_bits as usize;
    let hash_count = (((raw_bits as f64 / n) * LN_2).round() as usize).max(1);
    let bits = align_bits(raw_bits.max(1));

    Ok(FilterDimensions { bits, hash_count })
}

/// Reject probabilities outside the open interval `(0, 1)`, including NaN.
pub fn validate_probability(p: f64) -> Result<(), GateError> {
    if p > 0.0 && p < 1.0 {
        Ok(())
    } else {
        Err(GateError::InvalidParameter {
            name: "false_positive_probability",
            reason: format!("must lie strictly between 0 and 1, got {p}"),
        })
    }
}

/// Round `bits` up to the next multiple of [`BIT_ALIGNMENT`].
fn align_bits(bits: usize) -> usize {
    bits.div_ceil(BIT_ALIGNMENT) * BIT_ALIGNMENT
}

/// Calculate the false positive rate for given parameters
///
/// Formula: FPR = (1 - e^(-kn/m))^k
pub fn calculate_fpr(m: usize, n: usize, k: usize) -> f64 {
    if m == 0 {
        return 1.0;
    }
    let exponent = -(k as f64) * (n as f64) / (m as f64);
    (1.0 - exponent.exp()).powi(k as i32)
}
