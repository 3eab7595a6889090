//! Core membership filter
//!
//! INVARIANTS:
//! - `m` and `k` are fixed for the filter's lifetime
//! - bits only transition 0 -> 1; there is no remove
//! - no false negatives: after `add(key)`, `test(key)` is always true

use bitvec::prelude::*;

use super::hash_functions::hash_positions;
use super::key::NormalizedKey;
use super::parameters::{calculate_fpr, FilterDimensions};

/// Bloom filter over normalized keys.
///
/// Answers "definitely absent" (`false`) or "maybe present" (`true`).
#[derive(Clone, Debug)]
pub struct BloomFilter {
    /// Bit array storing the filter state
    bits: BitVec<u64, Lsb0>,
    /// Number of hash functions (k)
    k: usize,
    /// Size in bits (m)
    m: usize,
}

impl BloomFilter {
    /// Create an empty filter with the given dimensions.
    pub fn new(dimensions: FilterDimensions) -> Self {
        let m = dimensions.bits.max(1);
        Self {
            bits: bitvec![u64, Lsb0; 0; m],
            k: dimensions.hash_count.max(1),
            m,
        }
    }

    /// Set the `k` bit positions of `key`.
    pub fn add(&mut self, key: &NormalizedKey) {
        for pos in hash_positions(key.as_bytes(), self.k, self.m) {
            self.bits.set(pos, true);
        }
    }

    /// Test if `key` might be in the filter
    ///
    /// Returns:
    /// - `true` if the key might be in the set (could be false positive)
    /// - `false` if the key is definitely NOT in the set (never false negative)
    pub fn test(&self, key: &NormalizedKey) -> bool {
        hash_positions(key.as_bytes(), self.k, self.m).all(|pos| self.bits[pos])
    }

    /// Expected false positive rate after `n` distinct insertions.
    ///
    /// Formula: FPR = (1 - e^(-kn/m))^k
    pub fn estimated_false_positive_rate(&self, n: usize) -> f64 {
        calculate_fpr(self.m, n, self.k)
    }

    /// Get the number of bits set in the filter
    pub fn bits_set(&self) -> usize {
        self.bits.count_ones()
    }

    /// Fraction of bits set, in `[0, 1]`.
    pub fn fill_ratio(&self) -> f64 {
        self.bits_set() as f64 / self.m as f64
    }

    /// Get the filter size in bits
    pub fn size_bits(&self) -> usize {
        self.m
    }

    /// Get the number of hash functions
    pub fn hash_count(&self) -> usize {
        self.k
    }

    pub fn dimensions(&self) -> FilterDimensions {
        FilterDimensions {
            bits: self.m,
            hash_count: self.k,
        }
    }
}
