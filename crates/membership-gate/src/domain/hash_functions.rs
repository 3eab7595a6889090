//! Hash functions for the membership filter
//!
//! One MurmurHash3 x64/128 digest per key, split into two 64-bit halves and
//! combined with enhanced double hashing to simulate `k` hash functions:
//!
//! `g(i) = h1 + i*h2 + (i^3 - i)/6  (mod 2^64)`
//!
//! The seed is fixed so positions are stable across processes.

use std::io::Cursor;

/// Seed for the underlying MurmurHash3 digest.
const MURMUR_SEED: u32 = 0x9747_b28c;

/// Hash bytes with MurmurHash3 x64/128, returning the two 64-bit halves.
pub fn murmur_hash_pair(element: &[u8]) -> (u64, u64) {
    let mut cursor = Cursor::new(element);
    // Reading from an in-memory cursor cannot fail.
    let hash = murmur3::murmur3_x64_128(&mut cursor, MURMUR_SEED).unwrap_or(0);
    (hash as u64, (hash >> 64) as u64)
}

/// Iterator over the `k` bit positions of an element in a filter of `m` bits.
pub struct HashPositions {
    h1: u64,
    h2: u64,
    i: u64,
    k: u64,
    m: u64,
}

impl Iterator for HashPositions {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.i >= self.k {
            return None;
        }
        let pos = (self.h1 % self.m) as usize;

        // Advance: h1 += h2, h2 += i (enhanced double hashing)
        self.h1 = self.h1.wrapping_add(self.h2);
        self.h2 = self.h2.wrapping_add(self.i);
        self.i += 1;

        Some(pos)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.k - self.i) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for HashPositions {}

/// Compute the `k` hash positions of `element`, each in `[0, m)`.
///
/// `m` must be non-zero.
pub fn hash_positions(element: &[u8], k: usize, m: usize) -> HashPositions {
    debug_assert!(m > 0, "filter must have at least one bit");
    let (h1, h2) = murmur_hash_pair(element);
    HashPositions {
        h1,
        h2,
        i: 0,
        k: k as u64,
        m: m as u64,
    }
}
