//! Bloom filter over hyperedge identifiers.
//!
//! Used as the cheap first tier of the "already visited" checks in the search
//! trees; a positive answer is always confirmed against the exact map.

use crate::{hypergraph::EdgeId, rng::splitmix64};

/// False-positive rate targeted by search trees.
pub(crate) const SEARCH_FALSE_POSITIVE_RATE: f64 = 0.01;

const MIN_BITS: usize = 64;

/// Fixed-size bloom filter with double hashing.
#[derive(Clone, Debug)]
pub(crate) struct EdgeBloom {
    bits: Vec<u64>,
    num_bits: u64,
    num_hashes: u32,
}

impl EdgeBloom {
    /// Sizes the filter for `expected_items` insertions at
    /// `false_positive_rate`.
    pub(crate) fn new(expected_items: usize, false_positive_rate: f64) -> Self {
        let n = expected_items.max(1);
        let num_bits = optimal_num_bits(n, false_positive_rate).max(MIN_BITS);
        let num_hashes = optimal_num_hashes(n, num_bits);
        let words = num_bits.div_ceil(64);
        Self {
            bits: vec![0; words],
            num_bits: u64::try_from(words * 64).unwrap_or(u64::MAX),
            num_hashes,
        }
    }

    pub(crate) fn insert(&mut self, edge: EdgeId) {
        for bit in Self::positions(edge, self.num_bits, self.num_hashes) {
            let (word, offset) = split(bit);
            if let Some(slot) = self.bits.get_mut(word) {
                *slot |= 1_u64 << offset;
            }
        }
    }

    /// `false` means definitely absent.
    pub(crate) fn might_contain(&self, edge: EdgeId) -> bool {
        Self::positions(edge, self.num_bits, self.num_hashes).all(|bit| {
            let (word, offset) = split(bit);
            self.bits
                .get(word)
                .is_some_and(|slot| slot & (1_u64 << offset) != 0)
        })
    }

    /// Bit positions of `edge`; borrows nothing from the filter.
    fn positions(edge: EdgeId, num_bits: u64, num_hashes: u32) -> impl Iterator<Item = u64> {
        let key = u64::try_from(edge).unwrap_or(u64::MAX);
        let first = splitmix64(key);
        let second = splitmix64(first) | 1;
        (0..u64::from(num_hashes))
            .map(move |i| first.wrapping_add(i.wrapping_mul(second)) % num_bits)
    }
}

fn split(bit: u64) -> (usize, u32) {
    let word = usize::try_from(bit / 64).unwrap_or(usize::MAX);
    let offset = u32::try_from(bit % 64).unwrap_or(0);
    (word, offset)
}

#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::float_arithmetic,
    reason = "filter sizing is an approximation and the result is clamped"
)]
fn optimal_num_bits(n: usize, p: f64) -> usize {
    let ln2 = std::f64::consts::LN_2;
    let bits = (-(n as f64) * p.ln() / (ln2 * ln2)).ceil();
    if bits.is_finite() && bits > 0.0 {
        bits as usize
    } else {
        MIN_BITS
    }
}

#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::float_arithmetic,
    reason = "hash count is a small rounded ratio"
)]
fn optimal_num_hashes(n: usize, m: usize) -> u32 {
    let ln2 = std::f64::consts::LN_2;
    let hashes = ((m as f64 / n as f64) * ln2).ceil();
    if hashes.is_finite() && hashes >= 1.0 {
        (hashes as u32).min(16)
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::tiny(0)]
    #[case::small(10)]
    #[case::large(5_000)]
    fn inserted_edges_are_always_found(#[case] n: usize) {
        let mut bloom = EdgeBloom::new(n, SEARCH_FALSE_POSITIVE_RATE);
        for edge in 0..n {
            bloom.insert(edge * 7);
        }
        assert!((0..n).all(|edge| bloom.might_contain(edge * 7)));
    }

    #[test]
    fn false_positive_rate_is_low() {
        let mut bloom = EdgeBloom::new(1_000, SEARCH_FALSE_POSITIVE_RATE);
        for edge in 0..1_000 {
            bloom.insert(edge);
        }
        let false_positives = (10_000..20_000)
            .filter(|&edge| bloom.might_contain(edge))
            .count();
        assert!(false_positives < 500, "got {false_positives} false positives");
    }

    #[test]
    fn insert_sets_every_position_of_the_edge() {
        let mut bloom = EdgeBloom::new(8, SEARCH_FALSE_POSITIVE_RATE);
        bloom.insert(42);
        let set: u32 = bloom.bits.iter().map(|word| word.count_ones()).sum();
        let positions: Vec<u64> =
            EdgeBloom::positions(42, bloom.num_bits, bloom.num_hashes).collect();
        assert!(positions.iter().all(|&bit| bit < bloom.num_bits));
        assert!(set >= 1 && set as usize <= positions.len());
        assert!(bloom.might_contain(42));
    }

    #[test]
    fn empty_filter_contains_nothing() {
        let bloom = EdgeBloom::new(16, SEARCH_FALSE_POSITIVE_RATE);
        assert!(!(0..100).any(|edge| bloom.might_contain(edge)));
    }
}
