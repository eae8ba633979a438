//! MinHash sketching
//!
//! A sketch is the per-permutation minimum of universal hashes over the
//! token set of a text. The fraction of positions where two sketches agree
//! is an unbiased estimate of the Jaccard similarity of the underlying sets.

use std::collections::HashSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Permutation coefficients are derived from a fixed seed so every index in
/// a process sketches identically; the sketch space is still private to the
/// process because nothing is persisted.
const PERMUTATION_SEED: u64 = 0x00c0_ffee_cafe_d00d;

/// Splits text into lower-cased alphanumeric words plus overlapping 3-char
/// substrings per word, which captures small lexical variation (plurals,
/// typos, inflections). Returned as a set: MinHash is insensitive to token
/// multiplicity.
pub fn tokenize(text: &str) -> HashSet<String> {
    let mut tokens = HashSet::new();
    let lowered = text.to_lowercase();

    for word in lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        tokens.insert(word.to_string());

        let chars: Vec<char> = word.chars().collect();

        if chars.len() > 3 {
            for window in chars.windows(3) {
                tokens.insert(window.iter().collect());
            }
        }
    }

    tokens
}

fn base_hash(token: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    token.hash(&mut hasher);
    hasher.finish()
}

/// Fixed-size MinHash sketcher
#[derive(Debug, Clone)]
pub struct MinHasher {
    /// (multiplier, offset) pairs, multipliers forced odd
    params: Vec<(u64, u64)>,
}

impl MinHasher {
    pub fn new(num_perm: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(PERMUTATION_SEED);
        let params = (0..num_perm)
            .map(|_| (rng.next_u64() | 1, rng.next_u64()))
            .collect();

        Self { params }
    }

    pub fn num_perm(&self) -> usize {
        self.params.len()
    }

    /// Sketches the token set of `text`. An empty text yields a sketch of
    /// `u64::MAX` values, which never matches a non-empty sketch.
    pub fn sketch(&self, text: &str) -> Vec<u64> {
        let tokens = tokenize(text);
        let mut sketch = vec![u64::MAX; self.params.len()];

        for token in &tokens {
            let h = base_hash(token);

            for (slot, (a, b)) in sketch.iter_mut().zip(&self.params) {
                let permuted = a.wrapping_mul(h).wrapping_add(*b);

                if permuted < *slot {
                    *slot = permuted;
                }
            }
        }

        sketch
    }

    /// Estimated Jaccard similarity of the sets behind two sketches.
    pub fn similarity(a: &[u64], b: &[u64]) -> f64 {
        if a.is_empty() || a.len() != b.len() {
            return 0.0;
        }

        let matching = a.iter().zip(b).filter(|(x, y)| x == y).count();
        matching as f64 / a.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_lowercases_and_splits() {
        let tokens = tokenize("Hello, World!");
        assert!(tokens.contains("hello"));
        assert!(tokens.contains("world"));
        assert!(!tokens.contains("Hello"));
    }

    #[test]
    fn test_tokenize_adds_trigrams_for_long_words() {
        let tokens = tokenize("marketing");
        assert!(tokens.contains("marketing"));
        assert!(tokens.contains("mar"));
        assert!(tokens.contains("ing"));
    }

    #[test]
    fn test_tokenize_short_words_have_no_trigrams() {
        let tokens = tokenize("the cat");
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn test_tokenize_is_char_boundary_safe() {
        // Multibyte characters must not panic the windowing.
        let tokens = tokenize("caché résumé 日本語のテキスト");
        assert!(tokens.contains("caché"));
        assert!(!tokens.is_empty());
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("!!! ... ???").is_empty());
    }

    #[test]
    fn test_sketch_has_fixed_length() {
        let hasher = MinHasher::new(64);
        assert_eq!(hasher.sketch("some text").len(), 64);
        assert_eq!(hasher.num_perm(), 64);
    }

    #[test]
    fn test_identical_texts_have_identical_sketches() {
        let hasher = MinHasher::new(128);
        let a = hasher.sketch("content marketing drives organic growth");
        let b = hasher.sketch("content marketing drives organic growth");

        assert_eq!(a, b);
        assert!((MinHasher::similarity(&a, &b) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_texts_have_low_estimate() {
        let hasher = MinHasher::new(128);
        let a = hasher.sketch("zygote plasma quartz");
        let b = hasher.sketch("umbrella fjord whisky");

        // Statistical bound, not equality: disjoint sets estimate near zero.
        assert!(MinHasher::similarity(&a, &b) < 0.15);
    }

    #[test]
    fn test_estimate_tracks_overlap() {
        let hasher = MinHasher::new(128);
        let base = "alpha bravo charlie delta echo foxtrot golf hotel india juliet";
        let near = "alpha bravo charlie delta echo foxtrot golf hotel india quebec";
        let far = "kilo lima mike november oscar papa romeo sierra tango uniform";

        let sketch_base = hasher.sketch(base);
        let near_estimate = MinHasher::similarity(&sketch_base, &hasher.sketch(near));
        let far_estimate = MinHasher::similarity(&sketch_base, &hasher.sketch(far));

        assert!(near_estimate > 0.6);
        assert!(far_estimate < 0.3);
        assert!(near_estimate > far_estimate);
    }

    #[test]
    fn test_empty_sketch_never_matches_content() {
        let hasher = MinHasher::new(32);
        let empty = hasher.sketch("");
        let full = hasher.sketch("words exist here");

        assert!(MinHasher::similarity(&empty, &full) < 1e-9);
    }

    #[test]
    fn test_similarity_of_mismatched_lengths_is_zero() {
        assert_eq!(MinHasher::similarity(&[1, 2], &[1, 2, 3]), 0.0);
        assert_eq!(MinHasher::similarity(&[], &[]), 0.0);
    }
}
