//! Locality-sensitive hashing over MinHash sketches
//!
//! Sketches are cut into `bands` slices of `rows` values each; each slice is
//! hashed into a per-band bucket. Two texts collide when at least one band
//! slice matches exactly. The probability of collision for a pair with
//! Jaccard similarity `s` is `1 - (1 - s^rows)^bands`.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Required collision probability for a pair sitting exactly at the
/// configured threshold. Driving parameter selection from recall keeps
/// above-threshold pairs from being silently dropped; the cost is extra
/// candidates below threshold, which callers treat as expected noise.
const TARGET_RECALL_AT_THRESHOLD: f64 = 0.995;

/// Banding parameters derived from a similarity threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandPlan {
    pub bands: usize,
    pub rows: usize,
}

impl BandPlan {
    /// Picks the most selective plan (largest `rows`) whose collision
    /// probability at the threshold still meets the recall target.
    pub fn for_threshold(num_perm: usize, threshold: f64) -> Self {
        for rows in (1..=num_perm).rev() {
            let bands = num_perm / rows;

            if bands == 0 {
                continue;
            }

            if Self::collision_probability(bands, rows, threshold) >= TARGET_RECALL_AT_THRESHOLD {
                return Self { bands, rows };
            }
        }

        // rows = 1 always reaches the target for any threshold < 1; this is
        // only hit for degenerate inputs such as num_perm = 0.
        Self {
            bands: num_perm.max(1),
            rows: 1,
        }
    }

    /// `1 - (1 - s^rows)^bands`
    pub fn collision_probability(bands: usize, rows: usize, similarity: f64) -> f64 {
        1.0 - (1.0 - similarity.powi(rows as i32)).powi(bands as i32)
    }
}

fn band_hash(slice: &[u64]) -> u64 {
    let mut hasher = DefaultHasher::new();
    slice.hash(&mut hasher);
    hasher.finish()
}

/// Bucket table: one `HashMap<band hash, keys>` per band.
///
/// Keys are only ever appended; stale keys left behind by side-table removal
/// are filtered by the caller at query time.
#[derive(Debug)]
pub struct LshBuckets {
    plan: BandPlan,
    bands: Vec<HashMap<u64, Vec<String>>>,
}

impl LshBuckets {
    pub fn new(plan: BandPlan) -> Self {
        Self {
            plan,
            bands: (0..plan.bands).map(|_| HashMap::new()).collect(),
        }
    }

    pub fn insert(&mut self, key: &str, sketch: &[u64]) {
        for (band, table) in self.bands.iter_mut().enumerate() {
            let slice = Self::band_slice(sketch, band, self.plan.rows);
            table
                .entry(band_hash(slice))
                .or_default()
                .push(key.to_string());
        }
    }

    /// Yields candidate keys in band order, duplicates included; the caller
    /// deduplicates while filtering against its side table.
    pub fn candidates<'a>(&'a self, sketch: &[u64]) -> impl Iterator<Item = &'a str> {
        let rows = self.plan.rows;

        self.bands.iter().enumerate().flat_map(move |(band, table)| {
            let slice = Self::band_slice(sketch, band, rows);
            table
                .get(&band_hash(slice))
                .map(|keys| keys.iter().map(String::as_str))
                .into_iter()
                .flatten()
        })
    }

    pub fn clear(&mut self) {
        for table in &mut self.bands {
            table.clear();
        }
    }

    fn band_slice(sketch: &[u64], band: usize, rows: usize) -> &[u64] {
        let start = band * rows;
        &sketch[start..start + rows]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_uses_all_or_fewer_permutations() {
        let plan = BandPlan::for_threshold(128, 0.85);
        assert!(plan.bands * plan.rows <= 128);
        assert!(plan.rows >= 1);
    }

    #[test]
    fn test_plan_meets_recall_target_at_threshold() {
        for threshold in [0.5, 0.7, 0.85, 0.95] {
            let plan = BandPlan::for_threshold(128, threshold);
            let p = BandPlan::collision_probability(plan.bands, plan.rows, threshold);
            assert!(p >= 0.995, "threshold {threshold}: recall {p}");
        }
    }

    #[test]
    fn test_plan_is_more_selective_for_higher_thresholds() {
        let low = BandPlan::for_threshold(128, 0.5);
        let high = BandPlan::for_threshold(128, 0.9);
        assert!(high.rows >= low.rows);
    }

    #[test]
    fn test_near_zero_similarity_rarely_collides() {
        let plan = BandPlan::for_threshold(128, 0.85);
        let p = BandPlan::collision_probability(plan.bands, plan.rows, 0.05);
        assert!(p < 0.001);
    }

    #[test]
    fn test_identical_sketches_collide() {
        let plan = BandPlan::for_threshold(16, 0.85);
        let mut buckets = LshBuckets::new(plan);
        let sketch: Vec<u64> = (0..16).collect();

        buckets.insert("key-1", &sketch);

        let candidates: Vec<&str> = buckets.candidates(&sketch).collect();
        assert!(candidates.contains(&"key-1"));
    }

    #[test]
    fn test_unrelated_sketches_do_not_collide() {
        let plan = BandPlan::for_threshold(16, 0.85);
        let mut buckets = LshBuckets::new(plan);
        let a: Vec<u64> = (0..16).collect();
        let b: Vec<u64> = (100..116).collect();

        buckets.insert("key-a", &a);

        assert_eq!(buckets.candidates(&b).count(), 0);
    }

    #[test]
    fn test_clear_empties_every_band() {
        let plan = BandPlan::for_threshold(16, 0.85);
        let mut buckets = LshBuckets::new(plan);
        let sketch: Vec<u64> = (0..16).collect();

        buckets.insert("key-1", &sketch);
        buckets.clear();

        assert_eq!(buckets.candidates(&sketch).count(), 0);
    }
}
