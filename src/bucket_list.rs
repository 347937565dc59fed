//! Frequency-weighted random selection.
//!
//! A [`BucketList`] maps items to integer weights and draws items with
//! probability weight/total. The buckets behave like contiguous half-open
//! intervals on `[0, total)` laid out in insertion order, so insertion order
//! decides which bucket owns a boundary draw but never changes aggregate
//! probabilities.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Picks a random item based on a specified integer weight for each item.
///
/// Weights come from frequency columns of the embedded lookup tables, e.g.
/// "this test code appeared 45,000 times". A weight of zero is legal; the
/// item simply can never be drawn.
///
/// Buckets are appended while the lookup is being built and the list is
/// read-only afterwards; `&self` draws are safe from any number of threads.
#[derive(Debug, Clone, Default)]
pub struct BucketList<T> {
    buckets: Vec<(T, u32)>,
    // running sum of all weights, maintained on add so draws never rescan
    total: u64,
}

impl<T> BucketList<T> {
    pub fn new() -> Self {
        BucketList {
            buckets: Vec::new(),
            total: 0,
        }
    }

    /// Appends a bucket which will be returned in proportion to
    /// `probability` relative to the other buckets.
    pub fn add(&mut self, probability: u32, item: T) {
        self.total += u64::from(probability);
        self.buckets.push((item, probability));
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Returns a random item based on the weight of each bucket.
    ///
    /// Panics if the list is empty or every weight is zero: that means a
    /// lookup table was packaged wrong, which is not recoverable at runtime.
    pub fn get_random(&self, rng: &mut ChaCha8Rng) -> &T {
        assert!(
            self.total > 0,
            "cannot draw from a BucketList with no positively-weighted buckets"
        );

        let mut to_pick = rng.gen_range(0..self.total) as i64;

        for (item, probability) in &self.buckets {
            to_pick -= i64::from(*probability);
            if to_pick < 0 {
                return item;
            }
        }

        unreachable!("weight walk failed to terminate; cached total out of sync")
    }

    /// Returns a random item considering only the buckets at the given
    /// indices, weighted by their probabilities within that subset.
    ///
    /// Used when only part of a lookup is valid for a draw, e.g. only the
    /// ICD-10 codes active in the admission month.
    pub fn get_random_from(&self, indices: &[usize], rng: &mut ChaCha8Rng) -> &T {
        let total: u64 = indices
            .iter()
            .map(|&i| u64::from(self.buckets[i].1))
            .sum();
        assert!(
            total > 0,
            "cannot draw from an index subset with no positively-weighted buckets"
        );

        let mut to_pick = rng.gen_range(0..total) as i64;

        for &i in indices {
            to_pick -= i64::from(self.buckets[i].1);
            if to_pick < 0 {
                return &self.buckets[i].0;
            }
        }

        unreachable!("weight walk failed to terminate; subset total out of sync")
    }

    /// The items in insertion order with their weights.
    pub fn iter(&self) -> impl Iterator<Item = (&T, u32)> {
        self.buckets.iter().map(|(item, p)| (item, *p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeded_rng::make_rng;

    #[test]
    fn one_element_always_wins() {
        let mut rng = make_rng(100, "bucket");
        let mut list = BucketList::new();
        list.add(1, "fish");

        for _ in 0..50 {
            assert_eq!(*list.get_random(&mut rng), "fish");
            assert_eq!(*list.get_random_from(&[0], &mut rng), "fish");
        }
    }

    #[test]
    fn two_elements_converge_to_weight_ratio() {
        let mut rng = make_rng(100, "bucket");
        let mut list = BucketList::new();
        // we expect twice as many blue as red
        list.add(1, "red");
        list.add(2, "blue");

        let mut count_red = 0;
        let mut count_blue = 0;
        for i in 0..1000 {
            let picked = if i % 2 == 0 {
                list.get_random(&mut rng)
            } else {
                list.get_random_from(&[0, 1], &mut rng)
            };
            match *picked {
                "red" => count_red += 1,
                "blue" => count_blue += 1,
                _ => unreachable!(),
            }
        }

        // 1000 draws at p=1/3: allow a generous sampling-error band
        assert!((233..=433).contains(&count_red), "red drawn {count_red} times");
        assert_eq!(count_red + count_blue, 1000);
        assert!(count_blue > count_red);
    }

    #[test]
    fn zero_weight_is_never_drawn() {
        let mut rng = make_rng(7, "bucket");
        let mut list = BucketList::new();
        list.add(0, "never");
        list.add(5, "always");

        for _ in 0..200 {
            assert_eq!(*list.get_random(&mut rng), "always");
        }
    }

    #[test]
    fn restricted_draw_ignores_other_buckets() {
        let mut rng = make_rng(7, "bucket");
        let mut list = BucketList::new();
        list.add(1000, "popular");
        list.add(1, "rare");

        for _ in 0..100 {
            assert_eq!(*list.get_random_from(&[1], &mut rng), "rare");
        }
    }

    #[test]
    fn same_seed_same_draw_sequence() {
        let mut list = BucketList::new();
        for (i, name) in ["a", "b", "c", "d"].iter().enumerate() {
            list.add(i as u32 + 1, *name);
        }

        let mut r1 = make_rng(500, "bucket");
        let mut r2 = make_rng(500, "bucket");
        for _ in 0..100 {
            assert_eq!(list.get_random(&mut r1), list.get_random(&mut r2));
        }
    }

    #[test]
    #[should_panic(expected = "no positively-weighted buckets")]
    fn empty_list_is_a_fatal_error() {
        let mut rng = make_rng(1, "bucket");
        let list: BucketList<&str> = BucketList::new();
        list.get_random(&mut rng);
    }
}
