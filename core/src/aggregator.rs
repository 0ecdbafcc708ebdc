//! Result aggregation and deduplication.
//!
//! Bucket results arrive already frequency-sorted. Aggregation only
//! concatenates them in bucket priority order (4, 3, 2, 5+); buckets are never
//! re-sorted against each other.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::corpus::Bucket;
use crate::signature::WordSignature;

/// Per-bucket Strategy A results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketResults {
    buckets: [Vec<WordSignature>; 4],
}

impl BucketResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, bucket: Bucket) -> &[WordSignature] {
        &self.buckets[bucket.index()]
    }

    pub fn set(&mut self, bucket: Bucket, results: Vec<WordSignature>) {
        self.buckets[bucket.index()] = results;
    }

    /// Buckets in length order (2, 3, 4, 5+).
    pub fn iter(&self) -> impl Iterator<Item = (Bucket, &[WordSignature])> {
        Bucket::ALL.into_iter().map(move |b| (b, self.get(b)))
    }

    pub fn total(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl FromIterator<(Bucket, Vec<WordSignature>)> for BucketResults {
    fn from_iter<I: IntoIterator<Item = (Bucket, Vec<WordSignature>)>>(iter: I) -> Self {
        let mut out = BucketResults::new();
        for (b, v) in iter {
            out.set(b, v);
        }
        out
    }
}

/// Concatenate buckets in priority order: 4, 3, 2, then 5+.
pub fn aggregate(results: &BucketResults) -> Vec<WordSignature> {
    Bucket::PRIORITY
        .iter()
        .flat_map(|b| results.get(*b).iter().cloned())
        .collect()
}

/// Drop entries whose trailing two characters were already seen, keeping the
/// first occurrence.
pub fn dedup_by_trailing_pair(ranked: Vec<WordSignature>) -> Vec<WordSignature> {
    let mut seen = AHashSet::new();
    ranked
        .into_iter()
        .filter(|s| seen.insert(s.trailing_pair()))
        .collect()
}

/// Reduce extension matches to one entry per trailing character.
///
/// The highest-rate record survives for each character; survivors are ordered
/// by descending rate and capped at `cap`.
pub fn dedup_extensions(mut matches: Vec<WordSignature>, cap: usize) -> Vec<WordSignature> {
    matches.sort_by(|a, b| b.rate.cmp(&a.rate));
    let mut seen = AHashSet::new();
    matches
        .into_iter()
        .filter(|s| s.trailing_char().map(|c| seen.insert(c)).unwrap_or(false))
        .take(cap)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(word: &str, rate: u64) -> WordSignature {
        WordSignature {
            word: word.into(),
            length: word.chars().count(),
            rate,
            initial: String::new(),
            final_with_tone: String::new(),
            final_without_tone: String::new(),
            type_with_tone: String::new(),
            type_without_tone: String::new(),
        }
    }

    fn words(v: &[WordSignature]) -> Vec<&str> {
        v.iter().map(|s| s.word.as_str()).collect()
    }

    #[test]
    fn priority_order_is_four_three_two_five() {
        let results: BucketResults = vec![
            (Bucket::Two, vec![rec("烦恼", 90), rec("苦恼", 80)]),
            (Bucket::Three, vec![rec("小烦恼", 70)]),
            (Bucket::Four, vec![rec("自寻烦恼", 10)]),
            (Bucket::FivePlus, vec![rec("庸人自扰之", 99)]),
        ]
        .into_iter()
        .collect();
        let ranked = aggregate(&results);
        assert_eq!(
            words(&ranked),
            vec!["自寻烦恼", "小烦恼", "烦恼", "苦恼", "庸人自扰之"]
        );
        assert_eq!(results.total(), 5);
    }

    #[test]
    fn trailing_pair_dedup_keeps_first() {
        let ranked = vec![rec("自寻烦恼", 10), rec("小烦恼", 70), rec("烦恼", 90), rec("苦恼", 5)];
        let out = dedup_by_trailing_pair(ranked);
        assert_eq!(words(&out), vec!["自寻烦恼", "苦恼"]);
    }

    #[test]
    fn distinct_pairs_survive() {
        let ranked = vec![rec("苦恼", 10), rec("烦恼", 8), rec("较少", 5)];
        let out = dedup_by_trailing_pair(ranked);
        assert_eq!(words(&out), vec!["苦恼", "烦恼", "较少"]);
    }

    #[test]
    fn extension_dedup_by_trailing_char() {
        let matches = vec![rec("烦恼", 8), rec("苦恼", 10), rec("较少", 5), rec("多少", 7)];
        let out = dedup_extensions(matches, 18);
        assert_eq!(words(&out), vec!["苦恼", "多少"]);
    }

    #[test]
    fn extension_cap() {
        let matches: Vec<_> = "甲乙丙丁戊己庚辛壬癸子丑寅卯辰巳午未申酉"
            .chars()
            .enumerate()
            .map(|(i, c)| rec(&format!("天{c}"), 100 - i as u64))
            .collect();
        let out = dedup_extensions(matches, 18);
        assert_eq!(out.len(), 18);
        assert_eq!(out[0].word, "天甲");
    }
}
