//! Corpus repository abstraction.
//!
//! The corpus is a read-only (from the engine's point of view) collection of
//! `WordSignature` records. Queries are composed from a handful of predicate
//! kinds: word inequality, token-suffix / raw-suffix matches on the two
//! signature fields, and a numeric range on `length`. Any storage that can
//! evaluate those efficiently can back the engine; `InMemoryCorpus` and
//! `store::RedbCorpus` are the two shipped here.

use std::fmt;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::error::RepositoryError;
use crate::signature::{WordSignature, SEPARATOR};

/// Length buckets of the summary view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bucket {
    Two,
    Three,
    Four,
    /// Five characters or more.
    FivePlus,
}

impl Bucket {
    /// Buckets in length order.
    pub const ALL: [Bucket; 4] = [Bucket::Two, Bucket::Three, Bucket::Four, Bucket::FivePlus];

    /// Buckets in the order aggregated results are presented.
    pub const PRIORITY: [Bucket; 4] = [Bucket::Four, Bucket::Three, Bucket::Two, Bucket::FivePlus];

    pub fn length(self) -> LengthConstraint {
        match self {
            Bucket::Two => LengthConstraint::Exactly(2),
            Bucket::Three => LengthConstraint::Exactly(3),
            Bucket::Four => LengthConstraint::Exactly(4),
            Bucket::FivePlus => LengthConstraint::AtLeast(5),
        }
    }

    pub fn index(self) -> usize {
        match self {
            Bucket::Two => 0,
            Bucket::Three => 1,
            Bucket::Four => 2,
            Bucket::FivePlus => 3,
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bucket::Two => write!(f, "2"),
            Bucket::Three => write!(f, "3"),
            Bucket::Four => write!(f, "4"),
            Bucket::FivePlus => write!(f, "5+"),
        }
    }
}

/// Numeric predicate on a record's `length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthConstraint {
    Exactly(usize),
    AtLeast(usize),
}

impl LengthConstraint {
    /// Constraint for a caller-requested length `L`: exact below 5, `≥ L`
    /// from 5 up (5 is the "five or more" catch-all). 0 means the default of 2.
    pub fn for_requested(length: usize) -> Self {
        match length {
            0 => LengthConstraint::Exactly(2),
            l if l < 5 => LengthConstraint::Exactly(l),
            l => LengthConstraint::AtLeast(l),
        }
    }

    pub fn matches(self, length: usize) -> bool {
        match self {
            LengthConstraint::Exactly(n) => length == n,
            LengthConstraint::AtLeast(n) => length >= n,
        }
    }

    /// Smallest length accepted.
    pub fn min(self) -> usize {
        match self {
            LengthConstraint::Exactly(n) | LengthConstraint::AtLeast(n) => n,
        }
    }

    /// Largest length accepted, if bounded.
    pub fn max(self) -> Option<usize> {
        match self {
            LengthConstraint::Exactly(n) => Some(n),
            LengthConstraint::AtLeast(_) => None,
        }
    }
}

/// String predicate on one signature field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureMatch {
    /// No constraint.
    Any,
    /// Field equals the key, or ends with `-` followed by the key.
    TokenSuffix(String),
    /// Field ends with the raw pattern.
    EndsWith(String),
}

impl SignatureMatch {
    /// Token suffix match; an empty key matches anything.
    pub fn token_suffix(key: &str) -> Self {
        if key.is_empty() {
            SignatureMatch::Any
        } else {
            SignatureMatch::TokenSuffix(key.to_string())
        }
    }

    pub fn matches(&self, field: &str) -> bool {
        match self {
            SignatureMatch::Any => true,
            SignatureMatch::TokenSuffix(key) => {
                field == key
                    || (field.len() > key.len()
                        && field.ends_with(key.as_str())
                        && field[..field.len() - key.len()].ends_with(SEPARATOR))
            }
            SignatureMatch::EndsWith(pattern) => field.ends_with(pattern.as_str()),
        }
    }
}

/// A composed corpus query. Results are ordered by descending `rate` and
/// capped at `limit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusQuery {
    pub exclude_word: String,
    pub tone_free: SignatureMatch,
    pub tone: SignatureMatch,
    pub length: LengthConstraint,
    pub limit: usize,
}

impl CorpusQuery {
    /// Bucketed match: token suffix on both signature fields.
    pub fn bucket(
        exclude_word: &str,
        tone_free_suffix: &str,
        tone_suffix: &str,
        length: LengthConstraint,
        limit: usize,
    ) -> Self {
        Self {
            exclude_word: exclude_word.to_string(),
            tone_free: SignatureMatch::token_suffix(tone_free_suffix),
            tone: SignatureMatch::token_suffix(tone_suffix),
            length,
            limit,
        }
    }

    /// Extension match: the last tone token must match exactly and the
    /// penultimate token only on its tone digit.
    pub fn extension(
        exclude_word: &str,
        last_token: &str,
        penultimate_tone: u8,
        tone_free_suffix: &str,
        length: LengthConstraint,
        limit: usize,
    ) -> Self {
        Self {
            exclude_word: exclude_word.to_string(),
            tone_free: SignatureMatch::token_suffix(tone_free_suffix),
            tone: SignatureMatch::EndsWith(format!(".{penultimate_tone}{SEPARATOR}{last_token}")),
            length,
            limit,
        }
    }

    /// Evaluate every predicate except the limit.
    pub fn matches(&self, sig: &WordSignature) -> bool {
        sig.word != self.exclude_word
            && self.length.matches(sig.length)
            && self.tone_free.matches(&sig.type_without_tone)
            && self.tone.matches(&sig.type_with_tone)
    }
}

/// Read access to a pre-classified corpus.
pub trait CorpusRepository: Send + Sync {
    /// Records matching `query`, descending by `rate`, at most `query.limit`.
    fn find(&self, query: &CorpusQuery) -> Result<Vec<WordSignature>, RepositoryError>;

    /// Exact lookup by word.
    fn get(&self, word: &str) -> Result<Option<WordSignature>, RepositoryError>;

    fn find_by_bucket(
        &self,
        exclude_word: &str,
        tone_free_suffix: &str,
        tone_suffix: &str,
        length: LengthConstraint,
        limit: usize,
    ) -> Result<Vec<WordSignature>, RepositoryError> {
        self.find(&CorpusQuery::bucket(
            exclude_word,
            tone_free_suffix,
            tone_suffix,
            length,
            limit,
        ))
    }

    fn find_by_extension(
        &self,
        exclude_word: &str,
        last_token: &str,
        penultimate_tone: u8,
        tone_free_suffix: &str,
        length: LengthConstraint,
        limit: usize,
    ) -> Result<Vec<WordSignature>, RepositoryError> {
        self.find(&CorpusQuery::extension(
            exclude_word,
            last_token,
            penultimate_tone,
            tone_free_suffix,
            length,
            limit,
        ))
    }
}

impl<R: CorpusRepository + ?Sized> CorpusRepository for &R {
    fn find(&self, query: &CorpusQuery) -> Result<Vec<WordSignature>, RepositoryError> {
        (**self).find(query)
    }

    fn get(&self, word: &str) -> Result<Option<WordSignature>, RepositoryError> {
        (**self).get(word)
    }
}

impl<R: CorpusRepository + ?Sized> CorpusRepository for std::sync::Arc<R> {
    fn find(&self, query: &CorpusQuery) -> Result<Vec<WordSignature>, RepositoryError> {
        (**self).find(query)
    }

    fn get(&self, word: &str) -> Result<Option<WordSignature>, RepositoryError> {
        (**self).get(word)
    }
}

/// Sort by descending rate (stable) and cap.
pub(crate) fn rank_and_cap(mut records: Vec<WordSignature>, limit: usize) -> Vec<WordSignature> {
    records.sort_by(|a, b| b.rate.cmp(&a.rate));
    records.truncate(limit);
    records
}

/// In-memory corpus partitioned by word length.
///
/// Each partition is kept in descending-rate order so exact-length queries can
/// stop as soon as `limit` matches are found.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCorpus {
    partitions: AHashMap<usize, Vec<WordSignature>>,
}

impl InMemoryCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, replacing any existing record for the same word.
    pub fn insert(&mut self, sig: WordSignature) {
        let bucket = self.partitions.entry(sig.length).or_default();
        bucket.retain(|e| e.word != sig.word);
        let at = bucket.partition_point(|e| e.rate >= sig.rate);
        bucket.insert(at, sig);
    }

    pub fn extend<I: IntoIterator<Item = WordSignature>>(&mut self, records: I) {
        for r in records {
            self.insert(r);
        }
    }

    pub fn len(&self) -> usize {
        self.partitions.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<WordSignature> for InMemoryCorpus {
    fn from_iter<I: IntoIterator<Item = WordSignature>>(iter: I) -> Self {
        let mut c = InMemoryCorpus::new();
        c.extend(iter);
        c
    }
}

impl CorpusRepository for InMemoryCorpus {
    fn find(&self, query: &CorpusQuery) -> Result<Vec<WordSignature>, RepositoryError> {
        if let LengthConstraint::Exactly(n) = query.length {
            let out = self
                .partitions
                .get(&n)
                .map(|bucket| {
                    bucket
                        .iter()
                        .filter(|s| query.matches(s))
                        .take(query.limit)
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            return Ok(out);
        }

        let mut lengths: Vec<usize> = self
            .partitions
            .keys()
            .copied()
            .filter(|l| query.length.matches(*l))
            .collect();
        lengths.sort_unstable();

        let mut out = Vec::new();
        for l in lengths {
            out.extend(
                self.partitions[&l]
                    .iter()
                    .filter(|s| query.matches(s))
                    .take(query.limit)
                    .cloned(),
            );
        }
        Ok(rank_and_cap(out, query.limit))
    }

    fn get(&self, word: &str) -> Result<Option<WordSignature>, RepositoryError> {
        let length = word.chars().count();
        Ok(self
            .partitions
            .get(&length)
            .and_then(|b| b.iter().find(|s| s.word == word).cloned()))
    }
}
