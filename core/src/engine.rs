// librhyme/core/src/engine.rs
//
// Rhyme engine: transcription -> ü correction -> classification -> signature
// -> query key -> corpus matching -> aggregation.
//
// The engine holds no per-search state. The corpus lookups of one search are
// independent and are issued in parallel on the rayon pool when
// `RhymeConfig::concurrent_lookups` is set.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::aggregator::{self, BucketResults};
use crate::corpus::{Bucket, CorpusRepository, LengthConstraint};
use crate::error::{RepositoryError, Result};
use crate::matcher::{CorpusMatcher, MatchStrategy};
use crate::normalizer::normalize_u_umlaut;
use crate::phoneme::{transcribe_aligned, Transcriber};
use crate::query::{QueryKey, SearchParameters};
use crate::signature::WordSignature;
use crate::{utils, RhymeConfig};

/// Everything one search produces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Strategy A matches per length bucket.
    pub buckets: BucketResults,
    /// Strategy B matches, one per trailing character.
    pub extensions: Vec<WordSignature>,
}

impl SearchResult {
    /// Buckets in priority order with duplicate trailing pairs removed.
    pub fn ranked(&self) -> Vec<WordSignature> {
        aggregator::dedup_by_trailing_pair(aggregator::aggregate(&self.buckets))
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty() && self.extensions.is_empty()
    }
}

/// Frequency lookup result for one word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordRate {
    pub word: String,
    pub rate: u64,
    pub found: bool,
}

pub struct RhymeEngine<T, R> {
    transcriber: T,
    matcher: CorpusMatcher<R>,
    config: RhymeConfig,
}

impl<T: Transcriber, R: CorpusRepository> RhymeEngine<T, R> {
    pub fn new(transcriber: T, repository: R, config: RhymeConfig) -> Self {
        Self {
            transcriber,
            matcher: CorpusMatcher::new(repository),
            config,
        }
    }

    pub fn config(&self) -> &RhymeConfig {
        &self.config
    }

    pub fn repository(&self) -> &R {
        self.matcher.repository()
    }

    /// Compute the signature of `word` with frequency `rate`.
    ///
    /// Pure: the same input always yields the same signature.
    pub fn classify(&self, word: &str, rate: u64) -> Result<WordSignature> {
        let word = utils::normalize(word);
        let mut phonemes = transcribe_aligned(&self.transcriber, &word)?;
        normalize_u_umlaut(&word, &mut phonemes);
        WordSignature::build(&word, rate, &phonemes)
    }

    /// Signature and query key for a search, or `None` if the word is empty or
    /// clearly not Chinese.
    fn prepare(&self, params: &SearchParameters) -> Result<Option<(WordSignature, QueryKey)>> {
        let word = utils::normalize(&params.word);
        if !utils::is_searchable(&word) {
            tracing::debug!(word = %params.word, "nothing to search");
            return Ok(None);
        }
        let signature = self.classify(&word, 0)?;
        let key = QueryKey::for_params(&signature, params);
        tracing::debug!(
            word = %signature.word,
            tone_free = %key.type_without_tone_suffix,
            tone = %key.type_with_tone_suffix,
            "query key"
        );
        Ok(Some((signature, key)))
    }

    /// Summary search: every length bucket plus single-character extensions.
    pub fn search(&self, params: &SearchParameters) -> Result<SearchResult> {
        let Some((signature, key)) = self.prepare(params)? else {
            return Ok(SearchResult::default());
        };
        let word = signature.word.as_str();

        let lookup_bucket = |bucket: Bucket| -> std::result::Result<_, RepositoryError> {
            let found = self.matcher.find(
                MatchStrategy::Bucketed,
                word,
                &key,
                bucket.length(),
                self.config.limits.for_bucket(bucket),
            )?;
            Ok((bucket, found))
        };
        let lookup_extensions = || {
            self.matcher.find(
                MatchStrategy::Extension,
                word,
                &key,
                self.config.extension_length,
                self.config.extension_limit,
            )
        };

        let (buckets, extensions) = if self.config.concurrent_lookups {
            rayon::join(
                || {
                    Bucket::ALL[..]
                        .par_iter()
                        .map(|b| lookup_bucket(*b))
                        .collect::<std::result::Result<Vec<_>, _>>()
                },
                lookup_extensions,
            )
        } else {
            (
                Bucket::ALL
                    .iter()
                    .map(|b| lookup_bucket(*b))
                    .collect::<std::result::Result<Vec<_>, _>>(),
                lookup_extensions(),
            )
        };

        let result = SearchResult {
            buckets: buckets?.into_iter().collect(),
            extensions: aggregator::dedup_extensions(extensions?, self.config.extension_cap),
        };
        tracing::debug!(
            word,
            matches = result.buckets.total(),
            extensions = result.extensions.len(),
            "search done"
        );
        Ok(result)
    }

    /// Single-bucket search for a caller-chosen length (see
    /// `LengthConstraint::for_requested`).
    pub fn search_bucket(
        &self,
        params: &SearchParameters,
        length: usize,
    ) -> Result<Vec<WordSignature>> {
        let Some((signature, key)) = self.prepare(params)? else {
            return Ok(Vec::new());
        };
        Ok(self.matcher.find(
            MatchStrategy::Bucketed,
            &signature.word,
            &key,
            LengthConstraint::for_requested(length),
            self.config.single_bucket_limit,
        )?)
    }

    /// Like `search`, but any failure other than a validation error comes back
    /// as an empty result.
    pub fn search_lenient(&self, params: &SearchParameters) -> Result<SearchResult> {
        match self.search(params) {
            Err(e) if !e.is_validation() => {
                tracing::warn!(word = %params.word, error = %e, "search degraded to no results");
                Ok(SearchResult::default())
            }
            other => other,
        }
    }

    /// Look up stored frequencies for a batch of words.
    pub fn word_rates(&self, words: &[String]) -> Result<Vec<WordRate>> {
        let mut out = Vec::with_capacity(words.len());
        for word in words {
            let stored = self.repository().get(word)?;
            out.push(WordRate {
                word: word.clone(),
                rate: stored.as_ref().map(|s| s.rate).unwrap_or(0),
                found: stored.is_some(),
            });
        }
        Ok(out)
    }
}
