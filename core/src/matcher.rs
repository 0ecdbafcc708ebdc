// librhyme/core/src/matcher.rs
//
// Corpus matcher. Both matching strategies go through the same repository
// query builders in `corpus`; the strategy only decides how the query key is
// turned into predicates.

use crate::corpus::{CorpusRepository, LengthConstraint};
use crate::error::RepositoryError;
use crate::query::QueryKey;
use crate::signature::{split_tokens, WordSignature};

/// How a query key is matched against the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Token suffix match on both signature fields (summary buckets).
    Bucketed,
    /// Last tone token exact, penultimate token on its tone digit only.
    Extension,
}

#[derive(Debug, Clone)]
pub struct CorpusMatcher<R> {
    repository: R,
}

impl<R: CorpusRepository> CorpusMatcher<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Run one lookup with the given strategy.
    ///
    /// Results never contain `exclude_word`, are ordered by descending rate and
    /// hold at most `limit` records. Repository failures are returned as-is.
    pub fn find(
        &self,
        strategy: MatchStrategy,
        exclude_word: &str,
        key: &QueryKey,
        length: LengthConstraint,
        limit: usize,
    ) -> Result<Vec<WordSignature>, RepositoryError> {
        let found = match strategy {
            MatchStrategy::Bucketed => self.bucketed(exclude_word, key, length, limit),
            MatchStrategy::Extension => self.extension(exclude_word, key, length, limit),
        }?;
        tracing::debug!(
            ?strategy,
            ?length,
            tone_free = %key.type_without_tone_suffix,
            tone = %key.type_with_tone_suffix,
            found = found.len(),
            "corpus lookup"
        );
        Ok(found)
    }

    fn bucketed(
        &self,
        exclude_word: &str,
        key: &QueryKey,
        length: LengthConstraint,
        limit: usize,
    ) -> Result<Vec<WordSignature>, RepositoryError> {
        self.repository.find_by_bucket(
            exclude_word,
            &key.type_without_tone_suffix,
            &key.type_with_tone_suffix,
            length,
            limit,
        )
    }

    fn extension(
        &self,
        exclude_word: &str,
        key: &QueryKey,
        length: LengthConstraint,
        limit: usize,
    ) -> Result<Vec<WordSignature>, RepositoryError> {
        // A rhyme target is mandatory here.
        if key.type_without_tone_suffix.is_empty() {
            return Ok(Vec::new());
        }

        let tokens = split_tokens(&key.type_with_tone_suffix);
        let decomposed = match tokens.as_slice() {
            [.., penultimate, last] => tone_digit(penultimate).map(|digit| (*last, digit)),
            _ => None,
        };

        match decomposed {
            Some((last, digit)) => self.repository.find_by_extension(
                exclude_word,
                last,
                digit,
                &key.type_without_tone_suffix,
                length,
                limit,
            ),
            None => self.bucketed(exclude_word, key, length, limit),
        }
    }
}

/// Tone digit of a `"<group>.<tone>"` token.
fn tone_digit(token: &str) -> Option<u8> {
    token.rsplit_once('.').and_then(|(_, d)| d.parse().ok())
}
