//! librhyme-core
//!
//! Rhyme classification and corpus matching for Mandarin words, shared by the
//! language-data crate (librhyme-pinyin) and the command line tools.
//!
//! A word goes through a fixed pipeline: phonetic transcription, ü
//! correction, classification of each final into one of 13 rhyme groups,
//! signature building, query key derivation, corpus matching and result
//! aggregation.
//!
//! Public API:
//! - `RhymeEngine` - the pipeline, generic over transcriber and corpus
//! - `Transcriber` - per-character phonetic decomposition provider
//! - `CorpusRepository` - signature storage (`InMemoryCorpus`, `RedbCorpus`)
//! - `WordSignature` - the rhyme-relevant summary of a word
//! - `RhymeConfig` - limits and feature flags
use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{RepositoryError, Result, RhymeError, TranscriptionError};

pub mod phoneme;
pub use phoneme::{transcribe_aligned, CharacterPhoneme, Transcriber};

pub mod normalizer;
pub use normalizer::normalize_u_umlaut;

pub mod classifier;
pub use classifier::{classify, RhymeClass, RhymeGroup, RhymeGroupId, RHYME_GROUPS};

pub mod signature;
pub use signature::WordSignature;

pub mod query;
pub use query::{QueryKey, RapNum, SearchParameters, SearchRequest, ToneType};

pub mod corpus;
pub use corpus::{Bucket, CorpusQuery, CorpusRepository, InMemoryCorpus, LengthConstraint};

pub mod store;
pub use store::RedbCorpus;

pub mod matcher;
pub use matcher::{CorpusMatcher, MatchStrategy};

pub mod aggregator;
pub use aggregator::BucketResults;

pub mod heat;
pub use heat::HeatLevel;

pub mod engine;
pub use engine::{RhymeEngine, SearchResult, WordRate};

/// Per-bucket result limits of the summary search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BucketLimits {
    pub two: usize,
    pub three: usize,
    pub four: usize,
    pub five_plus: usize,
}

impl Default for BucketLimits {
    fn default() -> Self {
        Self {
            two: 100,
            three: 50,
            four: 50,
            five_plus: 40,
        }
    }
}

impl BucketLimits {
    pub fn for_bucket(&self, bucket: Bucket) -> usize {
        match bucket {
            Bucket::Two => self.two,
            Bucket::Three => self.three,
            Bucket::Four => self.four,
            Bucket::FivePlus => self.five_plus,
        }
    }
}

/// Engine configuration.
///
/// Every field has a default, so a TOML file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RhymeConfig {
    /// Limit of a single-bucket search.
    pub single_bucket_limit: usize,
    /// Records fetched by the extension lookup before per-character dedup.
    pub extension_limit: usize,
    /// Extensions kept after dedup.
    pub extension_cap: usize,
    /// Run the lookups of one search on the rayon pool.
    pub concurrent_lookups: bool,

    pub limits: BucketLimits,
    /// Length predicate of the extension lookup.
    pub extension_length: LengthConstraint,
}

impl Default for RhymeConfig {
    fn default() -> Self {
        Self {
            single_bucket_limit: 100,
            extension_limit: 100,
            extension_cap: 18,
            concurrent_lookups: true,
            limits: BucketLimits::default(),
            extension_length: LengthConstraint::AtLeast(2),
        }
    }
}

impl RhymeConfig {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(
        path: P,
    ) -> std::result::Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: RhymeConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Utility helpers.
pub mod utils {
    /// Normalize input strings (NFC) and trim whitespace.
    pub fn normalize(s: &str) -> String {
        use unicode_normalization::UnicodeNormalization;
        s.nfc().collect::<String>().trim().to_string()
    }

    /// Whether a normalized word is worth a search: non-empty and free of
    /// Latin letters.
    pub fn is_searchable(word: &str) -> bool {
        !word.is_empty() && !word.chars().any(|c| c.is_ascii_alphabetic())
    }
}
