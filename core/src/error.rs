//! Error taxonomy for the rhyme engine.
//!
//! - `RhymeError::Validation` is raised before any corpus access and must be
//!   reported distinctly from "no results" (`code() == 400`).
//! - `RhymeError::ClassificationGap` means a final matched none of the rhyme
//!   groups. The word is rejected rather than carrying a malformed token.
//! - `RhymeError::Repository` wraps corpus lookup failures. The engine never
//!   retries; that is the repository's business.
use thiserror::Error;

/// Errors reported by a phonetic transcription service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranscriptionError {
    #[error("no reading known for character '{0}'")]
    UnknownCharacter(char),

    #[error("transcription of '{word}' has {got} entries, expected {expected}")]
    LengthMismatch {
        word: String,
        expected: usize,
        got: usize,
    },

    #[error("invalid reading '{reading}': {reason}")]
    InvalidReading { reading: String, reason: String },
}

/// Errors reported by a corpus repository.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("corpus storage error: {0}")]
    Storage(#[from] redb::Error),

    #[error("corpus record codec error: {0}")]
    Codec(#[from] bincode::Error),

    #[error("corpus unavailable: {0}")]
    Unavailable(String),
}

macro_rules! storage_error_from {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for RepositoryError {
                fn from(e: $t) -> Self {
                    RepositoryError::Storage(e.into())
                }
            }
        )*
    };
}

storage_error_from!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

/// Top-level error for `classify` / `search`.
#[derive(Error, Debug)]
pub enum RhymeError {
    #[error("invalid search parameter: {0}")]
    Validation(String),

    #[error("final '{final_}' of '{character}' in '{word}' belongs to no rhyme group")]
    ClassificationGap {
        word: String,
        character: char,
        final_: String,
    },

    #[error(transparent)]
    Transcription(#[from] TranscriptionError),

    #[error("corpus lookup failed: {0}")]
    Repository(#[from] RepositoryError),
}

impl RhymeError {
    /// Status code used by the outer API layer.
    pub fn code(&self) -> u16 {
        match self {
            RhymeError::Validation(_) => 400,
            _ => 500,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, RhymeError::Validation(_))
    }
}

pub type Result<T, E = RhymeError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_has_distinct_code() {
        let v = RhymeError::Validation("word".into());
        let r = RhymeError::from(RepositoryError::Unavailable("down".into()));
        assert_eq!(v.code(), 400);
        assert_eq!(r.code(), 500);
        assert!(v.is_validation());
        assert!(!r.is_validation());
    }

    #[test]
    fn gap_message_names_character() {
        let e = RhymeError::ClassificationGap {
            word: "嗯".into(),
            character: '嗯',
            final_: "ng".into(),
        };
        assert!(e.to_string().contains("'ng'"));
        assert!(e.to_string().contains('嗯'));
    }
}
