use thiserror::Error;

/// Errors of single-syllable parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyllableError {
    #[error("empty syllable")]
    Empty,

    #[error("'{0}' is not a pinyin syllable")]
    Malformed(String),

    #[error("'{syllable}' has no known final (rest: '{rest}')")]
    UnknownFinal { syllable: String, rest: String },

    #[error("'{0}' carries both a tone mark and a tone number")]
    ConflictingTone(String),
}

/// Errors of reading-table loading.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("reading table i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("line {line}: {source}")]
    Syllable {
        line: usize,
        #[source]
        source: SyllableError,
    },
}
