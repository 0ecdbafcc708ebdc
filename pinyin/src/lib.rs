//! librhyme-pinyin
//!
//! Phonetic transcription for librhyme: pinyin syllable decomposition,
//! tone-mark rendering and a character/phrase reading table that implements
//! the core `Transcriber` trait.
//!
//! ```
//! use librhyme_core::Transcriber;
//! use librhyme_pinyin::ReadingTable;
//!
//! let table = ReadingTable::load_demo().unwrap();
//! let phonemes = table.transcribe("演唱").unwrap();
//! assert_eq!(phonemes[1].final_with_tone, "àng");
//! ```

pub mod error;
pub use error::{SyllableError, TableError};

pub mod tone;

pub mod syllable;
pub use syllable::Syllable;

pub mod table;
pub use table::ReadingTable;
