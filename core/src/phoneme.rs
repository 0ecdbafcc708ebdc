//! Per-character phonetic data and the transcription contract.
//!
//! The base pinyin transcription (initials / finals / tones from raw Chinese
//! text) is supplied by an external service implementing `Transcriber`. The
//! `librhyme-pinyin` crate ships a table-driven implementation.

use crate::error::TranscriptionError;

/// Phonetic breakdown of a single character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterPhoneme {
    pub character: char,
    /// Initial consonant, empty for zero-initial syllables.
    pub initial: String,
    /// Final with tone mark, e.g. "iǎn".
    pub final_with_tone: String,
    /// Final without tone mark, e.g. "ian".
    pub final_without_tone: String,
    /// Tone digit in 1..=4.
    pub tone: u8,
}

impl CharacterPhoneme {
    /// Build a phoneme. Neutral tone (reported as 0 or 5) becomes tone 1.
    pub fn new<I, F, G>(
        character: char,
        initial: I,
        final_with_tone: F,
        final_without_tone: G,
        tone: u8,
    ) -> Self
    where
        I: Into<String>,
        F: Into<String>,
        G: Into<String>,
    {
        Self {
            character,
            initial: initial.into(),
            final_with_tone: final_with_tone.into(),
            final_without_tone: final_without_tone.into(),
            tone: normalize_tone(tone),
        }
    }
}

/// Neutral tone is treated as tone 1 for rhyme purposes.
pub fn normalize_tone(tone: u8) -> u8 {
    match tone {
        0 | 5 => 1,
        t => t,
    }
}

/// Phonetic transcription capability.
///
/// Implementations return one `CharacterPhoneme` per character of `word`, in
/// character order, with neutral tones already normalized to 1.
pub trait Transcriber: Send + Sync {
    fn transcribe(&self, word: &str) -> Result<Vec<CharacterPhoneme>, TranscriptionError>;
}

impl<T: Transcriber + ?Sized> Transcriber for &T {
    fn transcribe(&self, word: &str) -> Result<Vec<CharacterPhoneme>, TranscriptionError> {
        (**self).transcribe(word)
    }
}

impl<T: Transcriber + ?Sized> Transcriber for std::sync::Arc<T> {
    fn transcribe(&self, word: &str) -> Result<Vec<CharacterPhoneme>, TranscriptionError> {
        (**self).transcribe(word)
    }
}

/// Run `transcriber` and check the result is aligned with `word`.
///
/// Tones are normalized again here so a transcriber that forgets the neutral
/// tone correction still yields valid tone digits.
pub fn transcribe_aligned<T: Transcriber + ?Sized>(
    transcriber: &T,
    word: &str,
) -> Result<Vec<CharacterPhoneme>, TranscriptionError> {
    let mut phonemes = transcriber.transcribe(word)?;
    let expected = word.chars().count();
    if phonemes.len() != expected {
        return Err(TranscriptionError::LengthMismatch {
            word: word.to_string(),
            expected,
            got: phonemes.len(),
        });
    }
    for p in phonemes.iter_mut() {
        p.tone = normalize_tone(p.tone);
    }
    Ok(phonemes)
}
