//! Word signatures.
//!
//! A `WordSignature` is the per-word record both stored in the corpus and
//! computed for every search input. All joined fields hold one token per
//! character, separated by `SEPARATOR`.

use serde::{Deserialize, Serialize};

use crate::classifier;
use crate::error::{Result, RhymeError, TranscriptionError};
use crate::phoneme::CharacterPhoneme;

/// Token separator inside joined signature fields.
pub const SEPARATOR: char = '-';

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordSignature {
    pub word: String,
    /// Character count.
    pub length: usize,
    /// Frequency weight; higher is more common.
    pub rate: u64,
    pub initial: String,
    pub final_with_tone: String,
    pub final_without_tone: String,
    /// `"<group>.<tone>"` per character, e.g. "11.3-13.4".
    pub type_with_tone: String,
    /// `"<group>"` per character, e.g. "11-13".
    pub type_without_tone: String,
}

impl WordSignature {
    /// Compose a signature from normalized per-character phonemes.
    ///
    /// `phonemes` must be aligned with `word.chars()`; anything else is a
    /// `LengthMismatch`. A final that belongs to no rhyme group fails the whole
    /// word with `ClassificationGap`.
    pub fn build(word: &str, rate: u64, phonemes: &[CharacterPhoneme]) -> Result<Self> {
        let length = word.chars().count();
        if length != phonemes.len() {
            return Err(TranscriptionError::LengthMismatch {
                word: word.to_string(),
                expected: length,
                got: phonemes.len(),
            }
            .into());
        }

        let mut type_with_tone = Vec::with_capacity(length);
        let mut type_without_tone = Vec::with_capacity(length);
        for (ch, p) in word.chars().zip(phonemes) {
            let class = classifier::classify(p).ok_or_else(|| {
                tracing::warn!(
                    word,
                    character = %ch,
                    final_ = %p.final_without_tone,
                    "final matches no rhyme group"
                );
                RhymeError::ClassificationGap {
                    word: word.to_string(),
                    character: ch,
                    final_: p.final_without_tone.clone(),
                }
            })?;
            type_with_tone.push(class.tone_token());
            type_without_tone.push(class.group_token());
        }

        Ok(Self {
            word: word.to_string(),
            length,
            rate,
            initial: join(phonemes.iter().map(|p| p.initial.as_str())),
            final_with_tone: join(phonemes.iter().map(|p| p.final_with_tone.as_str())),
            final_without_tone: join(phonemes.iter().map(|p| p.final_without_tone.as_str())),
            type_with_tone: join(type_with_tone.iter().map(String::as_str)),
            type_without_tone: join(type_without_tone.iter().map(String::as_str)),
        })
    }

    pub fn type_with_tone_tokens(&self) -> Vec<&str> {
        split_tokens(&self.type_with_tone)
    }

    pub fn type_without_tone_tokens(&self) -> Vec<&str> {
        split_tokens(&self.type_without_tone)
    }

    /// Last character of the word.
    pub fn trailing_char(&self) -> Option<char> {
        self.word.chars().last()
    }

    /// Last two characters of the word (the whole word if shorter).
    pub fn trailing_pair(&self) -> String {
        let skip = self.length.saturating_sub(2);
        self.word.chars().skip(skip).collect()
    }
}

fn join<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for (i, p) in parts.enumerate() {
        if i > 0 {
            out.push(SEPARATOR);
        }
        out.push_str(p);
    }
    out
}

/// Split a joined field into tokens. The empty string has no tokens.
pub fn split_tokens(joined: &str) -> Vec<&str> {
    if joined.is_empty() {
        return Vec::new();
    }
    joined.split(SEPARATOR).collect()
}

/// Join the last `n` tokens of `joined` (all of them if there are fewer).
pub fn last_tokens(joined: &str, n: usize) -> String {
    let tokens = split_tokens(joined);
    let start = tokens.len().saturating_sub(n);
    join(tokens[start..].iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yanchang() -> Vec<CharacterPhoneme> {
        vec![
            CharacterPhoneme::new('演', "", "iǎn", "ian", 3),
            CharacterPhoneme::new('唱', "ch", "àng", "ang", 4),
        ]
    }

    #[test]
    fn builds_all_fields() {
        let sig = WordSignature::build("演唱", 8500, &yanchang()).unwrap();
        assert_eq!(sig.length, 2);
        assert_eq!(sig.rate, 8500);
        assert_eq!(sig.initial, "-ch");
        assert_eq!(sig.final_with_tone, "iǎn-àng");
        assert_eq!(sig.final_without_tone, "ian-ang");
        assert_eq!(sig.type_with_tone, "11.3-13.4");
        assert_eq!(sig.type_without_tone, "11-13");
    }

    #[test]
    fn joined_fields_have_one_token_per_character() {
        let sig = WordSignature::build("演唱", 1, &yanchang()).unwrap();
        for field in [
            &sig.initial,
            &sig.final_with_tone,
            &sig.final_without_tone,
            &sig.type_with_tone,
            &sig.type_without_tone,
        ] {
            assert_eq!(field.split(SEPARATOR).count(), sig.length, "field {field}");
        }
    }

    #[test]
    fn gap_fails_the_word() {
        let p = vec![
            CharacterPhoneme::new('嗯', "", "ńg", "ng", 2),
            CharacterPhoneme::new('唱', "ch", "àng", "ang", 4),
        ];
        let err = WordSignature::build("嗯唱", 1, &p).unwrap_err();
        match err {
            RhymeError::ClassificationGap { character, final_, .. } => {
                assert_eq!(character, '嗯');
                assert_eq!(final_, "ng");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn misaligned_phonemes_are_rejected() {
        let one = vec![CharacterPhoneme::new('演', "", "iǎn", "ian", 3)];
        let err = WordSignature::build("演唱", 1, &one).unwrap_err();
        assert!(matches!(
            err,
            RhymeError::Transcription(TranscriptionError::LengthMismatch {
                expected: 2,
                got: 1,
                ..
            })
        ));
        assert!(WordSignature::build("唱", 1, &yanchang()).is_err());
    }

    #[test]
    fn token_helpers() {
        assert_eq!(last_tokens("1-2-3", 2), "2-3");
        assert_eq!(last_tokens("1-2-3", 9), "1-2-3");
        assert_eq!(last_tokens("1-2-3", 0), "");
        assert_eq!(last_tokens("", 2), "");
        assert!(split_tokens("").is_empty());
    }

    #[test]
    fn trailing_characters() {
        let sig = WordSignature::build("演唱", 1, &yanchang()).unwrap();
        assert_eq!(sig.trailing_char(), Some('唱'));
        assert_eq!(sig.trailing_pair(), "演唱");
    }
}
