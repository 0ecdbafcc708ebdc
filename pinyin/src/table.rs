//! Character and phrase reading table.
//!
//! Every character has one default reading. Phrases override the per-character
//! readings of polyphonic characters (行 in 银行 vs 行走); transcription picks
//! phrases by forward maximum matching before falling back to characters.
//!
//! Text format, one entry per line:
//!
//! ```text
//! # comment
//! 唱	chang4
//! 银行	yin2 hang2
//! ```

use std::path::Path;

use ahash::AHashMap;
use librhyme_core::{CharacterPhoneme, Transcriber, TranscriptionError};

use crate::error::TableError;
use crate::syllable::Syllable;

const DEMO_READINGS: &str = include_str!("../data/demo_readings.txt");

#[derive(Debug, Clone, Default)]
pub struct ReadingTable {
    chars: AHashMap<char, Syllable>,
    phrases: AHashMap<String, Vec<Syllable>>,
    /// Longest phrase, in characters.
    max_phrase: usize,
}

impl ReadingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default reading of `ch`. The first reading registered wins.
    pub fn insert_char(&mut self, ch: char, syllable: Syllable) -> bool {
        if self.chars.contains_key(&ch) {
            return false;
        }
        self.chars.insert(ch, syllable);
        true
    }

    /// Register phrase readings; `syllables` must have one entry per character.
    pub fn insert_phrase(&mut self, phrase: &str, syllables: Vec<Syllable>) -> bool {
        let n = phrase.chars().count();
        if n < 2 || n != syllables.len() {
            return false;
        }
        self.max_phrase = self.max_phrase.max(n);
        self.phrases.insert(phrase.to_string(), syllables);
        true
    }

    pub fn reading(&self, ch: char) -> Option<&Syllable> {
        self.chars.get(&ch)
    }

    pub fn phrase(&self, phrase: &str) -> Option<&[Syllable]> {
        self.phrases.get(phrase).map(Vec::as_slice)
    }

    /// Number of characters with a default reading.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn phrase_count(&self) -> usize {
        self.phrases.len()
    }

    /// Parse the text format.
    pub fn from_text(text: &str) -> Result<Self, TableError> {
        let mut table = ReadingTable::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let content = raw.trim();
            if content.is_empty() || content.starts_with('#') {
                continue;
            }
            let mut fields = content.split_whitespace();
            let Some(word) = fields.next() else { continue };
            let syllables = fields
                .map(Syllable::parse)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|source| TableError::Syllable { line, source })?;

            let n = word.chars().count();
            if syllables.len() != n {
                return Err(TableError::Syntax {
                    line,
                    message: format!(
                        "'{}' has {} characters but {} readings",
                        word,
                        n,
                        syllables.len()
                    ),
                });
            }
            if n == 1 {
                let ch = word.chars().next().unwrap_or_default();
                if !table.insert_char(ch, syllables[0].clone()) {
                    tracing::trace!(line, %ch, "secondary reading ignored");
                }
            } else {
                table.insert_phrase(word, syllables);
            }
        }
        tracing::debug!(
            chars = table.len(),
            phrases = table.phrase_count(),
            "reading table loaded"
        );
        Ok(table)
    }

    /// Load a table file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_text(&text)
    }

    /// Small embedded table covering common characters.
    pub fn load_demo() -> Result<Self, TableError> {
        Self::from_text(DEMO_READINGS)
    }

    /// Readings for `word`, phrase overrides first.
    pub fn readings(&self, word: &str) -> Result<Vec<(char, &Syllable)>, TranscriptionError> {
        let chars: Vec<char> = word.chars().collect();
        let mut out = Vec::with_capacity(chars.len());
        let mut i = 0;
        while i < chars.len() {
            let longest = self.max_phrase.min(chars.len() - i);
            let matched = (2..=longest).rev().find_map(|n| {
                let candidate: String = chars[i..i + n].iter().collect();
                self.phrases.get(&candidate).map(|s| (n, s))
            });
            match matched {
                Some((n, syllables)) => {
                    out.extend(chars[i..i + n].iter().copied().zip(syllables.iter()));
                    i += n;
                }
                None => {
                    let ch = chars[i];
                    let syl = self
                        .chars
                        .get(&ch)
                        .ok_or(TranscriptionError::UnknownCharacter(ch))?;
                    out.push((ch, syl));
                    i += 1;
                }
            }
        }
        Ok(out)
    }
}

impl Transcriber for ReadingTable {
    fn transcribe(&self, word: &str) -> Result<Vec<CharacterPhoneme>, TranscriptionError> {
        Ok(self
            .readings(word)?
            .into_iter()
            .map(|(ch, syl)| syl.to_phoneme(ch))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# sample
银\tyin2
行\txing2
行\thang2
走\tzou3
家\tjia1
银行\tyin2 hang2
";

    #[test]
    fn first_reading_is_default() {
        let t = ReadingTable::from_text(SAMPLE).unwrap();
        assert_eq!(t.len(), 4);
        assert_eq!(t.reading('行').unwrap().initial, "x");
    }

    #[test]
    fn phrases_override_characters() {
        let t = ReadingTable::from_text(SAMPLE).unwrap();
        let ph = t.transcribe("银行家").unwrap();
        let finals: Vec<_> = ph.iter().map(|p| p.final_without_tone.as_str()).collect();
        assert_eq!(finals, vec!["in", "ang", "ia"]);
        assert_eq!(ph[1].initial, "h");

        let ph = t.transcribe("行走").unwrap();
        assert_eq!(ph[0].initial, "x");
    }

    #[test]
    fn unknown_character() {
        let t = ReadingTable::from_text(SAMPLE).unwrap();
        assert_eq!(
            t.transcribe("银河").unwrap_err(),
            TranscriptionError::UnknownCharacter('河')
        );
    }

    #[test]
    fn syntax_errors_carry_line_numbers() {
        let err = ReadingTable::from_text("唱\tchang4\n银行\tyin2\n").unwrap_err();
        assert!(matches!(err, TableError::Syntax { line: 2, .. }));

        let err = ReadingTable::from_text("\n\n唱\tch4ng\n").unwrap_err();
        assert!(matches!(err, TableError::Syllable { line: 3, .. }));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("readings.txt");
        std::fs::write(&path, SAMPLE).unwrap();
        let t = ReadingTable::load(&path).unwrap();
        assert_eq!(t.len(), 4);
        assert_eq!(t.phrase_count(), 1);

        let err = ReadingTable::load(dir.path().join("absent.txt")).unwrap_err();
        assert!(matches!(err, TableError::Io(_)));
    }

    #[test]
    fn demo_table_loads() {
        let t = ReadingTable::load_demo().unwrap();
        assert!(t.len() > 100);
        assert!(t.phrase_count() > 0);
    }
}
