// librhyme/pinyin/src/syllable.rs
//
// Single-syllable decomposition into initial, final and tone.
//
// The output deliberately mirrors what common pinyin libraries report:
// `y`/`w` are not initials, and `ü` after j/q/x/y is written as `u`. The core
// rhyme normalizer restores `ü` for the characters where that matters.

use std::fmt;

use librhyme_core::{utils, CharacterPhoneme};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::SyllableError;
use crate::tone;

/// Initials, two-letter ones first so that prefix matching is greedy.
pub const INITIALS: [&str; 21] = [
    "zh", "ch", "sh", "b", "p", "m", "f", "d", "t", "n", "l", "g", "k", "h", "j", "q", "x", "r",
    "z", "c", "s",
];

/// Finals as reported after decomposition (toneless).
pub const FINALS: [&str; 38] = [
    "a", "o", "e", "ê", "ai", "ei", "ao", "ou", "an", "en", "ang", "eng", "ong", "er", "i", "ia",
    "ie", "iao", "iu", "ian", "in", "iang", "ing", "iong", "io", "u", "ua", "uo", "uai", "ui",
    "uan", "un", "uang", "ueng", "ue", "ü", "üe", "ün",
];

/// Syllables made of a nasal alone (嗯, 呣).
const NASAL_SYLLABLES: [&str; 3] = ["ng", "n", "m"];

/// Letters followed by an optional tone number.
static NUMBERED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-zêü]+)([0-5])?$").expect("valid syllable regex"));

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Syllable {
    pub initial: String,
    /// Toneless final.
    pub final_: String,
    /// 1..=4, or 0 for neutral.
    pub tone: u8,
}

impl Syllable {
    /// Parse a tone-numbered (`chang4`, `lv4`, `lu:4`) or tone-marked
    /// (`chàng`, `nǚ`) syllable. No tone at all means neutral.
    pub fn parse(input: &str) -> Result<Self, SyllableError> {
        let s = utils::normalize(input).to_lowercase();
        if s.is_empty() {
            return Err(SyllableError::Empty);
        }
        let s = s.replace("u:", "ü").replace('v', "ü");
        let (bare, marked) = tone::strip_marks(&s)?;

        let caps = NUMBERED
            .captures(&bare)
            .ok_or_else(|| SyllableError::Malformed(input.to_string()))?;
        let letters = &caps[1];
        let numbered = caps.get(2).map(|m| m.as_str().as_bytes()[0] - b'0');
        let tone = match (marked, numbered) {
            (Some(_), Some(_)) => return Err(SyllableError::ConflictingTone(input.to_string())),
            (Some(t), None) | (None, Some(t)) => t,
            (None, None) => 0,
        };
        let tone = if tone == 5 { 0 } else { tone };

        let (initial, final_) = decompose(letters);
        if !(FINALS.contains(&final_.as_str())
            || (initial.is_empty() && NASAL_SYLLABLES.contains(&final_.as_str())))
        {
            return Err(SyllableError::UnknownFinal {
                syllable: input.to_string(),
                rest: final_,
            });
        }
        Ok(Syllable {
            initial: initial.to_string(),
            final_,
            tone,
        })
    }

    pub fn final_with_tone(&self) -> String {
        tone::apply_tone(&self.final_, self.tone)
    }

    /// Phoneme of `character` read as this syllable.
    pub fn to_phoneme(&self, character: char) -> CharacterPhoneme {
        CharacterPhoneme::new(
            character,
            self.initial.as_str(),
            self.final_with_tone(),
            self.final_.as_str(),
            self.tone,
        )
    }
}

impl std::str::FromStr for Syllable {
    type Err = SyllableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Syllable::parse(s)
    }
}

impl fmt::Display for Syllable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.initial, self.final_with_tone())
    }
}

/// Split toneless letters into (initial, final).
fn decompose(letters: &str) -> (&'static str, String) {
    if NASAL_SYLLABLES.contains(&letters) {
        return ("", letters.to_string());
    }
    if let Some(rest) = letters.strip_prefix('y') {
        return ("", y_final(rest));
    }
    if let Some(rest) = letters.strip_prefix('w') {
        return ("", w_final(rest));
    }

    let Some(initial) = INITIALS.iter().copied().find(|i| letters.starts_with(i)) else {
        return ("", letters.to_string());
    };
    let rest = &letters[initial.len()..];
    let final_ = match initial {
        // j/q/x only combine with ü, which is written u.
        "j" | "q" | "x" => rest.replacen('ü', "u", 1),
        _ => rest.to_string(),
    };
    (initial, final_)
}

fn y_final(rest: &str) -> String {
    if rest.starts_with('i') {
        // yi, yin, ying
        rest.to_string()
    } else if let Some(tail) = rest.strip_prefix('u').or_else(|| rest.strip_prefix('ü')) {
        // yu, yue, yuan, yun: ü is reported as u
        format!("u{tail}")
    } else if rest == "ou" {
        "iu".to_string()
    } else {
        format!("i{rest}")
    }
}

fn w_final(rest: &str) -> String {
    match rest {
        "u" => "u".to_string(),
        "ei" => "ui".to_string(),
        "en" => "un".to_string(),
        _ => format!("u{rest}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(s: &str) -> (String, String, u8) {
        let syl = Syllable::parse(s).unwrap();
        (syl.initial, syl.final_, syl.tone)
    }

    fn p(i: &str, f: &str, t: u8) -> (String, String, u8) {
        (i.to_string(), f.to_string(), t)
    }

    #[test]
    fn numbered_and_marked_agree() {
        assert_eq!(parts("chang4"), p("ch", "ang", 4));
        assert_eq!(parts("chàng"), p("ch", "ang", 4));
        assert_eq!(parts("Chang4"), p("ch", "ang", 4));
    }

    #[test]
    fn y_and_w_are_not_initials() {
        assert_eq!(parts("yan3"), p("", "ian", 3));
        assert_eq!(parts("yi1"), p("", "i", 1));
        assert_eq!(parts("ying2"), p("", "ing", 2));
        assert_eq!(parts("you3"), p("", "iu", 3));
        assert_eq!(parts("yong3"), p("", "iong", 3));
        assert_eq!(parts("wu3"), p("", "u", 3));
        assert_eq!(parts("wei4"), p("", "ui", 4));
        assert_eq!(parts("wen2"), p("", "un", 2));
        assert_eq!(parts("wang4"), p("", "uang", 4));
    }

    #[test]
    fn u_umlaut_spellings() {
        assert_eq!(parts("lv4"), p("l", "ü", 4));
        assert_eq!(parts("lu:4"), p("l", "ü", 4));
        assert_eq!(parts("nü3"), p("n", "ü", 3));
        assert_eq!(parts("nǚ"), p("n", "ü", 3));
        assert_eq!(parts("nüe4"), p("n", "üe", 4));
    }

    #[test]
    fn u_umlaut_is_lost_after_jqxy() {
        assert_eq!(parts("ju2"), p("j", "u", 2));
        assert_eq!(parts("qv4"), p("q", "u", 4));
        assert_eq!(parts("xue2"), p("x", "ue", 2));
        assert_eq!(parts("yu3"), p("", "u", 3));
        assert_eq!(parts("yuan2"), p("", "uan", 2));
    }

    #[test]
    fn neutral_tone() {
        assert_eq!(parts("de"), p("d", "e", 0));
        assert_eq!(parts("de5"), p("d", "e", 0));
        assert_eq!(parts("de0"), p("d", "e", 0));
    }

    #[test]
    fn nasal_syllables() {
        assert_eq!(parts("ńg"), p("", "ng", 2));
        assert_eq!(parts("ng2"), p("", "ng", 2));
    }

    #[test]
    fn e_circumflex_syllables() {
        assert_eq!(parts("ế"), p("", "ê", 2));
        assert_eq!(parts("ề"), p("", "ê", 4));
        assert_eq!(parts("ê1"), p("", "ê", 1));
        let marked = Syllable::parse("ê3").unwrap().to_string();
        assert_eq!(parts(&marked), p("", "ê", 3));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(Syllable::parse(" "), Err(SyllableError::Empty));
        assert!(matches!(Syllable::parse("ch4ng"), Err(SyllableError::Malformed(_))));
        assert!(matches!(Syllable::parse("zhx1"), Err(SyllableError::UnknownFinal { .. })));
        assert!(matches!(Syllable::parse("mǎ3"), Err(SyllableError::ConflictingTone(_))));
    }

    #[test]
    fn phoneme_conversion() {
        let ph = Syllable::parse("yan3").unwrap().to_phoneme('演');
        assert_eq!(ph.initial, "");
        assert_eq!(ph.final_with_tone, "iǎn");
        assert_eq!(ph.final_without_tone, "ian");
        assert_eq!(ph.tone, 3);

        // Neutral tone is normalized to 1 by the phoneme constructor.
        let ph = Syllable::parse("le5").unwrap().to_phoneme('了');
        assert_eq!(ph.tone, 1);
        assert_eq!(ph.final_with_tone, "e");
    }

    #[test]
    fn display_uses_marks() {
        assert_eq!(Syllable::parse("zhong1").unwrap().to_string(), "zhōng");
    }
}
