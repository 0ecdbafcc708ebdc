// librhyme/pinyin/src/tone.rs
//
// Tone marks. Marked vowels are looked up in compile-time maps; placement
// follows the usual orthographic rule: `a`, else `e` (or `ê`), else the `o`
// of `ou`, else the last vowel. Unicode has precomposed `ê` only for tones 2
// and 4, so tones 1 and 3 of `ê` are spelled with a combining mark.

use phf::phf_map;

use crate::error::SyllableError;

/// Marked letter -> (base letter, tone).
static UNMARK: phf::Map<char, (char, u8)> = phf_map! {
    'ā' => ('a', 1), 'á' => ('a', 2), 'ǎ' => ('a', 3), 'à' => ('a', 4),
    'ē' => ('e', 1), 'é' => ('e', 2), 'ě' => ('e', 3), 'è' => ('e', 4),
    'ī' => ('i', 1), 'í' => ('i', 2), 'ǐ' => ('i', 3), 'ì' => ('i', 4),
    'ō' => ('o', 1), 'ó' => ('o', 2), 'ǒ' => ('o', 3), 'ò' => ('o', 4),
    'ū' => ('u', 1), 'ú' => ('u', 2), 'ǔ' => ('u', 3), 'ù' => ('u', 4),
    'ǖ' => ('ü', 1), 'ǘ' => ('ü', 2), 'ǚ' => ('ü', 3), 'ǜ' => ('ü', 4),
    'ế' => ('ê', 2), 'ề' => ('ê', 4),
    'ń' => ('n', 2), 'ň' => ('n', 3), 'ǹ' => ('n', 4),
    'ḿ' => ('m', 2),
};

/// Base letter -> marked forms for tones 1..=4 (`None` where Unicode has no
/// precomposed letter).
static MARK: phf::Map<char, [Option<char>; 4]> = phf_map! {
    'a' => [Some('ā'), Some('á'), Some('ǎ'), Some('à')],
    'e' => [Some('ē'), Some('é'), Some('ě'), Some('è')],
    'i' => [Some('ī'), Some('í'), Some('ǐ'), Some('ì')],
    'o' => [Some('ō'), Some('ó'), Some('ǒ'), Some('ò')],
    'u' => [Some('ū'), Some('ú'), Some('ǔ'), Some('ù')],
    'ü' => [Some('ǖ'), Some('ǘ'), Some('ǚ'), Some('ǜ')],
    'ê' => [None, Some('ế'), None, Some('ề')],
    'n' => [None, Some('ń'), Some('ň'), Some('ǹ')],
    'm' => [None, Some('ḿ'), None, None],
};

/// Combining marks for tones 1..=4.
const COMBINING: [char; 4] = ['\u{304}', '\u{301}', '\u{30C}', '\u{300}'];

fn combining_tone(c: char) -> Option<u8> {
    COMBINING.iter().position(|&m| m == c).map(|i| i as u8 + 1)
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'ê' | 'i' | 'o' | 'u' | 'ü')
}

/// Remove tone marks, returning the bare spelling and the tone of its mark.
/// More than one mark is an error.
pub fn strip_marks(s: &str) -> Result<(String, Option<u8>), SyllableError> {
    let mut tone = None;
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        let (base, t) = match (UNMARK.get(&c), combining_tone(c)) {
            (Some(&(base, t)), _) => (Some(base), t),
            (None, Some(t)) => (None, t),
            (None, None) => {
                out.push(c);
                continue;
            }
        };
        if tone.replace(t).is_some() {
            return Err(SyllableError::ConflictingTone(s.to_string()));
        }
        out.extend(base);
    }
    Ok((out, tone))
}

/// Index (in chars) of the letter that carries the tone mark of `final_`.
pub fn mark_position(final_: &str) -> Option<usize> {
    let chars: Vec<char> = final_.chars().collect();
    if let Some(i) = chars.iter().position(|&c| matches!(c, 'a' | 'e' | 'ê')) {
        return Some(i);
    }
    if let Some(i) = final_.find("ou") {
        return Some(final_[..i].chars().count());
    }
    if let Some(i) = chars.iter().rposition(|&c| is_vowel(c)) {
        return Some(i);
    }
    // Syllabic nasals.
    chars.iter().position(|&c| c == 'n' || c == 'm')
}

/// Render `final_` with the mark of `tone`. Neutral tone (0 or 5) and finals
/// without a markable letter are returned unchanged.
pub fn apply_tone(final_: &str, tone: u8) -> String {
    if !(1..=4).contains(&tone) {
        return final_.to_string();
    }
    let Some(pos) = mark_position(final_) else {
        return final_.to_string();
    };
    let index = usize::from(tone) - 1;
    let mut out = String::with_capacity(final_.len() + 2);
    for (i, c) in final_.chars().enumerate() {
        if i != pos {
            out.push(c);
            continue;
        }
        match MARK.get(&c).map(|forms| forms[index]) {
            Some(Some(marked)) => out.push(marked),
            Some(None) if c == 'ê' => {
                out.push(c);
                out.push(COMBINING[index]);
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_rules() {
        assert_eq!(apply_tone("ang", 4), "àng");
        assert_eq!(apply_tone("ian", 3), "iǎn");
        assert_eq!(apply_tone("ue", 4), "uè");
        assert_eq!(apply_tone("ou", 3), "ǒu");
        assert_eq!(apply_tone("iu", 4), "iù");
        assert_eq!(apply_tone("ui", 4), "uì");
        assert_eq!(apply_tone("uo", 2), "uó");
        assert_eq!(apply_tone("ü", 3), "ǚ");
        assert_eq!(apply_tone("ng", 2), "ńg");
    }

    #[test]
    fn neutral_tone_is_unmarked() {
        assert_eq!(apply_tone("e", 0), "e");
        assert_eq!(apply_tone("e", 5), "e");
    }

    #[test]
    fn strip_reports_tone() {
        assert_eq!(strip_marks("chàng"), Ok(("chang".to_string(), Some(4))));
        assert_eq!(strip_marks("nǚ"), Ok(("nü".to_string(), Some(3))));
        assert_eq!(strip_marks("de"), Ok(("de".to_string(), None)));
        assert!(strip_marks("hǎó").is_err());
    }

    #[test]
    fn e_circumflex_marks() {
        assert_eq!(apply_tone("ê", 2), "ế");
        assert_eq!(apply_tone("ê", 4), "ề");
        assert_eq!(apply_tone("ê", 1), "ê\u{304}");
        assert_eq!(apply_tone("ê", 3), "ê\u{30C}");
        assert_eq!(strip_marks("ế"), Ok(("ê".to_string(), Some(2))));
        assert_eq!(strip_marks("ê\u{30C}"), Ok(("ê".to_string(), Some(3))));
        assert!(strip_marks("ế\u{300}").is_err());
    }
}
