//! Rhyme group classification.
//!
//! Finals are sorted into 13 rhyme groups, loosely following the traditional
//! thirteen-rhyme (十三辙) scheme as used by Chinese rap rhyme references:
//! the 一七 class is split into 齐 (group 5) and 支 (group 7), and the nasal
//! classes -n / -ng are kept apart only for the open `ang` family. `an` and
//! `ang` differ in their main vowel (front [a] against back [ɑ]) while `en`
//! and `eng`, like `in` and `ing`, differ only in the coda, which rap rhyming
//! treats as a near rhyme.
//!
//! Group 7 lists `-i` and `ï` for transcribers that spell the apical vowel
//! explicitly. Pinyin writes it as plain `i`, so pinyin input reaches group 7
//! only through the initial rule below.
//!
//! Lookup scans `RHYME_GROUPS` in order and takes the first group listing the
//! final. Group 5 shares its finals with the apical vowel of 支: a character
//! classified as group 5 whose initial is in `APICAL_INITIALS` is moved to
//! group 7.

use std::fmt;

use ahash::AHashMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::phoneme::CharacterPhoneme;

/// Rhyme group identifier in 1..=13.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RhymeGroupId(u8);

impl RhymeGroupId {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 13;

    /// Group whose finals overlap with the apical group.
    pub const AMBIGUOUS: RhymeGroupId = RhymeGroupId(5);
    /// Apical vowel group (zhi, chi, shi, ri, zi, ci, si).
    pub const APICAL: RhymeGroupId = RhymeGroupId(7);

    pub fn new(id: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&id).then_some(RhymeGroupId(id))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Static description of this group.
    pub fn group(self) -> &'static RhymeGroup {
        &RHYME_GROUPS[(self.0 - 1) as usize]
    }
}

impl fmt::Display for RhymeGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One row of the rhyme table.
#[derive(Debug)]
pub struct RhymeGroup {
    pub id: RhymeGroupId,
    /// Traditional name of the rhyme class.
    pub name: &'static str,
    /// Tone-free final spellings belonging to the group.
    pub finals: &'static [&'static str],
}

/// The ordered rhyme table. Order matters: the first group listing a final wins.
pub static RHYME_GROUPS: [RhymeGroup; 13] = [
    RhymeGroup { id: RhymeGroupId(1), name: "麻", finals: &["a", "ia", "ua"] },
    RhymeGroup { id: RhymeGroupId(2), name: "波", finals: &["o", "e", "uo", "io"] },
    RhymeGroup { id: RhymeGroupId(3), name: "皆", finals: &["ie", "ue", "üe", "ve", "ê"] },
    RhymeGroup { id: RhymeGroupId(4), name: "开", finals: &["ai", "uai"] },
    RhymeGroup { id: RhymeGroupId(5), name: "齐", finals: &["i", "ü", "v", "er"] },
    RhymeGroup { id: RhymeGroupId(6), name: "微", finals: &["ei", "ui", "uei"] },
    RhymeGroup { id: RhymeGroupId(7), name: "支", finals: &["-i", "ï"] },
    RhymeGroup { id: RhymeGroupId(8), name: "姑", finals: &["u"] },
    RhymeGroup { id: RhymeGroupId(9), name: "豪", finals: &["ao", "iao"] },
    RhymeGroup { id: RhymeGroupId(10), name: "尤", finals: &["ou", "iu", "iou"] },
    RhymeGroup {
        id: RhymeGroupId(11),
        name: "寒",
        finals: &["an", "ian", "uan", "üan", "van"],
    },
    RhymeGroup {
        id: RhymeGroupId(12),
        name: "庚",
        finals: &[
            "en", "in", "un", "ün", "vn", "uen", "eng", "ing", "ong", "iong", "ueng",
        ],
    },
    RhymeGroup { id: RhymeGroupId(13), name: "唐", finals: &["ang", "iang", "uang"] },
];

/// Initials that turn a group-5 "i" into the apical vowel of group 7.
pub const APICAL_INITIALS: &[&str] = &["zh", "ch", "sh", "r", "z", "c", "s"];

// First-match index over the table, built once.
static FINAL_INDEX: Lazy<AHashMap<&'static str, RhymeGroupId>> = Lazy::new(|| {
    let mut m = AHashMap::new();
    for group in RHYME_GROUPS.iter() {
        for f in group.finals {
            m.entry(*f).or_insert(group.id);
        }
    }
    m
});

/// Look up the group of a tone-free final, ignoring the initial.
pub fn group_of_final(final_without_tone: &str) -> Option<RhymeGroupId> {
    FINAL_INDEX.get(final_without_tone).copied()
}

/// Classify a character from its tone-free final and initial.
///
/// Returns `None` when the final is in no group.
pub fn classify_final(final_without_tone: &str, initial: &str) -> Option<RhymeGroupId> {
    let group = group_of_final(final_without_tone)?;
    if group == RhymeGroupId::AMBIGUOUS && APICAL_INITIALS.contains(&initial) {
        return Some(RhymeGroupId::APICAL);
    }
    Some(group)
}

/// Group and tone for one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RhymeClass {
    pub group: RhymeGroupId,
    pub tone: u8,
}

impl RhymeClass {
    /// Tone-bearing token, e.g. "11.3".
    pub fn tone_token(&self) -> String {
        format!("{}.{}", self.group, self.tone)
    }

    /// Tone-free token, e.g. "11".
    pub fn group_token(&self) -> String {
        self.group.to_string()
    }
}

/// Classify a (normalized) phoneme into its `(group, tone)` pair.
pub fn classify(phoneme: &CharacterPhoneme) -> Option<RhymeClass> {
    classify_final(&phoneme.final_without_tone, &phoneme.initial).map(|group| RhymeClass {
        group,
        tone: phoneme.tone,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_ids_are_positional() {
        for (i, g) in RHYME_GROUPS.iter().enumerate() {
            assert_eq!(g.id.get() as usize, i + 1);
            assert_eq!(g.id.group().name, g.name);
        }
    }

    #[test]
    fn every_listed_final_classifies() {
        for g in RHYME_GROUPS.iter() {
            for f in g.finals {
                assert!(group_of_final(f).is_some(), "final {f} unclassified");
            }
        }
    }

    #[test]
    fn known_finals() {
        assert_eq!(classify_final("ian", "").map(RhymeGroupId::get), Some(11));
        assert_eq!(classify_final("ang", "ch").map(RhymeGroupId::get), Some(13));
        assert_eq!(classify_final("ü", "j").map(RhymeGroupId::get), Some(5));
        assert_eq!(classify_final("u", "zh").map(RhymeGroupId::get), Some(8));
        assert_eq!(classify_final("ao", "n").map(RhymeGroupId::get), Some(9));
    }

    #[test]
    fn apical_initial_moves_i_to_group_seven() {
        assert_eq!(classify_final("i", "sh"), Some(RhymeGroupId::APICAL));
        assert_eq!(classify_final("i", "z"), Some(RhymeGroupId::APICAL));
        assert_eq!(classify_final("i", "r"), Some(RhymeGroupId::APICAL));
        assert_eq!(classify_final("i", "x"), Some(RhymeGroupId::AMBIGUOUS));
        assert_eq!(classify_final("i", ""), Some(RhymeGroupId::AMBIGUOUS));
    }

    #[test]
    fn disambiguation_only_applies_to_group_five() {
        // "an" after zh stays in its own group.
        assert_eq!(classify_final("an", "zh").map(RhymeGroupId::get), Some(11));
        assert_eq!(classify_final("er", "").map(RhymeGroupId::get), Some(5));
    }

    #[test]
    fn explicit_apical_spellings_are_group_seven() {
        assert_eq!(classify_final("-i", "zh"), Some(RhymeGroupId::APICAL));
        assert_eq!(classify_final("ï", "s"), Some(RhymeGroupId::APICAL));
        assert_eq!(group_of_final("en"), group_of_final("eng"));
        assert_ne!(group_of_final("an"), group_of_final("ang"));
    }

    #[test]
    fn unknown_final_is_none() {
        assert_eq!(classify_final("xyz", "b"), None);
        assert_eq!(classify_final("", ""), None);
        // Syllabic nasals (嗯 ng, 呣 m) are not part of the table.
        assert_eq!(classify_final("ng", ""), None);
    }

    #[test]
    fn tokens_format() {
        let p = CharacterPhoneme::new('唱', "ch", "àng", "ang", 4);
        let c = classify(&p).unwrap();
        assert_eq!(c.tone_token(), "13.4");
        assert_eq!(c.group_token(), "13");
    }

    #[test]
    fn group_id_bounds() {
        assert!(RhymeGroupId::new(0).is_none());
        assert!(RhymeGroupId::new(14).is_none());
        assert_eq!(RhymeGroupId::new(13).map(|g| g.group().name), Some("唐"));
    }
}
