// librhyme/core/src/normalizer.rs
//
// ü correction. Common pinyin transcriptions spell the ü final of j/q/x/y
// syllables (and some n/l ones) as plain "u", which would put 居 (jū) in the
// same rhyme group as 猪 (zhū). Characters in the exception list below whose
// tone-free final comes back as "u" are rewritten to "ü".

use ahash::AHashSet;
use once_cell::sync::Lazy;

use crate::phoneme::CharacterPhoneme;

/// Characters read with the ü final.
pub const U_UMLAUT_CHARACTERS: &[char] = &[
    '居', '拘', '驹', '狙', '踞', '蛆', '驱', '躯', '迂', '嘘', '余', '渔', '于', '榆', '舆',
    '愉', '局', '菊', '橘', '徐', '女', '举', '矩', '取', '曲', '许', '语', '雨', '宇', '去',
    '巨', '句', '拒', '据', '惧', '聚', '玉', '育', '预', '御', '裕', '域', '遇', '疽', '琚',
    '趄', '裾', '焗', '锔', '龃', '莒', '筥', '剧', '锯', '距', '具', '俱', '岖', '趋', '渠',
    '蕖', '磲', '璩', '氍', '癯', '娶', '龋', '苣', '趣', '觑', '虚', '须', '需', '墟', '胥',
    '戌', '盱', '栩', '诩', '浒', '呴', '序', '叙', '绪', '续', '蓄', '恤', '旭', '钕', '籹',
    '驴', '闾', '榈', '吕', '侣', '铝', '旅', '屡', '缕', '履', '褛', '律', '率', '绿', '氯',
    '虑', '纡', '淤', '瘀', '鱼', '娱', '隅', '愚', '虞', '与', '予', '羽', '禹', '圉', '圄',
    '浴', '欲', '喻', '誉', '豫', '寓', '狱', '愈', '鬻',
];

static U_UMLAUT_SET: Lazy<AHashSet<char>> =
    Lazy::new(|| U_UMLAUT_CHARACTERS.iter().copied().collect());

/// Tone-marked ü for tones 1..=4.
pub fn marked_u_umlaut(tone: u8) -> Option<&'static str> {
    match tone {
        1 => Some("ǖ"),
        2 => Some("ǘ"),
        3 => Some("ǚ"),
        4 => Some("ǜ"),
        _ => None,
    }
}

/// True if `ch` is in the ü exception list.
pub fn is_u_umlaut_character(ch: char) -> bool {
    U_UMLAUT_SET.contains(&ch)
}

/// Rewrite "u" finals to "ü" for characters in the exception list.
///
/// Positions are matched against `word.chars()`. The tone-marked final is
/// replaced only for tones 1..=4; any other tone leaves it as it was. Running
/// this twice is a no-op the second time since a rewritten final is no longer
/// "u".
pub fn normalize_u_umlaut(word: &str, phonemes: &mut [CharacterPhoneme]) {
    for (ch, p) in word.chars().zip(phonemes.iter_mut()) {
        if p.final_without_tone != "u" || !is_u_umlaut_character(ch) {
            continue;
        }
        p.final_without_tone = "ü".to_string();
        if let Some(marked) = marked_u_umlaut(p.tone) {
            p.final_with_tone = marked.to_string();
        }
    }
}
