//! Search parameters and query keys.
//!
//! `SearchRequest` is what the outer API layer hands over (every field may be
//! missing). Converting it into `SearchParameters` is the only validation step;
//! from there on the parameters are well-formed by construction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RhymeError;
use crate::signature::{last_tokens, WordSignature};

/// How many trailing syllables must rhyme, in 1..=4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct RapNum(u8);

impl RapNum {
    pub const MAX: u8 = 4;

    pub fn new(n: u8) -> Option<Self> {
        (1..=Self::MAX).contains(&n).then_some(RapNum(n))
    }

    pub fn get(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u8> for RapNum {
    type Error = RhymeError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        RapNum::new(n)
            .ok_or_else(|| RhymeError::Validation(format!("rap_num must be in 1..=4, got {n}")))
    }
}

impl From<RapNum> for u8 {
    fn from(r: RapNum) -> u8 {
        r.0
    }
}

impl FromStr for RapNum {
    type Err = RhymeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: u8 = s
            .trim()
            .parse()
            .map_err(|_| RhymeError::Validation(format!("rap_num is not a number: {s:?}")))?;
        RapNum::try_from(n)
    }
}

/// Tone strictness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ToneType {
    /// Tones are ignored.
    Any,
    /// Only the last syllable's tone must match.
    Final,
    /// Every rhyming syllable's tone must match.
    All,
}

impl ToneType {
    /// Number of trailing tones constrained for `rap_num` rhyming syllables.
    pub fn tone_count(self, rap_num: RapNum) -> usize {
        match self {
            ToneType::Any => 0,
            ToneType::Final => 1,
            ToneType::All => rap_num.get(),
        }
    }
}

impl TryFrom<u8> for ToneType {
    type Error = RhymeError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            0 => Ok(ToneType::Any),
            1 => Ok(ToneType::Final),
            2 => Ok(ToneType::All),
            _ => Err(RhymeError::Validation(format!(
                "tone_type must be 0, 1 or 2, got {n}"
            ))),
        }
    }
}

impl From<ToneType> for u8 {
    fn from(t: ToneType) -> u8 {
        match t {
            ToneType::Any => 0,
            ToneType::Final => 1,
            ToneType::All => 2,
        }
    }
}

impl FromStr for ToneType {
    type Err = RhymeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: u8 = s
            .trim()
            .parse()
            .map_err(|_| RhymeError::Validation(format!("tone_type is not a number: {s:?}")))?;
        ToneType::try_from(n)
    }
}

impl fmt::Display for ToneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

/// Raw search input as received from the API layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    pub word: Option<String>,
    pub rap_num: Option<u8>,
    pub tone_type: Option<u8>,
}

/// Validated search parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParameters {
    pub word: String,
    pub rap_num: RapNum,
    pub tone_type: ToneType,
}

impl SearchParameters {
    pub fn new<W: Into<String>>(word: W, rap_num: RapNum, tone_type: ToneType) -> Self {
        Self {
            word: word.into(),
            rap_num,
            tone_type,
        }
    }
}

impl TryFrom<SearchRequest> for SearchParameters {
    type Error = RhymeError;

    fn try_from(req: SearchRequest) -> Result<Self, Self::Error> {
        let word = req
            .word
            .ok_or_else(|| RhymeError::Validation("word is required".into()))?;
        let rap_num = req
            .rap_num
            .ok_or_else(|| RhymeError::Validation("rap_num is required".into()))?;
        let tone_type = req
            .tone_type
            .ok_or_else(|| RhymeError::Validation("tone_type is required".into()))?;
        Ok(Self {
            word,
            rap_num: RapNum::try_from(rap_num)?,
            tone_type: ToneType::try_from(tone_type)?,
        })
    }
}

/// Matching keys derived from a signature for one search.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryKey {
    /// Last `rap_num` group tokens, e.g. "11-13".
    pub type_without_tone_suffix: String,
    /// Last `tone_count` group.tone tokens; empty means any tone.
    pub type_with_tone_suffix: String,
}

impl QueryKey {
    pub fn build(signature: &WordSignature, rap_num: RapNum, tone_type: ToneType) -> Self {
        let n = tone_type.tone_count(rap_num);
        let type_with_tone_suffix = if n == 0 {
            String::new()
        } else {
            last_tokens(&signature.type_with_tone, n)
        };
        Self {
            type_without_tone_suffix: last_tokens(&signature.type_without_tone, rap_num.get()),
            type_with_tone_suffix,
        }
    }

    pub fn for_params(signature: &WordSignature, params: &SearchParameters) -> Self {
        Self::build(signature, params.rap_num, params.tone_type)
    }
}
