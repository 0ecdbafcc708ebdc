//! Popularity levels for display.
//!
//! Rates are compared against per-length thresholds; longer words are rarer,
//! so the 5+ thresholds are much lower.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatLevel {
    Hot,
    Popular,
    Common,
    Rare,
}

impl HeatLevel {
    /// Thresholds for (hot, popular, common) by word length.
    fn thresholds(length: usize) -> [u64; 3] {
        match length {
            0..=2 => [5000, 500, 30],
            3 => [1500, 300, 30],
            4 => [5000, 500, 10],
            _ => [300, 50, 5],
        }
    }

    /// Level of a word of `length` characters with frequency `rate`.
    pub fn of(length: usize, rate: u64) -> Self {
        let [hot, popular, common] = Self::thresholds(length);
        if rate > hot {
            HeatLevel::Hot
        } else if rate > popular {
            HeatLevel::Popular
        } else if rate > common {
            HeatLevel::Common
        } else {
            HeatLevel::Rare
        }
    }
}

impl fmt::Display for HeatLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HeatLevel::Hot => "hot",
            HeatLevel::Popular => "popular",
            HeatLevel::Common => "common",
            HeatLevel::Rare => "rare",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_strict() {
        assert_eq!(HeatLevel::of(2, 5001), HeatLevel::Hot);
        assert_eq!(HeatLevel::of(2, 5000), HeatLevel::Popular);
        assert_eq!(HeatLevel::of(2, 31), HeatLevel::Common);
        assert_eq!(HeatLevel::of(2, 30), HeatLevel::Rare);
    }

    #[test]
    fn long_words_share_the_five_plus_row() {
        assert_eq!(HeatLevel::of(5, 301), HeatLevel::Hot);
        assert_eq!(HeatLevel::of(7, 301), HeatLevel::Hot);
        assert_eq!(HeatLevel::of(3, 301), HeatLevel::Popular);
        assert_eq!(HeatLevel::of(4, 11), HeatLevel::Common);
    }
}
