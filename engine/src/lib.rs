pub mod api;
pub mod build;
pub mod catalog;
pub mod codec;
pub mod config;
pub mod content;
pub mod ranks;
pub mod sample;
pub mod selection;
pub mod share;
pub mod stats;
pub mod validate;

use serde::{Deserialize, Serialize};

pub use api::Engine;
pub use build::{AccessoryType, ArmorType, BuildState, CharacterInfo, RankedPick, WireBuild};
pub use catalog::{Action, Catalog, Expertise, Mastery, Role, SaveKind};
pub use codec::{BuildFormat, DecodeError};
pub use config::RulesConfig;
pub use ranks::{validate_rank_distribution, RankCheck};
pub use share::{RoutingContext, ShareLinks};
pub use stats::{Saves, Stats};
pub use validate::ValidationReport;

/// Rank tier assigned to a mastery, expertise or equipment slot (E..S = 0..5).
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Rank {
    #[default]
    E,
    D,
    C,
    B,
    A,
    S,
}

/// Rank bonus curve. Hand-authored game data, not a formula.
const RANK_BONUSES: [i32; 6] = [0, 10, 15, 25, 30, 40];

impl Rank {
    pub const ALL: [Rank; 6] = [Rank::E, Rank::D, Rank::C, Rank::B, Rank::A, Rank::S];

    pub fn from_index(value: i64) -> Option<Rank> {
        usize::try_from(value)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// Out-of-range or unparseable values fall back to E.
    pub fn lenient(value: i64) -> Rank {
        Self::from_index(value).unwrap_or_default()
    }

    pub fn from_letter(c: char) -> Option<Rank> {
        match c.to_ascii_uppercase() {
            'E' => Some(Rank::E),
            'D' => Some(Rank::D),
            'C' => Some(Rank::C),
            'B' => Some(Rank::B),
            'A' => Some(Rank::A),
            'S' => Some(Rank::S),
            _ => None,
        }
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn letter(self) -> char {
        match self {
            Rank::E => 'E',
            Rank::D => 'D',
            Rank::C => 'C',
            Rank::B => 'B',
            Rank::A => 'A',
            Rank::S => 'S',
        }
    }

    pub fn bonus(self) -> i32 {
        RANK_BONUSES[self as usize]
    }

    /// One tier lower, floored at E.
    pub fn downcast(self) -> Rank {
        Rank::lenient(self.index() as i64 - 1)
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Bonus for a raw rank value; anything outside 0..=5 is worth nothing.
pub fn rank_bonus(rank: i64) -> i32 {
    Rank::from_index(rank).map(Rank::bonus).unwrap_or(0)
}

/// Integer prefix parse: optional sign then digits, anything else is 0.
pub fn lenient_int(text: &str) -> i64 {
    let s = text.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end]
        .parse::<i64>()
        .map(|v| sign * v)
        .unwrap_or(0)
}
