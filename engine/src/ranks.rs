//! Cumulative rank caps over a mastery or expertise rank array.

use serde::{Deserialize, Serialize};

use crate::config::RankCaps;
use crate::Rank;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankCheck {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RankCheck {
    pub fn ok() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    fn fail(message: String) -> Self {
        Self {
            valid: false,
            message: Some(message),
        }
    }
}

/// Check raw rank values against the default caps (S≤1, A-or-above≤3, 6 total).
pub fn validate_rank_distribution(ranks: &[i64]) -> RankCheck {
    check_ranks(ranks.iter().map(|&r| Rank::lenient(r)), &RankCaps::default())
}

/// Caps are checked from the top tier down and the first failure wins.
/// Values outside E..S have already been coerced to E by the caller.
pub fn check_ranks(ranks: impl IntoIterator<Item = Rank>, caps: &RankCaps) -> RankCheck {
    let mut s = 0;
    let mut a_or_above = 0;
    let mut total = 0;
    for rank in ranks {
        total += 1;
        if rank >= Rank::A {
            a_or_above += 1;
        }
        if rank == Rank::S {
            s += 1;
        }
    }

    if s > caps.s {
        return RankCheck::fail(format!(
            "Too many S ranks: {}/{} allowed. Only {} slot can be S rank.",
            s, caps.s, caps.s
        ));
    }
    if a_or_above > caps.a_or_above {
        return RankCheck::fail(format!(
            "Too many A+ ranks: {}/{} allowed. Max {} slots can be A rank or higher (includes S ranks).",
            a_or_above, caps.a_or_above, caps.a_or_above
        ));
    }
    if total > caps.total {
        return RankCheck::fail(format!(
            "Too many ranks: {}/{} allowed. Maximum {} masteries/expertise.",
            total, caps.total, caps.total
        ));
    }
    RankCheck::ok()
}
