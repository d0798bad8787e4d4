//! Derived character stats.
//!
//! Everything here is a pure function of a [`BuildState`] and the catalog.
//! Rank-based action bonuses are resolved by action lookup; a rank-based
//! bonus on an action with no rule below contributes nothing.

use serde::{Deserialize, Serialize};

use crate::build::{AccessoryType, BuildState};
use crate::catalog::{BonusValue, Catalog, SaveKind};
use crate::config::RulesConfig;
use crate::selection::eligible;
use crate::Rank;

pub const BASE_HP: i32 = 100;
pub const BASE_MOVEMENT: i32 = 2;
pub const BASE_RANGE: i32 = 1;
const STURDY_BASE: i32 = 25;
const STURDY_PER_RANK: i32 = 5;
const STURDY_MAX: i32 = 50;

const GRADES: [(i32, &str); 12] = [
    (0, "E"),
    (31, "E+"),
    (62, "D"),
    (93, "D+"),
    (124, "C"),
    (155, "C+"),
    (186, "B"),
    (217, "B+"),
    (248, "A"),
    (279, "A+"),
    (310, "S"),
    (339, "S+"),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Saves {
    pub fortitude: i32,
    pub reflex: i32,
    pub will: i32,
}

impl Saves {
    fn add(&mut self, kind: SaveKind, amount: i32) {
        match kind {
            SaveKind::Fortitude => self.fortitude += amount,
            SaveKind::Reflex => self.reflex += amount,
            SaveKind::Will => self.will += amount,
        }
    }

    fn add_all(&mut self, amount: i32) {
        self.fortitude += amount;
        self.reflex += amount;
        self.will += amount;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub hp: i32,
    pub saves: Saves,
    pub movement: i32,
    pub range: i32,
    pub damage_modifiers: Vec<i32>,
    pub support_modifiers: Vec<i32>,
    pub score: i32,
    pub grade: String,
}

/// Sum of the steps reached: `steps[i] = (min rank, amount)`.
fn tiered(rank: Rank, steps: &[(Rank, i32)]) -> i32 {
    steps
        .iter()
        .filter(|(min, _)| rank >= *min)
        .map(|(_, amount)| amount)
        .sum()
}

/// The highest step reached, or 0.
fn stepped(rank: Rank, steps: &[(Rank, i32)]) -> i32 {
    steps
        .iter()
        .rev()
        .find(|(min, _)| rank >= *min)
        .map(|(_, amount)| *amount)
        .unwrap_or(0)
}

pub fn alter_mastery_rank(build: &BuildState) -> Rank {
    build.alter_rank()
}

/// Highest rank among chosen masteries that can take `action`; E when none
/// qualify or the action is unknown.
pub fn highest_rank_for_action(build: &BuildState, catalog: &Catalog, action: &str) -> Rank {
    let Some(action) = catalog.action(action) else {
        return Rank::E;
    };
    build
        .all_masteries()
        .filter(|pick| {
            catalog
                .mastery(&pick.lookup)
                .is_some_and(|m| eligible(action, m))
        })
        .map(|pick| pick.rank)
        .max()
        .unwrap_or_default()
}

/// Chosen actions carrying a bonus for `stat`, in selection order.
fn action_bonuses<'a>(
    build: &'a BuildState,
    catalog: &'a Catalog,
    stat: &'a str,
) -> impl Iterator<Item = (&'a str, BonusValue)> + 'a {
    build.actions.iter().filter_map(move |lookup| {
        catalog
            .action(lookup)
            .and_then(|a| a.bonus(stat))
            .map(|bonus| (lookup.as_str(), bonus))
    })
}

pub fn calculate_hp(build: &BuildState, catalog: &Catalog) -> i32 {
    let mut hp = BASE_HP;
    if let Some(armor) = build.armor {
        hp += build.armor_rank.index() as i32 * armor.hp_per_rank();
    }

    let alter = build.alter_rank();
    for (lookup, bonus) in action_bonuses(build, catalog, "hp") {
        hp += match (lookup, bonus) {
            (_, BonusValue::Flat(n)) => n,
            ("defense", BonusValue::RankBased) => alter.bonus(),
            ("sturdy", BonusValue::RankBased) => {
                let rank = highest_rank_for_action(build, catalog, "sturdy");
                STURDY_MAX.min(STURDY_BASE + STURDY_PER_RANK * rank.index() as i32)
            }
            ("focus-defense", BonusValue::RankBased) => {
                tiered(alter, &[(Rank::D, 20), (Rank::B, 10), (Rank::S, 10)])
            }
            _ => 0,
        };
    }
    hp
}

pub fn accessory_save(accessory: AccessoryType) -> SaveKind {
    match accessory {
        AccessoryType::Combat => SaveKind::Fortitude,
        AccessoryType::Utility => SaveKind::Reflex,
        AccessoryType::Magic => SaveKind::Will,
    }
}

pub fn calculate_saves(build: &BuildState, catalog: &Catalog, rules: &RulesConfig) -> Saves {
    let mut saves = Saves::default();
    for pick in build.all_masteries() {
        if let Some(save) = catalog.mastery(&pick.lookup).and_then(|m| m.save) {
            saves.add(save, pick.rank.bonus());
        }
    }

    if rules.features.accessory {
        if let Some(accessory) = build.accessory {
            saves.add(
                accessory_save(accessory),
                (build.accessory_rank.index() as i32 + 1) * 10,
            );
        }
    }

    let alter = build.alter_rank();
    if build.has_action("focus-defense") {
        saves.add_all(stepped(alter, &[(Rank::D, 10), (Rank::B, 15), (Rank::S, 20)]));
    }
    if build.has_action("focus-movement") {
        saves.add_all(stepped(alter, &[(Rank::D, 5), (Rank::B, 10), (Rank::S, 15)]));
    }
    saves
}

pub fn calculate_movement(build: &BuildState, catalog: &Catalog) -> i32 {
    let alter = build.alter_rank();
    let mut movement = BASE_MOVEMENT;
    for (lookup, bonus) in action_bonuses(build, catalog, "movement") {
        movement += match (lookup, bonus) {
            (_, BonusValue::Flat(n)) => n,
            ("speed", BonusValue::RankBased) => {
                tiered(alter, &[(Rank::D, 1), (Rank::B, 1), (Rank::S, 1)])
            }
            ("swift", BonusValue::RankBased) => {
                let rank = highest_rank_for_action(build, catalog, "swift");
                tiered(rank, &[(Rank::D, 1), (Rank::S, 1)])
            }
            ("acceleration", BonusValue::RankBased) => {
                tiered(alter, &[(Rank::D, 2), (Rank::B, 1), (Rank::S, 1)])
            }
            ("focus-movement", BonusValue::RankBased) => {
                tiered(alter, &[(Rank::D, 1), (Rank::B, 1)])
            }
            _ => 0,
        };
    }
    movement
}

pub fn calculate_range(build: &BuildState, catalog: &Catalog) -> i32 {
    BASE_RANGE
        + action_bonuses(build, catalog, "range")
            .map(|(_, bonus)| match bonus {
                BonusValue::Flat(n) => n,
                BonusValue::RankBased => 0,
            })
            .sum::<i32>()
}

fn alter_modifiers(build: &BuildState, action: &str) -> Vec<i32> {
    if build.has_action(action) {
        vec![build.alter_rank().bonus()]
    } else {
        Vec::new()
    }
}

pub fn damage_modifiers(build: &BuildState) -> Vec<i32> {
    alter_modifiers(build, "damage")
}

pub fn support_modifiers(build: &BuildState) -> Vec<i32> {
    alter_modifiers(build, "support")
}

/// Expertise counts a quarter of its rank bonus, rounded half up.
fn expertise_points(rank: Rank) -> i32 {
    (rank.bonus() + 2) / 4
}

pub fn build_score(build: &BuildState, rules: &RulesConfig) -> i32 {
    let mut score = build.weapon_rank.bonus() + build.armor_rank.bonus();
    if rules.features.accessory {
        score += build.accessory_rank.bonus();
    }
    score += build.all_masteries().map(|p| p.rank.bonus()).sum::<i32>();
    if rules.features.expertise {
        score += build
            .expertise
            .iter()
            .map(|p| expertise_points(p.rank))
            .sum::<i32>();
    }
    score
}

pub fn build_grade(score: i32) -> &'static str {
    GRADES
        .iter()
        .rev()
        .find(|(min, _)| score >= *min)
        .map(|(_, grade)| *grade)
        .unwrap_or("E")
}

pub fn complete_stats(build: &BuildState, catalog: &Catalog, rules: &RulesConfig) -> Stats {
    let score = build_score(build, rules);
    Stats {
        hp: calculate_hp(build, catalog),
        saves: calculate_saves(build, catalog, rules),
        movement: calculate_movement(build, catalog),
        range: calculate_range(build, catalog),
        damage_modifiers: damage_modifiers(build),
        support_modifiers: support_modifiers(build),
        score,
        grade: build_grade(score).to_string(),
    }
}
