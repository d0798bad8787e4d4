//! Seeded random builds that always pass validation.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::build::{AccessoryType, ArmorType, BuildState, CharacterInfo, RankedPick};
use crate::catalog::{Catalog, Mastery, Role};
use crate::config::{RankCaps, RulesConfig};
use crate::selection::{available_actions, can_add_action};
use crate::Rank;

const NAMES: [&str; 6] = ["Lune", "Ashe Varro", "Kestrel", "Mira Quill", "Tobin", "Sel"];
const RACES: [&str; 4] = ["Human", "Elf", "Beastkin", "Dwarf"];

/// Running tally of ranks handed out against one set of caps.
struct RankBudget<'a> {
    caps: &'a RankCaps,
    s: usize,
    a_or_above: usize,
}

impl<'a> RankBudget<'a> {
    fn new(caps: &'a RankCaps) -> Self {
        Self {
            caps,
            s: 0,
            a_or_above: 0,
        }
    }

    /// Lower `wanted` until it fits the caps, then record it.
    fn take(&mut self, wanted: Rank) -> Rank {
        let mut rank = wanted;
        while rank == Rank::S && self.s >= self.caps.s {
            rank = rank.downcast();
        }
        while rank >= Rank::A && self.a_or_above >= self.caps.a_or_above {
            rank = rank.downcast();
        }
        if rank == Rank::S {
            self.s += 1;
        }
        if rank >= Rank::A {
            self.a_or_above += 1;
        }
        rank
    }
}

pub struct SampleBuilder {
    rng: ChaCha8Rng,
}

impl SampleBuilder {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn rank(&mut self, max_rank: u8) -> Rank {
        Rank::lenient(i64::from(self.rng.gen_range(0..=max_rank)))
    }

    fn pick<'c, T>(&mut self, pool: &[&'c T], count: usize) -> Vec<&'c T> {
        pool.choose_multiple(&mut self.rng, count).copied().collect()
    }

    pub fn build(&mut self, catalog: &Catalog, rules: &RulesConfig) -> BuildState {
        let slots = rules.max_masteries.min(rules.rank_caps.total);
        let mut build = BuildState::new();
        let mut budget = RankBudget::new(&rules.rank_caps);

        let alters: Vec<&Mastery> = catalog
            .masteries
            .iter()
            .filter(|m| m.primary_role == Role::Alter)
            .collect();
        let regulars: Vec<&Mastery> = catalog
            .masteries
            .iter()
            .filter(|m| m.primary_role != Role::Alter)
            .collect();

        let with_alter = slots > 0 && !alters.is_empty() && self.rng.gen_bool(0.5);
        let regular_slots = slots.saturating_sub(usize::from(with_alter));
        if regular_slots > 0 && !regulars.is_empty() {
            let count = self.rng.gen_range(1..=regular_slots.min(regulars.len()));
            for mastery in self.pick(&regulars, count) {
                let rank = self.rank(rules.max_rank);
                build
                    .masteries
                    .push(RankedPick::new(&mastery.lookup, budget.take(rank)));
            }
        }
        if with_alter {
            if let Some(mastery) = self.pick(&alters, 1).first() {
                let rank = self.rank(rules.max_rank);
                build.alter = Some(RankedPick::new(&mastery.lookup, budget.take(rank)));
            }
        }

        if rules.features.expertise {
            let pool: Vec<_> = catalog.expertise.iter().collect();
            let limit = rules.max_expertise.min(rules.rank_caps.total).min(pool.len());
            let count = self.rng.gen_range(0..=limit);
            let mut budget = RankBudget::new(&rules.rank_caps);
            for expertise in self.pick(&pool, count) {
                let rank = self.rank(rules.max_rank);
                build
                    .expertise
                    .push(RankedPick::new(&expertise.lookup, budget.take(rank)));
            }
        }

        build.armor = ArmorType::ALL.choose(&mut self.rng).copied();
        build.armor_rank = self.rank(rules.max_rank);
        build.weapon_rank = self.rank(rules.max_rank);
        if rules.features.accessory {
            build.accessory = AccessoryType::ALL.choose(&mut self.rng).copied();
            build.accessory_rank = self.rank(rules.max_rank);
        }

        let mut offered = available_actions(&build, catalog);
        offered.shuffle(&mut self.rng);
        for action in offered {
            if can_add_action(&build, catalog, action, rules.action_slot_cap) {
                build.actions.push(action.lookup.clone());
            }
        }

        build.character = CharacterInfo {
            name: NAMES.choose(&mut self.rng).copied().unwrap_or_default().to_string(),
            race: RACES.choose(&mut self.rng).copied().unwrap_or_default().to_string(),
            ..CharacterInfo::default()
        };
        build
    }
}

/// One sample build for `seed`; the same seed always yields the same build.
pub fn sample_build(seed: u64, catalog: &Catalog, rules: &RulesConfig) -> BuildState {
    SampleBuilder::from_seed(seed).build(catalog, rules)
}
