//! Action slot accounting, eligibility and downcasting.

use std::collections::HashSet;

use crate::build::BuildState;
use crate::catalog::{Action, Catalog, Mastery};
use crate::Rank;

/// Actions that never downcast, whoever performs them.
const NEVER_DOWNCAST: &[&str] = &["evolve"];

pub fn slot_cost(action: &Action) -> u32 {
    action.slotcost.unwrap_or(1)
}

/// Slots consumed by a selection. Paired actions share one charge per
/// pair group, priced at the first member selected.
pub fn slots_used<'a>(actions: impl IntoIterator<Item = &'a Action>) -> u32 {
    let mut charged_pairs: HashSet<&str> = HashSet::new();
    let mut used = 0;
    for action in actions {
        if let Some(pair) = action.pair.as_deref() {
            if !charged_pairs.insert(pair) {
                continue;
            }
        }
        used += slot_cost(action);
    }
    used
}

/// Slots used by the actions chosen in `build`; unknown lookups cost nothing.
pub fn build_slots_used(build: &BuildState, catalog: &Catalog) -> u32 {
    slots_used(build.actions.iter().filter_map(|a| catalog.action(a)))
}

pub fn can_add_action(build: &BuildState, catalog: &Catalog, action: &Action, cap: u32) -> bool {
    if build.has_action(&action.lookup) {
        return false;
    }
    let chosen = build.actions.iter().filter_map(|a| catalog.action(a));
    slots_used(chosen.chain(std::iter::once(action))) <= cap
}

pub fn eligible(action: &Action, mastery: &Mastery) -> bool {
    action.masteries.includes(&mastery.lookup) || mastery.actions.iter().any(|a| a == &action.lookup)
}

/// Catalog actions granted by at least one chosen mastery, in catalog order.
pub fn available_actions<'c>(build: &BuildState, catalog: &'c Catalog) -> Vec<&'c Action> {
    let chosen: Vec<&Mastery> = build
        .all_masteries()
        .filter_map(|p| catalog.mastery(&p.lookup))
        .collect();
    catalog
        .actions
        .iter()
        .filter(|action| chosen.iter().any(|m| eligible(action, m)))
        .collect()
}

/// True when `mastery` performs `action` outside its own role.
pub fn is_downcast(action: &Action, mastery: &Mastery) -> bool {
    if NEVER_DOWNCAST.contains(&action.lookup.as_str()) {
        return false;
    }
    mastery.primary_role.as_str() != action.category
}

pub fn downcast_rank(rank: Rank) -> Rank {
    rank.downcast()
}

/// Rank at which `mastery` (held at `rank`) performs `action`.
pub fn effective_rank(action: &Action, mastery: &Mastery, rank: Rank) -> Rank {
    if is_downcast(action, mastery) {
        downcast_rank(rank)
    } else {
        rank
    }
}
