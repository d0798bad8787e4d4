//! Semantic checks on a decoded or edited build.
//!
//! Checks run on the raw [`WireBuild`] so that problems normalization would
//! hide (mismatched rank arrays, unknown armor words, out-of-range ranks)
//! are still reported. Every failed rule adds one message; nothing here
//! returns an error.

use serde::{Deserialize, Serialize};

use crate::build::{AccessoryType, ArmorType, BuildState, WireBuild};
use crate::catalog::{Catalog, Role};
use crate::codec;
use crate::config::RulesConfig;
use crate::ranks::check_ranks;
use crate::selection::slots_used;
use crate::Rank;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

fn invalid(errors: &mut Vec<String>, message: impl std::fmt::Display) {
    errors.push(format!("Invalid build: {}", message));
}

pub fn validate_wire(wire: &WireBuild, catalog: &Catalog, rules: &RulesConfig) -> ValidationReport {
    let mut errors = Vec::new();

    if wire.chosen_masteries.len() > rules.max_masteries {
        invalid(
            &mut errors,
            format!("Too many masteries selected (max {})", rules.max_masteries),
        );
    }
    if wire.chosen_masteries_ranks.len() != wire.chosen_masteries.len() {
        invalid(&mut errors, "Mastery and rank counts do not match");
    }

    if !rules.features.expertise && !wire.chosen_expertise.is_empty() {
        invalid(&mut errors, "Expertise is not available under these rules");
    } else if wire.chosen_expertise.len() > rules.max_expertise {
        invalid(
            &mut errors,
            format!("Too many expertise selected (max {})", rules.max_expertise),
        );
    }
    if wire.chosen_expertise_ranks.len() != wire.chosen_expertise.len() {
        invalid(&mut errors, "Expertise and rank counts do not match");
    }

    if let Some(armor) = wire.armor_type.as_deref() {
        if ArmorType::parse(armor).is_none() {
            invalid(&mut errors, "Invalid armor type");
        }
    }
    if let Some(accessory) = wire.accessory_type.as_deref() {
        if !rules.features.accessory {
            invalid(&mut errors, "Accessories are not available under these rules");
        } else if AccessoryType::parse(accessory).is_none() {
            invalid(&mut errors, "Invalid accessory type");
        }
    }

    let top = rules.max_rank.min(Rank::S.index());
    let max_rank = i64::from(top);
    let out_of_range = |r: &i64| !(0..=max_rank).contains(r);
    if wire.chosen_masteries_ranks.iter().any(out_of_range)
        || wire.chosen_expertise_ranks.iter().any(out_of_range)
        || [wire.armor_rank, wire.weapon_rank, wire.accessory_rank]
            .iter()
            .any(out_of_range)
    {
        invalid(
            &mut errors,
            format!("Ranks must be between 0 and {}", top),
        );
    }

    let lenient = |ranks: &[i64]| ranks.iter().map(|&r| Rank::lenient(r)).collect::<Vec<_>>();
    let mastery_ranks = check_ranks(lenient(&wire.chosen_masteries_ranks), &rules.rank_caps);
    if let Some(message) = mastery_ranks.message {
        invalid(&mut errors, format!("Mastery ranks: {}", message));
    }
    let expertise_ranks = check_ranks(lenient(&wire.chosen_expertise_ranks), &rules.rank_caps);
    if let Some(message) = expertise_ranks.message {
        invalid(&mut errors, format!("Expertise ranks: {}", message));
    }

    for lookup in &wire.chosen_masteries {
        if catalog.mastery(lookup).is_none() {
            invalid(&mut errors, format!("Unknown mastery '{}'", lookup));
        }
    }
    for lookup in &wire.chosen_expertise {
        if catalog.expertise(lookup).is_none() {
            invalid(&mut errors, format!("Unknown expertise '{}'", lookup));
        }
    }
    for lookup in &wire.chosen_actions {
        if catalog.action(lookup).is_none() {
            invalid(&mut errors, format!("Unknown action '{}'", lookup));
        }
    }

    let alter_slots: Vec<usize> = wire
        .chosen_masteries
        .iter()
        .enumerate()
        .filter(|(_, lookup)| {
            catalog
                .mastery(lookup)
                .is_some_and(|m| m.primary_role == Role::Alter)
        })
        .map(|(i, _)| i)
        .collect();
    match alter_slots.as_slice() {
        [] => {}
        [slot] if *slot + 1 == wire.chosen_masteries.len() => {}
        [_] => invalid(&mut errors, "The alter mastery must be in the last mastery slot"),
        many => invalid(
            &mut errors,
            format!("Only one alter mastery allowed, found {}", many.len()),
        ),
    }

    let used = slots_used(wire.chosen_actions.iter().filter_map(|a| catalog.action(a)));
    if used > rules.action_slot_cap {
        invalid(
            &mut errors,
            format!("Actions use {}/{} slots", used, rules.action_slot_cap),
        );
    }

    ValidationReport::from_errors(errors)
}

/// On the wire the alter is just the last mastery, so an edited build must
/// keep alter-role masteries in the alter slot and nothing else there.
fn alter_slot_errors(build: &BuildState, catalog: &Catalog, errors: &mut Vec<String>) {
    let is_alter = |lookup: &str| catalog.mastery(lookup).map(|m| m.primary_role == Role::Alter);
    if let Some(alter) = &build.alter {
        if is_alter(&alter.lookup) == Some(false) {
            invalid(
                errors,
                format!("'{}' is not an alter mastery and cannot fill the alter slot", alter.lookup),
            );
        }
    }
    for pick in &build.masteries {
        if is_alter(&pick.lookup) == Some(true) {
            invalid(
                errors,
                format!("Alter mastery '{}' must be chosen as the alter", pick.lookup),
            );
        }
    }
}

pub fn validate(build: &BuildState, catalog: &Catalog, rules: &RulesConfig) -> ValidationReport {
    let mut errors = validate_wire(&WireBuild::from_build(build), catalog, rules).errors;
    alter_slot_errors(build, catalog, &mut errors);
    ValidationReport::from_errors(errors)
}

/// Decode then validate; a token that cannot be decoded yields a report
/// carrying the decode failure.
pub fn validate_token(token: &str, catalog: &Catalog, rules: &RulesConfig) -> ValidationReport {
    match codec::decode_wire(token, catalog) {
        Ok(decoded) => validate_wire(&decoded.wire, catalog, rules),
        Err(err) => ValidationReport::from_errors(vec![format!("Invalid build code: {}", err)]),
    }
}
