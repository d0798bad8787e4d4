//! Id-based compact layouts: the tagged `v3` code and its untagged
//! predecessors.
//!
//! ```text
//! v3|masteryIds|masteryRanks|expertiseIds|expertiseRanks|armor|armorRank|accessory|accessoryRank|weaponRank|actionIds|charData
//! ```
//!
//! Fields are never dropped, so every position is stable. The untagged
//! predecessors filtered out empty fields, which is why they can only be
//! told apart by counting.

use tracing::warn;

use super::chardata::{decode_char_data, encode_char_data, TextStyle};
use super::{BuildFormat, DecodeError};
use crate::build::{AccessoryType, ArmorType, BuildState, CharacterInfo, RankedPick, WireBuild};
use crate::catalog::{Catalog, Keyed, Table};
use crate::config::RulesConfig;
use crate::lenient_int;

pub const V3_TAG: &str = "v3";
const V3_FIELDS: usize = 12;

/// Field positions within one layout; `None` when the layout lacks the field.
struct Layout {
    expertise: Option<(usize, usize)>,
    armor: usize,
    armor_rank: usize,
    accessory: Option<(usize, usize)>,
    weapon_rank: usize,
    actions: usize,
    char_data: usize,
}

const ACCESSORY_ERA: Layout = Layout {
    expertise: Some((2, 3)),
    armor: 4,
    armor_rank: 5,
    accessory: Some((6, 7)),
    weapon_rank: 8,
    actions: 9,
    char_data: 10,
};

const EXPERTISE_ERA: Layout = Layout {
    expertise: Some((2, 3)),
    armor: 4,
    armor_rank: 5,
    accessory: None,
    weapon_rank: 6,
    actions: 7,
    char_data: 8,
};

const CLASSIC: Layout = Layout {
    expertise: None,
    armor: 2,
    armor_rank: 3,
    accessory: None,
    weapon_rank: 4,
    actions: 5,
    char_data: 6,
};

fn ids<'a, T: Keyed + 'a>(table: &Table<T>, lookups: impl Iterator<Item = &'a str>) -> String {
    lookups
        .map(|lookup| {
            let id = table.id_of(lookup);
            if id == 0 {
                warn!(lookup, "unknown lookup encoded as 0");
            }
            id.to_string()
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn rank_digits<'a>(picks: impl Iterator<Item = &'a RankedPick>) -> String {
    picks.map(|p| char::from(b'0' + p.rank.index())).collect()
}

pub fn encode_v3(build: &BuildState, catalog: &Catalog, rules: &RulesConfig) -> String {
    let (expertise_ids, expertise_ranks) = if rules.features.expertise {
        (
            ids(&catalog.expertise, build.expertise.iter().map(|p| p.lookup.as_str())),
            rank_digits(build.expertise.iter()),
        )
    } else {
        (String::new(), String::new())
    };
    let (accessory, accessory_rank) = match build.accessory {
        Some(accessory) if rules.features.accessory => (
            accessory.letter().to_string(),
            build.accessory_rank.index().to_string(),
        ),
        _ if rules.features.accessory => (String::new(), build.accessory_rank.index().to_string()),
        _ => (String::new(), String::new()),
    };

    let fields = [
        V3_TAG.to_string(),
        ids(&catalog.masteries, build.all_masteries().map(|p| p.lookup.as_str())),
        rank_digits(build.all_masteries()),
        expertise_ids,
        expertise_ranks,
        build.armor.map(|a| a.letter().to_string()).unwrap_or_default(),
        build.armor_rank.index().to_string(),
        accessory,
        accessory_rank,
        build.weapon_rank.index().to_string(),
        ids(&catalog.actions, build.actions.iter().map(String::as_str)),
        encode_char_data(&build.character),
    ];
    fields.join("|")
}

/// `443335` or `4,4,3,3,3,5`. Characters that are not digits count as 0.
pub fn parse_ranks(field: &str) -> Vec<i64> {
    if field.is_empty() {
        Vec::new()
    } else if field.contains(',') {
        field.split(',').map(lenient_int).collect()
    } else {
        field
            .chars()
            .map(|c| c.to_digit(10).map(i64::from).unwrap_or(0))
            .collect()
    }
}

/// Resolve one id (or, in older codes, a bare lookup) against `table`.
fn resolve<T: Keyed>(table: &Table<T>, token: &str) -> Option<String> {
    let token = token.trim();
    match token.parse::<u32>() {
        Ok(id) => table.by_id(id).map(|e| e.lookup().to_string()),
        Err(_) => table.get(token).map(|e| e.lookup().to_string()),
    }
}

/// Resolve ids and keep each surviving slot paired with the rank at the
/// same position; a slot that does not resolve takes its rank with it.
/// Ranks the token lacks stay missing, and surplus ranks are kept, so the
/// validator still sees a count mismatch.
fn resolve_ranked<T: Keyed>(
    table: &Table<T>,
    kind: &'static str,
    ids_field: &str,
    ranks_field: &str,
) -> (Vec<String>, Vec<i64>) {
    let ranks = parse_ranks(ranks_field);
    let ids: Vec<&str> = if ids_field.is_empty() {
        Vec::new()
    } else {
        ids_field.split(',').collect()
    };
    let mut lookups = Vec::new();
    let mut kept = Vec::new();
    for (i, token) in ids.iter().enumerate() {
        match resolve(table, token) {
            Some(lookup) => {
                lookups.push(lookup);
                kept.extend(ranks.get(i).copied());
            }
            None => warn!(kind, id = *token, "dropping unknown reference"),
        }
    }
    kept.extend(ranks.iter().skip(ids.len()).copied());
    (lookups, kept)
}

fn resolve_actions(catalog: &Catalog, field: &str) -> Vec<String> {
    field
        .split(',')
        .filter(|token| !token.is_empty())
        .filter_map(|token| {
            let lookup = resolve(&catalog.actions, token);
            if lookup.is_none() {
                warn!(id = token, "dropping unknown action");
            }
            lookup
        })
        .collect()
}

/// Letter codes expand to words; anything else is kept raw for the validator.
fn armor_word(field: &str) -> Option<String> {
    match ArmorType::parse(field) {
        Some(armor) => Some(armor.as_str().to_string()),
        None if field.is_empty() => None,
        None => Some(field.to_string()),
    }
}

fn accessory_word(field: &str) -> Option<String> {
    match AccessoryType::parse(field) {
        Some(accessory) => Some(accessory.as_str().to_string()),
        None if field.is_empty() => None,
        None => Some(field.to_string()),
    }
}

fn decode_fields(fields: &[&str], layout: &Layout, style: TextStyle, catalog: &Catalog) -> WireBuild {
    let field = |i: usize| fields.get(i).copied().unwrap_or("");

    let (chosen_masteries, chosen_masteries_ranks) =
        resolve_ranked(&catalog.masteries, "mastery", field(0), field(1));
    let (chosen_expertise, chosen_expertise_ranks) = match layout.expertise {
        Some((ids, ranks)) => resolve_ranked(&catalog.expertise, "expertise", field(ids), field(ranks)),
        None => (Vec::new(), Vec::new()),
    };
    let (accessory_type, accessory_rank) = match layout.accessory {
        Some((kind, rank)) => (accessory_word(field(kind)), lenient_int(field(rank))),
        None => (None, 0),
    };
    let character = match field(layout.char_data) {
        "" => CharacterInfo::default(),
        block => decode_char_data(block, style),
    };

    WireBuild {
        chosen_masteries,
        chosen_masteries_ranks,
        chosen_expertise,
        chosen_expertise_ranks,
        armor_type: armor_word(field(layout.armor)),
        armor_rank: lenient_int(field(layout.armor_rank)),
        accessory_type,
        accessory_rank,
        weapon_rank: lenient_int(field(layout.weapon_rank)),
        chosen_actions: resolve_actions(catalog, field(layout.actions)),
        character,
    }
}

pub fn decode_v3(text: &str, catalog: &Catalog) -> Result<WireBuild, DecodeError> {
    let fields: Vec<&str> = text.split('|').collect();
    if fields.len() != V3_FIELDS {
        return Err(DecodeError::CanonicalFieldCount { found: fields.len() });
    }
    Ok(decode_fields(&fields[1..], &ACCESSORY_ERA, TextStyle::Escaped, catalog))
}

/// Decode one of the untagged compact layouts picked by `format`.
pub fn decode_legacy(text: &str, format: BuildFormat, catalog: &Catalog) -> WireBuild {
    let fields: Vec<&str> = text.split('|').collect();
    let layout = match format {
        BuildFormat::AccessoryCompact => &ACCESSORY_ERA,
        BuildFormat::ExpertiseCompact => &EXPERTISE_ERA,
        _ => &CLASSIC,
    };
    decode_fields(&fields, layout, TextStyle::Raw, catalog)
}
