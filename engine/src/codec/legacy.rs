//! Lookup-based layouts from before compact ids.
//!
//! Both carry mastery and action lookups verbatim, so nothing is resolved
//! here; unknown lookups are pruned when the wire build is normalized.

use super::chardata::decode_component;
use super::compact::parse_ranks;
use crate::build::{CharacterInfo, WireBuild};
use crate::lenient_int;

fn list(field: &str) -> Vec<String> {
    field
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn spaced(field: Option<&&str>) -> String {
    field.map(|s| s.replace('_', " ")).unwrap_or_default()
}

fn word(field: &str) -> Option<String> {
    let field = field.trim();
    (!field.is_empty()).then(|| field.to_ascii_lowercase())
}

fn positional(fields: &[&str]) -> WireBuild {
    let field = |i: usize| fields.get(i).copied().unwrap_or("");
    WireBuild {
        chosen_masteries: list(field(0)),
        chosen_masteries_ranks: parse_ranks(field(1)),
        armor_type: word(field(2)),
        armor_rank: lenient_int(field(3)),
        weapon_rank: lenient_int(field(4)),
        chosen_actions: list(field(5)),
        ..WireBuild::default()
    }
}

/// `lookups|ranks|armor|armorRank|weaponRank|actions|name|race|title|thread|banner`
pub fn decode_pipe_lookup(text: &str) -> WireBuild {
    let fields: Vec<&str> = text.split('|').collect();
    let mut wire = positional(&fields);
    wire.character = CharacterInfo {
        name: spaced(fields.get(6)),
        race: spaced(fields.get(7)),
        title: spaced(fields.get(8)),
        thread_code: spaced(fields.get(9)),
        profile_banner_url: fields.get(10).map(|b| decode_component(b)).unwrap_or_default(),
        ..CharacterInfo::default()
    };
    wire
}

/// `lookups.ranks.armor.armorRank.weaponRank.actions[.name[.thread[.banner]]]`
///
/// The banner is percent-escaped, since a bare URL would split on its dots.
pub fn decode_dot_v1(text: &str) -> WireBuild {
    let fields: Vec<&str> = text.split('.').collect();
    let mut wire = positional(&fields);
    wire.character.name = spaced(fields.get(6));
    wire.character.thread_code = spaced(fields.get(7));
    wire.character.profile_banner_url = fields
        .get(8)
        .map(|b| decode_component(b))
        .unwrap_or_default();
    wire
}
