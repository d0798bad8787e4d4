//! The build being edited, and its parallel-array wire shape.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::catalog::{Catalog, Role};
use crate::{lenient_int, Rank};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmorType {
    Heavy,
    Medium,
    Light,
}

impl ArmorType {
    pub const ALL: [ArmorType; 3] = [ArmorType::Heavy, ArmorType::Medium, ArmorType::Light];

    pub fn as_str(self) -> &'static str {
        match self {
            ArmorType::Heavy => "heavy",
            ArmorType::Medium => "medium",
            ArmorType::Light => "light",
        }
    }

    pub fn letter(self) -> char {
        match self {
            ArmorType::Heavy => 'h',
            ArmorType::Medium => 'm',
            ArmorType::Light => 'l',
        }
    }

    /// Accepts the full word or its single-letter code.
    pub fn parse(text: &str) -> Option<ArmorType> {
        match text.trim().to_ascii_lowercase().as_str() {
            "heavy" | "h" => Some(ArmorType::Heavy),
            "medium" | "m" => Some(ArmorType::Medium),
            "light" | "l" => Some(ArmorType::Light),
            _ => None,
        }
    }

    /// HP gained per armor rank.
    pub fn hp_per_rank(self) -> i32 {
        match self {
            ArmorType::Light => 20,
            ArmorType::Medium => 25,
            ArmorType::Heavy => 30,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessoryType {
    Combat,
    Utility,
    Magic,
}

impl AccessoryType {
    pub const ALL: [AccessoryType; 3] = [
        AccessoryType::Combat,
        AccessoryType::Utility,
        AccessoryType::Magic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AccessoryType::Combat => "combat",
            AccessoryType::Utility => "utility",
            AccessoryType::Magic => "magic",
        }
    }

    /// `m` here is magic; armor's `m` (medium) lives in a separate field.
    pub fn letter(self) -> char {
        match self {
            AccessoryType::Combat => 'c',
            AccessoryType::Utility => 'u',
            AccessoryType::Magic => 'm',
        }
    }

    pub fn parse(text: &str) -> Option<AccessoryType> {
        match text.trim().to_ascii_lowercase().as_str() {
            "combat" | "c" => Some(AccessoryType::Combat),
            "utility" | "u" => Some(AccessoryType::Utility),
            "magic" | "m" => Some(AccessoryType::Magic),
            _ => None,
        }
    }
}

/// A chosen mastery or expertise together with its rank.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RankedPick {
    pub lookup: String,
    pub rank: Rank,
}

impl RankedPick {
    pub fn new(lookup: impl Into<String>, rank: Rank) -> Self {
        Self {
            lookup: lookup.into(),
            rank,
        }
    }
}

/// Free-text character fields and imported profile data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterInfo {
    #[serde(default, rename = "characterName")]
    pub name: String,
    #[serde(default, rename = "characterRace")]
    pub race: String,
    #[serde(default, rename = "characterTitle")]
    pub title: String,
    #[serde(default)]
    pub thread_code: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub profile_banner_url: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(
        default,
        serialize_with = "flag_as_int",
        deserialize_with = "lenient_flag"
    )]
    pub ng: bool,
}

/// Snapshot of an in-progress build.
///
/// Masteries are kept as ordered `(lookup, rank)` records so a rank can never
/// drift away from its mastery. The alter (hybrid) mastery has its own slot;
/// on the wire it is always written last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildState {
    pub masteries: Vec<RankedPick>,
    pub alter: Option<RankedPick>,
    pub expertise: Vec<RankedPick>,
    pub armor: Option<ArmorType>,
    pub armor_rank: Rank,
    pub accessory: Option<AccessoryType>,
    pub accessory_rank: Rank,
    pub weapon_rank: Rank,
    pub actions: Vec<String>,
    pub character: CharacterInfo,
}

impl BuildState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Regular masteries followed by the alter slot, in wire order.
    pub fn all_masteries(&self) -> impl Iterator<Item = &RankedPick> {
        self.masteries.iter().chain(self.alter.iter())
    }

    pub fn mastery_count(&self) -> usize {
        self.masteries.len() + usize::from(self.alter.is_some())
    }

    pub fn mastery_ranks(&self) -> Vec<Rank> {
        self.all_masteries().map(|p| p.rank).collect()
    }

    pub fn expertise_ranks(&self) -> Vec<Rank> {
        self.expertise.iter().map(|p| p.rank).collect()
    }

    pub fn has_action(&self, lookup: &str) -> bool {
        self.actions.iter().any(|a| a == lookup)
    }

    /// Rank driving the alter-slot passives.
    ///
    /// Without an explicit alter slot the last regular mastery stands in,
    /// which matches how older builds were laid out.
    pub fn alter_rank(&self) -> Rank {
        self.alter
            .as_ref()
            .or_else(|| self.masteries.last())
            .map(|p| p.rank)
            .unwrap_or_default()
    }
}

/// Parallel-array shape used by share tokens, the JSON format and host UIs.
///
/// Values are kept raw (unknown armor words, out-of-range ranks, mismatched
/// lengths) so the validator can report them before they are normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireBuild {
    #[serde(default)]
    pub chosen_masteries: Vec<String>,
    #[serde(default, deserialize_with = "lenient_ints")]
    pub chosen_masteries_ranks: Vec<i64>,
    #[serde(default)]
    pub chosen_expertise: Vec<String>,
    #[serde(default, deserialize_with = "lenient_ints")]
    pub chosen_expertise_ranks: Vec<i64>,
    #[serde(default)]
    pub armor_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_int_field")]
    pub armor_rank: i64,
    #[serde(default)]
    pub accessory_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_int_field")]
    pub accessory_rank: i64,
    #[serde(default, deserialize_with = "lenient_int_field")]
    pub weapon_rank: i64,
    #[serde(default)]
    pub chosen_actions: Vec<String>,
    #[serde(flatten)]
    pub character: CharacterInfo,
}

impl WireBuild {
    pub fn from_build(build: &BuildState) -> Self {
        Self {
            chosen_masteries: build.all_masteries().map(|p| p.lookup.clone()).collect(),
            chosen_masteries_ranks: build
                .all_masteries()
                .map(|p| p.rank.index() as i64)
                .collect(),
            chosen_expertise: build.expertise.iter().map(|p| p.lookup.clone()).collect(),
            chosen_expertise_ranks: build
                .expertise
                .iter()
                .map(|p| p.rank.index() as i64)
                .collect(),
            armor_type: build.armor.map(|a| a.as_str().to_string()),
            armor_rank: build.armor_rank.index() as i64,
            accessory_type: build.accessory.map(|a| a.as_str().to_string()),
            accessory_rank: build.accessory_rank.index() as i64,
            weapon_rank: build.weapon_rank.index() as i64,
            chosen_actions: build.actions.clone(),
            character: build.character.clone(),
        }
    }

    /// Normalize into a [`BuildState`].
    ///
    /// Pairs lookups with ranks by position (a missing rank counts as E),
    /// drops lookups the catalog does not know together with their rank,
    /// coerces out-of-range values, and moves a trailing alter-role mastery
    /// into the alter slot.
    pub fn into_build(self, catalog: &Catalog) -> BuildState {
        let mut masteries = pair_ranks(self.chosen_masteries, &self.chosen_masteries_ranks);
        masteries.retain(|p| known(catalog.mastery(&p.lookup).is_some(), "mastery", &p.lookup));
        let alter = match masteries.last() {
            Some(last)
                if catalog
                    .mastery(&last.lookup)
                    .is_some_and(|m| m.primary_role == Role::Alter) =>
            {
                masteries.pop()
            }
            _ => None,
        };

        let mut expertise = pair_ranks(self.chosen_expertise, &self.chosen_expertise_ranks);
        expertise.retain(|p| known(catalog.expertise(&p.lookup).is_some(), "expertise", &p.lookup));

        let mut actions = self.chosen_actions;
        actions.retain(|a| known(catalog.action(a).is_some(), "action", a));

        BuildState {
            masteries,
            alter,
            expertise,
            armor: self.armor_type.as_deref().and_then(ArmorType::parse),
            armor_rank: Rank::lenient(self.armor_rank),
            accessory: self.accessory_type.as_deref().and_then(AccessoryType::parse),
            accessory_rank: Rank::lenient(self.accessory_rank),
            weapon_rank: Rank::lenient(self.weapon_rank),
            actions,
            character: self.character,
        }
    }
}

fn known(found: bool, kind: &str, lookup: &str) -> bool {
    if !found {
        warn!(kind, lookup, "dropping unknown reference");
    }
    found
}

impl From<&BuildState> for WireBuild {
    fn from(build: &BuildState) -> Self {
        WireBuild::from_build(build)
    }
}

fn pair_ranks(lookups: Vec<String>, ranks: &[i64]) -> Vec<RankedPick> {
    lookups
        .into_iter()
        .enumerate()
        .map(|(i, lookup)| RankedPick {
            lookup,
            rank: Rank::lenient(ranks.get(i).copied().unwrap_or(0)),
        })
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientInt {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl LenientInt {
    fn value(self) -> i64 {
        match self {
            LenientInt::Int(n) => n,
            LenientInt::Float(f) if f.is_finite() => f.trunc() as i64,
            LenientInt::Float(_) => 0,
            LenientInt::Bool(b) => i64::from(b),
            LenientInt::Text(s) => lenient_int(&s),
        }
    }
}

fn lenient_int_field<'de, D: Deserializer<'de>>(de: D) -> Result<i64, D::Error> {
    Option::<LenientInt>::deserialize(de).map(|v| v.map(LenientInt::value).unwrap_or(0))
}

fn lenient_ints<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<i64>, D::Error> {
    Option::<Vec<LenientInt>>::deserialize(de)
        .map(|v| v.unwrap_or_default().into_iter().map(LenientInt::value).collect())
}

fn flag_as_int<S: serde::Serializer>(flag: &bool, ser: S) -> Result<S::Ok, S::Error> {
    ser.serialize_u8(u8::from(*flag))
}

fn lenient_flag<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
    lenient_int_field(de).map(|v| v == 1)
}
