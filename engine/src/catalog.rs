//! Read-only content tables: masteries, actions, expertise and armor abilities.
//!
//! Every entry is addressable by its durable `lookup` string and, for the
//! tables that take part in compact build codes, by a small integer `id`.
//! Ids are part of already-issued share tokens, so a catalog must never
//! reassign them; `0` is reserved as the "unknown" sentinel.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{ArmorType, Rank};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveKind {
    Fortitude,
    Reflex,
    Will,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Offense,
    Defense,
    Support,
    Alter,
    Versatile,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Offense => "offense",
            Role::Defense => "defense",
            Role::Support => "support",
            Role::Alter => "alter",
            Role::Versatile => "versatile",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mastery {
    pub lookup: String,
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub save: Option<SaveKind>,
    #[serde(alias = "role", alias = "primaryRole")]
    pub primary_role: Role,
    #[serde(default, alias = "secondaryRole")]
    pub secondary_role: Option<Role>,
    #[serde(default, alias = "breakType")]
    pub break_type: String,
    #[serde(default)]
    pub actions: Vec<String>,
}

/// Which masteries grant an action: everyone, or an explicit list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawScope", into = "RawScope")]
pub enum MasteryScope {
    All,
    Only(Vec<String>),
}

impl MasteryScope {
    pub fn includes(&self, mastery: &str) -> bool {
        match self {
            MasteryScope::All => true,
            MasteryScope::Only(list) => list.iter().any(|m| m == mastery),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawScope {
    Text(String),
    List(Vec<String>),
}

impl From<RawScope> for MasteryScope {
    fn from(raw: RawScope) -> Self {
        match raw {
            RawScope::Text(s) if s.trim().eq_ignore_ascii_case("all") => MasteryScope::All,
            // Older tables store the list as one space-separated string.
            RawScope::Text(s) => {
                MasteryScope::Only(s.split_whitespace().map(str::to_string).collect())
            }
            RawScope::List(list) => MasteryScope::Only(list),
        }
    }
}

impl From<MasteryScope> for RawScope {
    fn from(scope: MasteryScope) -> Self {
        match scope {
            MasteryScope::All => RawScope::Text("all".to_string()),
            MasteryScope::Only(list) => RawScope::List(list),
        }
    }
}

/// A stat bonus carried by an action: a fixed amount, or resolved from a
/// rank-dependent table keyed by the action's lookup.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBonus", into = "RawBonus")]
pub enum BonusValue {
    Flat(i32),
    RankBased,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawBonus {
    Number(i32),
    Text(String),
}

impl TryFrom<RawBonus> for BonusValue {
    type Error = String;

    fn try_from(raw: RawBonus) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawBonus::Number(n) => Ok(BonusValue::Flat(n)),
            RawBonus::Text(s) if s == "rank-based" => Ok(BonusValue::RankBased),
            RawBonus::Text(s) => Err(format!("unknown bonus value '{}'", s)),
        }
    }
}

impl From<BonusValue> for RawBonus {
    fn from(value: BonusValue) -> Self {
        match value {
            BonusValue::Flat(n) => RawBonus::Number(n),
            BonusValue::RankBased => RawBonus::Text("rank-based".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub lookup: String,
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub image: String,
    pub masteries: MasteryScope,
    pub category: String,
    #[serde(default)]
    pub bonuses: IndexMap<String, BonusValue>,
    #[serde(default)]
    pub pair: Option<String>,
    #[serde(default)]
    pub slotcost: Option<u32>,
    #[serde(default)]
    pub dice: String,
    #[serde(default)]
    pub roll: String,
}

impl Action {
    pub fn bonus(&self, stat: &str) -> Option<BonusValue> {
        self.bonuses.get(stat).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expertise {
    pub lookup: String,
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmorAbility {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "rollCode")]
    pub roll_code: String,
}

/// Entries addressable by lookup and by compact id.
pub trait Keyed {
    fn lookup(&self) -> &str;
    fn id(&self) -> u32;
}

impl Keyed for Mastery {
    fn lookup(&self) -> &str {
        &self.lookup
    }
    fn id(&self) -> u32 {
        self.id
    }
}

impl Keyed for Action {
    fn lookup(&self) -> &str {
        &self.lookup
    }
    fn id(&self) -> u32 {
        self.id
    }
}

impl Keyed for Expertise {
    fn lookup(&self) -> &str {
        &self.lookup
    }
    fn id(&self) -> u32 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("{table}: duplicate lookup '{lookup}'")]
    DuplicateLookup { table: &'static str, lookup: String },
    #[error("{table}: id {id} is used by both '{first}' and '{second}'")]
    DuplicateId {
        table: &'static str,
        id: u32,
        first: String,
        second: String,
    },
    #[error("{table}: '{lookup}' uses reserved id 0")]
    ReservedId { table: &'static str, lookup: String },
    #[error("failed to parse builtin catalog: {0}")]
    Builtin(String),
}

/// One indexed table, ordered as authored.
#[derive(Debug, Clone)]
pub struct Table<T> {
    entries: IndexMap<String, T>,
    by_id: IndexMap<u32, usize>,
}

impl<T: Keyed> Table<T> {
    fn build(table: &'static str, items: Vec<T>) -> Result<Self, CatalogError> {
        let mut entries: IndexMap<String, T> = IndexMap::with_capacity(items.len());
        let mut by_id = IndexMap::with_capacity(items.len());
        for item in items {
            if item.id() == 0 {
                return Err(CatalogError::ReservedId {
                    table,
                    lookup: item.lookup().to_string(),
                });
            }
            if entries.contains_key(item.lookup()) {
                return Err(CatalogError::DuplicateLookup {
                    table,
                    lookup: item.lookup().to_string(),
                });
            }
            if let Some(&idx) = by_id.get(&item.id()) {
                let first = entries
                    .get_index(idx)
                    .map(|(k, _)| k.clone())
                    .unwrap_or_default();
                return Err(CatalogError::DuplicateId {
                    table,
                    id: item.id(),
                    first,
                    second: item.lookup().to_string(),
                });
            }
            by_id.insert(item.id(), entries.len());
            entries.insert(item.lookup().to_string(), item);
        }
        Ok(Self { entries, by_id })
    }

    pub fn get(&self, lookup: &str) -> Option<&T> {
        self.entries.get(lookup)
    }

    pub fn by_id(&self, id: u32) -> Option<&T> {
        self.by_id
            .get(&id)
            .and_then(|&idx| self.entries.get_index(idx))
            .map(|(_, v)| v)
    }

    /// Compact id for a lookup, `0` when unknown.
    pub fn id_of(&self, lookup: &str) -> u32 {
        self.get(lookup).map(Keyed::id).unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// On-disk shape of a catalog file (JSON or YAML).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogData {
    #[serde(default)]
    pub masteries: Vec<Mastery>,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub expertise: Vec<Expertise>,
    #[serde(default)]
    pub armor_abilities: IndexMap<ArmorType, IndexMap<Rank, ArmorAbility>>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    pub masteries: Table<Mastery>,
    pub actions: Table<Action>,
    pub expertise: Table<Expertise>,
    armor_abilities: IndexMap<ArmorType, IndexMap<Rank, ArmorAbility>>,
}

impl Catalog {
    pub fn from_data(data: CatalogData) -> Result<Self, CatalogError> {
        Ok(Self {
            masteries: Table::build("masteries", data.masteries)?,
            actions: Table::build("actions", data.actions)?,
            expertise: Table::build("expertise", data.expertise)?,
            armor_abilities: data.armor_abilities,
        })
    }

    /// The catalog bundled with the engine.
    pub fn builtin() -> Result<Self, CatalogError> {
        let data: CatalogData = serde_json::from_str(crate::content::BUILTIN_CATALOG)
            .map_err(|e| CatalogError::Builtin(e.to_string()))?;
        Self::from_data(data)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let data: CatalogData = serde_json::from_str(text).context("invalid catalog JSON")?;
        Ok(Self::from_data(data)?)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let data: CatalogData = serde_yaml::from_str(text).context("invalid catalog YAML")?;
        Ok(Self::from_data(data)?)
    }

    /// Load a catalog file; `.yaml`/`.yml` are read as YAML, anything else as JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog: {}", path.display()))?;
        let catalog = if is_yaml(path) {
            Self::from_yaml_str(&text)
        } else {
            Self::from_json_str(&text)
        };
        catalog.with_context(|| format!("failed to load catalog: {}", path.display()))
    }

    pub fn mastery(&self, lookup: &str) -> Option<&Mastery> {
        self.masteries.get(lookup)
    }

    pub fn action(&self, lookup: &str) -> Option<&Action> {
        self.actions.get(lookup)
    }

    pub fn expertise(&self, lookup: &str) -> Option<&Expertise> {
        self.expertise.get(lookup)
    }

    pub fn armor_ability(&self, armor: ArmorType, rank: Rank) -> Option<&ArmorAbility> {
        self.armor_abilities.get(&armor).and_then(|t| t.get(&rank))
    }

    /// Actions sharing each pair key, in catalog order.
    pub fn action_pairs(&self) -> IndexMap<&str, Vec<&Action>> {
        let mut pairs: IndexMap<&str, Vec<&Action>> = IndexMap::new();
        for action in self.actions.iter() {
            if let Some(pair) = action.pair.as_deref() {
                pairs.entry(pair).or_default().push(action);
            }
        }
        pairs
    }
}

pub(crate) fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}
