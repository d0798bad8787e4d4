//! Tunable game limits.

use std::{fs, path::Path};

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::catalog::is_yaml;
use crate::Rank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankCaps {
    /// Slots allowed at S.
    pub s: usize,
    /// Slots allowed at A or S combined.
    pub a_or_above: usize,
    /// Ranked slots in total.
    pub total: usize,
}

impl Default for RankCaps {
    fn default() -> Self {
        Self {
            s: 1,
            a_or_above: 3,
            total: 6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    pub expertise: bool,
    pub accessory: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            expertise: true,
            accessory: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub max_masteries: usize,
    pub max_expertise: usize,
    pub action_slot_cap: u32,
    pub max_rank: u8,
    pub rank_caps: RankCaps,
    pub features: Features,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            max_masteries: 6,
            max_expertise: 6,
            action_slot_cap: 6,
            max_rank: 5,
            rank_caps: RankCaps::default(),
            features: Features::default(),
        }
    }
}

impl RulesConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let rules: Self = serde_yaml::from_str(text).context("invalid rules YAML")?;
        rules.checked()
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let rules: Self = serde_json::from_str(text).context("invalid rules JSON")?;
        rules.checked()
    }

    /// Ranks stop at S; a higher `max_rank` would let the validator accept
    /// values every other part of the engine reads as E.
    fn checked(self) -> Result<Self> {
        if self.max_rank > Rank::S.index() {
            bail!(
                "max_rank {} is above the highest rank ({})",
                self.max_rank,
                Rank::S.index()
            );
        }
        Ok(self)
    }

    /// Load a rules file; `.yaml`/`.yml` are read as YAML, anything else as JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read rules: {}", path.display()))?;
        let rules = if is_yaml(path) {
            Self::from_yaml_str(&text)
        } else {
            Self::from_json_str(&text)
        };
        rules.with_context(|| format!("failed to load rules: {}", path.display()))
    }

    /// One of the rule sets bundled with the engine, by name.
    pub fn builtin(name: &str) -> Result<Self> {
        let text = crate::content::builtin_rules()
            .get(name)
            .copied()
            .ok_or_else(|| anyhow!("unknown builtin rules '{}'", name))?;
        Self::from_yaml_str(text).with_context(|| format!("builtin rules '{}'", name))
    }
}
