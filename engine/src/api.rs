use std::path::Path;

use anyhow::{Context, Result};

use crate::build::BuildState;
use crate::catalog::Catalog;
use crate::codec::{self, DecodeError, Decoded};
use crate::config::RulesConfig;
use crate::ranks::{check_ranks, RankCheck};
use crate::sample::sample_build;
use crate::share::{self, RoutingContext, ShareLinks};
use crate::stats::{complete_stats, Stats};
use crate::validate::{self, ValidationReport};
use crate::Rank;

/// Catalog and rules bundled together; every boundary operation hangs off
/// this so nothing depends on global state.
#[derive(Debug, Clone)]
pub struct Engine {
    catalog: Catalog,
    rules: RulesConfig,
}

impl Engine {
    pub fn new(catalog: Catalog, rules: RulesConfig) -> Self {
        Self { catalog, rules }
    }

    /// Builtin catalog with default rules.
    pub fn builtin() -> Result<Self> {
        let catalog = Catalog::builtin().context("failed to load builtin catalog")?;
        Ok(Self::new(catalog, RulesConfig::default()))
    }

    /// Load optional catalog and rules files, falling back to the builtins.
    pub fn from_paths(catalog: Option<&Path>, rules: Option<&Path>) -> Result<Self> {
        let catalog = match catalog {
            Some(path) => Catalog::load(path)?,
            None => Catalog::builtin().context("failed to load builtin catalog")?,
        };
        let rules = match rules {
            Some(path) => RulesConfig::load(path)?,
            None => RulesConfig::default(),
        };
        Ok(Self::new(catalog, rules))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    pub fn encode(&self, build: &BuildState) -> String {
        codec::encode(build, &self.catalog, &self.rules)
    }

    pub fn encode_json(&self, build: &BuildState) -> String {
        codec::encode_json(build, &self.rules)
    }

    pub fn decode(&self, token: &str) -> Result<BuildState, DecodeError> {
        codec::decode(token, &self.catalog)
    }

    /// Decode without normalizing, keeping the detected layout.
    pub fn decode_raw(&self, token: &str) -> Result<Decoded, DecodeError> {
        codec::decode_wire(token, &self.catalog)
    }

    pub fn validate(&self, build: &BuildState) -> ValidationReport {
        validate::validate(build, &self.catalog, &self.rules)
    }

    pub fn validate_token(&self, token: &str) -> ValidationReport {
        validate::validate_token(token, &self.catalog, &self.rules)
    }

    pub fn compute_stats(&self, build: &BuildState) -> Stats {
        complete_stats(build, &self.catalog, &self.rules)
    }

    /// Rank caps from the loaded rules over raw rank values.
    pub fn validate_rank_distribution(&self, ranks: &[i64]) -> RankCheck {
        check_ranks(ranks.iter().map(|&r| Rank::lenient(r)), &self.rules.rank_caps)
    }

    pub fn share_links(&self, build: &BuildState, ctx: &RoutingContext) -> ShareLinks {
        share::share_links(&self.encode(build), ctx)
    }

    pub fn sample(&self, seed: u64) -> BuildState {
        sample_build(seed, &self.catalog, &self.rules)
    }
}
