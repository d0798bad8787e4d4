//! `base64(JSON)` build codes.

use serde_json::Value;

use crate::build::{BuildState, WireBuild};
use crate::config::RulesConfig;

pub fn encode_json(build: &BuildState, rules: &RulesConfig) -> String {
    let mut wire = WireBuild::from_build(build);
    if !rules.features.expertise {
        wire.chosen_expertise.clear();
        wire.chosen_expertise_ranks.clear();
    }
    if !rules.features.accessory {
        wire.accessory_type = None;
        wire.accessory_rank = 0;
    }
    // Plain strings and integers only; serialization cannot fail.
    serde_json::to_string(&wire).unwrap_or_default()
}

/// A JSON object carrying `chosenMasteries`.
pub fn looks_like_build(text: &str) -> bool {
    serde_json::from_str::<Value>(text)
        .map(|v| v.get("chosenMasteries").is_some())
        .unwrap_or(false)
}

pub fn decode_json(text: &str) -> Result<WireBuild, serde_json::Error> {
    serde_json::from_str(text)
}
