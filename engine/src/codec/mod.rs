//! Share-token encoding and decoding.
//!
//! A token is a routing marker (`#import.`) followed by a base64 payload.
//! The payload is one of several text layouts accumulated over the editor's
//! lifetime; [`detect_format`] tells them apart and every layout decodes to
//! the same [`WireBuild`] shape.

pub mod chardata;
pub mod compact;
pub mod json;
pub mod legacy;

use std::borrow::Cow;
use std::fmt;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::build::{BuildState, WireBuild};
use crate::catalog::Catalog;
use crate::config::RulesConfig;

/// Marker written in front of every payload this crate emits.
pub const IMPORT_MARKER: &str = "#import.";

/// Markers accepted when decoding, without the leading `#`.
const ROUTING_MARKERS: [&str; 5] = ["compact-import.", "compact.", "import.", "sample.", "load."];

const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const LENIENT_URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("no build payload found")]
    MissingPayload,
    #[error("unrecognized routing marker '#{0}'")]
    UnknownMarker(String),
    #[error("payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("unsupported build code layout ({fields} fields)")]
    UnsupportedLayout { fields: usize },
    #[error("invalid build JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("v3 build code must have 12 fields, found {found}")]
    CanonicalFieldCount { found: usize },
}

/// Payload layouts, newest first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildFormat {
    Json,
    V3,
    /// Untagged compact codes with expertise and accessory fields.
    AccessoryCompact,
    /// Untagged compact codes with expertise but no accessory.
    ExpertiseCompact,
    /// Untagged compact codes from before expertise existed.
    ClassicCompact,
    /// Pipe-separated lookups and words.
    PipeLookup,
    /// The first, dot-separated layout.
    DotV1,
}

impl fmt::Display for BuildFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildFormat::Json => "json",
            BuildFormat::V3 => "v3",
            BuildFormat::AccessoryCompact => "accessory-compact",
            BuildFormat::ExpertiseCompact => "expertise-compact",
            BuildFormat::ClassicCompact => "classic-compact",
            BuildFormat::PipeLookup => "pipe-lookup",
            BuildFormat::DotV1 => "dot-v1",
        };
        f.write_str(name)
    }
}

/// A decoded token before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub format: BuildFormat,
    pub wire: WireBuild,
}

pub fn encode_payload(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

/// Canonical token for `build`. Never fails: unknown lookups encode as `0`.
pub fn encode(build: &BuildState, catalog: &Catalog, rules: &RulesConfig) -> String {
    let text = compact::encode_v3(build, catalog, rules);
    debug!(chars = text.len(), "encoded v3 build");
    format!("{}{}", IMPORT_MARKER, encode_payload(&text))
}

pub fn encode_json(build: &BuildState, rules: &RulesConfig) -> String {
    format!("{}{}", IMPORT_MARKER, encode_payload(&json::encode_json(build, rules)))
}

/// The base64 payload of `token`, with any URL or routing marker removed.
pub fn extract_payload(token: &str) -> Result<&str, DecodeError> {
    let token = token.trim();
    let payload = match token.rfind('#') {
        Some(at) => {
            let routed = &token[at + 1..];
            let marker = ROUTING_MARKERS
                .iter()
                .find(|m| routed.starts_with(*m))
                .ok_or_else(|| {
                    let shown = routed.split('.').next().unwrap_or_default();
                    DecodeError::UnknownMarker(shown.to_string())
                })?;
            &routed[marker.len()..]
        }
        None => token,
    };
    let payload = payload.trim();
    if payload.is_empty() {
        return Err(DecodeError::MissingPayload);
    }
    Ok(payload)
}

/// Decode a payload to text. Accepts missing padding, the URL-safe alphabet,
/// and payloads that were percent-escaped in transit. Bytes that are not
/// UTF-8 are read as Latin-1, which is what the oldest codes contain.
pub fn decode_payload(payload: &str) -> Result<String, DecodeError> {
    let unescaped: Cow<'_, str> = if payload.contains('%') {
        percent_decode_str(payload).decode_utf8_lossy()
    } else {
        Cow::Borrowed(payload)
    };
    let cleaned: String = unescaped.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = match LENIENT_STANDARD.decode(&cleaned) {
        Ok(bytes) => bytes,
        Err(err) => LENIENT_URL_SAFE.decode(&cleaned).map_err(|_| err)?,
    };
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            debug!("payload is not UTF-8, reading as Latin-1");
            err.into_bytes().into_iter().map(char::from).collect()
        }
    })
}

pub fn payload_text(token: &str) -> Result<String, DecodeError> {
    decode_payload(extract_payload(token)?)
}

fn is_numeric_list(field: &str) -> bool {
    !field.is_empty()
        && field
            .split(',')
            .all(|id| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()))
}

/// Classify decoded payload text. `None` when no layout fits.
pub fn detect_format(text: &str) -> Option<BuildFormat> {
    let trimmed = text.trim();
    if trimmed.starts_with('{') && json::looks_like_build(trimmed) {
        return Some(BuildFormat::Json);
    }
    let pipes: Vec<&str> = trimmed.split('|').collect();
    if pipes[0] == compact::V3_TAG {
        return Some(BuildFormat::V3);
    }
    if pipes.len() >= 6 {
        return Some(match pipes.len() {
            _ if !is_numeric_list(pipes[0]) => BuildFormat::PipeLookup,
            n if n >= 10 => BuildFormat::AccessoryCompact,
            n if n >= 8 => BuildFormat::ExpertiseCompact,
            _ => BuildFormat::ClassicCompact,
        });
    }
    if trimmed.split('.').count() >= 6 {
        return Some(BuildFormat::DotV1);
    }
    None
}

/// Decode payload text into the raw wire shape.
pub fn decode_text(text: &str, catalog: &Catalog) -> Result<Decoded, DecodeError> {
    let text = text.trim();
    let format = match detect_format(text) {
        Some(format) => format,
        None if text.starts_with('{') => {
            // Surface the JSON problem rather than a field count.
            json::decode_json(text)?;
            return Err(DecodeError::UnsupportedLayout { fields: 1 });
        }
        None => {
            let fields = text.split('|').count().max(text.split('.').count());
            return Err(DecodeError::UnsupportedLayout { fields });
        }
    };
    debug!(%format, "detected build code layout");

    let wire = match format {
        BuildFormat::Json => json::decode_json(text)?,
        BuildFormat::V3 => compact::decode_v3(text, catalog)?,
        BuildFormat::AccessoryCompact
        | BuildFormat::ExpertiseCompact
        | BuildFormat::ClassicCompact => compact::decode_legacy(text, format, catalog),
        BuildFormat::PipeLookup => legacy::decode_pipe_lookup(text),
        BuildFormat::DotV1 => legacy::decode_dot_v1(text),
    };
    Ok(Decoded { format, wire })
}

pub fn decode_wire(token: &str, catalog: &Catalog) -> Result<Decoded, DecodeError> {
    decode_text(&payload_text(token)?, catalog)
}

/// Decode any supported token into a normalized build.
pub fn decode(token: &str, catalog: &Catalog) -> Result<BuildState, DecodeError> {
    Ok(decode_wire(token, catalog)?.wire.into_build(catalog))
}
