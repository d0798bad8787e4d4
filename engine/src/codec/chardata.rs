//! The `&`-joined `key:value` character block carried at the end of compact
//! build codes.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::build::CharacterInfo;

/// Characters `encodeURIComponent` leaves alone.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Free text for the short fields: `_` is taken by spaces.
const FREE_TEXT: &AsciiSet = &COMPONENT.add(b'_');

const BANNER_PREFIX: &str = "https://terrarp.com/data/profile_banners/l/0/";

/// How the short text fields were written.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TextStyle {
    /// Spaces as `_`, everything else escaped.
    Escaped,
    /// Older codes only swapped spaces for `_` and escaped nothing.
    Raw,
}

pub fn encode_component(text: &str) -> String {
    utf8_percent_encode(text, COMPONENT).to_string()
}

pub fn decode_component(text: &str) -> String {
    percent_decode_str(text).decode_utf8_lossy().into_owned()
}

fn encode_free_text(text: &str) -> String {
    utf8_percent_encode(text, FREE_TEXT)
        .to_string()
        .replace("%20", "_")
}

fn decode_free_text(text: &str, style: TextStyle) -> String {
    let spaced = text.replace('_', " ");
    match style {
        TextStyle::Escaped => decode_component(&spaced),
        TextStyle::Raw => spaced,
    }
}

/// Forum banners shrink to their file part; anything else is escaped whole.
fn encode_banner(url: &str) -> String {
    if let Some(short) = url.strip_prefix(BANNER_PREFIX).filter(|s| is_short_banner(s)) {
        return short.to_string();
    }
    let escaped = encode_component(url);
    if is_short_banner(&escaped) {
        // A bare file name would be read back as a forum banner.
        escaped.replace('.', "%2E")
    } else {
        escaped
    }
}

fn is_short_banner(text: &str) -> bool {
    !text.contains(&['%', '&', '|'][..]) && (text.contains(".jpg") || text.contains(".png"))
}

fn decode_banner(text: &str) -> String {
    if is_short_banner(text) {
        format!("{}{}", BANNER_PREFIX, text)
    } else {
        decode_component(text)
    }
}

pub fn encode_char_data(info: &CharacterInfo) -> String {
    let mut parts: Vec<String> = Vec::new();
    let short_fields = [
        ("n", &info.name),
        ("r", &info.race),
        ("t", &info.title),
        ("c", &info.thread_code),
    ];
    for (key, value) in short_fields {
        if !value.is_empty() {
            parts.push(format!("{}:{}", key, encode_free_text(value)));
        }
    }
    if !info.note.is_empty() {
        parts.push(format!("note:{}", encode_component(&info.note)));
    }
    if !info.profile_banner_url.is_empty() {
        parts.push(format!("b:{}", encode_banner(&info.profile_banner_url)));
    }
    if !info.avatar_url.is_empty() {
        parts.push(format!("a:{}", encode_component(&info.avatar_url)));
    }
    if info.ng {
        parts.push("ng:1".to_string());
    }
    parts.join("&")
}

pub fn decode_char_data(block: &str, style: TextStyle) -> CharacterInfo {
    let mut info = CharacterInfo::default();
    for part in block.split('&') {
        let Some((key, value)) = part.split_once(':') else {
            continue;
        };
        match key {
            "n" => info.name = decode_free_text(value, style),
            "r" => info.race = decode_free_text(value, style),
            "t" => info.title = decode_free_text(value, style),
            "c" => info.thread_code = decode_free_text(value, style),
            "note" => info.note = decode_component(value),
            "a" => info.avatar_url = decode_component(value),
            "b" => info.profile_banner_url = decode_banner(value),
            "ng" => info.ng = crate::lenient_int(value) == 1,
            other => tracing::debug!(key = other, "ignoring unknown character field"),
        }
    }
    info
}
