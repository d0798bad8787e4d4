//! Share URLs built around a token.

use serde::{Deserialize, Serialize};

use crate::codec::{extract_payload, IMPORT_MARKER};

pub const DEFAULT_BASE_URL: &str = "https://terrarp.com/build/";
pub const INDEX_PAGE: &str = "index.html";
pub const SHEET_PAGE: &str = "build-sheet.html";

/// Where the link is being generated from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingContext {
    pub base_url: String,
    pub current_path: String,
}

impl Default for RoutingContext {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            current_path: "/".to_string(),
        }
    }
}

impl RoutingContext {
    pub fn new(base_url: impl Into<String>, current_path: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            current_path: current_path.into(),
        }
    }

    /// Links open the editor from any path-like location and the sheet
    /// otherwise.
    pub fn target_page(&self) -> &'static str {
        let path = self.current_path.as_str();
        if path.contains(INDEX_PAGE) || path.ends_with('/') || path.contains('/') {
            INDEX_PAGE
        } else {
            SHEET_PAGE
        }
    }

    /// `base + page + token`. A bare payload gets the import marker.
    pub fn share_url(&self, token: &str) -> String {
        let token = if token.starts_with('#') {
            token.to_string()
        } else {
            format!("{}{}", IMPORT_MARKER, token)
        };
        format!("{}{}{}", self.base_url, self.target_page(), token)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareLinks {
    pub full: String,
    pub direct: String,
    pub forum: String,
    pub discord: String,
}

/// Point a `/build/` link at the sheet page, leaving other URLs untouched.
pub fn direct_link(url: &str) -> String {
    let Some(hash) = url.find('#') else {
        return url.to_string();
    };
    let (page, fragment) = url.split_at(hash);
    let dir = page.strip_suffix(INDEX_PAGE).unwrap_or(page);
    if dir.ends_with("/build/") {
        format!("{}{}{}", dir, SHEET_PAGE, fragment)
    } else {
        url.to_string()
    }
}

pub fn share_links(token: &str, ctx: &RoutingContext) -> ShareLinks {
    let full = ctx.share_url(token);
    ShareLinks {
        direct: direct_link(&full),
        forum: format!("[url={}]My Build[/url]", full),
        discord: format!("Check out my build: {}", full),
        full,
    }
}

/// First eight payload characters, upper-cased.
pub fn short_code(token: &str) -> String {
    let payload = extract_payload(token).unwrap_or(token);
    payload.chars().take(8).collect::<String>().to_uppercase()
}
