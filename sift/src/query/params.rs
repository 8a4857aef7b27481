//! Typed request-parameter structs, one per endpoint.
//!
//! Parameters arrive as strings and stay strings here; interpreting them
//! (integer bounds, boolean flags, field lists) is the validator's job.

use crate::{Error, Result};
use serde::Deserialize;

/// GET /search/{app_id}[/{app_type}] query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    /// Lucene-like query string; absent or "*:*" means match-all
    pub q: Option<String>,
    /// Requested page size
    pub size: Option<String>,
    /// Offset for non-scrolled paging
    pub from: Option<String>,
    /// Boolean-like flag requesting a scroll context
    pub scroll: Option<String>,
    /// Opaque store-issued cursor continuing an existing scroll
    pub scroll_id: Option<String>,
    /// Comma-separated field projection, returned in this order
    pub fl: Option<String>,
}

/// POST/PUT /update/{app_id} query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenameParams {
    pub name: Option<String>,
}

/// GET /denoise/{app_id} query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DenoiseParams {
    pub save: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: Option<String>,
}

/// Accepts true/false/1/0, case-insensitive.
pub fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(Error::Validation(format!(
            "parameter '{name}' must be true/false/1/0, got '{other}'"
        ))),
    }
}
