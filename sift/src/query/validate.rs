//! Turns raw search parameters plus a parsed AST into an executable
//! [`SearchSpec`], or rejects them with a precise reason.
//!
//! Field-existence checks need the target index's mapping. When the mapping
//! cannot be supplied (store down, index created moments ago with no mapping
//! yet) validation degrades to permissive mode: grammar and numeric bounds
//! are still enforced, field checks are skipped.

use crate::query::ast::QueryNode;
use crate::query::params::{parse_bool, SearchParams};
use crate::query::parser;
use crate::store::IndexMetadata;
use crate::{Error, Result};

/// Size bounds taken from [`crate::config::SearchConfig`].
#[derive(Debug, Clone, Copy)]
pub struct SearchLimits {
    pub default_size: usize,
    pub max_size: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            default_size: 100,
            max_size: 10_000,
        }
    }
}

/// Validated, executable search specification.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSpec {
    pub index: String,
    pub doc_type: Option<String>,
    /// `None` means match-all
    pub query: Option<QueryNode>,
    /// Projected fields in request order; empty means all stored fields
    pub fields: Vec<String>,
    pub size: usize,
    pub from: usize,
    pub scroll: bool,
    /// Opaque store-issued cursor; present only when continuing a scroll
    pub scroll_id: Option<String>,
}

pub fn validate(
    index: &str,
    doc_type: Option<String>,
    params: &SearchParams,
    metadata: Option<&IndexMetadata>,
    limits: &SearchLimits,
) -> Result<SearchSpec> {
    let query = match params.q.as_deref().map(str::trim) {
        None | Some("") | Some("*:*") => None,
        Some(q) => Some(parser::parse(q)?),
    };

    let size = match params.size.as_deref() {
        None => limits.default_size,
        Some(raw) => {
            let parsed: usize = raw.parse().map_err(|_| {
                Error::Validation(format!("parameter 'size' must be a positive integer, got '{raw}'"))
            })?;
            if parsed == 0 || parsed > limits.max_size {
                return Err(Error::Validation(format!(
                    "parameter 'size' must be in 1..={}, got {parsed}",
                    limits.max_size
                )));
            }
            parsed
        }
    };

    let from = match params.from.as_deref() {
        None => 0,
        Some(raw) => raw.parse().map_err(|_| {
            Error::Validation(format!(
                "parameter 'from' must be a non-negative integer, got '{raw}'"
            ))
        })?,
    };

    let scroll_flag = match params.scroll.as_deref() {
        None => false,
        Some(raw) => parse_bool("scroll", raw)?,
    };
    let scroll_id = params.scroll_id.clone().filter(|id| !id.is_empty());

    let fields: Vec<String> = match params.fl.as_deref() {
        None => Vec::new(),
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect(),
    };

    if let Some(meta) = metadata {
        let mut referenced: Vec<&str> = Vec::new();
        if let Some(ast) = &query {
            ast.referenced_fields(&mut referenced);
        }
        referenced.extend(fields.iter().map(String::as_str));
        for field in referenced {
            if !meta.has_field(field) {
                return Err(Error::Validation(format!(
                    "unknown field '{field}' in index {index}"
                )));
            }
        }
    }

    Ok(SearchSpec {
        index: index.to_string(),
        doc_type,
        query,
        fields,
        size,
        from,
        // A supplied cursor implies scrolling regardless of the flag.
        scroll: scroll_flag || scroll_id.is_some(),
        scroll_id,
    })
}
