//! Assembles raw store pages into the external JSON response shape.

use crate::store::StorePage;
use serde::Serialize;
use serde_json::Value;

/// External search response: `{hits: [...], total: N, scroll_id?}`.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub hits: Vec<Value>,
    pub total: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scroll_id: Option<String>,
}

/// Apply field projection and wrap the page. With a non-empty `fields`
/// list, each document keeps only those fields, in the requested order;
/// otherwise all stored fields pass through.
pub fn assemble(page: StorePage, fields: &[String]) -> SearchResponse {
    let hits = page
        .hits
        .into_iter()
        .map(|doc| {
            if fields.is_empty() {
                Value::Object(doc)
            } else {
                let mut projected = serde_json::Map::new();
                for field in fields {
                    if let Some(value) = doc.get(field) {
                        projected.insert(field.clone(), value.clone());
                    }
                }
                Value::Object(projected)
            }
        })
        .collect();

    SearchResponse {
        hits,
        total: page.total,
        scroll_id: page.cursor,
    }
}
