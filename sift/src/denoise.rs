//! Log-denoising collaborator.
//!
//! Only the interface contract is owned here: given an index, produce a
//! cleaned view of its raw documents and optionally persist it under a
//! document type (default "parsed"). The shipped implementation strips
//! null and empty fields; richer heuristics live outside this crate.

use crate::store::{Document, DocumentStore};
use crate::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

#[async_trait]
pub trait Denoiser: Send + Sync {
    async fn denoise(&self, index: &str, doc_type: &str, save: bool) -> Result<Value>;
}

pub struct FieldDenoiser {
    store: Arc<dyn DocumentStore>,
    /// Scroll page size; one pass sweeps the whole index page by page.
    batch_size: usize,
}

impl FieldDenoiser {
    pub fn new(store: Arc<dyn DocumentStore>, batch_size: usize) -> Self {
        Self { store, batch_size }
    }

    fn clean(doc: &Document) -> Document {
        doc.iter()
            .filter(|(_, value)| match value {
                Value::Null => false,
                Value::String(s) => !s.is_empty(),
                _ => true,
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[async_trait]
impl Denoiser for FieldDenoiser {
    async fn denoise(&self, index: &str, doc_type: &str, save: bool) -> Result<Value> {
        let match_all = json!({ "match_all": {} });
        let mut page = self
            .store
            .open_scroll(index, None, &match_all, self.batch_size)
            .await?;

        let mut scanned = 0;
        let mut cleaned: Vec<Document> = Vec::new();
        loop {
            if page.hits.is_empty() {
                break;
            }
            scanned += page.hits.len();
            cleaned.extend(page.hits.iter().map(Self::clean));
            let Some(cursor) = page.cursor.take() else {
                break;
            };
            page = self.store.continue_scroll(&cursor).await?;
        }

        let saved = if save {
            self.store.save_documents(index, doc_type, &cleaned).await?
        } else {
            0
        };

        tracing::info!(index = %index, scanned, saved, doc_type = %doc_type, "denoise pass finished");
        Ok(json!({
            "index": index,
            "doc_type": doc_type,
            "scanned": scanned,
            "cleaned": cleaned.len(),
            "saved": saved,
        }))
    }
}
