//! Document-store seam.
//!
//! All index and search traffic goes through [`DocumentStore`], an explicit
//! handle injected from the process root. The production implementation is
//! [`es::EsClient`]; tests use the in-memory [`memory::MemoryStore`].

pub mod es;
pub mod translate;

#[cfg(test)]
pub(crate) mod memory;

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type Document = serde_json::Map<String, Value>;

/// Field names and document types known for one index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexMetadata {
    pub fields: Vec<String>,
    pub doc_types: Vec<String>,
}

impl IndexMetadata {
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f == name)
    }
}

/// One page of raw store hits, pre-projection.
#[derive(Debug, Clone, Default)]
pub struct StorePage {
    pub hits: Vec<Document>,
    pub total: u64,
    /// Next cursor; `None` once the store has signalled exhaustion.
    pub cursor: Option<String>,
}

/// Operations sift needs from the backing document store. Errors use the
/// crate taxonomy: NotFound for missing indices and expired cursors,
/// Conflict for create collisions, Unavailable for connection-level
/// failures, Internal for malformed responses. No implicit retries.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Cheap liveness probe.
    async fn ping(&self) -> bool;

    async fn list_indices(&self) -> Result<Vec<String>>;

    async fn index_exists(&self, name: &str) -> Result<bool>;

    async fn create_index(&self, name: &str) -> Result<()>;

    async fn index_metadata(&self, name: &str) -> Result<IndexMetadata>;

    /// Copy every document from `source` into `dest`. Used for renames;
    /// alias vs. reindex mechanics are the store's business.
    async fn reindex(&self, source: &str, dest: &str) -> Result<()>;

    async fn delete_index(&self, name: &str) -> Result<()>;

    /// Bounded single-page query with offset/size semantics.
    async fn search(
        &self,
        index: &str,
        doc_type: Option<&str>,
        query: &Value,
        from: usize,
        size: usize,
    ) -> Result<StorePage>;

    /// Open a scroll context sized `size` and return the first page.
    async fn open_scroll(
        &self,
        index: &str,
        doc_type: Option<&str>,
        query: &Value,
        size: usize,
    ) -> Result<StorePage>;

    /// Continue an existing scroll. An expired or unknown cursor is
    /// NotFound; callers treat that as "start a new scroll".
    async fn continue_scroll(&self, cursor: &str) -> Result<StorePage>;

    async fn clear_scroll(&self, cursor: &str) -> Result<()>;

    /// Bulk-save documents under `doc_type`, returning how many were stored.
    async fn save_documents(
        &self,
        index: &str,
        doc_type: &str,
        docs: &[Document],
    ) -> Result<usize>;

    async fn count(&self, index: &str) -> Result<u64>;
}
