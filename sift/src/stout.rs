//! Stout aggregation collaborator.
//!
//! The merge subsystem is external; this module owns only the ingest
//! contract and a store-backed status implementation. The endpoint is
//! gated by `[stout] enabled` in configuration.

use crate::store::DocumentStore;
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

#[async_trait]
pub trait StoutIngest: Send + Sync {
    async fn ingest(&self) -> Result<Value>;
}

/// Reports against the stout master answer table in the store.
pub struct StoutTables {
    store: Arc<dyn DocumentStore>,
    index: String,
}

impl StoutTables {
    pub fn new(store: Arc<dyn DocumentStore>, index: impl Into<String>) -> Self {
        Self {
            store,
            index: index.into(),
        }
    }
}

#[async_trait]
impl StoutIngest for StoutTables {
    async fn ingest(&self) -> Result<Value> {
        if !self.store.index_exists(&self.index).await? {
            return Err(Error::NotFound(format!(
                "stout master index '{}' does not exist",
                self.index
            )));
        }
        let documents = self.store.count(&self.index).await?;
        tracing::info!(index = %self.index, documents, "stout ingest");
        Ok(json!({
            "status": "ok",
            "index": self.index,
            "documents": documents,
        }))
    }
}
