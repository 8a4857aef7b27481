//! Index lifecycle: create, read, update (rename), delete.
//!
//! The manager owns the store handle and the metadata cache; every CRUD
//! operation that changes an index invalidates its cache entry.

use crate::cache::MetadataCache;
use crate::store::{DocumentStore, IndexMetadata};
use crate::{Error, Result};
use std::sync::Arc;
use std::time::Duration;

pub struct IndexManager {
    store: Arc<dyn DocumentStore>,
    cache: MetadataCache,
}

impl IndexManager {
    pub fn new(store: Arc<dyn DocumentStore>, metadata_ttl: Duration) -> Self {
        Self {
            store,
            cache: MetadataCache::new(metadata_ttl),
        }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Provision a new index with the store's default mapping.
    pub async fn create(&self, name: &str) -> Result<()> {
        if self.store.index_exists(name).await? {
            return Err(Error::Conflict(format!("index '{name}' already exists")));
        }
        self.store.create_index(name).await?;
        self.cache.invalidate(name);
        tracing::info!(index = %name, "index created");
        Ok(())
    }

    /// Field names and document types for `name`.
    pub async fn read(&self, name: &str) -> Result<IndexMetadata> {
        let metadata = self.store.index_metadata(name).await?;
        self.cache.put(name, metadata.clone());
        Ok(metadata)
    }

    /// Rename `name` to `new_name` by copying documents and removing the
    /// source. How the store realizes the copy is its own business.
    pub async fn update(&self, name: &str, new_name: &str) -> Result<()> {
        if !self.store.index_exists(name).await? {
            return Err(Error::NotFound(format!("index '{name}' does not exist")));
        }
        if self.store.index_exists(new_name).await? {
            return Err(Error::Conflict(format!(
                "target index '{new_name}' already exists"
            )));
        }
        self.store.reindex(name, new_name).await?;
        self.store.delete_index(name).await?;
        self.cache.invalidate(name);
        self.cache.invalidate(new_name);
        tracing::info!(from = %name, to = %new_name, "index renamed");
        Ok(())
    }

    /// Irreversibly remove the index and all its documents.
    pub async fn delete(&self, name: &str) -> Result<()> {
        if !self.store.index_exists(name).await? {
            return Err(Error::NotFound(format!("index '{name}' does not exist")));
        }
        self.store.delete_index(name).await?;
        self.cache.invalidate(name);
        tracing::info!(index = %name, "index deleted");
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<String>> {
        self.store.list_indices().await
    }

    /// Metadata for the validator: cache hit, else a store fetch. Any
    /// fetch failure degrades to permissive validation rather than
    /// failing the request.
    pub async fn metadata_for_search(&self, name: &str) -> Option<IndexMetadata> {
        if let Some(metadata) = self.cache.get(name) {
            return Some(metadata);
        }
        match self.store.index_metadata(name).await {
            Ok(metadata) => {
                self.cache.put(name, metadata.clone());
                Some(metadata)
            }
            Err(e) => {
                tracing::warn!(index = %name, error = %e, "metadata unavailable, validating permissively");
                None
            }
        }
    }
}
