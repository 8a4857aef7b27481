//! Read-mostly index-metadata cache used by the validator.
//!
//! Entries are refreshed lazily on lookup after the TTL elapses and are
//! invalidated eagerly by index lifecycle operations.

use crate::store::IndexMetadata;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};

pub struct MetadataCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, (IndexMetadata, Instant)>>,
}

impl MetadataCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Fresh entry for `index`, if any.
    pub fn get(&self, index: &str) -> Option<IndexMetadata> {
        let entries = self.entries.read();
        entries.get(index).and_then(|(meta, fetched_at)| {
            if fetched_at.elapsed() < self.ttl {
                Some(meta.clone())
            } else {
                None
            }
        })
    }

    pub fn put(&self, index: &str, metadata: IndexMetadata) {
        self.entries
            .write()
            .insert(index.to_string(), (metadata, Instant::now()));
    }

    pub fn invalidate(&self, index: &str) {
        self.entries.write().remove(index);
    }
}
