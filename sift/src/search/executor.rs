//! Executes a validated [`SearchSpec`] against the document store,
//! managing the scroll-cursor lifecycle.

use crate::query::SearchSpec;
use crate::store::{translate, DocumentStore, StorePage};
use crate::Result;

/// Run one search request. Three paths:
/// - a supplied cursor continues the existing scroll context;
/// - `scroll` without a cursor opens a new context sized to the spec;
/// - otherwise a bounded single-page query with offset/size semantics.
///
/// An expired cursor surfaces as NotFound from the store; callers treat
/// that as "start a new scroll". No retries happen here.
pub async fn execute(store: &dyn DocumentStore, spec: &SearchSpec) -> Result<StorePage> {
    if let Some(cursor) = &spec.scroll_id {
        let mut page = store.continue_scroll(cursor).await?;
        if page.hits.is_empty() {
            // Exhausted; release the context and drop the cursor.
            if let Some(cursor) = page.cursor.take() {
                let _ = store.clear_scroll(&cursor).await;
            }
        }
        return Ok(page);
    }

    let query = translate::query_fragment(spec.query.as_ref());
    if spec.scroll {
        store
            .open_scroll(&spec.index, spec.doc_type.as_deref(), &query, spec.size)
            .await
    } else {
        store
            .search(
                &spec.index,
                spec.doc_type.as_deref(),
                &query,
                spec.from,
                spec.size,
            )
            .await
    }
}
