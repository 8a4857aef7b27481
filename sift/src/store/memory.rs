//! In-memory [`DocumentStore`] used by unit tests. Evaluates the same
//! query-DSL fragments the translator emits, so pipeline tests run against
//! real query semantics without a live store.

use super::{Document, DocumentStore, IndexMetadata, StorePage};
use crate::{Error, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Default)]
pub(crate) struct MemoryStore {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    indices: BTreeMap<String, MemIndex>,
    scrolls: HashMap<String, ScrollCtx>,
    next_scroll: u64,
}

#[derive(Default)]
struct MemIndex {
    docs: Vec<(Option<String>, Document)>,
}

struct ScrollCtx {
    hits: Vec<Document>,
    pos: usize,
    size: usize,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_docs(&self, index: &str, doc_type: Option<&str>, docs: Vec<Document>) {
        let mut state = self.state.lock();
        let entry = state.indices.entry(index.to_string()).or_default();
        for doc in docs {
            entry.docs.push((doc_type.map(str::to_string), doc));
        }
    }

    fn matching(&self, index: &str, doc_type: Option<&str>, query: &Value) -> Result<Vec<Document>> {
        let state = self.state.lock();
        let entry = state
            .indices
            .get(index)
            .ok_or_else(|| Error::NotFound(format!("index '{index}' does not exist")))?;
        Ok(entry
            .docs
            .iter()
            .filter(|(t, _)| match (doc_type, t) {
                (Some(want), Some(have)) => want == have,
                (Some(_), None) => false,
                (None, _) => true,
            })
            .filter(|(_, doc)| matches(doc, query))
            .map(|(_, doc)| doc.clone())
            .collect())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ping(&self) -> bool {
        true
    }

    async fn list_indices(&self) -> Result<Vec<String>> {
        Ok(self.state.lock().indices.keys().cloned().collect())
    }

    async fn index_exists(&self, name: &str) -> Result<bool> {
        Ok(self.state.lock().indices.contains_key(name))
    }

    async fn create_index(&self, name: &str) -> Result<()> {
        let mut state = self.state.lock();
        if state.indices.contains_key(name) {
            return Err(Error::Conflict(format!("index '{name}' already exists")));
        }
        state.indices.insert(name.to_string(), MemIndex::default());
        Ok(())
    }

    async fn index_metadata(&self, name: &str) -> Result<IndexMetadata> {
        let state = self.state.lock();
        let entry = state
            .indices
            .get(name)
            .ok_or_else(|| Error::NotFound(format!("index '{name}' does not exist")))?;
        let mut fields = BTreeSet::new();
        let mut doc_types = BTreeSet::new();
        for (doc_type, doc) in &entry.docs {
            if let Some(t) = doc_type {
                doc_types.insert(t.clone());
            }
            for key in doc.keys() {
                fields.insert(key.clone());
            }
        }
        Ok(IndexMetadata {
            fields: fields.into_iter().collect(),
            doc_types: doc_types.into_iter().collect(),
        })
    }

    async fn reindex(&self, source: &str, dest: &str) -> Result<()> {
        let mut state = self.state.lock();
        let docs = state
            .indices
            .get(source)
            .ok_or_else(|| Error::NotFound(format!("index '{source}' does not exist")))?
            .docs
            .clone();
        state.indices.entry(dest.to_string()).or_default().docs.extend(docs);
        Ok(())
    }

    async fn delete_index(&self, name: &str) -> Result<()> {
        let mut state = self.state.lock();
        state
            .indices
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("index '{name}' does not exist")))
    }

    async fn search(
        &self,
        index: &str,
        doc_type: Option<&str>,
        query: &Value,
        from: usize,
        size: usize,
    ) -> Result<StorePage> {
        let all = self.matching(index, doc_type, query)?;
        let total = all.len() as u64;
        let hits = all.into_iter().skip(from).take(size).collect();
        Ok(StorePage {
            hits,
            total,
            cursor: None,
        })
    }

    async fn open_scroll(
        &self,
        index: &str,
        doc_type: Option<&str>,
        query: &Value,
        size: usize,
    ) -> Result<StorePage> {
        let all = self.matching(index, doc_type, query)?;
        let total = all.len() as u64;
        let hits: Vec<Document> = all.iter().take(size).cloned().collect();

        let mut state = self.state.lock();
        let cursor = if all.len() > size {
            state.next_scroll += 1;
            let id = format!("scroll-{}", state.next_scroll);
            state.scrolls.insert(
                id.clone(),
                ScrollCtx {
                    hits: all,
                    pos: size,
                    size,
                },
            );
            Some(id)
        } else {
            None
        };

        Ok(StorePage {
            hits,
            total,
            cursor,
        })
    }

    async fn continue_scroll(&self, cursor: &str) -> Result<StorePage> {
        let mut state = self.state.lock();
        let ctx = state
            .scrolls
            .get_mut(cursor)
            .ok_or_else(|| Error::NotFound(format!("scroll cursor '{cursor}' is expired or unknown")))?;

        let hits: Vec<Document> = ctx.hits.iter().skip(ctx.pos).take(ctx.size).cloned().collect();
        ctx.pos += hits.len();
        let total = ctx.hits.len() as u64;
        let exhausted = ctx.pos >= ctx.hits.len();
        if exhausted {
            state.scrolls.remove(cursor);
        }

        Ok(StorePage {
            hits,
            total,
            cursor: if exhausted {
                None
            } else {
                Some(cursor.to_string())
            },
        })
    }

    async fn clear_scroll(&self, cursor: &str) -> Result<()> {
        self.state.lock().scrolls.remove(cursor);
        Ok(())
    }

    async fn save_documents(
        &self,
        index: &str,
        doc_type: &str,
        docs: &[Document],
    ) -> Result<usize> {
        let mut state = self.state.lock();
        let entry = state.indices.entry(index.to_string()).or_default();
        for doc in docs {
            entry.docs.push((Some(doc_type.to_string()), doc.clone()));
        }
        Ok(docs.len())
    }

    async fn count(&self, index: &str) -> Result<u64> {
        let state = self.state.lock();
        state
            .indices
            .get(index)
            .map(|entry| entry.docs.len() as u64)
            .ok_or_else(|| Error::NotFound(format!("index '{index}' does not exist")))
    }
}

/// Evaluate a translated query fragment against one document.
fn matches(doc: &Document, query: &Value) -> bool {
    if query.get("match_all").is_some() {
        return true;
    }
    if let Some(clause) = query.get("match").and_then(Value::as_object) {
        return clause.iter().all(|(field, want)| {
            doc.get(field)
                .map(|have| stringify(have) == stringify(want))
                .unwrap_or(false)
        });
    }
    if let Some(qs) = query
        .get("query_string")
        .and_then(|v| v.get("query"))
        .and_then(Value::as_str)
    {
        return doc.values().any(|v| {
            let text = stringify(v).to_lowercase();
            if qs.contains('*') {
                wildcard_match(&qs.to_lowercase(), &text)
            } else {
                text.contains(&qs.to_lowercase())
            }
        });
    }
    if let Some(clause) = query.get("wildcard").and_then(Value::as_object) {
        return clause.iter().all(|(field, pattern)| {
            doc.get(field)
                .map(|have| wildcard_match(&stringify(pattern), &stringify(have)))
                .unwrap_or(false)
        });
    }
    if let Some(clause) = query.get("range").and_then(Value::as_object) {
        return clause.iter().all(|(field, bounds)| {
            let Some(have) = doc.get(field) else {
                return false;
            };
            in_range(have, bounds)
        });
    }
    if let Some(clause) = query.get("bool") {
        let must = clause
            .get("must")
            .and_then(Value::as_array)
            .map(|qs| qs.iter().all(|q| matches(doc, q)))
            .unwrap_or(true);
        let should = clause
            .get("should")
            .and_then(Value::as_array)
            .map(|qs| qs.is_empty() || qs.iter().any(|q| matches(doc, q)))
            .unwrap_or(true);
        let must_not = clause
            .get("must_not")
            .and_then(Value::as_array)
            .map(|qs| qs.iter().all(|q| !matches(doc, q)))
            .unwrap_or(true);
        return must && should && must_not;
    }
    false
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn in_range(value: &Value, bounds: &Value) -> bool {
    let gte = bounds.get("gte").map(stringify);
    let lte = bounds.get("lte").map(stringify);
    let have = stringify(value);

    // Numeric comparison when everything parses; lexicographic otherwise.
    if let Ok(have_num) = have.parse::<f64>() {
        let gte_num = gte.as_deref().map(str::parse::<f64>);
        let lte_num = lte.as_deref().map(str::parse::<f64>);
        if !matches!(gte_num, Some(Err(_))) && !matches!(lte_num, Some(Err(_))) {
            let lower_ok = gte_num.map_or(true, |b| b.map_or(true, |b| have_num >= b));
            let upper_ok = lte_num.map_or(true, |b| b.map_or(true, |b| have_num <= b));
            return lower_ok && upper_ok;
        }
    }
    let lower_ok = gte.map_or(true, |b| have.as_str() >= b.as_str());
    let upper_ok = lte.map_or(true, |b| have.as_str() <= b.as_str());
    lower_ok && upper_ok
}

/// '*' matches any run of characters; anchored at both ends.
fn wildcard_match(pattern: &str, text: &str) -> bool {
    let segments: Vec<&str> = pattern.split('*').collect();
    if segments.len() == 1 {
        return pattern == text;
    }
    let mut rest = text;
    for (i, segment) in segments.iter().enumerate() {
        if segment.is_empty() {
            continue;
        }
        if i == 0 {
            match rest.strip_prefix(segment) {
                Some(r) => rest = r,
                None => return false,
            }
        } else if i == segments.len() - 1 {
            return rest.ends_with(segment);
        } else {
            match rest.find(segment) {
                Some(at) => rest = &rest[at + segment.len()..],
                None => return false,
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_match_is_equality() {
        let d = doc(json!({"session_id": "A1234"}));
        assert!(matches(&d, &json!({"match": {"session_id": "A1234"}})));
        assert!(!matches(&d, &json!({"match": {"session_id": "A12"}})));
    }

    #[test]
    fn test_wildcard_shapes() {
        assert!(wildcard_match("sign*", "signup"));
        assert!(wildcard_match("*up", "signup"));
        assert!(wildcard_match("s*p", "signup"));
        assert!(!wildcard_match("sign*", "login"));
    }

    #[test]
    fn test_range_numeric() {
        let d = doc(json!({"ts": 7}));
        assert!(matches(&d, &json!({"range": {"ts": {"gte": "5", "lte": "9"}}})));
        assert!(!matches(&d, &json!({"range": {"ts": {"gte": "8"}}})));
    }

    #[test]
    fn test_bool_combinators() {
        let d = doc(json!({"a": "1", "b": "2"}));
        let q = json!({"bool": {
            "must": [{"match": {"a": "1"}}],
            "must_not": [{"match": {"b": "3"}}]
        }});
        assert!(matches(&d, &q));
    }
}
