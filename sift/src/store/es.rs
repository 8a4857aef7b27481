//! Elasticsearch implementation of the [`DocumentStore`] seam, speaking the
//! REST API over reqwest with the TLS options from [`StoreConfig`].

use super::{Document, DocumentStore, IndexMetadata, StorePage};
use crate::config::{SearchConfig, StoreConfig};
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct EsClient {
    http: reqwest::Client,
    base_url: String,
    scroll_ttl: String,
    auth: Option<(String, String)>,
}

impl EsClient {
    pub fn from_config(store: &StoreConfig, search: &SearchConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();

        if store.use_ssl {
            if !store.verify_certs {
                builder = builder.danger_accept_invalid_certs(true);
            }
            if let Some(ca_path) = &store.ca_certs {
                let pem = std::fs::read(ca_path)?;
                let cert = reqwest::Certificate::from_pem(&pem)
                    .map_err(|e| Error::Config(format!("ca_certs: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            if let (Some(cert_path), Some(key_path)) = (&store.client_cert, &store.client_key) {
                let mut pem = std::fs::read(cert_path)?;
                pem.extend(std::fs::read(key_path)?);
                let identity = reqwest::Identity::from_pem(&pem)
                    .map_err(|e| Error::Config(format!("client cert/key: {e}")))?;
                builder = builder.identity(identity);
            }
        }

        let http = builder
            .build()
            .map_err(|e| Error::Config(format!("http client: {e}")))?;

        let auth = match (&store.username, &store.password) {
            (Some(user), Some(pass)) => Some((user.clone(), pass.clone())),
            _ => None,
        };

        Ok(Self {
            http,
            base_url: store.base_url(),
            scroll_ttl: search.scroll_ttl.clone(),
            auth,
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let req = self.http.request(method, format!("{}{path}", self.base_url));
        match &self.auth {
            Some((user, pass)) => req.basic_auth(user, Some(pass)),
            None => req,
        }
    }

    fn search_path(index: &str, doc_type: Option<&str>) -> String {
        match doc_type {
            Some(t) => format!("/{index}/{t}/_search"),
            None => format!("/{index}/_search"),
        }
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<Value> {
        let resp = req.send().await?;
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(Value::Null);
        if status.is_success() {
            return Ok(body);
        }
        Err(error_from_response(status, &body))
    }

    fn page_from_response(body: &Value) -> Result<StorePage> {
        let hits_obj = body
            .get("hits")
            .ok_or_else(|| Error::Internal("store response missing 'hits'".to_string()))?;
        let total = match hits_obj.get("total") {
            Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
            // Newer store versions report {"value": N, "relation": ...}
            Some(Value::Object(map)) => map.get("value").and_then(Value::as_u64).unwrap_or(0),
            _ => return Err(Error::Internal("store response missing hit total".to_string())),
        };
        let hits = hits_obj
            .get("hits")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|hit| hit.get("_source").and_then(Value::as_object).cloned())
                    .collect()
            })
            .unwrap_or_default();
        let cursor = body
            .get("_scroll_id")
            .and_then(Value::as_str)
            .map(str::to_string);
        Ok(StorePage {
            hits,
            total,
            cursor,
        })
    }
}

/// Facade cursors carry the number of hits already returned ahead of the
/// store's own id ("<seen>:<store id>"). The store keeps echoing a scroll
/// id even on the final partial page, so without the tag a caller could
/// not tell that page from a mid-scroll one.
fn compose_cursor(seen: u64, store_id: &str) -> String {
    format!("{seen}:{store_id}")
}

/// Inverse of [`compose_cursor`]. A bare store id (no tag) yields unknown
/// progress; exhaustion then degrades to empty-page detection.
fn split_cursor(cursor: &str) -> (Option<u64>, &str) {
    match cursor.split_once(':') {
        Some((seen, store_id)) => match seen.parse() {
            Ok(n) => (Some(n), store_id),
            Err(_) => (None, cursor),
        },
        None => (None, cursor),
    }
}

fn error_reason(body: &Value) -> String {
    body.get("error")
        .map(|err| match err {
            Value::String(s) => s.clone(),
            other => other
                .get("reason")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| other.to_string()),
        })
        .unwrap_or_else(|| "no error detail from store".to_string())
}

fn error_type(body: &Value) -> Option<&str> {
    body.get("error")
        .and_then(|err| err.get("type"))
        .and_then(Value::as_str)
}

fn error_from_response(status: reqwest::StatusCode, body: &Value) -> Error {
    let reason = error_reason(body);
    match status.as_u16() {
        404 => Error::NotFound(reason),
        409 => Error::Conflict(reason),
        400 if error_type(body) == Some("resource_already_exists_exception") => {
            Error::Conflict(reason)
        }
        503 => Error::Unavailable(reason),
        _ => Error::Internal(format!("store returned {status}: {reason}")),
    }
}

#[async_trait]
impl DocumentStore for EsClient {
    async fn ping(&self) -> bool {
        match self.request(reqwest::Method::GET, "/").send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    async fn list_indices(&self) -> Result<Vec<String>> {
        let body = self
            .send(self.request(reqwest::Method::GET, "/_cat/indices?format=json"))
            .await?;
        let entries = body
            .as_array()
            .ok_or_else(|| Error::Internal("unexpected index listing shape".to_string()))?;
        Ok(entries
            .iter()
            .filter_map(|e| e.get("index").and_then(Value::as_str))
            .map(str::to_string)
            .collect())
    }

    async fn index_exists(&self, name: &str) -> Result<bool> {
        let resp = self
            .request(reqwest::Method::HEAD, &format!("/{name}"))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    async fn create_index(&self, name: &str) -> Result<()> {
        self.send(self.request(reqwest::Method::PUT, &format!("/{name}")))
            .await?;
        Ok(())
    }

    async fn index_metadata(&self, name: &str) -> Result<IndexMetadata> {
        let body = self
            .send(self.request(reqwest::Method::GET, &format!("/{name}/_mapping")))
            .await?;
        let mappings = body
            .get(name)
            .and_then(|idx| idx.get("mappings"))
            .and_then(Value::as_object)
            .ok_or_else(|| Error::Internal(format!("unexpected mapping shape for '{name}'")))?;

        let mut fields = Vec::new();
        let mut doc_types = Vec::new();
        if let Some(props) = mappings.get("properties").and_then(Value::as_object) {
            // Typeless mapping (newer store versions)
            fields.extend(props.keys().cloned());
        } else {
            for (doc_type, mapping) in mappings {
                doc_types.push(doc_type.clone());
                if let Some(props) = mapping.get("properties").and_then(Value::as_object) {
                    for field in props.keys() {
                        if !fields.contains(field) {
                            fields.push(field.clone());
                        }
                    }
                }
            }
        }
        fields.sort();
        doc_types.sort();
        Ok(IndexMetadata { fields, doc_types })
    }

    async fn reindex(&self, source: &str, dest: &str) -> Result<()> {
        let body = json!({
            "source": { "index": source },
            "dest": { "index": dest }
        });
        self.send(
            self.request(reqwest::Method::POST, "/_reindex?refresh=true")
                .json(&body),
        )
        .await?;
        Ok(())
    }

    async fn delete_index(&self, name: &str) -> Result<()> {
        self.send(self.request(reqwest::Method::DELETE, &format!("/{name}")))
            .await?;
        Ok(())
    }

    async fn search(
        &self,
        index: &str,
        doc_type: Option<&str>,
        query: &Value,
        from: usize,
        size: usize,
    ) -> Result<StorePage> {
        let path = format!(
            "{}?from={from}&size={size}",
            Self::search_path(index, doc_type)
        );
        let body = self
            .send(
                self.request(reqwest::Method::POST, &path)
                    .json(&json!({ "query": query })),
            )
            .await?;
        let mut page = Self::page_from_response(&body)?;
        // Plain searches carry no cursor even if the store echoes one.
        page.cursor = None;
        Ok(page)
    }

    async fn open_scroll(
        &self,
        index: &str,
        doc_type: Option<&str>,
        query: &Value,
        size: usize,
    ) -> Result<StorePage> {
        let path = format!(
            "{}?scroll={}&size={size}",
            Self::search_path(index, doc_type),
            self.scroll_ttl
        );
        let body = self
            .send(
                self.request(reqwest::Method::POST, &path)
                    .json(&json!({ "query": query })),
            )
            .await?;
        let mut page = Self::page_from_response(&body)?;
        if page.hits.len() as u64 >= page.total {
            // Everything fit on the first page; release the context early.
            if let Some(cursor) = page.cursor.take() {
                let _ = self.clear_scroll(&cursor).await;
            }
        } else if let Some(store_id) = page.cursor.take() {
            page.cursor = Some(compose_cursor(page.hits.len() as u64, &store_id));
        }
        Ok(page)
    }

    async fn continue_scroll(&self, cursor: &str) -> Result<StorePage> {
        let (seen, store_id) = split_cursor(cursor);
        let body = self
            .send(
                self.request(reqwest::Method::POST, "/_search/scroll").json(&json!({
                    "scroll": self.scroll_ttl,
                    "scroll_id": store_id,
                })),
            )
            .await?;
        let mut page = Self::page_from_response(&body)?;
        let seen = seen.map(|n| n + page.hits.len() as u64);
        // Exhausted on an empty page, or when this page completes the
        // total; the store itself keeps echoing a scroll id either way.
        let exhausted = page.hits.is_empty() || seen.map_or(false, |n| n >= page.total);
        if exhausted {
            if let Some(store_id) = page.cursor.take() {
                let _ = self.clear_scroll(&store_id).await;
            }
        } else if let Some(store_id) = page.cursor.take() {
            page.cursor = Some(match seen {
                Some(n) => compose_cursor(n, &store_id),
                None => store_id,
            });
        }
        Ok(page)
    }

    async fn clear_scroll(&self, cursor: &str) -> Result<()> {
        let (_, store_id) = split_cursor(cursor);
        self.send(
            self.request(reqwest::Method::DELETE, "/_search/scroll")
                .json(&json!({ "scroll_id": [store_id] })),
        )
        .await?;
        Ok(())
    }

    async fn save_documents(
        &self,
        index: &str,
        doc_type: &str,
        docs: &[Document],
    ) -> Result<usize> {
        if docs.is_empty() {
            return Ok(0);
        }
        let mut payload = String::new();
        for doc in docs {
            let action = json!({ "index": { "_index": index, "_type": doc_type } });
            payload.push_str(&serde_json::to_string(&action)?);
            payload.push('\n');
            payload.push_str(&serde_json::to_string(doc)?);
            payload.push('\n');
        }
        let body = self
            .send(
                self.request(reqwest::Method::POST, "/_bulk?refresh=true")
                    .header("content-type", "application/x-ndjson")
                    .body(payload),
            )
            .await?;
        let saved = body
            .get("items")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter(|item| {
                        item.get("index")
                            .and_then(|op| op.get("error"))
                            .is_none()
                    })
                    .count()
            })
            .unwrap_or(0);
        Ok(saved)
    }

    async fn count(&self, index: &str) -> Result<u64> {
        let body = self
            .send(self.request(reqwest::Method::GET, &format!("/{index}/_count")))
            .await?;
        body.get("count")
            .and_then(Value::as_u64)
            .ok_or_else(|| Error::Internal("unexpected count response shape".to_string()))
    }
}
