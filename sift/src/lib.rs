//! Sift translates RESTful requests into Elasticsearch index-management
//! operations and a Lucene-like query grammar into validated, executable
//! search requests with scroll/pagination semantics.
//!
//! The request pipeline:
//!
//! ```text
//! raw params -> query::parser -> query::validate -> search::executor -> search::response
//! ```
//!
//! All store traffic goes through the [`store::DocumentStore`] seam,
//! constructed once at process start and injected into each component.

pub mod api;
pub mod cache;
pub mod config;
pub mod denoise;
mod error;
pub mod lifecycle;
pub mod query;
pub mod search;
pub mod stout;
pub mod store;

pub use error::{Error, Result};
