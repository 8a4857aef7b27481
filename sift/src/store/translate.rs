//! Maps the query AST onto the store's native query DSL.
//!
//! One exhaustive match over the closed node set; boolean nesting mirrors
//! the AST one-to-one, so a new node kind fails to compile until it is
//! handled here.

use crate::query::ast::QueryNode;
use serde_json::{json, Value};

/// Full request body for a search call.
pub fn search_body(query: Option<&QueryNode>) -> Value {
    json!({ "query": query_fragment(query) })
}

/// `None` is the match-all query.
pub fn query_fragment(query: Option<&QueryNode>) -> Value {
    match query {
        None => json!({ "match_all": {} }),
        Some(node) => node_fragment(node),
    }
}

fn node_fragment(node: &QueryNode) -> Value {
    match node {
        QueryNode::Term {
            field: Some(field),
            value,
        } => json!({ "match": { field: value } }),
        QueryNode::Term { field: None, value } => {
            json!({ "query_string": { "query": value } })
        }
        QueryNode::Wildcard {
            field: Some(field),
            pattern,
        } => json!({ "wildcard": { field: pattern } }),
        QueryNode::Wildcard {
            field: None,
            pattern,
        } => json!({ "query_string": { "query": pattern } }),
        QueryNode::Range {
            field,
            lower,
            upper,
        } => {
            let mut bounds = serde_json::Map::new();
            if let Some(lower) = lower {
                bounds.insert("gte".to_string(), json!(lower));
            }
            if let Some(upper) = upper {
                bounds.insert("lte".to_string(), json!(upper));
            }
            json!({ "range": { field: bounds } })
        }
        QueryNode::And(children) => {
            let clauses: Vec<Value> = children.iter().map(node_fragment).collect();
            json!({ "bool": { "must": clauses } })
        }
        QueryNode::Or(children) => {
            let clauses: Vec<Value> = children.iter().map(node_fragment).collect();
            json!({ "bool": { "should": clauses, "minimum_should_match": 1 } })
        }
        QueryNode::Not(child) => {
            json!({ "bool": { "must_not": [node_fragment(child)] } })
        }
    }
}
