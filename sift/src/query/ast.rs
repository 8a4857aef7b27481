use serde::{Deserialize, Serialize};

/// Query abstract syntax tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryNode {
    /// Single term: "auth" or "field:value". `field: None` means free text.
    Term {
        field: Option<String>,
        value: String,
    },

    /// Wildcard pattern: "auth*" or "field:*auth"
    Wildcard {
        field: Option<String>,
        pattern: String,
    },

    /// Inclusive range: "timestamp:[2024-01-01 TO *]". An unbounded
    /// endpoint is `None`.
    Range {
        field: String,
        lower: Option<String>,
        upper: Option<String>,
    },

    /// Boolean AND: a AND b (also the implicit combinator between terms)
    And(Vec<QueryNode>),

    /// Boolean OR: a OR b
    Or(Vec<QueryNode>),

    /// Boolean NOT: NOT a or -a
    Not(Box<QueryNode>),
}

impl QueryNode {
    /// Create a free-text term query
    pub fn term(value: impl Into<String>) -> Self {
        QueryNode::Term {
            field: None,
            value: value.into(),
        }
    }

    /// Create a field:value term query
    pub fn field_term(field: impl Into<String>, value: impl Into<String>) -> Self {
        QueryNode::Term {
            field: Some(field.into()),
            value: value.into(),
        }
    }

    /// Combine with AND
    pub fn and(self, other: QueryNode) -> Self {
        match self {
            QueryNode::And(mut nodes) => {
                nodes.push(other);
                QueryNode::And(nodes)
            }
            _ => QueryNode::And(vec![self, other]),
        }
    }

    /// Combine with OR
    pub fn or(self, other: QueryNode) -> Self {
        match self {
            QueryNode::Or(mut nodes) => {
                nodes.push(other);
                QueryNode::Or(nodes)
            }
            _ => QueryNode::Or(vec![self, other]),
        }
    }

    /// Negate
    pub fn negate(self) -> Self {
        QueryNode::Not(Box::new(self))
    }

    /// Get the query type as a string
    pub fn query_type(&self) -> &'static str {
        match self {
            QueryNode::Term { .. } => "term",
            QueryNode::Wildcard { .. } => "wildcard",
            QueryNode::Range { .. } => "range",
            QueryNode::And(_) => "and",
            QueryNode::Or(_) => "or",
            QueryNode::Not(_) => "not",
        }
    }

    /// Collect every field name referenced by the tree, in preorder.
    /// Free-text leaves reference no field and are skipped.
    pub fn referenced_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            QueryNode::Term { field, .. } | QueryNode::Wildcard { field, .. } => {
                if let Some(f) = field {
                    out.push(f);
                }
            }
            QueryNode::Range { field, .. } => out.push(field),
            QueryNode::And(children) | QueryNode::Or(children) => {
                for child in children {
                    child.referenced_fields(out);
                }
            }
            QueryNode::Not(child) => child.referenced_fields(out),
        }
    }
}
