//! Recursive-descent parser for the Lucene-like query grammar.
//!
//! Grammar accepted, loosest-binding first:
//!   query   := and (OR and)*
//!   and     := unary ((AND)? unary)*     -- adjacency is an implicit AND
//!   unary   := (NOT | '-') unary | primary
//!   primary := '(' query ')' | field ':' value | term
//!   value   := term | quoted | '[' endpoint TO endpoint ']'
//!
//! Values containing '*' become wildcard nodes. Parsing only enforces
//! well-formedness; field existence is the validator's business.

mod tokenizer;

pub use tokenizer::{tokenize, Token};

use crate::query::ast::QueryNode;
use crate::{Error, Result};

/// Parse a `q` parameter value into an AST. Pure function of the input;
/// the match-all forms (absent `q`, `*:*`) are handled by the caller.
pub fn parse(input: &str) -> Result<QueryNode> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::Parse("empty query".to_string()));
    }

    let (rest, tokens) = tokenize(trimmed)
        .map_err(|_| Error::Parse(format!("unrecognized query syntax in '{trimmed}'")))?;
    if !rest.is_empty() {
        return Err(Error::Parse(describe_leftover(rest)));
    }

    let mut parser = Parser { tokens, pos: 0 };
    let node = parser.parse_or()?;
    match parser.peek() {
        None => Ok(node),
        Some(Token::RParen) => Err(Error::Parse(
            "unbalanced parentheses: unexpected ')'".to_string(),
        )),
        Some(other) => Err(Error::Parse(format!("unexpected token {other:?}"))),
    }
}

/// The tokenizer stops at the first character it cannot consume; what it
/// left behind identifies the grammar violation.
fn describe_leftover(rest: &str) -> String {
    if rest.starts_with('[') {
        "unterminated range bracket".to_string()
    } else if rest.starts_with('"') {
        "unterminated quoted string".to_string()
    } else if rest.starts_with(':') {
        "empty field name before ':'".to_string()
    } else {
        format!("unexpected input near '{rest}'")
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn parse_or(&mut self) -> Result<QueryNode> {
        let mut nodes = vec![self.parse_and()?];
        while matches!(self.peek(), Some(Token::Or)) {
            self.pos += 1;
            if self.peek().is_none() {
                return Err(Error::Parse(
                    "operator 'OR' with no right operand".to_string(),
                ));
            }
            nodes.push(self.parse_and()?);
        }
        Ok(collapse(nodes, QueryNode::Or))
    }

    fn parse_and(&mut self) -> Result<QueryNode> {
        let mut nodes = vec![self.parse_unary()?];
        loop {
            match self.peek() {
                Some(Token::And) => {
                    self.pos += 1;
                    if self.peek().is_none() {
                        return Err(Error::Parse(
                            "operator 'AND' with no right operand".to_string(),
                        ));
                    }
                    nodes.push(self.parse_unary()?);
                }
                // Adjacent operands: implicit AND, left-associative.
                Some(
                    Token::Term(_)
                    | Token::Quoted(_)
                    | Token::Field(_)
                    | Token::Range { .. }
                    | Token::Not
                    | Token::Minus
                    | Token::LParen,
                ) => {
                    nodes.push(self.parse_unary()?);
                }
                _ => break,
            }
        }
        Ok(collapse(nodes, QueryNode::And))
    }

    fn parse_unary(&mut self) -> Result<QueryNode> {
        if matches!(self.peek(), Some(Token::Not | Token::Minus)) {
            self.pos += 1;
            if self.peek().is_none() {
                return Err(Error::Parse("operator 'NOT' with no operand".to_string()));
            }
            return Ok(self.parse_unary()?.negate());
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<QueryNode> {
        match self.next() {
            None => Err(Error::Parse(
                "expected a term but found end of query".to_string(),
            )),
            Some(Token::LParen) => {
                let node = self.parse_or()?;
                match self.next() {
                    Some(Token::RParen) => Ok(node),
                    _ => Err(Error::Parse(
                        "unbalanced parentheses: missing ')'".to_string(),
                    )),
                }
            }
            Some(Token::RParen) => Err(Error::Parse(
                "unbalanced parentheses: unexpected ')'".to_string(),
            )),
            Some(Token::And) => Err(Error::Parse(
                "operator 'AND' with no left operand".to_string(),
            )),
            Some(Token::Or) => Err(Error::Parse(
                "operator 'OR' with no left operand".to_string(),
            )),
            Some(Token::Term(value)) => Ok(leaf(None, value)),
            Some(Token::Quoted(value)) => Ok(QueryNode::Term { field: None, value }),
            Some(Token::Range { .. }) => Err(Error::Parse(
                "range requires a field, e.g. field:[lower TO upper]".to_string(),
            )),
            Some(Token::Field(field)) => match self.next() {
                Some(Token::Term(value)) => Ok(leaf(Some(field), value)),
                Some(Token::Quoted(value)) => Ok(QueryNode::Term {
                    field: Some(field),
                    value,
                }),
                Some(Token::Range { lower, upper }) => Ok(QueryNode::Range {
                    field,
                    lower: bound(lower),
                    upper: bound(upper),
                }),
                _ => Err(Error::Parse(format!("missing value for field '{field}'"))),
            },
            // NOT/Minus are consumed by parse_unary before we get here.
            Some(Token::Not | Token::Minus) => {
                Err(Error::Parse("operator 'NOT' with no operand".to_string()))
            }
        }
    }
}

fn collapse(mut nodes: Vec<QueryNode>, combine: fn(Vec<QueryNode>) -> QueryNode) -> QueryNode {
    if nodes.len() == 1 {
        nodes.remove(0)
    } else {
        combine(nodes)
    }
}

fn leaf(field: Option<String>, value: String) -> QueryNode {
    if value.contains('*') {
        QueryNode::Wildcard {
            field,
            pattern: value,
        }
    } else {
        QueryNode::Term { field, value }
    }
}

/// A '*' endpoint means the range is unbounded on that side.
fn bound(endpoint: String) -> Option<String> {
    if endpoint == "*" {
        None
    } else {
        Some(endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_term() {
        let ast = parse("auth").unwrap();
        assert_eq!(ast, QueryNode::term("auth"));
    }

    #[test]
    fn test_parse_field_term() {
        let ast = parse("type:error").unwrap();
        assert_eq!(ast, QueryNode::field_term("type", "error"));
    }

    #[test]
    fn test_parse_quoted_field_value() {
        let ast = parse("msg:\"login failed\"").unwrap();
        assert_eq!(ast, QueryNode::field_term("msg", "login failed"));
    }

    #[test]
    fn test_empty_query() {
        assert!(parse("").is_err());
        assert!(parse("   ").is_err());
    }

    #[test]
    fn test_parse_and_operator() {
        let ast = parse("error AND warning").unwrap();
        match ast {
            QueryNode::And(children) => assert_eq!(children.len(), 2),
            _ => panic!("Expected And node, got {:?}", ast),
        }
    }

    #[test]
    fn test_implicit_and_between_terms() {
        let ast = parse("error warning critical").unwrap();
        match ast {
            QueryNode::And(children) => {
                assert_eq!(children.len(), 3);
                assert_eq!(children[0], QueryNode::term("error"));
            }
            _ => panic!("Expected And node, got {:?}", ast),
        }
    }

    #[test]
    fn test_parse_or_operator() {
        let ast = parse("error OR warning").unwrap();
        match ast {
            QueryNode::Or(children) => assert_eq!(children.len(), 2),
            _ => panic!("Expected Or node, got {:?}", ast),
        }
    }

    #[test]
    fn test_or_binds_looser_than_and() {
        // a b OR c == (a AND b) OR c
        let ast = parse("a b OR c").unwrap();
        match ast {
            QueryNode::Or(children) => {
                assert_eq!(children.len(), 2);
                match &children[0] {
                    QueryNode::And(inner) => assert_eq!(inner.len(), 2),
                    other => panic!("Expected And as first child, got {:?}", other),
                }
            }
            _ => panic!("Expected Or node, got {:?}", ast),
        }
    }

    #[test]
    fn test_parse_not_operator() {
        let ast = parse("NOT error").unwrap();
        assert_eq!(ast, QueryNode::term("error").negate());
    }

    #[test]
    fn test_minus_prefix_negation() {
        let ast = parse("error -status:resolved").unwrap();
        match ast {
            QueryNode::And(children) => {
                assert_eq!(children[1], QueryNode::field_term("status", "resolved").negate());
            }
            _ => panic!("Expected And node, got {:?}", ast),
        }
    }

    #[test]
    fn test_parse_parentheses() {
        let ast = parse("(error OR warning) AND critical").unwrap();
        match ast {
            QueryNode::And(children) => {
                assert_eq!(children.len(), 2);
                match &children[0] {
                    QueryNode::Or(or_children) => assert_eq!(or_children.len(), 2),
                    _ => panic!("Expected Or as first child"),
                }
            }
            _ => panic!("Expected And node, got {:?}", ast),
        }
    }

    #[test]
    fn test_parse_range() {
        let ast = parse("ts:[2024-01-01 TO 2024-02-01]").unwrap();
        assert_eq!(
            ast,
            QueryNode::Range {
                field: "ts".to_string(),
                lower: Some("2024-01-01".to_string()),
                upper: Some("2024-02-01".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_open_ended_range() {
        let ast = parse("ts:[2024-01-01 TO *]").unwrap();
        assert_eq!(
            ast,
            QueryNode::Range {
                field: "ts".to_string(),
                lower: Some("2024-01-01".to_string()),
                upper: None,
            }
        );
    }

    #[test]
    fn test_parse_wildcards() {
        let ast = parse("auth*").unwrap();
        assert_eq!(
            ast,
            QueryNode::Wildcard {
                field: None,
                pattern: "auth*".to_string()
            }
        );

        let ast = parse("elem:*signup").unwrap();
        assert_eq!(
            ast,
            QueryNode::Wildcard {
                field: Some("elem".to_string()),
                pattern: "*signup".to_string()
            }
        );
    }

    #[test]
    fn test_parse_complex_query() {
        let ast = parse("(type:error OR type:warning) AND NOT status:resolved").unwrap();
        match ast {
            QueryNode::And(children) => assert_eq!(children.len(), 2),
            _ => panic!("Expected And node, got {:?}", ast),
        }
    }

    #[test]
    fn test_parse_is_deterministic() {
        let q = "(type:error OR msg:\"a b\") AND ts:[1 TO 9] -debug*";
        let first = parse(q).unwrap();
        for _ in 0..4 {
            assert_eq!(parse(q).unwrap(), first);
        }
    }

    #[test]
    fn test_unbalanced_parens() {
        let err = parse("(a OR b").unwrap_err();
        assert!(err.to_string().contains("parentheses"), "{err}");
        let err = parse("a OR b)").unwrap_err();
        assert!(err.to_string().contains("parentheses"), "{err}");
    }

    #[test]
    fn test_unterminated_range() {
        let err = parse("ts:[2024 TO").unwrap_err();
        assert!(err.to_string().contains("range"), "{err}");
    }

    #[test]
    fn test_empty_field_name() {
        let err = parse(":value").unwrap_err();
        assert!(err.to_string().contains("field"), "{err}");
    }

    #[test]
    fn test_dangling_operators() {
        assert!(parse("AND foo").is_err());
        assert!(parse("foo AND").is_err());
        assert!(parse("foo OR").is_err());
        assert!(parse("NOT").is_err());
    }

    #[test]
    fn test_missing_field_value() {
        let err = parse("session_id:").unwrap_err();
        assert!(err.to_string().contains("session_id"), "{err}");
    }
}
