//! Query grammar, request parameters, and validation.
//!
//! The pipeline is: raw parameters ([`params`]) -> AST ([`parser`], [`ast`])
//! -> validated [`validate::SearchSpec`] ready for execution.

pub mod ast;
pub mod params;
pub mod parser;
pub mod validate;

pub use ast::QueryNode;
pub use params::{DenoiseParams, RenameParams, SearchParams};
pub use validate::{SearchLimits, SearchSpec};
