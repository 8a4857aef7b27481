//! Search execution and result assembly.

pub mod executor;
pub mod response;

pub use executor::execute;
pub use response::{assemble, SearchResponse};
