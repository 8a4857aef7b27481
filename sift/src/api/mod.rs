//! HTTP surface of the facade.

pub mod error;
pub mod routes;
pub mod server;

pub use routes::AppState;
pub use server::ApiServer;
