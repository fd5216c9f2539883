// HTTP API routes
//
// Each submodule handles one resource and exposes `routes(state)`.

pub mod accounts;
pub mod common;
pub mod index;
pub mod users;

// Re-export common types
pub use common::ApiError;
