// Gatehouse storage layer
//
// Implementations of the core store traits:
// - PgUserDirectory / PgSessionStore: PostgreSQL via sqlx
// - FileSessionStore: sessions in a JSON file for single-host deployments
// - StorageBackend: picks PostgreSQL or dev-mode storage at startup

pub mod backend;
pub mod file_store;
pub mod models;
pub mod postgres;
pub mod repositories;

pub use backend::StorageBackend;
pub use file_store::{FileSessionStore, DEFAULT_SESSION_FILE};
pub use models::*;
pub use postgres::{PgSessionStore, PgUserDirectory};
pub use repositories::Database;
