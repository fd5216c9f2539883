// Storage backend selection
// Decision: Use enum dispatch between PostgreSQL and in-memory/file storage
//
// PostgreSQL (production) keeps principals and durable sessions in tables.
// Dev mode keeps principals in memory and durable sessions in a JSON file.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use gatehouse_core::memory::InMemoryUserDirectory;
use gatehouse_core::{SessionBackend, UserDirectory};
use sqlx::PgPool;

use crate::file_store::FileSessionStore;
use crate::postgres::{PgSessionStore, PgUserDirectory};
use crate::repositories::Database;

/// Storage backend that can be either PostgreSQL or in-memory
#[derive(Clone)]
pub enum StorageBackend {
    /// PostgreSQL database (production)
    Postgres(Database),
    /// In-memory directory (dev mode)
    InMemory(Arc<InMemoryUserDirectory>),
}

impl StorageBackend {
    /// Connect to PostgreSQL and apply migrations
    pub async fn postgres(database_url: &str) -> Result<Self> {
        let db = Database::from_url(database_url).await?;
        db.run_migrations().await?;
        Ok(Self::Postgres(db))
    }

    pub fn in_memory() -> Self {
        Self::InMemory(Arc::new(InMemoryUserDirectory::new()))
    }

    /// Check if this is dev mode (in-memory)
    pub fn is_dev_mode(&self) -> bool {
        matches!(self, Self::InMemory(_))
    }

    /// Get the PostgreSQL pool if using PostgreSQL backend
    pub fn pool(&self) -> Option<&PgPool> {
        match self {
            Self::Postgres(db) => Some(db.pool()),
            Self::InMemory(_) => None,
        }
    }

    pub fn user_directory(&self) -> Arc<dyn UserDirectory> {
        match self {
            Self::Postgres(db) => Arc::new(PgUserDirectory::new(db.clone())),
            Self::InMemory(directory) => directory.clone(),
        }
    }

    /// Durable session store: the sessions table, or the JSON file at `session_file`
    pub async fn session_backend(&self, session_file: &Path) -> Result<Arc<dyn SessionBackend>> {
        match self {
            Self::Postgres(db) => Ok(Arc::new(PgSessionStore::new(db.clone()))),
            Self::InMemory(_) => Ok(Arc::new(FileSessionStore::open(session_file).await?)),
        }
    }
}
