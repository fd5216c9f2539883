//! Durable session store contract.
//!
//! A `SessionBackend` keeps [`SessionRecord`]s somewhere that outlives the
//! process (a JSON file, a database table). The persisted strategy calls
//! [`SessionBackend::reload`] before every lookup so sessions written by
//! other workers sharing the store are visible.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(session_id: impl Into<String>, user_id: Uuid, created_at: DateTime<Utc>) -> Self {
        Self {
            session_id: session_id.into(),
            user_id,
            created_at,
        }
    }
}

/// Field filter for session searches; every set field must match
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionFilter {
    pub session_id: Option<String>,
    pub user_id: Option<Uuid>,
}

impl SessionFilter {
    pub fn session_id(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            user_id: None,
        }
    }

    pub fn user_id(user_id: Uuid) -> Self {
        Self {
            session_id: None,
            user_id: Some(user_id),
        }
    }

    pub fn matches(&self, record: &SessionRecord) -> bool {
        self.session_id
            .as_deref()
            .map_or(true, |id| record.session_id == id)
            && self.user_id.map_or(true, |id| record.user_id == id)
    }
}

#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Re-read the authoritative collection
    async fn reload(&self) -> Result<()>;

    /// Records matching the filter
    async fn search(&self, filter: &SessionFilter) -> Result<Vec<SessionRecord>>;

    /// Insert or replace by session id
    async fn save(&self, record: &SessionRecord) -> Result<()>;

    /// Delete by session id, returns whether a record was removed
    async fn remove(&self, session_id: &str) -> Result<bool>;
}
