// PostgreSQL implementations of the core store traits
//
// Note: every query reads the table directly, so `reload` has nothing to
// refresh. Failures map into AuthError::StoreUnavailable through anyhow.

use async_trait::async_trait;
use gatehouse_core::{
    Principal, Result, SessionBackend, SessionFilter, SessionRecord, UserDirectory, UserFilter,
};
use uuid::Uuid;

use crate::repositories::Database;

// ============================================================================
// PgUserDirectory - Principals in the users table
// ============================================================================

#[derive(Clone)]
pub struct PgUserDirectory {
    db: Database,
}

impl PgUserDirectory {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn search(&self, filter: &UserFilter) -> Result<Vec<Principal>> {
        let rows = self.db.search_users(filter).await?;
        Ok(rows.into_iter().map(Principal::from).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Principal>> {
        Ok(self.db.get_user(id).await?.map(Principal::from))
    }

    async fn save(&self, principal: &Principal) -> Result<()> {
        self.db.upsert_user(principal).await?;
        Ok(())
    }

    async fn remove(&self, id: Uuid) -> Result<bool> {
        Ok(self.db.delete_user(id).await?)
    }

    async fn count(&self) -> Result<u64> {
        let count = self.db.count_users().await?;
        Ok(count.max(0) as u64)
    }

    async fn insert_if_email_free(&self, principal: &Principal) -> Result<bool> {
        Ok(self.db.insert_user_if_email_free(principal).await?)
    }
}

// ============================================================================
// PgSessionStore - Sessions in the user_sessions table
// ============================================================================

#[derive(Clone)]
pub struct PgSessionStore {
    db: Database,
}

impl PgSessionStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionBackend for PgSessionStore {
    async fn reload(&self) -> Result<()> {
        Ok(())
    }

    async fn search(&self, filter: &SessionFilter) -> Result<Vec<SessionRecord>> {
        let rows = self.db.search_sessions(filter).await?;
        Ok(rows.into_iter().map(SessionRecord::from).collect())
    }

    async fn save(&self, record: &SessionRecord) -> Result<()> {
        self.db.upsert_session(record).await?;
        Ok(())
    }

    async fn remove(&self, session_id: &str) -> Result<bool> {
        Ok(self.db.delete_session(session_id).await?)
    }
}
