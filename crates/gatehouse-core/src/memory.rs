// In-memory collaborators for dev mode and tests
// Decision: Use parking_lot for thread-safe access
// Decision: Search results are ordered by id (v7, so creation order)
//
// Both types mirror the async store traits so the control plane can run
// without a database or a session file.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::directory::{UserDirectory, UserFilter};
use crate::error::Result;
use crate::principal::Principal;
use crate::session::{SessionBackend, SessionFilter, SessionRecord};

// ============================================
// Users
// ============================================

/// Principals held in a map; lost on restart
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<Uuid, Principal>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn search(&self, filter: &UserFilter) -> Result<Vec<Principal>> {
        let mut found: Vec<Principal> = self
            .users
            .read()
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        found.sort_by_key(|p| p.id);
        Ok(found)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Principal>> {
        Ok(self.users.read().get(&id).cloned())
    }

    async fn save(&self, principal: &Principal) -> Result<()> {
        self.users.write().insert(principal.id, principal.clone());
        Ok(())
    }

    async fn remove(&self, id: Uuid) -> Result<bool> {
        Ok(self.users.write().remove(&id).is_some())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.users.read().len() as u64)
    }

    async fn insert_if_email_free(&self, principal: &Principal) -> Result<bool> {
        let mut users = self.users.write();
        if users.values().any(|p| p.email == principal.email) {
            return Ok(false);
        }
        users.insert(principal.id, principal.clone());
        Ok(true)
    }
}

// ============================================
// Sessions
// ============================================

/// Session store with nothing behind it; `reload` is a no-op
#[derive(Debug, Default)]
pub struct InMemorySessionBackend {
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl InMemorySessionBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionBackend for InMemorySessionBackend {
    async fn reload(&self) -> Result<()> {
        Ok(())
    }

    async fn search(&self, filter: &SessionFilter) -> Result<Vec<SessionRecord>> {
        let mut found: Vec<SessionRecord> = self
            .sessions
            .read()
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        found.sort_by_key(|r| r.created_at);
        Ok(found)
    }

    async fn save(&self, record: &SessionRecord) -> Result<()> {
        self.sessions
            .write()
            .insert(record.session_id.clone(), record.clone());
        Ok(())
    }

    async fn remove(&self, session_id: &str) -> Result<bool> {
        Ok(self.sessions.write().remove(session_id).is_some())
    }
}
