// Session cookie authentication backed by a durable session store
// Decision: Read-through: reload the store before every lookup, no cache
// Decision: Expired rows are rejected on read but left in the store
// Decision: Store failures are logged and read as "no session"

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use uuid::Uuid;

use super::{
    resolve_session_principal, AuthStrategy, ExpiringSessionStrategy, SessionStrategy,
};
use crate::config::AuthMode;
use crate::gate::PathGate;
use crate::principal::Principal;
use crate::request::RequestContext;
use crate::session::{is_expired, SessionBackend, SessionFilter};

pub struct PersistedSessionStrategy {
    inner: ExpiringSessionStrategy,
    backend: Arc<dyn SessionBackend>,
}

impl PersistedSessionStrategy {
    pub fn new(inner: ExpiringSessionStrategy, backend: Arc<dyn SessionBackend>) -> Self {
        Self { inner, backend }
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.inner.ttl()
    }
}

#[async_trait]
impl AuthStrategy for PersistedSessionStrategy {
    fn kind(&self) -> AuthMode {
        AuthMode::SessionDb
    }

    fn gate(&self) -> &PathGate {
        self.inner.gate()
    }

    async fn resolve_principal(&self, request: &dyn RequestContext) -> Option<Principal> {
        resolve_session_principal(self, self.inner.inner().directory(), request).await
    }

    fn as_session(&self) -> Option<&dyn SessionStrategy> {
        Some(self)
    }
}

#[async_trait]
impl SessionStrategy for PersistedSessionStrategy {
    fn cookie_name(&self) -> Option<&str> {
        self.inner.cookie_name()
    }

    async fn create_session(&self, user_id: &str) -> Option<String> {
        let record = self.inner.inner().new_record(user_id)?;
        if let Err(e) = self.backend.save(&record).await {
            tracing::warn!(user_id = %record.user_id, error = %e, "Failed to persist session");
            return None;
        }
        tracing::debug!(user_id = %record.user_id, "Persisted session created");
        Some(record.session_id)
    }

    async fn user_id_for_session_id(&self, session_id: &str) -> Option<Uuid> {
        if let Err(e) = self.backend.reload().await {
            tracing::warn!(error = %e, "Failed to reload session store");
            return None;
        }

        let records = match self
            .backend
            .search(&SessionFilter::session_id(session_id))
            .await
        {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, "Session store search failed");
                return None;
            }
        };

        let record = records.into_iter().next()?;
        if is_expired(record.created_at, self.ttl(), self.inner.inner().now()) {
            tracing::debug!(user_id = %record.user_id, "Persisted session expired");
            return None;
        }
        Some(record.user_id)
    }

    async fn destroy_session(&self, request: &dyn RequestContext) -> bool {
        let Some(session_id) = self.session_cookie(request) else {
            return false;
        };
        if self.user_id_for_session_id(session_id).await.is_none() {
            return false;
        }
        match self.backend.remove(session_id).await {
            Ok(removed) => removed,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to remove persisted session");
                false
            }
        }
    }
}
