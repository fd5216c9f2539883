// Session cookie authentication with a time-to-live
// Decision: Expiry is lazy; an expired entry is dropped by the lookup that sees it
// Decision: ttl = None never expires

use async_trait::async_trait;
use chrono::Duration;
use uuid::Uuid;

use super::{resolve_session_principal, AuthStrategy, SessionAuthStrategy, SessionStrategy};
use crate::config::AuthMode;
use crate::gate::PathGate;
use crate::principal::Principal;
use crate::request::RequestContext;
use crate::session::is_expired;

pub struct ExpiringSessionStrategy {
    inner: SessionAuthStrategy,
    ttl: Option<Duration>,
}

impl ExpiringSessionStrategy {
    /// Non-positive durations are treated as "never expires"
    pub fn new(inner: SessionAuthStrategy, ttl: Option<Duration>) -> Self {
        let ttl = ttl.filter(|ttl| *ttl > Duration::zero());
        Self { inner, ttl }
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    pub(crate) fn inner(&self) -> &SessionAuthStrategy {
        &self.inner
    }
}

#[async_trait]
impl AuthStrategy for ExpiringSessionStrategy {
    fn kind(&self) -> AuthMode {
        AuthMode::SessionExp
    }

    fn gate(&self) -> &PathGate {
        self.inner.gate()
    }

    async fn resolve_principal(&self, request: &dyn RequestContext) -> Option<Principal> {
        resolve_session_principal(self, self.inner.directory(), request).await
    }

    fn as_session(&self) -> Option<&dyn SessionStrategy> {
        Some(self)
    }
}

#[async_trait]
impl SessionStrategy for ExpiringSessionStrategy {
    fn cookie_name(&self) -> Option<&str> {
        self.inner.cookie_name()
    }

    async fn create_session(&self, user_id: &str) -> Option<String> {
        self.inner.create_session(user_id).await
    }

    async fn user_id_for_session_id(&self, session_id: &str) -> Option<Uuid> {
        let record = self.inner.table().get(session_id)?;
        if is_expired(record.created_at, self.ttl, self.inner.now()) {
            tracing::debug!(user_id = %record.user_id, "Session expired");
            self.inner.table().remove(session_id);
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
        self.inner.table().remove(session_id).is_some()
    }
}
