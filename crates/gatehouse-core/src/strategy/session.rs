// Session cookie authentication over the in-memory session table
// Decision: The table is injected (Arc), one per process
// Decision: Records carry created_at even though this variant never expires them

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{resolve_session_principal, AuthStrategy, SessionStrategy};
use crate::clock::{Clock, SystemClock};
use crate::config::AuthMode;
use crate::directory::UserDirectory;
use crate::gate::PathGate;
use crate::principal::Principal;
use crate::request::RequestContext;
use crate::session::{generate_token, parse_user_id, SessionRecord, SessionTable};

pub struct SessionAuthStrategy {
    gate: PathGate,
    cookie_name: Option<String>,
    table: Arc<SessionTable>,
    directory: Arc<dyn UserDirectory>,
    clock: Arc<dyn Clock>,
}

impl SessionAuthStrategy {
    pub fn new(
        gate: PathGate,
        cookie_name: Option<String>,
        table: Arc<SessionTable>,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            gate,
            cookie_name,
            table,
            directory,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(crate) fn table(&self) -> &SessionTable {
        &self.table
    }

    pub(crate) fn directory(&self) -> &dyn UserDirectory {
        self.directory.as_ref()
    }

    /// Validated user id plus a fresh record stamped with the current time
    pub(crate) fn new_record(&self, user_id: &str) -> Option<SessionRecord> {
        let user_id = parse_user_id(user_id)?;
        Some(SessionRecord::new(generate_token(), user_id, self.now()))
    }
}

#[async_trait]
impl AuthStrategy for SessionAuthStrategy {
    fn kind(&self) -> AuthMode {
        AuthMode::Session
    }

    fn gate(&self) -> &PathGate {
        &self.gate
    }

    async fn resolve_principal(&self, request: &dyn RequestContext) -> Option<Principal> {
        resolve_session_principal(self, self.directory(), request).await
    }

    fn as_session(&self) -> Option<&dyn SessionStrategy> {
        Some(self)
    }
}

#[async_trait]
impl SessionStrategy for SessionAuthStrategy {
    fn cookie_name(&self) -> Option<&str> {
        self.cookie_name.as_deref()
    }

    async fn create_session(&self, user_id: &str) -> Option<String> {
        let record = self.new_record(user_id)?;
        let session_id = record.session_id.clone();
        tracing::debug!(user_id = %record.user_id, "Session created");
        self.table.insert(record);
        Some(session_id)
    }

    async fn user_id_for_session_id(&self, session_id: &str) -> Option<Uuid> {
        self.table.get(session_id).map(|record| record.user_id)
    }

    async fn destroy_session(&self, request: &dyn RequestContext) -> bool {
        let Some(session_id) = self.session_cookie(request) else {
            return false;
        };
        match self.table.remove(session_id) {
            Some(record) => {
                tracing::debug!(user_id = %record.user_id, "Session destroyed");
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryUserDirectory;
    use crate::request::SimpleRequest;

    const COOKIE: &str = "_my_session_id";

    async fn setup() -> (SessionAuthStrategy, Principal) {
        let directory = Arc::new(InMemoryUserDirectory::new());
        let bob = Principal::new("bob@hbtn.io", "digest");
        directory.save(&bob).await.unwrap();
        let strategy = SessionAuthStrategy::new(
            PathGate::default(),
            Some(COOKIE.to_string()),
            Arc::new(SessionTable::new()),
            directory,
        );
        (strategy, bob)
    }

    #[tokio::test]
    async fn test_create_then_resolve() {
        let (strategy, bob) = setup().await;
        let token = strategy.create_session(&bob.id.to_string()).await.unwrap();

        let request = SimpleRequest::new().with_cookie(COOKIE, token.clone());
        let principal = strategy.resolve_principal(&request).await.unwrap();
        assert_eq!(principal.id, bob.id);
        assert_eq!(strategy.user_id_for_session_id(&token).await, Some(bob.id));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_user_ids() {
        let (strategy, _) = setup().await;
        assert!(strategy.create_session("").await.is_none());
        assert!(strategy.create_session("89").await.is_none());
        assert!(strategy.table().is_empty());
    }

    #[tokio::test]
    async fn test_each_session_gets_a_fresh_token() {
        let (strategy, bob) = setup().await;
        let a = strategy.create_session(&bob.id.to_string()).await.unwrap();
        let b = strategy.create_session(&bob.id.to_string()).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(strategy.table().len(), 2);
    }

    #[tokio::test]
    async fn test_destroy_twice() {
        let (strategy, bob) = setup().await;
        let token = strategy.create_session(&bob.id.to_string()).await.unwrap();
        let request = SimpleRequest::new().with_cookie(COOKIE, token);

        assert!(strategy.destroy_session(&request).await);
        assert!(!strategy.destroy_session(&request).await);
        assert!(strategy.resolve_principal(&request).await.is_none());
    }

    #[tokio::test]
    async fn test_missing_cookie_or_name() {
        let (strategy, bob) = setup().await;
        let token = strategy.create_session(&bob.id.to_string()).await.unwrap();

        let wrong_cookie = SimpleRequest::new().with_cookie("session_id", token.clone());
        assert!(strategy.resolve_principal(&wrong_cookie).await.is_none());
        assert!(!strategy.destroy_session(&SimpleRequest::new()).await);

        let unnamed = SessionAuthStrategy::new(
            PathGate::default(),
            None,
            Arc::new(SessionTable::new()),
            Arc::new(InMemoryUserDirectory::new()),
        );
        let request = SimpleRequest::new().with_cookie(COOKIE, token);
        assert!(unnamed.session_cookie(&request).is_none());
    }

    #[tokio::test]
    async fn test_stale_user_reference_resolves_nothing() {
        let (strategy, _) = setup().await;
        let token = strategy
            .create_session(&Uuid::now_v7().to_string())
            .await
            .unwrap();
        let request = SimpleRequest::new().with_cookie(COOKIE, token);
        assert!(strategy.resolve_principal(&request).await.is_none());
    }
}
