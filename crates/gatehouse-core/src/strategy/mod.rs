//! Authentication strategies.
//!
//! Every strategy answers two questions for the request pipeline: does this
//! path need authentication (delegated to a [`PathGate`]), and which
//! principal, if any, does the request carry. Session strategies add the
//! session lifecycle on top through [`SessionStrategy`].
//!
//! The session variants compose by wrapping rather than inheritance:
//! [`ExpiringSessionStrategy`] holds a [`SessionAuthStrategy`] and adds a TTL
//! check, [`PersistedSessionStrategy`] holds an [`ExpiringSessionStrategy`]
//! and swaps the in-memory table for a durable [`SessionBackend`].

mod basic;
mod expiring;
mod gate_only;
mod persisted;
mod session;

pub use basic::BasicAuthStrategy;
pub use expiring::ExpiringSessionStrategy;
pub use gate_only::GateOnlyStrategy;
pub use persisted::PersistedSessionStrategy;
pub use session::SessionAuthStrategy;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::config::{AuthConfig, AuthMode};
use crate::directory::UserDirectory;
use crate::error::{AuthError, Result};
use crate::gate::PathGate;
use crate::principal::Principal;
use crate::request::RequestContext;
use crate::session::{SessionBackend, SessionTable};

/// Request authentication capability
#[async_trait]
pub trait AuthStrategy: Send + Sync {
    /// Mode this strategy implements
    fn kind(&self) -> AuthMode;

    /// Exemptions consulted by [`AuthStrategy::requires_auth`]
    fn gate(&self) -> &PathGate;

    fn requires_auth(&self, path: Option<&str>) -> bool {
        self.gate().requires_auth(path)
    }

    fn authorization_header<'a>(&self, request: &'a dyn RequestContext) -> Option<&'a str> {
        request.authorization_header()
    }

    /// Principal carried by the request, `None` when unauthenticated
    async fn resolve_principal(&self, request: &dyn RequestContext) -> Option<Principal>;

    /// Session capabilities, for strategies that issue session cookies
    fn as_session(&self) -> Option<&dyn SessionStrategy> {
        None
    }
}

/// Session lifecycle shared by the cookie-based strategies
#[async_trait]
pub trait SessionStrategy: AuthStrategy {
    /// Cookie carrying the token; `None` means no cookie is ever found
    fn cookie_name(&self) -> Option<&str>;

    fn session_cookie<'a>(&self, request: &'a dyn RequestContext) -> Option<&'a str> {
        self.cookie_name().and_then(|name| request.cookie(name))
    }

    /// Open a session for `user_id`, returning its token
    async fn create_session(&self, user_id: &str) -> Option<String>;

    /// Principal id behind a live session token
    async fn user_id_for_session_id(&self, session_id: &str) -> Option<Uuid>;

    /// End the session named by the request cookie
    async fn destroy_session(&self, request: &dyn RequestContext) -> bool;
}

/// Cookie → live session → principal, shared by all session strategies
pub(crate) async fn resolve_session_principal<S>(
    strategy: &S,
    directory: &dyn UserDirectory,
    request: &dyn RequestContext,
) -> Option<Principal>
where
    S: SessionStrategy + ?Sized,
{
    let session_id = strategy.session_cookie(request)?;
    let user_id = strategy.user_id_for_session_id(session_id).await?;
    lookup_principal(directory, user_id).await
}

/// Directory lookup that degrades store failures to `None`
pub(crate) async fn lookup_principal(
    directory: &dyn UserDirectory,
    user_id: Uuid,
) -> Option<Principal> {
    match directory.get(user_id).await {
        Ok(principal) => principal,
        Err(e) => {
            tracing::warn!(user_id = %user_id, error = %e, "Principal lookup failed");
            None
        }
    }
}

/// Collaborators a strategy may need, built once at startup
#[derive(Clone)]
pub struct StrategyDeps {
    pub directory: Arc<dyn UserDirectory>,
    pub sessions: Arc<SessionTable>,
    /// Durable store, required by `session_db_auth`
    pub session_backend: Option<Arc<dyn SessionBackend>>,
    pub clock: Arc<dyn Clock>,
}

impl StrategyDeps {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            directory,
            sessions: Arc::new(SessionTable::new()),
            session_backend: None,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_session_backend(mut self, backend: Arc<dyn SessionBackend>) -> Self {
        self.session_backend = Some(backend);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

/// Build the strategy selected by `config.mode`; `None` when no gate is configured
pub fn build_strategy(
    config: &AuthConfig,
    deps: StrategyDeps,
) -> Result<Option<Arc<dyn AuthStrategy>>> {
    let gate = PathGate::new(&config.excluded_paths);
    let cookie_name = config.session_cookie_name.clone();
    let ttl = config.session_ttl();

    let session = || {
        SessionAuthStrategy::new(
            gate.clone(),
            cookie_name.clone(),
            deps.sessions.clone(),
            deps.directory.clone(),
        )
        .with_clock(deps.clock.clone())
    };

    let strategy: Arc<dyn AuthStrategy> = match config.mode {
        AuthMode::None => return Ok(None),
        AuthMode::Auth => Arc::new(GateOnlyStrategy::new(gate.clone())),
        AuthMode::Basic => Arc::new(BasicAuthStrategy::new(gate.clone(), deps.directory.clone())),
        AuthMode::Session => Arc::new(session()),
        AuthMode::SessionExp => Arc::new(ExpiringSessionStrategy::new(session(), ttl)),
        AuthMode::SessionDb => {
            let backend = deps.session_backend.clone().ok_or_else(|| {
                AuthError::config("session_db_auth requires a durable session store")
            })?;
            Arc::new(PersistedSessionStrategy::new(
                ExpiringSessionStrategy::new(session(), ttl),
                backend,
            ))
        }
    };

    tracing::info!(
        mode = config.mode.as_str(),
        exemptions = config.excluded_paths.len(),
        "Authentication strategy configured"
    );
    Ok(Some(strategy))
}
