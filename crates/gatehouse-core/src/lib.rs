// Gatehouse Authentication Core
//
// This crate decides, for an inbound request, whether authentication is
// required and which principal the request carries.
//
// Key design decisions:
// - Strategies (gate-only, Basic, session, expiring, persisted) implement one
//   AuthStrategy trait and compose by wrapping
// - Stores are traits (UserDirectory, SessionBackend) so the same strategies run
//   in memory, over a JSON file, or over PostgreSQL
// - The request boundary is a trait (RequestContext); no HTTP framework here
// - Lookup misses and store failures degrade to "unauthenticated", never panics
// - The clock is injected so TTL expiry is testable

pub mod clock;
pub mod config;
pub mod directory;
pub mod error;
pub mod gate;
pub mod login;
pub mod password;
pub mod principal;
pub mod request;
pub mod session;
pub mod strategy;

// In-memory implementations for dev mode and testing
pub mod memory;

// Re-exports for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AuthConfig, AuthMode, DEFAULT_EXCLUDED_PATHS};
pub use directory::{UserDirectory, UserFilter};
pub use error::{AuthError, Result};
pub use gate::{requires_auth, ExemptionPattern, PathGate};
pub use login::SessionLoginService;
pub use password::{hash_password, verify_password};
pub use principal::Principal;
pub use request::{RequestContext, SimpleRequest};
pub use session::{SessionBackend, SessionFilter, SessionRecord, SessionTable};
pub use strategy::{
    build_strategy, AuthStrategy, BasicAuthStrategy, ExpiringSessionStrategy, GateOnlyStrategy,
    PersistedSessionStrategy, SessionAuthStrategy, SessionStrategy, StrategyDeps,
};
