// Session primitives shared by the session strategies
// Decision: Tokens are UUIDv4 strings, opaque to clients
// Decision: Expiry is lazy: a record is checked against its TTL when read

mod backend;
mod table;

pub use backend::{SessionBackend, SessionFilter, SessionRecord};
pub use table::SessionTable;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Fresh opaque token
pub fn generate_token() -> String {
    Uuid::new_v4().to_string()
}

/// Parse a caller-supplied principal id; empty or non-UUID input is rejected
pub fn parse_user_id(user_id: &str) -> Option<Uuid> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return None;
    }
    Uuid::parse_str(trimmed).ok()
}

/// Whether a session created at `created_at` is past `ttl` at `now`.
/// `None` never expires; the boundary instant itself is still valid.
/// A deadline past the representable range never expires either.
pub fn is_expired(created_at: DateTime<Utc>, ttl: Option<Duration>, now: DateTime<Utc>) -> bool {
    match ttl.and_then(|ttl| created_at.checked_add_signed(ttl)) {
        Some(deadline) => deadline < now,
        None => false,
    }
}
