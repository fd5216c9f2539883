// Error types for the authentication core
// Decision: Lookup misses are Option/bool at the strategy boundary, never errors
// Decision: Only registration conflicts and reset-token misses propagate to callers

use thiserror::Error;

/// Result type alias for authentication operations
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur in the authentication core
#[derive(Debug, Error)]
pub enum AuthError {
    /// Identifier, token or record did not resolve
    #[error("not found: {0}")]
    NotFound(String),

    /// A principal with this identifier is already registered
    #[error("{0} already exists")]
    AlreadyExists(String),

    /// Reset token is not carried by any principal
    #[error("invalid reset token")]
    InvalidToken,

    /// Header or token could not be parsed
    #[error("malformed input: {0}")]
    Malformed(String),

    /// User directory or durable session store failed
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Password hashing failed
    #[error("hashing error: {0}")]
    Hashing(String),

    /// Configuration value could not be used
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl AuthError {
    /// Create a not found error
    pub fn not_found(what: impl Into<String>) -> Self {
        AuthError::NotFound(what.into())
    }

    /// Create a store unavailable error
    pub fn store(msg: impl Into<String>) -> Self {
        AuthError::StoreUnavailable(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        AuthError::Configuration(msg.into())
    }

    /// Whether the error comes from an unreachable backing store
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, AuthError::StoreUnavailable(_))
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError::StoreUnavailable(format!("{:#}", err))
    }
}
