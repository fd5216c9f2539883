// Principal: the identity record resolved from the user directory
// Decision: The directory owns the record; strategies only hold clones
// Decision: Session id and reset token live on the record for the login service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
    /// Argon2id PHC digest
    pub password_hash: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// Session token issued by the login service, one per principal
    #[serde(default)]
    pub session_id: Option<String>,
    /// Outstanding password reset token
    #[serde(default)]
    pub reset_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Principal {
    /// New principal with a time-ordered id
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            email: email.into(),
            password_hash: password_hash.into(),
            first_name: None,
            last_name: None,
            session_id: None,
            reset_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Human readable name: full name, then either part, then the email
    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.to_string(),
            (None, Some(last)) => last.to_string(),
            (None, None) => self.email.clone(),
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
