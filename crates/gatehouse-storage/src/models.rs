// Database row types

use chrono::{DateTime, Utc};
use gatehouse_core::{Principal, SessionRecord};
use sqlx::FromRow;
use uuid::Uuid;

// ============================================
// Users
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub session_id: Option<String>,
    pub reset_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for Principal {
    fn from(row: UserRow) -> Self {
        Principal {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            first_name: row.first_name,
            last_name: row.last_name,
            session_id: row.session_id,
            reset_token: row.reset_token,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// ============================================
// Sessions
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub session_id: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<SessionRow> for SessionRecord {
    fn from(row: SessionRow) -> Self {
        SessionRecord {
            session_id: row.session_id,
            user_id: row.user_id,
            created_at: row.created_at,
        }
    }
}
