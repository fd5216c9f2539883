// Repository layer for database operations

use anyhow::{Context, Result};
use gatehouse_core::{Principal, SessionFilter, SessionRecord, UserFilter};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::*;

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create database connection from URL
    pub async fn from_url(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the bundled schema migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run migrations")?;
        Ok(())
    }

    // ============================================
    // Users
    // ============================================

    pub async fn search_users(&self, filter: &UserFilter) -> Result<Vec<UserRow>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, first_name, last_name, session_id, reset_token, created_at, updated_at
            FROM users
            WHERE ($1::text IS NULL OR email = $1)
              AND ($2::text IS NULL OR session_id = $2)
              AND ($3::text IS NULL OR reset_token = $3)
            ORDER BY id
            "#,
        )
        .bind(&filter.email)
        .bind(&filter.session_id)
        .bind(&filter.reset_token)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, first_name, last_name, session_id, reset_token, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn upsert_user(&self, principal: &Principal) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, first_name, last_name, session_id, reset_token, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                email = EXCLUDED.email,
                password_hash = EXCLUDED.password_hash,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                session_id = EXCLUDED.session_id,
                reset_token = EXCLUDED.reset_token,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(principal.id)
        .bind(&principal.email)
        .bind(&principal.password_hash)
        .bind(&principal.first_name)
        .bind(&principal.last_name)
        .bind(&principal.session_id)
        .bind(&principal.reset_token)
        .bind(principal.created_at)
        .bind(principal.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert unless another row holds the same email. Concurrent callers for
    /// one email serialize on a transaction-scoped advisory lock.
    pub async fn insert_user_if_email_free(&self, principal: &Principal) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(&principal.email)
            .execute(&mut *tx)
            .await?;

        let taken: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1 LIMIT 1")
            .bind(&principal.email)
            .fetch_optional(&mut *tx)
            .await?;
        if taken.is_some() {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, first_name, last_name, session_id, reset_token, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(principal.id)
        .bind(&principal.email)
        .bind(&principal.password_hash)
        .bind(&principal.first_name)
        .bind(&principal.last_name)
        .bind(&principal.session_id)
        .bind(&principal.reset_token)
        .bind(principal.created_at)
        .bind(principal.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count_users(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    // ============================================
    // Sessions
    // ============================================

    pub async fn search_sessions(&self, filter: &SessionFilter) -> Result<Vec<SessionRow>> {
        let rows = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT session_id, user_id, created_at
            FROM user_sessions
            WHERE ($1::text IS NULL OR session_id = $1)
              AND ($2::uuid IS NULL OR user_id = $2)
            ORDER BY created_at
            "#,
        )
        .bind(&filter.session_id)
        .bind(filter.user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn upsert_session(&self, record: &SessionRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_sessions (session_id, user_id, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (session_id) DO UPDATE SET
                user_id = EXCLUDED.user_id,
                created_at = EXCLUDED.created_at
            "#,
        )
        .bind(&record.session_id)
        .bind(record.user_id)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
