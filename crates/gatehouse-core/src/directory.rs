// UserDirectory: the principal store consumed by strategies and the login service
//
// Implementations:
// - InMemoryUserDirectory (this crate) for dev mode and tests
// - PgUserDirectory (gatehouse-storage) for production

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::principal::Principal;

/// Field filter for directory searches; every set field must match
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub email: Option<String>,
    pub session_id: Option<String>,
    pub reset_token: Option<String>,
}

impl UserFilter {
    /// Filter that matches every principal
    pub fn all() -> Self {
        Self::default()
    }

    pub fn email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::default()
        }
    }

    pub fn session_id(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            ..Self::default()
        }
    }

    pub fn reset_token(reset_token: impl Into<String>) -> Self {
        Self {
            reset_token: Some(reset_token.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, principal: &Principal) -> bool {
        fn field_matches(wanted: &Option<String>, actual: Option<&str>) -> bool {
            match wanted {
                Some(wanted) => actual == Some(wanted.as_str()),
                None => true,
            }
        }

        field_matches(&self.email, Some(principal.email.as_str()))
            && field_matches(&self.session_id, principal.session_id.as_deref())
            && field_matches(&self.reset_token, principal.reset_token.as_deref())
    }
}

/// Principal persistence
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// All principals matching the filter
    async fn search(&self, filter: &UserFilter) -> Result<Vec<Principal>>;

    /// Principal by id
    async fn get(&self, id: Uuid) -> Result<Option<Principal>>;

    /// Insert or replace by id
    async fn save(&self, principal: &Principal) -> Result<()>;

    /// Delete by id, returns whether a record was removed
    async fn remove(&self, id: Uuid) -> Result<bool>;

    /// Number of stored principals
    async fn count(&self) -> Result<u64>;

    /// First principal matching the filter
    async fn find_one(&self, filter: &UserFilter) -> Result<Option<Principal>> {
        Ok(self.search(filter).await?.into_iter().next())
    }

    /// Save `principal` only if no stored principal has its email.
    /// Returns whether it was saved.
    ///
    /// The default checks then saves in two steps; stores that can should
    /// make the pair atomic.
    async fn insert_if_email_free(&self, principal: &Principal) -> Result<bool> {
        if self
            .find_one(&UserFilter::email(principal.email.clone()))
            .await?
            .is_some()
        {
            return Ok(false);
        }
        self.save(principal).await?;
        Ok(true)
    }
}
