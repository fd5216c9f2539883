// SessionLoginService: standalone login surface
// Decision: One session per principal, stored on the principal record itself
// Decision: Lookup misses are Option/bool; only register and reset surface errors
//
// This service does not go through AuthStrategy. Route handlers call it
// directly for register/login/logout/profile/reset flows.

use std::sync::Arc;

use uuid::Uuid;

use crate::directory::{UserDirectory, UserFilter};
use crate::error::{AuthError, Result};
use crate::password::{hash_password, verify_password};
use crate::principal::Principal;
use crate::session::generate_token;

#[derive(Clone)]
pub struct SessionLoginService {
    directory: Arc<dyn UserDirectory>,
}

impl SessionLoginService {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>> {
        self.directory.find_one(&UserFilter::email(email)).await
    }

    /// Create a principal; fails with `AlreadyExists` if the email is taken
    pub async fn register(&self, email: &str, password: &str) -> Result<Principal> {
        let exists = || AuthError::AlreadyExists(format!("User {}", email));
        if self.find_by_email(email).await?.is_some() {
            return Err(exists());
        }

        let principal = Principal::new(email, hash_password(password)?);
        // The directory re-checks atomically; a racing registration loses here
        if !self.directory.insert_if_email_free(&principal).await? {
            return Err(exists());
        }
        tracing::info!(user_id = %principal.id, "User registered");
        Ok(principal)
    }

    /// Whether `password` matches the stored digest for `email`
    pub async fn verify_login(&self, email: &str, password: &str) -> bool {
        match self.find_by_email(email).await {
            Ok(Some(principal)) => verify_password(password, &principal.password_hash),
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(error = %e, "User lookup failed during login");
                false
            }
        }
    }

    /// Issue a fresh session token and store it on the principal
    pub async fn create_session(&self, email: &str) -> Option<String> {
        let mut principal = match self.find_by_email(email).await {
            Ok(Some(principal)) => principal,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "User lookup failed while creating session");
                return None;
            }
        };

        let session_id = generate_token();
        principal.session_id = Some(session_id.clone());
        principal.touch();
        if let Err(e) = self.directory.save(&principal).await {
            tracing::warn!(user_id = %principal.id, error = %e, "Failed to store session");
            return None;
        }
        Some(session_id)
    }

    /// Principal carrying `session_id`
    pub async fn principal_for_session(&self, session_id: Option<&str>) -> Option<Principal> {
        let session_id = session_id.filter(|s| !s.is_empty())?;
        match self.directory.find_one(&UserFilter::session_id(session_id)).await {
            Ok(principal) => principal,
            Err(e) => {
                tracing::warn!(error = %e, "User lookup by session failed");
                None
            }
        }
    }

    /// Email of the principal carrying `session_id`
    pub async fn resolve_identifier_by_session(&self, session_id: Option<&str>) -> Option<String> {
        self.principal_for_session(session_id)
            .await
            .map(|principal| principal.email)
    }

    /// Clear the session on a principal; a missing principal is a no-op
    pub async fn destroy_session(&self, user_id: Uuid) {
        let mut principal = match self.directory.get(user_id).await {
            Ok(Some(principal)) => principal,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "User lookup failed during logout");
                return;
            }
        };

        principal.session_id = None;
        principal.touch();
        if let Err(e) = self.directory.save(&principal).await {
            tracing::warn!(user_id = %user_id, error = %e, "Failed to clear session");
        }
    }

    /// Issue a reset token, overwriting any previous one
    pub async fn issue_reset_token(&self, email: &str) -> Result<String> {
        let mut principal = self
            .find_by_email(email)
            .await?
            .ok_or_else(|| AuthError::not_found(format!("user {}", email)))?;

        let token = generate_token();
        principal.reset_token = Some(token.clone());
        principal.touch();
        self.directory.save(&principal).await?;
        Ok(token)
    }

    /// Replace the password of the principal holding `token` and clear the token
    pub async fn redeem_reset_token(&self, token: &str, new_password: &str) -> Result<()> {
        if token.is_empty() {
            return Err(AuthError::InvalidToken);
        }
        let mut principal = self
            .directory
            .find_one(&UserFilter::reset_token(token))
            .await?
            .ok_or(AuthError::InvalidToken)?;

        principal.password_hash = hash_password(new_password)?;
        principal.reset_token = None;
        principal.touch();
        self.directory.save(&principal).await?;
        tracing::info!(user_id = %principal.id, "Password reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryUserDirectory;

    fn service() -> SessionLoginService {
        SessionLoginService::new(Arc::new(InMemoryUserDirectory::new()))
    }

    #[tokio::test]
    async fn test_register_twice_conflicts() {
        let service = service();
        let bob = service.register("bob@hbtn.io", "MyPwdOfBob").await.unwrap();
        assert_eq!(bob.email, "bob@hbtn.io");
        assert_ne!(bob.password_hash, "MyPwdOfBob");

        let err = service.register("bob@hbtn.io", "other").await.unwrap_err();
        assert!(matches!(err, AuthError::AlreadyExists(_)));
        assert_eq!(err.to_string(), "User bob@hbtn.io already exists");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_registrations_admit_one() {
        let directory = Arc::new(InMemoryUserDirectory::new());
        let service = SessionLoginService::new(directory.clone());

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    service.register("race@hbtn.io", &format!("pwd{i}")).await
                })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(e) => assert!(matches!(e, AuthError::AlreadyExists(_))),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(
            directory.search(&UserFilter::email("race@hbtn.io")).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_verify_login() {
        let service = service();
        service.register("bob@hbtn.io", "MyPwdOfBob").await.unwrap();

        assert!(service.verify_login("bob@hbtn.io", "MyPwdOfBob").await);
        assert!(!service.verify_login("bob@hbtn.io", "wrong").await);
        assert!(!service.verify_login("unknown@hbtn.io", "MyPwdOfBob").await);
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let service = service();
        let bob = service.register("bob@hbtn.io", "MyPwdOfBob").await.unwrap();

        assert!(service.create_session("unknown@hbtn.io").await.is_none());

        let token = service.create_session("bob@hbtn.io").await.unwrap();
        assert_eq!(
            service.resolve_identifier_by_session(Some(&token)).await.as_deref(),
            Some("bob@hbtn.io")
        );
        assert_eq!(
            service.principal_for_session(Some(&token)).await.map(|p| p.id),
            Some(bob.id)
        );

        // a second login replaces the first token
        let second = service.create_session("bob@hbtn.io").await.unwrap();
        assert_ne!(token, second);
        assert!(service.resolve_identifier_by_session(Some(&token)).await.is_none());

        service.destroy_session(bob.id).await;
        assert!(service.resolve_identifier_by_session(Some(&second)).await.is_none());
        assert!(service.resolve_identifier_by_session(None).await.is_none());

        // unknown principal is a no-op
        service.destroy_session(Uuid::now_v7()).await;
    }

    #[tokio::test]
    async fn test_reset_token_unknown_email() {
        let service = service();
        let err = service.issue_reset_token("nobody@hbtn.io").await.unwrap_err();
        assert!(matches!(err, AuthError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_redeem_reset_token() {
        let service = service();
        service.register("bob@hbtn.io", "MyPwdOfBob").await.unwrap();

        let err = service
            .redeem_reset_token("never-issued", "x")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));

        let first = service.issue_reset_token("bob@hbtn.io").await.unwrap();
        let token = service.issue_reset_token("bob@hbtn.io").await.unwrap();
        assert_ne!(first, token);
        // overwritten on each issuance
        assert!(matches!(
            service.redeem_reset_token(&first, "x").await,
            Err(AuthError::InvalidToken)
        ));

        service.redeem_reset_token(&token, "NewPwd").await.unwrap();
        assert!(!service.verify_login("bob@hbtn.io", "MyPwdOfBob").await);
        assert!(service.verify_login("bob@hbtn.io", "NewPwd").await);
        assert!(matches!(
            service.redeem_reset_token(&token, "again").await,
            Err(AuthError::InvalidToken)
        ));
    }
}
