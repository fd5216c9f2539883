// HTTP Basic authentication against the user directory
// Decision: Every parse step returns Option; malformed input means "no principal"
// Decision: Candidates are all principals with the email, first verified wins

use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::AuthStrategy;
use crate::config::AuthMode;
use crate::directory::{UserDirectory, UserFilter};
use crate::gate::PathGate;
use crate::password::verify_password;
use crate::principal::Principal;
use crate::request::RequestContext;

const BASIC_PREFIX: &str = "Basic ";

pub struct BasicAuthStrategy {
    gate: PathGate,
    directory: Arc<dyn UserDirectory>,
}

impl BasicAuthStrategy {
    pub fn new(gate: PathGate, directory: Arc<dyn UserDirectory>) -> Self {
        Self { gate, directory }
    }

    /// Token after the literal `Basic ` prefix
    pub fn extract_credential_token(header: &str) -> Option<&str> {
        header
            .strip_prefix(BASIC_PREFIX)
            .filter(|token| !token.is_empty())
    }

    /// Standard base64 to UTF-8
    pub fn decode_token(token: &str) -> Option<String> {
        let bytes = STANDARD.decode(token).ok()?;
        String::from_utf8(bytes).ok()
    }

    /// `(identifier, secret)` split at the first `:`
    pub fn split_credentials(plaintext: &str) -> Option<(&str, &str)> {
        plaintext.split_once(':')
    }

    /// First principal with this email whose digest verifies `secret`
    pub async fn user_from_credentials(&self, identifier: &str, secret: &str) -> Option<Principal> {
        let candidates = match self.directory.search(&UserFilter::email(identifier)).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!(error = %e, "User search failed during basic auth");
                return None;
            }
        };

        candidates
            .into_iter()
            .find(|candidate| verify_password(secret, &candidate.password_hash))
    }
}

#[async_trait]
impl AuthStrategy for BasicAuthStrategy {
    fn kind(&self) -> AuthMode {
        AuthMode::Basic
    }

    fn gate(&self) -> &PathGate {
        &self.gate
    }

    async fn resolve_principal(&self, request: &dyn RequestContext) -> Option<Principal> {
        let header = self.authorization_header(request)?;
        let token = Self::extract_credential_token(header)?;
        let plaintext = match Self::decode_token(token) {
            Some(plaintext) => plaintext,
            None => {
                tracing::debug!("Basic credential token is not valid base64");
                return None;
            }
        };
        let (identifier, secret) = Self::split_credentials(&plaintext)?;
        self.user_from_credentials(identifier, secret).await
    }
}
