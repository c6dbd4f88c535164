use std::sync::Arc;

use crate::credentials::CredentialStore;
use crate::error::IdentityError;
use crate::token::{IdentityTokenPayload, IssuedToken, TokenIssuer};

/// Authenticates credentials and mints identity tokens for them.
pub struct IdentityIssuer {
    credentials: CredentialStore,
    tokens: Arc<TokenIssuer>,
}

impl IdentityIssuer {
    pub fn new(credentials: CredentialStore, tokens: Arc<TokenIssuer>) -> Self {
        Self {
            credentials,
            tokens,
        }
    }

    pub fn tokens(&self) -> &Arc<TokenIssuer> {
        &self.tokens
    }

    /// Exchange a username/password pair for a signed token.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<IssuedToken, IdentityError> {
        let Some(credential) = self.credentials.find(username, password) else {
            tracing::debug!(target: "shelf-authz", username, "credential mismatch");
            return Err(IdentityError::AuthenticationFailure);
        };

        let payload = IdentityTokenPayload {
            user_id: credential.user_id.clone(),
            is_admin: credential.is_admin,
        };
        let issued = self.tokens.issue(&payload)?;

        tracing::info!(
            target: "shelf-authz",
            user_id = %payload.user_id,
            expires_at = %issued.expires_at,
            "identity token issued"
        );
        Ok(issued)
    }

    pub fn verify(&self, token: &str) -> Result<IdentityTokenPayload, IdentityError> {
        self.tokens.verify(token)
    }
}
