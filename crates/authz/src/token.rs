//! HS256 identity tokens.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use shelf_kernel::settings::AuthSettings;

use crate::error::IdentityError;

const GENERATED_SECRET_LEN: usize = 64;

/// The caller identity carried inside a token and trusted after verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityTokenPayload {
    pub user_id: String,
    pub is_admin: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    identity: IdentityTokenPayload,
    iat: i64,
    exp: i64,
}

/// A freshly signed token and the instant it stops being valid.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies identity tokens with a single process-wide secret.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Build from settings, generating a random secret when none is configured.
    pub fn from_settings(settings: &AuthSettings) -> Result<Self, IdentityError> {
        if settings.token_ttl_days <= 0 {
            return Err(IdentityError::Configuration(format!(
                "token_ttl_days must be positive, got {}",
                settings.token_ttl_days
            )));
        }
        let ttl = Duration::days(settings.token_ttl_days);

        match settings.jwt_secret.as_deref() {
            Some(secret) if !secret.is_empty() => Ok(Self::new(secret.as_bytes(), ttl)),
            _ => {
                tracing::warn!(
                    target: "shelf-authz",
                    "no jwt_secret configured; generated a per-process secret"
                );
                Ok(Self::new(generate_secret().as_bytes(), ttl))
            }
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign `payload`, valid from now until now + ttl.
    pub fn issue(&self, payload: &IdentityTokenPayload) -> Result<IssuedToken, IdentityError> {
        self.issue_at(payload, Utc::now())
    }

    /// Sign `payload` as if issued at `issued_at`.
    pub fn issue_at(
        &self,
        payload: &IdentityTokenPayload,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, IdentityError> {
        let expires_at = issued_at + self.ttl;
        let claims = Claims {
            identity: payload.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| IdentityError::Signing(format!("jwt encode: {e}")))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Check signature and expiry, returning the embedded identity.
    pub fn verify(&self, token: &str) -> Result<IdentityTokenPayload, IdentityError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims.identity)
            .map_err(|e| {
                tracing::debug!(target: "shelf-authz", error = %e, "token rejected");
                IdentityError::VerificationFailure
            })
    }
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

fn generate_secret() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_SECRET_LEN)
        .map(char::from)
        .collect()
}
