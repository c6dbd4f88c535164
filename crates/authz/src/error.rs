use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    /// No credential matched. Deliberately does not say which field was wrong.
    #[error("authentication failed")]
    AuthenticationFailure,

    /// Bad signature, malformed token, or expired token.
    #[error("token verification failed")]
    VerificationFailure,

    #[error("token signing failed: {0}")]
    Signing(String),

    #[error("invalid identity configuration: {0}")]
    Configuration(String),
}
