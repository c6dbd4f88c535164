//! Authentication and admission control for shelf.
//!
//! The [`IdentityIssuer`] trades credentials for signed identity tokens and
//! verifies them again at the boundary. The [`PolicyEngine`] rejects
//! entities that fall into a forbidden attribute combination.

pub mod credentials;
pub mod error;
pub mod issuer;
pub mod policy;
pub mod token;

pub use credentials::{Credential, CredentialStore};
pub use error::IdentityError;
pub use issuer::IdentityIssuer;
pub use policy::{ForbiddenCombination, PolicyEngine, Predicate};
pub use token::{IdentityTokenPayload, IssuedToken, TokenIssuer};
