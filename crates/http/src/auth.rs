//! Bearer-token identity middleware.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use shelf_authz::TokenIssuer;

use crate::error::AppError;

/// Verify `Authorization: Bearer <token>` and inject the caller's
/// [`shelf_authz::IdentityTokenPayload`] into request extensions.
pub async fn require_identity(
    State(tokens): State<Arc<TokenIssuer>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::unauthorized("Invalid authorization scheme"))?;

    let identity = tokens.verify(token.trim())?;
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}
