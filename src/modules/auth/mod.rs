use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::{serde::ts_milliseconds, DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use shelf_authz::IdentityIssuer;
use shelf_http::{error::AppError, extract::ValidJson};
use shelf_kernel::{InitCtx, Module};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub token_type: &'static str,
    #[serde(with = "ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
}

/// Credential exchange under `/api/auth`.
pub struct AuthModule {
    identity: Arc<IdentityIssuer>,
}

impl AuthModule {
    pub fn new(identity: Arc<IdentityIssuer>) -> Self {
        Self { identity }
    }
}

#[async_trait]
impl Module for AuthModule {
    fn name(&self) -> &'static str {
        "auth"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            token_ttl_days = self.identity.tokens().ttl().num_days(),
            "auth module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", post(authenticate))
            .route("/health", get(|| async { "ok" }))
            .with_state(self.identity.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "post": {
                        "summary": "Exchange credentials for a bearer token",
                        "tags": ["Auth"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/AuthRequest" }
                                }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "Signed identity token",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/TokenResponse" }
                                    }
                                }
                            },
                            "400": {
                                "description": "Malformed body or unknown credentials",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "AuthRequest": {
                        "type": "object",
                        "properties": {
                            "username": { "type": "string" },
                            "password": { "type": "string" }
                        },
                        "required": ["username", "password"],
                        "additionalProperties": false
                    },
                    "TokenResponse": {
                        "type": "object",
                        "properties": {
                            "token": { "type": "string" },
                            "tokenType": { "type": "string", "enum": ["Bearer"] },
                            "expiresAt": { "type": "integer", "description": "Epoch milliseconds" }
                        },
                        "required": ["token", "tokenType", "expiresAt"]
                    }
                }
            }
        }))
    }
}

async fn authenticate(
    State(identity): State<Arc<IdentityIssuer>>,
    ValidJson(request): ValidJson<AuthRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let issued = identity.authenticate(&request.username, &request.password)?;
    Ok(Json(TokenResponse {
        token: issued.token,
        token_type: "Bearer",
        expires_at: issued.expires_at,
    }))
}
