use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::State, routing::get, Json, Router};
use chrono::{serde::ts_milliseconds, DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::json;
use shelf_db::{Criteria, Fields, MemoryStore, Record, Store, Value};
use shelf_http::{error::AppError, extract::UuidPath};
use shelf_kernel::{InitCtx, Module};
use uuid::Uuid;

/// A public author profile, linked to the identity that writes as them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: Uuid,
    #[serde(skip)]
    pub user_id: String,
    pub author_name: String,
    #[serde(with = "ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AuthorField {
    Id,
    UserId,
}

impl Fields for Author {
    type Field = AuthorField;

    fn field(&self, field: AuthorField) -> Option<Value> {
        Some(match field {
            AuthorField::Id => self.id.into(),
            AuthorField::UserId => self.user_id.clone().into(),
        })
    }
}

impl Record for Author {
    const ID_FIELD: AuthorField = AuthorField::Id;

    fn id(&self) -> Uuid {
        self.id
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = self.updated_at.max(at);
    }
}

fn seed_authors(now: DateTime<Utc>) -> Vec<Author> {
    let created_at = now - Duration::days(4);
    [
        (
            Uuid::from_u128(0xfecd282a_d6be_11ef_8974_fbc2cb00b09b),
            "john-doe-uuid-string",
            "John Doe",
        ),
        (
            Uuid::from_u128(0xb00c67e3_e4fc_4973_bc99_f4a6d6b80743),
            "darth-vader-id",
            "Darth Vader",
        ),
    ]
    .into_iter()
    .map(|(id, user_id, author_name)| Author {
        id,
        user_id: user_id.to_string(),
        author_name: author_name.to_string(),
        created_at,
        updated_at: created_at,
    })
    .collect()
}

type Authors = Arc<dyn Store<Author>>;

/// Read-only author directory under `/api/users`.
pub struct UsersModule {
    authors: Authors,
}

impl UsersModule {
    pub fn new(authors: Authors) -> Self {
        Self { authors }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }
}

#[async_trait]
impl Module for UsersModule {
    fn name(&self) -> &'static str {
        "users"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        if ctx.settings.store.seed {
            for author in seed_authors(Utc::now()) {
                self.authors.insert(author).await?;
            }
        }
        tracing::info!(module = self.name(), "users module initialized");
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(list_authors))
            .route("/{id}", get(get_author))
            .route("/health", get(|| async { "ok" }))
            .with_state(self.authors.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List authors",
                        "tags": ["Users"],
                        "responses": {
                            "200": {
                                "description": "All authors",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Author" }
                                        }
                                    }
                                }
                            }
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get an author",
                        "tags": ["Users"],
                        "parameters": [{
                            "name": "id",
                            "in": "path",
                            "required": true,
                            "schema": { "type": "string", "format": "uuid" }
                        }],
                        "responses": {
                            "200": {
                                "description": "The author",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Author" }
                                    }
                                }
                            },
                            "404": {
                                "description": "Author not found",
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
                    "Author": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string", "format": "uuid" },
                            "authorName": { "type": "string" },
                            "createdAt": { "type": "integer", "description": "Epoch milliseconds" },
                            "updatedAt": { "type": "integer", "description": "Epoch milliseconds" }
                        },
                        "required": ["id", "authorName", "createdAt", "updatedAt"]
                    }
                }
            }
        }))
    }
}

async fn list_authors(State(authors): State<Authors>) -> Result<Json<Vec<Author>>, AppError> {
    let all = authors
        .get_by_criteria(&Criteria::new())
        .await
        .map_err(anyhow::Error::new)?;
    Ok(Json(all))
}

async fn get_author(
    State(authors): State<Authors>,
    UuidPath(id): UuidPath,
) -> Result<Json<Author>, AppError> {
    authors
        .get_by_id(id, &Criteria::new())
        .await
        .map_err(anyhow::Error::new)?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Author not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode};
    use shelf_kernel::settings::Settings;
    use tower::ServiceExt;

    async fn seeded() -> UsersModule {
        let module = UsersModule::in_memory();
        let settings = Settings::default();
        module.init(&InitCtx { settings: &settings }).await.unwrap();
        module
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(
                axum::http::Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or_default())
    }

    #[tokio::test]
    async fn lists_seeded_authors_without_identity_links() {
        let (status, body) = get(seeded().await.routes(), "/").await;
        assert_eq!(status, StatusCode::OK);

        let authors = body.as_array().unwrap();
        assert_eq!(authors.len(), 2);
        assert_eq!(authors[0]["authorName"], "John Doe");
        assert!(authors[0].get("userId").is_none());
        assert!(authors[0]["createdAt"].is_i64());
    }

    #[tokio::test]
    async fn looks_up_authors_by_id() {
        let router = seeded().await.routes();

        let (status, body) = get(router.clone(), "/b00c67e3-e4fc-4973-bc99-f4a6d6b80743").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["authorName"], "Darth Vader");

        let (status, _) = get(router.clone(), &format!("/{}", Uuid::new_v4())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = get(router, "/darth").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unseeded_directory_is_empty() {
        let module = UsersModule::in_memory();
        let mut settings = Settings::default();
        settings.store.seed = false;
        module.init(&InitCtx { settings: &settings }).await.unwrap();

        let (status, body) = get(module.routes(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }
}
