use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::get,
    Extension, Json, Router,
};
use serde_json::json;
use shelf_authz::{IdentityTokenPayload, TokenIssuer};
use shelf_http::{
    auth::require_identity,
    error::AppError,
    extract::{UuidPath, ValidJson, ValidQuery},
};

use super::models::{BookDraft, BookFilter, BookPatch, Scope, StoredBook};
use super::service::{BookError, BookService};

impl From<BookError> for AppError {
    fn from(e: BookError) -> Self {
        match e {
            BookError::Validation(violations) => AppError::validation(
                violations.iter().map(|v| json!(v)).collect(),
                "Invalid input",
            ),
            BookError::NotFound => AppError::not_found("Book not found"),
            BookError::Conflict { .. } => AppError::conflict(
                vec![json!({"field": "title", "error": "duplicate"})],
                "A book with this title already exists",
            ),
            BookError::Forbidden { .. } => {
                AppError::forbidden("This book state is not allowed for this author")
            }
            BookError::Internal(e) => AppError::Internal(e.into()),
        }
    }
}

type Books = State<Arc<BookService>>;

/// Owner-scoped CRUD; every route except `/health` requires a bearer token.
pub fn owner_routes(service: Arc<BookService>, tokens: Arc<TokenIssuer>) -> Router {
    Router::new()
        .route("/", get(list_owned).post(create_book))
        .route(
            "/{id}",
            get(get_owned)
                .patch(patch_book)
                .put(replace_book)
                .delete(delete_book),
        )
        .route_layer(from_fn_with_state(tokens, require_identity))
        .route("/health", get(health_check))
        .with_state(service)
}

/// Anonymous read-only view of published books.
pub fn public_routes(service: Arc<BookService>) -> Router {
    Router::new()
        .route("/", get(list_published))
        .route("/{id}", get(get_published))
        .route("/health", get(health_check))
        .with_state(service)
}

async fn health_check() -> &'static str {
    "ok"
}

async fn list_owned(
    State(service): Books,
    Extension(identity): Extension<IdentityTokenPayload>,
    ValidQuery(filter): ValidQuery<BookFilter>,
) -> Result<Json<Vec<StoredBook>>, AppError> {
    let books = service
        .find_many(&Scope::owner(identity.user_id), &filter)
        .await?;
    Ok(Json(books))
}

async fn get_owned(
    State(service): Books,
    Extension(identity): Extension<IdentityTokenPayload>,
    UuidPath(id): UuidPath,
) -> Result<Json<StoredBook>, AppError> {
    Ok(Json(service.find_one(id, &Scope::owner(identity.user_id)).await?))
}

async fn create_book(
    State(service): Books,
    Extension(identity): Extension<IdentityTokenPayload>,
    ValidJson(draft): ValidJson<BookDraft>,
) -> Result<Json<StoredBook>, AppError> {
    Ok(Json(service.create(draft, &identity.user_id).await?))
}

async fn patch_book(
    State(service): Books,
    Extension(identity): Extension<IdentityTokenPayload>,
    UuidPath(id): UuidPath,
    ValidJson(patch): ValidJson<BookPatch>,
) -> Result<Json<StoredBook>, AppError> {
    Ok(Json(service.patch(id, patch, &identity.user_id).await?))
}

async fn replace_book(
    State(service): Books,
    Extension(identity): Extension<IdentityTokenPayload>,
    UuidPath(id): UuidPath,
    ValidJson(draft): ValidJson<BookDraft>,
) -> Result<Json<StoredBook>, AppError> {
    Ok(Json(service.replace(id, draft, &identity.user_id).await?))
}

async fn delete_book(
    State(service): Books,
    Extension(identity): Extension<IdentityTokenPayload>,
    UuidPath(id): UuidPath,
) -> Result<StatusCode, AppError> {
    service.delete(id, &identity.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_published(
    State(service): Books,
    ValidQuery(filter): ValidQuery<BookFilter>,
) -> Result<Json<Vec<StoredBook>>, AppError> {
    Ok(Json(service.find_many(&Scope::Public, &filter).await?))
}

async fn get_published(
    State(service): Books,
    UuidPath(id): UuidPath,
) -> Result<Json<StoredBook>, AppError> {
    Ok(Json(service.find_one(id, &Scope::Public).await?))
}

/// OpenAPI fragment shared by both book surfaces.
pub(crate) fn book_schemas() -> serde_json::Value {
    json!({
        "Book": {
            "type": "object",
            "properties": {
                "id": { "type": "string", "format": "uuid" },
                "authorId": { "type": "string" },
                "title": { "type": "string" },
                "description": { "type": "string" },
                "price": { "type": "integer", "description": "Price in cents" },
                "coverImage": { "type": "string" },
                "published": { "type": "boolean" },
                "publishedAt": { "type": "integer", "description": "Epoch milliseconds" },
                "unpublishedAt": { "type": "integer", "description": "Epoch milliseconds" },
                "createdAt": { "type": "integer", "description": "Epoch milliseconds" },
                "updatedAt": { "type": "integer", "description": "Epoch milliseconds" }
            },
            "required": [
                "id", "authorId", "title", "description", "price",
                "coverImage", "published", "createdAt", "updatedAt"
            ]
        },
        "BookDraft": {
            "type": "object",
            "properties": {
                "title": { "type": "string", "minLength": 1 },
                "description": { "type": "string" },
                "price": { "type": "integer", "minimum": 0 },
                "coverImage": { "type": "string" },
                "published": { "type": "boolean" }
            },
            "required": ["title", "description", "price", "coverImage"],
            "additionalProperties": false
        },
        "BookPatch": {
            "type": "object",
            "properties": {
                "title": { "type": "string", "minLength": 1 },
                "description": { "type": "string" },
                "price": { "type": "integer", "minimum": 0 },
                "coverImage": { "type": "string" },
                "published": { "type": "boolean" }
            },
            "additionalProperties": false
        }
    })
}

pub(crate) fn error_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

pub(crate) fn book_response(description: &str, many: bool) -> serde_json::Value {
    let book = json!({ "$ref": "#/components/schemas/Book" });
    let schema = if many {
        json!({ "type": "array", "items": book })
    } else {
        book
    };
    json!({
        "description": description,
        "content": { "application/json": { "schema": schema } }
    })
}

pub(crate) fn filter_parameters(owner: bool) -> serde_json::Value {
    let mut parameters = vec![json!({
        "name": "title",
        "in": "query",
        "required": false,
        "schema": { "type": "string" }
    })];
    if owner {
        parameters.push(json!({
            "name": "published",
            "in": "query",
            "required": false,
            "schema": { "type": "boolean" }
        }));
    }
    serde_json::Value::Array(parameters)
}

pub(crate) fn id_parameter() -> serde_json::Value {
    json!([{
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "string", "format": "uuid" }
    }])
}
