pub mod models;
pub mod policy;
pub mod routes;
pub mod seed;
pub mod service;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use chrono::Utc;
use serde_json::json;
use shelf_authz::TokenIssuer;
use shelf_kernel::{InitCtx, Module};

use routes::{book_response, book_schemas, error_response, filter_parameters, id_parameter};
use service::BookService;

/// Owner-scoped book management under `/api/books`.
pub struct BooksModule {
    service: Arc<BookService>,
    tokens: Arc<TokenIssuer>,
}

impl BooksModule {
    pub fn new(service: Arc<BookService>, tokens: Arc<TokenIssuer>) -> Self {
        Self { service, tokens }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        if ctx.settings.store.seed {
            self.service.seed(seed::seed_books(Utc::now())).await?;
        }
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::owner_routes(self.service.clone(), self.tokens.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let secured = json!([{ "bearerAuth": [] }]);
        let unauthorized = error_response("Missing, invalid or expired token");
        let not_found = error_response("No such book for this author");
        let invalid = error_response("Invalid input");

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List the caller's books",
                        "tags": ["Books"],
                        "security": secured,
                        "parameters": filter_parameters(true),
                        "responses": {
                            "200": book_response("Books owned by the caller", true),
                            "400": invalid,
                            "401": unauthorized
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "security": secured,
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/BookDraft" }
                                }
                            }
                        },
                        "responses": {
                            "200": book_response("Created book", false),
                            "400": invalid,
                            "401": unauthorized,
                            "403": error_response("Rejected by policy"),
                            "409": error_response("Duplicate title")
                        }
                    }
                },
                "/{id}": {
                    "parameters": id_parameter(),
                    "get": {
                        "summary": "Get one of the caller's books",
                        "tags": ["Books"],
                        "security": secured,
                        "responses": {
                            "200": book_response("The book", false),
                            "400": invalid,
                            "401": unauthorized,
                            "404": not_found
                        }
                    },
                    "patch": {
                        "summary": "Update some fields of a book",
                        "tags": ["Books"],
                        "security": secured,
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/BookPatch" }
                                }
                            }
                        },
                        "responses": {
                            "200": book_response("Updated book", false),
                            "400": invalid,
                            "401": unauthorized,
                            "403": error_response("Rejected by policy"),
                            "404": not_found,
                            "409": error_response("Duplicate title")
                        }
                    },
                    "put": {
                        "summary": "Replace a book",
                        "tags": ["Books"],
                        "security": secured,
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/BookDraft" }
                                }
                            }
                        },
                        "responses": {
                            "200": book_response("Replaced book", false),
                            "400": invalid,
                            "401": unauthorized,
                            "403": error_response("Rejected by policy"),
                            "404": not_found,
                            "409": error_response("Duplicate title")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "security": secured,
                        "responses": {
                            "204": { "description": "Deleted" },
                            "400": invalid,
                            "401": unauthorized,
                            "404": not_found
                        }
                    }
                },
                "/health": {
                    "get": {
                        "summary": "Books health check",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "OK",
                                "content": { "text/plain": { "schema": { "type": "string" } } }
                            }
                        }
                    }
                }
            },
            "components": { "schemas": book_schemas() }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}
