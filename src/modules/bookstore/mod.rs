use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use serde_json::json;
use shelf_kernel::{InitCtx, Module};

use super::books::routes::{
    book_response, book_schemas, error_response, filter_parameters, id_parameter, public_routes,
};
use super::books::service::BookService;

/// Anonymous storefront listing published books under `/api/bookstore`.
pub struct BookstoreModule {
    service: Arc<BookService>,
}

impl BookstoreModule {
    pub fn new(service: Arc<BookService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Module for BookstoreModule {
    fn name(&self) -> &'static str {
        "bookstore"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "bookstore module initialized");
        Ok(())
    }

    fn routes(&self) -> Router {
        public_routes(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List published books",
                        "tags": ["Bookstore"],
                        "parameters": filter_parameters(false),
                        "responses": {
                            "200": book_response("Published books", true),
                            "400": error_response("Invalid query parameters")
                        }
                    }
                },
                "/{id}": {
                    "parameters": id_parameter(),
                    "get": {
                        "summary": "Get a published book",
                        "tags": ["Bookstore"],
                        "responses": {
                            "200": book_response("The book", false),
                            "400": error_response("Invalid input"),
                            "404": error_response("No such published book")
                        }
                    }
                },
                "/health": {
                    "get": {
                        "summary": "Bookstore health check",
                        "tags": ["Bookstore"],
                        "responses": { "200": { "description": "OK" } }
                    }
                }
            },
            "components": { "schemas": book_schemas() }
        }))
    }
}
