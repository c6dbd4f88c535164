use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use shelf_app::App;
use shelf_kernel::settings::Settings;
use tower::ServiceExt;

async fn app() -> Router {
    let settings = Settings::default();
    let app = App::new(&settings).unwrap();
    app.init(&settings).await.unwrap();
    app.router(&settings)
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(body) => {
            builder = builder.header("content-type", "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn login(router: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        router,
        Method::POST,
        "/api/auth",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["tokenType"], "Bearer");
    assert!(body["expiresAt"].is_i64());
    body["token"].as_str().unwrap().to_string()
}

fn book(title: &str) -> Value {
    json!({
        "title": title,
        "description": "A test book",
        "price": 1500,
        "coverImage": "https://some-image-url.png"
    })
}

#[tokio::test]
async fn authentication_rejects_bad_input() {
    let router = app().await;

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/auth",
        None,
        Some(json!({ "username": "john-doe", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Not matching username / password");

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/auth",
        None,
        Some(json!({ "username": "john-doe" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn owner_routes_require_a_valid_token() {
    let router = app().await;

    let (status, _) = send(&router, Method::GET, "/api/books", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&router, Method::GET, "/api/books", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthorized");

    let (status, _) = send(&router, Method::GET, "/api/books/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn owner_sees_only_their_seeded_books() {
    let router = app().await;
    let token = login(&router, "john-doe", "YAY").await;

    let (status, body) = send(&router, Method::GET, "/api/books", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let books = body.as_array().unwrap();
    assert_eq!(books.len(), 2);
    assert!(books
        .iter()
        .all(|book| book["authorId"] == "john-doe-uuid-string"));

    let (status, body) = send(
        &router,
        Method::GET,
        "/api/books?published=false",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "Book A");

    let (status, _) = send(
        &router,
        Method::GET,
        "/api/books?published=sometimes",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn book_lifecycle_over_http() {
    let router = app().await;
    let token = login(&router, "john-doe", "YAY").await;

    let (status, created) = send(
        &router,
        Method::POST,
        "/api/books",
        Some(&token),
        Some(book("Rust in Action")),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{created}");
    assert_eq!(created["authorId"], "john-doe-uuid-string");
    assert_eq!(created["published"], false);
    assert!(created.get("publishedAt").is_none());
    let uri = format!("/api/books/{}", created["id"].as_str().unwrap());

    let (status, _) = send(
        &router,
        Method::POST,
        "/api/books",
        Some(&token),
        Some(book("Rust in Action")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, patched) = send(
        &router,
        Method::PATCH,
        &uri,
        Some(&token),
        Some(json!({ "published": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["published"], true);
    assert!(patched["publishedAt"].is_i64());
    assert!(patched.get("unpublishedAt").is_none());

    let (status, public) = send(&router, Method::GET, "/api/bookstore", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(public
        .as_array()
        .unwrap()
        .iter()
        .any(|book| book["id"] == created["id"]));

    let (status, replaced) = send(
        &router,
        Method::PUT,
        &uri,
        Some(&token),
        Some(book("Rust in Action, 2nd ed.")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced["title"], "Rust in Action, 2nd ed.");
    assert_eq!(replaced["published"], false);
    assert!(replaced["unpublishedAt"].is_i64());
    assert_eq!(replaced["createdAt"], created["createdAt"]);

    let (status, _) = send(&router, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&router, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Book not found");
}

#[tokio::test]
async fn invalid_drafts_and_ids_are_rejected() {
    let router = app().await;
    let token = login(&router, "john-doe", "YAY").await;

    let mut invalid = book("  ");
    invalid["price"] = json!(-1);
    let (status, body) = send(&router, Method::POST, "/api/books", Some(&token), Some(invalid)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"].as_array().unwrap().len(), 2);

    let mut smuggled = book("Smuggled");
    smuggled["authorId"] = json!("darth-vader-id");
    let (status, _) = send(&router, Method::POST, "/api/books", Some(&token), Some(smuggled)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&router, Method::GET, "/api/books/not-a-uuid", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn foreign_books_are_indistinguishable_from_missing() {
    let router = app().await;
    let john = login(&router, "john-doe", "YAY").await;
    let vader = login(&router, "darth-vader", "NOO").await;

    let (_, created) = send(&router, Method::POST, "/api/books", Some(&john), Some(book("Private"))).await;
    let uri = format!("/api/books/{}", created["id"].as_str().unwrap());

    for method in [Method::GET, Method::DELETE] {
        let (status, _) = send(&router, method, &uri, Some(&vader), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
    let (status, _) = send(
        &router,
        Method::PATCH,
        &uri,
        Some(&vader),
        Some(json!({ "price": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let public_uri = format!("/api/bookstore/{}", created["id"].as_str().unwrap());
    let (status, _) = send(&router, Method::GET, &public_uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&router, Method::GET, &uri, Some(&john), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn policy_blocks_embargoed_publishing() {
    let router = app().await;
    let token = login(&router, "darth-vader", "NOO").await;

    let mut published = book("Death Star Plans");
    published["published"] = json!(true);
    let (status, body) = send(&router, Method::POST, "/api/books", Some(&token), Some(published)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "forbidden");

    let (_, mine) = send(&router, Method::GET, "/api/books", Some(&token), None).await;
    let seeded = &mine.as_array().unwrap()[0];
    let uri = format!("/api/books/{}", seeded["id"].as_str().unwrap());

    let (status, _) = send(
        &router,
        Method::PATCH,
        &uri,
        Some(&token),
        Some(json!({ "published": true })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, after) = send(&router, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(after["published"], false);
    assert_eq!(after["updatedAt"], seeded["updatedAt"]);
}

#[tokio::test]
async fn bookstore_lists_only_published_books() {
    let router = app().await;

    let (status, body) = send(
        &router,
        Method::GET,
        "/api/bookstore?published=false",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let books = body.as_array().unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["title"], "Book B");

    let (status, body) = send(&router, Method::GET, "/api/bookstore?title=Book%20A", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn users_directory_and_docs_are_public() {
    let router = app().await;

    let (status, body) = send(&router, Method::GET, "/api/users", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, spec) = send(&router, Method::GET, "/docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    for path in [
        "/api/auth/",
        "/api/books/",
        "/api/books/{id}",
        "/api/bookstore/",
        "/api/users/{id}",
    ] {
        assert!(spec["paths"].get(path).is_some(), "{path}");
    }
}

#[test]
fn merged_api_document_is_valid_openapi() {
    let app = App::new(&Settings::default()).unwrap();
    let document = shelf_http::router::collect_openapi(&app.registry);

    let parsed = serde_json::from_value::<utoipa::openapi::OpenApi>(document);
    let parsed = match parsed {
        Ok(parsed) => parsed,
        Err(e) => panic!("merged document does not parse: {e}"),
    };
    for path in ["/api/auth/", "/api/books/{id}", "/api/bookstore/", "/api/users/"] {
        assert!(parsed.paths.paths.contains_key(path), "{path}");
    }
}
