//! HTTP-level tests driven through the router

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use libris_server::api;

async fn test_app() -> Router {
    api::create_router(common::test_state().await)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, body)
}

/// Register a user and return a login token
async fn register_and_login(app: &Router, username: &str) -> String {
    let creds = json!({"username": username, "password": "secret"});

    let (status, _) = send(app, "POST", "/api/v1/auth/register", None, Some(creds.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(app, "POST", "/api/v1/auth/login", None, Some(creds)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_endpoint_is_public() {
    let app = test_app().await;

    let (status, body) = send(&app, "GET", "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn unauthenticated_requests_are_rejected() {
    let app = test_app().await;

    let (status, body) = send(&app, "GET", "/api/v1/books", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "NotAuthorized");

    let (status, _) = send(&app, "POST", "/api/v1/books/1/borrow", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/v1/history", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_admin_cannot_manage_catalog_or_users() {
    let app = test_app().await;
    let token = register_and_login(&app, "alice").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/books",
        Some(&token),
        Some(json!({"title": "Dune", "author": "Herbert"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "NotAuthorized");

    let (status, _) = send(&app, "GET", "/api/v1/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn invalid_login_is_unauthorized() {
    let app = test_app().await;
    register_and_login(&app, "alice").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({"username": "alice", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_trims_username_before_validating() {
    let app = test_app().await;

    // Padding must not carry a too-short username past the length check
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({"username": "  ab ", "password": "secret"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");

    // A valid padded username registers trimmed and can log in trimmed
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({"username": "  charlie  ", "password": "secret"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "charlie");

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({"username": "charlie", "password": "secret"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = test_app().await;
    register_and_login(&app, "alice").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({"username": "alice", "password": "secret"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Duplicate");
}

#[tokio::test]
async fn register_login_borrow_history_flow() {
    let app = test_app().await;

    // James1 is on the admin allow-list
    let admin_token = register_and_login(&app, "James1").await;

    let (status, body) = send(&app, "GET", "/api/v1/auth/me", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "James1");
    assert_eq!(body["role"], "admin");

    let (status, book) = send(
        &app,
        "POST",
        "/api/v1/books",
        Some(&admin_token),
        Some(json!({"title": "Dune", "author": "Herbert", "year": "1965", "language": "English"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(book["available"], true);
    let book_id = book["id"].as_i64().unwrap();

    let token = register_and_login(&app, "alice").await;

    // Dashboard search finds the book case-insensitively
    let (status, hits) = send(&app, "GET", "/api/v1/books?q=dune", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hits.as_array().unwrap().len(), 1);

    // Borrow succeeds once
    let uri = format!("/api/v1/books/{}/borrow", book_id);
    let (status, body) = send(&app, "POST", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "borrowed");
    assert_eq!(body["entry"]["username"], "alice");

    // A second borrow conflicts
    let (status, body) = send(&app, "POST", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "BookUnavailable");

    // Return flips it back
    let uri = format!("/api/v1/books/{}/return", book_id);
    let (status, body) = send(&app, "POST", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "returned");

    // Returning again conflicts
    let (status, body) = send(&app, "POST", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "BookNotBorrowed");

    // History is most recent first
    let (status, history) = send(&app, "GET", "/api/v1/history", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let history = history.as_array().unwrap().clone();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["status"], "returned");
    assert_eq!(history[1]["status"], "borrowed");
    assert_eq!(history[0]["title"], "Dune");
}

#[tokio::test]
async fn admin_manages_users() {
    let app = test_app().await;
    let admin_token = register_and_login(&app, "James1").await;
    register_and_login(&app, "alice").await;

    let (status, users) = send(&app, "GET", "/api/v1/users", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let users = users.as_array().unwrap().clone();
    assert_eq!(users.len(), 2);
    // Password hashes never serialize out
    assert!(users[0].get("password_hash").is_none());

    let alice_id = users
        .iter()
        .find(|u| u["username"] == "alice")
        .unwrap()["id"]
        .as_i64()
        .unwrap();

    // Promote alice to admin
    let uri = format!("/api/v1/users/{}", alice_id);
    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(&admin_token),
        Some(json!({"role": "admin"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "admin");

    // Delete her account
    let (status, _) = send(&app, "DELETE", &uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, users) = send(&app, "GET", "/api/v1/users", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_book_is_not_found() {
    let app = test_app().await;
    let token = register_and_login(&app, "alice").await;

    let (status, _) = send(&app, "GET", "/api/v1/books/9999", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "POST", "/api/v1/books/9999/borrow", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_books_and_users_carry_distinct_error_codes() {
    let app = test_app().await;
    let admin_token = register_and_login(&app, "James1").await;

    let (status, body) = send(&app, "GET", "/api/v1/books/9999", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NoSuchBook");

    let (status, body) = send(&app, "DELETE", "/api/v1/users/9999", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NoSuchUser");

    let (status, body) = send(
        &app,
        "PUT",
        "/api/v1/users/9999",
        Some(&admin_token),
        Some(json!({"role": "admin"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NoSuchUser");
}
