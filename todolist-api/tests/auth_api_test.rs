/// Integration tests for registration, login and the bearer-token layer

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use common::TestContext;
use serde_json::json;
use tower::Service as _;

#[tokio::test]
async fn test_register_returns_bearer_token() {
    let ctx = TestContext::new();

    let response = ctx
        .send(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "email": "a@x.com", "password": "pw123456" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["access_token"].is_string());
    assert_eq!(response.body["token_type"], "Bearer");
    assert_eq!(response.body["expires_in"], 3600);
    assert_eq!(ctx.store.account_count().await, 1);
}

#[tokio::test]
async fn test_register_then_login_share_identity() {
    let ctx = TestContext::new();
    let registered = ctx.register("a@x.com", "pw123456").await;

    let response = ctx
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "a@x.com", "password": "pw123456" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let logged_in = response.body["access_token"].as_str().unwrap().to_string();

    // A task created with one token is visible with the other
    ctx.create_task(&registered, "shared").await;
    let list = ctx.send(Method::GET, "/tasks", Some(&logged_in), None).await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let ctx = TestContext::new();
    ctx.register("a@x.com", "pw123456").await;

    let response = ctx
        .send(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "email": "A@X.com", "password": "different-pw" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "conflict");
    assert_eq!(ctx.store.account_count().await, 1);
}

#[tokio::test]
async fn test_register_validation() {
    let ctx = TestContext::new();

    let bad_email = ctx
        .send(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "email": "not-an-email", "password": "pw123456" })),
        )
        .await;
    assert_eq!(bad_email.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_email.body["error"], "validation_error");
    assert_eq!(bad_email.body["details"][0]["field"], "email");

    let short_password = ctx
        .send(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "email": "a@x.com", "password": "short" })),
        )
        .await;
    assert_eq!(short_password.status, StatusCode::BAD_REQUEST);
    assert_eq!(short_password.body["details"][0]["field"], "password");

    assert_eq!(ctx.store.account_count().await, 0);
}

#[tokio::test]
async fn test_register_accepts_padded_mixed_case_email() {
    let ctx = TestContext::new();

    let registered = ctx
        .send(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "email": "  A@X.com ", "password": "pw123456" })),
        )
        .await;
    assert_eq!(registered.status, StatusCode::OK);
    assert_eq!(ctx.store.account_count().await, 1);

    let login = ctx
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "a@x.com", "password": "pw123456" })),
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);

    // Blank after trimming is still rejected
    let blank = ctx
        .send(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "email": "   ", "password": "pw123456" })),
        )
        .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    assert_eq!(blank.body["details"][0]["field"], "email");
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = ctx.send_request(request).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "bad_request");
}

#[tokio::test]
async fn test_login_failures_are_identical() {
    let ctx = TestContext::new();
    ctx.register("a@x.com", "pw123456").await;

    let wrong_password = ctx
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "a@x.com", "password": "wrong-password" })),
        )
        .await;
    let unknown_email = ctx
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "nobody@x.com", "password": "pw123456" })),
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown_email.body);
    assert_eq!(wrong_password.body["message"], "invalid credentials");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let ctx = TestContext::new();

    let missing = ctx.send(Method::GET, "/tasks", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.body["error"], "unauthorized");

    let garbage = ctx.send(Method::GET, "/tasks", Some("not.a.jwt"), None).await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
    assert_eq!(garbage.body, missing.body);

    let basic = Request::builder()
        .method(Method::GET)
        .uri("/tasks")
        .header(header::AUTHORIZATION, "Basic YTpi")
        .body(Body::empty())
        .unwrap();
    assert_eq!(ctx.send_request(basic).await.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unauthenticated_create_never_parses_body() {
    let ctx = TestContext::new();

    // Invalid JSON would be a 400 if the handler ran
    let request = Request::builder()
        .method(Method::POST)
        .uri("/tasks")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = ctx.send_request(request).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(ctx.store.task_count().await, 0);
}

#[tokio::test]
async fn test_token_from_other_secret_rejected() {
    use chrono::Duration;
    use todolist_shared::auth::jwt::TokenIssuer;

    let ctx = TestContext::new();
    let forged = TokenIssuer::new("some-other-secret-that-is-32-bytes-long", Duration::hours(1))
        .issue(1, "a@x.com")
        .unwrap();

    let response = ctx.send(Method::GET, "/tasks", Some(&forged), None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_and_security_headers() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = ctx.app.clone().call(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("X-Content-Type-Options").unwrap(),
        "nosniff"
    );

    let health = ctx.send(Method::GET, "/health", None, None).await;
    assert_eq!(health.body["status"], "healthy");
    assert_eq!(health.body["database"], "connected");
}
