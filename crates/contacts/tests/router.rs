//! Router tests that run without a database.
//!
//! The pool connects lazily, so every request here must be answered before a
//! query is issued: authentication rejections, input validation and the
//! static endpoints.

#![allow(clippy::unwrap_used)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use rolodex_contacts::config::{CloudinaryConfig, ContactsConfig, EmailConfig, JwtConfig};
use rolodex_contacts::services::TokenIssuer;
use rolodex_contacts::state::AppState;
use rolodex_core::Email;

const JWT_SECRET: &str = "kQ9#vL2$wX7!pR4@zT8&mN3*bY6^cF1%";

fn config() -> ContactsConfig {
    ContactsConfig {
        database_url: SecretString::from("postgres://rolodex@127.0.0.1:1/rolodex_test"),
        host: "127.0.0.1".parse().unwrap(),
        port: 8000,
        jwt: JwtConfig {
            secret: SecretString::from(JWT_SECRET),
            ttl: Duration::minutes(30),
        },
        cors_origins: vec!["http://localhost:8080".to_string()],
        email: EmailConfig {
            smtp_host: "smtp.invalid".to_string(),
            smtp_port: 587,
            smtp_username: "rolodex".to_string(),
            smtp_password: SecretString::from("unused"),
            from_address: "Rolodex <noreply@rolodex.test>".to_string(),
        },
        cloudinary: CloudinaryConfig {
            cloud_name: "rolodex-test".to_string(),
            api_key: "123456".to_string(),
            api_secret: SecretString::from("unused"),
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 0.0,
        sentry_traces_sample_rate: 0.0,
    }
}

fn app() -> Router {
    let config = config();
    let pool = PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_millis(200))
        .connect_lazy("postgres://rolodex@127.0.0.1:1/rolodex_test")
        .unwrap();
    let state = AppState::new(config, pool).unwrap();
    rolodex_contacts::app(state)
}

fn request(method: &str, uri: &str) -> axum::http::request::Builder {
    request_from(method, uri, "203.0.113.10")
}

fn request_from(method: &str, uri: &str, client_ip: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-forwarded-for", client_ip)
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, body)
}

fn json_body(value: &Value) -> Body {
    Body::from(serde_json::to_vec(value).unwrap())
}

#[tokio::test]
async fn root_greets() {
    let (status, headers, body) = send(app(), request("GET", "/").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Hello World" }));
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn request_id_is_propagated() {
    let req = request("GET", "/health")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(req).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-request-id").unwrap(), "abc-123");
}

#[tokio::test]
async fn contacts_require_a_token() {
    for (method, uri) in [
        ("GET", "/api/contacts/"),
        ("POST", "/api/contacts/"),
        ("GET", "/api/contacts/1"),
        ("PUT", "/api/contacts/1"),
        ("DELETE", "/api/contacts/1"),
        ("GET", "/api/contacts/search/?query=ada"),
        ("GET", "/api/contacts/birthday/"),
    ] {
        let req = request(method, uri).body(Body::empty()).unwrap();
        let (status, headers, body) = send(app(), req).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(headers.get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
        assert_eq!(body, json!({ "detail": "Could not validate credentials" }));
    }
}

#[tokio::test]
async fn foreign_and_expired_tokens_are_rejected() {
    let email = Email::parse("ada@example.com").unwrap();

    let foreign = TokenIssuer::new(
        SecretString::from("Zx8!qW3@eR5#tY7$uI9%oP1^aS2&dF4*"),
        Duration::minutes(30),
    )
    .issue(&email, Utc::now())
    .unwrap();

    let expired = TokenIssuer::new(SecretString::from(JWT_SECRET), Duration::minutes(30))
        .issue(&email, Utc::now() - Duration::hours(1))
        .unwrap();

    for token in [foreign, expired, "not-a-jwt".to_string()] {
        let req = request("GET", "/api/contacts/")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = send(app(), req).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "Could not validate credentials");
    }
}

#[tokio::test]
async fn avatar_upload_requires_a_token() {
    let req = request("PUT", "/api/users/1/avatar/")
        .header(header::CONTENT_TYPE, "multipart/form-data; boundary=x")
        .body(Body::from("--x--\r\n"))
        .unwrap();
    let (status, _, _) = send(app(), req).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn avatar_upload_checks_token_before_path() {
    let req = request("PUT", "/api/users/abc/avatar/")
        .header(header::CONTENT_TYPE, "multipart/form-data; boundary=x")
        .body(Body::from("--x--\r\n"))
        .unwrap();
    let (status, headers, body) = send(app(), req).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(headers.get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
    assert_eq!(body["detail"], "Could not validate credentials");
}

#[tokio::test]
async fn register_validates_input() {
    let cases = [
        json!({ "email": "not-an-email", "password": "longenough" }),
        json!({ "email": "ada@example.com", "password": "short" }),
    ];

    for input in cases {
        let req = request("POST", "/api/register/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(json_body(&input))
            .unwrap();
        let (status, _, body) = send(app(), req).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{input}");
        assert!(body["detail"].is_string());
    }
}

#[tokio::test]
async fn malformed_json_uses_detail_body() {
    let req = request("POST", "/api/register/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\": "))
        .unwrap();
    let (status, _, body) = send(app(), req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn login_requires_form_fields() {
    let req = request("POST", "/api/auth/token")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("username=ada%40example.com"))
        .unwrap();
    let (status, _, body) = send(app(), req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn verify_requires_token_param() {
    let req = request("POST", "/verify/").body(Body::empty()).unwrap();
    let (status, _, _) = send(app(), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = request("POST", "/verify/?token=").body(Body::empty()).unwrap();
    let (status, _, body) = send(app(), req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "User not found" }));
}

#[tokio::test]
async fn password_reset_confirm_rejects_weak_password() {
    let req = request("POST", "/api/password-reset/confirm")
        .header(header::CONTENT_TYPE, "application/json")
        .body(json_body(&json!({ "token": "abc", "new_password": "short" })))
        .unwrap();
    let (status, _, body) = send(app(), req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "password must be at least 8 characters");
}

#[tokio::test]
async fn readiness_reports_unreachable_database() {
    let req = request("GET", "/health/ready").body(Body::empty()).unwrap();
    let response = app().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn rate_limit_applies_per_route() {
    let app = app();
    let mut last = StatusCode::OK;
    for _ in 0..11 {
        let req = request_from("POST", "/verify/?token=", "198.51.100.77")
            .body(Body::empty())
            .unwrap();
        last = app.clone().oneshot(req).await.unwrap().status();
    }
    assert_eq!(last, StatusCode::TOO_MANY_REQUESTS);

    // A different route has its own quota
    let req = request_from("POST", "/api/password-reset/confirm", "198.51.100.77")
        .header(header::CONTENT_TYPE, "application/json")
        .body(json_body(&json!({ "token": "abc", "new_password": "short" })))
        .unwrap();
    assert_eq!(
        app.clone().oneshot(req).await.unwrap().status(),
        StatusCode::BAD_REQUEST
    );

    // Another client address on the exhausted route is unaffected
    let req = request_from("POST", "/verify/?token=", "198.51.100.78")
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.oneshot(req).await.unwrap().status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rate_limited_response_uses_detail_body() {
    let app = app();
    for _ in 0..10 {
        let req = request_from("POST", "/verify/?token=", "198.51.100.90")
            .body(Body::empty())
            .unwrap();
        app.clone().oneshot(req).await.unwrap();
    }

    let req = request_from("POST", "/verify/?token=", "198.51.100.90")
        .body(Body::empty())
        .unwrap();
    let (status, headers, body) = send(app, req).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        headers.get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    assert!(headers.contains_key(header::RETRY_AFTER));
    assert_eq!(body, json!({ "detail": "Too many requests" }));
}

#[tokio::test]
async fn cors_preflight_allows_configured_origin() {
    let req = Request::builder()
        .method("OPTIONS")
        .uri("/api/contacts/")
        .header("x-forwarded-for", "203.0.113.10")
        .header(header::ORIGIN, "http://localhost:8080")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(req).await.unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:8080"
    );
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .unwrap(),
        "true"
    );
}
