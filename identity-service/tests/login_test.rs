//! User-domain signup, login, and session validation over HTTP.

mod common;

use axum::http::StatusCode;
use common::{assert_status_and_json, body_json, session_cookie, spawn_app};
use serde_json::json;

#[tokio::test]
async fn test_signup_normalizes_email_and_establishes_session() {
    let app = spawn_app();

    let response = app
        .post_json(
            "/api/auth/signup",
            json!({ "email": "Alice@Example.COM", "password": "password123", "name": "Alice" }),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = session_cookie(&response, "session").expect("signup should set session cookie");

    let body = body_json(response).await;
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["name"], "Alice");
    assert!(body.get("password_hash").is_none(), "responses must not leak credentials");

    let response = app.get("/api/auth/me", Some(&cookie)).await;
    let body = assert_status_and_json(response, StatusCode::OK).await;
    assert_eq!(body["email"], "alice@example.com");
}

#[tokio::test]
async fn test_login_accepts_any_email_casing() {
    let app = spawn_app();

    app.post_json(
        "/api/auth/signup",
        json!({ "email": "bob@example.com", "password": "password123" }),
        None,
    )
    .await;

    let response = app
        .post_json(
            "/api/auth/login",
            json!({ "email": "BOB@example.com", "password": "password123" }),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response, "session").is_some());
}

#[tokio::test]
async fn test_login_rejects_bad_credentials_uniformly() {
    let app = spawn_app();

    app.post_json(
        "/api/auth/signup",
        json!({ "email": "carol@example.com", "password": "password123" }),
        None,
    )
    .await;

    // Wrong password
    let response = app
        .post_json(
            "/api/auth/login",
            json!({ "email": "carol@example.com", "password": "wrong-password" }),
            None,
        )
        .await;
    let wrong_password = assert_status_and_json(response, StatusCode::UNAUTHORIZED).await;

    // Unknown account
    let response = app
        .post_json(
            "/api/auth/login",
            json!({ "email": "nobody@example.com", "password": "password123" }),
            None,
        )
        .await;
    let unknown_email = assert_status_and_json(response, StatusCode::UNAUTHORIZED).await;

    // The two failures are indistinguishable
    assert_eq!(wrong_password, unknown_email);
}

#[tokio::test]
async fn test_login_after_logout_issues_a_fresh_session() {
    let app = spawn_app();

    let response = app
        .post_json(
            "/api/auth/signup",
            json!({ "email": "dave@example.com", "password": "password123" }),
            None,
        )
        .await;
    let old_cookie = session_cookie(&response, "session").expect("signup should set cookie");

    app.post_empty("/api/auth/logout", Some(&old_cookie)).await;

    let response = app
        .post_json(
            "/api/auth/login",
            json!({ "email": "dave@example.com", "password": "password123" }),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let new_cookie = session_cookie(&response, "session").expect("login should set cookie");
    assert_ne!(old_cookie, new_cookie);

    let response = app.get("/api/auth/me", Some(&new_cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get("/api/auth/me", Some(&old_cookie)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signup_validates_input() {
    let app = spawn_app();

    let response = app
        .post_json(
            "/api/auth/signup",
            json!({ "email": "not-an-email", "password": "password123" }),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .post_json(
            "/api/auth/signup",
            json!({ "email": "eve@example.com", "password": "short" }),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_me_requires_a_session() {
    let app = spawn_app();

    let response = app.get("/api/auth/me", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
