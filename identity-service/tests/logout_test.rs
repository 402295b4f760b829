//! Logout boundary contract for both session domains.

mod common;

use axum::http::{StatusCode, header};
use common::{body_json, session_cookie, spawn_app};
use serde_json::json;

fn logged_out_body() -> serde_json::Value {
    json!({ "success": true, "message": "Logged out successfully" })
}

#[tokio::test]
async fn test_user_logout_returns_exact_envelope_and_kills_session() {
    let app = spawn_app();

    let response = app
        .post_json(
            "/api/auth/signup",
            json!({ "email": "alice@example.com", "password": "password123" }),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = session_cookie(&response, "session").expect("signup should set session cookie");

    let response = app.post_empty("/api/auth/logout", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, logged_out_body());

    // The destroyed token must never authenticate again
    let response = app.get("/api/auth/me", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_clears_the_session_cookie() {
    let app = spawn_app();

    let response = app
        .post_json(
            "/api/auth/signup",
            json!({ "email": "bob@example.com", "password": "password123" }),
            None,
        )
        .await;
    let cookie = session_cookie(&response, "session").expect("signup should set session cookie");

    let response = app.post_empty("/api/auth/logout", Some(&cookie)).await;

    let removal = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|raw| raw.starts_with("session="))
        .expect("logout should emit a removal cookie")
        .to_string();
    assert!(
        removal.contains("Max-Age=0"),
        "removal cookie should expire immediately: {}",
        removal
    );
}

#[tokio::test]
async fn test_logout_without_cookie_is_still_success() {
    let app = spawn_app();

    let response = app.post_empty("/api/auth/logout", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, logged_out_body());
}

#[tokio::test]
async fn test_logout_twice_succeeds_both_times() {
    let app = spawn_app();

    let response = app
        .post_json(
            "/api/auth/signup",
            json!({ "email": "carol@example.com", "password": "password123" }),
            None,
        )
        .await;
    let cookie = session_cookie(&response, "session").expect("signup should set session cookie");

    for _ in 0..2 {
        let response = app.post_empty("/api/auth/logout", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, logged_out_body());
    }
}

#[tokio::test]
async fn test_logout_with_store_down_returns_fixed_error() {
    let app = spawn_app();

    let response = app
        .post_json(
            "/api/auth/signup",
            json!({ "email": "dave@example.com", "password": "password123" }),
            None,
        )
        .await;
    let cookie = session_cookie(&response, "session").expect("signup should set session cookie");

    app.sessions.set_unavailable(true);

    let response = app.post_empty("/api/auth/logout", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await, json!({ "error": "Logout failed" }));
}

#[tokio::test]
async fn test_org_logout_has_the_same_contract() {
    let app = spawn_app();

    let response = app
        .post_json(
            "/api/org/auth/signup",
            json!({
                "email": "team@acme.io",
                "password": "password123",
                "org_name": "Acme",
                "github_org_name": "acme-dev"
            }),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie =
        session_cookie(&response, "org_session").expect("org signup should set org_session cookie");

    let response = app.post_empty("/api/org/auth/logout", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, logged_out_body());

    let response = app.get("/api/org/auth/me", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // And with no cookie at all, still a success
    let response = app.post_empty("/api/org/auth/logout", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, logged_out_body());
}
