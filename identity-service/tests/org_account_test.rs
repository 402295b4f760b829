//! Organization accounts: signup, uniqueness, domain isolation over HTTP,
//! and repository references.

mod common;

use axum::http::StatusCode;
use common::{assert_status_and_json, session_cookie, spawn_app};
use serde_json::json;

fn org_signup_body(email: &str) -> serde_json::Value {
    json!({
        "email": email,
        "password": "password123",
        "org_name": "Acme",
        "github_org_name": "acme-dev",
        "description": "Tooling for orchards"
    })
}

#[tokio::test]
async fn test_org_signup_and_me_round_trip() {
    let app = spawn_app();

    let response = app
        .post_json("/api/org/auth/signup", org_signup_body("Team@Acme.IO"), None)
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie =
        session_cookie(&response, "org_session").expect("org signup should set org_session cookie");

    let response = app.get("/api/org/auth/me", Some(&cookie)).await;
    let body = assert_status_and_json(response, StatusCode::OK).await;
    assert_eq!(body["email"], "team@acme.io");
    assert_eq!(body["org_name"], "Acme");
    assert_eq!(body["github_org_name"], "acme-dev");
    assert_eq!(body["repositories"], json!([]));
}

#[tokio::test]
async fn test_duplicate_org_email_is_case_insensitive() {
    let app = spawn_app();

    let response = app
        .post_json("/api/org/auth/signup", org_signup_body("dev@acme.io"), None)
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .post_json("/api/org/auth/signup", org_signup_body("DEV@Acme.io"), None)
        .await;
    let body = assert_status_and_json(response, StatusCode::CONFLICT).await;
    assert_eq!(body["error"], "Email already registered");
}

#[tokio::test]
async fn test_user_session_never_authenticates_org_routes() {
    let app = spawn_app();

    let response = app
        .post_json(
            "/api/auth/signup",
            json!({ "email": "alice@example.com", "password": "password123" }),
            None,
        )
        .await;
    let user_cookie = session_cookie(&response, "session").expect("signup should set cookie");

    // The user cookie name is not even read by the org guard
    let response = app.get("/api/org/auth/me", Some(&user_cookie)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // A user token smuggled under the org cookie name still fails:
    // the token is bound to the user domain in the store
    let token = user_cookie
        .split_once('=')
        .map(|(_, v)| v.to_string())
        .expect("cookie pair should have a value");
    let smuggled = format!("org_session={}", token);
    let response = app.get("/api/org/auth/me", Some(&smuggled)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_repositories_append_in_order() {
    let app = spawn_app();

    let response = app
        .post_json("/api/org/auth/signup", org_signup_body("team@acme.io"), None)
        .await;
    let cookie = session_cookie(&response, "org_session").expect("signup should set cookie");

    let response = app
        .post_json(
            "/api/org/repositories",
            json!({ "repo_name": "alpha", "repo_url": "https://github.com/acme-dev/alpha" }),
            Some(&cookie),
        )
        .await;
    let body = assert_status_and_json(response, StatusCode::CREATED).await;
    assert_eq!(body["repo_name"], "alpha");
    assert!(body.get("added_at").is_some());

    let response = app
        .post_json(
            "/api/org/repositories",
            json!({ "repo_name": "beta", "repo_url": "https://github.com/acme-dev/beta" }),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.get("/api/org/auth/me", Some(&cookie)).await;
    let body = assert_status_and_json(response, StatusCode::OK).await;
    let repos = body["repositories"]
        .as_array()
        .expect("repositories should be a list");
    assert_eq!(repos.len(), 2);
    assert_eq!(repos[0]["repo_name"], "alpha");
    assert_eq!(repos[1]["repo_name"], "beta");
}

#[tokio::test]
async fn test_add_repository_requires_an_org_session() {
    let app = spawn_app();

    let response = app
        .post_json(
            "/api/org/repositories",
            json!({ "repo_name": "alpha", "repo_url": "https://github.com/acme-dev/alpha" }),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_add_repository_validates_url() {
    let app = spawn_app();

    let response = app
        .post_json("/api/org/auth/signup", org_signup_body("team@acme.io"), None)
        .await;
    let cookie = session_cookie(&response, "org_session").expect("signup should set cookie");

    let response = app
        .post_json(
            "/api/org/repositories",
            json!({ "repo_name": "alpha", "repo_url": "not a url" }),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
