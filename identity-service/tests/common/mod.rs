//! Test helper module for identity-service integration tests.
//!
//! Builds the real router on top of the in-memory store implementations,
//! so the full HTTP surface runs without MongoDB or Redis.

#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use identity_service::{
    AppState, build_router,
    config::{
        Environment, IdentityConfig, MongoConfig, RateLimitConfig, RedisConfig, SecurityConfig,
        SessionConfig,
    },
    services::{AuthService, MemoryAccounts, MemorySessionStore, SessionManager},
};
use service_core::middleware::rate_limit::create_ip_rate_limiter;
use std::sync::Arc;
use tower::util::ServiceExt;

pub fn test_config() -> IdentityConfig {
    IdentityConfig {
        common: service_core::config::Config { port: 8080 },
        environment: Environment::Dev,
        service_name: "identity-service".to_string(),
        service_version: "test".to_string(),
        log_level: "error".to_string(),
        mongodb: MongoConfig {
            uri: "mongodb://unused".to_string(),
            database: "unused".to_string(),
        },
        redis: RedisConfig {
            url: "redis://unused".to_string(),
        },
        session: SessionConfig {
            ttl_hours: 168,
            cookie_secure: false,
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
        rate_limit: RateLimitConfig {
            login_attempts: 1000,
            login_window_seconds: 60,
            signup_attempts: 1000,
            signup_window_seconds: 60,
            global_ip_limit: 10_000,
            global_ip_window_seconds: 60,
        },
    }
}

pub struct TestApp {
    pub app: Router,
    pub sessions: Arc<MemorySessionStore>,
    pub accounts: Arc<MemoryAccounts>,
}

pub fn spawn_app() -> TestApp {
    let config = test_config();

    let session_store = Arc::new(MemorySessionStore::new());
    let accounts = Arc::new(MemoryAccounts::new());

    let sessions = SessionManager::new(
        session_store.clone(),
        config.session.ttl_hours,
        config.session.cookie_secure,
    );
    let auth = AuthService::new(accounts.clone(), sessions.clone());

    let state = AppState {
        config: config.clone(),
        accounts: accounts.clone(),
        sessions,
        auth,
        login_rate_limiter: create_ip_rate_limiter(
            config.rate_limit.login_attempts,
            config.rate_limit.login_window_seconds,
        ),
        signup_rate_limiter: create_ip_rate_limiter(
            config.rate_limit.signup_attempts,
            config.rate_limit.signup_window_seconds,
        ),
        ip_rate_limiter: create_ip_rate_limiter(
            config.rate_limit.global_ip_limit,
            config.rate_limit.global_ip_window_seconds,
        ),
    };

    let app = build_router(state).expect("Failed to build router");

    TestApp {
        app,
        sessions: session_store,
        accounts,
    }
}

impl TestApp {
    pub async fn post_json(
        &self,
        uri: &str,
        body: serde_json::Value,
        cookie: Option<&str>,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = builder
            .body(Body::from(body.to_string()))
            .expect("Failed to build request");

        self.app
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed")
    }

    pub async fn post_empty(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("POST").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = builder.body(Body::empty()).expect("Failed to build request");

        self.app
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed")
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = builder.body(Body::empty()).expect("Failed to build request");

        self.app
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed")
    }
}

/// Pull a named cookie out of the response's Set-Cookie headers as a
/// `name=value` pair ready for a Cookie request header.
pub fn session_cookie(response: &Response<Body>, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|raw| raw.split(';').next())
        .map(str::trim)
        .find(|pair| {
            pair.strip_prefix(name)
                .and_then(|rest| rest.strip_prefix('='))
                .is_some_and(|value| !value.is_empty())
        })
        .map(str::to_string)
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("Body was not valid JSON")
}

pub async fn assert_status_and_json(
    response: Response<Body>,
    status: StatusCode,
) -> serde_json::Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}
