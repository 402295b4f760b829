pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use service_core::error::AppError;
use service_core::middleware::{
    rate_limit::ip_rate_limit_middleware, security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::IdentityConfig;
use crate::services::{AccountStore, AuthService, SessionManager};

#[derive(Clone)]
pub struct AppState {
    pub config: IdentityConfig,
    pub accounts: Arc<dyn AccountStore>,
    pub sessions: SessionManager,
    pub auth: AuthService,
    pub login_rate_limiter: service_core::middleware::rate_limit::IpRateLimiter,
    pub signup_rate_limiter: service_core::middleware::rate_limit::IpRateLimiter,
    pub ip_rate_limiter: service_core::middleware::rate_limit::IpRateLimiter,
}

pub fn build_router(state: AppState) -> Result<Router, AppError> {
    // Login routes with rate limiting
    let login_limiter = state.login_rate_limiter.clone();
    let login_routes = Router::new()
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/org/auth/login", post(handlers::org::login))
        .layer(from_fn_with_state(login_limiter, ip_rate_limit_middleware));

    // Signup routes with rate limiting
    let signup_limiter = state.signup_rate_limiter.clone();
    let signup_routes = Router::new()
        .route("/api/auth/signup", post(handlers::auth::signup))
        .route("/api/org/auth/signup", post(handlers::org::signup))
        .layer(from_fn_with_state(signup_limiter, ip_rate_limit_middleware));

    // Session-guarded routes, one guard per domain
    let user_routes = Router::new()
        .route("/api/auth/me", get(handlers::auth::me))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::user_session_guard,
        ));

    let org_routes = Router::new()
        .route("/api/org/auth/me", get(handlers::org::me))
        .route("/api/org/repositories", post(handlers::org::add_repository))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::org_session_guard,
        ));

    let ip_limiter = state.ip_rate_limiter.clone();

    let app = Router::new()
        .route("/health", get(health_check))
        // Logout stays outside the guards: destroying an absent session
        // is a success, so an unauthenticated logout must reach the
        // lifecycle layer rather than bounce off a 401.
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/org/auth/logout", post(handlers::org::logout))
        .merge(login_routes)
        .merge(signup_routes)
        .merge(user_routes)
        .merge(org_routes)
        .with_state(state.clone())
        // Global IP rate limiting
        .layer(from_fn_with_state(ip_limiter, ip_rate_limit_middleware))
        // Add tracing layer
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Add tracing middleware for request_id
        .layer(from_fn(request_id_middleware))
        // Add security headers middleware
        .layer(from_fn(security_headers_middleware))
        // Add CORS layer; cookies require credentials, so origins are
        // always an explicit list
        .layer(
            CorsLayer::new()
                .allow_origin(
                    state
                        .config
                        .security
                        .allowed_origins
                        .iter()
                        .filter_map(|o| match o.parse::<axum::http::HeaderValue>() {
                            Ok(origin) => Some(origin),
                            Err(e) => {
                                tracing::error!("Invalid CORS origin '{}': {}. Skipping.", o, e);
                                None
                            }
                        })
                        .collect::<Vec<axum::http::HeaderValue>>(),
                )
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([axum::http::header::CONTENT_TYPE])
                .allow_credentials(true),
        );

    Ok(app)
}

/// Service health check
pub async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Result<axum::Json<serde_json::Value>, AppError> {
    state.accounts.health_check().await.map_err(|e| {
        tracing::error!(error = %e, "MongoDB health check failed");
        AppError::from(e)
    })?;

    state.sessions.health_check().await.map_err(|e| {
        tracing::error!(error = %e, "Session store health check failed");
        AppError::InternalError(e)
    })?;

    Ok(axum::Json(serde_json::json!({
        "status": "healthy",
        "service": state.config.service_name,
        "version": state.config.service_version,
        "environment": format!("{:?}", state.config.environment),
        "checks": {
            "mongodb": "up",
            "redis": "up"
        }
    })))
}
