//! Session guard middleware.
//!
//! Both domains share one guard implementation; the thin wrappers only
//! pin the domain tag. Handlers behind a guard read the validated session
//! from request extensions via the `AuthSession` extractor.

use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    AppState,
    dtos::ErrorResponse,
    services::{ServiceError, SessionDomain, SessionRecord},
};

pub async fn user_session_guard(
    State(state): State<AppState>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    session_guard(state, SessionDomain::User, jar, req, next).await
}

pub async fn org_session_guard(
    State(state): State<AppState>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    session_guard(state, SessionDomain::Organization, jar, req, next).await
}

async fn session_guard(
    state: AppState,
    domain: SessionDomain,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    // One rejection message for every way a request can fail to
    // authenticate: no cookie, unknown token, expired, wrong domain.
    let unauthorized = || {
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Authentication required".to_string(),
            }),
        )
    };

    let token = state
        .sessions
        .presented_token(domain, &jar)
        .map(|t| t.to_string())
        .ok_or_else(unauthorized)?;

    let record = match state.sessions.validate_session(domain, &token).await {
        Ok(record) => record,
        Err(ServiceError::StoreUnavailable(e)) => {
            tracing::error!(error = %e, "Session store unreachable during validation");
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Internal server error".to_string(),
                }),
            ));
        }
        Err(_) => return Err(unauthorized()),
    };

    req.extensions_mut().insert(record);

    Ok(next.run(req).await)
}

/// Extractor for the validated session a guard stored in extensions.
pub struct AuthSession(pub SessionRecord);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let record = parts.extensions.get::<SessionRecord>().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Session missing from request extensions".to_string(),
            }),
        ))?;

        Ok(AuthSession(record.clone()))
    }
}
