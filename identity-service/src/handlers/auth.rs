//! User-domain authentication endpoints.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use service_core::error::AppError;

use crate::{
    AppState,
    dtos::auth::{LoginRequest, SignupRequest},
    middleware::AuthSession,
    services::SessionDomain,
    utils::ValidatedJson,
};

/// Create a user account and establish a session
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (jar, user) = state.auth.register_user(req, jar).await?;
    Ok((StatusCode::CREATED, jar, Json(user)))
}

/// Login with email and password
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (jar, user) = state.auth.login_user(req, jar).await?;
    Ok((StatusCode::OK, jar, Json(user)))
}

/// Destroy the user session and clear its cookie.
///
/// Not behind the session guard: logging out without a session is a
/// success, not an authentication failure.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    super::destroy_session_response(&state, SessionDomain::User, jar).await
}

/// Current authenticated user
pub async fn me(
    State(state): State<AppState>,
    session: AuthSession,
) -> Result<impl IntoResponse, AppError> {
    let user = state.auth.current_user(&session.0.subject_id).await?;
    Ok(Json(user))
}
