//! Organization-domain authentication and account endpoints.

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
    dtos::auth::{AddRepositoryRequest, LoginRequest, OrgSignupRequest},
    middleware::AuthSession,
    services::SessionDomain,
    utils::ValidatedJson,
};

/// Create an organization account and establish a session
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<OrgSignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (jar, org) = state.auth.register_org(req, jar).await?;
    Ok((StatusCode::CREATED, jar, Json(org)))
}

/// Login with email and password
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (jar, org) = state.auth.login_org(req, jar).await?;
    Ok((StatusCode::OK, jar, Json(org)))
}

/// Destroy the organization session and clear its cookie.
///
/// Same open-access rule as the user logout: no session is still a
/// success.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    super::destroy_session_response(&state, SessionDomain::Organization, jar).await
}

/// Current authenticated organization
pub async fn me(
    State(state): State<AppState>,
    session: AuthSession,
) -> Result<impl IntoResponse, AppError> {
    let org = state.auth.current_org(&session.0.subject_id).await?;
    Ok(Json(org))
}

/// Append a repository reference to the authenticated organization
pub async fn add_repository(
    State(state): State<AppState>,
    session: AuthSession,
    ValidatedJson(req): ValidatedJson<AddRepositoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let repo = state
        .auth
        .add_repository(&session.0.subject_id, req)
        .await?;
    Ok((StatusCode::CREATED, Json(repo)))
}
