pub mod auth;
pub mod org;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    AppState,
    dtos::{ErrorResponse, auth::LogoutResponse},
    services::SessionDomain,
};

/// Shared logout boundary for both domains.
///
/// The external contract is deliberately coarse: any lifecycle failure
/// collapses into one fixed 500 envelope, and a logout with no live
/// session is still a success. Cause detail goes to the log only.
pub(crate) async fn destroy_session_response(
    state: &AppState,
    domain: SessionDomain,
    jar: CookieJar,
) -> Response {
    match state.sessions.destroy_session(domain, jar).await {
        Ok(jar) => (
            StatusCode::OK,
            jar,
            Json(LogoutResponse {
                success: true,
                message: "Logged out successfully".to_string(),
            }),
        )
            .into_response(),
        Err(err) => {
            tracing::error!(domain = %domain.as_str(), error = %err, "Logout failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Logout failed".to_string(),
                }),
            )
                .into_response()
        }
    }
}
