use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct OrgSignupRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(min = 1, message = "Organization name is required"))]
    pub org_name: String,

    #[validate(length(min = 1, message = "GitHub organization name is required"))]
    pub github_org_name: String,

    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddRepositoryRequest {
    #[validate(length(min = 1, message = "Repository name is required"))]
    pub repo_name: String,

    #[validate(url(message = "Invalid repository URL"))]
    pub repo_url: String,
}

/// Fixed logout envelope: the frontend relies on this exact shape.
#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
}
