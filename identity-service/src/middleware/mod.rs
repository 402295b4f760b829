mod auth;

pub use auth::{AuthSession, org_session_guard, user_session_guard};
