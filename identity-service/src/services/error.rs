use service_core::error::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    /// The session store cannot be reached or mutated. Never retried here;
    /// the HTTP boundary decides what the caller sees.
    #[error("Session store unavailable: {0}")]
    StoreUnavailable(#[source] anyhow::Error),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Absent, expired, and wrong-domain tokens all collapse into this
    /// variant so callers cannot tell them apart.
    #[error("Invalid session")]
    InvalidSession,

    #[error("Email already registered")]
    EmailAlreadyRegistered,

    #[error("Account not found")]
    AccountNotFound,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::StoreUnavailable(e) => {
                AppError::InternalError(anyhow::anyhow!("Session store unavailable: {}", e))
            }
            ServiceError::Database(e) => AppError::DatabaseError(anyhow::Error::new(e)),
            ServiceError::InvalidCredentials => {
                AppError::Unauthorized(anyhow::anyhow!("Invalid credentials"))
            }
            ServiceError::InvalidSession => {
                AppError::Unauthorized(anyhow::anyhow!("Invalid session"))
            }
            ServiceError::EmailAlreadyRegistered => {
                AppError::Conflict(anyhow::anyhow!("Email already registered"))
            }
            ServiceError::AccountNotFound => {
                AppError::NotFound(anyhow::anyhow!("Account not found"))
            }
            ServiceError::Internal(e) => AppError::InternalError(e),
        }
    }
}
