//! Credential verification and account registration for both domains.
//!
//! Sessions themselves are owned by `SessionManager`; this service only
//! decides *whether* a session may be established.

use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::{
    dtos::auth::{AddRepositoryRequest, LoginRequest, OrgSignupRequest, SignupRequest},
    models::{Organization, RepositoryRef, RepositorySummary, SanitizedOrganization, SanitizedUser, User},
    services::{AccountStore, ServiceError, SessionDomain, SessionManager},
    utils::{Password, PasswordHash, hash_password, verify_password},
};

/// Emails are stored and looked up lowercase, so uniqueness and login are
/// case-insensitive.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[derive(Clone)]
pub struct AuthService {
    accounts: Arc<dyn AccountStore>,
    sessions: SessionManager,
}

impl AuthService {
    pub fn new(accounts: Arc<dyn AccountStore>, sessions: SessionManager) -> Self {
        Self { accounts, sessions }
    }

    pub async fn register_user(
        &self,
        req: SignupRequest,
        jar: CookieJar,
    ) -> Result<(CookieJar, SanitizedUser), ServiceError> {
        let email = normalize_email(&req.email);

        if self.accounts.find_user_by_email(&email).await?.is_some() {
            return Err(ServiceError::EmailAlreadyRegistered);
        }

        let password_hash = hash_password(&Password::new(req.password)).map_err(|e| {
            ServiceError::Internal(anyhow::anyhow!("Password hashing error: {}", e))
        })?;

        let user = User::new(email, password_hash.into_string(), req.name);
        self.accounts.insert_user(&user).await?;

        tracing::info!(user_id = %user.id, "User registered");

        let jar = self
            .sessions
            .create_session(SessionDomain::User, &user.id, jar)
            .await?;

        Ok((jar, user.sanitized()))
    }

    pub async fn login_user(
        &self,
        req: LoginRequest,
        jar: CookieJar,
    ) -> Result<(CookieJar, SanitizedUser), ServiceError> {
        let email = normalize_email(&req.email);

        // Unknown email and wrong password are indistinguishable
        let user = self
            .accounts
            .find_user_by_email(&email)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        verify_password(
            &Password::new(req.password),
            &PasswordHash::new(user.password_hash.clone()),
        )
        .map_err(|_| ServiceError::InvalidCredentials)?;

        let jar = self
            .sessions
            .create_session(SessionDomain::User, &user.id, jar)
            .await?;

        Ok((jar, user.sanitized()))
    }

    pub async fn register_org(
        &self,
        req: OrgSignupRequest,
        jar: CookieJar,
    ) -> Result<(CookieJar, SanitizedOrganization), ServiceError> {
        let email = normalize_email(&req.email);

        if self.accounts.find_org_by_email(&email).await?.is_some() {
            return Err(ServiceError::EmailAlreadyRegistered);
        }

        let password_hash = hash_password(&Password::new(req.password)).map_err(|e| {
            ServiceError::Internal(anyhow::anyhow!("Password hashing error: {}", e))
        })?;

        let org = Organization::new(
            email,
            password_hash.into_string(),
            req.org_name,
            req.github_org_name,
            req.description,
        );
        self.accounts.insert_org(&org).await?;

        tracing::info!(org_id = %org.id, "Organization registered");

        let jar = self
            .sessions
            .create_session(SessionDomain::Organization, &org.id, jar)
            .await?;

        Ok((jar, org.sanitized()))
    }

    pub async fn login_org(
        &self,
        req: LoginRequest,
        jar: CookieJar,
    ) -> Result<(CookieJar, SanitizedOrganization), ServiceError> {
        let email = normalize_email(&req.email);

        let org = self
            .accounts
            .find_org_by_email(&email)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        verify_password(
            &Password::new(req.password),
            &PasswordHash::new(org.password_hash.clone()),
        )
        .map_err(|_| ServiceError::InvalidCredentials)?;

        let jar = self
            .sessions
            .create_session(SessionDomain::Organization, &org.id, jar)
            .await?;

        Ok((jar, org.sanitized()))
    }

    pub async fn current_user(&self, user_id: &str) -> Result<SanitizedUser, ServiceError> {
        let user = self
            .accounts
            .find_user_by_id(user_id)
            .await?
            .ok_or(ServiceError::AccountNotFound)?;
        Ok(user.sanitized())
    }

    pub async fn current_org(&self, org_id: &str) -> Result<SanitizedOrganization, ServiceError> {
        let org = self
            .accounts
            .find_org_by_id(org_id)
            .await?
            .ok_or(ServiceError::AccountNotFound)?;
        Ok(org.sanitized())
    }

    pub async fn add_repository(
        &self,
        org_id: &str,
        req: AddRepositoryRequest,
    ) -> Result<RepositorySummary, ServiceError> {
        let repo = RepositoryRef::new(req.repo_name, req.repo_url);
        self.accounts.push_repository(org_id, &repo).await?;

        tracing::info!(org_id = %org_id, repo = %repo.repo_name, "Repository reference added");

        Ok(repo.summary())
    }
}
