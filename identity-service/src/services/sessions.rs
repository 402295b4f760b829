//! Session lifecycle: creation, validation, destruction.
//!
//! `SessionManager` is the single authority over session semantics. Both
//! account domains run the same parameterized code path, so user and
//! organization sessions cannot drift in behavior, and a token issued for
//! one domain never validates in the other.

use async_trait::async_trait;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::services::ServiceError;

/// The two independent account domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionDomain {
    User,
    Organization,
}

impl SessionDomain {
    /// Cookie name scoped to the domain. The user cookie keeps the plain
    /// `session` name the frontend expects; the organization cookie name
    /// is owned by this module.
    pub fn cookie_name(&self) -> &'static str {
        match self {
            SessionDomain::User => "session",
            SessionDomain::Organization => "org_session",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionDomain::User => "user",
            SessionDomain::Organization => "organization",
        }
    }
}

/// One active session: an opaque token bound to exactly one subject in
/// exactly one domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub token: String,
    pub domain: SessionDomain,
    pub subject_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Token-keyed storage for active sessions.
///
/// A `delete` must be observable by every subsequent `get` — no stale-read
/// window. Deleting an absent token is a success.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn put(&self, record: &SessionRecord) -> Result<(), anyhow::Error>;
    async fn get(&self, token: &str) -> Result<Option<SessionRecord>, anyhow::Error>;
    async fn delete(&self, token: &str) -> Result<(), anyhow::Error>;
    async fn health_check(&self) -> Result<(), anyhow::Error>;
}

#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    ttl: Duration,
    cookie_secure: bool,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, ttl_hours: i64, cookie_secure: bool) -> Self {
        Self {
            store,
            ttl: Duration::hours(ttl_hours),
            cookie_secure,
        }
    }

    /// Issue a fresh session for `subject_id` and return the jar with the
    /// domain-scoped cookie set. Every login produces a new token; old
    /// tokens are never resurrected.
    pub async fn create_session(
        &self,
        domain: SessionDomain,
        subject_id: &str,
        jar: CookieJar,
    ) -> Result<CookieJar, ServiceError> {
        let now = Utc::now();
        let record = SessionRecord {
            token: generate_session_token(),
            domain,
            subject_id: subject_id.to_string(),
            created_at: now,
            expires_at: now + self.ttl,
        };

        self.store
            .put(&record)
            .await
            .map_err(ServiceError::StoreUnavailable)?;

        tracing::debug!(domain = %domain.as_str(), "Session created");

        Ok(jar.add(self.session_cookie(domain, record.token)))
    }

    /// Look up `token` and accept it only if it is live and bound to
    /// `domain`. Absent, expired, and cross-domain tokens take the same
    /// single store lookup and come back as the same `InvalidSession`.
    pub async fn validate_session(
        &self,
        domain: SessionDomain,
        token: &str,
    ) -> Result<SessionRecord, ServiceError> {
        let record = self
            .store
            .get(token)
            .await
            .map_err(ServiceError::StoreUnavailable)?;

        match record {
            Some(r) if r.domain == domain && !r.is_expired() => Ok(r),
            _ => Err(ServiceError::InvalidSession),
        }
    }

    /// Destroy the session bound to the domain's cookie, if any, and
    /// return the jar with the cookie cleared.
    ///
    /// Idempotent: a missing cookie or an already-absent token is still a
    /// success. The only failure mode is the store being unreachable.
    pub async fn destroy_session(
        &self,
        domain: SessionDomain,
        jar: CookieJar,
    ) -> Result<CookieJar, ServiceError> {
        if let Some(cookie) = jar.get(domain.cookie_name()) {
            self.store
                .delete(cookie.value())
                .await
                .map_err(ServiceError::StoreUnavailable)?;
            tracing::debug!(domain = %domain.as_str(), "Session destroyed");
        }

        Ok(jar.remove(Cookie::build((domain.cookie_name(), "")).path("/").build()))
    }

    /// The session token presented for `domain`, if the cookie is there.
    pub fn presented_token<'a>(&self, domain: SessionDomain, jar: &'a CookieJar) -> Option<&'a str> {
        jar.get(domain.cookie_name()).map(|c| c.value())
    }

    pub async fn health_check(&self) -> Result<(), anyhow::Error> {
        self.store.health_check().await
    }

    fn session_cookie(&self, domain: SessionDomain, token: String) -> Cookie<'static> {
        Cookie::build((domain.cookie_name(), token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.cookie_secure)
            .max_age(time::Duration::seconds(self.ttl.num_seconds()))
            .build()
    }
}

/// 32 random bytes, hex-encoded. `thread_rng` is OS-seeded.
fn generate_session_token() -> String {
    let mut rng = rand::thread_rng();
    let token_bytes: [u8; 32] = rng.gen();
    hex::encode(token_bytes)
}
