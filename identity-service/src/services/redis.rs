//! Session store backends.
//!
//! Redis in production; an in-memory store for tests. Both implement the
//! same `SessionStore` trait, so the lifecycle manager is exercised
//! identically against either.

use async_trait::async_trait;
use chrono::Utc;
use redis::{Client, aio::ConnectionManager};
use std::future::Future;
use std::time::Duration;

use crate::services::{SessionRecord, SessionStore};

/// Upper bound on any single store round-trip. A hung Redis surfaces as
/// `StoreUnavailable` instead of an unbounded await.
const OP_TIMEOUT: Duration = Duration::from_secs(2);

fn session_key(token: &str) -> String {
    format!("session:{}", token)
}

#[derive(Clone)]
pub struct RedisSessionStore {
    _client: Client,
    manager: ConnectionManager,
}

impl RedisSessionStore {
    pub async fn new(config: &crate::config::RedisConfig) -> Result<Self, anyhow::Error> {
        tracing::info!(url = %config.url, "Connecting to Redis");
        let client = Client::open(config.url.clone())?;

        // ConnectionManager reconnects automatically
        let manager = client.get_connection_manager().await.map_err(|e| {
            tracing::error!("Failed to get Redis connection manager: {}", e);
            anyhow::anyhow!("Failed to connect to Redis: {}", e)
        })?;

        tracing::info!("Successfully connected to Redis");

        Ok(Self {
            _client: client,
            manager,
        })
    }
}

async fn bounded<T, F>(fut: F) -> Result<T, anyhow::Error>
where
    F: Future<Output = Result<T, redis::RedisError>>,
{
    tokio::time::timeout(OP_TIMEOUT, fut)
        .await
        .map_err(|_| anyhow::anyhow!("Redis operation timed out"))?
        .map_err(|e| anyhow::anyhow!("Redis operation failed: {}", e))
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn put(&self, record: &SessionRecord) -> Result<(), anyhow::Error> {
        let mut conn = self.manager.clone();
        let payload = serde_json::to_string(record)?;
        let ttl_seconds = (record.expires_at - Utc::now()).num_seconds().max(1);

        bounded(
            redis::cmd("SET")
                .arg(session_key(&record.token))
                .arg(payload)
                .arg("EX")
                .arg(ttl_seconds)
                .query_async::<_, ()>(&mut conn),
        )
        .await
    }

    async fn get(&self, token: &str) -> Result<Option<SessionRecord>, anyhow::Error> {
        let mut conn = self.manager.clone();

        let raw: Option<String> = bounded(
            redis::cmd("GET")
                .arg(session_key(token))
                .query_async(&mut conn),
        )
        .await?;

        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, token: &str) -> Result<(), anyhow::Error> {
        let mut conn = self.manager.clone();

        // DEL on a missing key is a no-op success, which gives the
        // lifecycle layer its idempotence for free.
        bounded(
            redis::cmd("DEL")
                .arg(session_key(token))
                .query_async::<_, ()>(&mut conn),
        )
        .await
    }

    async fn health_check(&self) -> Result<(), anyhow::Error> {
        let mut conn = self.manager.clone();
        bounded(redis::cmd("PING").query_async::<_, ()>(&mut conn)).await
    }
}

/// In-memory session store for tests.
///
/// `set_unavailable(true)` makes every operation fail, simulating the
/// store being unreachable.
pub struct MemorySessionStore {
    sessions: std::sync::Mutex<std::collections::HashMap<String, SessionRecord>>,
    unavailable: std::sync::atomic::AtomicBool,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: std::sync::Mutex::new(std::collections::HashMap::new()),
            unavailable: std::sync::atomic::AtomicBool::new(false),
        }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable
            .store(unavailable, std::sync::atomic::Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), anyhow::Error> {
        if self.unavailable.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(anyhow::anyhow!("Session store offline"));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn put(&self, record: &SessionRecord) -> Result<(), anyhow::Error> {
        self.check_available()?;
        self.sessions
            .lock()
            .map_err(|e| anyhow::anyhow!("Session store mutex poisoned: {}", e))?
            .insert(record.token.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<SessionRecord>, anyhow::Error> {
        self.check_available()?;
        let record = self
            .sessions
            .lock()
            .map_err(|e| anyhow::anyhow!("Session store mutex poisoned: {}", e))?
            .get(token)
            .cloned();
        Ok(record)
    }

    async fn delete(&self, token: &str) -> Result<(), anyhow::Error> {
        self.check_available()?;
        self.sessions
            .lock()
            .map_err(|e| anyhow::anyhow!("Session store mutex poisoned: {}", e))?
            .remove(token);
        Ok(())
    }

    async fn health_check(&self) -> Result<(), anyhow::Error> {
        self.check_available()
    }
}
