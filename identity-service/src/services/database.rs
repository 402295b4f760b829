//! Account store backends.
//!
//! MongoDB holds the durable account records; `MemoryAccounts` backs the
//! integration tests. Uniqueness of the lowercase-normalized email is
//! enforced by a unique index in MongoDB and by an insert-time check in
//! the memory store.

use async_trait::async_trait;
use mongodb::{
    Client as MongoClient, Collection, Database, IndexModel,
    bson::doc,
    options::IndexOptions,
};

use crate::models::{Organization, RepositoryRef, User};
use crate::services::ServiceError;

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ServiceError>;
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, ServiceError>;
    async fn insert_user(&self, user: &User) -> Result<(), ServiceError>;

    async fn find_org_by_email(&self, email: &str) -> Result<Option<Organization>, ServiceError>;
    async fn find_org_by_id(&self, id: &str) -> Result<Option<Organization>, ServiceError>;
    async fn insert_org(&self, org: &Organization) -> Result<(), ServiceError>;

    /// Append a repository reference to the organization's ordered list.
    async fn push_repository(
        &self,
        org_id: &str,
        repo: &RepositoryRef,
    ) -> Result<(), ServiceError>;

    async fn health_check(&self) -> Result<(), ServiceError>;
}

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, ServiceError> {
        tracing::info!(uri = %uri, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB at {}: {}", uri, e);
            ServiceError::Database(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), ServiceError> {
        tracing::info!("Creating MongoDB indexes for identity-service");

        let unique_email = |name: &str| {
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(
                    IndexOptions::builder()
                        .name(name.to_string())
                        .unique(true)
                        .build(),
                )
                .build()
        };

        self.users()
            .create_index(unique_email("unique_user_email"), None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create email index on users collection: {}", e);
                ServiceError::Database(e)
            })?;
        tracing::info!("Created unique index on users.email");

        self.organizations()
            .create_index(unique_email("unique_org_email"), None)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to create email index on organizations collection: {}",
                    e
                );
                ServiceError::Database(e)
            })?;
        tracing::info!("Created unique index on organizations.email");

        Ok(())
    }

    pub fn users(&self) -> Collection<User> {
        self.db.collection("users")
    }

    pub fn organizations(&self) -> Collection<Organization> {
        self.db.collection("organizations")
    }
}

#[async_trait]
impl AccountStore for MongoDb {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        Ok(self.users().find_one(doc! { "email": email }, None).await?)
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, ServiceError> {
        Ok(self.users().find_one(doc! { "_id": id }, None).await?)
    }

    async fn insert_user(&self, user: &User) -> Result<(), ServiceError> {
        self.users().insert_one(user, None).await?;
        Ok(())
    }

    async fn find_org_by_email(&self, email: &str) -> Result<Option<Organization>, ServiceError> {
        Ok(self
            .organizations()
            .find_one(doc! { "email": email }, None)
            .await?)
    }

    async fn find_org_by_id(&self, id: &str) -> Result<Option<Organization>, ServiceError> {
        Ok(self
            .organizations()
            .find_one(doc! { "_id": id }, None)
            .await?)
    }

    async fn insert_org(&self, org: &Organization) -> Result<(), ServiceError> {
        self.organizations().insert_one(org, None).await?;
        Ok(())
    }

    async fn push_repository(
        &self,
        org_id: &str,
        repo: &RepositoryRef,
    ) -> Result<(), ServiceError> {
        let repo_doc = mongodb::bson::to_bson(repo)
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("BSON encode error: {}", e)))?;

        let result = self
            .organizations()
            .update_one(
                doc! { "_id": org_id },
                doc! { "$push": { "repositories": repo_doc } },
                None,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(ServiceError::AccountNotFound);
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), ServiceError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                ServiceError::Database(e)
            })?;
        Ok(())
    }
}

/// In-memory account store for tests.
#[derive(Default)]
pub struct MemoryAccounts {
    users: std::sync::Mutex<Vec<User>>,
    organizations: std::sync::Mutex<Vec<Organization>>,
}

impl MemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccounts {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        let users = self.users
            .lock()
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Users mutex poisoned: {}", e)))?;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, ServiceError> {
        let users = self.users
            .lock()
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Users mutex poisoned: {}", e)))?;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<(), ServiceError> {
        let mut users = self.users
            .lock()
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Users mutex poisoned: {}", e)))?;
        // Same behavior as the unique index backstop
        if users.iter().any(|u| u.email == user.email) {
            return Err(ServiceError::EmailAlreadyRegistered);
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find_org_by_email(&self, email: &str) -> Result<Option<Organization>, ServiceError> {
        let orgs = self.organizations
            .lock()
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Organizations mutex poisoned: {}", e)))?;
        Ok(orgs.iter().find(|o| o.email == email).cloned())
    }

    async fn find_org_by_id(&self, id: &str) -> Result<Option<Organization>, ServiceError> {
        let orgs = self.organizations
            .lock()
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Organizations mutex poisoned: {}", e)))?;
        Ok(orgs.iter().find(|o| o.id == id).cloned())
    }

    async fn insert_org(&self, org: &Organization) -> Result<(), ServiceError> {
        let mut orgs = self.organizations
            .lock()
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Organizations mutex poisoned: {}", e)))?;
        if orgs.iter().any(|o| o.email == org.email) {
            return Err(ServiceError::EmailAlreadyRegistered);
        }
        orgs.push(org.clone());
        Ok(())
    }

    async fn push_repository(
        &self,
        org_id: &str,
        repo: &RepositoryRef,
    ) -> Result<(), ServiceError> {
        let mut orgs = self.organizations
            .lock()
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Organizations mutex poisoned: {}", e)))?;
        let org = orgs
            .iter_mut()
            .find(|o| o.id == org_id)
            .ok_or(ServiceError::AccountNotFound)?;
        org.repositories.push(repo.clone());
        Ok(())
    }

    async fn health_check(&self) -> Result<(), ServiceError> {
        Ok(())
    }
}
