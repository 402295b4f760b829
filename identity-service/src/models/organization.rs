//! Organization accounts (the `organization` session domain).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A repository reference attached to an organization.
///
/// References are an ordered list and carry no uniqueness constraint:
/// the same repository may be listed twice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub repo_name: String,
    pub repo_url: String,

    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub added_at: DateTime<Utc>,
}

impl RepositoryRef {
    pub fn new(repo_name: String, repo_url: String) -> Self {
        Self {
            repo_name,
            repo_url,
            added_at: Utc::now(),
        }
    }

    pub fn summary(&self) -> RepositorySummary {
        RepositorySummary {
            repo_name: self.repo_name.clone(),
            repo_url: self.repo_url.clone(),
            added_at: self.added_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    /// MongoDB document ID (UUID string)
    #[serde(rename = "_id")]
    pub id: String,

    /// Lowercase-normalized email, unique within the organization domain
    pub email: String,

    /// Argon2 hash, never the plaintext credential
    pub password_hash: String,

    /// Display name of the organization
    pub org_name: String,

    /// Linked GitHub organization identifier
    pub github_org_name: String,

    pub description: Option<String>,

    /// Ordered list of repository references
    pub repositories: Vec<RepositoryRef>,

    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Organization {
    pub fn new(
        email: String,
        password_hash: String,
        org_name: String,
        github_org_name: String,
        description: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email,
            password_hash,
            org_name,
            github_org_name,
            description,
            repositories: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Convert to sanitized response (no credential material).
    pub fn sanitized(&self) -> SanitizedOrganization {
        SanitizedOrganization {
            id: self.id.clone(),
            email: self.email.clone(),
            org_name: self.org_name.clone(),
            github_org_name: self.github_org_name.clone(),
            description: self.description.clone(),
            repositories: self.repositories.iter().map(RepositoryRef::summary).collect(),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub repo_name: String,
    pub repo_url: String,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanitizedOrganization {
    pub id: String,
    pub email: String,
    pub org_name: String,
    pub github_org_name: String,
    pub description: Option<String>,
    pub repositories: Vec<RepositorySummary>,
    pub created_at: DateTime<Utc>,
}
