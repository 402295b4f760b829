mod organization;
mod user;

pub use organization::{Organization, RepositoryRef, RepositorySummary, SanitizedOrganization};
pub use user::{SanitizedUser, User};
