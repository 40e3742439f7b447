//! Service-layer error taxonomy.
//!
//! `NotFound` and `AlreadyExists` propagate unchanged to the API boundary
//! (404- and 400-equivalents, naming the entity kind). Cache failures never
//! appear here: they are absorbed inside the services and a request
//! succeeds on repository data alone.

use thiserror::Error;

use super::repos::RepoError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },
    #[error("{entity} with this title already exists")]
    AlreadyExists { entity: &'static str },
    #[error(transparent)]
    Repo(RepoError),
}

impl ServiceError {
    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    /// Map a repository failure for operations on `entity`: a unique
    /// constraint violation becomes `AlreadyExists`, anything else stays a
    /// repository error.
    pub fn from_repo(entity: &'static str, err: RepoError) -> Self {
        match err {
            RepoError::Duplicate { .. } => Self::AlreadyExists { entity },
            other => Self::Repo(other),
        }
    }
}
