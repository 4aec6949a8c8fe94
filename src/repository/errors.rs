use thiserror::Error;

use crate::domain::types::TempleId;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("record not found")]
    NotFound,
    /// A guarded write found the row in an unexpected state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// The English name is already used by a published temple.
    #[error("temple name already used by temple {existing_id}")]
    DuplicateName {
        existing_id: TempleId,
        existing_name: String,
    },
    #[error("validation error: {0}")]
    ValidationError(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("migration error: {0}")]
    Migration(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
