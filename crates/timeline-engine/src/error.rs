//! Error types shared by the remote contract and the sync layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::EntityKind;

/// Result of a call against the remote store
pub type ApiResult<T> = Result<T, ApiError>;

/// Result of a coordinated (optimistic) mutation
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors reported by the remote store
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    /// The call never reached the store, or its answer could not be decoded
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors surfaced by the mutation coordinator after local state was rolled back
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("remote call failed: {0}")]
    Remote(#[from] ApiError),
    #[error("{kind} {id} is not in the cache")]
    UnknownEntity { kind: EntityKind, id: String },
}
