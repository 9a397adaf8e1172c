use thiserror::Error;

use crate::store::Outcome;

/// Failures reported by a key-value backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The backend refused the write because it is full
    #[error("storage quota exceeded while writing '{0}'")]
    QuotaExceeded(String),
    /// The backend cannot be reached at all (e.g. storage disabled)
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// Any other backend failure
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    pub fn code(&self) -> &'static str {
        match self {
            StorageError::QuotaExceeded(_) => "STORAGE_QUOTA_EXCEEDED",
            StorageError::Unavailable(_) => "STORAGE_UNAVAILABLE",
            StorageError::Backend(_) => "STORAGE_ERROR",
        }
    }
}

/// Errors surfaced by store mutations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("failed to serialize store state: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The change is live in memory but was not written
    #[error("{source}")]
    NotPersisted {
        outcome: Outcome,
        source: Box<StoreError>,
    },
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Storage(e) => e.code(),
            StoreError::Serialization(_) => "SERIALIZATION_ERROR",
            StoreError::NotPersisted { source, .. } => source.code(),
        }
    }

    /// What the failed mutation already did to the in-memory state
    pub fn applied(&self) -> Option<&Outcome> {
        match self {
            StoreError::NotPersisted { outcome, .. } => Some(outcome),
            _ => None,
        }
    }

    /// Id of an entity that was created in memory before the write failed
    pub fn created_id(&self) -> Option<&str> {
        self.applied().and_then(Outcome::created_id)
    }
}

/// Errors raised while importing a backup file
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("Invalid file format: expected a 'resumes' array")]
    InvalidFormat,

    #[error("Malformed backup JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Stopped at a failed write; `imported` resumes are in the store
    #[error("import stopped after {imported} resume(s): {source}")]
    Interrupted { imported: usize, source: StoreError },
}

impl BackupError {
    pub fn code(&self) -> &'static str {
        match self {
            BackupError::InvalidFormat => "INVALID_FORMAT",
            BackupError::Json(_) => "INVALID_JSON",
            BackupError::Interrupted { source, .. } => source.code(),
        }
    }
}
