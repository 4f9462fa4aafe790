use super::repository::{RepositoryError, StorageError};

/// Failures surfaced by the form engine to the request layer.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("{0}")]
    Validation(String),
    #[error("access refused")]
    AccessDenied,
    #[error("form not found")]
    NotFound,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    FileStorage(#[from] StorageError),
}

impl FormError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Persistence or file storage failed; never retried by the engine.
    pub fn is_storage_failure(&self) -> bool {
        matches!(self, Self::Repository(_) | Self::FileStorage(_))
    }
}
