use async_trait::async_trait;

use super::domain::{FormDefinition, FormId, Submission, Tenant, TenantId};
use super::submission::RawUpload;

/// Storage abstraction so the service module can be exercised in isolation.
///
/// Referential fields are opaque ids; a submission may outlive its form.
pub trait FormRepository: Send + Sync {
    /// Insert or replace a definition keyed by its id.
    fn save_form(&self, form: FormDefinition) -> Result<FormDefinition, RepositoryError>;
    fn find_form(&self, id: &FormId) -> Result<Option<FormDefinition>, RepositoryError>;
    fn forms(&self) -> Result<Vec<FormDefinition>, RepositoryError>;

    fn save_submission(&self, submission: Submission) -> Result<Submission, RepositoryError>;
    /// Submissions for `form_id` in the order they were saved.
    fn submissions_for(&self, form_id: &FormId) -> Result<Vec<Submission>, RepositoryError>;

    fn save_tenant(&self, tenant: Tenant) -> Result<(), RepositoryError>;
    fn find_tenant(&self, id: &TenantId) -> Result<Option<Tenant>, RepositoryError>;
    fn tenants(&self) -> Result<Vec<Tenant>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Attachment storage. Returns a stable, retrievable path for the stored bytes.
#[async_trait]
pub trait FileStorage: Send + Sync {
    async fn store(&self, upload: RawUpload) -> Result<String, StorageError>;
    /// Discard a previously stored attachment that no submission references.
    async fn remove(&self, path: &str) -> Result<(), StorageError>;
}

/// File storage failure.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("file storage unavailable: {0}")]
    Io(#[from] std::io::Error),
    #[error("upload rejected: {0}")]
    Rejected(String),
}
