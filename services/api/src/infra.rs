use async_trait::async_trait;
use formdesk::forms::{
    FileStorage, FormDefinition, FormId, FormRepository, RawUpload, RepositoryError,
    StorageError, Submission, Tenant, TenantId,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local store. Each save replaces one entity atomically under its own lock.
#[derive(Default, Clone)]
pub(crate) struct InMemoryFormStore {
    forms: Arc<Mutex<HashMap<FormId, FormDefinition>>>,
    submissions: Arc<Mutex<Vec<Submission>>>,
    tenants: Arc<Mutex<HashMap<TenantId, Tenant>>>,
}

impl FormRepository for InMemoryFormStore {
    fn save_form(&self, form: FormDefinition) -> Result<FormDefinition, RepositoryError> {
        let mut guard = self.forms.lock().expect("form store mutex poisoned");
        guard.insert(form.id.clone(), form.clone());
        Ok(form)
    }

    fn find_form(&self, id: &FormId) -> Result<Option<FormDefinition>, RepositoryError> {
        let guard = self.forms.lock().expect("form store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn forms(&self) -> Result<Vec<FormDefinition>, RepositoryError> {
        let guard = self.forms.lock().expect("form store mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn save_submission(&self, submission: Submission) -> Result<Submission, RepositoryError> {
        let mut guard = self.submissions.lock().expect("submission store mutex poisoned");
        guard.push(submission.clone());
        Ok(submission)
    }

    fn submissions_for(&self, form_id: &FormId) -> Result<Vec<Submission>, RepositoryError> {
        let guard = self.submissions.lock().expect("submission store mutex poisoned");
        Ok(guard
            .iter()
            .filter(|submission| &submission.form_id == form_id)
            .cloned()
            .collect())
    }

    fn save_tenant(&self, tenant: Tenant) -> Result<(), RepositoryError> {
        let mut guard = self.tenants.lock().expect("tenant store mutex poisoned");
        guard.insert(tenant.id.clone(), tenant);
        Ok(())
    }

    fn find_tenant(&self, id: &TenantId) -> Result<Option<Tenant>, RepositoryError> {
        let guard = self.tenants.lock().expect("tenant store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn tenants(&self) -> Result<Vec<Tenant>, RepositoryError> {
        let guard = self.tenants.lock().expect("tenant store mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

/// Writes attachments below `root` under collision-free names.
#[derive(Debug, Clone)]
pub(crate) struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn stored_name(upload: &RawUpload) -> String {
        let original = upload
            .file_name
            .as_deref()
            .map(sanitize_file_name)
            .filter(|name| !name.is_empty());

        let name = match original {
            Some(name) => name,
            None => {
                let extension = upload
                    .content_type
                    .as_deref()
                    .and_then(mime_guess::get_mime_extensions_str)
                    .and_then(|extensions| extensions.first())
                    .copied()
                    .unwrap_or("bin");
                format!("upload.{extension}")
            }
        };

        format!("{}-{}", Uuid::new_v4(), name)
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn store(&self, upload: RawUpload) -> Result<String, StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.root.join(Self::stored_name(&upload));
        tokio::fs::write(&path, &upload.bytes).await?;

        let content_type = upload.content_type.clone().unwrap_or_else(|| {
            mime_guess::from_path(&path)
                .first_or_octet_stream()
                .to_string()
        });
        debug!(path = %path.display(), %content_type, bytes = upload.bytes.len(), "attachment stored");

        Ok(path.display().to_string())
    }

    async fn remove(&self, path: &str) -> Result<(), StorageError> {
        let path = Path::new(path);
        if !path.starts_with(&self.root) {
            return Err(StorageError::Rejected(format!(
                "{} is outside the upload directory",
                path.display()
            )));
        }

        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Keep only the final path component and a conservative character set.
fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    base.chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '_'))
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}
