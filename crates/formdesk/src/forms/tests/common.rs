use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::forms::builder::{FormPayload, RawValues};
use crate::forms::domain::{FormDefinition, FormId, Submission, Tenant, TenantId, TenantIdentity};
use crate::forms::repository::{FileStorage, FormRepository, RepositoryError, StorageError};
use crate::forms::service::FormService;
use crate::forms::submission::RawUpload;
use crate::forms::form_router;

pub(super) fn acme() -> TenantIdentity {
    TenantIdentity {
        id: TenantId("acme".to_string()),
        company_name: "Acme Corp".to_string(),
    }
}

pub(super) fn globex() -> TenantIdentity {
    TenantIdentity {
        id: TenantId("globex".to_string()),
        company_name: "Globex".to_string(),
    }
}

pub(super) fn survey_payload() -> FormPayload {
    FormPayload {
        title: Some("Survey".to_string()),
        field_name: Some(vec!["email", "age"].into()),
        field_type: Some(vec!["email", "number"].into()),
        template: None,
        allow_file: None,
    }
}

pub(super) fn upload_payload() -> FormPayload {
    FormPayload {
        title: Some("Job application".to_string()),
        field_name: Some(RawValues::from("full_name")),
        field_type: None,
        template: Some("careers".to_string()),
        allow_file: Some("on".to_string()),
    }
}

pub(super) fn body(entries: &[(&str, &str)]) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

pub(super) fn upload(name: &str, bytes: &[u8]) -> RawUpload {
    RawUpload {
        file_name: Some(name.to_string()),
        content_type: Some("application/pdf".to_string()),
        bytes: bytes.to_vec(),
    }
}

pub(super) type MemoryService = FormService<MemoryRepository, MemoryFiles>;

pub(super) fn build_service() -> (MemoryService, Arc<MemoryRepository>, Arc<MemoryFiles>) {
    let repository = Arc::new(MemoryRepository::default());
    let files = Arc::new(MemoryFiles::default());
    let service = FormService::new(repository.clone(), files.clone());
    (service, repository, files)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    forms: Arc<Mutex<HashMap<FormId, FormDefinition>>>,
    submissions: Arc<Mutex<Vec<Submission>>>,
    tenants: Arc<Mutex<HashMap<TenantId, Tenant>>>,
}

impl MemoryRepository {
    pub(super) fn form_count(&self) -> usize {
        self.forms.lock().expect("forms mutex poisoned").len()
    }
}

impl FormRepository for MemoryRepository {
    fn save_form(&self, form: FormDefinition) -> Result<FormDefinition, RepositoryError> {
        let mut guard = self.forms.lock().expect("forms mutex poisoned");
        guard.insert(form.id.clone(), form.clone());
        Ok(form)
    }

    fn find_form(&self, id: &FormId) -> Result<Option<FormDefinition>, RepositoryError> {
        let guard = self.forms.lock().expect("forms mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn forms(&self) -> Result<Vec<FormDefinition>, RepositoryError> {
        let guard = self.forms.lock().expect("forms mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn save_submission(&self, submission: Submission) -> Result<Submission, RepositoryError> {
        let mut guard = self.submissions.lock().expect("submissions mutex poisoned");
        guard.push(submission.clone());
        Ok(submission)
    }

    fn submissions_for(&self, form_id: &FormId) -> Result<Vec<Submission>, RepositoryError> {
        let guard = self.submissions.lock().expect("submissions mutex poisoned");
        Ok(guard
            .iter()
            .filter(|submission| &submission.form_id == form_id)
            .cloned()
            .collect())
    }

    fn save_tenant(&self, tenant: Tenant) -> Result<(), RepositoryError> {
        let mut guard = self.tenants.lock().expect("tenants mutex poisoned");
        guard.insert(tenant.id.clone(), tenant);
        Ok(())
    }

    fn find_tenant(&self, id: &TenantId) -> Result<Option<Tenant>, RepositoryError> {
        let guard = self.tenants.lock().expect("tenants mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn tenants(&self) -> Result<Vec<Tenant>, RepositoryError> {
        let guard = self.tenants.lock().expect("tenants mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryFiles {
    stored: Arc<Mutex<Vec<RawUpload>>>,
    removed: Arc<Mutex<Vec<String>>>,
}

impl MemoryFiles {
    pub(super) fn stored(&self) -> Vec<RawUpload> {
        self.stored.lock().expect("files mutex poisoned").clone()
    }

    pub(super) fn removed(&self) -> Vec<String> {
        self.removed.lock().expect("files mutex poisoned").clone()
    }
}

#[async_trait]
impl FileStorage for MemoryFiles {
    async fn store(&self, upload: RawUpload) -> Result<String, StorageError> {
        let mut guard = self.stored.lock().expect("files mutex poisoned");
        let name = upload.file_name.clone().unwrap_or_else(|| "upload".to_string());
        guard.push(upload);
        Ok(format!("memory/{}-{}", guard.len(), name))
    }

    async fn remove(&self, path: &str) -> Result<(), StorageError> {
        let mut guard = self.removed.lock().expect("files mutex poisoned");
        guard.push(path.to_string());
        Ok(())
    }
}

/// Accepts forms and tenants but fails every submission write.
#[derive(Default)]
pub(super) struct SubmissionsOffline {
    pub(super) inner: MemoryRepository,
}

impl FormRepository for SubmissionsOffline {
    fn save_form(&self, form: FormDefinition) -> Result<FormDefinition, RepositoryError> {
        self.inner.save_form(form)
    }

    fn find_form(&self, id: &FormId) -> Result<Option<FormDefinition>, RepositoryError> {
        self.inner.find_form(id)
    }

    fn forms(&self) -> Result<Vec<FormDefinition>, RepositoryError> {
        self.inner.forms()
    }

    fn save_submission(&self, _submission: Submission) -> Result<Submission, RepositoryError> {
        Err(RepositoryError::Unavailable("submissions table locked".to_string()))
    }

    fn submissions_for(&self, form_id: &FormId) -> Result<Vec<Submission>, RepositoryError> {
        self.inner.submissions_for(form_id)
    }

    fn save_tenant(&self, tenant: Tenant) -> Result<(), RepositoryError> {
        self.inner.save_tenant(tenant)
    }

    fn find_tenant(&self, id: &TenantId) -> Result<Option<Tenant>, RepositoryError> {
        self.inner.find_tenant(id)
    }

    fn tenants(&self) -> Result<Vec<Tenant>, RepositoryError> {
        self.inner.tenants()
    }
}

pub(super) struct UnavailableRepository;

impl FormRepository for UnavailableRepository {
    fn save_form(&self, _form: FormDefinition) -> Result<FormDefinition, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_form(&self, _id: &FormId) -> Result<Option<FormDefinition>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn forms(&self) -> Result<Vec<FormDefinition>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn save_submission(&self, _submission: Submission) -> Result<Submission, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn submissions_for(&self, _form_id: &FormId) -> Result<Vec<Submission>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn save_tenant(&self, _tenant: Tenant) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_tenant(&self, _id: &TenantId) -> Result<Option<Tenant>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn tenants(&self) -> Result<Vec<Tenant>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct FullDisk;

#[async_trait]
impl FileStorage for FullDisk {
    async fn store(&self, _upload: RawUpload) -> Result<String, StorageError> {
        Err(StorageError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "no space left on device",
        )))
    }

    async fn remove(&self, _path: &str) -> Result<(), StorageError> {
        Ok(())
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    form_router(Arc::new(service))
}
