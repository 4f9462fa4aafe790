use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::builder::{self, FormPayload};
use super::directory::{self, PublicFormListing};
use super::domain::{FormDefinition, FormId, Submission, Tenant, TenantId, TenantIdentity};
use super::error::FormError;
use super::guard;
use super::repository::{FileStorage, FormRepository};
use super::submission::{self, RawUpload};

/// Service composing the builder, guard, and submission intake over the storage collaborators.
pub struct FormService<R, F> {
    repository: Arc<R>,
    files: Arc<F>,
}

impl<R, F> FormService<R, F>
where
    R: FormRepository + 'static,
    F: FileStorage + 'static,
{
    pub fn new(repository: Arc<R>, files: Arc<F>) -> Self {
        Self { repository, files }
    }

    /// Record the descriptor supplied by the session layer, keeping any stored logo.
    pub fn register_tenant(&self, identity: &TenantIdentity) -> Result<Tenant, FormError> {
        let logo_path = self
            .repository
            .find_tenant(&identity.id)?
            .and_then(|existing| existing.logo_path);

        let tenant = Tenant {
            logo_path,
            ..Tenant::from(identity.clone())
        };
        self.repository.save_tenant(tenant.clone())?;
        Ok(tenant)
    }

    /// Build and persist a new form. Nothing is written when validation fails.
    pub fn create_form(
        &self,
        identity: &TenantIdentity,
        payload: &FormPayload,
    ) -> Result<FormDefinition, FormError> {
        let form = builder::create_form(Some(&identity.id), payload, Utc::now())?;
        self.register_tenant(identity)?;
        let stored = self.repository.save_form(form)?;

        info!(form_id = %stored.id, owner = %stored.owner, fields = stored.fields.len(), "form created");
        Ok(stored)
    }

    /// Replace title, fields, template and attachment flag. Last write wins.
    pub fn edit_form(
        &self,
        form_id: &FormId,
        acting: &TenantId,
        payload: &FormPayload,
    ) -> Result<FormDefinition, FormError> {
        let existing = self.load(form_id)?;
        let updated = builder::edit_form(&existing, acting, payload)?;
        let stored = self.repository.save_form(updated)?;

        info!(form_id = %stored.id, owner = %stored.owner, "form updated");
        Ok(stored)
    }

    /// Fetch a form for the public fill-out page. No tenant identity involved.
    pub fn public_form(&self, form_id: &FormId) -> Result<FormDefinition, FormError> {
        self.load(form_id)
    }

    /// Accept a public submission against the current version of the form.
    ///
    /// A stored attachment is removed again when the submission itself cannot be saved.
    pub async fn submit(
        &self,
        form_id: &FormId,
        raw_body: &HashMap<String, String>,
        upload: Option<RawUpload>,
    ) -> Result<Submission, FormError> {
        let form = self.load(form_id)?;

        let file_path = match upload.filter(|upload| !upload.is_empty()) {
            Some(upload) => {
                if !form.allow_file {
                    warn!(form_id = %form.id, "attachment received for a form without file uploads");
                }
                Some(self.files.store(upload).await?)
            }
            None => None,
        };

        let submission =
            submission::build_submission(&form, raw_body, file_path.clone(), Utc::now());
        let stored = match self.repository.save_submission(submission) {
            Ok(stored) => stored,
            Err(err) => {
                if let Some(path) = file_path {
                    self.discard_attachment(&form.id, &path).await;
                }
                return Err(err.into());
            }
        };

        let dropped = raw_body
            .keys()
            .filter(|key| !stored.data.contains_key(key.as_str()))
            .count();
        debug!(form_id = %form.id, dropped, "submission stored");
        Ok(stored)
    }

    /// Dashboard read of a single form, e.g. to prefill the edit page.
    pub fn owned_form(
        &self,
        form_id: &FormId,
        acting: &TenantId,
    ) -> Result<FormDefinition, FormError> {
        let form = self.load(form_id)?;
        guard::authorize(&form, acting)?;
        Ok(form)
    }

    /// Submissions of a form, visible to its owner only.
    pub fn submissions(
        &self,
        form_id: &FormId,
        acting: &TenantId,
    ) -> Result<Vec<Submission>, FormError> {
        let form = self.load(form_id)?;
        guard::authorize(&form, acting)?;
        Ok(self.repository.submissions_for(form_id)?)
    }

    pub fn list_public(&self) -> Result<Vec<PublicFormListing>, FormError> {
        let tenants = self.repository.tenants()?;
        let forms = self.repository.forms()?;
        Ok(directory::list_public(&tenants, &forms))
    }

    pub fn list_owned(&self, tenant: &TenantId) -> Result<Vec<FormDefinition>, FormError> {
        let forms = self.repository.forms()?;
        Ok(directory::list_owned(&forms, tenant))
    }

    async fn discard_attachment(&self, form_id: &FormId, path: &str) {
        match self.files.remove(path).await {
            Ok(()) => debug!(%form_id, path, "attachment discarded after failed save"),
            Err(err) => error!(%form_id, path, error = %err, "orphaned attachment"),
        }
    }

    fn load(&self, form_id: &FormId) -> Result<FormDefinition, FormError> {
        self.repository
            .find_form(form_id)?
            .ok_or(FormError::NotFound)
    }
}
