use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::FormError;
use super::field::Field;

pub const DEFAULT_TEMPLATE: &str = "default";
/// Multipart part carrying the attachment. Reserved, so no declared field can shadow it.
pub const FILE_INPUT_NAME: &str = "_attachment";

/// Opaque identifier of the organization account that owns forms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TenantId(pub String);

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for form definitions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FormId(pub String);

impl FormId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for submissions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(pub String);

impl SubmissionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

/// Authenticated tenant descriptor handed over by the session layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantIdentity {
    pub id: TenantId,
    pub company_name: String,
}

/// Public metadata recorded for a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub company_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_path: Option<String>,
}

impl From<TenantIdentity> for Tenant {
    fn from(identity: TenantIdentity) -> Self {
        Self {
            id: identity.id,
            company_name: identity.company_name,
            logo_path: None,
        }
    }
}

/// Persisted schema of a form: metadata plus the ordered field list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDefinition {
    pub id: FormId,
    pub owner: TenantId,
    pub title: String,
    pub fields: Vec<Field>,
    pub template: String,
    pub allow_file: bool,
    pub created_at: DateTime<Utc>,
}

impl FormDefinition {
    /// Build a definition, rejecting blank titles, a missing owner, and duplicate field names.
    pub fn new(
        owner: Option<TenantId>,
        title: impl Into<String>,
        fields: Vec<Field>,
        template: impl Into<String>,
        allow_file: bool,
        created_at: DateTime<Utc>,
    ) -> Result<Self, FormError> {
        let owner = owner.ok_or_else(|| FormError::validation("form owner is required"))?;
        let title = validate_title(title.into())?;
        validate_fields(&fields)?;

        Ok(Self {
            id: FormId::generate(),
            owner,
            title,
            fields,
            template: template.into(),
            allow_file,
            created_at,
        })
    }

    /// Replace the editable parts in place. `id`, `owner` and `created_at` never change.
    pub(crate) fn replace_content(
        &mut self,
        title: String,
        fields: Vec<Field>,
        template: String,
        allow_file: bool,
    ) -> Result<(), FormError> {
        let title = validate_title(title)?;
        validate_fields(&fields)?;

        self.title = title;
        self.fields = fields;
        self.template = template;
        self.allow_file = allow_file;
        Ok(())
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    pub fn is_owned_by(&self, tenant: &TenantId) -> bool {
        &self.owner == tenant
    }
}

fn validate_title(title: String) -> Result<String, FormError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(FormError::validation("title is required"));
    }
    Ok(trimmed.to_string())
}

fn validate_fields(fields: &[Field]) -> Result<(), FormError> {
    let mut seen = HashSet::new();
    for field in fields {
        if field.name.trim().is_empty() {
            return Err(FormError::validation("field names must not be empty"));
        }
        if field.name == FILE_INPUT_NAME {
            return Err(FormError::validation(format!(
                "field name '{FILE_INPUT_NAME}' is reserved for attachments"
            )));
        }
        if !seen.insert(field.name.as_str()) {
            return Err(FormError::validation(format!(
                "duplicate field name '{}'",
                field.name
            )));
        }
    }
    Ok(())
}

/// One filled-in instance of a form. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub form_id: FormId,
    pub data: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    pub submitted_at: DateTime<Utc>,
}
