use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{FormDefinition, FormId, Tenant, TenantId};

/// A form annotated with its owner's public metadata for the landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicFormListing {
    pub form_id: FormId,
    pub title: String,
    pub template: String,
    pub allow_file: bool,
    pub field_count: usize,
    pub created_at: DateTime<Utc>,
    pub owner: TenantId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_logo: Option<String>,
}

/// Every form paired with its owning tenant. Unknown owners are listed without metadata.
pub fn list_public(tenants: &[Tenant], forms: &[FormDefinition]) -> Vec<PublicFormListing> {
    let by_id: HashMap<&TenantId, &Tenant> =
        tenants.iter().map(|tenant| (&tenant.id, tenant)).collect();

    let mut listings: Vec<PublicFormListing> = forms
        .iter()
        .map(|form| {
            let tenant = by_id.get(&form.owner);
            PublicFormListing {
                form_id: form.id.clone(),
                title: form.title.clone(),
                template: form.template.clone(),
                allow_file: form.allow_file,
                field_count: form.fields.len(),
                created_at: form.created_at,
                owner: form.owner.clone(),
                company_name: tenant.map(|tenant| tenant.company_name.clone()),
                company_logo: tenant.and_then(|tenant| tenant.logo_path.clone()),
            }
        })
        .collect();

    listings.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.form_id.cmp(&b.form_id))
    });
    listings
}

/// Forms owned by `tenant`, oldest first.
pub fn list_owned(forms: &[FormDefinition], tenant: &TenantId) -> Vec<FormDefinition> {
    let mut owned: Vec<FormDefinition> = forms
        .iter()
        .filter(|form| form.is_owned_by(tenant))
        .cloned()
        .collect();
    owned.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    owned
}
