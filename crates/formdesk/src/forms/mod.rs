//! Dynamic form definitions, public submission intake, and tenant ownership checks.
//!
//! Forms are schema-less: an ordered list of typed fields owned by one tenant. The public
//! render/submit path needs no identity; every dashboard read or mutation goes through
//! [`guard::authorize`].

pub mod builder;
pub mod directory;
pub mod domain;
pub mod error;
pub mod field;
pub mod guard;
pub mod render;
pub mod repository;
pub mod router;
pub mod service;
pub mod submission;

#[cfg(test)]
mod tests;

pub use builder::{build_fields, create_form, edit_form, field_pairs, FormPayload, RawValues};
pub use directory::{list_owned, list_public, PublicFormListing};
pub use domain::{
    FormDefinition, FormId, Submission, SubmissionId, Tenant, TenantId, TenantIdentity,
    DEFAULT_TEMPLATE, FILE_INPUT_NAME,
};
pub use error::FormError;
pub use field::{Field, FieldType};
pub use guard::authorize;
pub use render::{FormView, InputView, SubmissionView};
pub use repository::{FileStorage, FormRepository, RepositoryError, StorageError};
pub use router::{form_router, DashboardTenant, TENANT_ID_HEADER, TENANT_NAME_HEADER};
pub use service::FormService;
pub use submission::{build_submission, RawUpload};
