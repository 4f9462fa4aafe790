use std::collections::HashMap;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use super::domain::{FormDefinition, Submission, SubmissionId};

/// Uploaded file as received from the client, before storage assigns it a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl RawUpload {
    /// Browsers post an empty part when the file input is left blank.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
            && self
                .file_name
                .as_deref()
                .map_or(true, |name| name.trim().is_empty())
    }
}

/// Project raw client input onto the declared fields of `definition`.
///
/// Exactly one entry per declared field, in declared order. Missing input becomes an
/// empty string and undeclared keys are dropped.
pub fn build_submission(
    definition: &FormDefinition,
    raw_body: &HashMap<String, String>,
    file_path: Option<String>,
    submitted_at: DateTime<Utc>,
) -> Submission {
    let data: IndexMap<String, String> = definition
        .fields
        .iter()
        .map(|field| {
            let raw = raw_body.get(&field.name).map(String::as_str).unwrap_or("");
            (field.name.clone(), field.field_type.normalize(raw))
        })
        .collect();

    Submission {
        id: SubmissionId::generate(),
        form_id: definition.id.clone(),
        data,
        file_path,
        submitted_at,
    }
}
