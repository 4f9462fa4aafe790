use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use super::domain::{FormDefinition, FormId, Submission, SubmissionId, FILE_INPUT_NAME};

const MULTIPART: &str = "multipart/form-data";
const URLENCODED: &str = "application/x-www-form-urlencoded";

/// One input of the fillable document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputView {
    pub name: String,
    pub label: String,
    pub input_type: &'static str,
}

/// Document model handed to the rendering layer for the public form page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormView {
    pub form_id: FormId,
    pub title: String,
    pub template: String,
    pub allow_file: bool,
    pub enctype: &'static str,
    pub inputs: Vec<InputView>,
}

impl FormView {
    pub fn from_definition(definition: &FormDefinition) -> Self {
        let inputs = definition
            .fields
            .iter()
            .map(|field| InputView {
                name: field.name.clone(),
                label: humanize(&field.name),
                input_type: field.field_type.input_kind(),
            })
            .collect();

        Self {
            form_id: definition.id.clone(),
            title: definition.title.clone(),
            template: definition.template.clone(),
            allow_file: definition.allow_file,
            enctype: if definition.allow_file {
                MULTIPART
            } else {
                URLENCODED
            },
            inputs,
        }
    }

    /// Fillable HTML fragment posting to `action`.
    pub fn to_html(&self, action: &str) -> String {
        let mut html = String::new();
        html.push_str(&format!(
            "<form class=\"form form--{}\" method=\"post\" action=\"{}\" enctype=\"{}\">\n",
            escape(&self.template),
            escape(action),
            self.enctype
        ));
        html.push_str(&format!("  <h1>{}</h1>\n", escape(&self.title)));

        for input in &self.inputs {
            let name = escape(&input.name);
            html.push_str(&format!(
                "  <label>{} <input type=\"{}\" name=\"{}\"></label>\n",
                escape(&input.label),
                input.input_type,
                name
            ));
        }

        if self.allow_file {
            html.push_str(&format!(
                "  <label>Attachment <input type=\"file\" name=\"{FILE_INPUT_NAME}\"></label>\n"
            ));
        }

        html.push_str("  <button type=\"submit\">Submit</button>\n</form>\n");
        html
    }
}

/// Submission as shown on the owner's dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionView {
    pub submission_id: SubmissionId,
    pub form_id: FormId,
    pub data: IndexMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl From<&Submission> for SubmissionView {
    fn from(submission: &Submission) -> Self {
        Self {
            submission_id: submission.id.clone(),
            form_id: submission.form_id.clone(),
            data: submission.data.clone(),
            file_path: submission.file_path.clone(),
            submitted_at: submission.submitted_at,
        }
    }
}

fn humanize(name: &str) -> String {
    let spaced = name.replace(['_', '-'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
