use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{FormDefinition, TenantId, DEFAULT_TEMPLATE};
use super::error::FormError;
use super::field::{Field, FieldType};
use super::guard;

const CHECKBOX_ON: &str = "on";

/// A request value submitted either once or as a list under the same key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValues {
    One(String),
    Many(Vec<Option<String>>),
}

impl RawValues {
    /// Positional lookup. A scalar only answers index zero.
    pub fn get(&self, index: usize) -> Option<&str> {
        match self {
            RawValues::One(value) if index == 0 => Some(value.as_str()),
            RawValues::One(_) => None,
            RawValues::Many(values) => values.get(index).and_then(|value| value.as_deref()),
        }
    }
}

impl From<&str> for RawValues {
    fn from(value: &str) -> Self {
        RawValues::One(value.to_string())
    }
}

impl From<Vec<&str>> for RawValues {
    fn from(values: Vec<&str>) -> Self {
        RawValues::Many(values.into_iter().map(|v| Some(v.to_string())).collect())
    }
}

/// Raw create/edit payload as posted by the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub field_name: Option<RawValues>,
    #[serde(default)]
    pub field_type: Option<RawValues>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub allow_file: Option<String>,
}

/// Normalize the scalar-or-list request shape into ordered `(name, type)` pairs.
///
/// Types are aligned by index with names; a missing type entry yields `None`.
pub fn field_pairs<'a>(
    names: Option<&'a RawValues>,
    types: Option<&'a RawValues>,
) -> Vec<(&'a str, Option<&'a str>)> {
    let type_at = move |index: usize| types.and_then(|types| types.get(index));

    match names {
        None => Vec::new(),
        Some(RawValues::One(name)) => vec![(name.as_str(), type_at(0))],
        Some(RawValues::Many(names)) => names
            .iter()
            .enumerate()
            .map(|(index, name)| (name.as_deref().unwrap_or(""), type_at(index)))
            .collect(),
    }
}

/// Build the ordered field list, skipping blank names without shifting type alignment.
pub fn build_fields(names: Option<&RawValues>, types: Option<&RawValues>) -> Vec<Field> {
    field_pairs(names, types)
        .into_iter()
        .filter_map(|(name, raw_type)| {
            let name = name.trim();
            if name.is_empty() {
                None
            } else {
                Some(Field::new(name, FieldType::from_token(raw_type)))
            }
        })
        .collect()
}

struct FormContent {
    title: String,
    fields: Vec<Field>,
    template: String,
    allow_file: bool,
}

fn content_from_payload(payload: &FormPayload) -> FormContent {
    let template = payload
        .template
        .as_deref()
        .map(str::trim)
        .filter(|template| !template.is_empty())
        .unwrap_or(DEFAULT_TEMPLATE)
        .to_string();

    FormContent {
        title: payload.title.clone().unwrap_or_default(),
        fields: build_fields(payload.field_name.as_ref(), payload.field_type.as_ref()),
        template,
        allow_file: payload.allow_file.as_deref() == Some(CHECKBOX_ON),
    }
}

/// Turn a raw create payload into a new definition owned by `owner`.
pub fn create_form(
    owner: Option<&TenantId>,
    payload: &FormPayload,
    now: DateTime<Utc>,
) -> Result<FormDefinition, FormError> {
    let content = content_from_payload(payload);
    FormDefinition::new(
        owner.cloned(),
        content.title,
        content.fields,
        content.template,
        content.allow_file,
        now,
    )
}

/// Rebuild the editable parts of `existing` on behalf of `acting`.
pub fn edit_form(
    existing: &FormDefinition,
    acting: &TenantId,
    payload: &FormPayload,
) -> Result<FormDefinition, FormError> {
    guard::authorize(existing, acting)?;

    let content = content_from_payload(payload);
    let mut updated = existing.clone();
    updated.replace_content(
        content.title,
        content.fields,
        content.template,
        content.allow_file,
    )?;
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn many(values: &[Option<&str>]) -> RawValues {
        RawValues::Many(values.iter().map(|v| v.map(str::to_string)).collect())
    }

    fn owner() -> TenantId {
        TenantId("acme".to_string())
    }

    fn survey_payload() -> FormPayload {
        FormPayload {
            title: Some("Survey".to_string()),
            field_name: Some(vec!["email", "age"].into()),
            field_type: Some(vec!["email", "number"].into()),
            template: None,
            allow_file: None,
        }
    }

    #[test]
    fn equal_length_lists_keep_length_and_order() {
        let names = many(&[Some("a"), Some("b"), Some("c")]);
        let types = many(&[Some("date"), Some("bogus"), None]);

        let fields = build_fields(Some(&names), Some(&types));

        assert_eq!(
            fields,
            vec![
                Field::new("a", FieldType::Date),
                Field::new("b", FieldType::Text),
                Field::new("c", FieldType::Text),
            ]
        );
    }

    #[test]
    fn scalar_name_without_type_yields_one_text_field() {
        let names = RawValues::from("comment");
        assert_eq!(
            build_fields(Some(&names), None),
            vec![Field::new("comment", FieldType::Text)]
        );
    }

    #[test]
    fn scalar_blank_name_yields_nothing() {
        let names = RawValues::from("  ");
        assert!(build_fields(Some(&names), Some(&RawValues::from("email"))).is_empty());
    }

    #[test]
    fn blank_names_are_skipped_without_shifting_types() {
        let names = many(&[Some("first"), Some(""), None, Some("last")]);
        let types = many(&[Some("email"), Some("number"), Some("date"), Some("date")]);

        let fields = build_fields(Some(&names), Some(&types));

        assert_eq!(
            fields,
            vec![
                Field::new("first", FieldType::Email),
                Field::new("last", FieldType::Date),
            ]
        );
    }

    #[test]
    fn short_type_list_pads_with_text() {
        let names = many(&[Some("a"), Some("b"), Some("c")]);
        let types = many(&[Some("number")]);

        let fields = build_fields(Some(&names), Some(&types));

        assert_eq!(fields[0].field_type, FieldType::Number);
        assert_eq!(fields[1].field_type, FieldType::Text);
        assert_eq!(fields[2].field_type, FieldType::Text);
    }

    #[test]
    fn payload_accepts_scalar_or_list_json() {
        let scalar: FormPayload = serde_json::from_value(serde_json::json!({
            "title": "Single",
            "field_name": "email",
            "field_type": "email"
        }))
        .expect("scalar payload parses");
        assert_eq!(scalar.field_name, Some(RawValues::from("email")));

        let list: FormPayload = serde_json::from_value(serde_json::json!({
            "title": "List",
            "field_name": ["a", null, "c"],
            "field_type": ["number"]
        }))
        .expect("list payload parses");
        let fields = build_fields(list.field_name.as_ref(), list.field_type.as_ref());
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1], Field::new("c", FieldType::Text));
    }

    #[test]
    fn create_applies_defaults_and_checkbox_semantics() {
        let form = create_form(Some(&owner()), &survey_payload(), Utc::now()).expect("creates");
        assert_eq!(form.template, DEFAULT_TEMPLATE);
        assert!(!form.allow_file);
        assert_eq!(form.fields.len(), 2);

        let mut payload = survey_payload();
        payload.allow_file = Some("true".to_string());
        payload.template = Some("compact".to_string());
        let form = create_form(Some(&owner()), &payload, Utc::now()).expect("creates");
        assert!(!form.allow_file, "only the literal 'on' enables attachments");
        assert_eq!(form.template, "compact");

        payload.allow_file = Some("on".to_string());
        let form = create_form(Some(&owner()), &payload, Utc::now()).expect("creates");
        assert!(form.allow_file);
    }

    #[test]
    fn create_without_title_is_a_validation_error() {
        let mut payload = survey_payload();
        payload.title = None;
        assert!(matches!(
            create_form(Some(&owner()), &payload, Utc::now()),
            Err(FormError::Validation(_))
        ));
    }

    #[test]
    fn create_without_owner_is_a_validation_error() {
        assert!(matches!(
            create_form(None, &survey_payload(), Utc::now()),
            Err(FormError::Validation(_))
        ));
    }

    #[test]
    fn edit_keeps_identity_fields() {
        let original = create_form(Some(&owner()), &survey_payload(), Utc::now()).expect("creates");
        let payload = FormPayload {
            title: Some("Renamed".to_string()),
            field_name: Some(RawValues::from("notes")),
            field_type: None,
            template: Some("wide".to_string()),
            allow_file: Some("on".to_string()),
        };

        let edited = edit_form(&original, &owner(), &payload).expect("owner may edit");

        assert_eq!(edited.id, original.id);
        assert_eq!(edited.owner, original.owner);
        assert_eq!(edited.created_at, original.created_at);
        assert_eq!(edited.title, "Renamed");
        assert_eq!(edited.fields, vec![Field::new("notes", FieldType::Text)]);
        assert_eq!(edited.template, "wide");
        assert!(edited.allow_file);
    }

    #[test]
    fn edit_by_other_tenant_is_denied() {
        let original = create_form(Some(&owner()), &survey_payload(), Utc::now()).expect("creates");
        let intruder = TenantId("globex".to_string());
        assert!(matches!(
            edit_form(&original, &intruder, &survey_payload()),
            Err(FormError::AccessDenied)
        ));
    }
}
