use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Closed set of field kinds a form may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldType {
    #[default]
    Text,
    Email,
    Number,
    Date,
}

impl FieldType {
    pub const fn ordered() -> [Self; 4] {
        [Self::Text, Self::Email, Self::Number, Self::Date]
    }

    /// Resolve a raw type token. Absent or unrecognized tokens degrade to `Text`.
    pub fn from_token(token: Option<&str>) -> Self {
        let Some(raw) = token else {
            return Self::Text;
        };

        match raw.trim().to_ascii_lowercase().as_str() {
            "email" => Self::Email,
            "number" => Self::Number,
            "date" => Self::Date,
            _ => Self::Text,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Number => "number",
            Self::Date => "date",
        }
    }

    /// Input affordance presented to whoever fills the form out.
    pub const fn input_kind(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Number => "number",
            Self::Date => "date",
        }
    }

    /// Values are stored as submitted; number and date are presentational only.
    pub fn normalize(self, raw: &str) -> String {
        match self {
            Self::Text | Self::Email | Self::Number | Self::Date => raw.to_string(),
        }
    }
}

impl Serialize for FieldType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(Self::from_token(raw.as_deref()))
    }
}

/// One named, typed input declared on a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}
