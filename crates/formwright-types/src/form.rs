use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::field::Field;

/// Unique identifier for a form schema, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormId(pub Uuid);

impl FormId {
    /// Create a new FormId using UUID v7.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create a FormId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for FormId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FormId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Publication state of a form.
///
/// - Draft: visible only in the library, not offered to respondents
/// - Published: live and collecting responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormStatus {
    Draft,
    Published,
}

impl fmt::Display for FormStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormStatus::Draft => write!(f, "draft"),
            FormStatus::Published => write!(f, "published"),
        }
    }
}

impl FromStr for FormStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(FormStatus::Draft),
            "published" => Ok(FormStatus::Published),
            other => Err(format!("invalid form status: '{other}'")),
        }
    }
}

impl Default for FormStatus {
    fn default() -> Self {
        FormStatus::Draft
    }
}

/// One form definition: metadata plus an ordered list of fields.
///
/// Field order is significant and defines render and submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSchema {
    pub id: FormId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub status: FormStatus,
}

impl FormSchema {
    /// A blank draft with a fresh id and no fields.
    pub fn empty() -> Self {
        Self {
            id: FormId::new(),
            name: String::new(),
            description: String::new(),
            fields: Vec::new(),
            status: FormStatus::Draft,
        }
    }
}

/// A saved form schema plus library-maintained metadata.
///
/// Serialized flat: schema properties and metadata share one JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormLibraryEntry {
    #[serde(flatten)]
    pub schema: FormSchema,
    /// Number of submissions collected against this form.
    pub response_count: i64,
    /// Monotonic save counter, starting at 1 on first save.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FormLibraryEntry {
    pub fn id(&self) -> FormId {
        self.schema.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldId, FieldType};

    #[test]
    fn test_form_id_display() {
        let id = FormId::new();
        let parsed: FormId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_form_status_roundtrip() {
        for status in [FormStatus::Draft, FormStatus::Published] {
            let parsed: FormStatus = status.to_string().parse().unwrap();
            assert_eq!(status, parsed);
        }
        assert!("archived".parse::<FormStatus>().is_err());
    }

    #[test]
    fn test_empty_schema_is_draft() {
        let schema = FormSchema::empty();
        assert!(schema.name.is_empty());
        assert!(schema.fields.is_empty());
        assert_eq!(schema.status, FormStatus::Draft);
    }

    #[test]
    fn test_schema_json_keeps_field_order() {
        let mut schema = FormSchema::empty();
        for (i, field_type) in [FieldType::Date, FieldType::SingleSelect, FieldType::SingleLineText]
            .into_iter()
            .enumerate()
        {
            schema.fields.push(Field {
                id: FieldId::new(),
                field_type,
                label: format!("Field {i}"),
                required: i == 1,
                options: field_type
                    .has_options()
                    .then(|| vec!["Yes".to_string(), "No".to_string()]),
            });
        }

        let json = serde_json::to_string(&schema).unwrap();
        let parsed: FormSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, schema);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["fields"][0]["type"], "date");
        assert_eq!(value["fields"][1]["options"][1], "No");
        assert!(value["fields"][2].get("options").is_none());
    }

    #[test]
    fn test_library_entry_serializes_flat() {
        let entry = FormLibraryEntry {
            schema: FormSchema::empty(),
            response_count: 12,
            version: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["status"], "draft");
        assert_eq!(value["response_count"], 12);
        assert!(value.get("schema").is_none());
    }
}
