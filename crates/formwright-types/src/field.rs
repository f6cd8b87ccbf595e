use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Unique identifier for a form field, wrapping a UUID v7 (time-sortable).
///
/// Assigned once when the field is created and never reused, even after the
/// field is deleted from its schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldId(pub Uuid);

impl FieldId {
    /// Create a new FieldId using UUID v7.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create a FieldId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for FieldId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FieldId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// The kind of input a field renders as.
///
/// Determines the default label and whether the field carries `options`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    SingleLineText,
    MultiLineText,
    SingleSelect,
    Date,
    FileUpload,
}

impl FieldType {
    /// Every field type, in palette order.
    pub const ALL: [FieldType; 5] = [
        FieldType::SingleLineText,
        FieldType::MultiLineText,
        FieldType::SingleSelect,
        FieldType::Date,
        FieldType::FileUpload,
    ];

    /// Short human-readable name shown in the builder palette.
    pub fn display_name(&self) -> &'static str {
        match self {
            FieldType::SingleLineText => "Text",
            FieldType::MultiLineText => "Textarea",
            FieldType::SingleSelect => "Select",
            FieldType::Date => "Date",
            FieldType::FileUpload => "File",
        }
    }

    /// Whether fields of this type carry a list of choices.
    pub fn has_options(&self) -> bool {
        matches!(self, FieldType::SingleSelect)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::SingleLineText => write!(f, "single-line-text"),
            FieldType::MultiLineText => write!(f, "multi-line-text"),
            FieldType::SingleSelect => write!(f, "single-select"),
            FieldType::Date => write!(f, "date"),
            FieldType::FileUpload => write!(f, "file-upload"),
        }
    }
}

impl FromStr for FieldType {
    type Err = String;

    /// Accepts the canonical kebab-case names plus the short palette aliases
    /// (`text`, `textarea`, `select`, `date`, `file`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single-line-text" | "text" => Ok(FieldType::SingleLineText),
            "multi-line-text" | "textarea" => Ok(FieldType::MultiLineText),
            "single-select" | "select" => Ok(FieldType::SingleSelect),
            "date" => Ok(FieldType::Date),
            "file-upload" | "file" => Ok(FieldType::FileUpload),
            other => Err(format!("invalid field type: '{other}'")),
        }
    }
}

/// One configured input element within a form schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub id: FieldId,
    /// Fixed at creation; changing type means replacing the field.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    /// Choices for single-select fields, in display order. Absent for every
    /// other type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

/// Partial update for a field's mutable properties.
///
/// `None` leaves the property untouched. `options` only applies to
/// single-select fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPatch {
    pub label: Option<String>,
    pub required: Option<bool>,
    pub options: Option<Vec<String>>,
}

impl FieldPatch {
    /// Whether the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.label.is_none() && self.required.is_none() && self.options.is_none()
    }
}

impl Field {
    /// Apply a partial update in place.
    ///
    /// Returns `true` if any property changed.
    pub fn apply_patch(&mut self, patch: FieldPatch) -> bool {
        let mut changed = false;

        if let Some(label) = patch.label {
            if self.label != label {
                self.label = label;
                changed = true;
            }
        }
        if let Some(required) = patch.required {
            if self.required != required {
                self.required = required;
                changed = true;
            }
        }
        if let Some(options) = patch.options {
            if self.field_type.has_options() && self.options.as_ref() != Some(&options) {
                self.options = Some(options);
                changed = true;
            }
        }

        changed
    }
}

/// A request to move the field `source_id` into the slot currently held by
/// `target_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderInstruction {
    pub source_id: FieldId,
    pub target_id: FieldId,
}

impl ReorderInstruction {
    pub fn new(source_id: FieldId, target_id: FieldId) -> Self {
        Self {
            source_id,
            target_id,
        }
    }
}
