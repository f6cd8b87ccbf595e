//! Read-only rendering of a form schema.

use std::fmt;

use serde::Serialize;

use formwright_types::field::FieldType;
use formwright_types::form::{FormSchema, FormStatus};

/// Snapshot of a schema as a respondent would see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormPreview {
    pub title: String,
    pub description: String,
    pub status: FormStatus,
    pub fields: Vec<PreviewField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewField {
    /// 1-based position in submission order.
    pub position: usize,
    pub label: String,
    pub field_type: FieldType,
    pub required: bool,
    pub options: Vec<String>,
}

impl FormPreview {
    pub fn from_schema(schema: &FormSchema) -> Self {
        let title = if schema.name.trim().is_empty() {
            "Untitled form".to_string()
        } else {
            schema.name.clone()
        };

        let fields = schema
            .fields
            .iter()
            .enumerate()
            .map(|(i, field)| PreviewField {
                position: i + 1,
                label: field.label.clone(),
                field_type: field.field_type,
                required: field.required,
                options: field.options.clone().unwrap_or_default(),
            })
            .collect();

        Self {
            title,
            description: schema.description.clone(),
            status: schema.status,
            fields,
        }
    }
}

impl fmt::Display for FormPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.title, self.status)?;
        if !self.description.is_empty() {
            writeln!(f, "{}", self.description)?;
        }
        writeln!(f)?;

        if self.fields.is_empty() {
            return writeln!(f, "  (no fields)");
        }

        for field in &self.fields {
            let marker = if field.required { " *" } else { "" };
            writeln!(
                f,
                "  {:>2}. {}{} [{}]",
                field.position,
                field.label,
                marker,
                field.field_type.display_name()
            )?;
            for option in &field.options {
                writeln!(f, "        ( ) {option}")?;
            }
        }
        Ok(())
    }
}
