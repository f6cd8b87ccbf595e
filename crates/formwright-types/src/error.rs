use thiserror::Error;

use crate::field::FieldId;

/// Errors from operations on a schema's field list.
///
/// `FieldNotFound` and `InvalidMove` are absorbed as no-ops at the builder
/// boundary. The rest are raised by schema validation before a save.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("field '{0}' not found in schema")]
    FieldNotFound(FieldId),

    #[error("field '{0}' cannot be moved onto itself")]
    InvalidMove(FieldId),

    #[error("duplicate field id '{0}'")]
    DuplicateFieldId(FieldId),

    #[error("field '{0}' carries options but its type has none")]
    UnexpectedOptions(FieldId),

    #[error("select field '{0}' has no options list")]
    MissingOptions(FieldId),
}

/// Errors related to form library operations.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("form not found")]
    NotFound,

    #[error("invalid form schema: {0}")]
    InvalidSchema(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

impl From<SchemaError> for FormError {
    fn from(e: SchemaError) -> Self {
        FormError::InvalidSchema(e.to_string())
    }
}

/// Errors related to builder session transitions.
#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("no form is open in this builder session")]
    NoOpenForm,

    #[error("a form is already open in this builder session")]
    SessionActive,

    #[error("failed to save form: {0}")]
    Persistence(String),
}

/// Errors from repository operations (used by trait definitions in formwright-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_display() {
        let id = FieldId::new();
        let err = SchemaError::FieldNotFound(id);
        assert_eq!(err.to_string(), format!("field '{id}' not found in schema"));
    }

    #[test]
    fn test_schema_error_converts_to_form_error() {
        let id = FieldId::new();
        let err: FormError = SchemaError::DuplicateFieldId(id).into();
        assert!(matches!(err, FormError::InvalidSchema(_)));
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn test_builder_error_display() {
        let err = BuilderError::Persistence("disk full".to_string());
        assert_eq!(err.to_string(), "failed to save form: disk full");
    }

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }
}
