//! Field-list operations on `FormSchema`.
//!
//! `FormSchema` lives in `formwright-types`; this module provides an
//! extension trait (`FormSchemaExt`) with the add/delete/update/reorder
//! operations the builder session drives. Operations that reference an
//! unknown field id are no-ops and report that nothing changed.

use std::collections::HashSet;

use formwright_types::error::SchemaError;
use formwright_types::field::{Field, FieldId, FieldPatch, FieldType, ReorderInstruction};
use formwright_types::form::FormSchema;

use crate::registry;
use crate::reorder;

/// Extension trait for `FormSchema` field management.
pub trait FormSchemaExt {
    /// Append a default field of `field_type`. Returns the new field's id.
    fn add_field(&mut self, field_type: FieldType) -> FieldId;

    /// Remove the field with `id`. Returns the removed field, or `None` if
    /// it was not present.
    fn delete_field(&mut self, id: FieldId) -> Option<Field>;

    /// Apply a partial update to the field with `id`. Returns `true` if a
    /// property changed.
    fn update_field(&mut self, id: FieldId, patch: FieldPatch) -> bool;

    /// Apply a reorder instruction. Returns `true` if the order changed.
    fn reorder_fields(&mut self, instruction: ReorderInstruction) -> bool;

    /// Look up a field by id.
    fn field(&self, id: FieldId) -> Option<&Field>;

    /// Check unique field ids and that only select fields carry options.
    fn validate(&self) -> Result<(), SchemaError>;

    /// Copy of this schema with fresh field ids, for duplication.
    fn with_fresh_field_ids(&self) -> FormSchema;
}

impl FormSchemaExt for FormSchema {
    fn add_field(&mut self, field_type: FieldType) -> FieldId {
        let field = registry::create_default(field_type);
        let id = field.id;
        self.fields.push(field);
        id
    }

    fn delete_field(&mut self, id: FieldId) -> Option<Field> {
        let index = reorder::index_of(&self.fields, id)?;
        Some(self.fields.remove(index))
    }

    fn update_field(&mut self, id: FieldId, patch: FieldPatch) -> bool {
        match self.fields.iter_mut().find(|f| f.id == id) {
            Some(field) => field.apply_patch(patch),
            None => false,
        }
    }

    fn reorder_fields(&mut self, instruction: ReorderInstruction) -> bool {
        match reorder::try_move(&self.fields, instruction) {
            Ok(reordered) => {
                self.fields = reordered;
                true
            }
            Err(e) => {
                tracing::debug!(error = %e, "reorder ignored");
                false
            }
        }
    }

    fn field(&self, id: FieldId) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    fn validate(&self) -> Result<(), SchemaError> {
        let mut seen = HashSet::with_capacity(self.fields.len());
        for field in &self.fields {
            if !seen.insert(field.id) {
                return Err(SchemaError::DuplicateFieldId(field.id));
            }
            match (field.field_type.has_options(), &field.options) {
                (true, None) => return Err(SchemaError::MissingOptions(field.id)),
                (false, Some(_)) => return Err(SchemaError::UnexpectedOptions(field.id)),
                _ => {}
            }
        }
        Ok(())
    }

    fn with_fresh_field_ids(&self) -> FormSchema {
        let mut copy = self.clone();
        for field in &mut copy.fields {
            field.id = FieldId::new();
        }
        copy
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_add_field_appends_at_end() {
        let mut schema = FormSchema::empty();
        let first = schema.add_field(FieldType::SingleLineText);
        let second = schema.add_field(FieldType::Date);

        assert_eq!(schema.fields.len(), 2);
        assert_eq!(schema.fields[0].id, first);
        assert_eq!(schema.fields[1].id, second);
        assert_eq!(schema.fields[1].label, "Date Field");
    }

    #[test]
    fn test_add_same_type_many_times_gives_distinct_ids() {
        let mut schema = FormSchema::empty();
        let ids: HashSet<FieldId> = (0..50)
            .map(|_| schema.add_field(FieldType::SingleSelect))
            .collect();
        assert_eq!(ids.len(), 50);
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn test_add_select_to_empty_schema() {
        let mut schema = FormSchema::empty();
        let id = schema.add_field(FieldType::SingleSelect);

        assert_eq!(schema.fields.len(), 1);
        let field = schema.field(id).unwrap();
        assert_eq!(field.options.as_ref().map(Vec::len), Some(3));
        assert!(!field.required);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut schema = FormSchema::empty();
        let a = schema.add_field(FieldType::SingleLineText);
        let b = schema.add_field(FieldType::Date);

        assert!(schema.delete_field(b).is_some());
        let after_first = schema.clone();
        assert!(schema.delete_field(b).is_none());

        assert_eq!(schema, after_first);
        assert_eq!(schema.fields.len(), 1);
        assert_eq!(schema.fields[0].id, a);
    }

    #[test]
    fn test_update_unknown_field_is_noop() {
        let mut schema = FormSchema::empty();
        schema.add_field(FieldType::SingleLineText);
        let before = schema.clone();

        let changed = schema.update_field(
            FieldId::new(),
            FieldPatch {
                label: Some("Ghost".to_string()),
                ..Default::default()
            },
        );

        assert!(!changed);
        assert_eq!(schema, before);
    }

    #[test]
    fn test_update_select_options_keeps_order() {
        let mut schema = FormSchema::empty();
        let id = schema.add_field(FieldType::SingleSelect);
        let options = vec!["Screening".to_string(), "Enrolled".to_string(), "Withdrawn".to_string()];

        assert!(schema.update_field(
            id,
            FieldPatch {
                options: Some(options.clone()),
                required: Some(true),
                ..Default::default()
            }
        ));

        let field = schema.field(id).unwrap();
        assert_eq!(field.options.as_ref(), Some(&options));
        assert!(field.required);
    }

    #[test]
    fn test_reorder_reports_change() {
        let mut schema = FormSchema::empty();
        let a = schema.add_field(FieldType::SingleLineText);
        let b = schema.add_field(FieldType::Date);
        let c = schema.add_field(FieldType::SingleSelect);

        assert!(schema.reorder_fields(ReorderInstruction::new(a, c)));
        let order: Vec<FieldId> = schema.fields.iter().map(|f| f.id).collect();
        assert_eq!(order, vec![b, c, a]);

        assert!(!schema.reorder_fields(ReorderInstruction::new(a, a)));
        assert!(!schema.reorder_fields(ReorderInstruction::new(FieldId::new(), a)));
    }

    #[test]
    fn test_validate_detects_duplicates() {
        let mut schema = FormSchema::empty();
        schema.add_field(FieldType::SingleLineText);
        let dup = schema.fields[0].clone();
        schema.fields.push(dup.clone());

        assert_eq!(schema.validate(), Err(SchemaError::DuplicateFieldId(dup.id)));
    }

    #[test]
    fn test_validate_checks_options_against_type() {
        let mut schema = FormSchema::empty();
        let text = schema.add_field(FieldType::SingleLineText);
        let select = schema.add_field(FieldType::SingleSelect);
        assert_eq!(schema.validate(), Ok(()));

        schema.fields[0].options = Some(vec!["x".to_string()]);
        assert_eq!(schema.validate(), Err(SchemaError::UnexpectedOptions(text)));

        schema.fields[0].options = None;
        schema.fields[1].options = None;
        assert_eq!(schema.validate(), Err(SchemaError::MissingOptions(select)));
    }

    #[test]
    fn test_fresh_field_ids_keep_content() {
        let mut schema = FormSchema::empty();
        schema.add_field(FieldType::SingleSelect);
        schema.add_field(FieldType::FileUpload);

        let copy = schema.with_fresh_field_ids();
        assert_eq!(copy.fields.len(), 2);
        for (original, copied) in schema.fields.iter().zip(&copy.fields) {
            assert_ne!(original.id, copied.id);
            assert_eq!(original.label, copied.label);
            assert_eq!(original.options, copied.options);
        }
    }
}
