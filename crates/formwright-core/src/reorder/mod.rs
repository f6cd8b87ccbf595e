//! Reorder engine: single-element list moves keyed by field identity.
//!
//! `try_move` reports why an instruction was rejected; `move_field` is the
//! form the builder uses, absorbing rejections so a stale gesture event can
//! never corrupt the field order.

pub mod gesture;

use formwright_types::error::SchemaError;
use formwright_types::field::{Field, FieldId, ReorderInstruction};

/// Position of the field with the given id, if present.
pub fn index_of(fields: &[Field], id: FieldId) -> Option<usize> {
    fields.iter().position(|f| f.id == id)
}

/// Move `source_id` into the slot held by `target_id`.
///
/// The source is removed first and then inserted at the target's index in
/// the shortened list, so moving forward lands after the target and moving
/// backward lands before it. All other fields keep their relative order.
///
/// # Errors
///
/// - `InvalidMove` when source and target are the same field.
/// - `FieldNotFound` when either id is absent.
pub fn try_move(
    fields: &[Field],
    instruction: ReorderInstruction,
) -> Result<Vec<Field>, SchemaError> {
    let ReorderInstruction {
        source_id,
        target_id,
    } = instruction;

    let source_index =
        index_of(fields, source_id).ok_or(SchemaError::FieldNotFound(source_id))?;
    let target_index =
        index_of(fields, target_id).ok_or(SchemaError::FieldNotFound(target_id))?;

    if source_index == target_index {
        return Err(SchemaError::InvalidMove(source_id));
    }

    let mut reordered = fields.to_vec();
    let moved = reordered.remove(source_index);
    reordered.insert(target_index, moved);
    Ok(reordered)
}

/// Infallible variant of [`try_move`]: rejected instructions return the
/// input order unchanged.
pub fn move_field(fields: &[Field], instruction: ReorderInstruction) -> Vec<Field> {
    match try_move(fields, instruction) {
        Ok(reordered) => reordered,
        Err(e) => {
            tracing::debug!(error = %e, "ignoring reorder instruction");
            fields.to_vec()
        }
    }
}
