//! Gesture adapter: normalizes keyboard and pointer input into
//! `ReorderInstruction`s.
//!
//! A drag keeps its own preview order, recomputed from the order captured at
//! drag start on every `over` event. The authoritative field list is only
//! touched when the caller applies the instruction returned by `end`.

use serde::{Deserialize, Serialize};

use formwright_types::field::{Field, FieldId, ReorderInstruction};

use super::{index_of, move_field};

/// Direction of a keyboard move command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

/// Turn a move-up/move-down command into an instruction targeting the
/// neighbouring field.
///
/// Returns `None` at the list edges or when `field_id` is unknown.
pub fn keyboard_instruction(
    fields: &[Field],
    field_id: FieldId,
    direction: MoveDirection,
) -> Option<ReorderInstruction> {
    let index = index_of(fields, field_id)?;
    let neighbour = match direction {
        MoveDirection::Up => index.checked_sub(1)?,
        MoveDirection::Down => index + 1,
    };
    let target = fields.get(neighbour)?;
    Some(ReorderInstruction::new(field_id, target.id))
}

/// An in-flight pointer drag.
#[derive(Debug, Clone)]
pub struct DragGesture {
    source_id: FieldId,
    base: Vec<Field>,
    target_id: Option<FieldId>,
    preview: Vec<Field>,
}

impl DragGesture {
    /// Start dragging `source_id` over the given committed order.
    ///
    /// Returns `None` if the source is not in the list.
    pub fn begin(fields: &[Field], source_id: FieldId) -> Option<Self> {
        index_of(fields, source_id)?;
        Some(Self {
            source_id,
            base: fields.to_vec(),
            target_id: None,
            preview: fields.to_vec(),
        })
    }

    pub fn source_id(&self) -> FieldId {
        self.source_id
    }

    /// The field currently hovered, if the pointer has left the source.
    pub fn target_id(&self) -> Option<FieldId> {
        self.target_id
    }

    /// Pointer moved over `target_id`. Returns the updated preview order.
    ///
    /// Hovering an unknown id leaves the previous preview in place.
    pub fn over(&mut self, target_id: FieldId) -> &[Field] {
        if index_of(&self.base, target_id).is_none() {
            tracing::debug!(%target_id, "drag over unknown field ignored");
            return &self.preview;
        }

        if target_id == self.source_id {
            self.target_id = None;
            self.preview = self.base.clone();
        } else {
            self.target_id = Some(target_id);
            self.preview = move_field(
                &self.base,
                ReorderInstruction::new(self.source_id, target_id),
            );
        }
        &self.preview
    }

    /// Order to render while the drag is in progress.
    pub fn preview(&self) -> &[Field] {
        &self.preview
    }

    /// Pointer released: the instruction to commit, if any.
    pub fn end(self) -> Option<ReorderInstruction> {
        self.target_id
            .map(|target_id| ReorderInstruction::new(self.source_id, target_id))
    }
}
