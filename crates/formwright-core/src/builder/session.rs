//! Builder session: the controller that owns one in-progress form schema.
//!
//! State machine:
//!
//! ```text
//! Idle --start_new/start_edit--> Editing --save--> Saving --ok--> Idle
//!                                  |  ^                  |
//!                                  |  +------failure-----+
//!                                  +--cancel--> Idle
//! ```
//!
//! Field operations referencing unknown ids are absorbed as no-ops so a
//! stale UI event never corrupts the schema. Only persistence failures are
//! surfaced, and they leave the session in `Editing` with every edit intact.

use serde::Serialize;

use formwright_types::error::BuilderError;
use formwright_types::field::{Field, FieldId, FieldPatch, FieldType, ReorderInstruction};
use formwright_types::form::{FormLibraryEntry, FormSchema, FormStatus};

use crate::builder::preview::FormPreview;
use crate::reorder::gesture::{DragGesture, MoveDirection, keyboard_instruction};
use crate::repository::form::FormRepository;
use crate::schema::FormSchemaExt;
use crate::service::library::FormLibrary;

/// Lifecycle state of a builder session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No form open.
    Idle,
    /// A schema is open and mutable.
    Editing,
    /// A save is in flight.
    Saving,
}

/// Whether the open schema already has a library entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionOrigin {
    New,
    Existing,
}

/// Stateful controller for one form-editing interaction.
#[derive(Debug)]
pub struct BuilderSession {
    state: SessionState,
    origin: SessionOrigin,
    schema: Option<FormSchema>,
    drag: Option<DragGesture>,
    dirty: bool,
    last_error: Option<String>,
}

impl Default for BuilderSession {
    fn default() -> Self {
        Self::new()
    }
}

impl BuilderSession {
    /// A session in `Idle` with no form open.
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            origin: SessionOrigin::New,
            schema: None,
            drag: None,
            dirty: false,
            last_error: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn origin(&self) -> SessionOrigin {
        self.origin
    }

    /// The open schema, if any.
    pub fn schema(&self) -> Option<&FormSchema> {
        self.schema.as_ref()
    }

    /// Whether the open schema has changed since it was opened.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Message from the most recent failed save, cleared on the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether a pointer drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Idle -> Editing with a blank schema.
    pub fn start_new(&mut self) -> Result<&FormSchema, BuilderError> {
        self.open(FormSchema::empty(), SessionOrigin::New)
    }

    /// Idle -> Editing with a deep copy of an existing schema.
    ///
    /// Edits never touch the library copy until `save`.
    pub fn start_edit(&mut self, existing: &FormSchema) -> Result<&FormSchema, BuilderError> {
        self.open(existing.clone(), SessionOrigin::Existing)
    }

    fn open(
        &mut self,
        schema: FormSchema,
        origin: SessionOrigin,
    ) -> Result<&FormSchema, BuilderError> {
        if self.state != SessionState::Idle {
            return Err(BuilderError::SessionActive);
        }
        tracing::debug!(form_id = %schema.id, ?origin, "builder session opened");
        self.state = SessionState::Editing;
        self.origin = origin;
        self.drag = None;
        self.dirty = false;
        self.last_error = None;
        Ok(self.schema.insert(schema))
    }

    /// Editing -> Idle, discarding the open schema and any drag in progress.
    ///
    /// Returns `true` if a form was open.
    pub fn cancel(&mut self) -> bool {
        let discarded = self.schema.take();
        if let Some(schema) = &discarded {
            tracing::debug!(form_id = %schema.id, dirty = self.dirty, "builder session cancelled");
        }
        self.state = SessionState::Idle;
        self.drag = None;
        self.dirty = false;
        self.last_error = None;
        discarded.is_some()
    }

    /// Editing -> Saving -> Idle: write a snapshot of the schema into the
    /// library.
    ///
    /// An unfinished drag is discarded, not committed. On failure the session
    /// returns to `Editing` with the schema untouched and the error recorded.
    pub async fn save<R: FormRepository>(
        &mut self,
        library: &FormLibrary<R>,
    ) -> Result<FormLibraryEntry, BuilderError> {
        let snapshot = self.editing()?.clone();
        self.drag = None;
        let in_flight = SaveInFlight::begin(&mut self.state);

        match library.save_form(snapshot).await {
            Ok(entry) => {
                in_flight.finish(SessionState::Idle);
                self.schema = None;
                self.dirty = false;
                self.last_error = None;
                Ok(entry)
            }
            Err(e) => {
                tracing::warn!(error = %e, "form save failed, staying in editing");
                in_flight.finish(SessionState::Editing);
                let message = e.to_string();
                self.last_error = Some(message.clone());
                Err(BuilderError::Persistence(message))
            }
        }
    }

    /// Read-only rendering of the open schema. Does not change state.
    pub fn preview(&self) -> Result<FormPreview, BuilderError> {
        Ok(FormPreview::from_schema(self.editing()?))
    }

    // -----------------------------------------------------------------------
    // Field operations
    // -----------------------------------------------------------------------

    fn editing(&self) -> Result<&FormSchema, BuilderError> {
        match (self.state, &self.schema) {
            (SessionState::Editing, Some(schema)) => Ok(schema),
            _ => Err(BuilderError::NoOpenForm),
        }
    }

    fn editing_mut(&mut self) -> Result<&mut FormSchema, BuilderError> {
        match (self.state, &mut self.schema) {
            (SessionState::Editing, Some(schema)) => Ok(schema),
            _ => Err(BuilderError::NoOpenForm),
        }
    }

    /// Append a default field of `field_type`.
    pub fn add_field(&mut self, field_type: FieldType) -> Result<FieldId, BuilderError> {
        let id = self.editing_mut()?.add_field(field_type);
        self.abandon_drag();
        self.dirty = true;
        Ok(id)
    }

    /// Remove a field. Unknown ids are ignored.
    pub fn delete_field(&mut self, id: FieldId) -> Result<(), BuilderError> {
        match self.editing_mut()?.delete_field(id) {
            Some(_) => {
                self.abandon_drag();
                self.dirty = true;
            }
            None => tracing::debug!(field_id = %id, "delete of unknown field ignored"),
        }
        Ok(())
    }

    /// Apply a partial update to a field. Unknown ids are ignored.
    pub fn update_field(&mut self, id: FieldId, patch: FieldPatch) -> Result<(), BuilderError> {
        if self.editing_mut()?.update_field(id, patch) {
            self.dirty = true;
        }
        Ok(())
    }

    /// Apply a reorder instruction. Rejected instructions are ignored.
    pub fn reorder_fields(&mut self, instruction: ReorderInstruction) -> Result<(), BuilderError> {
        if self.editing_mut()?.reorder_fields(instruction) {
            self.dirty = true;
        }
        Ok(())
    }

    /// Keyboard move-up/move-down. No-op at the list edges.
    pub fn move_field(&mut self, id: FieldId, direction: MoveDirection) -> Result<(), BuilderError> {
        let instruction = keyboard_instruction(&self.editing()?.fields, id, direction);
        match instruction {
            Some(instruction) => self.reorder_fields(instruction),
            None => Ok(()),
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), BuilderError> {
        self.editing_mut()?.name = name.into();
        self.dirty = true;
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> Result<(), BuilderError> {
        self.editing_mut()?.description = description.into();
        self.dirty = true;
        Ok(())
    }

    pub fn set_status(&mut self, status: FormStatus) -> Result<(), BuilderError> {
        let schema = self.editing_mut()?;
        if schema.status != status {
            schema.status = status;
            self.dirty = true;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Pointer drag
    // -----------------------------------------------------------------------

    /// Begin dragging `source_id`. Unknown ids are ignored.
    pub fn drag_start(&mut self, source_id: FieldId) -> Result<(), BuilderError> {
        let gesture = DragGesture::begin(&self.editing()?.fields, source_id);
        if gesture.is_none() {
            tracing::debug!(%source_id, "drag start on unknown field ignored");
        }
        self.drag = gesture;
        Ok(())
    }

    /// Pointer over `target_id`: returns the preview order. The schema itself
    /// is unchanged until `drag_end`.
    pub fn drag_over(&mut self, target_id: FieldId) -> Result<Vec<Field>, BuilderError> {
        let current = self.editing()?.fields.clone();
        match self.drag.as_mut() {
            Some(drag) => Ok(drag.over(target_id).to_vec()),
            None => Ok(current),
        }
    }

    /// Pointer released: commit the previewed move.
    pub fn drag_end(&mut self) -> Result<(), BuilderError> {
        self.editing()?;
        match self.drag.take().and_then(DragGesture::end) {
            Some(instruction) => self.reorder_fields(instruction),
            None => Ok(()),
        }
    }

    /// Abort the drag, leaving the schema as it was.
    pub fn drag_cancel(&mut self) -> Result<(), BuilderError> {
        self.editing()?;
        self.drag = None;
        Ok(())
    }

    /// The order to render: the drag preview while dragging, otherwise the
    /// schema's own order.
    pub fn display_fields(&self) -> Result<&[Field], BuilderError> {
        let schema = self.editing()?;
        Ok(match &self.drag {
            Some(drag) => drag.preview(),
            None => &schema.fields,
        })
    }

    fn abandon_drag(&mut self) {
        if self.drag.take().is_some() {
            tracing::debug!("drag abandoned after field list changed");
        }
    }
}

/// Holds a session in `Saving` for the duration of one library write.
///
/// If the save future is dropped before the write resolves (for example a
/// client disconnecting mid-request), the session falls back to `Editing`
/// with the schema intact.
struct SaveInFlight<'a> {
    state: &'a mut SessionState,
}

impl<'a> SaveInFlight<'a> {
    fn begin(state: &'a mut SessionState) -> Self {
        *state = SessionState::Saving;
        Self { state }
    }

    fn finish(self, next: SessionState) {
        *self.state = next;
    }
}

impl Drop for SaveInFlight<'_> {
    fn drop(&mut self) {
        if *self.state == SessionState::Saving {
            tracing::warn!("form save abandoned before completion, back to editing");
            *self.state = SessionState::Editing;
        }
    }
}
