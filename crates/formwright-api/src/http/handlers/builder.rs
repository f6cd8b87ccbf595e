//! Builder session handlers for the REST API.
//!
//! Each session lives in `AppState::sessions` behind an async mutex. A
//! handler clones the session handle out of the map, then locks it; the map
//! guard is never held across an await.

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use formwright_core::builder::{BuilderSession, FormPreview, SessionOrigin, SessionState};
use formwright_core::reorder::gesture::MoveDirection;
use formwright_types::field::{Field, FieldId, FieldPatch, FieldType, ReorderInstruction};
use formwright_types::form::{FormId, FormLibraryEntry, FormSchema, FormStatus};

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::{AppState, SharedSession};

/// Snapshot of a session returned by every builder endpoint.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub state: SessionState,
    pub origin: SessionOrigin,
    pub dirty: bool,
    pub dragging: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub schema: Option<FormSchema>,
    /// Fields in render order: the drag preview while dragging.
    pub display_fields: Vec<Field>,
}

impl SessionView {
    pub fn of(id: Uuid, session: &BuilderSession) -> Self {
        Self {
            id,
            state: session.state(),
            origin: session.origin(),
            dirty: session.is_dirty(),
            dragging: session.is_dragging(),
            last_error: session.last_error().map(str::to_string),
            schema: session.schema().cloned(),
            display_fields: session
                .display_fields()
                .map(<[Field]>::to_vec)
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StartSessionRequest {
    /// Open a copy of this saved form; omit for a blank form.
    #[serde(default)]
    pub form_id: Option<FormId>,
}

#[derive(Debug, Deserialize)]
pub struct AddFieldRequest {
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub field_id: FieldId,
    pub direction: MoveDirection,
}

#[derive(Debug, Deserialize)]
pub struct DragTargetRequest {
    pub field_id: FieldId,
}

#[derive(Debug, Deserialize)]
pub struct MetaRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<FormStatus>,
}

fn session_link(id: Uuid) -> String {
    format!("/api/v1/builder/sessions/{id}")
}

fn lookup(state: &AppState, id: Uuid) -> Result<SharedSession, AppError> {
    state.session(&id).ok_or(AppError::SessionNotFound)
}

/// Lock a session, apply `op`, and return the resulting view.
async fn mutate<F>(
    state: &AppState,
    id: Uuid,
    op: F,
) -> Result<Json<ApiResponse<SessionView>>, AppError>
where
    F: FnOnce(&mut BuilderSession) -> Result<(), AppError>,
{
    let timer = RequestTimer::start();
    let shared = lookup(state, id)?;
    let mut session = shared.lock().await;
    op(&mut session)?;
    let view = SessionView::of(id, &session);
    Ok(Json(timer.finish(view).with_link("self", &session_link(id))))
}

/// POST /api/v1/builder/sessions - Open a builder session.
pub async fn create_session(
    State(state): State<AppState>,
    Json(body): Json<StartSessionRequest>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    let timer = RequestTimer::start();

    let mut session = BuilderSession::new();
    match body.form_id {
        Some(form_id) => {
            let schema = state.form_library.get_form(&form_id).await?;
            session.start_edit(&schema)?;
        }
        None => {
            session.start_new()?;
        }
    }

    let origin = session.origin();
    let (id, shared) = state.insert_session(session);
    tracing::info!(session_id = %id, ?origin, "builder session started");

    let view = SessionView::of(id, &*shared.lock().await);
    Ok(Json(
        timer
            .finish(view)
            .with_link("self", &session_link(id))
            .with_link("preview", &format!("{}/preview", session_link(id))),
    ))
}

/// GET /api/v1/builder/sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    mutate(&state, id, |_| Ok(())).await
}

/// DELETE /api/v1/builder/sessions/{id} - Cancel, discarding unsaved edits.
pub async fn cancel_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let timer = RequestTimer::start();
    let shared = state.remove_session(&id).ok_or(AppError::SessionNotFound)?;
    let discarded = shared.lock().await.cancel();
    Ok(Json(timer.finish(serde_json::json!({
        "cancelled": true,
        "discarded_form": discarded,
    }))))
}

/// POST /api/v1/builder/sessions/{id}/fields - Append a default field.
pub async fn add_field(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<AddFieldRequest>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    mutate(&state, id, |s| {
        s.add_field(body.field_type)?;
        Ok(())
    })
    .await
}

/// PATCH /api/v1/builder/sessions/{id}/fields/{field_id}
pub async fn update_field(
    State(state): State<AppState>,
    Path((id, field_id)): Path<(Uuid, Uuid)>,
    Json(patch): Json<FieldPatch>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    mutate(&state, id, |s| {
        s.update_field(FieldId::from_uuid(field_id), patch)?;
        Ok(())
    })
    .await
}

/// DELETE /api/v1/builder/sessions/{id}/fields/{field_id}
pub async fn delete_field(
    State(state): State<AppState>,
    Path((id, field_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    mutate(&state, id, |s| {
        s.delete_field(FieldId::from_uuid(field_id))?;
        Ok(())
    })
    .await
}

/// POST /api/v1/builder/sessions/{id}/reorder - Apply a reorder instruction.
pub async fn reorder_fields(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(instruction): Json<ReorderInstruction>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    mutate(&state, id, |s| {
        s.reorder_fields(instruction)?;
        Ok(())
    })
    .await
}

/// POST /api/v1/builder/sessions/{id}/move - Keyboard move up/down.
pub async fn move_field(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<MoveRequest>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    mutate(&state, id, |s| {
        s.move_field(body.field_id, body.direction)?;
        Ok(())
    })
    .await
}

/// POST /api/v1/builder/sessions/{id}/drag/start
pub async fn drag_start(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<DragTargetRequest>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    mutate(&state, id, |s| {
        s.drag_start(body.field_id)?;
        Ok(())
    })
    .await
}

/// POST /api/v1/builder/sessions/{id}/drag/over - Update the preview order.
pub async fn drag_over(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<DragTargetRequest>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    mutate(&state, id, |s| {
        s.drag_over(body.field_id)?;
        Ok(())
    })
    .await
}

/// POST /api/v1/builder/sessions/{id}/drag/end - Commit the previewed move.
pub async fn drag_end(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    mutate(&state, id, |s| {
        s.drag_end()?;
        Ok(())
    })
    .await
}

/// POST /api/v1/builder/sessions/{id}/drag/cancel
pub async fn drag_cancel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    mutate(&state, id, |s| {
        s.drag_cancel()?;
        Ok(())
    })
    .await
}

/// PUT /api/v1/builder/sessions/{id}/meta - Name, description, status.
pub async fn update_meta(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<MetaRequest>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    mutate(&state, id, |s| {
        if let Some(name) = body.name {
            s.set_name(name)?;
        }
        if let Some(description) = body.description {
            s.set_description(description)?;
        }
        if let Some(status) = body.status {
            s.set_status(status)?;
        }
        Ok(())
    })
    .await
}

/// GET /api/v1/builder/sessions/{id}/preview
pub async fn preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FormPreview>>, AppError> {
    let timer = RequestTimer::start();
    let shared = lookup(&state, id)?;
    let preview = shared.lock().await.preview()?;
    Ok(Json(timer.finish(preview).with_link("session", &session_link(id))))
}

/// POST /api/v1/builder/sessions/{id}/save
///
/// On success the session is closed and removed. On failure it stays open
/// with its edits, and the client may retry.
pub async fn save(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FormLibraryEntry>>, AppError> {
    let timer = RequestTimer::start();
    let shared = lookup(&state, id)?;

    let entry = {
        let mut session = shared.lock().await;
        session.save(state.form_library.as_ref()).await?
    };
    state.remove_session(&id);

    let link = format!("/api/v1/forms/{}", entry.id());
    Ok(Json(timer.finish(entry).with_link("form", &link)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwright_types::config::{GlobalConfig, StorageBackend};

    async fn memory_state() -> AppState {
        let config = GlobalConfig {
            storage: StorageBackend::Memory,
            ..Default::default()
        };
        AppState::with_config(config, std::env::temp_dir()).await.unwrap()
    }

    fn data<T: Serialize>(resp: Json<ApiResponse<T>>) -> T {
        resp.0.data.unwrap()
    }

    async fn start(state: &AppState) -> Uuid {
        let view = data(
            create_session(State(state.clone()), Json(StartSessionRequest::default()))
                .await
                .unwrap(),
        );
        view.id
    }

    async fn add(state: &AppState, id: Uuid, field_type: FieldType) -> FieldId {
        let view = data(
            add_field(State(state.clone()), Path(id), Json(AddFieldRequest { field_type }))
                .await
                .unwrap(),
        );
        view.display_fields.last().unwrap().id
    }

    #[tokio::test]
    async fn test_build_and_save_over_http() {
        let state = memory_state().await;
        let id = start(&state).await;
        let a = add(&state, id, FieldType::SingleLineText).await;
        let b = add(&state, id, FieldType::SingleSelect).await;

        let view = data(
            reorder_fields(
                State(state.clone()),
                Path(id),
                Json(ReorderInstruction::new(a, b)),
            )
            .await
            .unwrap(),
        );
        let order: Vec<FieldId> = view.display_fields.iter().map(|f| f.id).collect();
        assert_eq!(order, vec![b, a]);

        let entry = data(save(State(state.clone()), Path(id)).await.unwrap());
        assert_eq!(entry.schema.fields.len(), 2);
        assert!(state.session(&id).is_none());

        let stored = state.form_library.get_form(&entry.id()).await.unwrap();
        assert_eq!(stored.fields[0].id, b);
    }

    #[tokio::test]
    async fn test_drag_over_http_previews_then_commits() {
        let state = memory_state().await;
        let id = start(&state).await;
        let a = add(&state, id, FieldType::SingleLineText).await;
        let b = add(&state, id, FieldType::Date).await;

        drag_start(State(state.clone()), Path(id), Json(DragTargetRequest { field_id: a }))
            .await
            .unwrap();
        let view = data(
            drag_over(State(state.clone()), Path(id), Json(DragTargetRequest { field_id: b }))
                .await
                .unwrap(),
        );
        assert!(view.dragging);
        assert_eq!(view.display_fields[0].id, b);
        assert_eq!(view.schema.as_ref().unwrap().fields[0].id, a);

        let view = data(drag_end(State(state.clone()), Path(id)).await.unwrap());
        assert!(!view.dragging);
        assert_eq!(view.schema.unwrap().fields[0].id, b);
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let state = memory_state().await;
        let result = get_session(State(state), Path(Uuid::now_v7())).await;
        assert!(matches!(result, Err(AppError::SessionNotFound)));
    }

    #[tokio::test]
    async fn test_cancel_removes_session() {
        let state = memory_state().await;
        let id = start(&state).await;
        add(&state, id, FieldType::Date).await;

        cancel_session(State(state.clone()), Path(id)).await.unwrap();

        assert!(state.session(&id).is_none());
        assert!(state.form_library.list_forms(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_edit_existing_form_session() {
        let state = memory_state().await;
        let mut schema = FormSchema::empty();
        schema.name = "Saved".to_string();
        state.form_library.save_form(schema.clone()).await.unwrap();

        let view = data(
            create_session(
                State(state.clone()),
                Json(StartSessionRequest {
                    form_id: Some(schema.id),
                }),
            )
            .await
            .unwrap(),
        );
        assert_eq!(view.origin, SessionOrigin::Existing);
        assert_eq!(view.schema.unwrap().name, "Saved");
    }

    #[tokio::test]
    async fn test_edit_missing_form_fails() {
        let state = memory_state().await;
        let result = create_session(
            State(state.clone()),
            Json(StartSessionRequest {
                form_id: Some(FormId::new()),
            }),
        )
        .await;
        assert!(matches!(result, Err(AppError::Form(_))));
        assert!(state.sessions.is_empty());
    }

    #[tokio::test]
    async fn test_expired_session_is_not_found() {
        let mut state = memory_state().await;
        state.session_idle = std::time::Duration::from_millis(10);
        let id = start(&state).await;

        tokio::time::sleep(std::time::Duration::from_millis(30)).await;

        let err = get_session(State(state.clone()), Path(id)).await.unwrap_err();
        let (status, code, _) = err.parts();
        assert_eq!(status, axum::http::StatusCode::NOT_FOUND);
        assert_eq!(code, "SESSION_NOT_FOUND");
        assert!(state.sessions.is_empty());
    }
}
