//! Form library handlers for the REST API.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use uuid::Uuid;

use formwright_core::repository::form::{FormFilter, FormSortField};
use formwright_types::form::{FormId, FormLibraryEntry, FormSchema, FormStatus};

use crate::cli::form::parse_sort_order;
use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

/// Query parameters for the form list endpoint.
#[derive(Debug, Deserialize, Default)]
pub struct FormListQuery {
    /// Filter by status (draft, published).
    pub status: Option<String>,
    /// Case-insensitive substring match on the name.
    pub search: Option<String>,
    /// Sort by field.
    #[serde(default = "default_sort")]
    pub sort: String,
    /// Sort order (asc, desc).
    #[serde(default = "default_order")]
    pub order: String,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn default_sort() -> String {
    "updated_at".to_string()
}

fn default_order() -> String {
    "desc".to_string()
}

impl FormListQuery {
    pub fn into_filter(self) -> Result<FormFilter, AppError> {
        let status = match &self.status {
            Some(s) => Some(s.parse::<FormStatus>().map_err(AppError::Validation)?),
            None => None,
        };
        let sort_by = self
            .sort
            .parse::<FormSortField>()
            .map_err(AppError::Validation)?;

        Ok(FormFilter {
            status,
            search: self.search,
            sort_by,
            sort_order: parse_sort_order(&self.order),
            limit: self.limit,
            offset: self.offset,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: FormStatus,
}

fn form_link(id: FormId) -> String {
    format!("/api/v1/forms/{id}")
}

/// GET /api/v1/forms - List saved forms.
pub async fn list_forms(
    State(state): State<AppState>,
    Query(query): Query<FormListQuery>,
) -> Result<Json<ApiResponse<Vec<FormLibraryEntry>>>, AppError> {
    let timer = RequestTimer::start();
    let forms = state.form_library.list_forms(Some(query.into_filter()?)).await?;
    Ok(Json(timer.finish(forms).with_link("self", "/api/v1/forms")))
}

/// POST /api/v1/forms - Save a schema (create or overwrite by id).
pub async fn save_form(
    State(state): State<AppState>,
    Json(schema): Json<FormSchema>,
) -> Result<Json<ApiResponse<FormLibraryEntry>>, AppError> {
    let timer = RequestTimer::start();
    let entry = state.form_library.save_form(schema).await?;
    let link = form_link(entry.id());
    Ok(Json(timer.finish(entry).with_link("self", &link)))
}

/// GET /api/v1/forms/{id} - Get a saved form with its metadata.
pub async fn get_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FormLibraryEntry>>, AppError> {
    let timer = RequestTimer::start();
    let id = FormId::from_uuid(id);
    let entry = state.form_library.get_entry(&id).await?;
    Ok(Json(
        timer
            .finish(entry)
            .with_link("self", &form_link(id))
            .with_link("duplicate", &format!("{}/duplicate", form_link(id))),
    ))
}

/// DELETE /api/v1/forms/{id} - Delete a saved form. Idempotent.
pub async fn delete_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let timer = RequestTimer::start();
    let id = FormId::from_uuid(id);
    state.form_library.delete_form(&id).await?;
    Ok(Json(timer.finish(serde_json::json!({ "deleted": true, "id": id }))))
}

/// PUT /api/v1/forms/{id}/status - Publish or unpublish.
pub async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SetStatusRequest>,
) -> Result<Json<ApiResponse<FormLibraryEntry>>, AppError> {
    let timer = RequestTimer::start();
    let id = FormId::from_uuid(id);
    let entry = state.form_library.set_status(&id, body.status).await?;
    Ok(Json(timer.finish(entry).with_link("self", &form_link(id))))
}

/// POST /api/v1/forms/{id}/duplicate - Copy a form under a new id.
pub async fn duplicate_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FormLibraryEntry>>, AppError> {
    let timer = RequestTimer::start();
    let copy = state
        .form_library
        .duplicate_form(&FormId::from_uuid(id))
        .await?;
    let link = form_link(copy.id());
    Ok(Json(timer.finish(copy).with_link("self", &link)))
}
