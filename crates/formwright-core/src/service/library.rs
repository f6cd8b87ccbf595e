//! Form library service.
//!
//! Owns the persisted collection of saved form schemas. Saving is
//! create-or-update keyed by form id: the first save of a schema creates its
//! library entry, later saves overwrite it (last write wins) while keeping
//! the creation timestamp and response count and bumping the version.

use chrono::Utc;

use formwright_types::error::{FormError, RepositoryError};
use formwright_types::form::{FormId, FormLibraryEntry, FormSchema, FormStatus};

use crate::repository::form::{FormFilter, FormRepository};
use crate::schema::FormSchemaExt;

/// Service over a `FormRepository`.
///
/// Generic over the repository trait to maintain clean architecture --
/// formwright-core never depends on formwright-infra.
pub struct FormLibrary<R: FormRepository> {
    repo: R,
}

fn storage(e: RepositoryError) -> FormError {
    FormError::StorageError(e.to_string())
}

impl<R: FormRepository> FormLibrary<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// List saved forms with optional filtering.
    pub async fn list_forms(
        &self,
        filter: Option<FormFilter>,
    ) -> Result<Vec<FormLibraryEntry>, FormError> {
        self.repo.list(filter).await.map_err(storage)
    }

    /// Get a library entry (schema plus metadata) by id.
    pub async fn get_entry(&self, id: &FormId) -> Result<FormLibraryEntry, FormError> {
        self.repo
            .get_by_id(id)
            .await
            .map_err(storage)?
            .ok_or(FormError::NotFound)
    }

    /// Get the saved schema for a form.
    pub async fn get_form(&self, id: &FormId) -> Result<FormSchema, FormError> {
        Ok(self.get_entry(id).await?.schema)
    }

    /// Save a snapshot of `schema`, creating or overwriting its entry.
    ///
    /// Rejects schemas that break the unique field id invariant. An empty
    /// field list is allowed.
    pub async fn save_form(&self, schema: FormSchema) -> Result<FormLibraryEntry, FormError> {
        schema.validate()?;

        let now = Utc::now();
        let existing = self.repo.get_by_id(&schema.id).await.map_err(storage)?;

        let entry = match existing {
            Some(previous) => FormLibraryEntry {
                schema,
                response_count: previous.response_count,
                version: previous.version + 1,
                created_at: previous.created_at,
                updated_at: now,
            },
            None => FormLibraryEntry {
                schema,
                response_count: 0,
                version: 1,
                created_at: now,
                updated_at: now,
            },
        };

        let saved = self.repo.upsert(&entry).await.map_err(storage)?;
        tracing::info!(
            form_id = %saved.id(),
            version = saved.version,
            fields = saved.schema.fields.len(),
            "form saved"
        );
        Ok(saved)
    }

    /// Delete a saved form. Deleting a missing form succeeds.
    pub async fn delete_form(&self, id: &FormId) -> Result<(), FormError> {
        self.repo.delete(id).await.map_err(storage)?;
        tracing::info!(form_id = %id, "form deleted");
        Ok(())
    }

    /// Publish or unpublish a saved form.
    pub async fn set_status(
        &self,
        id: &FormId,
        status: FormStatus,
    ) -> Result<FormLibraryEntry, FormError> {
        let mut schema = self.get_form(id).await?;
        if schema.status == status {
            return self.get_entry(id).await;
        }
        schema.status = status;
        self.save_form(schema).await
    }

    /// Save a copy of a form under a new id with fresh field ids.
    ///
    /// The copy starts as a draft named `"<original> (Copy)"`.
    pub async fn duplicate_form(&self, id: &FormId) -> Result<FormLibraryEntry, FormError> {
        let source = self.get_form(id).await?;
        let mut copy = source.with_fresh_field_ids();
        copy.id = FormId::new();
        copy.name = format!("{} (Copy)", source.name);
        copy.status = FormStatus::Draft;
        self.save_form(copy).await
    }
}
