//! Process-local form repository.
//!
//! Selected with `storage = "memory"` in `config.toml`. Entries live only as
//! long as the process, which suits demos and the REST server in tests.

use std::sync::Arc;

use dashmap::DashMap;

use formwright_core::repository::form::{FormFilter, FormRepository};
use formwright_types::error::RepositoryError;
use formwright_types::form::{FormId, FormLibraryEntry};

/// `DashMap`-backed implementation of `FormRepository`.
///
/// Clones share the same map.
#[derive(Clone, Default)]
pub struct InMemoryFormRepository {
    entries: Arc<DashMap<FormId, FormLibraryEntry>>,
}

impl InMemoryFormRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FormRepository for InMemoryFormRepository {
    async fn upsert(&self, entry: &FormLibraryEntry) -> Result<FormLibraryEntry, RepositoryError> {
        self.entries.insert(entry.id(), entry.clone());
        Ok(entry.clone())
    }

    async fn get_by_id(&self, id: &FormId) -> Result<Option<FormLibraryEntry>, RepositoryError> {
        Ok(self.entries.get(id).map(|e| e.value().clone()))
    }

    async fn list(
        &self,
        filter: Option<FormFilter>,
    ) -> Result<Vec<FormLibraryEntry>, RepositoryError> {
        let snapshot: Vec<FormLibraryEntry> =
            self.entries.iter().map(|e| e.value().clone()).collect();
        Ok(filter.unwrap_or_default().apply(snapshot))
    }

    async fn delete(&self, id: &FormId) -> Result<(), RepositoryError> {
        self.entries.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use formwright_types::form::{FormSchema, FormStatus};

    fn entry(name: &str, status: FormStatus) -> FormLibraryEntry {
        let mut schema = FormSchema::empty();
        schema.name = name.to_string();
        schema.status = status;
        let now = Utc::now();
        FormLibraryEntry {
            schema,
            response_count: 0,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let repo = InMemoryFormRepository::new();
        let other = repo.clone();
        let saved = entry("Intake", FormStatus::Draft);

        repo.upsert(&saved).await.unwrap();

        assert_eq!(other.len(), 1);
        assert_eq!(
            other.get_by_id(&saved.id()).await.unwrap().unwrap().schema.name,
            "Intake"
        );
    }

    #[tokio::test]
    async fn test_list_applies_filter() {
        let repo = InMemoryFormRepository::new();
        repo.upsert(&entry("Intake", FormStatus::Draft)).await.unwrap();
        repo.upsert(&entry("Exit survey", FormStatus::Published))
            .await
            .unwrap();

        let published = repo
            .list(Some(FormFilter {
                status: Some(FormStatus::Published),
                ..Default::default()
            }))
            .await
            .unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].schema.name, "Exit survey");
    }

    #[tokio::test]
    async fn test_delete_missing_is_ok() {
        let repo = InMemoryFormRepository::new();
        repo.delete(&FormId::new()).await.unwrap();
        assert!(repo.is_empty());
    }
}
