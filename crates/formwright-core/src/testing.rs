//! Test doubles for the repository ports.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use formwright_types::error::RepositoryError;
use formwright_types::form::{FormId, FormLibraryEntry};

use crate::repository::form::{FormFilter, FormRepository};

/// Map-backed repository. Clones share storage, so a test can keep a handle
/// to flip `fail_writes` after handing the repository to a service.
#[derive(Clone, Default)]
pub struct MemoryFormRepository {
    entries: Arc<Mutex<HashMap<FormId, FormLibraryEntry>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryFormRepository {
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

impl FormRepository for MemoryFormRepository {
    async fn upsert(&self, entry: &FormLibraryEntry) -> Result<FormLibraryEntry, RepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Connection);
        }
        self.entries
            .lock()
            .unwrap()
            .insert(entry.id(), entry.clone());
        Ok(entry.clone())
    }

    async fn get_by_id(&self, id: &FormId) -> Result<Option<FormLibraryEntry>, RepositoryError> {
        Ok(self.entries.lock().unwrap().get(id).cloned())
    }

    async fn list(
        &self,
        filter: Option<FormFilter>,
    ) -> Result<Vec<FormLibraryEntry>, RepositoryError> {
        let entries: Vec<FormLibraryEntry> =
            self.entries.lock().unwrap().values().cloned().collect();
        Ok(filter.unwrap_or_default().apply(entries))
    }

    async fn delete(&self, id: &FormId) -> Result<(), RepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Connection);
        }
        self.entries.lock().unwrap().remove(id);
        Ok(())
    }
}

/// Repository whose every call fails.
pub struct FailingFormRepository;

impl FormRepository for FailingFormRepository {
    async fn upsert(&self, _entry: &FormLibraryEntry) -> Result<FormLibraryEntry, RepositoryError> {
        Err(RepositoryError::Connection)
    }

    async fn get_by_id(&self, _id: &FormId) -> Result<Option<FormLibraryEntry>, RepositoryError> {
        Err(RepositoryError::Connection)
    }

    async fn list(
        &self,
        _filter: Option<FormFilter>,
    ) -> Result<Vec<FormLibraryEntry>, RepositoryError> {
        Err(RepositoryError::Connection)
    }

    async fn delete(&self, _id: &FormId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Connection)
    }
}

/// Repository whose writes never resolve, for exercising abandoned saves.
pub struct StalledFormRepository;

impl FormRepository for StalledFormRepository {
    async fn upsert(&self, _entry: &FormLibraryEntry) -> Result<FormLibraryEntry, RepositoryError> {
        std::future::pending().await
    }

    async fn get_by_id(&self, _id: &FormId) -> Result<Option<FormLibraryEntry>, RepositoryError> {
        Ok(None)
    }

    async fn list(
        &self,
        _filter: Option<FormFilter>,
    ) -> Result<Vec<FormLibraryEntry>, RepositoryError> {
        Ok(Vec::new())
    }

    async fn delete(&self, _id: &FormId) -> Result<(), RepositoryError> {
        std::future::pending().await
    }
}
