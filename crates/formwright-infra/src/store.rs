//! Backend selection for the form library.

use std::path::Path;

use anyhow::Context;

use formwright_core::repository::form::{FormFilter, FormRepository};
use formwright_types::config::{GlobalConfig, StorageBackend};
use formwright_types::error::RepositoryError;
use formwright_types::form::{FormId, FormLibraryEntry};

use crate::memory::InMemoryFormRepository;
use crate::sqlite::form::SqliteFormRepository;
use crate::sqlite::pool::{DatabasePool, database_url};

/// The configured `FormRepository`, chosen at startup from
/// [`GlobalConfig::storage`].
#[derive(Clone)]
pub enum FormStore {
    Sqlite(SqliteFormRepository),
    Memory(InMemoryFormRepository),
}

impl FormStore {
    /// Open the backend named in `config`, creating `data_dir` for SQLite.
    pub async fn open(config: &GlobalConfig, data_dir: &Path) -> anyhow::Result<Self> {
        match config.storage {
            StorageBackend::Sqlite => {
                tokio::fs::create_dir_all(data_dir)
                    .await
                    .with_context(|| format!("failed to create {}", data_dir.display()))?;
                let url = database_url(data_dir, &config.database_file);
                let pool = DatabasePool::new(&url)
                    .await
                    .with_context(|| format!("failed to open database {url}"))?;
                tracing::info!(%url, "form library opened");
                Ok(FormStore::Sqlite(SqliteFormRepository::new(pool)))
            }
            StorageBackend::Memory => {
                tracing::info!("form library is in-memory, forms will not persist");
                Ok(FormStore::Memory(InMemoryFormRepository::new()))
            }
        }
    }

    pub fn backend(&self) -> StorageBackend {
        match self {
            FormStore::Sqlite(_) => StorageBackend::Sqlite,
            FormStore::Memory(_) => StorageBackend::Memory,
        }
    }
}

impl FormRepository for FormStore {
    async fn upsert(&self, entry: &FormLibraryEntry) -> Result<FormLibraryEntry, RepositoryError> {
        match self {
            FormStore::Sqlite(repo) => repo.upsert(entry).await,
            FormStore::Memory(repo) => repo.upsert(entry).await,
        }
    }

    async fn get_by_id(&self, id: &FormId) -> Result<Option<FormLibraryEntry>, RepositoryError> {
        match self {
            FormStore::Sqlite(repo) => repo.get_by_id(id).await,
            FormStore::Memory(repo) => repo.get_by_id(id).await,
        }
    }

    async fn list(
        &self,
        filter: Option<FormFilter>,
    ) -> Result<Vec<FormLibraryEntry>, RepositoryError> {
        match self {
            FormStore::Sqlite(repo) => repo.list(filter).await,
            FormStore::Memory(repo) => repo.list(filter).await,
        }
    }

    async fn delete(&self, id: &FormId) -> Result<(), RepositoryError> {
        match self {
            FormStore::Sqlite(repo) => repo.delete(id).await,
            FormStore::Memory(repo) => repo.delete(id).await,
        }
    }
}
