//! Form library repository trait definition.

use std::cmp::Ordering;

use formwright_types::error::RepositoryError;
use formwright_types::form::{FormId, FormLibraryEntry, FormStatus};

use super::SortOrder;

/// Field to sort library listings by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormSortField {
    Name,
    CreatedAt,
    #[default]
    UpdatedAt,
    ResponseCount,
}

impl FormSortField {
    /// Column name in the `forms` table.
    pub fn column(&self) -> &'static str {
        match self {
            FormSortField::Name => "name",
            FormSortField::CreatedAt => "created_at",
            FormSortField::UpdatedAt => "updated_at",
            FormSortField::ResponseCount => "response_count",
        }
    }
}

impl std::str::FromStr for FormSortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(FormSortField::Name),
            "created_at" | "created" => Ok(FormSortField::CreatedAt),
            "updated_at" | "updated" => Ok(FormSortField::UpdatedAt),
            "response_count" | "responses" => Ok(FormSortField::ResponseCount),
            other => Err(format!("invalid sort field: '{other}'")),
        }
    }
}

/// Case folding applied to form names and search text by every backend.
pub fn fold_name(name: &str) -> String {
    name.to_lowercase()
}

/// Filter criteria for listing saved forms.
#[derive(Debug, Clone, Default)]
pub struct FormFilter {
    /// Filter by publication status.
    pub status: Option<FormStatus>,
    /// Case-insensitive substring match on the form name.
    pub search: Option<String>,
    pub sort_by: FormSortField,
    pub sort_order: SortOrder,
    /// Maximum number of results. Negative means unbounded.
    pub limit: Option<i64>,
    /// Number of results to skip (offset pagination).
    pub offset: Option<i64>,
}

impl FormFilter {
    /// Whether an entry passes the status and search criteria.
    pub fn matches(&self, entry: &FormLibraryEntry) -> bool {
        if let Some(status) = self.status {
            if entry.schema.status != status {
                return false;
            }
        }
        if let Some(search) = &self.search {
            if !fold_name(&entry.schema.name).contains(&fold_name(search)) {
                return false;
            }
        }
        true
    }

    /// Ordering between two entries according to `sort_by` and `sort_order`.
    pub fn compare(&self, a: &FormLibraryEntry, b: &FormLibraryEntry) -> Ordering {
        let ordering = match self.sort_by {
            FormSortField::Name => a.schema.name.cmp(&b.schema.name),
            FormSortField::CreatedAt => a.created_at.cmp(&b.created_at),
            FormSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            FormSortField::ResponseCount => a.response_count.cmp(&b.response_count),
        };
        match self.sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }

    /// Filter, sort and paginate an in-memory collection of entries.
    pub fn apply(&self, entries: impl IntoIterator<Item = FormLibraryEntry>) -> Vec<FormLibraryEntry> {
        let mut selected: Vec<FormLibraryEntry> =
            entries.into_iter().filter(|e| self.matches(e)).collect();
        selected.sort_by(|a, b| self.compare(a, b));

        let limit = self.effective_limit().map_or(usize::MAX, |l| l as usize);
        selected
            .into_iter()
            .skip(self.effective_offset() as usize)
            .take(limit)
            .collect()
    }

    /// Page size after normalization: `None` when absent or negative.
    pub fn effective_limit(&self) -> Option<i64> {
        self.limit.filter(|l| *l >= 0)
    }

    /// Rows to skip after normalization; negative offsets count as zero.
    pub fn effective_offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

/// Repository trait for form library persistence.
///
/// Implementations live in formwright-infra (e.g., SqliteFormRepository).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait FormRepository: Send + Sync {
    /// Insert or replace the entry keyed by its form id.
    fn upsert(
        &self,
        entry: &FormLibraryEntry,
    ) -> impl std::future::Future<Output = Result<FormLibraryEntry, RepositoryError>> + Send;

    /// Get an entry by form id.
    fn get_by_id(
        &self,
        id: &FormId,
    ) -> impl std::future::Future<Output = Result<Option<FormLibraryEntry>, RepositoryError>> + Send;

    /// List entries with optional filtering, sorting, and pagination.
    fn list(
        &self,
        filter: Option<FormFilter>,
    ) -> impl std::future::Future<Output = Result<Vec<FormLibraryEntry>, RepositoryError>> + Send;

    /// Delete an entry. No-op if it does not exist.
    fn delete(
        &self,
        id: &FormId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
