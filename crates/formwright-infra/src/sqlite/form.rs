//! SQLite form library repository.
//!
//! Implements `FormRepository` from `formwright-core`. The ordered field list
//! is stored as a JSON array in the `fields` column so a save is a single
//! row write.

use chrono::{DateTime, Utc};
use sqlx::Row;

use formwright_core::repository::SortOrder;
use formwright_core::repository::form::{FormFilter, FormRepository, fold_name};
use formwright_types::error::RepositoryError;
use formwright_types::field::Field;
use formwright_types::form::{FormId, FormLibraryEntry, FormSchema, FormStatus};

use super::pool::DatabasePool;

/// SQLite-backed implementation of `FormRepository`.
#[derive(Clone)]
pub struct SqliteFormRepository {
    pool: DatabasePool,
}

impl SqliteFormRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to a library entry.
struct FormRow {
    id: String,
    name: String,
    description: String,
    status: String,
    fields: String,
    response_count: i64,
    version: i64,
    created_at: String,
    updated_at: String,
}

impl FormRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            status: row.try_get("status")?,
            fields: row.try_get("fields")?,
            response_count: row.try_get("response_count")?,
            version: row.try_get("version")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_entry(self) -> Result<FormLibraryEntry, RepositoryError> {
        let id = self
            .id
            .parse::<FormId>()
            .map_err(|e| RepositoryError::Query(format!("invalid form id: {e}")))?;

        let status: FormStatus = self.status.parse().map_err(RepositoryError::Query)?;

        let fields: Vec<Field> = serde_json::from_str(&self.fields)
            .map_err(|e| RepositoryError::Query(format!("invalid fields JSON: {e}")))?;

        Ok(FormLibraryEntry {
            schema: FormSchema {
                id,
                name: self.name,
                description: self.description,
                fields,
                status,
            },
            response_count: self.response_count,
            version: self.version,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

impl FormRepository for SqliteFormRepository {
    async fn upsert(&self, entry: &FormLibraryEntry) -> Result<FormLibraryEntry, RepositoryError> {
        let fields_json = serde_json::to_string(&entry.schema.fields)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sqlx::query(
            "INSERT OR REPLACE INTO forms (id, name, name_folded, description, status, fields, response_count, version, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(entry.id().to_string())
        .bind(&entry.schema.name)
        .bind(fold_name(&entry.schema.name))
        .bind(&entry.schema.description)
        .bind(entry.schema.status.to_string())
        .bind(&fields_json)
        .bind(entry.response_count)
        .bind(entry.version)
        .bind(format_datetime(&entry.created_at))
        .bind(format_datetime(&entry.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(entry.clone())
    }

    async fn get_by_id(&self, id: &FormId) -> Result<Option<FormLibraryEntry>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM forms WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let form_row =
                    FormRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(form_row.into_entry()?))
            }
            None => Ok(None),
        }
    }

    async fn list(
        &self,
        filter: Option<FormFilter>,
    ) -> Result<Vec<FormLibraryEntry>, RepositoryError> {
        let filter = filter.unwrap_or_default();

        let mut sql = String::from("SELECT * FROM forms");
        let mut conditions: Vec<&str> = Vec::new();
        if filter.status.is_some() {
            conditions.push("status = ?");
        }
        if filter.search.is_some() {
            conditions.push("name_folded LIKE ? ESCAPE '\\'");
        }
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        // Column names come from a fixed enum, never from user input.
        let order = match filter.sort_order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        sql.push_str(&format!(" ORDER BY {} {order}", filter.sort_by.column()));

        // SQLite requires LIMIT before OFFSET; -1 means unbounded.
        let limit = filter.effective_limit();
        let offset = filter.effective_offset();
        if limit.is_some() || offset > 0 {
            sql.push_str(&format!(" LIMIT {} OFFSET {offset}", limit.unwrap_or(-1)));
        }

        let mut query = sqlx::query(&sql);
        if let Some(status) = filter.status {
            query = query.bind(status.to_string());
        }
        if let Some(search) = &filter.search {
            query = query.bind(like_pattern(&fold_name(search)));
        }

        let rows = query
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in &rows {
            let form_row =
                FormRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            entries.push(form_row.into_entry()?);
        }
        Ok(entries)
    }

    async fn delete(&self, id: &FormId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM forms WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            tracing::debug!(form_id = %id, "delete of missing form");
        }
        Ok(())
    }
}

/// `%search%` with LIKE wildcards in the search text escaped.
fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::database_url;
    use chrono::Duration;
    use formwright_core::repository::form::FormSortField;
    use formwright_types::field::{FieldId, FieldType};

    async fn test_repo() -> SqliteFormRepository {
        let dir = tempfile::tempdir().unwrap();
        let url = database_url(dir.path(), "test.db");
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        SqliteFormRepository::new(DatabasePool::new(&url).await.unwrap())
    }

    fn make_entry(name: &str) -> FormLibraryEntry {
        let now = Utc::now();
        FormLibraryEntry {
            schema: FormSchema {
                id: FormId::new(),
                name: name.to_string(),
                description: format!("{name} description"),
                fields: vec![
                    Field {
                        id: FieldId::new(),
                        field_type: FieldType::SingleLineText,
                        label: "Name".to_string(),
                        required: true,
                        options: None,
                    },
                    Field {
                        id: FieldId::new(),
                        field_type: FieldType::SingleSelect,
                        label: "Arm".to_string(),
                        required: false,
                        options: Some(vec!["B".to_string(), "A".to_string()]),
                    },
                ],
                status: FormStatus::Draft,
            },
            response_count: 0,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_upsert_and_get_by_id() {
        let repo = test_repo().await;
        let entry = make_entry("Intake");

        repo.upsert(&entry).await.unwrap();
        let loaded = repo.get_by_id(&entry.id()).await.unwrap().unwrap();

        assert_eq!(loaded.schema, entry.schema);
        assert_eq!(loaded.version, 1);
        assert_eq!(
            loaded.created_at.timestamp_millis(),
            entry.created_at.timestamp_millis()
        );
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let repo = test_repo().await;
        assert!(repo.get_by_id(&FormId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_row() {
        let repo = test_repo().await;
        let mut entry = make_entry("Intake");
        repo.upsert(&entry).await.unwrap();

        entry.schema.fields.reverse();
        entry.version = 2;
        repo.upsert(&entry).await.unwrap();

        let all = repo.list(None).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].version, 2);
        assert_eq!(all[0].schema.fields[0].label, "Arm");
    }

    #[tokio::test]
    async fn test_list_filters_and_sorts() {
        let repo = test_repo().await;
        let base = Utc::now();

        let mut alpha = make_entry("Alpha survey");
        alpha.updated_at = base - Duration::minutes(2);
        let mut beta = make_entry("Beta intake");
        beta.updated_at = base - Duration::minutes(1);
        beta.schema.status = FormStatus::Published;
        let mut gamma = make_entry("Gamma survey");
        gamma.updated_at = base;

        for entry in [&alpha, &beta, &gamma] {
            repo.upsert(entry).await.unwrap();
        }

        let newest_first = repo.list(None).await.unwrap();
        let names: Vec<&str> = newest_first.iter().map(|e| e.schema.name.as_str()).collect();
        assert_eq!(names, vec!["Gamma survey", "Beta intake", "Alpha survey"]);

        let published = repo
            .list(Some(FormFilter {
                status: Some(FormStatus::Published),
                ..Default::default()
            }))
            .await
            .unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].id(), beta.id());

        let surveys = repo
            .list(Some(FormFilter {
                search: Some("SURVEY".to_string()),
                sort_by: FormSortField::Name,
                sort_order: SortOrder::Asc,
                ..Default::default()
            }))
            .await
            .unwrap();
        let names: Vec<&str> = surveys.iter().map(|e| e.schema.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha survey", "Gamma survey"]);
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let repo = test_repo().await;
        for i in 0..5 {
            repo.upsert(&make_entry(&format!("Form {i}"))).await.unwrap();
        }

        let page = repo
            .list(Some(FormFilter {
                sort_by: FormSortField::Name,
                sort_order: SortOrder::Asc,
                limit: Some(2),
                offset: Some(1),
                ..Default::default()
            }))
            .await
            .unwrap();
        let names: Vec<&str> = page.iter().map(|e| e.schema.name.as_str()).collect();
        assert_eq!(names, vec!["Form 1", "Form 2"]);

        let tail = repo
            .list(Some(FormFilter {
                sort_by: FormSortField::Name,
                sort_order: SortOrder::Asc,
                offset: Some(3),
                ..Default::default()
            }))
            .await
            .unwrap();
        assert_eq!(tail.len(), 2);
    }

    #[tokio::test]
    async fn test_search_matches_non_ascii_case_insensitively() {
        let repo = test_repo().await;
        repo.upsert(&make_entry("Ärztliche Anamnese")).await.unwrap();
        repo.upsert(&make_entry("Intake")).await.unwrap();

        let hits = repo
            .list(Some(FormFilter {
                search: Some("äRZTLICHE".to_string()),
                ..Default::default()
            }))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].schema.name, "Ärztliche Anamnese");
    }

    #[tokio::test]
    async fn test_negative_limit_is_unbounded() {
        let repo = test_repo().await;
        for i in 0..3 {
            repo.upsert(&make_entry(&format!("Form {i}"))).await.unwrap();
        }

        let all = repo
            .list(Some(FormFilter {
                limit: Some(-1),
                ..Default::default()
            }))
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_search_escapes_wildcards() {
        let repo = test_repo().await;
        repo.upsert(&make_entry("100% done")).await.unwrap();
        repo.upsert(&make_entry("100 items")).await.unwrap();

        let hits = repo
            .list(Some(FormFilter {
                search: Some("100%".to_string()),
                ..Default::default()
            }))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].schema.name, "100% done");
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let repo = test_repo().await;
        let entry = make_entry("Intake");
        repo.upsert(&entry).await.unwrap();

        repo.delete(&entry.id()).await.unwrap();
        repo.delete(&entry.id()).await.unwrap();
        assert!(repo.get_by_id(&entry.id()).await.unwrap().is_none());
    }

    #[test]
    fn test_like_pattern() {
        assert_eq!(like_pattern("intake"), "%intake%");
        assert_eq!(like_pattern("a_b%"), "%a\\_b\\%%");
    }
}
