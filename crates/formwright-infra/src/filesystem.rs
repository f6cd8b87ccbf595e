//! Filesystem adapters: data directory resolution and schema file transfer.

use std::path::{Path, PathBuf};

use anyhow::Context;

use formwright_types::form::FormSchema;

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `FORMWRIGHT_DATA_DIR` environment variable
/// 2. `~/.formwright`
pub fn resolve_data_dir() -> PathBuf {
    data_dir_from(std::env::var("FORMWRIGHT_DATA_DIR").ok(), dirs::home_dir())
}

fn data_dir_from(env_dir: Option<String>, home: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = env_dir.filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }

    if let Some(home) = home {
        return home.join(".formwright");
    }

    // Last resort: current directory
    PathBuf::from(".formwright")
}

/// Write `schema` as pretty-printed JSON, creating parent directories.
pub async fn export_schema(path: &Path, schema: &FormSchema) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(schema)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::debug!(form_id = %schema.id, path = %path.display(), "schema exported");
    Ok(())
}

/// Read a schema previously written by [`export_schema`]. Ids are kept
/// as-is, so importing over an existing form updates it.
pub async fn import_schema(path: &Path) -> anyhow::Result<FormSchema> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let schema = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a form schema", path.display()))?;
    Ok(schema)
}
