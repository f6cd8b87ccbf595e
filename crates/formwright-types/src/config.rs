//! Global configuration types for Formwright.
//!
//! `GlobalConfig` represents the top-level `config.toml` that selects the
//! form library backend and the API server defaults.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Loaded from `~/.formwright/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Where saved forms live.
    #[serde(default)]
    pub storage: StorageBackend,

    /// SQLite database file name, relative to the data directory.
    #[serde(default = "default_database_file")]
    pub database_file: String,

    #[serde(default)]
    pub server: ServerConfig,
}

/// Form library backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Persistent SQLite database in the data directory.
    #[default]
    Sqlite,
    /// Process-local map; forms vanish when the process exits.
    Memory,
}

/// REST API bind address defaults (CLI flags override these).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Builder sessions untouched for this many seconds are closed.
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

fn default_database_file() -> String {
    "formwright.db".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_session_idle_secs() -> u64 {
    30 * 60
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            session_idle_secs: default_session_idle_secs(),
        }
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            storage: StorageBackend::default(),
            database_file: default_database_file(),
            server: ServerConfig::default(),
        }
    }
}
