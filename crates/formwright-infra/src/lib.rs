//! Infrastructure layer for Formwright.
//!
//! Contains implementations of the repository traits defined in
//! `formwright-core`: SQLite storage, an in-memory store, and filesystem
//! adapters for configuration and schema import/export.

pub mod config;
pub mod filesystem;
pub mod memory;
pub mod sqlite;
pub mod store;
