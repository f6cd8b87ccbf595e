//! Shared domain types for Formwright.
//!
//! This crate contains the core domain types used across the form builder:
//! Field, FormSchema, FormLibraryEntry, configuration, and their associated
//! error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod error;
pub mod field;
pub mod form;
