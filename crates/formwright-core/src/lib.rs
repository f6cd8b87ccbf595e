//! Form builder logic and repository trait definitions for Formwright.
//!
//! This crate defines the "ports" (repository traits) that the infrastructure
//! layer implements. It depends only on `formwright-types` -- never on
//! `formwright-infra` or any database/IO crate.

pub mod builder;
pub mod registry;
pub mod reorder;
pub mod repository;
pub mod schema;
pub mod service;

#[cfg(test)]
mod testing;
