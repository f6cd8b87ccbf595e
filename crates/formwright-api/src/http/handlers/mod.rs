//! HTTP request handlers for the REST API.

pub mod builder;
pub mod form;
