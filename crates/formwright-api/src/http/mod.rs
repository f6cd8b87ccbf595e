//! HTTP/REST API layer for Formwright.
//!
//! Axum-based REST API at `/api/v1/` with an envelope response format and
//! CORS support. Library routes wrap `FormLibrary`; builder routes drive
//! `BuilderSession`s held in `AppState`.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
