//! Observability setup for Formwright: structured logging with optional
//! OpenTelemetry span export.

pub mod tracing_setup;
