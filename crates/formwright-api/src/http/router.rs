//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, patch, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Form library
        .route(
            "/forms",
            get(handlers::form::list_forms).post(handlers::form::save_form),
        )
        .route(
            "/forms/{id}",
            get(handlers::form::get_form).delete(handlers::form::delete_form),
        )
        .route("/forms/{id}/status", put(handlers::form::set_status))
        .route("/forms/{id}/duplicate", post(handlers::form::duplicate_form))
        // Builder sessions
        .route("/builder/sessions", post(handlers::builder::create_session))
        .route(
            "/builder/sessions/{id}",
            get(handlers::builder::get_session).delete(handlers::builder::cancel_session),
        )
        .route(
            "/builder/sessions/{id}/fields",
            post(handlers::builder::add_field),
        )
        .route(
            "/builder/sessions/{id}/fields/{field_id}",
            patch(handlers::builder::update_field).delete(handlers::builder::delete_field),
        )
        .route(
            "/builder/sessions/{id}/reorder",
            post(handlers::builder::reorder_fields),
        )
        .route(
            "/builder/sessions/{id}/move",
            post(handlers::builder::move_field),
        )
        .route(
            "/builder/sessions/{id}/drag/start",
            post(handlers::builder::drag_start),
        )
        .route(
            "/builder/sessions/{id}/drag/over",
            post(handlers::builder::drag_over),
        )
        .route(
            "/builder/sessions/{id}/drag/end",
            post(handlers::builder::drag_end),
        )
        .route(
            "/builder/sessions/{id}/drag/cancel",
            post(handlers::builder::drag_cancel),
        )
        .route(
            "/builder/sessions/{id}/meta",
            put(handlers::builder::update_meta),
        )
        .route(
            "/builder/sessions/{id}/preview",
            get(handlers::builder::preview),
        )
        .route(
            "/builder/sessions/{id}/save",
            post(handlers::builder::save),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
