//! Defines routes for the pet registration API.
//!
//! ## Structure
//! - **Probes** (always at the root)
//!   - `GET    /healthz` — liveness
//!   - `GET    /readyz`  — readiness (store ping)
//!
//! - **Registrations** (under the configured prefix, e.g. `/api`)
//!   - `GET    {prefix}/register`      — list all
//!   - `POST   {prefix}/register`      — create (multipart)
//!   - `GET    {prefix}/register/{id}` — fetch one
//!   - `PATCH  {prefix}/register/{id}` — merge update (multipart)
//!   - `PUT    {prefix}/register/{id}` — replace update (multipart)
//!   - `DELETE {prefix}/register/{id}` — delete

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        register_handlers::{
            create_register, delete_register, get_register, list_registers, patch_register,
            put_register,
        },
    },
    services::record_service::RecordService,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::Method,
    routing::get,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Registration routes, relative to the prefix.
pub fn register_routes() -> Router<RecordService> {
    Router::new()
        .route("/register", get(list_registers).post(create_register))
        .route(
            "/register/{id}",
            get(get_register)
                .patch(patch_register)
                .put(put_register)
                .delete(delete_register),
        )
}

/// Compose probes and registration routes into a `Router<RecordService>`.
///
/// `prefix` must be empty or start with `/` and have no trailing slash; an
/// empty prefix mounts registrations at the root.
pub fn routes(prefix: &str) -> Router<RecordService> {
    let probes = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz));

    if prefix.is_empty() {
        probes.merge(register_routes())
    } else {
        probes.nest(prefix, register_routes())
    }
}

/// Full application: routes plus body limit, CORS and request tracing.
pub fn build_router(service: RecordService, prefix: &str, max_upload_bytes: usize) -> Router {
    routes(prefix)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ]),
        )
        .with_state(service)
}
