pub mod health;
pub mod openapi;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::Config;
use crate::state::AppState;
use crate::{jobs, matching, resumes};

/// Headroom over `MAX_UPLOAD_BYTES` for multipart boundaries and headers, so
/// an oversized file is reported by the upload validator rather than cut off.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(health::ping_handler))
        .route("/api/openapi.json", get(openapi::openapi_handler))
        // Resume API
        .route("/api/v1/resumes", get(resumes::handlers::handle_list_resumes))
        .route(
            "/api/v1/resumes/upload",
            post(resumes::handlers::handle_upload),
        )
        .route(
            "/api/v1/resumes/improve",
            post(resumes::handlers::handle_improve),
        )
        .route(
            "/api/v1/resumes/:id",
            get(resumes::handlers::handle_get_resume)
                .delete(resumes::handlers::handle_delete_resume),
        )
        // Job API
        .route("/api/v1/jobs", get(jobs::handlers::handle_list_jobs))
        .route("/api/v1/jobs/upload", post(jobs::handlers::handle_upload))
        .route("/api/v1/jobs/:id", get(jobs::handlers::handle_get_job))
        // Matching API
        .route("/api/v1/match", post(matching::handlers::handle_match))
        .route(
            "/api/v1/match/compare",
            post(matching::handlers::handle_compare),
        )
        .with_state(state)
}

/// Router plus the HTTP layers: body limit, CORS and request tracing.
pub fn build_app(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;
    let cors = cors_layer(&state.config);

    build_router(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}
