//! HTTP route handlers for the MCP config manager API.
//!
//! - `config`: read, validate and save the Claude Desktop configuration
//! - `presets`: the preset template catalog
//! - `health`: liveness, version and metrics endpoints

pub mod config;
pub mod health;
pub mod presets;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::{
    routing::{get, post},
    Router,
};

use crate::config::AppConfig;
use crate::middleware;
use crate::state::AppState;

/// All JSON endpoints, bound to `state`. The static UI fallback is added by the binary.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/version", get(health::version))
        .route("/metrics", get(health::metrics))
        .route("/api/config", get(config::get_config).post(config::save_config))
        .route("/api/config/full", get(config::get_full_config))
        .route("/api/config/path", get(config::get_config_path))
        .route("/api/config/info", get(config::get_config_info))
        .route("/api/config/validate", post(config::validate_config))
        .route("/api/config/backups", get(config::list_backups))
        .route("/api/presets", get(presets::list_presets))
        .route("/api/presets/categories", get(presets::list_categories))
        .route("/api/presets/search/{q}", get(presets::search_presets))
        .route("/api/presets/{id}", get(presets::get_preset))
        .with_state(state)
}

/// Request-level middleware shared by the API and the static UI.
pub fn with_middleware(router: Router, cfg: Arc<AppConfig>) -> Router {
    let body_limit = cfg.limits.max_body_bytes;
    router
        .layer(from_fn(middleware::csrf::csrf_protection_middleware))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(from_fn_with_state(cfg.clone(), middleware::validation::validate_request_middleware))
        .layer(from_fn_with_state(cfg, middleware::security_headers::security_headers_middleware))
}
