use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;
use tokio::task::spawn_blocking;

use crate::{
    error::{AppError, AppResult},
    paths,
    state::AppState,
    types::{BackupEntry, ConfigInfo, ConfigPathResponse, ItemsResponse, McpConfig, SaveResponse, ValidateResponse},
    validation,
};

/// `GET /api/config`: the `mcpServers` section of the file.
pub async fn get_config(State(state): State<AppState>) -> AppResult<Json<McpConfig>> {
    let store = state.store.clone();
    let cfg = spawn_blocking(move || store.load()).await??;
    state.metrics.inc_configs_loaded();
    Ok(Json(cfg))
}

/// `GET /api/config/full`: the whole document, including keys this tool does not edit.
pub async fn get_full_config(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let store = state.store.clone();
    let doc = spawn_blocking(move || store.load_full()).await??;
    state.metrics.inc_configs_loaded();
    Ok(Json(doc))
}

/// `POST /api/config`: validate, back up and overwrite.
pub async fn save_config(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<SaveResponse>> {
    let Json(body) = payload?;

    let store = state.store.clone();
    let outcome = match spawn_blocking(move || store.save(&body)).await? {
        Ok(outcome) => outcome,
        Err(e) => {
            let err = AppError::from(e);
            if matches!(err, AppError::Validation(_)) {
                state.metrics.inc_validation_failures();
            }
            return Err(err);
        }
    };

    state.metrics.inc_configs_saved();
    if outcome.backup_path.is_some() {
        state.metrics.inc_backups_created();
    }

    Ok(Json(SaveResponse { success: true, path: outcome.path, backup_path: outcome.backup_path }))
}

/// `POST /api/config/validate`: shape check only, never writes.
pub async fn validate_config(payload: Result<Json<Value>, JsonRejection>) -> AppResult<Json<ValidateResponse>> {
    let Json(body) = payload?;
    let errors = validation::validate_config(&body);
    Ok(Json(ValidateResponse { valid: errors.is_empty(), errors }))
}

/// `GET /api/config/path`
pub async fn get_config_path(State(state): State<AppState>) -> Json<ConfigPathResponse> {
    Json(ConfigPathResponse {
        path: state.store.path().display().to_string(),
        exists: state.store.exists(),
        platform: paths::platform_name().to_string(),
    })
}

/// `GET /api/config/info`
pub async fn get_config_info(State(state): State<AppState>) -> AppResult<Json<ConfigInfo>> {
    let store = state.store.clone();
    let info = spawn_blocking(move || store.info()).await??;
    Ok(Json(info))
}

/// `GET /api/config/backups`: newest first.
pub async fn list_backups(State(state): State<AppState>) -> AppResult<Json<ItemsResponse<BackupEntry>>> {
    let store = state.store.clone();
    let items = spawn_blocking(move || store.list_backups()).await??;
    Ok(Json(ItemsResponse { items }))
}
