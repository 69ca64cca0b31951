use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::{AppResult, OptionExt},
    state::AppState,
    types::{ItemsResponse, Preset},
};

#[derive(Debug, Deserialize)]
pub struct PresetListQuery {
    pub category: Option<String>,
}

/// `GET /api/presets[?category=..]`
pub async fn list_presets(
    State(state): State<AppState>,
    Query(q): Query<PresetListQuery>,
) -> Json<ItemsResponse<Preset>> {
    let items = match q.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        Some(category) => state.presets.by_category(category).into_iter().cloned().collect(),
        None => state.presets.all().to_vec(),
    };
    Json(ItemsResponse { items })
}

/// `GET /api/presets/categories`
pub async fn list_categories(State(state): State<AppState>) -> Json<ItemsResponse<String>> {
    let items = state.presets.categories().into_iter().map(str::to_string).collect();
    Json(ItemsResponse { items })
}

/// `GET /api/presets/{id}`
pub async fn get_preset(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<Preset>> {
    let preset = state.presets.get(&id).cloned().ok_or_not_found(&format!("Preset '{}'", id))?;
    Ok(Json(preset))
}

/// `GET /api/presets/search/{q}`
pub async fn search_presets(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> Json<ItemsResponse<Preset>> {
    let items = state.presets.search(&query).into_iter().cloned().collect();
    Json(ItemsResponse { items })
}
