use axum::{Json, extract::State};
use clientmap_dashboard::MapConfig;

use crate::app::AppState;

/// Tile source for the map widget
pub async fn config(State(state): State<AppState>) -> Json<MapConfig> {
    Json(state.map.clone())
}
