//! Geocoding proxy

use axum::{
    Json,
    extract::{Query, State},
};
use clientmap_core::Suggestion;
use clientmap_geocode::{GeocodeProvider, controller::MIN_QUERY_LEN};
use serde::Deserialize;
use tracing::debug;

use crate::app::{AppState, CurrentUser};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct GeocodeParams {
    #[serde(default)]
    pub q: String,
    /// Overrides the configured provider
    pub provider: Option<GeocodeProvider>,
}

pub async fn search(
    State(state): State<AppState>,
    _caller: CurrentUser,
    Query(params): Query<GeocodeParams>,
) -> Result<Json<Vec<Suggestion>>, ApiError> {
    let query = params.q.trim();
    if query.chars().count() < MIN_QUERY_LEN {
        debug!("Query too short, skipping lookup");
        return Ok(Json(Vec::new()));
    }

    let provider = params.provider.unwrap_or_else(|| state.geocoder.provider());
    match state.geocoder.search_with(provider, query).await {
        Ok(suggestions) => {
            let outcome = if suggestions.is_empty() { "empty" } else { "found" };
            state.metrics.record_geocode(provider.name(), outcome);
            Ok(Json(suggestions))
        }
        Err(e) => {
            state.metrics.record_geocode(provider.name(), "error");
            Err(e.into())
        }
    }
}
