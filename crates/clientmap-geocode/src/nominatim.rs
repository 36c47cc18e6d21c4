//! Nominatim connector
//!
//! `GET {base}/search?q=..&format=json&limit=5` returns a JSON array of
//! places whose coordinates are encoded as strings.

use crate::{
    GeocodeError, MAX_SUGGESTIONS, Result,
    client::{endpoint_url, get_json, with_retry},
};
use clientmap_core::{Coordinate, Suggestion};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// One entry of a Nominatim search response
#[derive(Debug, Clone, Deserialize)]
pub struct NominatimPlace {
    pub display_name: String,
    pub lat: String,
    pub lon: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[instrument(skip(client))]
pub async fn search(
    client: &Client,
    base_url: &str,
    query: &str,
    max_retries: u32,
) -> Result<Vec<Suggestion>> {
    let limit = MAX_SUGGESTIONS.to_string();
    let url = endpoint_url(
        base_url,
        "search",
        &[("q", query), ("format", "json"), ("limit", limit.as_str())],
    )?;
    debug!("Searching Nominatim: {}", url);

    let places: Vec<NominatimPlace> =
        with_retry(max_retries, || get_json(client, url.clone())).await?;
    normalize(places)
}

/// Convert Nominatim places into suggestions, keeping provider order
pub fn normalize(places: Vec<NominatimPlace>) -> Result<Vec<Suggestion>> {
    places
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|place| {
            let lat = parse_degrees(&place.lat, "lat")?;
            let lng = parse_degrees(&place.lon, "lon")?;
            Ok(Suggestion {
                label: place.display_name,
                coordinate: Coordinate::new(lat, lng),
                kind: place.kind.filter(|k| !k.is_empty()),
            })
        })
        .collect()
}

fn parse_degrees(value: &str, field: &str) -> Result<f64> {
    value.trim().parse::<f64>().map_err(|e| {
        GeocodeError::ParseError(format!("Nominatim {} '{}' is not a number: {}", field, value, e))
    })
}
