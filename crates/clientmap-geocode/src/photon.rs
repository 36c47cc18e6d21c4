//! Photon connector
//!
//! `GET {base}/api/?q=..&limit=5` returns a GeoJSON FeatureCollection. Labels
//! are assembled from the feature's name and administrative properties.

use crate::{
    MAX_SUGGESTIONS, Result,
    client::{endpoint_url, get_json, with_retry},
};
use clientmap_core::{Coordinate, Suggestion};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

pub const DEFAULT_BASE_URL: &str = "https://photon.komoot.io";

#[derive(Debug, Clone, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    pub geometry: Geometry,
    #[serde(default)]
    pub properties: Properties,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    /// GeoJSON order: longitude first
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Properties {
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub osm_value: Option<String>,
    #[serde(rename = "type")]
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
    let url = endpoint_url(base_url, "api/", &[("q", query), ("limit", limit.as_str())])?;
    debug!("Searching Photon: {}", url);

    let collection: FeatureCollection =
        with_retry(max_retries, || get_json(client, url.clone())).await?;
    Ok(normalize(collection))
}

/// Convert a Photon feature collection into suggestions.
///
/// Features without a usable point geometry are skipped.
pub fn normalize(collection: FeatureCollection) -> Vec<Suggestion> {
    collection
        .features
        .into_iter()
        .filter_map(|feature| {
            let [lng, lat] = match feature.geometry.coordinates.as_slice() {
                [lng, lat, ..] => [*lng, *lat],
                _ => {
                    warn!("Skipping Photon feature without point coordinates");
                    return None;
                }
            };
            let coordinate = Coordinate::new(lat, lng);
            let props = feature.properties;
            let label = label_for(&props).unwrap_or_else(|| coordinate.to_string());
            let kind = props
                .osm_value
                .or(props.kind)
                .filter(|k| !k.is_empty());
            Some(Suggestion {
                label,
                coordinate,
                kind,
            })
        })
        .take(MAX_SUGGESTIONS)
        .collect()
}

fn label_for(props: &Properties) -> Option<String> {
    let mut parts: Vec<&str> = Vec::with_capacity(4);
    for part in [&props.name, &props.city, &props.state, &props.country]
        .into_iter()
        .flatten()
    {
        let part = part.trim();
        // Photon repeats the city as the name for city features
        if !part.is_empty() && !parts.contains(&part) {
            parts.push(part);
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(json: serde_json::Value) -> FeatureCollection {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_normalize_swaps_geojson_order() {
        let suggestions = normalize(collection(serde_json::json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [-89.644, 39.799]},
                "properties": {
                    "name": "Springfield",
                    "state": "Illinois",
                    "country": "United States",
                    "osm_value": "city",
                    "type": "city"
                }
            }]
        })));

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].coordinate, Coordinate::new(39.799, -89.644));
        assert_eq!(suggestions[0].label, "Springfield, Illinois, United States");
        assert_eq!(suggestions[0].kind.as_deref(), Some("city"));
    }

    #[test]
    fn test_label_skips_missing_and_duplicate_parts() {
        let props = Properties {
            name: Some("Lyon".to_string()),
            city: Some("Lyon".to_string()),
            state: None,
            country: Some("France".to_string()),
            ..Default::default()
        };
        assert_eq!(label_for(&props).as_deref(), Some("Lyon, France"));
        assert_eq!(label_for(&Properties::default()), None);
    }

    #[test]
    fn test_unnamed_feature_falls_back_to_coordinate() {
        let suggestions = normalize(collection(serde_json::json!({
            "features": [{"geometry": {"coordinates": [2.0, 1.0]}}]
        })));
        assert_eq!(suggestions[0].label, "1.00000, 2.00000");
        assert_eq!(suggestions[0].kind, None);
    }

    #[test]
    fn test_normalize_skips_bad_geometry_and_caps() {
        let mut features = vec![serde_json::json!({"geometry": {"coordinates": [1.0]}})];
        for i in 0..7 {
            features.push(serde_json::json!({
                "geometry": {"coordinates": [i as f64, 0.0]},
                "properties": {"name": format!("F{}", i)}
            }));
        }
        let suggestions = normalize(collection(serde_json::json!({ "features": features })));
        assert_eq!(suggestions.len(), MAX_SUGGESTIONS);
        assert_eq!(suggestions[0].label, "F0");
    }

    #[test]
    fn test_empty_collection() {
        assert!(normalize(collection(serde_json::json!({"features": []}))).is_empty());
        assert!(normalize(collection(serde_json::json!({}))).is_empty());
    }
}
