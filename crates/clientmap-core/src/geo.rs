//! Geographic primitives shared by records, markers and search

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// A WGS84 latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Check that both components are finite and within range
    pub fn validate(&self) -> Result<()> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(Error::Validation(format!(
                "latitude {} is outside [-90, 90]",
                self.lat
            )));
        }
        if !self.lng.is_finite() || !(-180.0..=180.0).contains(&self.lng) {
            return Err(Error::Validation(format!(
                "longitude {} is outside [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lng)
    }
}

/// A geocoder search candidate.
///
/// Suggestions live only for one search session and are never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub label: String,
    pub coordinate: Coordinate,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// The location a user picked from the suggestion list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedLocation {
    pub name: String,
    pub coordinate: Coordinate,
}

impl From<Suggestion> for SelectedLocation {
    fn from(suggestion: Suggestion) -> Self {
        Self {
            name: suggestion.label,
            coordinate: suggestion.coordinate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_validate_in_range() {
        assert!(Coordinate::new(0.0, 0.0).validate().is_ok());
        assert!(Coordinate::new(90.0, 180.0).validate().is_ok());
        assert!(Coordinate::new(-90.0, -180.0).validate().is_ok());
    }

    #[test]
    fn test_coordinate_validate_out_of_range() {
        assert!(Coordinate::new(90.5, 0.0).validate().is_err());
        assert!(Coordinate::new(0.0, -180.1).validate().is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).validate().is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).validate().is_err());
    }

    #[test]
    fn test_suggestion_type_field_name() {
        let suggestion = Suggestion {
            label: "Springfield, Illinois".to_string(),
            coordinate: Coordinate::new(39.8, -89.6),
            kind: Some("city".to_string()),
        };
        let json = serde_json::to_value(&suggestion).unwrap();
        assert_eq!(json["type"], "city");
        assert_eq!(json["coordinate"]["lat"], 39.8);

        let untyped = Suggestion {
            kind: None,
            ..suggestion
        };
        let json = serde_json::to_value(&untyped).unwrap();
        assert!(json.get("type").is_none());
    }

    #[test]
    fn test_selected_location_from_suggestion() {
        let suggestion = Suggestion {
            label: "Paris".to_string(),
            coordinate: Coordinate::new(48.85, 2.35),
            kind: None,
        };
        let selected = SelectedLocation::from(suggestion);
        assert_eq!(selected.name, "Paris");
        assert_eq!(selected.coordinate, Coordinate::new(48.85, 2.35));
    }
}
