//! ClientMap Geocoding
//!
//! This crate provides location search for the dashboard:
//! - Nominatim connector (provider A)
//! - Photon connector (provider B)
//! - A provider-keyed `Geocoder` that normalizes both into `Suggestion`s
//! - The debounced, cancelable search controller

pub mod client;
pub mod controller;
pub mod nominatim;
pub mod photon;
pub mod provider;

pub use controller::{SearchController, SearchState, SearchStatus};
pub use provider::{GeocodeProvider, Geocoder, GeocoderConfig, SuggestionSource};

use thiserror::Error;

/// Upper bound on suggestions returned for one query
pub const MAX_SUGGESTIONS: usize = 5;

/// Geocoding error types
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// Transport-level failure
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Non-success status from the provider
    #[error("Provider error ({status_code}): {message}")]
    ProviderError { status_code: u16, message: String },

    /// Response body did not match the provider's shape
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, GeocodeError>;
