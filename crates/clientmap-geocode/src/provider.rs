//! Provider selection
//!
//! The two geocoders share one contract: free text in, at most
//! `MAX_SUGGESTIONS` normalized suggestions out. `GeocodeProvider` names
//! which one a `Geocoder` dispatches to.

use crate::{
    GeocodeError, Result,
    client::{HttpClientConfig, create_client},
    nominatim, photon,
};
use async_trait::async_trait;
use clientmap_core::Suggestion;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeocodeProvider {
    #[default]
    Nominatim,
    Photon,
}

impl GeocodeProvider {
    pub fn name(&self) -> &'static str {
        match self {
            GeocodeProvider::Nominatim => "nominatim",
            GeocodeProvider::Photon => "photon",
        }
    }
}

impl fmt::Display for GeocodeProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GeocodeProvider {
    type Err = GeocodeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "nominatim" => Ok(GeocodeProvider::Nominatim),
            "photon" => Ok(GeocodeProvider::Photon),
            other => Err(GeocodeError::ConfigError(format!(
                "Unknown geocoder '{}'. Use 'nominatim' or 'photon'",
                other
            ))),
        }
    }
}

/// Geocoder configuration
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Provider used by `search`
    pub provider: GeocodeProvider,

    pub nominatim_url: String,

    pub photon_url: String,

    pub client_config: HttpClientConfig,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            provider: GeocodeProvider::default(),
            nominatim_url: nominatim::DEFAULT_BASE_URL.to_string(),
            photon_url: photon::DEFAULT_BASE_URL.to_string(),
            client_config: HttpClientConfig::default(),
        }
    }
}

impl GeocoderConfig {
    pub fn with_provider(mut self, provider: GeocodeProvider) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_nominatim_url(mut self, url: impl Into<String>) -> Self {
        self.nominatim_url = url.into();
        self
    }

    pub fn with_photon_url(mut self, url: impl Into<String>) -> Self {
        self.photon_url = url.into();
        self
    }
}

/// Anything the search controller can ask for suggestions
#[async_trait]
pub trait SuggestionSource: Send + Sync + 'static {
    /// Look up suggestions. Zero matches is `Ok(vec![])`, not an error.
    async fn suggest(&self, query: &str) -> Result<Vec<Suggestion>>;
}

/// Geocoding client over both providers
pub struct Geocoder {
    config: GeocoderConfig,
    client: Client,
}

impl Geocoder {
    pub fn new(config: GeocoderConfig) -> Result<Self> {
        let client = create_client(&config.client_config)?;
        Ok(Self { config, client })
    }

    /// The configured default provider
    pub fn provider(&self) -> GeocodeProvider {
        self.config.provider
    }

    /// Search with the configured provider
    pub async fn search(&self, query: &str) -> Result<Vec<Suggestion>> {
        self.search_with(self.config.provider, query).await
    }

    /// Search with an explicit provider
    #[instrument(skip(self, provider), fields(provider = %provider))]
    pub async fn search_with(
        &self,
        provider: GeocodeProvider,
        query: &str,
    ) -> Result<Vec<Suggestion>> {
        let query = query.trim();
        let max_retries = self.config.client_config.max_retries;
        let suggestions = match provider {
            GeocodeProvider::Nominatim => {
                nominatim::search(&self.client, &self.config.nominatim_url, query, max_retries)
                    .await?
            }
            GeocodeProvider::Photon => {
                photon::search(&self.client, &self.config.photon_url, query, max_retries).await?
            }
        };
        debug!("{} returned {} suggestions", provider, suggestions.len());
        Ok(suggestions)
    }
}

#[async_trait]
impl SuggestionSource for Geocoder {
    async fn suggest(&self, query: &str) -> Result<Vec<Suggestion>> {
        self.search(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_str() {
        assert_eq!(
            "Nominatim".parse::<GeocodeProvider>().unwrap(),
            GeocodeProvider::Nominatim
        );
        assert_eq!(
            " photon ".parse::<GeocodeProvider>().unwrap(),
            GeocodeProvider::Photon
        );
        assert!("google".parse::<GeocodeProvider>().is_err());
    }

    #[test]
    fn test_provider_serde_lowercase() {
        let json = serde_json::to_string(&GeocodeProvider::Photon).unwrap();
        assert_eq!(json, "\"photon\"");
        let back: GeocodeProvider = serde_json::from_str("\"nominatim\"").unwrap();
        assert_eq!(back, GeocodeProvider::Nominatim);
    }

    #[test]
    fn test_default_config_points_at_public_endpoints() {
        let config = GeocoderConfig::default();
        assert_eq!(config.provider, GeocodeProvider::Nominatim);
        assert!(config.nominatim_url.contains("nominatim.openstreetmap.org"));
        assert!(config.photon_url.contains("photon.komoot.io"));
    }

    #[test]
    fn test_geocoder_reports_provider() {
        let geocoder =
            Geocoder::new(GeocoderConfig::default().with_provider(GeocodeProvider::Photon))
                .unwrap();
        assert_eq!(geocoder.provider(), GeocodeProvider::Photon);
    }
}
