//! Shared HTTP client utilities

use crate::{GeocodeError, Result};
use reqwest::{Client, ClientBuilder, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    /// Maximum number of idle connections per host
    pub pool_max_idle_per_host: usize,

    /// Maximum number of retries for transient errors
    pub max_retries: u32,

    /// User agent string. Nominatim's usage policy rejects anonymous clients.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            connect_timeout_secs: 5,
            pool_max_idle_per_host: 8,
            max_retries: 1,
            user_agent: format!("ClientMap/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Create a configured HTTP client with connection pooling
pub fn create_client(config: &HttpClientConfig) -> Result<Client> {
    ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .pool_idle_timeout(Duration::from_secs(90))
        .user_agent(&config.user_agent)
        .build()
        .map_err(|e| GeocodeError::ConfigError(format!("Failed to create HTTP client: {}", e)))
}

/// Join a base URL and path and attach query parameters
pub fn endpoint_url(base_url: &str, path: &str, params: &[(&str, &str)]) -> Result<Url> {
    let raw = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse_with_params(&raw, params)
        .map_err(|e| GeocodeError::ConfigError(format!("Invalid provider URL '{}': {}", raw, e)))
}

/// GET a URL and decode its JSON body, mapping non-2xx statuses to
/// `GeocodeError::ProviderError`
pub async fn get_json<T: DeserializeOwned>(client: &Client, url: Url) -> Result<T> {
    let response = client.get(url).send().await?;
    let status = response.status();
    debug!("Geocoder responded with status {}", status);

    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error body".to_string());
        return Err(GeocodeError::ProviderError {
            status_code: status.as_u16(),
            message: body,
        });
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| GeocodeError::ParseError(e.to_string()))
}

/// Retry policy for transient errors
pub async fn with_retry<F, Fut, T>(max_retries: u32, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut last_error = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            let backoff_ms = 2u64.pow(attempt - 1) * 100; // 100ms, 200ms, 400ms
            debug!(
                "Retrying geocode request after {}ms (attempt {}/{})",
                backoff_ms, attempt, max_retries
            );
            tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
        }

        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                let should_retry = match &e {
                    GeocodeError::HttpError(req_err) => {
                        req_err.is_connect() || req_err.is_timeout()
                    }
                    GeocodeError::ProviderError { status_code, .. } => {
                        matches!(status_code, 429 | 500 | 502 | 503 | 504)
                    }
                    _ => false,
                };

                if should_retry && attempt < max_retries {
                    warn!(
                        "Geocode request failed (attempt {}/{}): {}",
                        attempt + 1,
                        max_retries + 1,
                        e
                    );
                    last_error = Some(e);
                } else {
                    return Err(e);
                }
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| GeocodeError::ConfigError("Retry loop exited unexpectedly".to_string())))
}
