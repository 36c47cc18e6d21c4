//! Server configuration
//!
//! Loaded from YAML or TOML (by file extension), then overridden by
//! `CLIENTMAP_*` environment variables.

use clientmap_core::{AccessPolicy, RegistrationPolicy, identity::DEFAULT_MIN_PASSWORD_LEN};
use clientmap_dashboard::MapConfig;
use clientmap_geocode::{GeocodeProvider, GeocoderConfig, client::HttpClientConfig, nominatim, photon};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub geocoder: GeocoderSettings,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub map: MapConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderSettings {
    #[serde(default)]
    pub provider: GeocodeProvider,

    #[serde(default = "default_nominatim_url")]
    pub nominatim_url: String,

    #[serde(default = "default_photon_url")]
    pub photon_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Email domains allowed to sign up. Empty allows any domain.
    #[serde(default)]
    pub allowed_domains: Vec<String>,

    /// Users who see every client record
    #[serde(default)]
    pub admin_emails: Vec<String>,

    #[serde(default = "default_min_password_len")]
    pub min_password_len: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON file the record store persists to; in-memory only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logging: LoggingConfig::default(),
            geocoder: GeocoderSettings::default(),
            auth: AuthConfig::default(),
            map: MapConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for GeocoderSettings {
    fn default() -> Self {
        Self {
            provider: GeocodeProvider::default(),
            nominatim_url: default_nominatim_url(),
            photon_url: default_photon_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            allowed_domains: Vec::new(),
            admin_emails: Vec::new(),
            min_password_len: default_min_password_len(),
        }
    }
}

impl ServerConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&contents)?
        } else {
            // Default to YAML
            serde_yaml::from_str(&contents)?
        };

        Ok(config)
    }

    /// Merge environment variables into config (env vars take precedence)
    pub fn merge_env(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any variable source
    pub fn merge_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("CLIENTMAP_HOST") {
            self.host = val;
        }

        if let Some(val) = var("CLIENTMAP_PORT") {
            match val.parse::<u16>() {
                Ok(port) => self.port = port,
                Err(_) => eprintln!("Warning: Invalid CLIENTMAP_PORT '{}', ignoring", val),
            }
        }

        if let Some(val) = var("CLIENTMAP_LOG_LEVEL") {
            self.logging.level = val;
        }

        if let Some(val) = var("CLIENTMAP_GEOCODER") {
            match val.parse() {
                Ok(provider) => self.geocoder.provider = provider,
                Err(e) => eprintln!("Warning: {}, using {}", e, self.geocoder.provider),
            }
        }

        if let Some(val) = var("CLIENTMAP_NOMINATIM_URL") {
            self.geocoder.nominatim_url = val;
        }

        if let Some(val) = var("CLIENTMAP_PHOTON_URL") {
            self.geocoder.photon_url = val;
        }

        if let Some(val) = var("CLIENTMAP_ADMIN_EMAILS") {
            self.auth.admin_emails = split_list(&val);
        }

        if let Some(val) = var("CLIENTMAP_ALLOWED_DOMAINS") {
            self.auth.allowed_domains = split_list(&val);
        }

        if let Some(val) = var("CLIENTMAP_SNAPSHOT_PATH") {
            self.storage.snapshot_path = Some(PathBuf::from(val));
        }
    }

    pub fn geocoder_config(&self) -> GeocoderConfig {
        let client_config = HttpClientConfig {
            timeout_secs: self.geocoder.timeout_secs,
            ..HttpClientConfig::default()
        };
        GeocoderConfig {
            provider: self.geocoder.provider,
            nominatim_url: self.geocoder.nominatim_url.clone(),
            photon_url: self.geocoder.photon_url.clone(),
            client_config,
        }
    }

    pub fn registration_policy(&self) -> RegistrationPolicy {
        RegistrationPolicy {
            allowed_domains: self.auth.allowed_domains.clone(),
            min_password_len: self.auth.min_password_len,
        }
    }

    pub fn access_policy(&self) -> AccessPolicy {
        AccessPolicy::new(self.auth.admin_emails.iter().cloned())
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_nominatim_url() -> String {
    nominatim::DEFAULT_BASE_URL.to_string()
}

fn default_photon_url() -> String {
    photon::DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_min_password_len() -> usize {
    DEFAULT_MIN_PASSWORD_LEN
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.geocoder.provider, GeocodeProvider::Nominatim);
        assert_eq!(config.auth.min_password_len, 6);
        assert!(config.auth.allowed_domains.is_empty());
        assert_eq!(config.map, MapConfig::default());
        assert!(config.storage.snapshot_path.is_none());
    }

    #[test]
    fn test_load_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("clientmap.yaml");
        std::fs::write(
            &path,
            r#"
port: 9000
logging:
  level: debug
  json: true
geocoder:
  provider: photon
  photon_url: http://localhost:2322
auth:
  allowed_domains: [example.com]
  admin_emails: [boss@example.com]
"#,
        )
        .unwrap();

        let config = ServerConfig::from_file(&path).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "127.0.0.1");
        assert!(config.logging.json);
        assert_eq!(config.geocoder.provider, GeocodeProvider::Photon);
        assert_eq!(config.geocoder.photon_url, "http://localhost:2322");
        assert!(config.geocoder.nominatim_url.contains("nominatim"));
        assert_eq!(config.auth.allowed_domains, vec!["example.com"]);
        assert_eq!(config.auth.min_password_len, 6);
    }

    #[test]
    fn test_load_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("clientmap.toml");
        std::fs::write(
            &path,
            r#"
host = "0.0.0.0"

[geocoder]
timeout_secs = 3

[map]
tile_url = "https://tiles.example.com/{z}/{x}/{y}.png"

[storage]
snapshot_path = "/var/lib/clientmap/records.json"
"#,
        )
        .unwrap();

        let config = ServerConfig::from_file(&path).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.geocoder.timeout_secs, 3);
        assert_eq!(config.geocoder_config().client_config.timeout_secs, 3);
        assert_eq!(config.map.tile_url, "https://tiles.example.com/{z}/{x}/{y}.png");
        assert_eq!(config.map.attribution, "&copy; OpenStreetMap contributors");
        assert_eq!(
            config.storage.snapshot_path,
            Some(PathBuf::from("/var/lib/clientmap/records.json"))
        );
    }

    #[test]
    fn test_invalid_file_errors() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.yaml");
        std::fs::write(&path, "port: [not a number").unwrap();
        assert!(matches!(
            ServerConfig::from_file(&path),
            Err(ConfigError::Yaml(_))
        ));

        let missing = temp_dir.path().join("missing.toml");
        assert!(matches!(
            ServerConfig::from_file(&missing),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ServerConfig::default();
        config.merge_vars(vars(&[
            ("CLIENTMAP_HOST", "0.0.0.0"),
            ("CLIENTMAP_PORT", "3000"),
            ("CLIENTMAP_LOG_LEVEL", "trace"),
            ("CLIENTMAP_GEOCODER", "Photon"),
            ("CLIENTMAP_NOMINATIM_URL", "http://nominatim.local"),
            ("CLIENTMAP_ADMIN_EMAILS", "boss@example.com, cto@example.com"),
            ("CLIENTMAP_ALLOWED_DOMAINS", "example.com,,partner.org "),
        ]));

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.logging.level, "trace");
        assert_eq!(config.geocoder.provider, GeocodeProvider::Photon);
        assert_eq!(config.geocoder.nominatim_url, "http://nominatim.local");
        assert_eq!(
            config.auth.admin_emails,
            vec!["boss@example.com", "cto@example.com"]
        );
        assert_eq!(
            config.auth.allowed_domains,
            vec!["example.com", "partner.org"]
        );
    }

    #[test]
    fn test_invalid_env_values_are_ignored() {
        let mut config = ServerConfig::default();
        config.merge_vars(vars(&[
            ("CLIENTMAP_PORT", "eighty"),
            ("CLIENTMAP_GEOCODER", "google"),
        ]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.geocoder.provider, GeocodeProvider::Nominatim);
    }

    #[test]
    fn test_policies_follow_auth_section() {
        let mut config = ServerConfig::default();
        config.auth.admin_emails = vec!["Boss@Example.com".to_string()];
        config.auth.min_password_len = 10;

        let registration = config.registration_policy();
        assert!(registration.validate("a@b.co", "short1", "short1").is_err());

        let access = config.access_policy();
        assert!(access.is_admin(&clientmap_core::UserIdentity {
            uid: "u1".to_string(),
            email: "boss@example.com".to_string(),
        }));
    }
}
