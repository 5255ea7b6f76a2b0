//! Dashboard configuration file and credential support.
//!
//! Settings come from a `dashboard.toml` file (all sections optional) with
//! environment variables layered on top. Service credentials are two strings,
//! an account identifier and a private key, read from the environment or from
//! a TOML secrets file holding the same two keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::factory::ServiceType;
use super::service::ImageryError;
use super::providers::local::{DEFAULT_COMPOSITE_WIDTH, DEFAULT_TILE_URL_BASE};

/// Environment variable holding the service account identifier.
pub const ACCOUNT_ENV: &str = "GEE_EMAIL";
/// Environment variable holding the service account private key (PEM).
pub const PRIVATE_KEY_ENV: &str = "GEE_KEY";
/// Environment variable pointing at a TOML secrets file.
pub const SECRETS_FILE_ENV: &str = "GEE_SECRETS_FILE";

/// Complete dashboard configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub service: ServiceSettings,
    #[serde(default)]
    pub earthengine: EarthEngineSettings,
    #[serde(default)]
    pub local: LocalSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub map: MapSettings,
}

/// Which imagery backend to use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSettings {
    #[serde(rename = "type", default = "default_service_type")]
    pub service_type: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            service_type: default_service_type(),
        }
    }
}

fn default_service_type() -> String {
    "local".to_string()
}

/// Earth Engine REST settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarthEngineSettings {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    /// Cloud project; derived from the account address when empty
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_cloud_property")]
    pub cloud_property: String,
    /// TOML file with `GEE_EMAIL` / `GEE_KEY` entries
    #[serde(default)]
    pub secrets_file: Option<PathBuf>,
}

impl Default for EarthEngineSettings {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            token_uri: default_token_uri(),
            project: None,
            collection: default_collection(),
            cloud_property: default_cloud_property(),
            secrets_file: None,
        }
    }
}

fn default_api_base() -> String {
    "https://earthengine.googleapis.com".to_string()
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_collection() -> String {
    "COPERNICUS/S2_SR_HARMONIZED".to_string()
}

fn default_cloud_property() -> String {
    "CLOUDY_PIXEL_PERCENTAGE".to_string()
}

/// In-memory backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalSettings {
    #[serde(default = "default_composite_width")]
    pub composite_width: usize,
    #[serde(default = "default_tile_url_base")]
    pub tile_url_base: String,
    /// Load the synthetic demo scenes at startup
    #[serde(default = "default_true")]
    pub demo_scenes: bool,
}

impl Default for LocalSettings {
    fn default() -> Self {
        Self {
            composite_width: default_composite_width(),
            tile_url_base: default_tile_url_base(),
            demo_scenes: true,
        }
    }
}

fn default_composite_width() -> usize {
    DEFAULT_COMPOSITE_WIDTH
}

fn default_tile_url_base() -> String {
    DEFAULT_TILE_URL_BASE.to_string()
}

fn default_true() -> bool {
    true
}

/// HTTP bind settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Initial map view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapSettings {
    #[serde(default = "default_zoom")]
    pub zoom: u8,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            zoom: default_zoom(),
        }
    }
}

fn default_zoom() -> u8 {
    12
}

impl DashboardConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Returns
    /// * `Ok(DashboardConfig)` if successful
    /// * `Err(ImageryError::Configuration)` if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ImageryError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            ImageryError::configuration(format!("Failed to read config file: {}", e))
        })?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ImageryError> {
        toml::from_str(content).map_err(|e| {
            ImageryError::configuration(format!("Failed to parse config file: {}", e))
        })
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `dashboard.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, ImageryError> {
        let search_paths = [
            PathBuf::from("dashboard.toml"),
            PathBuf::from("backend/dashboard.toml"),
            PathBuf::from("../dashboard.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(ImageryError::configuration(
            "No dashboard.toml found in standard locations",
        ))
    }

    /// File configuration if present, defaults otherwise, then environment overrides.
    pub fn load() -> Result<Self, ImageryError> {
        let mut config = match Self::from_default_location() {
            Ok(config) => config,
            Err(ImageryError::Configuration { message, .. })
                if message.starts_with("No dashboard.toml") =>
            {
                Self::default()
            }
            Err(e) => return Err(e),
        };
        config.apply_env();
        Ok(config)
    }

    /// Override settings from `IMAGERY_SERVICE`, `HOST`, `PORT`, `GEE_PROJECT`
    /// and `GEE_SECRETS_FILE`.
    pub fn apply_env(&mut self) {
        if let Ok(service) = std::env::var("IMAGERY_SERVICE") {
            self.service.service_type = service;
        }
        if let Ok(host) = std::env::var("HOST") {
            self.server.host = host;
        }
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Ok(project) = std::env::var("GEE_PROJECT") {
            self.earthengine.project = Some(project);
        }
        if let Ok(path) = std::env::var(SECRETS_FILE_ENV) {
            self.earthengine.secrets_file = Some(PathBuf::from(path));
        }
    }

    /// Get the service type from configuration.
    pub fn service_type(&self) -> Result<ServiceType, String> {
        ServiceType::from_str(&self.service.service_type)
    }
}

/// Pre-issued service account credentials.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceCredentials {
    #[serde(rename = "GEE_EMAIL")]
    pub account: String,
    #[serde(rename = "GEE_KEY")]
    pub private_key: String,
}

impl fmt::Debug for ServiceCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceCredentials")
            .field("account", &self.account)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

impl ServiceCredentials {
    pub fn new(account: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            private_key: private_key.into(),
        }
    }

    /// Read `GEE_EMAIL` / `GEE_KEY` from the environment.
    pub fn from_env() -> Result<Self, ImageryError> {
        let account = std::env::var(ACCOUNT_ENV).map_err(|_| {
            ImageryError::configuration(format!("{} environment variable not set", ACCOUNT_ENV))
        })?;
        let private_key = std::env::var(PRIVATE_KEY_ENV).map_err(|_| {
            ImageryError::configuration(format!(
                "{} environment variable not set",
                PRIVATE_KEY_ENV
            ))
        })?;
        Ok(Self::new(account, private_key))
    }

    /// Read credentials from a TOML secrets file with `GEE_EMAIL` and `GEE_KEY` keys.
    pub fn from_secrets_file<P: AsRef<Path>>(path: P) -> Result<Self, ImageryError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            ImageryError::configuration(format!("Failed to read secrets file: {}", e))
        })?;
        toml::from_str(&content).map_err(|e| {
            ImageryError::configuration(format!("Failed to parse secrets file: {}", e))
        })
    }

    /// Secrets file from the settings if configured, the environment otherwise.
    pub fn resolve(settings: &EarthEngineSettings) -> Result<Self, ImageryError> {
        match &settings.secrets_file {
            Some(path) => Self::from_secrets_file(path),
            None => Self::from_env(),
        }
    }

    /// PEM key with escaped newlines (as stored in single-line secrets) restored.
    pub fn private_key_pem(&self) -> String {
        self.private_key.replace("\\n", "\n")
    }

    /// Cloud project encoded in a service account address
    /// (`name@project.iam.gserviceaccount.com`).
    pub fn project_from_account(&self) -> Option<String> {
        let (_, domain) = self.account.split_once('@')?;
        let project = domain.strip_suffix(".iam.gserviceaccount.com")?;
        (!project.is_empty()).then(|| project.to_string())
    }
}
