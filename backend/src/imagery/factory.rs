//! Imagery service factory.
//!
//! Creates the configured backend behind an `Arc<dyn FullImageryService>`.

use log::info;
use std::str::FromStr;
use std::sync::Arc;

use super::config::{DashboardConfig, LocalSettings};
use super::providers::LocalImageryService;
use super::service::{FullImageryService, ImageryError, ImageryResult};

/// Attribution shown for tiles served by the remote service.
pub const EARTHENGINE_ATTRIBUTION: &str = "Google Earth Engine";
/// Attribution shown for tiles rendered in process.
pub const LOCAL_ATTRIBUTION: &str = "Local imagery";

/// Imagery backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceType {
    /// Google Earth Engine REST API
    EarthEngine,
    /// In-memory scenes
    Local,
}

impl FromStr for ServiceType {
    type Err = String;

    /// Parse service type from string.
    ///
    /// # Arguments
    /// * `s` - String representation ("earthengine", "gee", "local")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "earthengine" | "earth-engine" | "gee" => Ok(Self::EarthEngine),
            "local" | "demo" => Ok(Self::Local),
            _ => Err(format!("Unknown imagery service type: {}", s)),
        }
    }
}

impl ServiceType {
    /// Get service type from environment variables.
    ///
    /// Reads `IMAGERY_SERVICE`. Without it, Earth Engine is chosen when
    /// `GEE_EMAIL` is set, otherwise Local.
    pub fn from_env() -> Self {
        if let Ok(val) = std::env::var("IMAGERY_SERVICE") {
            return val.parse().unwrap_or(Self::Local);
        }

        if std::env::var(super::config::ACCOUNT_ENV).is_ok() {
            Self::EarthEngine
        } else {
            Self::Local
        }
    }

    pub fn attribution(&self) -> &'static str {
        match self {
            Self::EarthEngine => EARTHENGINE_ATTRIBUTION,
            Self::Local => LOCAL_ATTRIBUTION,
        }
    }
}

/// Factory for imagery service instances.
///
/// # Example
/// ```ignore
/// use ndvi_dashboard::imagery::{DashboardConfig, ImageryFactory};
///
/// let config = DashboardConfig::load()?;
/// let service = ImageryFactory::from_config(&config)?;
/// ```
pub struct ImageryFactory;

impl ImageryFactory {
    /// Create a service of the given type with default settings.
    ///
    /// # Returns
    /// * `Ok(Arc<dyn FullImageryService>)` - Service instance
    /// * `Err(ImageryError::Configuration)` - If the backend cannot be built
    pub fn create(service_type: ServiceType) -> ImageryResult<Arc<dyn FullImageryService>> {
        Self::from_config_with_type(&DashboardConfig::default(), service_type)
    }

    /// Create an in-memory service loaded with the demo scenes.
    pub fn create_local() -> ImageryResult<Arc<dyn FullImageryService>> {
        Ok(Arc::new(Self::local_service(&LocalSettings::default())?))
    }

    fn local_service(settings: &LocalSettings) -> ImageryResult<LocalImageryService> {
        let service = if settings.demo_scenes {
            LocalImageryService::with_demo_scenes()?
        } else {
            LocalImageryService::new()
        };
        info!("Local imagery service with {} scenes", service.scene_count());
        Ok(service
            .with_composite_width(settings.composite_width)
            .with_tile_url_base(settings.tile_url_base.as_str()))
    }

    /// Create the Earth Engine service from settings and resolved credentials.
    #[cfg(feature = "earthengine")]
    pub fn create_earthengine(
        config: &DashboardConfig,
    ) -> ImageryResult<Arc<super::providers::EarthEngineService>> {
        use super::config::ServiceCredentials;
        use super::providers::{EarthEngineConfig, EarthEngineService};

        let credentials = ServiceCredentials::resolve(&config.earthengine)?;
        let ee_config = EarthEngineConfig::from_settings(&config.earthengine, &credentials)?;
        Ok(Arc::new(EarthEngineService::new(ee_config, credentials)?))
    }

    /// Create the service selected by environment variables.
    pub fn from_env() -> ImageryResult<Arc<dyn FullImageryService>> {
        Self::create(ServiceType::from_env())
    }

    /// Create the service selected by a configuration.
    pub fn from_config(config: &DashboardConfig) -> ImageryResult<Arc<dyn FullImageryService>> {
        let service_type = config.service_type().map_err(|e| {
            ImageryError::configuration(format!("Invalid imagery service type: {}", e))
        })?;
        Self::from_config_with_type(config, service_type)
    }

    fn from_config_with_type(
        config: &DashboardConfig,
        service_type: ServiceType,
    ) -> ImageryResult<Arc<dyn FullImageryService>> {
        match service_type {
            ServiceType::EarthEngine => {
                #[cfg(feature = "earthengine")]
                {
                    let service = Self::create_earthengine(config)?;
                    Ok(service as Arc<dyn FullImageryService>)
                }
                #[cfg(not(feature = "earthengine"))]
                {
                    let _ = config;
                    Err(ImageryError::configuration(
                        "Earth Engine service feature not enabled",
                    ))
                }
            }
            ServiceType::Local => Ok(Arc::new(Self::local_service(&config.local)?)),
        }
    }
}
