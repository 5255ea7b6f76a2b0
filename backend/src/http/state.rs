//! Application state for the HTTP server.

use std::sync::Arc;

use crate::imagery::factory::LOCAL_ATTRIBUTION;
use crate::imagery::FullImageryService;
use crate::presenter::DEFAULT_ZOOM;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Imagery backend used for every render cycle
    pub service: Arc<dyn FullImageryService>,
    /// Attribution shown on composite tile layers
    pub attribution: String,
    /// Initial map zoom
    pub zoom: u8,
}

impl AppState {
    /// Create a new application state with the given service.
    pub fn new(service: Arc<dyn FullImageryService>) -> Self {
        Self {
            service,
            attribution: LOCAL_ATTRIBUTION.to_string(),
            zoom: DEFAULT_ZOOM,
        }
    }

    pub fn with_attribution(mut self, attribution: impl Into<String>) -> Self {
        self.attribution = attribution.into();
        self
    }

    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom;
        self
    }
}
