//! Public API surface of the crate.
//!
//! Consolidates the types UI layers and tests work with. All data types
//! derive `Serialize` for JSON output.

pub use crate::models::{
    BandExpression, BandMode, CloudThreshold, ColorRamp, Composite, ImageQuery, ImageRecord,
    ImageSet, ImageSummary, ParamError, Region, SessionParams, TimeWindow, VisParams, AKITA,
    LOOKBACK_DAYS,
};

pub use crate::imagery::{
    compute_composite, render_session, CompositeError, CompositeRender, DashboardConfig,
    ErrorContext, FullImageryService, ImageryError, ImageryFactory, ImageryResult,
    RenderOutcome, ServiceCredentials, ServiceType, SessionRender, TileHandle,
};

pub use crate::presenter::{
    DashboardView, Diagnostic, Legend, LegendEntry, MapView, Sidebar, TileLayer,
    NO_DATA_WARNING,
};

#[cfg(feature = "http-server")]
pub use crate::http::dto::{CompositeOutcome, CompositeResponse, DashboardQuery, HealthResponse};

#[cfg(test)]
#[path = "api_tests.rs"]
mod api_tests;
