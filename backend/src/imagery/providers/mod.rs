//! Imagery backend implementations.
//!
//! - [`local`]: in-memory scenes rendered in process (tests, demo mode)
//! - [`earthengine`]: Google Earth Engine REST API (feature `earthengine`)

pub mod demo;
#[cfg(feature = "earthengine")]
pub mod earthengine;
pub mod local;

pub use demo::demo_scenes;
#[cfg(feature = "earthengine")]
pub use earthengine::{EarthEngineConfig, EarthEngineService};
pub use local::{InjectedFailure, LocalImageryService, LocalScene};
