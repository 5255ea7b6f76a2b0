//! Imagery service trait definitions.
//!
//! The remote earth-observation service is reached through three narrow
//! traits, so the selection policy can be exercised against an in-memory
//! backend in tests:
//!
//! - [`catalog`]: image queries and health
//! - [`composite`]: mosaic construction
//! - [`tiles`]: tile handles and (for local backends) tile rendering
//! - [`error`]: error types shared by all of them
//!
//! # Convenience Trait Bound
//!
//! ```ignore
//! async fn render<S: FullImageryService + ?Sized>(service: &S, query: &ImageQuery) -> ImageryResult<()> {
//!     let set = service.query_images(query).await?;
//!     let composite = service.build_composite(&set, BandMode::Ndvi).await?;
//!     let _handle = service.get_tile_handle(&composite, &VisParams::for_mode(BandMode::Ndvi)).await?;
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod composite;
pub mod error;
pub mod tiles;

pub use catalog::CatalogService;
pub use composite::CompositeService;
pub use error::{ErrorContext, ImageryError, ImageryResult};
pub use tiles::{TileHandle, TileService};

/// Composite trait bound for a complete imagery backend.
pub trait FullImageryService: CatalogService + CompositeService + TileService {}

// Blanket implementation: any type implementing all three traits is a full backend
impl<T> FullImageryService for T where T: CatalogService + CompositeService + TileService {}
