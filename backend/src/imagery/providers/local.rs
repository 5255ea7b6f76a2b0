//! In-memory imagery service.
//!
//! Holds scenes as band grids and applies the same selection and
//! compositing rules as the remote service, entirely in process. Used for
//! tests and for running the dashboard without service credentials.

use async_trait::async_trait;
use log::debug;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use uuid::Uuid;

use crate::imagery::service::*;
use crate::models::{BandExpression, Composite, ImageQuery, ImageRecord, ImageSet, VisParams};
use crate::raster::{self, BandStack, Colorizer, CompositePixels, GeoGrid};

/// Default width in pixels of the composite grid laid over the query region.
pub const DEFAULT_COMPOSITE_WIDTH: usize = 512;

/// Default URL prefix under which the HTTP layer serves local tiles.
pub const DEFAULT_TILE_URL_BASE: &str = "/v1/tiles";

/// A catalog entry together with its pixels.
#[derive(Debug, Clone)]
pub struct LocalScene {
    pub record: ImageRecord,
    pub bands: BandStack,
}

impl LocalScene {
    /// Scene whose footprint is the extent of its band grid.
    pub fn new(mut record: ImageRecord, bands: BandStack) -> Self {
        record.footprint = Some(bands.grid.region);
        Self { record, bands }
    }
}

/// Failure to raise on the next service call, for exercising error paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedFailure {
    Connection,
    Quota,
    Authentication,
}

impl InjectedFailure {
    fn into_error(self, operation: &str) -> ImageryError {
        let err = match self {
            InjectedFailure::Connection => ImageryError::connection("injected connection failure"),
            InjectedFailure::Quota => ImageryError::quota("injected quota failure"),
            InjectedFailure::Authentication => {
                ImageryError::authentication("injected authentication failure")
            }
        };
        err.with_operation(operation)
    }
}

struct RegisteredMap {
    pixels: CompositePixels,
    colorizer: Colorizer,
}

#[derive(Default)]
struct LocalData {
    scenes: BTreeMap<String, LocalScene>,
    maps: HashMap<String, Arc<RegisteredMap>>,
    pending_failure: Option<InjectedFailure>,
    is_unhealthy: bool,
}

/// In-memory imagery backend.
///
/// # Example
/// ```ignore
/// let service = LocalImageryService::new();
/// service.add_scene(scene);
/// let set = service.query_images(&query).await?;
/// ```
#[derive(Clone)]
pub struct LocalImageryService {
    data: Arc<RwLock<LocalData>>,
    composite_width: usize,
    tile_url_base: String,
}

impl Default for LocalImageryService {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalImageryService {
    /// Create an empty service.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
            composite_width: DEFAULT_COMPOSITE_WIDTH,
            tile_url_base: DEFAULT_TILE_URL_BASE.to_string(),
        }
    }

    /// Create a service pre-loaded with the synthetic demo scenes.
    pub fn with_demo_scenes() -> ImageryResult<Self> {
        let service = Self::new();
        for scene in super::demo::demo_scenes()? {
            service.add_scene(scene);
        }
        Ok(service)
    }

    pub fn with_composite_width(mut self, width: usize) -> Self {
        self.composite_width = width.max(1);
        self
    }

    pub fn with_tile_url_base(mut self, base: impl Into<String>) -> Self {
        self.tile_url_base = base.into().trim_end_matches('/').to_string();
        self
    }

    /// Add or replace a scene (keyed by image id).
    pub fn add_scene(&self, scene: LocalScene) {
        self.data
            .write()
            .scenes
            .insert(scene.record.id.clone(), scene);
    }

    pub fn scene_count(&self) -> usize {
        self.data.read().scenes.len()
    }

    pub fn map_count(&self) -> usize {
        self.data.read().maps.len()
    }

    /// Set the health status reported by `health_check`.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_unhealthy = !healthy;
    }

    /// Make the next service call fail with `failure`.
    pub fn fail_next_request(&self, failure: InjectedFailure) {
        self.data.write().pending_failure = Some(failure);
    }

    /// Remove all scenes and registered maps.
    pub fn clear(&self) {
        let mut data = self.data.write();
        data.scenes.clear();
        data.maps.clear();
    }

    fn take_failure(&self, operation: &str) -> ImageryResult<()> {
        match self.data.write().pending_failure.take() {
            Some(failure) => Err(failure.into_error(operation)),
            None => Ok(()),
        }
    }

    fn composite_grid(&self, composite: &Composite) -> GeoGrid {
        let region = composite.query.region;
        let width = self.composite_width;
        let height = ((width as f64) * region.height() / region.width())
            .round()
            .max(1.0) as usize;
        GeoGrid::new(region, width, height)
    }

    /// Evaluate `composite` into pixels on a grid over its query region.
    ///
    /// Each source contributes its transformed band(s); the mosaic takes,
    /// per pixel and band, the first unmasked value in source order.
    pub fn render_composite(&self, composite: &Composite) -> ImageryResult<CompositePixels> {
        let grid = self.composite_grid(composite);
        let data = self.data.read();
        let scenes = composite
            .sources
            .iter()
            .map(|id| {
                data.scenes.get(id).ok_or_else(|| {
                    ImageryError::not_found_with_context(
                        format!("image '{}' is not in the catalog", id),
                        ErrorContext::new("render_composite")
                            .with_entity("image")
                            .with_entity_id(id),
                    )
                })
            })
            .collect::<ImageryResult<Vec<_>>>()?;

        let bands = match &composite.expression {
            BandExpression::NormalizedDifference { nir, red, output } => {
                let layers = scenes
                    .iter()
                    .map(|scene| -> ImageryResult<_> {
                        let nir = raster::resample(&scene.bands, nir, &grid)?;
                        let red = raster::resample(&scene.bands, red, &grid)?;
                        Ok(raster::ndvi(&nir, &red))
                    })
                    .collect::<ImageryResult<Vec<_>>>()?;
                vec![(output.clone(), raster::mosaic(grid.shape(), &layers))]
            }
            BandExpression::Select { bands } => bands
                .iter()
                .map(|band| -> ImageryResult<_> {
                    let layers = scenes
                        .iter()
                        .map(|scene| raster::resample(&scene.bands, band, &grid))
                        .collect::<raster::RasterResult<Vec<_>>>()?;
                    Ok((band.clone(), raster::mosaic(grid.shape(), &layers)))
                })
                .collect::<ImageryResult<Vec<_>>>()?,
        };

        Ok(CompositePixels { grid, bands })
    }
}

#[async_trait]
impl CatalogService for LocalImageryService {
    async fn health_check(&self) -> ImageryResult<bool> {
        Ok(!self.data.read().is_unhealthy)
    }

    async fn query_images(&self, query: &ImageQuery) -> ImageryResult<ImageSet> {
        self.take_failure("query_images")?;
        let images: Vec<ImageRecord> = self
            .data
            .read()
            .scenes
            .values()
            .filter(|scene| query.matches(&scene.record))
            .map(|scene| scene.record.clone())
            .collect();
        debug!(
            "local catalog: {} of {} scenes match window {} below {}",
            images.len(),
            self.scene_count(),
            query.window,
            query.cloud_max
        );
        Ok(ImageSet::new(*query, images))
    }
}

#[async_trait]
impl CompositeService for LocalImageryService {}

#[async_trait]
impl TileService for LocalImageryService {
    async fn get_tile_handle(
        &self,
        composite: &Composite,
        vis: &VisParams,
    ) -> ImageryResult<TileHandle> {
        self.take_failure("get_tile_handle")?;
        let colorizer = Colorizer::new(vis)?;
        let pixels = self.render_composite(composite)?;
        debug!(
            "local composite {} from {} sources: {} valid pixels",
            composite.mode,
            composite.sources.len(),
            pixels.valid_pixels()
        );

        let map_id = Uuid::new_v4().simple().to_string();
        self.data
            .write()
            .maps
            .insert(map_id.clone(), Arc::new(RegisteredMap { pixels, colorizer }));

        Ok(TileHandle {
            url_template: format!("{}/{}/{{z}}/{{x}}/{{y}}", self.tile_url_base, map_id),
            map_id,
        })
    }

    async fn fetch_tile(&self, map_id: &str, z: u8, x: u32, y: u32) -> ImageryResult<Vec<u8>> {
        let map = self.data.read().maps.get(map_id).cloned().ok_or_else(|| {
            ImageryError::not_found_with_context(
                "unknown map id",
                ErrorContext::new("fetch_tile")
                    .with_entity("map")
                    .with_entity_id(map_id),
            )
        })?;
        let tile = raster::render_tile(&map.pixels, &map.colorizer, z, x, y)?;
        Ok(raster::encode_png(&tile)?)
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod local_tests;
