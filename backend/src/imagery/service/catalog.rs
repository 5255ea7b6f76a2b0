//! Catalog queries: which images match a region, window and cloud limit.

use async_trait::async_trait;

use super::error::ImageryResult;
use crate::models::{ImageQuery, ImageSet};

/// Read-only access to the image catalog.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to be shared across request handlers.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Check whether the service is reachable and accepting requests.
    ///
    /// # Returns
    /// - `Ok(true)` if the service is usable
    /// - `Ok(false)` if it is reachable but reports itself unavailable
    /// - `Err(ImageryError)` if the check itself failed
    async fn health_check(&self) -> ImageryResult<bool>;

    /// Find every image intersecting `query.region`, acquired inside
    /// `query.window`, with cloud coverage strictly below `query.cloud_max`.
    ///
    /// # Returns
    /// * `Ok(ImageSet)` - Matching images, newest first; possibly empty
    /// * `Err(ImageryError)` - If the service failed
    async fn query_images(&self, query: &ImageQuery) -> ImageryResult<ImageSet>;
}
