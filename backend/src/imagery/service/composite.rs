//! Composite construction from a selected image set.

use async_trait::async_trait;

use super::error::{ErrorContext, ImageryError, ImageryResult};
use crate::models::{BandMode, Composite, ImageSet};

#[async_trait]
pub trait CompositeService: Send + Sync {
    /// Derive the recency mosaic of `set` for `mode`, clipped to the query region.
    ///
    /// The default implementation only plans the composite; backends that
    /// evaluate lazily (the remote service) need nothing more.
    ///
    /// # Returns
    /// * `Ok(Composite)` - The composite plan
    /// * `Err(ImageryError::NotFound)` - If `set` is empty
    async fn build_composite(&self, set: &ImageSet, mode: BandMode) -> ImageryResult<Composite> {
        Composite::plan(set, mode).ok_or_else(|| {
            ImageryError::not_found_with_context(
                "cannot composite an empty image set",
                ErrorContext::new("build_composite").with_entity("image_set"),
            )
        })
    }
}
