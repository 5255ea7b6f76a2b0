//! Tile-servable handles for composites.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::{ErrorContext, ImageryError, ImageryResult};
use crate::models::{Composite, VisParams};

/// Opaque reference a map client uses to fetch rendered tiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileHandle {
    /// Service-issued identifier of the rendered map
    pub map_id: String,
    /// URL with `{z}`, `{x}` and `{y}` placeholders
    pub url_template: String,
}

impl TileHandle {
    /// URL of one concrete tile.
    pub fn tile_url(&self, z: u8, x: u32, y: u32) -> String {
        self.url_template
            .replace("{z}", &z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }
}

#[async_trait]
pub trait TileService: Send + Sync {
    /// Register `composite` for display under `vis` and return its tile handle.
    async fn get_tile_handle(
        &self,
        composite: &Composite,
        vis: &VisParams,
    ) -> ImageryResult<TileHandle>;

    /// Render one PNG tile of a previously registered map.
    ///
    /// Only backends that serve their own tiles implement this; remote
    /// handles point straight at the service.
    async fn fetch_tile(&self, map_id: &str, z: u8, x: u32, y: u32) -> ImageryResult<Vec<u8>> {
        let _ = (z, x, y);
        Err(ImageryError::Unsupported {
            message: "this imagery backend does not serve tiles locally".to_string(),
            context: ErrorContext::new("fetch_tile").with_entity_id(map_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_url() {
        let handle = TileHandle {
            map_id: "abc".to_string(),
            url_template: "/v1/tiles/abc/{z}/{x}/{y}".to_string(),
        };
        assert_eq!(handle.tile_url(12, 3640, 1538), "/v1/tiles/abc/12/3640/1538");
    }
}
