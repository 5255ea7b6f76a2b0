//! Google Earth Engine REST backend.
//!
//! Catalog queries are evaluated with `value:compute`; composites are
//! registered as map resources with `maps` and served straight from the
//! service's tile endpoint. All calls authenticate with a service account
//! (see [`auth`]).

pub mod auth;
pub mod expression;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use self::auth::TokenSource;
use self::expression::{catalog_expression, composite_expression, CollectionSpec};
use crate::imagery::config::{EarthEngineSettings, ServiceCredentials};
use crate::imagery::service::*;
use crate::models::{Composite, ImageQuery, ImageRecord, ImageSet, VisParams};

/// Timeout for a single REST call
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection settings for one Earth Engine project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EarthEngineConfig {
    pub api_base: String,
    pub token_uri: String,
    pub project: String,
    pub collection: CollectionSpec,
}

impl EarthEngineConfig {
    /// Combine file settings with the account; the project defaults to the
    /// one encoded in the service account address.
    pub fn from_settings(
        settings: &EarthEngineSettings,
        credentials: &ServiceCredentials,
    ) -> ImageryResult<Self> {
        let project = settings
            .project
            .clone()
            .filter(|p| !p.trim().is_empty())
            .or_else(|| credentials.project_from_account())
            .ok_or_else(|| {
                ImageryError::configuration(format!(
                    "cannot derive a cloud project from account '{}'; set earthengine.project",
                    credentials.account
                ))
            })?;

        Ok(Self {
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            token_uri: settings.token_uri.clone(),
            project,
            collection: CollectionSpec {
                id: settings.collection.clone(),
                cloud_property: settings.cloud_property.clone(),
            },
        })
    }

    pub fn compute_url(&self) -> String {
        format!("{}/v1/projects/{}/value:compute", self.api_base, self.project)
    }

    pub fn maps_url(&self) -> String {
        format!("{}/v1/projects/{}/maps", self.api_base, self.project)
    }

    /// Tile template for a map resource name (`projects/.../maps/...`).
    pub fn tile_template(&self, map_name: &str) -> String {
        format!("{}/v1/{}/tiles/{{z}}/{{x}}/{{y}}", self.api_base, map_name)
    }
}

/// Map an unsuccessful HTTP status to the matching error kind.
pub fn status_error(status: u16, body: &str) -> ImageryError {
    let message = format!("service responded with status {}", status);
    let details = body.chars().take(500).collect::<String>();
    let err = match status {
        401 | 403 => ImageryError::authentication(message),
        429 => ImageryError::quota(message),
        _ => ImageryError::remote(message),
    };
    if details.is_empty() {
        err
    } else {
        err.with_details(details)
    }
}

#[derive(Debug, Deserialize)]
struct ComputeResponse {
    result: Value,
}

#[derive(Debug, Deserialize)]
struct MapResponse {
    name: String,
}

/// Decode the `[ids, times, clouds]` listing produced by
/// [`catalog_expression`].
pub fn parse_listing(result: &Value) -> ImageryResult<Vec<ImageRecord>> {
    let malformed = |what: &str| {
        ImageryError::malformed(format!("catalog listing: {}", what)).with_operation("query_images")
    };
    let columns = result
        .as_array()
        .filter(|columns| columns.len() == 3)
        .ok_or_else(|| malformed("expected three columns"))?;
    let column = |i: usize| {
        columns[i]
            .as_array()
            .ok_or_else(|| malformed("column is not an array"))
    };
    let (ids, times, clouds) = (column(0)?, column(1)?, column(2)?);
    if ids.len() != times.len() || ids.len() != clouds.len() {
        return Err(malformed("columns differ in length"));
    }

    ids.iter()
        .zip(times)
        .zip(clouds)
        .map(|((id, time), cloud)| -> ImageryResult<ImageRecord> {
            let id = id.as_str().ok_or_else(|| malformed("image id is not a string"))?;
            let millis = time
                .as_i64()
                .or_else(|| time.as_f64().map(|t| t as i64))
                .ok_or_else(|| malformed("acquisition time is not a number"))?;
            let acquired_at = DateTime::<Utc>::from_timestamp_millis(millis)
                .ok_or_else(|| malformed("acquisition time out of range"))?;
            Ok(ImageRecord {
                id: id.to_string(),
                acquired_at,
                cloud_percent: cloud.as_f64(),
                footprint: None,
            })
        })
        .collect()
}

/// Earth Engine imagery backend.
///
/// # Example
/// ```ignore
/// let credentials = ServiceCredentials::from_env()?;
/// let config = EarthEngineConfig::from_settings(&EarthEngineSettings::default(), &credentials)?;
/// let service = EarthEngineService::new(config, credentials)?;
/// let set = service.query_images(&query).await?;
/// ```
pub struct EarthEngineService {
    client: Client,
    config: EarthEngineConfig,
    tokens: TokenSource,
}

impl EarthEngineService {
    pub fn new(config: EarthEngineConfig, credentials: ServiceCredentials) -> ImageryResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ImageryError::configuration(format!("failed to build HTTP client: {}", e)))?;
        let tokens = TokenSource::new(client.clone(), credentials, config.token_uri.clone())?;
        info!(
            "Earth Engine backend for project {} as {}",
            config.project,
            tokens.account()
        );
        Ok(Self {
            client,
            config,
            tokens,
        })
    }

    pub fn config(&self) -> &EarthEngineConfig {
        &self.config
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        url: &str,
        body: &Value,
        operation: &str,
    ) -> ImageryResult<T> {
        let token = self
            .tokens
            .access_token()
            .await
            .map_err(|e| e.with_operation(operation))?;
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|e| ImageryError::from(e).with_operation(operation))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), &body).with_operation(operation));
        }

        response.json::<T>().await.map_err(|e| {
            ImageryError::malformed(format!("failed to parse response: {}", e))
                .with_operation(operation)
        })
    }
}

#[async_trait]
impl CatalogService for EarthEngineService {
    async fn health_check(&self) -> ImageryResult<bool> {
        match self.tokens.access_token().await {
            Ok(_) => Ok(true),
            Err(e) => {
                warn!("Earth Engine health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn query_images(&self, query: &ImageQuery) -> ImageryResult<ImageSet> {
        let body = json!({ "expression": catalog_expression(&self.config.collection, query) });
        let response: ComputeResponse = self
            .post_json(&self.config.compute_url(), &body, "query_images")
            .await?;
        let images = parse_listing(&response.result)?;
        debug!(
            "{}: {} images in {} below {}",
            self.config.collection.id,
            images.len(),
            query.window,
            query.cloud_max
        );
        Ok(ImageSet::new(*query, images))
    }
}

#[async_trait]
impl CompositeService for EarthEngineService {}

#[async_trait]
impl TileService for EarthEngineService {
    async fn get_tile_handle(
        &self,
        composite: &Composite,
        vis: &VisParams,
    ) -> ImageryResult<TileHandle> {
        let mut options = json!({ "ranges": [{ "min": vis.min, "max": vis.max }] });
        if let Some(palette) = &vis.palette {
            options["paletteColors"] = json!(palette);
        }
        let body = json!({
            "expression": composite_expression(&self.config.collection, composite),
            "fileFormat": "PNG",
            "bandIds": vis.bands,
            "visualizationOptions": options,
        });

        let map: MapResponse = self
            .post_json(&self.config.maps_url(), &body, "get_tile_handle")
            .await?;
        debug!("registered map {} for {} composite", map.name, composite.mode);
        Ok(TileHandle {
            url_template: self.config.tile_template(&map.name),
            map_id: map.name,
        })
    }
}
