//! HTTP handlers for the dashboard and JSON API.
//!
//! Each handler parses its parameters and delegates to the imagery service
//! layer for the render cycle.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};

use super::dto::{CompositeResponse, DashboardQuery, HealthResponse};
use super::error::AppError;
use super::state::AppState;
use crate::imagery::services as imagery_services;
use crate::models::SessionParams;
use crate::presenter::{render_error_page, render_page, DashboardView};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the server is running and the imagery
/// service is reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let imagery_status = match imagery_services::health_check(state.service.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        imagery: imagery_status,
    }))
}

// =============================================================================
// Dashboard
// =============================================================================

fn error_page(status: StatusCode, params: &SessionParams, message: &str, zoom: u8) -> Response {
    match render_error_page(params, message, zoom) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => AppError::from(e).into_response(),
    }
}

/// GET /?date=YYYY-MM-DD&cloud=N&band=ndvi
///
/// Render the dashboard page. A no-data cycle still renders with status
/// 200; invalid parameters and service faults render an error page.
pub async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let params = match query.to_params() {
        Ok(params) => params,
        Err(e) => {
            return error_page(
                StatusCode::BAD_REQUEST,
                &SessionParams::default(),
                &e.to_string(),
                state.zoom,
            )
        }
    };

    match imagery_services::render_session(state.service.as_ref(), &params).await {
        Ok(render) => {
            let view = DashboardView::new(&render, &state.attribution, state.zoom);
            match render_page(&params, &view) {
                Ok(html) => Html(html).into_response(),
                Err(e) => AppError::from(e).into_response(),
            }
        }
        Err(e) => {
            let err = AppError::from(e);
            tracing::warn!("dashboard render failed: {}", err.message());
            error_page(err.status(), &params, &err.message(), state.zoom)
        }
    }
}

// =============================================================================
// JSON API
// =============================================================================

/// GET /v1/composite?date=YYYY-MM-DD&cloud=N&band=ndvi
///
/// Run one render cycle and describe the result.
pub async fn get_composite(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> HandlerResult<CompositeResponse> {
    let params = query.to_params()?;
    let render = imagery_services::render_session(state.service.as_ref(), &params).await?;
    Ok(Json(CompositeResponse::from(&render)))
}

/// GET /v1/tiles/{map_id}/{z}/{x}/{y}
///
/// PNG tile of a composite rendered by the local service.
pub async fn get_tile(
    State(state): State<AppState>,
    Path((map_id, z, x, y)): Path<(String, u8, u32, u32)>,
) -> Result<Response, AppError> {
    let png = state.service.fetch_tile(&map_id, z, x, y).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        png,
    )
        .into_response())
}
