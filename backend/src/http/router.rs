//! Router configuration for the dashboard.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        .route("/composite", get(handlers::get_composite))
        .route("/tiles/{map_id}/{z}/{x}/{y}", get(handlers::get_tile));

    Router::new()
        .route("/", get(handlers::dashboard))
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::imagery::{FullImageryService, LocalImageryService};

    fn router() -> Router {
        let service = Arc::new(LocalImageryService::new()) as Arc<dyn FullImageryService>;
        create_router(AppState::new(service))
    }

    #[tokio::test]
    async fn test_health_route() {
        let response = router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["imagery"], "connected");
    }

    #[tokio::test]
    async fn test_bad_band_is_400() {
        let response = router()
            .oneshot(
                Request::get("/v1/composite?band=swir")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = router()
            .oneshot(Request::get("/v2/anything").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
