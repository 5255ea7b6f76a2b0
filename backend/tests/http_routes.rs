//! HTTP surface tests driving the router in process.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use ndarray::Array2;
use serde_json::Value;
use tower::ServiceExt;

use ndvi_dashboard::http::{create_router, AppState};
use ndvi_dashboard::imagery::{
    FullImageryService, InjectedFailure, LocalImageryService, LocalScene,
};
use ndvi_dashboard::models::{ImageRecord, AKITA};
use ndvi_dashboard::presenter::NO_DATA_WARNING;
use ndvi_dashboard::raster::{lonlat_to_tile, BandStack, GeoGrid};

fn scene(id: &str, day: u32, cloud: f64) -> LocalScene {
    let grid = GeoGrid::new(AKITA, 8, 8);
    let mut stack = BandStack::new(grid);
    for (band, value) in [("B8", 3000.0), ("B4", 1000.0), ("B3", 800.0), ("B2", 600.0)] {
        stack.insert(band, Array2::from_elem((8, 8), value)).unwrap();
    }
    LocalScene::new(
        ImageRecord {
            id: id.to_string(),
            acquired_at: Utc.with_ymd_and_hms(2025, 6, day, 1, 45, 0).unwrap(),
            cloud_percent: Some(cloud),
            footprint: None,
        },
        stack,
    )
}

fn setup() -> (LocalImageryService, Router) {
    let service = LocalImageryService::new().with_composite_width(32);
    service.add_scene(scene("S2_A", 30, 12.5));
    service.add_scene(scene("S2_B", 20, 65.0));
    let shared = Arc::new(service.clone()) as Arc<dyn FullImageryService>;
    let router = create_router(AppState::new(shared).with_attribution("Test imagery"));
    (service, router)
}

async fn get(router: Router, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = router
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, body.to_vec())
}

async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
    let (status, _, body) = get(router, uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_dashboard_page_with_defaults() {
    let (_, router) = setup();
    let (status, content_type, body) = get(router, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));

    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("Period: 2025-06-13 – 2025-07-03"));
    assert!(html.contains("Images: 1"));
    assert!(html.contains("2025-06-30 (cloud 12.5%)"));
    assert!(html.contains("Test imagery"));
    assert!(html.contains(r#"class="legend""#));
    assert!(!html.contains(NO_DATA_WARNING));
}

#[tokio::test]
async fn test_dashboard_no_data_still_renders() {
    let (service, router) = setup();
    let (status, _, body) = get(router, "/?date=2025-06-01&cloud=40&band=ndvi").await;
    assert_eq!(status, StatusCode::OK);

    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("Images: 0"));
    assert!(html.contains(NO_DATA_WARNING));
    assert!(html.contains(r#""tile_layer":null"#));
    assert_eq!(service.map_count(), 0);
}

#[tokio::test]
async fn test_dashboard_invalid_params_render_error_page() {
    let (_, router) = setup();
    let (status, _, body) = get(router, "/?cloud=140").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("cloud threshold must be between 0 and 100, got 140"));
}

#[tokio::test]
async fn test_dashboard_service_fault_is_bad_gateway() {
    let (service, router) = setup();
    service.fail_next_request(InjectedFailure::Connection);
    let (status, _, body) = get(router, "/").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("injected connection failure"));
}

#[tokio::test]
async fn test_composite_json_ready() {
    let (_, router) = setup();
    let (status, json) = get_json(router, "/v1/composite?date=2025-07-03&cloud=70").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["window"]["start"], "2025-06-13");
    assert_eq!(json["cloud_threshold"], 70);
    assert_eq!(json["band"], "ndvi");
    assert_eq!(json["image_count"], 2);
    assert_eq!(json["images"][0]["id"], "S2_A");
    assert_eq!(json["images"][1]["id"], "S2_B");
    assert_eq!(json["outcome"]["kind"], "ready");
    assert_eq!(json["outcome"]["vis"]["bands"][0], "NDVI");
    assert!(json["outcome"]["legend"].is_object());
    assert!(json["outcome"]["layer_name"]
        .as_str()
        .unwrap()
        .starts_with("NDVI_2025-07-03_"));
}

#[tokio::test]
async fn test_composite_json_no_data() {
    let (_, router) = setup();
    let (status, json) = get_json(router, "/v1/composite?cloud=0&band=rgb").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["image_count"], 0);
    assert_eq!(json["outcome"]["kind"], "no_data");
    assert_eq!(json["outcome"]["warning"], NO_DATA_WARNING);
}

#[tokio::test]
async fn test_composite_json_errors() {
    let (service, router) = setup();
    let (status, json) = get_json(router.clone(), "/v1/composite?cloud=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");

    service.fail_next_request(InjectedFailure::Quota);
    let (status, json) = get_json(router, "/v1/composite").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(json["message"].as_str().unwrap().contains("injected quota failure"));
}

#[tokio::test]
async fn test_tile_from_composite_url() {
    let (_, router) = setup();
    let (_, json) = get_json(router.clone(), "/v1/composite").await;
    let template = json["outcome"]["tile_url"].as_str().unwrap().to_string();

    let (lon, lat) = AKITA.centroid();
    let (x, y) = lonlat_to_tile(8, lon, lat);
    let uri = template
        .replace("{z}", "8")
        .replace("{x}", &x.to_string())
        .replace("{y}", &y.to_string());

    let (status, content_type, body) = get(router, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("image/png"));
    assert_eq!(&body[..8], b"\x89PNG\r\n\x1a\n");
}

#[tokio::test]
async fn test_unknown_tile_is_404() {
    let (_, router) = setup();
    let (status, json) = get_json(router, "/v1/tiles/missing/8/10/10").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_tile_beyond_max_zoom_is_404() {
    let (_, router) = setup();
    let (_, json) = get_json(router.clone(), "/v1/composite").await;
    let template = json["outcome"]["tile_url"].as_str().unwrap().to_string();

    for z in ["31", "64", "255"] {
        let uri = template
            .replace("{z}", z)
            .replace("{x}", "0")
            .replace("{y}", "0");
        let (status, json) = get_json(router.clone(), &uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], "NOT_FOUND");
    }
}
