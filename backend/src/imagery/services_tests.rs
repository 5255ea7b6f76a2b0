use super::*;
use crate::imagery::providers::{InjectedFailure, LocalImageryService, LocalScene};
use crate::models::{ImageRecord, AKITA};
use crate::raster::{BandStack, GeoGrid};
use chrono::{NaiveDate, TimeZone, Utc};
use ndarray::Array2;

fn scene(id: &str, (y, m, d): (i32, u32, u32), cloud: f64) -> LocalScene {
    let grid = GeoGrid::new(AKITA, 8, 8);
    let mut stack = BandStack::new(grid);
    for (band, value) in [("B8", 3000.0), ("B4", 1000.0), ("B3", 800.0), ("B2", 600.0)] {
        stack.insert(band, Array2::from_elem((8, 8), value)).unwrap();
    }
    LocalScene::new(
        ImageRecord {
            id: id.to_string(),
            acquired_at: Utc.with_ymd_and_hms(y, m, d, 1, 45, 0).unwrap(),
            cloud_percent: Some(cloud),
            footprint: None,
        },
        stack,
    )
}

fn service() -> LocalImageryService {
    let service = LocalImageryService::new().with_composite_width(16);
    service.add_scene(scene("before", (2025, 6, 12), 5.0));
    service.add_scene(scene("first-day", (2025, 6, 13), 39.9));
    service.add_scene(scene("at-threshold", (2025, 6, 20), 40.0));
    service.add_scene(scene("last-day", (2025, 7, 3), 12.0));
    service.add_scene(scene("after", (2025, 7, 4), 1.0));
    service
}

fn params(date: &str, cloud: i64, band: &str) -> SessionParams {
    SessionParams::from_raw(Some(date), Some(cloud), Some(band)).unwrap()
}

#[tokio::test]
async fn test_compute_composite_selects_window_and_threshold() {
    let service = service();
    let p = params("2025-07-03", 40, "ndvi");
    let render = compute_composite(&service, AKITA, p.window(), p.cloud_threshold, p.band_mode)
        .await
        .unwrap();

    let ids: Vec<&str> = render.images.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["last-day", "first-day"]);
    assert_eq!(render.composite.sources, vec!["last-day", "first-day"]);
    assert_eq!(render.window.start, NaiveDate::from_ymd_opt(2025, 6, 13).unwrap());
    assert_eq!(render.vis.palette.as_ref().unwrap().len(), 3);
    assert_eq!((render.vis.min, render.vis.max), (0.1, 0.7));
}

#[tokio::test]
async fn test_compute_composite_no_data() {
    let service = service();
    let p = params("2025-07-03", 1, "ndvi");
    let err = compute_composite(&service, AKITA, p.window(), p.cloud_threshold, p.band_mode)
        .await
        .unwrap_err();
    match err {
        CompositeError::NoData { window, threshold } => {
            assert_eq!(window, p.window());
            assert_eq!(threshold.percent(), 1);
        }
        other => panic!("expected no data, got {:?}", other),
    }
    assert_eq!(service.map_count(), 0);
}

#[tokio::test]
async fn test_compute_composite_propagates_service_fault() {
    let service = service();
    service.fail_next_request(InjectedFailure::Connection);
    let p = SessionParams::default();
    let err = compute_composite(&service, AKITA, p.window(), p.cloud_threshold, p.band_mode)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CompositeError::Service(ImageryError::Connection { .. })
    ));
}

#[tokio::test]
async fn test_rgb_render_has_no_palette() {
    let service = service();
    let render = render_session(&service, &params("2025-07-03", 40, "rgb"))
        .await
        .unwrap();
    match &render.outcome {
        RenderOutcome::Ready { vis, .. } => {
            assert_eq!(vis.bands, vec!["B4", "B3", "B2"]);
            assert_eq!((vis.min, vis.max), (0.0, 3000.0));
            assert!(vis.palette.is_none());
        }
        RenderOutcome::NoData => panic!("expected a composite"),
    }
}

#[tokio::test]
async fn test_render_session_no_data_is_not_an_error() {
    let service = service();
    let render = render_session(&service, &params("2024-01-15", 40, "nir"))
        .await
        .unwrap();
    assert!(render.is_no_data());
    assert_eq!(render.image_count(), 0);
    assert!(render.tile().is_none());
}

#[tokio::test]
async fn test_render_session_is_deterministic() {
    let service = service();
    let p = params("2025-07-03", 40, "ndvi");
    let a = render_session(&service, &p).await.unwrap();
    let b = render_session(&service, &p).await.unwrap();
    assert_eq!(a.images, b.images);
    assert_eq!(a.window, b.window);
}

#[tokio::test]
async fn test_health_check_passthrough() {
    let service = service();
    assert!(health_check(&service).await.unwrap());
    service.set_healthy(false);
    assert!(!health_check(&service).await.unwrap());
}
