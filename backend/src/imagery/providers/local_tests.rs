use super::*;
use crate::models::{BandMode, CloudThreshold, Region, TimeWindow};
use chrono::{NaiveDate, TimeZone, Utc};
use ndarray::Array2;

const REGION: Region = Region::new(0.0, 0.0, 2.0, 1.0);

fn constant_scene(id: &str, day: u32, cloud: f64, footprint: Region, nir: f32, red: f32) -> LocalScene {
    let grid = GeoGrid::new(footprint, 4, 4);
    let stack = BandStack::new(grid)
        .with_band("B8", Array2::from_elem((4, 4), nir))
        .unwrap()
        .with_band("B4", Array2::from_elem((4, 4), red))
        .unwrap()
        .with_band("B3", Array2::from_elem((4, 4), 500.0))
        .unwrap()
        .with_band("B2", Array2::from_elem((4, 4), 250.0))
        .unwrap();
    LocalScene::new(
        ImageRecord {
            id: id.to_string(),
            acquired_at: Utc.with_ymd_and_hms(2025, 6, day, 1, 0, 0).unwrap(),
            cloud_percent: Some(cloud),
            footprint: None,
        },
        stack,
    )
}

fn query(threshold: i64) -> ImageQuery {
    ImageQuery::new(
        REGION,
        TimeWindow::ending_on(NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()),
        CloudThreshold::new(threshold).unwrap(),
    )
}

fn service() -> LocalImageryService {
    let service = LocalImageryService::new().with_composite_width(8);
    // Older scene covers everything; newer one only the western half.
    service.add_scene(constant_scene("old", 12, 5.0, REGION, 3000.0, 1000.0));
    service.add_scene(constant_scene(
        "new",
        25,
        10.0,
        Region::new(0.0, 0.0, 1.0, 1.0),
        1000.0,
        1000.0,
    ));
    service.add_scene(constant_scene("cloudy", 27, 80.0, REGION, 10.0, 10.0));
    service.add_scene(constant_scene("stale", 2, 1.0, REGION, 10.0, 10.0));
    service
}

#[tokio::test]
async fn test_query_filters_cloud_and_window() {
    let service = service();
    let set = service.query_images(&query(40)).await.unwrap();
    assert_eq!(set.ids(), vec!["new", "old"]);

    let strict = service.query_images(&query(5)).await.unwrap();
    assert!(strict.is_empty());

    let lenient = service.query_images(&query(100)).await.unwrap();
    assert_eq!(lenient.ids(), vec!["cloudy", "new", "old"]);
}

#[tokio::test]
async fn test_query_excludes_other_regions() {
    let service = service();
    let far = ImageQuery::new(
        Region::new(50.0, 50.0, 51.0, 51.0),
        query(40).window,
        CloudThreshold::new(40).unwrap(),
    );
    assert!(service.query_images(&far).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_mosaic_prefers_newest_image() {
    let service = service();
    let set = service.query_images(&query(40)).await.unwrap();
    let composite = service.build_composite(&set, BandMode::Ndvi).await.unwrap();
    let pixels = service.render_composite(&composite).unwrap();

    let (_, ndvi) = &pixels.bands[0];
    // West half: "new" (NDVI 0), east half: only "old" (NDVI 0.5).
    assert_eq!(ndvi[[0, 0]], 0.0);
    assert!((ndvi[[0, 7]] - 0.5).abs() < 1e-6);
    assert_eq!(pixels.valid_pixels(), 8 * 4);
}

#[tokio::test]
async fn test_rgb_composite_has_three_bands() {
    let service = service();
    let set = service.query_images(&query(40)).await.unwrap();
    let composite = service.build_composite(&set, BandMode::Rgb).await.unwrap();
    let pixels = service.render_composite(&composite).unwrap();
    let names: Vec<_> = pixels.bands.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["B4", "B3", "B2"]);
    assert_eq!(pixels.bands[0].1[[0, 0]], 1000.0);
}

#[tokio::test]
async fn test_build_composite_rejects_empty_set() {
    let service = service();
    let set = service.query_images(&query(1)).await.unwrap();
    let err = service.build_composite(&set, BandMode::Red).await.unwrap_err();
    assert!(matches!(err, ImageryError::NotFound { .. }));
}

#[tokio::test]
async fn test_tile_handle_and_fetch() {
    let service = service().with_tile_url_base("/v1/tiles/");
    let set = service.query_images(&query(40)).await.unwrap();
    let composite = service.build_composite(&set, BandMode::Ndvi).await.unwrap();
    let handle = service
        .get_tile_handle(&composite, &VisParams::for_mode(BandMode::Ndvi))
        .await
        .unwrap();

    assert_eq!(
        handle.url_template,
        format!("/v1/tiles/{}/{{z}}/{{x}}/{{y}}", handle.map_id)
    );
    assert_eq!(service.map_count(), 1);

    let png = service.fetch_tile(&handle.map_id, 0, 0, 0).await.unwrap();
    assert_eq!(&png[1..4], b"PNG");

    let missing = service.fetch_tile("nope", 0, 0, 0).await.unwrap_err();
    assert!(matches!(missing, ImageryError::NotFound { .. }));
}

#[tokio::test]
async fn test_injected_failure_is_one_shot() {
    let service = service();
    service.fail_next_request(InjectedFailure::Quota);
    let err = service.query_images(&query(40)).await.unwrap_err();
    assert!(matches!(err, ImageryError::QuotaExceeded { .. }));
    assert_eq!(err.context().operation.as_deref(), Some("query_images"));

    assert!(service.query_images(&query(40)).await.is_ok());
}

#[tokio::test]
async fn test_health_toggle() {
    let service = LocalImageryService::new();
    assert!(service.health_check().await.unwrap());
    service.set_healthy(false);
    assert!(!service.health_check().await.unwrap());
}

#[tokio::test]
async fn test_identical_inputs_identical_output() {
    let service = service();
    let a = service.query_images(&query(40)).await.unwrap();
    let b = service.query_images(&query(40)).await.unwrap();
    assert_eq!(a, b);

    let ca = service.build_composite(&a, BandMode::Ndvi).await.unwrap();
    let cb = service.build_composite(&b, BandMode::Ndvi).await.unwrap();
    let pa = service.render_composite(&ca).unwrap();
    let pb = service.render_composite(&cb).unwrap();
    assert_eq!(pa.bands[0].1, pb.bands[0].1);
}

#[test]
fn test_clear() {
    let service = service();
    assert_eq!(service.scene_count(), 4);
    service.clear();
    assert_eq!(service.scene_count(), 0);
}
