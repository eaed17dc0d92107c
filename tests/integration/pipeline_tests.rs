//! Image pipeline integration tests.
//!
//! Tests verify:
//! - An existing rendered icon short-circuits all work
//! - The reference scene produces a 206x206 ring-annotated grayscale icon
//! - Fetch failures fall back without leaving files behind
//! - Interrupted runs resume from persisted intermediates
//! - Concurrent requests for one day share a single download
//! - A cancelled run never blocks later requests for its day

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use moon_phase_widget::cache::{ArtifactStore, CacheKey, Stage};
use moon_phase_widget::raster::{in_ring, DisplayMode, RasterImage, RING_ALPHA};
use moon_phase_widget::{MoonImageService, PipelineResult};

use super::test_utils::{
    create_disk_png, create_reference_photo, create_transparent_disk_png, test_day, CountingSource,
};

fn service(source: CountingSource, dir: &TempDir) -> MoonImageService<CountingSource> {
    MoonImageService::new(source, ArtifactStore::new(dir.path()))
}

fn file_names(dir: &TempDir) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn load(path: &std::path::Path) -> RasterImage {
    RasterImage::decode(&std::fs::read(path).unwrap()).unwrap()
}

// =============================================================================
// Cache Short-Circuit
// =============================================================================

#[tokio::test]
async fn test_existing_rendered_icon_needs_no_fetch() {
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::new(dir.path());
    let key = CacheKey::new(test_day());
    let existing = store
        .write(&key, Stage::Rendered(DisplayMode::Normal), b"previously rendered")
        .unwrap();

    let source = CountingSource::new(create_reference_photo());
    let svc = MoonImageService::new(source.clone(), store);

    let result = svc.resolve(test_day(), "Full Moon", DisplayMode::Normal).await;

    assert_eq!(result, PipelineResult::Rendered(existing.clone()));
    assert_eq!(source.fetch_count(), 0);
    // Untouched
    assert_eq!(std::fs::read(&existing).unwrap(), b"previously rendered");
}

#[tokio::test]
async fn test_second_invocation_reuses_icon() {
    let dir = TempDir::new().unwrap();
    let source = CountingSource::new(create_reference_photo());

    let first = service(source.clone(), &dir)
        .render_artifact(test_day(), DisplayMode::Normal)
        .await
        .unwrap();

    // A fresh service models a new process on the same day
    let second = service(source.clone(), &dir)
        .render_artifact(test_day(), DisplayMode::Normal)
        .await
        .unwrap();

    assert!(!first.cache_hit);
    assert!(second.cache_hit);
    assert_eq!(first.path, second.path);
    assert_eq!(source.fetch_count(), 1);
}

// =============================================================================
// Reference Scene
// =============================================================================

#[tokio::test]
async fn test_reference_scene_renders_206px_icon() {
    let dir = TempDir::new().unwrap();
    let source = CountingSource::new(create_reference_photo());
    let svc = service(source.clone(), &dir);

    let result = svc.resolve(test_day(), "Waxing Gibbous", DisplayMode::Normal).await;
    let path = result.rendered_path().expect("rendered icon").to_path_buf();
    assert_eq!(
        path.file_name().unwrap().to_string_lossy(),
        "moon-phase-rendered-20261016.png"
    );

    let icon = load(&path);
    assert_eq!((icon.width(), icon.height()), (206, 206));
    assert!(icon.has_alpha());

    let mut ring_pixels = 0;
    for y in 0..206 {
        for x in 0..206 {
            let px = icon.pixel(x, y);
            assert_eq!(px[0], px[1], "pixel ({}, {}) is not gray", x, y);
            assert_eq!(px[1], px[2], "pixel ({}, {}) is not gray", x, y);
            if in_ring(x, y, 206, 206, 100.0) {
                assert_eq!(px, &[0, 0, 0, RING_ALPHA]);
                ring_pixels += 1;
            } else {
                assert_eq!(px[3], 255);
            }
        }
    }
    assert!(ring_pixels > 0);

    // Disk center is the luminance of the disk color, corners the background
    assert_eq!(icon.pixel(103, 103), &[64, 64, 64, 255]);
    assert_eq!(icon.pixel(0, 0), &[250, 250, 250, 255]);

    // Only the rendered pair and the mirror remain
    assert_eq!(
        file_names(&dir),
        vec![
            "moon-phase-rendered-20261016-inverted.png".to_string(),
            "moon-phase-rendered-20261016.png".to_string(),
            "moonphase.png".to_string(),
        ]
    );

    let mirror = load(&svc.store().mirror_path());
    assert_eq!((mirror.width(), mirror.height()), (206, 206));
    assert!(!mirror.has_alpha());
    assert_eq!(mirror.pixel(103, 103), &[80, 60, 40]);
}

#[tokio::test]
async fn test_inverted_icon_from_same_run() {
    let dir = TempDir::new().unwrap();
    let source = CountingSource::new(create_reference_photo());
    let svc = service(source.clone(), &dir);

    let normal = svc.render_artifact(test_day(), DisplayMode::Normal).await.unwrap();
    let inverted = svc.render_artifact(test_day(), DisplayMode::Inverted).await.unwrap();

    assert!(inverted.cache_hit);
    assert_ne!(normal.path, inverted.path);
    assert_eq!(source.fetch_count(), 1);

    let icon = load(&inverted.path);
    assert_eq!(icon.pixel(0, 0), &[5, 5, 5, 255]);
    assert_eq!(icon.pixel(103, 103), &[191, 191, 191, 255]);
}

#[tokio::test]
async fn test_off_center_disk_crop_stays_inside_source() {
    let dir = TempDir::new().unwrap();
    // Disk touching the top-left corner
    let source = CountingSource::new(create_disk_png(120, 100, 30.0, 30.0, 60.0));
    let svc = service(source, &dir);

    let response = svc.render_artifact(test_day(), DisplayMode::Normal).await.unwrap();
    let icon = load(&response.path);
    assert_eq!((icon.width(), icon.height()), (66, 66));
}

#[tokio::test]
async fn test_transparent_background_photo() {
    let dir = TempDir::new().unwrap();
    let source = CountingSource::new(create_transparent_disk_png(160, 160, 100.0));
    let svc = service(source, &dir);

    let response = svc.render_artifact(test_day(), DisplayMode::Normal).await.unwrap();
    let icon = load(&response.path);
    assert_eq!((icon.width(), icon.height()), (106, 106));
    // Transparent background keeps its alpha
    assert_eq!(icon.pixel(0, 0)[3], 0);
}

#[tokio::test]
async fn test_blank_photo_uses_fallback_bounds() {
    let dir = TempDir::new().unwrap();
    // Nothing dark: the disk is assumed to fill 80% of the frame
    let source = CountingSource::new(create_disk_png(100, 100, 50.0, 50.0, 0.0));
    let svc = service(source, &dir);

    let response = svc.render_artifact(test_day(), DisplayMode::Normal).await.unwrap();
    let icon = load(&response.path);
    assert_eq!((icon.width(), icon.height()), (86, 86));
}

// =============================================================================
// Failure and Fallback
// =============================================================================

#[tokio::test]
async fn test_fetch_failure_falls_back_without_files() {
    let dir = TempDir::new().unwrap();
    let source = CountingSource::failing();
    let svc = service(source.clone(), &dir);

    let result = svc.resolve(test_day(), "Last Quarter", DisplayMode::Normal).await;

    assert_eq!(result, PipelineResult::Fallback("Last-quarter-symbolic"));
    assert_eq!(source.fetch_count(), 1);
    assert!(file_names(&dir).is_empty());
}

#[tokio::test]
async fn test_failure_is_retried_on_next_invocation() {
    let dir = TempDir::new().unwrap();
    let svc = service(CountingSource::failing(), &dir);
    assert!(svc
        .resolve(test_day(), "Full Moon", DisplayMode::Normal)
        .await
        .is_fallback());

    let source = CountingSource::new(create_reference_photo());
    let svc = service(source.clone(), &dir);
    assert!(!svc
        .resolve(test_day(), "Full Moon", DisplayMode::Normal)
        .await
        .is_fallback());
    assert_eq!(source.fetch_count(), 1);
}

#[tokio::test]
async fn test_corrupt_cropped_file_is_discarded() {
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::new(dir.path());
    let key = CacheKey::new(test_day());
    store.write(&key, Stage::Cropped, b"truncated").unwrap();

    let source = CountingSource::new(create_reference_photo());
    let svc = MoonImageService::new(source.clone(), store.clone());

    let first = svc.resolve(test_day(), "New Moon", DisplayMode::Normal).await;
    assert_eq!(first, PipelineResult::Fallback("New-moon-symbolic"));
    assert!(!store.exists(&key, Stage::Cropped));
    assert_eq!(source.fetch_count(), 0);

    // Next invocation starts over from the network
    let second = svc.resolve(test_day(), "New Moon", DisplayMode::Normal).await;
    assert!(!second.is_fallback());
    assert_eq!(source.fetch_count(), 1);
}

// =============================================================================
// Resume
// =============================================================================

#[tokio::test]
async fn test_resume_from_raw() {
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::new(dir.path());
    let key = CacheKey::new(test_day());
    store.write(&key, Stage::Raw, &create_reference_photo()).unwrap();

    let source = CountingSource::failing();
    let svc = MoonImageService::new(source.clone(), store.clone());
    let response = svc.render_artifact(test_day(), DisplayMode::Normal).await.unwrap();

    assert_eq!(source.fetch_count(), 0);
    assert_eq!(load(&response.path).width(), 206);
    assert!(!store.exists(&key, Stage::Raw));
    assert!(store.mirror_path().is_file());
}

#[tokio::test]
async fn test_resume_from_cropped_keeps_ring_radius() {
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::new(dir.path());
    let key = CacheKey::new(test_day());

    let cropped = RasterImage::decode(&create_reference_photo())
        .unwrap()
        .sub_image(47, 47, 206, 206)
        .unwrap();
    store
        .write(&key, Stage::Cropped, &cropped.encode_png().unwrap())
        .unwrap();

    let source = CountingSource::failing();
    let svc = MoonImageService::new(source.clone(), store.clone());
    let response = svc.render_artifact(test_day(), DisplayMode::Normal).await.unwrap();

    assert_eq!(source.fetch_count(), 0);
    let icon = load(&response.path);
    // (103, 3) is 99.5 px from the center: on a radius-100 ring
    assert_eq!(icon.pixel(103, 3), &[0, 0, 0, RING_ALPHA]);
    assert!(!store.exists(&key, Stage::Cropped));
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test]
async fn test_concurrent_requests_share_one_fetch() {
    let dir = TempDir::new().unwrap();
    let source = CountingSource::new(create_reference_photo()).with_delay(Duration::from_millis(100));
    let svc = Arc::new(service(source.clone(), &dir));

    let mut handles = Vec::new();
    for i in 0..8 {
        let svc = svc.clone();
        let mode = if i % 2 == 0 {
            DisplayMode::Normal
        } else {
            DisplayMode::Inverted
        };
        handles.push(tokio::spawn(async move {
            svc.render_artifact(test_day(), mode).await
        }));
    }

    let mut paths = Vec::new();
    for handle in handles {
        let response = handle.await.unwrap().unwrap();
        paths.push(response.path);
    }

    assert_eq!(source.fetch_count(), 1);
    paths.sort();
    paths.dedup();
    assert_eq!(paths.len(), 2);
    assert!(paths.iter().all(|p| p.is_file()));
}

#[tokio::test]
async fn test_concurrent_failures_are_shared() {
    let dir = TempDir::new().unwrap();
    let source = CountingSource::failing().with_delay(Duration::from_millis(100));
    let svc = Arc::new(service(source.clone(), &dir));

    let mut handles = Vec::new();
    for _ in 0..4 {
        let svc = svc.clone();
        handles.push(tokio::spawn(async move {
            svc.resolve(test_day(), "Full Moon", DisplayMode::Normal).await
        }));
    }

    for handle in handles {
        assert_eq!(
            handle.await.unwrap(),
            PipelineResult::Fallback("Full-moon-symbolic")
        );
    }
    assert_eq!(source.fetch_count(), 1);
}

#[tokio::test]
async fn test_each_day_fetched_once() {
    let dir = TempDir::new().unwrap();
    let source = CountingSource::new(create_reference_photo());
    let svc = service(source.clone(), &dir);

    let day = test_day();
    let next = day.succ_opt().unwrap();
    for d in [day, next, day, next] {
        svc.render_artifact(d, DisplayMode::Normal).await.unwrap();
    }

    assert_eq!(source.fetched_days(), vec![day, next]);
}

// =============================================================================
// Cancellation
// =============================================================================

#[tokio::test]
async fn test_cancelled_run_does_not_block_the_day() {
    let dir = TempDir::new().unwrap();
    let source = CountingSource::new(create_reference_photo()).with_delay(Duration::from_millis(200));
    let svc = service(source.clone(), &dir);

    let first = tokio::time::timeout(
        Duration::from_millis(50),
        svc.render_artifact(test_day(), DisplayMode::Normal),
    )
    .await;
    assert!(first.is_err());

    let second = tokio::time::timeout(
        Duration::from_secs(3),
        svc.render_artifact(test_day(), DisplayMode::Normal),
    )
    .await
    .expect("second run should not wait on the cancelled one")
    .unwrap();

    assert!(!second.cache_hit);
    assert!(second.path.is_file());
    assert_eq!(source.fetch_count(), 2);
}

#[tokio::test]
async fn test_waiter_takes_over_from_aborted_leader() {
    let dir = TempDir::new().unwrap();
    let source = CountingSource::new(create_reference_photo()).with_delay(Duration::from_millis(200));
    let svc = Arc::new(service(source.clone(), &dir));

    let leader = {
        let svc = svc.clone();
        tokio::spawn(async move { svc.render_artifact(test_day(), DisplayMode::Normal).await })
    };
    tokio::time::sleep(Duration::from_millis(30)).await;

    let waiter = {
        let svc = svc.clone();
        tokio::spawn(async move { svc.render_artifact(test_day(), DisplayMode::Inverted).await })
    };
    tokio::time::sleep(Duration::from_millis(30)).await;

    leader.abort();
    assert!(leader.await.unwrap_err().is_cancelled());

    let response = tokio::time::timeout(Duration::from_secs(3), waiter)
        .await
        .expect("waiter should finish after the leader is aborted")
        .unwrap()
        .unwrap();

    assert!(response.path.is_file());
    assert_eq!(source.fetch_count(), 2);
}
