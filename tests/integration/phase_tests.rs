//! Phase table and widget refresh integration tests.
//!
//! Tests verify:
//! - Phase tables load from JSON files
//! - Queries interpolate between, and snap to, table instants
//! - A widget refresh combines phase text with the day's rendered image

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use tempfile::TempDir;

use moon_phase_widget::widget::PanelIcon;
use moon_phase_widget::{
    ArtifactStore, ConsoleWidget, CountdownMode, Locale, MajorPhase, MoonImageService, PhaseCalculator,
    PhaseError, PhaseQuery, PhaseTable, PipelineResult, WidgetController,
};

use super::test_utils::{create_reference_photo, CountingSource};

/// One lunation with quarters exactly seven days apart, deliberately unsorted.
const TABLE_JSON: &str = r#"[
    { "phase": "Full Moon", "at": "2026-10-24T00:00:00Z" },
    { "phase": "New Moon", "at": "2026-10-10T00:00:00Z" },
    { "phase": "First Quarter", "at": "2026-10-17T00:00:00Z" },
    { "phase": "Last Quarter", "at": "2026-10-31T00:00:00Z" },
    { "phase": "New Moon", "at": "2026-11-07T00:00:00Z" }
]"#;

fn utc(month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, month, day, hour, 0, 0).unwrap()
}

fn load_table() -> (TempDir, Arc<PhaseTable>) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("phases.json");
    std::fs::write(&path, TABLE_JSON).unwrap();
    let table = PhaseTable::from_file(&path).unwrap();
    (dir, Arc::new(table))
}

// =============================================================================
// Phase Table
// =============================================================================

#[test]
fn test_table_file_is_sorted() {
    let (_dir, table) = load_table();

    assert_eq!(table.len(), 5);
    let phases: Vec<MajorPhase> = table.instants().iter().map(|i| i.phase).collect();
    assert_eq!(
        phases,
        vec![
            MajorPhase::NewMoon,
            MajorPhase::FirstQuarter,
            MajorPhase::FullMoon,
            MajorPhase::LastQuarter,
            MajorPhase::NewMoon,
        ]
    );
    assert_eq!(table.first().at, utc(10, 10, 0));
    assert_eq!(table.last().at, utc(11, 7, 0));
}

#[test]
fn test_malformed_table_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("phases.json");

    std::fs::write(&path, r#"[{ "phase": "Blue Moon", "at": "2026-10-10T00:00:00Z" }]"#).unwrap();
    assert!(matches!(
        PhaseTable::from_file(&path),
        Err(PhaseError::InvalidTable(_))
    ));

    std::fs::write(&path, "[]").unwrap();
    assert!(matches!(PhaseTable::from_file(&path), Err(PhaseError::EmptyTable)));
}

// =============================================================================
// Phase Queries
// =============================================================================

#[test]
fn test_query_between_instants() {
    let (_dir, table) = load_table();
    let calc = PhaseCalculator::new(table);

    let info = calc.query(Utc.with_ymd_and_hms(2026, 10, 13, 12, 0, 0).unwrap()).unwrap();

    assert_eq!(info.phase_name, "Waxing Crescent");
    assert!(!info.is_exact);
    assert!((info.illumination_percent - 14.6).abs() < 1e-9);
    assert!((info.age_days.unwrap() - 3.5).abs() < 1e-9);
    assert_eq!(info.seconds_to_next_phase, Some(302_400));
    assert_eq!(info.next_phase_instant, Some(utc(10, 17, 0)));
    assert_eq!(info.next_phase_name.as_deref(), Some("First Quarter"));
}

#[test]
fn test_query_snaps_to_nearby_instant() {
    let (_dir, table) = load_table();
    let calc = PhaseCalculator::new(table);

    let info = calc.query(utc(10, 17, 6)).unwrap();

    assert_eq!(info.phase_name, "First Quarter");
    assert!(info.is_exact);
    assert_eq!(info.illumination_percent, 50.0);
    // 6 days 18 hours until the full moon
    assert_eq!(info.seconds_to_next_phase, Some(583_200));
}

#[test]
fn test_countdown_modes_just_before_phase() {
    let (_dir, table) = load_table();
    let at = utc(10, 16, 13);

    let adjusted = PhaseCalculator::new(table.clone()).query(at).unwrap();
    assert_eq!(adjusted.phase_name, "First Quarter");
    assert_eq!(adjusted.next_phase_name.as_deref(), Some("Full Moon"));
    assert_eq!(adjusted.next_phase_instant, Some(utc(10, 24, 0)));

    let raw = PhaseCalculator::with_countdown(table, CountdownMode::Raw)
        .query(at)
        .unwrap();
    assert_eq!(raw.phase_name, "First Quarter");
    assert_eq!(raw.next_phase_name.as_deref(), Some("First Quarter"));
    assert_eq!(raw.seconds_to_next_phase, Some(11 * 3600));
}

#[test]
fn test_query_outside_table() {
    let (_dir, table) = load_table();
    let calc = PhaseCalculator::new(table);

    assert!(matches!(
        calc.query(utc(9, 1, 0)),
        Err(PhaseError::OutOfRange { .. })
    ));
    assert!(matches!(
        calc.query(utc(12, 1, 0)),
        Err(PhaseError::OutOfRange { .. })
    ));
}

#[test]
fn test_default_table_covers_today() {
    let calc = PhaseCalculator::new(Arc::new(PhaseTable::default()));
    let info = calc.query(utc(10, 16, 12)).unwrap();

    assert!((0.0..=100.0).contains(&info.illumination_percent));
    let age = info.age_days.unwrap();
    assert!((0.0..30.0).contains(&age));
    assert!(info.seconds_to_next_phase.unwrap() > 0);
}

// =============================================================================
// Widget Refresh
// =============================================================================

#[tokio::test]
async fn test_refresh_renders_localized_state() {
    let (_table_dir, table) = load_table();
    let cache_dir = TempDir::new().unwrap();
    let source = CountingSource::new(create_reference_photo());
    let service = Arc::new(MoonImageService::new(
        source.clone(),
        ArtifactStore::new(cache_dir.path()),
    ));
    let widget = Arc::new(ConsoleWidget::new());

    let controller =
        WidgetController::new(PhaseCalculator::new(table), service, widget.clone(), Locale::Fr);

    let now = Utc.with_ymd_and_hms(2026, 10, 13, 12, 0, 0).unwrap();
    let state = controller.refresh(&now).await;

    assert_eq!(state.phase, "Waxing Crescent");
    assert_eq!(state.phase_label, "Premier Croissant");
    assert_eq!(state.illumination, "Illumination: 14.6%");
    assert_eq!(state.age, "Âge: 3.5 jours");
    assert_eq!(state.next_phase, "Premier Quartier");
    assert_eq!(state.next_phase_time, "dans 3 j 12h");
    assert_eq!(state.panel_icon, PanelIcon::Themed("Waxing-crescent-symbolic"));

    let path = state.image.rendered_path().expect("rendered icon");
    assert_eq!(
        path.file_name().unwrap().to_string_lossy(),
        "moon-phase-rendered-20261013.png"
    );

    assert_eq!(widget.render_count(), 1);
    assert_eq!(widget.last_state(), Some(state.clone()));

    // A second refresh the same day reuses the image
    let again = controller.refresh(&now).await;
    assert_eq!(again.image, state.image);
    assert_eq!(source.fetch_count(), 1);
}

#[tokio::test]
async fn test_refresh_keys_image_by_local_day() {
    let (_table_dir, table) = load_table();
    let cache_dir = TempDir::new().unwrap();
    let source = CountingSource::new(create_reference_photo());
    let service = Arc::new(MoonImageService::new(
        source.clone(),
        ArtifactStore::new(cache_dir.path()),
    ));
    let controller = WidgetController::new(
        PhaseCalculator::new(table),
        service,
        Arc::new(ConsoleWidget::new()),
        Locale::En,
    );

    // Already the 14th in UTC
    let offset = FixedOffset::west_opt(5 * 3600).unwrap();
    let now = offset.with_ymd_and_hms(2026, 10, 13, 23, 30, 0).unwrap();
    controller.refresh(&now).await;

    assert_eq!(
        source.fetched_days(),
        vec![NaiveDate::from_ymd_opt(2026, 10, 13).unwrap()]
    );
}

#[tokio::test]
async fn test_refresh_outside_table_shows_full_moon() {
    let (_table_dir, table) = load_table();
    let cache_dir = TempDir::new().unwrap();
    let service = Arc::new(MoonImageService::new(
        CountingSource::failing(),
        ArtifactStore::new(cache_dir.path()),
    ));

    let icon_dir = TempDir::new().unwrap();
    let svg = icon_dir.path().join("Full-moon-symbolic.svg");
    std::fs::write(&svg, "<svg/>").unwrap();

    let controller = WidgetController::new(
        PhaseCalculator::new(table),
        service,
        Arc::new(ConsoleWidget::new()),
        Locale::En,
    )
    .with_icon_dir(Some(icon_dir.path().to_path_buf()));

    let state = controller.refresh(&utc(12, 25, 0)).await;

    assert_eq!(state.phase, "Full Moon");
    assert_eq!(state.illumination, "Illumination: 100.0%");
    assert_eq!(state.age, "—");
    assert_eq!(state.next_phase_time, "—");
    assert_eq!(state.panel_icon, PanelIcon::File(svg));
    assert_eq!(state.image, PipelineResult::Fallback("Full-moon-symbolic"));
}

#[test]
fn test_activation_reaches_callback() {
    let widget = Arc::new(ConsoleWidget::new());
    let controller = WidgetController::new(
        PhaseCalculator::new(Arc::new(PhaseTable::default())),
        Arc::new(MoonImageService::new(
            CountingSource::failing(),
            ArtifactStore::in_temp_dir(),
        )),
        widget.clone(),
        Locale::En,
    );

    controller.bind_activation();
    widget.activate();
    controller.shutdown();

    assert!(widget.is_destroyed());
}
