//! # Moon Phase Widget
//!
//! A desktop panel widget showing the current lunar phase, illustrated by a
//! photograph of the moon downloaded once per day.
//!
//! The core of the library is the date-keyed image pipeline: it fetches the
//! day's photograph, locates the lunar disk, crops around it, and renders a
//! grayscale icon with a translucent ring at the disk edge. Every stage is
//! cached on disk by calendar day, and any failure falls back to a bundled
//! symbolic icon chosen from the phase name.
//!
//! ## Features
//!
//! - **Daily cache**: at most one download per day; later runs reuse the rendered icon
//! - **Resumable pipeline**: interrupted runs continue from the last persisted stage
//! - **Singleflight**: concurrent requests for a day share one download
//! - **Light and dark themes**: normal and inverted icons rendered side by side
//! - **15 languages**: localized phase names and labels
//!
//! ## Architecture
//!
//! - [`raster`] - Pixel buffer, disk location, cropping and rendering
//! - [`cache`] - Day-keyed artifact naming and atomic file storage
//! - [`fetch`] - Remote image source and URL templates
//! - [`pipeline`] - Service orchestrating fetch, processing and fallback
//! - [`mod@fallback`] - Bundled symbolic icons
//! - [`phase`] - Phase table and interpolating phase queries
//! - [`i18n`] - Translations
//! - [`widget`] - Panel widget adapter, display text and refresh controller
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use moon_phase_widget::{
//!     ArtifactStore, DisplayMode, HttpImageSource, MoonImageService, UrlTemplate,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let source = HttpImageSource::new(UrlTemplate::default(), 30).unwrap();
//!     let service = MoonImageService::new(source, ArtifactStore::in_temp_dir());
//!
//!     let today = chrono::Local::now().date_naive();
//!     let result = service.resolve(today, "Full Moon", DisplayMode::Normal).await;
//!     println!("{:?}", result);
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod fallback;
pub mod fetch;
pub mod i18n;
pub mod phase;
pub mod pipeline;
pub mod raster;
pub mod widget;

// Re-export commonly used types
pub use cache::{ArtifactState, ArtifactStore, CacheKey, Stage};
pub use config::{Cli, Command, CommonArgs, PhaseConfig, RenderConfig, WatchConfig};
pub use error::{FetchError, PhaseError, PipelineError, RasterError};
pub use fallback::{fallback_icon, icon_path, GENERIC_FALLBACK_ICON, PHASE_ICONS};
pub use fetch::{HttpImageSource, MoonImageSource, UrlTemplate, DEFAULT_URL_TEMPLATE};
pub use i18n::Locale;
pub use phase::{
    next_major_phase, CountdownMode, MajorPhase, PhaseCalculator, PhaseInfo, PhaseInstant,
    PhaseQuery, PhaseTable,
};
pub use pipeline::{MoonImageService, PipelineResult, RenderResponse};
pub use raster::{
    AdaptiveCropper, DiskBounds, DiskLocator, DiskRenderer, DisplayMode, RasterImage,
    CROP_MARGIN, FALLBACK_DISK_FRACTION,
};
pub use widget::{ConsoleWidget, PanelWidget, WidgetController, WidgetState};
