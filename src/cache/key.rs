//! Day-keyed cache naming.
//!
//! Every artifact is named by the calendar day it belongs to and the
//! pipeline stage that produced it:
//!
//! ```text
//! moon-phase-raw-20261016.png
//! moon-phase-cropped-20261016.png
//! moon-phase-rendered-20261016.png
//! moon-phase-rendered-20261016-inverted.png
//! ```

use chrono::{DateTime, Datelike, NaiveDate, TimeZone};

use crate::raster::DisplayMode;

/// File name prefix shared by all per-day artifacts.
pub const FILE_PREFIX: &str = "moon-phase";

/// Name of the stage-agnostic copy of the latest cropped image.
pub const MIRROR_FILE_NAME: &str = "moonphase.png";

// =============================================================================
// Stage
// =============================================================================

/// Pipeline stage an artifact belongs to, in production order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Image as downloaded
    Raw,
    /// Square crop around the disk
    Cropped,
    /// Final grayscale, ring-annotated icon
    Rendered(DisplayMode),
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Raw => "raw",
            Stage::Cropped => "cropped",
            Stage::Rendered(_) => "rendered",
        }
    }

    /// Whether the artifact is deleted once the rendered icons exist.
    pub fn is_intermediate(&self) -> bool {
        !matches!(self, Stage::Rendered(_))
    }
}

// =============================================================================
// CacheKey
// =============================================================================

/// Cache key: a calendar day.
///
/// Two instants on the same calendar day always map to the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    day: NaiveDate,
}

impl CacheKey {
    pub fn new(day: NaiveDate) -> Self {
        Self { day }
    }

    /// Key for the calendar day of `instant` in its own time zone.
    pub fn from_datetime<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        Self {
            day: instant.date_naive(),
        }
    }

    pub fn day(&self) -> NaiveDate {
        self.day
    }

    /// `yyyymmdd` stamp used in file names.
    pub fn stamp(&self) -> String {
        format!(
            "{:04}{:02}{:02}",
            self.day.year(),
            self.day.month(),
            self.day.day()
        )
    }

    /// File name of the artifact for `stage`.
    pub fn file_name(&self, stage: Stage) -> String {
        match stage {
            Stage::Rendered(DisplayMode::Inverted) => {
                format!("{}-{}-{}-inverted.png", FILE_PREFIX, stage.as_str(), self.stamp())
            }
            _ => format!("{}-{}-{}.png", FILE_PREFIX, stage.as_str(), self.stamp()),
        }
    }
}
