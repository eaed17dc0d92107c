//! Phase queries against a [`PhaseTable`].
//!
//! Between two table instants the phase is interpolated: the name comes from
//! the transition and the illumination follows `(1 - cos θ) / 2`, with θ
//! moving linearly across the transition's quarter of the cycle.

use std::f64::consts::{FRAC_PI_2, PI};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::error::PhaseError;

use super::table::{MajorPhase, PhaseInstant, PhaseTable};

/// Window around a table instant inside which it counts as exact.
pub const EXACT_WINDOW_HOURS: i64 = 12;

// =============================================================================
// PhaseInfo
// =============================================================================

/// Phase of the moon at an instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseInfo {
    /// English phase name (one of the eight, or "Between X and Y")
    pub phase_name: String,

    /// Illuminated fraction in percent, rounded to 0.1
    pub illumination_percent: f64,

    /// Days since the latest new moon, if the table has one
    pub age_days: Option<f64>,

    /// Seconds until the countdown target instant
    pub seconds_to_next_phase: Option<i64>,

    /// Countdown target instant
    pub next_phase_instant: Option<DateTime<Utc>>,

    /// Phase occurring at the countdown target instant
    pub next_phase_name: Option<String>,

    /// Whether `at` lies within the exact window of a table instant
    pub is_exact: bool,
}

/// Source of phase information for an instant.
pub trait PhaseQuery: Send + Sync {
    fn query(&self, at: DateTime<Utc>) -> Result<PhaseInfo, PhaseError>;
}

// =============================================================================
// PhaseCalculator
// =============================================================================

/// How the countdown to the next phase is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountdownMode {
    /// Skip to the following instant when the next one is under the exact
    /// window away, since that phase is already being shown
    #[default]
    Adjusted,
    /// Always count down to the next instant
    Raw,
}

/// [`PhaseQuery`] implementation over a shared table.
#[derive(Debug, Clone)]
pub struct PhaseCalculator {
    table: Arc<PhaseTable>,
    countdown: CountdownMode,
}

impl PhaseCalculator {
    pub fn new(table: Arc<PhaseTable>) -> Self {
        Self::with_countdown(table, CountdownMode::default())
    }

    pub fn with_countdown(table: Arc<PhaseTable>, countdown: CountdownMode) -> Self {
        Self { table, countdown }
    }

    pub fn table(&self) -> &PhaseTable {
        &self.table
    }

    /// Start and end of the covered range.
    pub fn range(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.table.first().at, self.table.last().at)
    }

    fn countdown_target(&self, at: DateTime<Utc>) -> Option<&PhaseInstant> {
        let next = self.table.next_after(at)?;
        match self.countdown {
            CountdownMode::Raw => Some(next),
            CountdownMode::Adjusted => {
                if next.at - at >= Duration::hours(EXACT_WINDOW_HOURS) {
                    Some(next)
                } else {
                    self.table.next_after(next.at)
                }
            }
        }
    }
}

impl PhaseQuery for PhaseCalculator {
    fn query(&self, at: DateTime<Utc>) -> Result<PhaseInfo, PhaseError> {
        let table = &self.table;
        let window = Duration::hours(EXACT_WINDOW_HOURS);

        let (phase_name, illumination_percent, is_exact) =
            if let Some(exact) = table.nearest_within(at, window) {
                (exact.phase.name().to_string(), exact.phase.illumination(), true)
            } else if at < table.first().at {
                return Err(PhaseError::OutOfRange {
                    message: format!("date before first known phase ({})", table.first().at),
                });
            } else if at > table.last().at {
                return Err(PhaseError::OutOfRange {
                    message: format!("date after last known phase ({})", table.last().at),
                });
            } else {
                let idx = table.upper_bound(at);
                let prev = &table.instants()[idx - 1];
                let next = &table.instants()[idx];
                (
                    intermediate_phase_name(prev.phase, next.phase),
                    interpolated_illumination(prev, next, at),
                    false,
                )
            };

        let age_days = table
            .last_new_moon(at)
            .map(|nm| (at - nm.at).num_milliseconds() as f64 / 86_400_000.0);

        let target = self.countdown_target(at);
        let seconds_to_next_phase =
            target.map(|t| ((t.at - at).num_milliseconds() as f64 / 1000.0).round() as i64);

        Ok(PhaseInfo {
            phase_name,
            illumination_percent,
            age_days,
            seconds_to_next_phase,
            next_phase_instant: target.map(|t| t.at),
            next_phase_name: target.map(|t| t.phase.name().to_string()),
            is_exact,
        })
    }
}

/// Name of the phase between two consecutive table instants.
pub fn intermediate_phase_name(prev: MajorPhase, next: MajorPhase) -> String {
    match (prev, next) {
        (MajorPhase::NewMoon, MajorPhase::FirstQuarter) => "Waxing Crescent".to_string(),
        (MajorPhase::FirstQuarter, MajorPhase::FullMoon) => "Waxing Gibbous".to_string(),
        (MajorPhase::FullMoon, MajorPhase::LastQuarter) => "Waning Gibbous".to_string(),
        (MajorPhase::LastQuarter, MajorPhase::NewMoon) => "Waning Crescent".to_string(),
        _ => format!("Between {} and {}", prev, next),
    }
}

fn interpolated_illumination(prev: &PhaseInstant, next: &PhaseInstant, at: DateTime<Utc>) -> f64 {
    let total = (next.at - prev.at).num_milliseconds() as f64;
    let progress = if total > 0.0 {
        (at - prev.at).num_milliseconds() as f64 / total
    } else {
        0.0
    };

    let (start, end) = if prev.phase.next() == next.phase {
        (prev.phase.angle(), prev.phase.angle() + FRAC_PI_2)
    } else {
        (0.0, 2.0 * PI)
    };

    let angle = start + (end - start) * progress;
    let percent = (1.0 - angle.cos()) / 2.0 * 100.0;
    (percent * 10.0).round() / 10.0
}

/// Major phase that follows any of the eight phase names.
pub fn next_major_phase(phase_name: &str) -> Option<MajorPhase> {
    match phase_name {
        "New Moon" | "Waxing Crescent" => Some(MajorPhase::FirstQuarter),
        "First Quarter" | "Waxing Gibbous" => Some(MajorPhase::FullMoon),
        "Full Moon" | "Waning Gibbous" => Some(MajorPhase::LastQuarter),
        "Last Quarter" | "Waning Crescent" => Some(MajorPhase::NewMoon),
        _ => None,
    }
}

// =============================================================================
// Tests
// =============================================================================
