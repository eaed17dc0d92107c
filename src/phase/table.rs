//! Table of major lunar phase instants.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PhaseError;

/// Mean synodic month in days.
pub const SYNODIC_MONTH_DAYS: f64 = 29.530588853;

/// Lunations covered by the built-in table.
pub const DEFAULT_LUNATIONS: u32 = 1300;

// =============================================================================
// MajorPhase
// =============================================================================

/// One of the four principal phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MajorPhase {
    #[serde(rename = "New Moon")]
    NewMoon,
    #[serde(rename = "First Quarter")]
    FirstQuarter,
    #[serde(rename = "Full Moon")]
    FullMoon,
    #[serde(rename = "Last Quarter")]
    LastQuarter,
}

impl MajorPhase {
    /// Phases in lunation order, starting at new moon.
    pub const CYCLE: [MajorPhase; 4] = [
        MajorPhase::NewMoon,
        MajorPhase::FirstQuarter,
        MajorPhase::FullMoon,
        MajorPhase::LastQuarter,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MajorPhase::NewMoon => "New Moon",
            MajorPhase::FirstQuarter => "First Quarter",
            MajorPhase::FullMoon => "Full Moon",
            MajorPhase::LastQuarter => "Last Quarter",
        }
    }

    /// Parse an English phase name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::CYCLE.into_iter().find(|p| p.name() == name)
    }

    /// Nominal illuminated fraction at the phase instant, in percent.
    pub fn illumination(&self) -> f64 {
        match self {
            MajorPhase::NewMoon => 0.0,
            MajorPhase::FirstQuarter | MajorPhase::LastQuarter => 50.0,
            MajorPhase::FullMoon => 100.0,
        }
    }

    /// Phase angle at the instant, in radians on [0, 2π).
    pub fn angle(&self) -> f64 {
        use std::f64::consts::FRAC_PI_2;
        match self {
            MajorPhase::NewMoon => 0.0,
            MajorPhase::FirstQuarter => FRAC_PI_2,
            MajorPhase::FullMoon => 2.0 * FRAC_PI_2,
            MajorPhase::LastQuarter => 3.0 * FRAC_PI_2,
        }
    }

    /// Following phase in the cycle.
    pub fn next(&self) -> Self {
        match self {
            MajorPhase::NewMoon => MajorPhase::FirstQuarter,
            MajorPhase::FirstQuarter => MajorPhase::FullMoon,
            MajorPhase::FullMoon => MajorPhase::LastQuarter,
            MajorPhase::LastQuarter => MajorPhase::NewMoon,
        }
    }
}

impl fmt::Display for MajorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// PhaseInstant
// =============================================================================

/// A major phase and the instant it occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseInstant {
    pub phase: MajorPhase,
    pub at: DateTime<Utc>,
}

impl PhaseInstant {
    pub fn new(phase: MajorPhase, at: DateTime<Utc>) -> Self {
        Self { phase, at }
    }
}

// =============================================================================
// PhaseTable
// =============================================================================

/// Major phase instants sorted by time.
///
/// Built once at startup and shared read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseTable {
    instants: Vec<PhaseInstant>,
}

impl PhaseTable {
    /// Build a table from unsorted instants.
    pub fn from_instants(mut instants: Vec<PhaseInstant>) -> Result<Self, PhaseError> {
        if instants.is_empty() {
            return Err(PhaseError::EmptyTable);
        }
        instants.sort_by_key(|i| i.at);
        Ok(Self { instants })
    }

    /// Parse a JSON array of `{ "phase": "New Moon", "at": "<RFC 3339>" }`.
    pub fn from_json(json: &str) -> Result<Self, PhaseError> {
        let instants: Vec<PhaseInstant> =
            serde_json::from_str(json).map_err(|e| PhaseError::InvalidTable(e.to_string()))?;
        Self::from_instants(instants)
    }

    /// Load a JSON table from a file.
    pub fn from_file(path: &Path) -> Result<Self, PhaseError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| PhaseError::InvalidTable(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Generate instants at every quarter of a mean lunation.
    ///
    /// `start` must be a new moon. The table spans `lunations` full cycles
    /// and ends on a new moon.
    pub fn mean_lunation(start: DateTime<Utc>, lunations: u32) -> Self {
        let quarter_ms = SYNODIC_MONTH_DAYS * 86_400_000.0 / 4.0;
        let count = lunations as usize * 4 + 1;

        let instants = (0..count)
            .map(|i| {
                let offset = Duration::milliseconds((i as f64 * quarter_ms).round() as i64);
                PhaseInstant::new(MajorPhase::CYCLE[i % 4], start + offset)
            })
            .collect();

        Self { instants }
    }

    /// Reference new moon the built-in table starts from.
    pub fn reference_new_moon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2000, 1, 6, 18, 14, 0)
            .single()
            .unwrap_or_default()
    }

    pub fn instants(&self) -> &[PhaseInstant] {
        &self.instants
    }

    pub fn len(&self) -> usize {
        self.instants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instants.is_empty()
    }

    pub fn first(&self) -> &PhaseInstant {
        &self.instants[0]
    }

    pub fn last(&self) -> &PhaseInstant {
        &self.instants[self.instants.len() - 1]
    }

    /// Index of the first instant strictly after `at`.
    pub(crate) fn upper_bound(&self, at: DateTime<Utc>) -> usize {
        self.instants.partition_point(|i| i.at <= at)
    }

    /// Earliest instant within `tolerance` of `at`.
    pub fn nearest_within(&self, at: DateTime<Utc>, tolerance: Duration) -> Option<&PhaseInstant> {
        let idx = self.upper_bound(at);
        let lo = idx.saturating_sub(1);
        let hi = (idx + 1).min(self.instants.len());
        self.instants[lo..hi]
            .iter()
            .find(|i| (at - i.at).abs() <= tolerance)
    }

    /// Latest new moon at or before `at`.
    pub fn last_new_moon(&self, at: DateTime<Utc>) -> Option<&PhaseInstant> {
        self.instants[..self.upper_bound(at)]
            .iter()
            .rev()
            .find(|i| i.phase == MajorPhase::NewMoon)
    }

    /// First instant strictly after `at`.
    pub fn next_after(&self, at: DateTime<Utc>) -> Option<&PhaseInstant> {
        self.instants.get(self.upper_bound(at))
    }
}

impl Default for PhaseTable {
    fn default() -> Self {
        Self::mean_lunation(Self::reference_new_moon(), DEFAULT_LUNATIONS)
    }
}
