//! Lunar phase arithmetic.
//!
//! Phases come from a fixed table of major phase instants rather than an
//! ephemeris. The built-in table is generated from the mean synodic month;
//! a measured table can be loaded from JSON instead.
//!
//! - [`PhaseTable`]: sorted [`PhaseInstant`]s of the four [`MajorPhase`]s
//! - [`PhaseQuery`]: the interface the widget asks for a [`PhaseInfo`]
//! - [`PhaseCalculator`]: interpolating implementation over a table

mod calculator;
mod table;

pub use calculator::{
    intermediate_phase_name, next_major_phase, CountdownMode, PhaseCalculator, PhaseInfo,
    PhaseQuery, EXACT_WINDOW_HOURS,
};
pub use table::{MajorPhase, PhaseInstant, PhaseTable, DEFAULT_LUNATIONS, SYNODIC_MONTH_DAYS};
