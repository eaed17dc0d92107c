//! Panel widget binding.
//!
//! ```text
//!  PhaseQuery ──▶ PhaseInfo ─┐
//!                            ├──▶ WidgetState ──▶ PanelWidget::render
//!  MoonImageService ──▶ PipelineResult ─┘
//! ```
//!
//! - [`PanelWidget`]: adapter trait for a concrete panel toolkit
//! - [`ConsoleWidget`]: log-backed adapter used by the CLI
//! - [`WidgetController`]: periodic refresh and activation wiring
//! - [`WidgetState`]: localized display text

mod controller;
mod panel;
mod state;

pub use controller::{fallback_phase, WidgetController, FALLBACK_PHASE, MOON_CALENDAR_URL};
pub use panel::{ActivateCallback, ConsoleWidget, PanelWidget};
pub use state::{format_age, format_countdown, format_illumination, PanelIcon, WidgetState, MISSING};
