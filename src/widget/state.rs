//! Display text for the widget.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::fallback::{fallback_icon, icon_path};
use crate::i18n::{Labels, Locale};
use crate::phase::{next_major_phase, PhaseInfo};
use crate::pipeline::PipelineResult;

/// Shown in place of a value that is not available.
pub const MISSING: &str = "—";

/// Icon shown in the panel itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PanelIcon {
    /// Bundled SVG file
    File(PathBuf),
    /// Icon name resolved by the desktop theme
    Themed(&'static str),
}

impl PanelIcon {
    /// Panel icon for an English phase name.
    ///
    /// Uses the bundled SVG when `icon_dir` holds one, the themed icon name
    /// otherwise.
    pub fn for_phase(phase_name: &str, icon_dir: Option<&Path>) -> Self {
        let id = fallback_icon(phase_name);
        match icon_dir.map(|dir| icon_path(dir, id)) {
            Some(path) if path.is_file() => PanelIcon::File(path),
            _ => PanelIcon::Themed(id),
        }
    }
}

/// Everything the widget renders for one refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetState {
    /// English phase name, used for icon lookup
    pub phase: String,
    /// Localized phase name
    pub phase_label: String,
    pub illumination: String,
    pub age: String,
    /// Localized name of the upcoming major phase
    pub next_phase: String,
    pub next_phase_time: String,
    pub panel_icon: PanelIcon,
    /// Popup image: rendered moon photo or fallback icon
    pub image: PipelineResult,
}

impl WidgetState {
    pub fn from_phase(
        info: &PhaseInfo,
        image: PipelineResult,
        locale: Locale,
        icon_dir: Option<&Path>,
    ) -> Self {
        let labels = locale.labels();

        let (next_phase, next_phase_time) = match info.seconds_to_next_phase {
            Some(seconds) => (
                next_major_phase(&info.phase_name)
                    .map(|p| locale.translate_phase(p.name()).to_string())
                    .unwrap_or_else(|| MISSING.to_string()),
                format!("{} {}", labels.r#in, format_countdown(seconds, &labels)),
            ),
            None => (MISSING.to_string(), MISSING.to_string()),
        };

        Self {
            phase: info.phase_name.clone(),
            phase_label: locale.translate_phase(&info.phase_name).to_string(),
            illumination: format_illumination(info.illumination_percent, &labels),
            age: info
                .age_days
                .map(|age| format_age(age, &labels))
                .unwrap_or_else(|| MISSING.to_string()),
            next_phase,
            next_phase_time,
            panel_icon: PanelIcon::for_phase(&info.phase_name, icon_dir),
            image,
        }
    }
}

/// `"<Illumination>: <v>%"`, with values under 0.1 shown as 0.
pub fn format_illumination(percent: f64, labels: &Labels) -> String {
    format!("{}: {}%", labels.illumination, one_decimal(percent))
}

/// `"<Age>: <v> <days>"`, with values under 0.1 shown as 0.
pub fn format_age(days: f64, labels: &Labels) -> String {
    format!("{}: {} {}", labels.age, one_decimal(days), labels.days)
}

/// Compact countdown such as `"3 d 4h 12min"`.
///
/// The day unit is the first letter of the localized word for days. Seconds
/// are dropped; a countdown under a minute reads `"0s"`.
pub fn format_countdown(seconds: i64, labels: &Labels) -> String {
    let seconds = seconds.max(0);
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3600;
    let minutes = (seconds % 3600) / 60;

    let mut parts = Vec::new();
    if days > 0 {
        let unit = labels.days.chars().next().unwrap_or('d');
        parts.push(format!("{} {}", days, unit));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}min", minutes));
    }

    if parts.is_empty() {
        "0s".to_string()
    } else {
        parts.join(" ")
    }
}

fn one_decimal(value: f64) -> String {
    if value < 0.1 {
        "0".to_string()
    } else {
        format!("{:.1}", value)
    }
}
