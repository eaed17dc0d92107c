//! Bundled symbolic icons shown when no rendered image is available.

use std::path::{Path, PathBuf};

/// Icon shown for phase names without a dedicated icon.
pub const GENERIC_FALLBACK_ICON: &str = "weather-clear-night-symbolic";

/// Phase name to bundled icon id.
pub const PHASE_ICONS: [(&str, &str); 8] = [
    ("New Moon", "New-moon-symbolic"),
    ("Waxing Crescent", "Waxing-crescent-symbolic"),
    ("First Quarter", "First-quarter-symbolic"),
    ("Waxing Gibbous", "Waxing-gibbous-symbolic"),
    ("Full Moon", "Full-moon-symbolic"),
    ("Waning Gibbous", "Waning-gibbous-symbolic"),
    ("Last Quarter", "Last-quarter-symbolic"),
    ("Waning Crescent", "Waning-crescent-symbolic"),
];

/// Icon id for an English phase name. Matching is exact.
pub fn fallback_icon(phase_name: &str) -> &'static str {
    PHASE_ICONS
        .iter()
        .find(|(name, _)| *name == phase_name)
        .map(|(_, icon)| *icon)
        .unwrap_or(GENERIC_FALLBACK_ICON)
}

/// Location of the SVG for `icon_id` inside a bundled icon directory.
pub fn icon_path(icon_dir: &Path, icon_id: &str) -> PathBuf {
    icon_dir.join(format!("{}.svg", icon_id))
}
