use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use tracing::{info, warn};

use crate::fetch::MoonImageSource;
use crate::i18n::Locale;
use crate::phase::{PhaseInfo, PhaseQuery};
use crate::pipeline::MoonImageService;
use crate::raster::DisplayMode;

use super::panel::PanelWidget;
use super::state::WidgetState;

/// Page opened when the widget is activated.
pub const MOON_CALENDAR_URL: &str = "https://starwalk.space/en/moon-calendar";

/// Phase shown when the phase query fails.
pub const FALLBACK_PHASE: &str = "Full Moon";

/// Ties the phase query and the image pipeline to a widget.
pub struct WidgetController<Q, S, W>
where
    Q: PhaseQuery,
    S: MoonImageSource,
    W: PanelWidget,
{
    query: Q,
    service: Arc<MoonImageService<S>>,
    widget: Arc<W>,
    locale: Locale,
    mode: DisplayMode,
    icon_dir: Option<PathBuf>,
}

impl<Q, S, W> WidgetController<Q, S, W>
where
    Q: PhaseQuery,
    S: MoonImageSource,
    W: PanelWidget,
{
    pub fn new(query: Q, service: Arc<MoonImageService<S>>, widget: Arc<W>, locale: Locale) -> Self {
        Self {
            query,
            service,
            widget,
            locale,
            mode: DisplayMode::default(),
            icon_dir: None,
        }
    }

    pub fn with_mode(mut self, mode: DisplayMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_icon_dir(mut self, icon_dir: Option<PathBuf>) -> Self {
        self.icon_dir = icon_dir;
        self
    }

    pub fn widget(&self) -> &Arc<W> {
        &self.widget
    }

    /// Register the activation handler that points the user at the moon
    /// calendar.
    pub fn bind_activation(&self) {
        self.widget.on_activate(Box::new(|| {
            info!("Moon calendar: {}", MOON_CALENDAR_URL);
        }));
    }

    /// Query the phase at `now`, resolve the day's image and render.
    ///
    /// The image is keyed by the calendar day of `now` in its own time zone.
    pub async fn refresh<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> WidgetState {
        let day = now.date_naive();
        let at = now.with_timezone(&Utc);

        let info = self.query.query(at).unwrap_or_else(|e| {
            warn!("Moon phase calculation failed: {}", e);
            fallback_phase()
        });

        let image = self.service.resolve(day, &info.phase_name, self.mode).await;
        let state = WidgetState::from_phase(&info, image, self.locale, self.icon_dir.as_deref());
        self.widget.render(&state);
        state
    }

    /// Destroy the widget.
    pub fn shutdown(&self) {
        self.widget.destroy();
    }
}

/// Phase info shown when the query fails.
pub fn fallback_phase() -> PhaseInfo {
    PhaseInfo {
        phase_name: FALLBACK_PHASE.to_string(),
        illumination_percent: 100.0,
        age_days: None,
        seconds_to_next_phase: None,
        next_phase_instant: None,
        next_phase_name: None,
        is_exact: false,
    }
}
