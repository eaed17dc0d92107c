use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use tracing::{debug, info};

use crate::pipeline::PipelineResult;

use super::state::{PanelIcon, WidgetState};

/// Callback fired when the user activates the widget.
pub type ActivateCallback = Box<dyn Fn() + Send + Sync>;

/// Binding between the widget logic and a concrete panel toolkit.
///
/// Implementations use interior mutability so one widget can be shared
/// between the refresh loop and input handling.
pub trait PanelWidget: Send + Sync {
    /// Show `state`.
    fn render(&self, state: &WidgetState);

    /// Register a callback for user activation.
    fn on_activate(&self, callback: ActivateCallback);

    /// Tear the widget down. Later renders are ignored.
    fn destroy(&self);
}

// =============================================================================
// ConsoleWidget
// =============================================================================

/// Widget that renders to the log.
#[derive(Default)]
pub struct ConsoleWidget {
    callbacks: Mutex<Vec<ActivateCallback>>,
    last: Mutex<Option<WidgetState>>,
    renders: AtomicUsize,
    destroyed: AtomicBool,
}

impl ConsoleWidget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a user click: fire every registered callback.
    pub fn activate(&self) {
        if self.is_destroyed() {
            return;
        }
        let callbacks = self.callbacks.lock().unwrap_or_else(|e| e.into_inner());
        for callback in callbacks.iter() {
            callback();
        }
    }

    /// Most recently rendered state.
    pub fn last_state(&self) -> Option<WidgetState> {
        self.last.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of renders shown.
    pub fn render_count(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }
}

impl PanelWidget for ConsoleWidget {
    fn render(&self, state: &WidgetState) {
        if self.is_destroyed() {
            debug!("Ignoring render on destroyed widget");
            return;
        }

        let icon = match &state.panel_icon {
            PanelIcon::File(path) => path.display().to_string(),
            PanelIcon::Themed(name) => name.to_string(),
        };
        let image = match &state.image {
            PipelineResult::Rendered(path) => path.display().to_string(),
            PipelineResult::Fallback(id) => id.to_string(),
        };

        info!("[{}] {}", icon, state.phase_label);
        info!("  {}", state.illumination);
        info!("  {}", state.age);
        info!("  {} {}", state.next_phase, state.next_phase_time);
        info!("  image: {}", image);

        *self.last.lock().unwrap_or_else(|e| e.into_inner()) = Some(state.clone());
        self.renders.fetch_add(1, Ordering::SeqCst);
    }

    fn on_activate(&self, callback: ActivateCallback) {
        self.callbacks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(callback);
    }

    fn destroy(&self) {
        if !self.destroyed.swap(true, Ordering::SeqCst) {
            self.callbacks
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clear();
            debug!("Widget destroyed");
        }
    }
}
