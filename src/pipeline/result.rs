use std::path::{Path, PathBuf};

use serde::Serialize;

/// What the widget shows for a day: a rendered icon or a bundled fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PipelineResult {
    /// Path of the rendered PNG
    Rendered(PathBuf),
    /// Symbolic icon id chosen from the phase name
    Fallback(&'static str),
}

impl PipelineResult {
    pub fn is_fallback(&self) -> bool {
        matches!(self, PipelineResult::Fallback(_))
    }

    pub fn rendered_path(&self) -> Option<&Path> {
        match self {
            PipelineResult::Rendered(path) => Some(path),
            PipelineResult::Fallback(_) => None,
        }
    }

    pub fn fallback_icon(&self) -> Option<&'static str> {
        match self {
            PipelineResult::Rendered(_) => None,
            PipelineResult::Fallback(id) => Some(id),
        }
    }
}

/// Outcome of a successful [`render_artifact`](super::MoonImageService::render_artifact) call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResponse {
    /// Rendered artifact for the requested display mode
    pub path: PathBuf,

    /// Whether the artifact already existed and no work was done
    pub cache_hit: bool,
}
