//! Daily moon icon pipeline.
//!
//! [`MoonImageService`] turns a day into either a rendered icon path or a
//! fallback icon id ([`PipelineResult`]), reusing whatever artifacts the
//! cache already holds.

mod result;
mod service;

pub use result::{PipelineResult, RenderResponse};
pub use service::MoonImageService;
