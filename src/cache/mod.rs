//! Date-keyed artifact cache.
//!
//! The cache maps a calendar day to a fixed set of files, one per pipeline
//! stage:
//!
//! ```text
//! NO_ARTIFACT ──fetch──▶ HAS_RAW ──locate+crop──▶ HAS_CROPPED ──render──▶ HAS_RENDERED
//! ```
//!
//! Presence of a later stage means earlier stages are never recomputed. Raw
//! and cropped files are intermediates and are deleted once the rendered
//! icons are written.
//!
//! - [`CacheKey`]: the calendar day and the file names derived from it
//! - [`ArtifactStore`]: reads, atomic writes, probing and cleanup

mod key;
mod store;

pub use key::{CacheKey, Stage, FILE_PREFIX, MIRROR_FILE_NAME};
pub use store::{ArtifactState, ArtifactStore};
