//! Remote moon image retrieval.
//!
//! - [`MoonImageSource`]: the async seam the pipeline fetches through
//! - [`HttpImageSource`]: HTTP(S) implementation over a date-templated URL
//! - [`UrlTemplate`]: `{year}`/`{month}`/`{day}` expansion and validation

mod http;
mod source;
mod template;

pub use http::{HttpImageSource, DEFAULT_FETCH_TIMEOUT_SECS, MAX_IMAGE_BYTES};
pub use source::MoonImageSource;
pub use template::{UrlTemplate, DEFAULT_URL_TEMPLATE, PLACEHOLDERS};
