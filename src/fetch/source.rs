use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDate;

use crate::error::FetchError;

/// Trait for retrieving the photographic moon image of a calendar day.
///
/// This is the pipeline's only suspension point. Implementations must be
/// thread-safe so one source can serve concurrent pipeline runs.
#[async_trait]
pub trait MoonImageSource: Send + Sync {
    /// Fetch the encoded image bytes for `day`.
    async fn fetch(&self, day: NaiveDate) -> Result<Bytes, FetchError>;

    /// Get an identifier for this source (for logging).
    fn identifier(&self) -> &str;
}
