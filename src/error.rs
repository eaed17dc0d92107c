use std::path::Path;

use thiserror::Error;

/// Errors that can occur when retrieving the daily moon image
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// URL template expanded to something that is not an http(s) URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Network or connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Request did not complete in time
    #[error("Request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Remote host answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Remote host answered with something that is not an image
    #[error("Unexpected content type: {0}")]
    ContentType(String),

    /// Response body exceeds the download limit
    #[error("Response too large: {size} bytes exceeds limit of {limit} bytes")]
    TooLarge { size: u64, limit: u64 },

    /// Response body was empty
    #[error("Empty response body from {0}")]
    EmptyBody(String),
}

/// Errors raised while decoding, transforming or encoding raster images
#[derive(Debug, Clone, Error)]
pub enum RasterError {
    /// Source bytes are not a decodable image
    #[error("Failed to decode image: {message}")]
    Decode { message: String },

    /// Image could not be encoded as PNG
    #[error("Failed to encode image: {message}")]
    Encode { message: String },

    /// Pixel buffer does not match the declared geometry
    #[error("Invalid raster layout: {message}")]
    InvalidLayout { message: String },
}

/// Errors that abort one run of the image pipeline.
///
/// Every variant ends in the fallback icon; none is retried within the
/// same invocation.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    /// The remote image could not be retrieved
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// An artifact could not be decoded or encoded
    #[error("Raster error: {0}")]
    Raster(#[from] RasterError),

    /// Reading, writing or renaming a cache file failed
    #[error("Storage error at {path}: {message}")]
    Storage { path: String, message: String },
}

impl PipelineError {
    /// Build a storage error from an I/O failure on `path`.
    pub fn storage(path: &Path, err: std::io::Error) -> Self {
        PipelineError::Storage {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

/// Errors from the lunar phase table
#[derive(Debug, Clone, Error)]
pub enum PhaseError {
    /// Requested instant lies outside the known phase instants
    #[error("Date out of range: {message}")]
    OutOfRange { message: String },

    /// Phase table has no instants
    #[error("Phase table is empty")]
    EmptyTable,

    /// Phase table file could not be parsed
    #[error("Invalid phase table: {0}")]
    InvalidTable(String),
}
