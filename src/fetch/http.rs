use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use chrono::NaiveDate;
use tracing::debug;

use crate::error::FetchError;

use super::source::MoonImageSource;
use super::template::UrlTemplate;

/// Default request timeout in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Largest accepted image body (10 MB).
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Image source fetching from an HTTP(S) URL template.
pub struct HttpImageSource {
    client: reqwest::Client,
    template: UrlTemplate,
    timeout_secs: u64,
    max_bytes: u64,
    identifier: String,
}

impl HttpImageSource {
    /// Create a source with its own client using the given timeout.
    pub fn new(template: UrlTemplate, timeout_secs: u64) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| FetchError::Connection(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, template, timeout_secs))
    }

    /// Create a source around an existing client.
    ///
    /// `timeout_secs` is only used for error reporting; the client's own
    /// timeout applies.
    pub fn with_client(client: reqwest::Client, template: UrlTemplate, timeout_secs: u64) -> Self {
        let identifier = template.as_str().to_string();
        Self {
            client,
            template,
            timeout_secs,
            max_bytes: MAX_IMAGE_BYTES,
            identifier,
        }
    }

    /// Override the body size limit.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn template(&self) -> &UrlTemplate {
        &self.template
    }

    fn map_reqwest_error(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout {
                seconds: self.timeout_secs,
            }
        } else if e.is_connect() {
            FetchError::Connection(format!("unable to connect: {}", e))
        } else {
            FetchError::Connection(format!("request failed: {}", e))
        }
    }
}

#[async_trait]
impl MoonImageSource for HttpImageSource {
    async fn fetch(&self, day: NaiveDate) -> Result<Bytes, FetchError> {
        let url = self.template.expand(day)?;
        debug!("GET {}", url);

        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        if let Some(ct) = response.headers().get(reqwest::header::CONTENT_TYPE) {
            if let Ok(ct_str) = ct.to_str() {
                if !ct_str.trim_start().to_ascii_lowercase().starts_with("image/") {
                    return Err(FetchError::ContentType(ct_str.to_string()));
                }
            }
        }

        // Check declared size before reading the body
        if let Some(size) = response.content_length() {
            if size > self.max_bytes {
                return Err(FetchError::TooLarge {
                    size,
                    limit: self.max_bytes,
                });
            }
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| self.map_reqwest_error(e))? {
            let size = (body.len() + chunk.len()) as u64;
            if size > self.max_bytes {
                return Err(FetchError::TooLarge {
                    size,
                    limit: self.max_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        if body.is_empty() {
            return Err(FetchError::EmptyBody(url.to_string()));
        }

        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body.freeze())
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}

// =============================================================================
// Tests
// =============================================================================
