//! Test utilities for integration tests.
//!
//! This module provides a counting mock image source, a one-shot local HTTP
//! server, and helpers for building synthetic moon photographs.

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDate;
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use moon_phase_widget::error::FetchError;
use moon_phase_widget::fetch::MoonImageSource;

/// Background of synthetic photographs; bright enough not to count as disk.
pub const BACKGROUND: [u8; 3] = [250, 250, 250];

/// Disk color of synthetic photographs.
pub const DISK: [u8; 3] = [80, 60, 40];

// =============================================================================
// Counting Mock Source
// =============================================================================

/// A mock image source that counts fetches.
///
/// Clones share the counter, so a test can keep a handle after moving the
/// source into a service.
pub struct CountingSource {
    data: Option<Bytes>,
    delay: Option<Duration>,
    fetches: Arc<AtomicUsize>,
    days: Arc<std::sync::Mutex<Vec<NaiveDate>>>,
}

impl CountingSource {
    /// Source that always returns `data`.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data: Some(Bytes::from(data)),
            delay: None,
            fetches: Arc::new(AtomicUsize::new(0)),
            days: Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    /// Source whose every fetch fails with a connection error.
    pub fn failing() -> Self {
        Self {
            data: None,
            ..Self::new(Vec::new())
        }
    }

    /// Wait `delay` before answering each fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn fetched_days(&self) -> Vec<NaiveDate> {
        self.days.lock().unwrap().clone()
    }
}

impl Clone for CountingSource {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            delay: self.delay,
            fetches: Arc::clone(&self.fetches),
            days: Arc::clone(&self.days),
        }
    }
}

#[async_trait]
impl MoonImageSource for CountingSource {
    async fn fetch(&self, day: NaiveDate) -> Result<Bytes, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.days.lock().unwrap().push(day);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.data
            .clone()
            .ok_or_else(|| FetchError::Connection("connection refused".to_string()))
    }

    fn identifier(&self) -> &str {
        "counting-mock"
    }
}

// =============================================================================
// Synthetic Photographs
// =============================================================================

/// Whether the center of pixel `(x, y)` lies inside the circle.
pub fn in_disk(x: u32, y: u32, cx: f64, cy: f64, radius: f64) -> bool {
    let dx = x as f64 + 0.5 - cx;
    let dy = y as f64 + 0.5 - cy;
    dx * dx + dy * dy <= radius * radius
}

/// Opaque RGB PNG: a dark disk of `diameter` centered at `(cx, cy)` on a
/// bright background.
pub fn create_disk_png(width: u32, height: u32, cx: f64, cy: f64, diameter: f64) -> Vec<u8> {
    let radius = diameter / 2.0;
    let img = RgbImage::from_fn(width, height, |x, y| {
        if in_disk(x, y, cx, cy, radius) {
            Rgb(DISK)
        } else {
            Rgb(BACKGROUND)
        }
    });
    encode(img, ImageFormat::Png)
}

/// RGBA PNG: an opaque disk on a fully transparent background.
pub fn create_transparent_disk_png(width: u32, height: u32, diameter: f64) -> Vec<u8> {
    let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
    let radius = diameter / 2.0;
    let img = RgbaImage::from_fn(width, height, |x, y| {
        if in_disk(x, y, cx, cy, radius) {
            Rgba([200, 200, 190, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    encode(img, ImageFormat::Png)
}

/// The reference scene: 300x300 with a 200 px disk in the middle.
pub fn create_reference_photo() -> Vec<u8> {
    create_disk_png(300, 300, 150.0, 150.0, 200.0)
}

fn encode<I>(img: I, format: ImageFormat) -> Vec<u8>
where
    I: Into<image::DynamicImage>,
{
    let mut buf = Cursor::new(Vec::new());
    img.into().write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

// =============================================================================
// Local HTTP Server
// =============================================================================

/// Canned HTTP response served by [`serve`].
pub struct CannedResponse {
    pub status: &'static str,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl CannedResponse {
    pub fn png(body: Vec<u8>) -> Self {
        Self {
            status: "200 OK",
            content_type: "image/png",
            body,
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: "404 Not Found",
            content_type: "text/html",
            body: b"<h1>Not Found</h1>".to_vec(),
        }
    }
}

/// Serve `response` to every connection on a local port.
///
/// Returns a URL template pointing at the server and a counter of accepted
/// connections.
pub async fn serve(response: CannedResponse) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let response = Arc::new(response);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            counter.fetch_add(1, Ordering::SeqCst);
            let response = response.clone();

            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let head = format!(
                    "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    response.status,
                    response.content_type,
                    response.body.len()
                );
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(&response.body).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    let template = format!("http://{}/moon-{{year}}-{{month}}-{{day}}.png", addr);
    (template, hits)
}

/// HTTP client that ignores proxy settings from the environment.
pub fn local_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

/// A fixed test day.
pub fn test_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}
