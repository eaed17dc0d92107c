//! Moon image service orchestrating the daily icon pipeline.
//!
//! The MoonImageService is the single decision point for whether network or
//! pixel work is needed for a day. It orchestrates:
//! - Cache short-circuit on an existing rendered artifact
//! - Resuming from the most advanced intermediate
//! - Fetch, disk location, cropping and rendering
//! - Intermediate cleanup
//! - Fallback icon selection on any failure
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       MoonImageService                           │
//! │  ┌────────────────────────────────────────────────────────────┐  │
//! │  │                    render_artifact()                       │  │
//! │  │  1. Probe store         4. Locate disk, crop, mirror       │  │
//! │  │  2. Join or lead run    5. Render both display modes       │  │
//! │  │  3. Fetch raw if needed 6. Delete intermediates            │  │
//! │  └────────────────────────────────────────────────────────────┘  │
//! │         │                 │                   │                  │
//! │         ▼                 ▼                   ▼                  │
//! │  ┌─────────────┐  ┌────────────────┐  ┌──────────────────────┐   │
//! │  │ArtifactStore│  │MoonImageSource │  │ Locator/Cropper/     │   │
//! │  └─────────────┘  └────────────────┘  │ Renderer             │   │
//! │                                       └──────────────────────┘   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::cache::{ArtifactState, ArtifactStore, CacheKey, Stage};
use crate::error::PipelineError;
use crate::fallback::fallback_icon;
use crate::fetch::MoonImageSource;
use crate::raster::{AdaptiveCropper, DiskLocator, DiskRenderer, DisplayMode, RasterImage};

use super::result::{PipelineResult, RenderResponse};

// =============================================================================
// MoonImageService
// =============================================================================

/// Service producing the daily moon icon.
///
/// Concurrent calls for the same day share one fetch-and-process run: the
/// first caller leads, later callers wait for and receive its outcome.
///
/// # Example
///
/// ```ignore
/// let source = HttpImageSource::new(UrlTemplate::default(), 30)?;
/// let service = MoonImageService::new(source, ArtifactStore::in_temp_dir());
///
/// match service.resolve(today, "Full Moon", DisplayMode::Normal).await {
///     PipelineResult::Rendered(path) => println!("icon at {}", path.display()),
///     PipelineResult::Fallback(id) => println!("themed icon {}", id),
/// }
/// ```
pub struct MoonImageService<S: MoonImageSource> {
    /// Source of raw moon images
    source: S,

    /// Day-keyed artifact files
    store: ArtifactStore,

    locator: DiskLocator,
    cropper: AdaptiveCropper,
    renderer: DiskRenderer,

    /// In-flight runs for singleflight
    in_flight: Mutex<HashMap<CacheKey, Arc<InFlightState>>>,
}

/// State for an in-flight pipeline run.
struct InFlightState {
    /// Notification for waiters
    notify: Notify,
    /// Outcome of the run
    outcome: Mutex<Outcome>,
}

/// Progress of an in-flight run as seen by its waiters.
enum Outcome {
    Pending,
    Done(Result<(), PipelineError>),
    /// The leader was dropped before finishing
    Abandoned,
}

impl InFlightState {
    fn new() -> Self {
        Self {
            notify: Notify::new(),
            outcome: Mutex::new(Outcome::Pending),
        }
    }

    /// Wait for the leader. Returns `None` if it was abandoned.
    async fn wait(&self) -> Option<Result<(), PipelineError>> {
        loop {
            // Register interest before checking so a notification between
            // the check and the await is not lost
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let outcome = lock(&self.outcome);
                match &*outcome {
                    Outcome::Pending => {}
                    Outcome::Done(result) => return Some(result.clone()),
                    Outcome::Abandoned => return None,
                }
            }

            notified.await;
        }
    }
}

/// Publishes the leader's outcome and clears the in-flight entry, also when
/// the leader's future is dropped mid-run.
struct LeaderGuard<'a> {
    in_flight: &'a Mutex<HashMap<CacheKey, Arc<InFlightState>>>,
    key: CacheKey,
    state: Arc<InFlightState>,
    finished: bool,
}

impl LeaderGuard<'_> {
    fn finish(mut self, result: Result<(), PipelineError>) {
        self.publish(Outcome::Done(result));
        self.finished = true;
    }

    fn publish(&self, outcome: Outcome) {
        *lock(&self.state.outcome) = outcome;
        lock(self.in_flight).remove(&self.key);
        self.state.notify.notify_waiters();
    }
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            warn!("Pipeline run for {} was cancelled", self.key.day());
            self.publish(Outcome::Abandoned);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl<S: MoonImageSource> MoonImageService<S> {
    /// Create a service with the default locator, cropper and renderer.
    pub fn new(source: S, store: ArtifactStore) -> Self {
        Self::with_components(
            source,
            store,
            DiskLocator::new(),
            AdaptiveCropper::new(),
            DiskRenderer::new(),
        )
    }

    /// Create a service with custom processing stages.
    pub fn with_components(
        source: S,
        store: ArtifactStore,
        locator: DiskLocator,
        cropper: AdaptiveCropper,
        renderer: DiskRenderer,
    ) -> Self {
        Self {
            source,
            store,
            locator,
            cropper,
            renderer,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Resolve the icon for `day`, falling back to a bundled icon on failure.
    ///
    /// Never fails: pipeline errors are logged and mapped to the icon for
    /// `phase_name`.
    pub async fn resolve(&self, day: NaiveDate, phase_name: &str, mode: DisplayMode) -> PipelineResult {
        match self.render_artifact(day, mode).await {
            Ok(response) => PipelineResult::Rendered(response.path),
            Err(e) => {
                let icon = fallback_icon(phase_name);
                warn!("Moon image pipeline failed for {}: {}; using {}", day, e, icon);
                PipelineResult::Fallback(icon)
            }
        }
    }

    /// Produce the rendered artifact for `day` in display `mode`.
    ///
    /// Returns immediately without network or pixel work if the artifact
    /// already exists.
    pub async fn render_artifact(
        &self,
        day: NaiveDate,
        mode: DisplayMode,
    ) -> Result<RenderResponse, PipelineError> {
        let key = CacheKey::new(day);
        let rendered = Stage::Rendered(mode);

        // Fast path: rendered artifact already on disk
        if self.store.exists(&key, rendered) {
            debug!("Cache hit for {} ({})", key.stamp(), mode.as_str());
            return Ok(RenderResponse {
                path: self.store.path(&key, rendered),
                cache_hit: true,
            });
        }

        self.run_singleflight(key, mode).await?;

        Ok(RenderResponse {
            path: self.store.path(&key, rendered),
            cache_hit: false,
        })
    }

    /// Run the pipeline for `key`, or wait for the run already in flight.
    ///
    /// If the leading run is cancelled, one of its waiters takes over.
    async fn run_singleflight(&self, key: CacheKey, mode: DisplayMode) -> Result<(), PipelineError> {
        loop {
            let (state, leader) = {
                let mut in_flight = lock(&self.in_flight);
                match in_flight.get(&key) {
                    // Another task is processing this day
                    Some(state) => (state.clone(), false),
                    // We're the leader for this day
                    None => {
                        let state = Arc::new(InFlightState::new());
                        in_flight.insert(key, state.clone());
                        (state, true)
                    }
                }
            };

            if leader {
                let guard = LeaderGuard {
                    in_flight: &self.in_flight,
                    key,
                    state,
                    finished: false,
                };
                let result = self.produce(&key, mode).await;
                guard.finish(result.clone());
                return result;
            }

            if let Some(result) = state.wait().await {
                return result;
            }
            debug!("Leader for {} went away, retrying", key.stamp());
        }
    }

    /// Advance the day's artifacts to the rendered stage.
    async fn produce(&self, key: &CacheKey, mode: DisplayMode) -> Result<(), PipelineError> {
        let state = self.store.probe(key, mode);
        debug!("Producing {} from {:?}", key.stamp(), state);

        let (cropped, diameter) = match state {
            // A run that finished after our fast-path check left nothing to do
            ArtifactState::HasRendered => return Ok(()),
            ArtifactState::HasCropped => {
                let cropped = self.decode_intermediate(key, Stage::Cropped)?;
                let diameter = self.cropped_diameter(&cropped);
                (cropped, diameter)
            }
            ArtifactState::HasRaw => {
                let raw = self.decode_intermediate(key, Stage::Raw)?;
                self.crop_and_persist(key, &raw)?
            }
            ArtifactState::NoArtifact => {
                let bytes = self.source.fetch(key.day()).await?;
                info!(
                    "Fetched moon image for {} from {} ({} bytes)",
                    key.day(),
                    self.source.identifier(),
                    bytes.len()
                );
                self.store.write(key, Stage::Raw, &bytes)?;
                let raw = self.decode_intermediate(key, Stage::Raw)?;
                self.crop_and_persist(key, &raw)?
            }
        };

        let radius = diameter as f64 / 2.0;
        for mode in DisplayMode::ALL {
            let stage = Stage::Rendered(mode);
            if self.store.exists(key, stage) {
                continue;
            }
            let png = self.renderer.render(&cropped, radius, mode).encode_png()?;
            self.store.write(key, stage, &png)?;
        }

        self.store.remove_intermediates(key);
        info!(
            "Rendered moon icon for {} ({}x{}, radius {:.1})",
            key.day(),
            cropped.width(),
            cropped.height(),
            radius
        );
        Ok(())
    }

    /// Disk diameter of a persisted crop.
    ///
    /// The crop window is the diameter plus margins, so this holds for
    /// fallback bounds too. A disk detected wider than that means the window
    /// was shrunk to fit the source.
    fn cropped_diameter(&self, cropped: &RasterImage) -> u32 {
        let from_window = self.cropper.disk_diameter(cropped.width().min(cropped.height()));
        let detected = self.locator.detect(cropped).map_or(0, |b| b.diameter());
        from_window.max(detected)
    }

    /// Locate and crop the disk, persisting the crop and the mirror.
    ///
    /// Returns the cropped image and the disk diameter.
    fn crop_and_persist(
        &self,
        key: &CacheKey,
        raw: &RasterImage,
    ) -> Result<(RasterImage, u32), PipelineError> {
        let bounds = self.locator.locate(raw);
        let (region, cropped) = self.cropper.crop(raw, &bounds)?;
        debug!(
            "Disk at ({}, {}) {}x{}, crop ({}, {}) size {}",
            bounds.x, bounds.y, bounds.width, bounds.height, region.x, region.y, region.size
        );

        let png = cropped.encode_png()?;
        self.store.write(key, Stage::Cropped, &png)?;
        if let Err(e) = self.store.write_mirror(&png) {
            warn!("Failed to update mirror image: {}", e);
        }

        Ok((cropped, bounds.diameter()))
    }

    /// Read and decode an intermediate, deleting it if it is corrupt.
    fn decode_intermediate(&self, key: &CacheKey, stage: Stage) -> Result<RasterImage, PipelineError> {
        let bytes = self.store.read(key, stage)?;
        match RasterImage::decode(&bytes) {
            Ok(image) => Ok(image),
            Err(e) => {
                warn!(
                    "Discarding undecodable {} artifact for {}: {}",
                    stage.as_str(),
                    key.day(),
                    e
                );
                self.store.remove(key, stage);
                Err(e.into())
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
