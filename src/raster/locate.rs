//! Disk locator.
//!
//! Finds the bounding box of the moon disk in a source photograph with a
//! single scan over every pixel. A pixel belongs to the disk when:
//!
//! - the image has alpha and the pixel's alpha is above [`ALPHA_THRESHOLD`], or
//! - the image has no alpha and the mean of R, G and B is below
//!   [`BRIGHTNESS_THRESHOLD`].
//!
//! Sources are rendered on a near-uniform background, so there is no noise
//! filtering: an isolated stray pixel widens the bounds. When nothing (or a
//! single row/column) qualifies, a centered fallback rectangle is used
//! instead.

use tracing::debug;

use super::buffer::RasterImage;

/// Alpha above which a pixel of a transparent source belongs to the disk.
pub const ALPHA_THRESHOLD: u8 = 1;

/// Mean RGB below which a pixel of an opaque source belongs to the disk.
pub const BRIGHTNESS_THRESHOLD: u32 = 240;

/// Fraction of the smaller image dimension used for the fallback disk.
pub const FALLBACK_DISK_FRACTION: f64 = 0.8;

// =============================================================================
// DiskBounds
// =============================================================================

/// Integer rectangle bounding the disk inside its source image.
///
/// Always non-empty and fully inside the image it was computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskBounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl DiskBounds {
    /// Disk diameter: the longer side of the rectangle.
    pub fn diameter(&self) -> u32 {
        self.width.max(self.height)
    }

    /// Center of the rectangle, in pixels.
    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    /// Centered square covering `fraction` of the smaller image dimension.
    ///
    /// The side is at least one pixel.
    pub fn fallback(image_width: u32, image_height: u32, fraction: f64) -> Self {
        let min_dim = image_width.min(image_height);
        let side = ((min_dim as f64 * fraction).floor() as u32).clamp(1, min_dim.max(1));
        Self {
            x: (image_width.saturating_sub(side)) / 2,
            y: (image_height.saturating_sub(side)) / 2,
            width: side,
            height: side,
        }
    }
}

// =============================================================================
// DiskLocator
// =============================================================================

/// Locates the disk in a [`RasterImage`].
#[derive(Debug, Clone, Copy)]
pub struct DiskLocator {
    fallback_fraction: f64,
}

impl DiskLocator {
    /// Create a locator using [`FALLBACK_DISK_FRACTION`].
    pub fn new() -> Self {
        Self {
            fallback_fraction: FALLBACK_DISK_FRACTION,
        }
    }

    /// Create a locator with a custom fallback fraction (clamped to `(0, 1]`).
    pub fn with_fallback_fraction(fraction: f64) -> Self {
        let fraction = if fraction.is_finite() && fraction > 0.0 {
            fraction.min(1.0)
        } else {
            FALLBACK_DISK_FRACTION
        };
        Self {
            fallback_fraction: fraction,
        }
    }

    /// Fraction used for the fallback rectangle.
    pub fn fallback_fraction(&self) -> f64 {
        self.fallback_fraction
    }

    /// Bound the disk, or return the fallback rectangle.
    pub fn locate(&self, image: &RasterImage) -> DiskBounds {
        match self.detect(image) {
            Some(bounds) => bounds,
            None => {
                let bounds =
                    DiskBounds::fallback(image.width(), image.height(), self.fallback_fraction);
                debug!(
                    "No disk found in {}x{} image, using fallback bounds {:?}",
                    image.width(),
                    image.height(),
                    bounds
                );
                bounds
            }
        }
    }

    /// Bound the disk, returning `None` when detection fails.
    pub fn detect(&self, image: &RasterImage) -> Option<DiskBounds> {
        let mut min_x = u32::MAX;
        let mut min_y = u32::MAX;
        let mut max_x = 0u32;
        let mut max_y = 0u32;

        let has_alpha = image.has_alpha();
        for y in 0..image.height() {
            for x in 0..image.width() {
                if is_disk_pixel(image.pixel(x, y), has_alpha) {
                    min_x = min_x.min(x);
                    min_y = min_y.min(y);
                    max_x = max_x.max(x);
                    max_y = max_y.max(y);
                }
            }
        }

        if min_x >= max_x || min_y >= max_y {
            return None;
        }

        Some(DiskBounds {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        })
    }
}

impl Default for DiskLocator {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn is_disk_pixel(pixel: &[u8], has_alpha: bool) -> bool {
    if has_alpha {
        pixel[3] > ALPHA_THRESHOLD
    } else {
        let sum = pixel[0] as u32 + pixel[1] as u32 + pixel[2] as u32;
        sum < BRIGHTNESS_THRESHOLD * 3
    }
}

// =============================================================================
// Tests
// =============================================================================
