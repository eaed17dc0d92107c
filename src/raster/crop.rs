//! Adaptive square crop around the located disk.

use crate::error::RasterError;

use super::buffer::RasterImage;
use super::locate::DiskBounds;

/// Margin in pixels kept around the disk on every side.
pub const CROP_MARGIN: u32 = 3;

/// Square crop window inside a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub size: u32,
}

/// Derives and applies the square crop for a disk.
///
/// The window is `diameter + 2 * margin` pixels wide, centered on the disk.
/// Near an edge the window is shifted back inside the image; it only shrinks
/// when the image itself is smaller than the window.
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveCropper {
    margin: u32,
}

impl AdaptiveCropper {
    /// Create a cropper with [`CROP_MARGIN`].
    pub fn new() -> Self {
        Self {
            margin: CROP_MARGIN,
        }
    }

    /// Create a cropper with a custom margin.
    pub fn with_margin(margin: u32) -> Self {
        Self { margin }
    }

    pub fn margin(&self) -> u32 {
        self.margin
    }

    /// Compute the crop window for `bounds` inside an image of the given size.
    pub fn region(&self, image_width: u32, image_height: u32, bounds: &DiskBounds) -> CropRegion {
        let wanted = bounds.diameter().saturating_add(self.margin.saturating_mul(2));
        let size = wanted.min(image_width.min(image_height)).max(1);
        let (cx, cy) = bounds.center();

        CropRegion {
            x: place(cx, size, image_width),
            y: place(cy, size, image_height),
            size,
        }
    }

    /// Disk diameter implied by a crop window of side `size`.
    ///
    /// Inverse of [`region`](Self::region) for windows that were not shrunk
    /// to fit the image.
    pub fn disk_diameter(&self, size: u32) -> u32 {
        size.saturating_sub(self.margin.saturating_mul(2)).max(1)
    }

    /// Crop `image` around `bounds`.
    pub fn crop(
        &self,
        image: &RasterImage,
        bounds: &DiskBounds,
    ) -> Result<(CropRegion, RasterImage), RasterError> {
        let region = self.region(image.width(), image.height(), bounds);
        let cropped = image.sub_image(region.x, region.y, region.size, region.size)?;
        Ok((region, cropped))
    }
}

impl Default for AdaptiveCropper {
    fn default() -> Self {
        Self::new()
    }
}

/// Start of a `size`-long window centered on `center`, shifted into
/// `[0, extent - size]`.
fn place(center: f64, size: u32, extent: u32) -> u32 {
    let max_start = extent.saturating_sub(size) as f64;
    let start = (center - size as f64 / 2.0).round();
    start.clamp(0.0, max_start) as u32
}
