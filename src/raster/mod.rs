//! Raster processing for the daily moon icon.
//!
//! ```text
//! raw PNG ──decode──▶ RasterImage
//!                        │
//!                        ▼
//!                   DiskLocator ──▶ DiskBounds (detected or fallback)
//!                        │
//!                        ▼
//!                  AdaptiveCropper ──▶ square crop, disk + margin
//!                        │
//!                        ▼
//!                   DiskRenderer ──▶ grayscale + ring ──encode──▶ PNG
//! ```
//!
//! - [`RasterImage`]: strided 8-bit RGB/RGBA buffer, PNG/JPEG decode and PNG encode
//! - [`DiskLocator`]: one-pass bounding box of the disk
//! - [`AdaptiveCropper`]: square crop centered on the disk, kept inside the source
//! - [`DiskRenderer`]: luminance conversion and translucent ring overlay

mod buffer;
mod crop;
mod locate;
mod render;

pub use buffer::{Colorspace, RasterImage, BITS_PER_SAMPLE};
pub use crop::{AdaptiveCropper, CropRegion, CROP_MARGIN};
pub use locate::{
    DiskBounds, DiskLocator, ALPHA_THRESHOLD, BRIGHTNESS_THRESHOLD, FALLBACK_DISK_FRACTION,
};
pub use render::{
    in_ring, luminance, DiskRenderer, DisplayMode, RING_ALPHA, RING_INNER_OFFSET,
    RING_OUTER_OFFSET,
};
