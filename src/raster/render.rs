//! Grayscale conversion and ring overlay.
//!
//! The final artifact is produced in one pass over the cropped image: every
//! pixel is replaced by its luminance, and pixels on a thin annulus at the
//! disk radius are overwritten with translucent black.

use super::buffer::RasterImage;

/// Alpha of ring pixels.
pub const RING_ALPHA: u8 = 128;

/// Ring extends this far inside the disk radius.
pub const RING_INNER_OFFSET: f64 = 1.0;

/// Ring extends this far outside the disk radius.
pub const RING_OUTER_OFFSET: f64 = 2.0;

/// Variant of the rendered artifact.
///
/// `Inverted` is meant for light panel themes: luminance is flipped so the
/// lit side of the moon reads dark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DisplayMode {
    #[default]
    Normal,
    Inverted,
}

impl DisplayMode {
    /// All variants, in the order they are rendered.
    pub const ALL: [DisplayMode; 2] = [DisplayMode::Normal, DisplayMode::Inverted];

    pub fn from_inverted(inverted: bool) -> Self {
        if inverted {
            DisplayMode::Inverted
        } else {
            DisplayMode::Normal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Normal => "normal",
            DisplayMode::Inverted => "inverted",
        }
    }
}

/// ITU-R BT.601 luma of an RGB triple, rounded.
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let l = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
    l.round().clamp(0.0, 255.0) as u8
}

// =============================================================================
// DiskRenderer
// =============================================================================

/// Renders the desaturated, ring-annotated disk icon.
#[derive(Debug, Clone, Copy)]
pub struct DiskRenderer {
    ring_alpha: u8,
}

impl DiskRenderer {
    pub fn new() -> Self {
        Self {
            ring_alpha: RING_ALPHA,
        }
    }

    /// Create a renderer with a custom ring alpha.
    pub fn with_ring_alpha(ring_alpha: u8) -> Self {
        Self { ring_alpha }
    }

    /// Render `image` with a ring of the given radius.
    ///
    /// The result has the same dimensions as the input and always carries an
    /// alpha channel. Non-ring pixels keep their alpha.
    pub fn render(&self, image: &RasterImage, radius: f64, mode: DisplayMode) -> RasterImage {
        let mut out = image.with_alpha();
        let (width, height) = (out.width(), out.height());

        for y in 0..height {
            for x in 0..width {
                let ring = in_ring(x, y, width, height, radius);
                let px = out.pixel_mut(x, y);
                if ring {
                    px[..3].fill(0);
                    px[3] = self.ring_alpha;
                } else {
                    let l = shade(luminance(px[0], px[1], px[2]), mode);
                    px[..3].fill(l);
                }
            }
        }

        out
    }

    /// Grayscale conversion alone, without the ring.
    pub fn grayscale(&self, image: &RasterImage, mode: DisplayMode) -> RasterImage {
        let mut out = image.clone();
        for y in 0..out.height() {
            for x in 0..out.width() {
                let px = out.pixel_mut(x, y);
                let l = shade(luminance(px[0], px[1], px[2]), mode);
                px[..3].fill(l);
            }
        }
        out
    }
}

impl Default for DiskRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether pixel `(x, y)` lies on the ring around the image center.
///
/// Distances are measured from pixel centers.
#[inline]
pub fn in_ring(x: u32, y: u32, width: u32, height: u32, radius: f64) -> bool {
    let dx = x as f64 + 0.5 - width as f64 / 2.0;
    let dy = y as f64 + 0.5 - height as f64 / 2.0;
    let distance = (dx * dx + dy * dy).sqrt();
    distance >= radius - RING_INNER_OFFSET && distance <= radius + RING_OUTER_OFFSET
}

#[inline]
fn shade(l: u8, mode: DisplayMode) -> u8 {
    match mode {
        DisplayMode::Normal => l,
        DisplayMode::Inverted => u8::MAX - l,
    }
}

// =============================================================================
// Tests
// =============================================================================
