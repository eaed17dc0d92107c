//! Strided in-memory raster image.
//!
//! Every stage of the pipeline works on a [`RasterImage`]: a row-major,
//! interleaved 8-bit RGB or RGBA buffer whose rows are padded to a 4-byte
//! boundary. Pixels are only ever addressed through
//! `rowstride * y + channels * x`, so padded rows are never read as pixels.
//!
//! Decoding and encoding go through the `image` crate; the rest of the
//! pipeline only sees the strided buffer.

use std::io::Cursor;

use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageReader};

use crate::error::RasterError;

/// Bits per color sample. Only 8-bit images are produced.
pub const BITS_PER_SAMPLE: u8 = 8;

/// Row alignment in bytes.
const ROW_ALIGNMENT: usize = 4;

/// Colorspace tag carried alongside the pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colorspace {
    Rgb,
}

// =============================================================================
// RasterImage
// =============================================================================

/// An 8-bit RGB or RGBA image with an explicit row stride.
///
/// Invariant: `pixels.len() == rowstride * height` and
/// `rowstride >= width * channels`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    rowstride: usize,
    channels: u8,
    has_alpha: bool,
    bits_per_sample: u8,
    colorspace: Colorspace,
    pixels: Vec<u8>,
}

impl RasterImage {
    /// Create a zero-filled image (black, and fully transparent with alpha).
    pub fn new(width: u32, height: u32, has_alpha: bool) -> Self {
        let channels = channel_count(has_alpha);
        let rowstride = aligned_rowstride(width, channels);
        Self {
            width,
            height,
            rowstride,
            channels,
            has_alpha,
            bits_per_sample: BITS_PER_SAMPLE,
            colorspace: Colorspace::Rgb,
            pixels: vec![0; rowstride * height as usize],
        }
    }

    /// Create an image by evaluating `f` for every pixel.
    ///
    /// `f` returns RGBA; the alpha component is dropped when `has_alpha` is
    /// false.
    pub fn from_fn<F>(width: u32, height: u32, has_alpha: bool, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> [u8; 4],
    {
        let mut img = Self::new(width, height, has_alpha);
        let channels = img.channels as usize;
        for y in 0..height {
            for x in 0..width {
                let rgba = f(x, y);
                img.pixel_mut(x, y).copy_from_slice(&rgba[..channels]);
            }
        }
        img
    }

    /// Wrap an existing pixel buffer.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::InvalidLayout`] if the dimensions are zero, the
    /// stride is too small for a row, or the buffer length is not
    /// `rowstride * height`.
    pub fn from_raw(
        width: u32,
        height: u32,
        rowstride: usize,
        has_alpha: bool,
        pixels: Vec<u8>,
    ) -> Result<Self, RasterError> {
        let channels = channel_count(has_alpha);

        if width == 0 || height == 0 {
            return Err(RasterError::InvalidLayout {
                message: format!("empty image {}x{}", width, height),
            });
        }
        if rowstride < width as usize * channels as usize {
            return Err(RasterError::InvalidLayout {
                message: format!(
                    "rowstride {} too small for {} pixels of {} channels",
                    rowstride, width, channels
                ),
            });
        }
        if pixels.len() != rowstride * height as usize {
            return Err(RasterError::InvalidLayout {
                message: format!(
                    "buffer holds {} bytes, expected {}",
                    pixels.len(),
                    rowstride * height as usize
                ),
            });
        }

        Ok(Self {
            width,
            height,
            rowstride,
            channels,
            has_alpha,
            bits_per_sample: BITS_PER_SAMPLE,
            colorspace: Colorspace::Rgb,
            pixels,
        })
    }

    /// Decode PNG or JPEG bytes.
    ///
    /// Images with an alpha channel become RGBA, everything else RGB.
    pub fn decode(bytes: &[u8]) -> Result<Self, RasterError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| RasterError::Decode {
                message: e.to_string(),
            })?;

        let img = reader.decode().map_err(|e| RasterError::Decode {
            message: e.to_string(),
        })?;

        if img.width() == 0 || img.height() == 0 {
            return Err(RasterError::Decode {
                message: "image has no pixels".to_string(),
            });
        }

        Ok(Self::from_dynamic(&img))
    }

    /// Convert a decoded `image` buffer into a strided raster.
    pub fn from_dynamic(img: &DynamicImage) -> Self {
        let has_alpha = img.color().has_alpha();
        let (width, height) = (img.width(), img.height());
        let tight = if has_alpha {
            img.to_rgba8().into_raw()
        } else {
            img.to_rgb8().into_raw()
        };

        let mut raster = Self::new(width, height, has_alpha);
        let row_len = raster.row_len();
        for (y, row) in tight.chunks_exact(row_len).enumerate() {
            let start = y * raster.rowstride;
            raster.pixels[start..start + row_len].copy_from_slice(row);
        }
        raster
    }

    /// Encode as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, RasterError> {
        let color = if self.has_alpha {
            ExtendedColorType::Rgba8
        } else {
            ExtendedColorType::Rgb8
        };

        let mut output = Vec::new();
        PngEncoder::new(&mut output)
            .write_image(&self.packed(), self.width, self.height, color)
            .map_err(|e| RasterError::Encode {
                message: e.to_string(),
            })?;

        Ok(output)
    }

    /// Copy out the rectangle at `(x, y)` of size `width x height`.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::InvalidLayout`] if the rectangle is empty or
    /// does not fit inside the image.
    pub fn sub_image(&self, x: u32, y: u32, width: u32, height: u32) -> Result<Self, RasterError> {
        let fits = width > 0
            && height > 0
            && x.checked_add(width).is_some_and(|r| r <= self.width)
            && y.checked_add(height).is_some_and(|b| b <= self.height);
        if !fits {
            return Err(RasterError::InvalidLayout {
                message: format!(
                    "sub-image {}x{}+{}+{} outside {}x{}",
                    width, height, x, y, self.width, self.height
                ),
            });
        }

        let mut out = Self::new(width, height, self.has_alpha);
        let row_len = out.row_len();
        for row in 0..height {
            let src = self.offset(x, y + row);
            let dst = out.offset(0, row);
            out.pixels[dst..dst + row_len].copy_from_slice(&self.pixels[src..src + row_len]);
        }
        Ok(out)
    }

    /// Return an RGBA copy, adding opaque alpha when the image has none.
    pub fn with_alpha(&self) -> Self {
        if self.has_alpha {
            return self.clone();
        }
        Self::from_fn(self.width, self.height, true, |x, y| {
            let p = self.pixel(x, y);
            [p[0], p[1], p[2], u8::MAX]
        })
    }

    // -------------------------------------------------------------------------
    // Pixel access
    // -------------------------------------------------------------------------

    /// Byte offset of pixel `(x, y)`.
    #[inline]
    pub fn offset(&self, x: u32, y: u32) -> usize {
        self.rowstride * y as usize + self.channels as usize * x as usize
    }

    /// Channels of pixel `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the pixel is outside the image.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        debug_assert!(x < self.width && y < self.height);
        let start = self.offset(x, y);
        &self.pixels[start..start + self.channels as usize]
    }

    /// Mutable channels of pixel `(x, y)`.
    #[inline]
    pub fn pixel_mut(&mut self, x: u32, y: u32) -> &mut [u8] {
        debug_assert!(x < self.width && y < self.height);
        let start = self.offset(x, y);
        let channels = self.channels as usize;
        &mut self.pixels[start..start + channels]
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rowstride(&self) -> usize {
        self.rowstride
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    pub fn bits_per_sample(&self) -> u8 {
        self.bits_per_sample
    }

    pub fn colorspace(&self) -> Colorspace {
        self.colorspace
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Bytes of actual pixel data in one row.
    fn row_len(&self) -> usize {
        self.width as usize * self.channels as usize
    }

    /// Pixel data with row padding removed.
    fn packed(&self) -> Vec<u8> {
        let row_len = self.row_len();
        let mut out = Vec::with_capacity(row_len * self.height as usize);
        for y in 0..self.height {
            let start = self.offset(0, y);
            out.extend_from_slice(&self.pixels[start..start + row_len]);
        }
        out
    }
}

#[inline]
fn channel_count(has_alpha: bool) -> u8 {
    if has_alpha {
        4
    } else {
        3
    }
}

#[inline]
fn aligned_rowstride(width: u32, channels: u8) -> usize {
    let row = width as usize * channels as usize;
    row.div_ceil(ROW_ALIGNMENT) * ROW_ALIGNMENT
}

// =============================================================================
// Tests
// =============================================================================
