//! CPU-side images handed to the renderer.
//!
//! An [`Image`] is a tightly packed RGBA8 buffer, rows top to bottom. Decoding
//! goes through the `image` crate; everything else in the engine only sees the
//! validated buffer.

use std::path::Path;

use thiserror::Error;

/// Bytes per RGBA8 texel.
pub const BYTES_PER_PIXEL: u32 = 4;

/// Errors raised while building or decoding an [`Image`].
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image has zero size ({width}x{height})")]
    ZeroSized { width: u32, height: u32 },

    #[error("pixel buffer holds {actual} bytes, {width}x{height} RGBA8 needs {expected}")]
    SizeMismatch { width: u32, height: u32, expected: usize, actual: usize },

    #[error("failed to decode image: {0}")]
    Decode(#[from] ::image::ImageError),
}

/// Immutable RGBA8 pixel buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Image {
    /// Wraps an RGBA8 buffer, checking its length against the dimensions.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::ZeroSized { width, height });
        }

        let expected = width as usize * height as usize * BYTES_PER_PIXEL as usize;
        if pixels.len() != expected {
            return Err(ImageError::SizeMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self { width, height, pixels })
    }

    /// Creates an image filled with a single straight-alpha RGBA8 color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, ImageError> {
        let count = width as usize * height as usize;
        let pixels = rgba.iter().copied().cycle().take(count * rgba.len()).collect();
        Self::from_rgba8(width, height, pixels)
    }

    /// Creates a transparent black image.
    pub fn blank(width: u32, height: u32) -> Result<Self, ImageError> {
        Self::solid(width, height, [0, 0, 0, 0])
    }

    /// Decodes an encoded image (PNG, JPEG, BMP) from memory.
    pub fn decode(bytes: &[u8]) -> Result<Self, ImageError> {
        let decoded = ::image::load_from_memory(bytes)?;
        Ok(Self::from(decoded.to_rgba8()))
    }

    /// Reads and decodes an image file. The format is guessed from the extension.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let decoded = ::image::open(path)?;
        Ok(Self::from(decoded.to_rgba8()))
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Raw RGBA8 bytes, row-major, no row padding.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Unpadded row length in bytes.
    #[inline]
    pub fn bytes_per_row(&self) -> u32 {
        self.width * BYTES_PER_PIXEL
    }

    /// Returns the texel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL as usize;
        let px = &self.pixels[i..i + BYTES_PER_PIXEL as usize];
        Some([px[0], px[1], px[2], px[3]])
    }
}

impl From<::image::RgbaImage> for Image {
    fn from(rgba: ::image::RgbaImage) -> Self {
        let (width, height) = rgba.dimensions();
        Self { width, height, pixels: rgba.into_raw() }
    }
}

// Pixel dumps are useless in logs; print the shape only.
impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}
