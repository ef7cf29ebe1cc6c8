//! Owned pixel buffer type used by every imlab operation.

use image::{DynamicImage, GrayImage, RgbImage};

use crate::error::{ImageError, Result};

/// An 8-bit raster with one (grayscale) or three (RGB) interleaved channels.
///
/// Pixels are stored row-major. For three channels each pixel occupies three
/// consecutive bytes in R, G, B order. The channel count is fixed at creation;
/// every transform returns a fresh `RasterImage` instead of editing one in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    channels: u8,
    pixels: Vec<u8>,
}

impl RasterImage {
    /// Create a new image after validating dimensions, layout and buffer size.
    ///
    /// # Errors
    ///
    /// Returns `ImageError::InvalidInput` for zero dimensions, dimensions whose
    /// byte size does not fit in `usize`, or a buffer whose length is not
    /// `width * height * channels`, and
    /// `ImageError::UnsupportedChannelLayout` for channel counts other than 1 or 3.
    pub fn new(width: u32, height: u32, channels: u8, pixels: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ImageError::InvalidInput(format!(
                "dimensions must be non-zero, got {}x{}",
                width, height
            )));
        }
        if channels != 1 && channels != 3 {
            return Err(ImageError::UnsupportedChannelLayout(channels));
        }
        let expected = buffer_len(width, height, channels)?;
        if pixels.len() != expected {
            return Err(ImageError::InvalidInput(format!(
                "pixel buffer size mismatch: expected {} bytes, got {}",
                expected,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            pixels,
        })
    }

    /// Build an image whose layout is already known to be valid, such as the
    /// output of a transform sized from a validated source.
    pub(crate) fn from_parts(width: u32, height: u32, channels: u8, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            buffer_len(width, height, channels).ok(),
            Some(pixels.len()),
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            channels,
            pixels,
        }
    }

    /// Create a single-channel image.
    pub fn gray(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        Self::new(width, height, 1, pixels)
    }

    /// Create a three-channel RGB image.
    pub fn rgb(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        Self::new(width, height, 3, pixels)
    }

    /// Create an image with every sample set to `value`.
    pub fn filled(width: u32, height: u32, channels: u8, value: u8) -> Result<Self> {
        let len = buffer_len(width, height, channels)?;
        Self::new(width, height, channels, vec![value; len])
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of interleaved channels (1 or 3).
    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Raw sample buffer.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Consume the image and return its sample buffer.
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Total number of pixels.
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Size of the sample buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_grayscale(&self) -> bool {
        self.channels == 1
    }

    /// Sample at (`x`, `y`) for `channel`.
    #[inline]
    pub fn sample(&self, x: u32, y: u32, channel: u8) -> u8 {
        let idx = ((y as usize) * (self.width as usize) + x as usize) * self.channels as usize
            + channel as usize;
        self.pixels[idx]
    }

    /// Build from any `image` crate image. Luma sources stay single-channel,
    /// everything else is converted to RGB8.
    pub fn from_dynamic(img: DynamicImage) -> Result<Self> {
        match img {
            DynamicImage::ImageLuma8(gray) => Self::from_gray_image(gray),
            DynamicImage::ImageLuma16(_)
            | DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageLumaA16(_) => {
                Self::from_gray_image(img.into_luma8())
            }
            other => Self::from_rgb_image(other.into_rgb8()),
        }
    }

    /// Build from an `image::RgbImage`.
    pub fn from_rgb_image(img: RgbImage) -> Result<Self> {
        let (width, height) = img.dimensions();
        Self::rgb(width, height, img.into_raw())
    }

    /// Build from an `image::GrayImage`.
    pub fn from_gray_image(img: GrayImage) -> Result<Self> {
        let (width, height) = img.dimensions();
        Self::gray(width, height, img.into_raw())
    }

    /// Convert to an `image::DynamicImage` for encoding.
    ///
    /// Note: This clones the pixel data.
    pub fn to_dynamic(&self) -> Result<DynamicImage> {
        let converted = if self.channels == 1 {
            GrayImage::from_raw(self.width, self.height, self.pixels.clone())
                .map(DynamicImage::ImageLuma8)
        } else {
            RgbImage::from_raw(self.width, self.height, self.pixels.clone())
                .map(DynamicImage::ImageRgb8)
        };
        converted.ok_or_else(|| {
            ImageError::ComputationFailure("pixel buffer does not match dimensions".to_string())
        })
    }
}

/// Byte length of a `width` x `height` buffer with `channels` samples per pixel.
fn buffer_len(width: u32, height: u32, channels: u8) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(channels as usize))
        .ok_or_else(|| {
            ImageError::InvalidInput(format!(
                "image of {}x{}x{} exceeds addressable memory",
                width, height, channels
            ))
        })
}
