//! WASM-compatible wrapper types for image data.
//!
//! These types wrap the core imlab types and convert between Rust and
//! JavaScript data representations.

use imlab_core::{ColorModel, RasterImage};
use wasm_bindgen::prelude::*;

/// A raster image wrapper for JavaScript.
///
/// Pixels are 8-bit, row-major, either 1 channel (gray) or 3 interleaved
/// channels (RGB). Calling `pixels()` copies the buffer into a `Uint8Array`.
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct JsRasterImage {
    inner: RasterImage,
}

#[wasm_bindgen]
impl JsRasterImage {
    /// Create an image from dimensions, channel count and pixel data.
    ///
    /// # Errors
    /// Fails if a dimension is zero, `channels` is not 1 or 3, or the buffer
    /// length is not `width * height * channels`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        width: u32,
        height: u32,
        channels: u8,
        pixels: Vec<u8>,
    ) -> Result<JsRasterImage, JsValue> {
        RasterImage::new(width, height, channels, pixels)
            .map(Self::from_raster)
            .map_err(to_js_error)
    }

    /// Image width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    /// Image height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    /// 1 for grayscale, 3 for RGB
    #[wasm_bindgen(getter)]
    pub fn channels(&self) -> u8 {
        self.inner.channels()
    }

    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.byte_size()
    }

    /// Returns the pixel data as a Uint8Array (copied).
    pub fn pixels(&self) -> Vec<u8> {
        self.inner.pixels().to_vec()
    }

    /// RGBA pixels ready for `ImageData`; gray is replicated to all three
    /// color channels.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.inner.pixel_count() * 4);
        if self.inner.is_grayscale() {
            for &v in self.inner.pixels() {
                out.extend_from_slice(&[v, v, v, 255]);
            }
        } else {
            for px in self.inner.pixels().chunks_exact(3) {
                out.extend_from_slice(&[px[0], px[1], px[2], 255]);
            }
        }
        out
    }
}

impl JsRasterImage {
    pub(crate) fn from_raster(inner: RasterImage) -> Self {
        Self { inner }
    }

    pub(crate) fn raster(&self) -> &RasterImage {
        &self.inner
    }
}

/// Parse a color model name ("RGB", "HSV", "CMYK", "GRAY").
pub(crate) fn parse_model(model: &str) -> Result<ColorModel, JsValue> {
    model.parse::<ColorModel>().map_err(to_js_error)
}

/// Map any displayable error to a JS string value.
pub(crate) fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}
