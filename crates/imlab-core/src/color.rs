//! Color-model tags and the pure per-pixel conversions behind them.
//!
//! The tag travels next to an image through every call; it is never stored
//! inside [`RasterImage`]. HSV uses the 8-bit convention where hue occupies
//! 0..180 (degrees halved) and saturation/value occupy 0..=255. The CMYK model
//! is the usual ink approximation: three channels, `ink = 255 - light`, no
//! separate black plate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ImageError, Result};
use crate::luminance::to_luma;
use crate::raster::RasterImage;

/// Number of hue bins in the 8-bit HSV encoding.
pub const HUE_RANGE: usize = 180;

/// How the channels of an image should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColorModel {
    #[default]
    Rgb,
    Hsv,
    Cmyk,
    Gray,
}

impl ColorModel {
    /// Canonical upper-case name ("RGB", "HSV", "CMYK", "GRAY").
    pub fn as_str(self) -> &'static str {
        match self {
            ColorModel::Rgb => "RGB",
            ColorModel::Hsv => "HSV",
            ColorModel::Cmyk => "CMYK",
            ColorModel::Gray => "GRAY",
        }
    }
}

impl fmt::Display for ColorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorModel {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RGB" => Ok(ColorModel::Rgb),
            "HSV" => Ok(ColorModel::Hsv),
            "CMYK" | "CMY" => Ok(ColorModel::Cmyk),
            "GRAY" | "GREY" => Ok(ColorModel::Gray),
            other => Err(ImageError::InvalidInput(format!(
                "unknown color model: {}",
                other
            ))),
        }
    }
}

/// Convert an RGB pixel to 8-bit HSV (hue 0..180).
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let s = if max > 0.0 { delta / max * 255.0 } else { 0.0 };

    let mut h = if delta == 0.0 {
        0.0
    } else if max == rf {
        60.0 * (gf - bf) / delta
    } else if max == gf {
        120.0 + 60.0 * (bf - rf) / delta
    } else {
        240.0 + 60.0 * (rf - gf) / delta
    };
    if h < 0.0 {
        h += 360.0;
    }

    // Halve degrees; 359.x rounds to 180 which wraps back to red.
    let h = ((h / 2.0).round() as usize % HUE_RANGE) as u8;
    (h, s.round().clamp(0.0, 255.0) as u8, max as u8)
}

/// Convert an 8-bit HSV pixel (hue 0..180) back to RGB.
pub fn hsv_to_rgb(h: u8, s: u8, v: u8) -> (u8, u8, u8) {
    let hue = (h as f32 * 2.0) % 360.0;
    let sat = s as f32 / 255.0;
    let val = v as f32 / 255.0;

    let chroma = val * sat;
    let sector = hue / 60.0;
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let (r1, g1, b1) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = val - chroma;
    let to_u8 = |c: f32| ((c + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (to_u8(r1), to_u8(g1), to_u8(b1))
}

/// Convert an RGB pixel to its CMY ink approximation.
#[inline]
pub fn rgb_to_cmy(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    (255 - r, 255 - g, 255 - b)
}

/// Expand a single-channel image to RGB by replicating the channel.
pub fn gray_to_rgb(image: &RasterImage) -> RasterImage {
    if !image.is_grayscale() {
        return image.clone();
    }
    let pixels = image.pixels().iter().flat_map(|&v| [v, v, v]).collect();
    RasterImage::from_parts(image.width(), image.height(), 3, pixels)
}

/// Re-encode an RGB image into the channel layout of `model`.
///
/// - `Rgb` returns a copy.
/// - `Hsv` stores H (0..180), S, V in the three channels.
/// - `Cmyk` stores the inverted (ink) channels.
/// - `Gray` reduces to luma.
///
/// Single-channel input is expanded to RGB first for `Hsv` and `Cmyk`.
pub fn convert_color_model(image: &RasterImage, model: ColorModel) -> Result<RasterImage> {
    match model {
        ColorModel::Rgb => Ok(image.clone()),
        ColorModel::Gray => Ok(to_luma(image)),
        ColorModel::Hsv => Ok(map_pixels(&gray_to_rgb(image), rgb_to_hsv)),
        ColorModel::Cmyk => Ok(map_pixels(&gray_to_rgb(image), rgb_to_cmy)),
    }
}

fn map_pixels(image: &RasterImage, f: impl Fn(u8, u8, u8) -> (u8, u8, u8)) -> RasterImage {
    let mut out = Vec::with_capacity(image.byte_size());
    for px in image.pixels().chunks_exact(3) {
        let (a, b, c) = f(px[0], px[1], px[2]);
        out.extend_from_slice(&[a, b, c]);
    }
    RasterImage::from_parts(image.width(), image.height(), 3, out)
}
