//! Per-channel intensity curves for plotting, and histogram equalization.
//!
//! The channel layout of a curve set depends on the color model the caller
//! says the image is in:
//!
//! | Model          | Curves                          | Bins          |
//! |----------------|---------------------------------|---------------|
//! | GRAY / 1-chan  | gray                            | 256           |
//! | RGB            | red, green, blue                | 256 each      |
//! | HSV            | hue, saturation, value          | 180, 256, 256 |
//! | CMYK           | cyan, magenta, yellow           | 256 each      |

use log::debug;
use serde::{Deserialize, Serialize};

use crate::color::{ColorModel, HUE_RANGE};
use crate::error::Result;
use crate::luminance::to_luma;
use crate::raster::RasterImage;
use crate::statistics::{HistogramDescriptor, BINS};

/// One plotted distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelCurve {
    /// Display label (e.g. "Hue").
    pub label: String,
    /// Suggested plot color name.
    pub color: String,
    /// Sample count per bin.
    pub bins: Vec<u32>,
}

impl ChannelCurve {
    fn new(label: &str, color: &str, bins: Vec<u32>) -> Self {
        Self {
            label: label.to_string(),
            color: color.to_string(),
            bins,
        }
    }

    /// Total number of samples binned.
    pub fn total(&self) -> u64 {
        self.bins.iter().map(|&c| c as u64).sum()
    }
}

/// The curves of one image under one color model, in fixed channel order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelCurves {
    pub model: ColorModel,
    pub curves: Vec<ChannelCurve>,
}

impl ChannelCurves {
    /// Largest bin across all curves, for normalizing a plot.
    pub fn max_value(&self) -> u32 {
        self.curves
            .iter()
            .flat_map(|c| c.bins.iter().copied())
            .max()
            .unwrap_or(0)
    }
}

/// Compute the channel curves of `image` interpreted as `model`.
///
/// Single-channel images always produce one gray curve, whatever the model.
pub fn compute_histogram(image: &RasterImage, model: ColorModel) -> Result<ChannelCurves> {
    let model = if image.is_grayscale() {
        ColorModel::Gray
    } else {
        model
    };

    let curves = match model {
        ColorModel::Gray => {
            let luma = to_luma(image);
            let hist = HistogramDescriptor::from_samples(luma.pixels())?;
            vec![ChannelCurve::new("Gray", "gray", hist.counts.to_vec())]
        }
        ColorModel::Rgb => vec![
            ChannelCurve::new("Red", "red", bin_channel(image, 0, BINS, identity_bin)),
            ChannelCurve::new("Green", "green", bin_channel(image, 1, BINS, identity_bin)),
            ChannelCurve::new("Blue", "blue", bin_channel(image, 2, BINS, identity_bin)),
        ],
        ColorModel::Hsv => vec![
            ChannelCurve::new("Hue", "orange", bin_channel(image, 0, HUE_RANGE, identity_bin)),
            ChannelCurve::new("Saturation", "green", bin_channel(image, 1, BINS, identity_bin)),
            ChannelCurve::new("Value", "purple", bin_channel(image, 2, BINS, identity_bin)),
        ],
        ColorModel::Cmyk => vec![
            ChannelCurve::new("Cyan", "cyan", bin_channel(image, 0, BINS, unit_interval_bin)),
            ChannelCurve::new("Magenta", "magenta", bin_channel(image, 1, BINS, unit_interval_bin)),
            ChannelCurve::new("Yellow", "yellow", bin_channel(image, 2, BINS, unit_interval_bin)),
        ],
    };

    debug!(
        "histogram: {} curves for {}x{} image as {}",
        curves.len(),
        image.width(),
        image.height(),
        model
    );
    Ok(ChannelCurves { model, curves })
}

#[inline]
fn identity_bin(value: u8) -> usize {
    value as usize
}

/// Map a sample into [0, 1] and bin it across 256 equal-width bins.
#[inline]
fn unit_interval_bin(value: u8) -> usize {
    let unit = value as f32 / 255.0;
    (unit * BINS as f32) as usize
}

fn bin_channel(
    image: &RasterImage,
    channel: usize,
    bin_count: usize,
    to_bin: fn(u8) -> usize,
) -> Vec<u32> {
    let mut bins = vec![0u32; bin_count];
    let stride = image.channels() as usize;
    for px in image.pixels().chunks_exact(stride) {
        // Out-of-domain samples (e.g. hue >= 180) land in the last bin.
        let bin = to_bin(px[channel]).min(bin_count - 1);
        bins[bin] += 1;
    }
    bins
}

/// Equalize the luma histogram of an image.
///
/// Returns a single-channel image whose intensities are remapped through the
/// normalized cumulative distribution, spreading occupied levels over the full
/// 0-255 range. A constant image is returned unchanged.
pub fn equalize_histogram(image: &RasterImage) -> Result<RasterImage> {
    let luma = to_luma(image);
    let hist = HistogramDescriptor::from_samples(luma.pixels())?;

    let mut cdf = [0u64; BINS];
    let mut running = 0u64;
    for (slot, &count) in cdf.iter_mut().zip(hist.counts.iter()) {
        running += count as u64;
        *slot = running;
    }

    let cdf_min = cdf.iter().copied().find(|&c| c > 0).unwrap_or(0);
    let span = hist.total - cdf_min;
    if span == 0 {
        return Ok(luma);
    }

    let mut lut = [0u8; BINS];
    for (entry, &c) in lut.iter_mut().zip(cdf.iter()) {
        let scaled = (c.saturating_sub(cdf_min)) as f64 * 255.0 / span as f64;
        *entry = scaled.round().clamp(0.0, 255.0) as u8;
    }

    let pixels = luma.pixels().iter().map(|&v| lut[v as usize]).collect();
    Ok(RasterImage::from_parts(luma.width(), luma.height(), 1, pixels))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gray_image_single_curve() {
        let img = RasterImage::filled(4, 4, 1, 128).unwrap();
        let curves = compute_histogram(&img, ColorModel::Rgb).unwrap();
        assert_eq!(curves.curves.len(), 1);
        assert_eq!(curves.model, ColorModel::Gray);
        assert_eq!(curves.curves[0].bins.len(), 256);
        assert_eq!(curves.curves[0].bins[128], 16);
    }

    #[test]
    fn test_rgb_primary_colors() {
        let pixels = vec![
            255, 0, 0, // Red
            0, 255, 0, // Green
            0, 0, 255, // Blue
        ];
        let img = RasterImage::rgb(3, 1, pixels).unwrap();
        let curves = compute_histogram(&img, ColorModel::Rgb).unwrap();
        let labels: Vec<_> = curves.curves.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["Red", "Green", "Blue"]);
        for curve in &curves.curves {
            assert_eq!(curve.bins[255], 1);
            assert_eq!(curve.bins[0], 2);
        }
    }

    #[test]
    fn test_hsv_hue_has_180_bins() {
        let img = RasterImage::rgb(2, 1, vec![90, 200, 255, 179, 0, 10]).unwrap();
        let curves = compute_histogram(&img, ColorModel::Hsv).unwrap();
        assert_eq!(curves.curves[0].bins.len(), 180);
        assert_eq!(curves.curves[1].bins.len(), 256);
        assert_eq!(curves.curves[2].bins.len(), 256);
        assert_eq!(curves.curves[0].bins[90], 1);
        assert_eq!(curves.curves[0].bins[179], 1);
    }

    #[test]
    fn test_hsv_out_of_range_hue_clamped() {
        let img = RasterImage::rgb(1, 1, vec![250, 0, 0]).unwrap();
        let curves = compute_histogram(&img, ColorModel::Hsv).unwrap();
        assert_eq!(curves.curves[0].bins[179], 1);
        assert_eq!(curves.curves[0].total(), 1);
    }

    #[test]
    fn test_cmyk_unit_interval_binning() {
        let img = RasterImage::rgb(1, 1, vec![0, 128, 255]).unwrap();
        let curves = compute_histogram(&img, ColorModel::Cmyk).unwrap();
        assert_eq!(curves.curves[0].bins[0], 1);
        assert_eq!(curves.curves[1].bins[128], 1);
        assert_eq!(curves.curves[2].bins[255], 1);
    }

    #[test]
    fn test_gray_model_on_color_image_uses_luma() {
        let img = RasterImage::rgb(1, 1, vec![255, 0, 0]).unwrap();
        let curves = compute_histogram(&img, ColorModel::Gray).unwrap();
        assert_eq!(curves.curves.len(), 1);
        assert_eq!(curves.curves[0].bins[76], 1);
    }

    #[test]
    fn test_max_value() {
        let pixels = vec![100, 100, 100, 100, 100, 100, 100, 100, 100, 200, 200, 200];
        let img = RasterImage::rgb(4, 1, pixels).unwrap();
        let curves = compute_histogram(&img, ColorModel::Rgb).unwrap();
        assert_eq!(curves.max_value(), 3);
    }

    #[test]
    fn test_source_not_mutated() {
        let img = RasterImage::rgb(1, 1, vec![1, 2, 3]).unwrap();
        let before = img.clone();
        compute_histogram(&img, ColorModel::Cmyk).unwrap();
        assert_eq!(img, before);
    }

    #[test]
    fn test_equalize_two_levels_spreads_to_extremes() {
        let img = RasterImage::gray(4, 1, vec![100, 100, 120, 120]).unwrap();
        let eq = equalize_histogram(&img).unwrap();
        assert_eq!(eq.pixels(), &[0, 0, 255, 255]);
    }

    #[test]
    fn test_equalize_constant_unchanged() {
        let img = RasterImage::filled(3, 3, 1, 77).unwrap();
        let eq = equalize_histogram(&img).unwrap();
        assert_eq!(eq, img);
    }

    #[test]
    fn test_equalize_color_returns_gray() {
        let img = RasterImage::filled(2, 2, 3, 50).unwrap();
        let eq = equalize_histogram(&img).unwrap();
        assert_eq!(eq.channels(), 1);
    }
}
