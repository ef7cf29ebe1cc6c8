//! Fourier-domain filtering with circular masks.
//!
//! ## Pipeline
//!
//! 1. Reduce the image to luma.
//! 2. Forward 2D DFT.
//! 3. Shift the zero frequency to the center.
//! 4. Multiply by a circular [`FrequencyMask`] (real and imaginary parts alike).
//! 5. Undo the shift and run the inverse DFT.
//! 6. Take the magnitude and min-max normalize it to 0-255.
//!
//! The result is always a single-channel image with the source dimensions.

pub mod fft;
pub mod mask;

pub use mask::{FilterKind, FrequencyMask, MaskProfile};

use log::{debug, warn};

use crate::error::{ImageError, Result};
use crate::luminance::luma_samples;
use crate::raster::RasterImage;

/// Magnitude ranges narrower than this normalize to an all-zero image.
const FLAT_RANGE: f64 = 1e-6;

/// Apply an ideal (hard-edged) low- or high-pass filter.
///
/// # Arguments
/// * `image` - Source image (color input is reduced to luma)
/// * `kind` - Low-pass or high-pass
/// * `cutoff_radius` - Disc radius in frequency bins
///
/// # Errors
///
/// Returns `ImageError::InvalidInput` if `cutoff_radius` is not a positive,
/// finite number.
pub fn apply_ideal_filter(
    image: &RasterImage,
    kind: FilterKind,
    cutoff_radius: f64,
) -> Result<RasterImage> {
    apply_frequency_filter(image, kind, MaskProfile::Ideal, cutoff_radius)
}

/// Apply a circular frequency filter with the given mask profile.
pub fn apply_frequency_filter(
    image: &RasterImage,
    kind: FilterKind,
    profile: MaskProfile,
    cutoff_radius: f64,
) -> Result<RasterImage> {
    if !cutoff_radius.is_finite() || cutoff_radius <= 0.0 {
        return Err(ImageError::InvalidInput(format!(
            "cutoff radius must be positive, got {}",
            cutoff_radius
        )));
    }

    let width = image.width() as usize;
    let height = image.height() as usize;
    let half_min = (width.min(height) / 2) as f64;
    if cutoff_radius > half_min {
        warn!(
            "cutoff radius {} exceeds half the smaller dimension ({}) of a {}x{} image",
            cutoff_radius, half_min, width, height
        );
    }

    let samples: Vec<f64> = luma_samples(image).into_iter().map(f64::from).collect();
    let spectrum = fft::forward_2d(&samples, width, height);
    let mut shifted = fft::fft_shift(&spectrum, width, height);

    let mask = FrequencyMask::build(width, height, kind, profile, cutoff_radius);
    for (value, &w) in shifted.iter_mut().zip(mask.weights()) {
        *value *= w;
    }

    let mut filtered = fft::ifft_shift(&shifted, width, height);
    fft::inverse_2d(&mut filtered, width, height);

    let magnitude: Vec<f64> = filtered.iter().map(|c| c.norm()).collect();
    let pixels = normalize_to_u8(&magnitude)?;

    debug!(
        "frequency filter: {:?} {:?} radius={} passed={}/{} bins",
        kind,
        profile,
        cutoff_radius,
        mask.pass_count(),
        width * height
    );
    Ok(RasterImage::from_parts(image.width(), image.height(), 1, pixels))
}

/// Min-max normalize to the full 0-255 range.
fn normalize_to_u8(values: &[f64]) -> Result<Vec<u8>> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values {
        if !v.is_finite() {
            return Err(ImageError::ComputationFailure(
                "non-finite value in inverse transform".to_string(),
            ));
        }
        min = min.min(v);
        max = max.max(v);
    }

    let range = max - min;
    if range < FLAT_RANGE {
        return Ok(vec![0; values.len()]);
    }

    let scale = 255.0 / range;
    Ok(values
        .iter()
        .map(|&v| ((v - min) * scale).round().clamp(0.0, 255.0) as u8)
        .collect())
}
