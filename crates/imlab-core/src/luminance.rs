//! Luma reduction using ITU-R BT.601 coefficients.
//!
//! Every analysis that needs a single intensity channel (statistics, labeling,
//! frequency filtering, equalization) goes through [`to_luma`], so the
//! weighting is defined in exactly one place.

use crate::raster::RasterImage;

/// ITU-R BT.601 coefficient for the red channel.
pub const LUMA_R: f32 = 0.299;

/// ITU-R BT.601 coefficient for the green channel.
pub const LUMA_G: f32 = 0.587;

/// ITU-R BT.601 coefficient for the blue channel.
pub const LUMA_B: f32 = 0.114;

/// Calculate luma from normalized RGB values (0.0 to 1.0).
#[inline]
pub fn calculate_luma(r: f32, g: f32, b: f32) -> f32 {
    LUMA_R * r + LUMA_G * g + LUMA_B * b
}

/// Calculate luma from u8 RGB values, rounded and clamped to 0-255.
#[inline]
pub fn calculate_luma_u8(r: u8, g: u8, b: u8) -> u8 {
    let luma = LUMA_R * r as f32 + LUMA_G * g as f32 + LUMA_B * b as f32;
    luma.clamp(0.0, 255.0).round() as u8
}

/// Luma samples of an image, one byte per pixel.
///
/// Single-channel images are returned as a copy of their buffer.
pub fn luma_samples(image: &RasterImage) -> Vec<u8> {
    if image.is_grayscale() {
        return image.pixels().to_vec();
    }
    image
        .pixels()
        .chunks_exact(3)
        .map(|px| calculate_luma_u8(px[0], px[1], px[2]))
        .collect()
}

/// Reduce an image to a single luma channel.
pub fn to_luma(image: &RasterImage) -> RasterImage {
    if image.is_grayscale() {
        return image.clone();
    }
    RasterImage::from_parts(image.width(), image.height(), 1, luma_samples(image))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coefficients_sum_to_one() {
        let sum = LUMA_R + LUMA_G + LUMA_B;
        assert!((sum - 1.0).abs() < 1e-6, "Coefficients should sum to 1.0");
    }

    #[test]
    fn test_luma_pure_white_and_black() {
        assert!((calculate_luma(1.0, 1.0, 1.0) - 1.0).abs() < 1e-6);
        assert_eq!(calculate_luma_u8(255, 255, 255), 255);
        assert_eq!(calculate_luma_u8(0, 0, 0), 0);
    }

    #[test]
    fn test_luma_gray_preserves_value() {
        for v in [0u8, 64, 128, 192, 255] {
            let luma = calculate_luma_u8(v, v, v);
            assert!(
                (luma as i32 - v as i32).abs() <= 1,
                "Gray {} should produce luma ~{}, got {}",
                v,
                v,
                luma
            );
        }
    }

    #[test]
    fn test_luma_primaries() {
        // 0.299 * 255 ≈ 76.2
        assert_eq!(calculate_luma_u8(255, 0, 0), 76);
        // 0.587 * 255 ≈ 149.7
        assert_eq!(calculate_luma_u8(0, 255, 0), 150);
        // 0.114 * 255 ≈ 29.1
        assert_eq!(calculate_luma_u8(0, 0, 255), 29);
    }

    #[test]
    fn test_to_luma_reduces_channels() {
        let img = RasterImage::rgb(2, 1, vec![255, 0, 0, 0, 0, 255]).unwrap();
        let luma = to_luma(&img);
        assert_eq!(luma.channels(), 1);
        assert_eq!(luma.pixels(), &[76, 29]);
    }

    #[test]
    fn test_to_luma_gray_is_copy() {
        let img = RasterImage::gray(2, 2, vec![1, 2, 3, 4]).unwrap();
        assert_eq!(to_luma(&img), img);
    }
}
