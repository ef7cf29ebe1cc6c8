//! Circular frequency-domain masks
//!
//! A mask is a weight per frequency bin, laid out like a *shifted* spectrum:
//! the zero frequency sits at (height / 2, width / 2). Weights run from 0.0
//! (blocked) to 1.0 (passed).
//!
//! ## Profiles
//!
//! - **Ideal**: hard edge, weights are exactly 0 or 1. Ringing in the output is
//!   expected with this profile.
//! - **Gaussian**: `exp(-d² / 2r²)`.
//! - **Butterworth**: `1 / (1 + (d / r)^(2n))`.
//!
//! A high-pass mask is always `1 - low_pass` for the same profile and radius,
//! so the two kinds partition every frequency. For the ideal profile the
//! boundary (`d == r`) belongs to the low-pass side only.

use serde::{Deserialize, Serialize};

/// Which side of the cutoff is passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterKind {
    /// Pass frequencies at distance <= radius from the center.
    LowPass,
    /// Pass frequencies at distance > radius from the center.
    HighPass,
}

/// Shape of the transition between pass and stop bands.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum MaskProfile {
    #[default]
    Ideal,
    Gaussian,
    Butterworth { order: u32 },
}

impl MaskProfile {
    /// Low-pass weight at squared distance `dist_sq` for cutoff `radius`.
    #[inline]
    fn low_pass_weight(self, dist_sq: f64, radius: f64) -> f64 {
        let radius_sq = radius * radius;
        match self {
            MaskProfile::Ideal => {
                if dist_sq <= radius_sq {
                    1.0
                } else {
                    0.0
                }
            }
            MaskProfile::Gaussian => (-dist_sq / (2.0 * radius_sq)).exp(),
            MaskProfile::Butterworth { order } => {
                let ratio_sq = dist_sq / radius_sq;
                1.0 / (1.0 + ratio_sq.powi(order.max(1) as i32))
            }
        }
    }
}

/// Weight grid matching a shifted spectrum.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyMask {
    width: usize,
    height: usize,
    weights: Vec<f64>,
}

impl FrequencyMask {
    /// Build a circular mask centered at (height / 2, width / 2).
    ///
    /// The caller validates `radius`; any positive value produces a mask.
    pub fn build(
        width: usize,
        height: usize,
        kind: FilterKind,
        profile: MaskProfile,
        radius: f64,
    ) -> Self {
        let center_row = (height / 2) as f64;
        let center_col = (width / 2) as f64;

        let mut weights = Vec::with_capacity(width * height);
        for row in 0..height {
            let dr = row as f64 - center_row;
            for col in 0..width {
                let dc = col as f64 - center_col;
                let low = profile.low_pass_weight(dr * dr + dc * dc, radius);
                weights.push(match kind {
                    FilterKind::LowPass => low,
                    FilterKind::HighPass => 1.0 - low,
                });
            }
        }

        Self {
            width,
            height,
            weights,
        }
    }

    /// Ideal (hard-edged) mask.
    pub fn ideal(width: usize, height: usize, kind: FilterKind, radius: f64) -> Self {
        Self::build(width, height, kind, MaskProfile::Ideal, radius)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Weight at (`row`, `col`).
    #[inline]
    pub fn weight(&self, row: usize, col: usize) -> f64 {
        self.weights[row * self.width + col]
    }

    /// Whether (`row`, `col`) is in the pass band (weight of at least one half).
    ///
    /// For the ideal profile this is exact disc membership.
    #[inline]
    pub fn passes(&self, row: usize, col: usize) -> bool {
        self.weight(row, col) >= 0.5
    }

    /// All weights in row-major order.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Number of bins in the pass band.
    pub fn pass_count(&self) -> usize {
        self.weights.iter().filter(|&&w| w >= 0.5).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ideal_low_pass_center_and_corner() {
        let mask = FrequencyMask::ideal(16, 16, FilterKind::LowPass, 3.0);
        assert!(mask.passes(8, 8));
        assert!(!mask.passes(0, 0));
        assert_eq!(mask.weight(8, 8), 1.0);
        assert_eq!(mask.weight(0, 0), 0.0);
    }

    #[test]
    fn test_ideal_boundary_in_low_pass_only() {
        let low = FrequencyMask::ideal(16, 16, FilterKind::LowPass, 3.0);
        let high = FrequencyMask::ideal(16, 16, FilterKind::HighPass, 3.0);
        // (8, 11) is exactly 3 from the center.
        assert!(low.passes(8, 11));
        assert!(!high.passes(8, 11));
        // (8, 12) is just outside.
        assert!(!low.passes(8, 12));
        assert!(high.passes(8, 12));
    }

    #[test]
    fn test_ideal_disc_area() {
        // Radius 1 disc: center plus four neighbors
        let mask = FrequencyMask::ideal(9, 9, FilterKind::LowPass, 1.0);
        assert_eq!(mask.pass_count(), 5);
    }

    #[test]
    fn test_odd_dimensions_center() {
        let mask = FrequencyMask::ideal(5, 7, FilterKind::LowPass, 0.5);
        // center = (row 3, col 2)
        assert_eq!(mask.pass_count(), 1);
        assert!(mask.passes(3, 2));
    }

    #[test]
    fn test_gaussian_half_power_shape() {
        let mask = FrequencyMask::build(33, 33, FilterKind::LowPass, MaskProfile::Gaussian, 4.0);
        assert!((mask.weight(16, 16) - 1.0).abs() < 1e-12);
        // At d = r, weight = exp(-0.5)
        assert!((mask.weight(16, 20) - (-0.5f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_butterworth_half_at_cutoff() {
        let mask = FrequencyMask::build(
            33,
            33,
            FilterKind::LowPass,
            MaskProfile::Butterworth { order: 2 },
            4.0,
        );
        assert!((mask.weight(16, 20) - 0.5).abs() < 1e-12);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn profile_strategy() -> impl Strategy<Value = MaskProfile> {
        prop_oneof![
            Just(MaskProfile::Ideal),
            Just(MaskProfile::Gaussian),
            (1u32..=6).prop_map(|order| MaskProfile::Butterworth { order }),
        ]
    }

    proptest! {
        /// Property: ideal low and high masks partition every bin exactly once.
        #[test]
        fn prop_ideal_masks_partition(
            width in 1usize..=40,
            height in 1usize..=40,
            radius in 0.1f64..30.0,
        ) {
            let low = FrequencyMask::ideal(width, height, FilterKind::LowPass, radius);
            let high = FrequencyMask::ideal(width, height, FilterKind::HighPass, radius);
            for (l, h) in low.weights().iter().zip(high.weights()) {
                prop_assert!(*l == 0.0 || *l == 1.0);
                prop_assert_eq!(l + h, 1.0);
            }
            prop_assert_eq!(low.pass_count() + high.pass_count(), width * height);
        }

        /// Property: every profile stays within [0, 1] and low + high == 1.
        #[test]
        fn prop_profiles_complementary(
            width in 1usize..=24,
            height in 1usize..=24,
            radius in 0.5f64..20.0,
            profile in profile_strategy(),
        ) {
            let low = FrequencyMask::build(width, height, FilterKind::LowPass, profile, radius);
            let high = FrequencyMask::build(width, height, FilterKind::HighPass, profile, radius);
            for (l, h) in low.weights().iter().zip(high.weights()) {
                prop_assert!((0.0..=1.0).contains(l));
                prop_assert!((l + h - 1.0).abs() < 1e-12);
            }
        }
    }
}
