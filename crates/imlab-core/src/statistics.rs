//! Histogram-derived scalar descriptors of an image's intensity distribution.
//!
//! Color images are reduced to BT.601 luma before any statistic is taken, so
//! the report always describes perceived brightness rather than a plain
//! channel average.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ImageError, Result};
use crate::luminance::luma_samples;
use crate::raster::RasterImage;

/// Number of intensity bins for 8-bit samples.
pub const BINS: usize = 256;

/// 256-bin distribution of one channel with its derived scalars.
#[derive(Debug, Clone)]
pub struct HistogramDescriptor {
    /// Sample count per intensity.
    pub counts: [u32; BINS],
    /// `counts` normalized by the total; sums to 1.
    pub probabilities: [f64; BINS],
    /// Number of samples binned.
    pub total: u64,
}

impl HistogramDescriptor {
    /// Bin a slice of 8-bit samples.
    ///
    /// # Errors
    ///
    /// Returns `ImageError::InvalidInput` if `samples` is empty, since an
    /// empty distribution has no probabilities.
    pub fn from_samples(samples: &[u8]) -> Result<Self> {
        if samples.is_empty() {
            return Err(ImageError::InvalidInput(
                "cannot build a histogram from zero samples".to_string(),
            ));
        }

        let mut counts = [0u32; BINS];
        for &s in samples {
            counts[s as usize] += 1;
        }

        let total = samples.len() as u64;
        let mut probabilities = [0.0f64; BINS];
        for (p, &c) in probabilities.iter_mut().zip(counts.iter()) {
            *p = c as f64 / total as f64;
        }

        Ok(Self {
            counts,
            probabilities,
            total,
        })
    }

    /// Mean intensity.
    pub fn mean(&self) -> f64 {
        self.probabilities
            .iter()
            .enumerate()
            .map(|(i, &p)| i as f64 * p)
            .sum()
    }

    /// Population variance.
    pub fn variance(&self) -> f64 {
        let mean = self.mean();
        self.probabilities
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let d = i as f64 - mean;
                d * d * p
            })
            .sum()
    }

    /// Population standard deviation.
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Lowest occupied intensity.
    pub fn min(&self) -> u8 {
        self.counts.iter().position(|&c| c > 0).unwrap_or(0) as u8
    }

    /// Highest occupied intensity.
    pub fn max(&self) -> u8 {
        self.counts.iter().rposition(|&c| c > 0).unwrap_or(0) as u8
    }

    /// Shannon entropy in bits. Empty bins contribute nothing.
    pub fn entropy(&self) -> f64 {
        self.probabilities
            .iter()
            .filter(|&&p| p > 0.0)
            .map(|&p| p * (1.0 / p).log2())
            .sum()
    }

    /// Number of bins with at least one sample.
    pub fn occupied_bins(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }
}

/// Scalar summary of an image's luma distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatisticsReport {
    pub mean: f64,
    pub std_dev: f64,
    pub variance: f64,
    pub min: u8,
    pub max: u8,
    /// Shannon entropy in bits (0 to 8).
    pub entropy: f64,
}

impl StatisticsReport {
    /// Build the report from an existing histogram.
    pub fn from_histogram(hist: &HistogramDescriptor) -> Self {
        let variance = hist.variance();
        Self {
            mean: hist.mean(),
            std_dev: variance.sqrt(),
            variance,
            min: hist.min(),
            max: hist.max(),
            entropy: hist.entropy(),
        }
    }

    /// Labelled, formatted values in display order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Mean (brightness)", format!("{:.2}", self.mean)),
            ("Std deviation", format!("{:.2}", self.std_dev)),
            ("Variance", format!("{:.2}", self.variance)),
            ("Minimum", self.min.to_string()),
            ("Maximum", self.max.to_string()),
            ("Entropy", format!("{:.4}", self.entropy)),
        ]
    }
}

/// Compute statistics of an image's luma channel.
///
/// # Errors
///
/// Returns `ImageError::InvalidInput` for an image without pixels.
pub fn compute_statistics(image: &RasterImage) -> Result<StatisticsReport> {
    let samples = luma_samples(image);
    let hist = HistogramDescriptor::from_samples(&samples)?;
    let report = StatisticsReport::from_histogram(&hist);
    debug!(
        "statistics: {}x{} mean={:.2} std={:.2} entropy={:.4}",
        image.width(),
        image.height(),
        report.mean,
        report.std_dev,
        report.entropy
    );
    Ok(report)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
