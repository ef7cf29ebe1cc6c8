//! Processing configuration.

use serde::{Deserialize, Serialize};

use crate::codec::export_format;
use crate::error::{ImageError, Result};

/// Default cutoff radius for the frequency filters, in frequency bins.
pub const DEFAULT_CUTOFF_RADIUS: f64 = 40.0;

/// Settings shared by a processing session.
///
/// Every field has a default, so a partial JSON object (or `{}`) deserializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Directory that exported results are written into.
    pub output_dir: String,
    /// Cutoff radius used by low/high-pass filtering.
    pub cutoff_radius: f64,
    /// Maximum undo depth; `None` keeps every state.
    pub history_limit: Option<usize>,
    /// File extension used for exports ("png", "jpg", "bmp", "tiff").
    pub export_format: String,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            output_dir: "outputs".to_string(),
            cutoff_radius: DEFAULT_CUTOFF_RADIUS,
            history_limit: None,
            export_format: "png".to_string(),
        }
    }
}

impl ProcessingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check the values a session depends on: a finite positive cutoff radius
    /// and an export format the codec can write.
    pub fn validate(&self) -> Result<()> {
        if !self.cutoff_radius.is_finite() || self.cutoff_radius <= 0.0 {
            return Err(ImageError::InvalidInput(format!(
                "cutoff_radius must be positive, got {}",
                self.cutoff_radius
            )));
        }
        export_format(&self.export_format)?;
        Ok(())
    }
}
