//! Error types shared by every analysis and transform operation.

use thiserror::Error;

/// Errors that can occur while analysing or transforming an image.
///
/// Analysis and transform functions fail fast with one of these and never
/// leave a partially written result behind. The history manager never
/// produces an error; empty stacks are ordinary no-ops.
#[derive(Debug, Error)]
pub enum ImageError {
    /// Empty image, mismatched buffer, or an out-of-range parameter.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Channel count outside the supported {1, 3} layouts.
    #[error("Unsupported channel layout: {0} channels (expected 1 or 3)")]
    UnsupportedChannelLayout(u8),

    /// Numerical failure that should not occur under valid input.
    #[error("Computation failure: {0}")]
    ComputationFailure(String),

    /// I/O error while reading or writing an image file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The codec rejected the data.
    #[error("Codec error: {0}")]
    Codec(#[from] image::ImageError),
}

/// Result type for imlab operations.
pub type Result<T> = std::result::Result<T, ImageError>;
