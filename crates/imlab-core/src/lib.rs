//! imlab Core - Image analysis library
//!
//! This crate provides the core image analysis functionality for imlab:
//! statistical descriptors, per-channel histograms, channel decomposition,
//! Otsu binarization with connected-component labeling, Fourier-domain
//! filtering, and an undo/redo snapshot history.
//!
//! Every analysis and transform takes a [`RasterImage`] by reference and
//! returns a new buffer; nothing is modified in place. Callers that mutate a
//! "current image" record it with [`HistoryManager::snapshot`] first.

pub mod codec;
pub mod color;
pub mod config;
pub mod decompose;
pub mod error;
pub mod frequency;
pub mod histogram;
pub mod history;
pub mod labeling;
pub mod luminance;
pub mod raster;
pub mod statistics;

pub use codec::{
    decode_bytes, decode_file, encode_file, encode_png, export_format, export_timestamped,
    export_with_config,
};
pub use color::{convert_color_model, ColorModel};
pub use config::ProcessingConfig;
pub use decompose::{decompose, merge_channels, split_channels, ChannelPlane};
pub use error::{ImageError, Result};
pub use frequency::{apply_frequency_filter, apply_ideal_filter, FilterKind, MaskProfile};
pub use histogram::{compute_histogram, equalize_histogram, ChannelCurve, ChannelCurves};
pub use history::HistoryManager;
#[cfg(feature = "thread-rng")]
pub use labeling::label_components;
pub use labeling::{label_components_with_rng, Connectivity, LabelMap, LabeledComponents};
pub use raster::RasterImage;
pub use statistics::{compute_statistics, HistogramDescriptor, StatisticsReport};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reexports_compose() {
        let img = RasterImage::filled(4, 4, 3, 128).unwrap();
        let stats = compute_statistics(&img).unwrap();
        assert_eq!(stats.min, stats.max);

        let curves = compute_histogram(&img, ColorModel::Rgb).unwrap();
        assert_eq!(curves.curves.len(), 3);

        let mut history = HistoryManager::new();
        history.snapshot(&img);
        assert!(history.can_undo());
    }
}
