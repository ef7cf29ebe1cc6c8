//! Analysis WASM bindings: statistics, histograms, channel decomposition and
//! connected-component labeling.
//!
//! All of these are read-only projections of an image; none of them touches a
//! session's history.
//!
//! # Example
//!
//! ```typescript
//! const stats = compute_statistics(image);
//! console.log(stats.mean, stats.entropy);
//!
//! const hist = compute_histogram(image, "HSV");
//! for (let i = 0; i < hist.curve_count; i++) {
//!   plot(hist.label(i), hist.color(i), hist.bins(i));
//! }
//! ```

use imlab_core::labeling::label_components_with_rng;
use imlab_core::{
    compute_histogram as compute_histogram_core, compute_statistics as compute_statistics_core,
    decompose, equalize_histogram as equalize_histogram_core, ChannelCurves, ChannelPlane,
    LabeledComponents, StatisticsReport,
};
use js_sys::Array;
use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;

use crate::types::{parse_model, to_js_error, JsRasterImage};

/// Luma statistics accessible from JavaScript.
#[wasm_bindgen]
pub struct JsStatistics {
    report: StatisticsReport,
}

#[wasm_bindgen]
impl JsStatistics {
    #[wasm_bindgen(getter)]
    pub fn mean(&self) -> f64 {
        self.report.mean
    }

    #[wasm_bindgen(getter)]
    pub fn std_dev(&self) -> f64 {
        self.report.std_dev
    }

    #[wasm_bindgen(getter)]
    pub fn variance(&self) -> f64 {
        self.report.variance
    }

    #[wasm_bindgen(getter)]
    pub fn min(&self) -> u8 {
        self.report.min
    }

    #[wasm_bindgen(getter)]
    pub fn max(&self) -> u8 {
        self.report.max
    }

    /// Shannon entropy in bits.
    #[wasm_bindgen(getter)]
    pub fn entropy(&self) -> f64 {
        self.report.entropy
    }

    /// Display labels, in the same order as `formatted()`.
    pub fn labels(&self) -> Vec<String> {
        self.report
            .entries()
            .into_iter()
            .map(|(label, _)| label.to_string())
            .collect()
    }

    /// Values formatted for display.
    pub fn formatted(&self) -> Vec<String> {
        self.report.entries().into_iter().map(|(_, value)| value).collect()
    }

    /// Serialize to a plain JS object.
    pub fn to_json(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.report).map_err(to_js_error)
    }
}

/// Compute mean, deviation, range and entropy of the image's luma.
#[wasm_bindgen]
pub fn compute_statistics(image: &JsRasterImage) -> Result<JsStatistics, JsValue> {
    statistics_of(image).map_err(to_js_error)
}

fn statistics_of(image: &JsRasterImage) -> imlab_core::Result<JsStatistics> {
    Ok(JsStatistics {
        report: compute_statistics_core(image.raster())?,
    })
}

/// Channel curves accessible from JavaScript, indexed 0..curve_count.
#[wasm_bindgen]
pub struct JsChannelCurves {
    inner: ChannelCurves,
}

#[wasm_bindgen]
impl JsChannelCurves {
    /// Color model the curves were computed for ("GRAY" for 1-channel input).
    #[wasm_bindgen(getter)]
    pub fn model(&self) -> String {
        self.inner.model.to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn curve_count(&self) -> usize {
        self.inner.curves.len()
    }

    /// Largest bin across all curves, for normalizing a plot.
    #[wasm_bindgen(getter)]
    pub fn max_value(&self) -> u32 {
        self.inner.max_value()
    }

    /// Label of curve `index`, or an empty string when out of range.
    pub fn label(&self, index: usize) -> String {
        self.inner
            .curves
            .get(index)
            .map(|c| c.label.clone())
            .unwrap_or_default()
    }

    /// Plot color of curve `index`, or an empty string when out of range.
    pub fn color(&self, index: usize) -> String {
        self.inner
            .curves
            .get(index)
            .map(|c| c.color.clone())
            .unwrap_or_default()
    }

    /// Bins of curve `index` as a Uint32Array (empty when out of range).
    pub fn bins(&self, index: usize) -> Vec<u32> {
        self.inner
            .curves
            .get(index)
            .map(|c| c.bins.clone())
            .unwrap_or_default()
    }

    pub fn to_json(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner).map_err(to_js_error)
    }
}

/// Compute per-channel histograms of `image` interpreted as `model`.
///
/// `model` is one of "RGB", "HSV", "CMYK", "GRAY" (case-insensitive).
#[wasm_bindgen]
pub fn compute_histogram(image: &JsRasterImage, model: &str) -> Result<JsChannelCurves, JsValue> {
    let model = parse_model(model)?;
    compute_histogram_core(image.raster(), model)
        .map(|inner| JsChannelCurves { inner })
        .map_err(to_js_error)
}

/// Histogram-equalized luma of `image`.
#[wasm_bindgen]
pub fn equalize_histogram(image: &JsRasterImage) -> Result<JsRasterImage, JsValue> {
    equalize_histogram_core(image.raster())
        .map(JsRasterImage::from_raster)
        .map_err(to_js_error)
}

/// One labelled plane of a channel decomposition.
#[wasm_bindgen]
pub struct JsChannelPlane {
    label: String,
    image: JsRasterImage,
}

#[wasm_bindgen]
impl JsChannelPlane {
    #[wasm_bindgen(getter)]
    pub fn label(&self) -> String {
        self.label.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn image(&self) -> JsRasterImage {
        self.image.clone()
    }
}

impl From<ChannelPlane> for JsChannelPlane {
    fn from(plane: ChannelPlane) -> Self {
        Self {
            label: plane.label.to_string(),
            image: JsRasterImage::from_raster(plane.image),
        }
    }
}

/// Split `image` into displayable planes for `model`.
///
/// Returns an array of `JsChannelPlane`.
#[wasm_bindgen]
pub fn decompose_channels(image: &JsRasterImage, model: &str) -> Result<Array, JsValue> {
    let model = parse_model(model)?;
    let planes = decompose(image.raster(), model).map_err(to_js_error)?;
    let out = Array::new();
    for plane in planes {
        out.push(&JsValue::from(JsChannelPlane::from(plane)));
    }
    Ok(out)
}

/// Connected-component labeling result.
#[wasm_bindgen]
pub struct JsLabeling {
    inner: LabeledComponents,
}

#[wasm_bindgen]
impl JsLabeling {
    /// Number of regions found, excluding background.
    #[wasm_bindgen(getter)]
    pub fn count(&self) -> u32 {
        self.inner.count
    }

    /// Otsu threshold used for binarization.
    #[wasm_bindgen(getter)]
    pub fn threshold(&self) -> u8 {
        self.inner.threshold
    }

    /// Randomly colored RGB rendering of the regions.
    #[wasm_bindgen(getter)]
    pub fn colored(&self) -> JsRasterImage {
        JsRasterImage::from_raster(self.inner.colored.clone())
    }

    /// Per-pixel labels as a Uint32Array (0 = background).
    pub fn labels(&self) -> Vec<u32> {
        self.inner.label_map.labels().to_vec()
    }

    /// Pixel count per label, index 0 being background.
    pub fn region_sizes(&self) -> Vec<u32> {
        self.inner.label_map.region_sizes()
    }
}

/// Otsu-binarize `image` and label its dark regions.
///
/// Region colors are seeded from `Math.random()`.
#[wasm_bindgen]
pub fn label_components(image: &JsRasterImage) -> Result<JsLabeling, JsValue> {
    let seed = (js_sys::Math::random() * u64::MAX as f64) as u64;
    labeling_with_seed(image, seed).map_err(to_js_error)
}

/// Like `label_components` with a fixed color seed.
#[wasm_bindgen]
pub fn label_components_seeded(image: &JsRasterImage, seed: u64) -> Result<JsLabeling, JsValue> {
    labeling_with_seed(image, seed).map_err(to_js_error)
}

fn labeling_with_seed(image: &JsRasterImage, seed: u64) -> imlab_core::Result<JsLabeling> {
    let mut rng = StdRng::seed_from_u64(seed);
    Ok(JsLabeling {
        inner: label_components_with_rng(image.raster(), &mut rng)?,
    })
}
