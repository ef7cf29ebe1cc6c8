//! Editing session bindings.
//!
//! A session owns the working ("current") image, the image as it was opened,
//! the color model tag of the current image and an undo/redo history that
//! restores each image together with its tag. Every
//! mutating operation computes its result first and only then snapshots the
//! current image and swaps the result in, so a failed operation leaves the
//! session unchanged.
//!
//! # Example
//!
//! ```typescript
//! const session = new JsSession({ cutoff_radius: 30, history_limit: 20 });
//! session.open_bytes(new Uint8Array(await file.arrayBuffer()));
//! session.apply_low_pass();
//! session.undo();
//! const png = session.export_bytes();
//! download(png, session.export_file_name());
//! ```

use std::collections::VecDeque;

use imlab_core::codec::{decode_bytes, encode_with_extension, output_file_name};
use imlab_core::{
    apply_ideal_filter, convert_color_model, equalize_histogram, ColorModel, FilterKind,
    HistoryManager, ImageError, ProcessingConfig, RasterImage, Result as CoreResult,
};
use log::{debug, info};
use wasm_bindgen::prelude::*;

use crate::analysis::{self, JsChannelCurves, JsLabeling, JsStatistics};
use crate::types::{parse_model, to_js_error, JsRasterImage};

/// Color model tags that mirror the image stacks of a [`HistoryManager`].
///
/// The history stores pixels only; the tag of every stored image lives here,
/// in the same stack order, so undo and redo restore both together.
#[derive(Debug, Default)]
struct ModelTags {
    past: VecDeque<ColorModel>,
    future: Vec<ColorModel>,
}

impl ModelTags {
    /// Record `model` after a snapshot; `depth` is the history's new past length.
    fn snapshot(&mut self, model: ColorModel, depth: usize) {
        self.past.push_back(model);
        self.future.clear();
        self.trim(depth);
    }

    fn undo(&mut self, current: ColorModel) -> Option<ColorModel> {
        let previous = self.past.pop_back()?;
        self.future.push(current);
        Some(previous)
    }

    fn redo(&mut self, current: ColorModel, depth: usize) -> Option<ColorModel> {
        let next = self.future.pop()?;
        self.past.push_back(current);
        self.trim(depth);
        Some(next)
    }

    /// Drop the oldest tags the bounded history has already evicted.
    fn trim(&mut self, depth: usize) {
        while self.past.len() > depth {
            self.past.pop_front();
        }
    }

    fn reset(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}

/// Session state, independent of the JS boundary.
#[derive(Debug)]
struct SessionState {
    config: ProcessingConfig,
    history: HistoryManager,
    tags: ModelTags,
    original: Option<RasterImage>,
    current: Option<RasterImage>,
    model: ColorModel,
}

impl SessionState {
    fn new(config: ProcessingConfig) -> CoreResult<Self> {
        config.validate()?;
        let history = match config.history_limit {
            Some(limit) => HistoryManager::with_limit(limit),
            None => HistoryManager::new(),
        };
        Ok(Self {
            config,
            history,
            tags: ModelTags::default(),
            original: None,
            current: None,
            model: ColorModel::Rgb,
        })
    }

    /// Start over with a freshly opened image.
    fn open(&mut self, image: RasterImage) {
        self.history.reset();
        self.tags.reset();
        self.model = model_for(&image);
        self.original = Some(image.clone());
        self.current = Some(image);
        info!("session: opened image");
    }

    fn current(&self) -> CoreResult<&RasterImage> {
        self.current
            .as_ref()
            .ok_or_else(|| ImageError::InvalidInput("no image loaded".to_string()))
    }

    /// Run `op` on the current image and, if it succeeds, record the old image
    /// and its tag and make the result current.
    fn apply(
        &mut self,
        model: ColorModel,
        op: impl FnOnce(&RasterImage) -> CoreResult<RasterImage>,
    ) -> CoreResult<()> {
        let result = op(self.current()?)?;
        if let Some(previous) = self.current.replace(result) {
            self.history.snapshot(&previous);
            self.tags.snapshot(self.model, self.history.past_len());
        }
        self.model = model;
        Ok(())
    }

    fn apply_color_model(&mut self, model: ColorModel) -> CoreResult<()> {
        self.apply(model, |img| convert_color_model(img, model))
    }

    fn apply_filter(&mut self, kind: FilterKind, radius: Option<f64>) -> CoreResult<()> {
        let radius = radius.unwrap_or(self.config.cutoff_radius);
        debug!("session: {:?} filter, radius {}", kind, radius);
        self.apply(ColorModel::Gray, |img| apply_ideal_filter(img, kind, radius))
    }

    fn equalize(&mut self) -> CoreResult<()> {
        self.apply(ColorModel::Gray, equalize_histogram)
    }

    fn undo(&mut self) -> bool {
        let Some(current) = self.current.as_ref() else {
            return false;
        };
        match self.history.undo(current) {
            Some(previous) => {
                self.model = self
                    .tags
                    .undo(self.model)
                    .unwrap_or_else(|| model_for(&previous));
                self.current = Some(previous);
                true
            }
            None => false,
        }
    }

    fn redo(&mut self) -> bool {
        let Some(current) = self.current.as_ref() else {
            return false;
        };
        match self.history.redo(current) {
            Some(next) => {
                let depth = self.history.past_len();
                self.model = self
                    .tags
                    .redo(self.model, depth)
                    .unwrap_or_else(|| model_for(&next));
                self.current = Some(next);
                true
            }
            None => false,
        }
    }

    fn export_bytes(&self) -> CoreResult<Vec<u8>> {
        encode_with_extension(self.current()?, &self.config.export_format)
    }
}

/// Fallback tag for an image whose interpretation is not otherwise known.
fn model_for(image: &RasterImage) -> ColorModel {
    if image.is_grayscale() {
        ColorModel::Gray
    } else {
        ColorModel::Rgb
    }
}

/// An editing session for JavaScript.
#[wasm_bindgen]
pub struct JsSession {
    state: SessionState,
}

#[wasm_bindgen]
impl JsSession {
    /// Create a session. `config` may be `undefined` or a partial
    /// `ProcessingConfig` object; missing fields take their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsSession, JsValue> {
        let config: ProcessingConfig = if config.is_undefined() || config.is_null() {
            ProcessingConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?
        };
        SessionState::new(config)
            .map(|state| JsSession { state })
            .map_err(to_js_error)
    }

    /// Current configuration as a plain JS object.
    pub fn config(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.state.config).map_err(to_js_error)
    }

    /// Decode an encoded image (PNG, JPEG, BMP, TIFF) and start over with it.
    pub fn open_bytes(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        let image = decode_bytes(bytes).map_err(to_js_error)?;
        self.state.open(image);
        Ok(())
    }

    /// Start over with an already decoded image.
    pub fn open_image(&mut self, image: &JsRasterImage) {
        self.state.open(image.raster().clone());
    }

    #[wasm_bindgen(getter)]
    pub fn has_image(&self) -> bool {
        self.state.current.is_some()
    }

    /// The working image, if one is loaded.
    pub fn current(&self) -> Option<JsRasterImage> {
        self.state.current.clone().map(JsRasterImage::from_raster)
    }

    /// The image as it was opened.
    pub fn original(&self) -> Option<JsRasterImage> {
        self.state.original.clone().map(JsRasterImage::from_raster)
    }

    /// Color model tag of the working image ("RGB", "HSV", "CMYK", "GRAY").
    #[wasm_bindgen(getter)]
    pub fn color_model(&self) -> String {
        self.state.model.to_string()
    }

    /// Convert the working image to `model` and tag it accordingly.
    pub fn apply_color_model(&mut self, model: &str) -> Result<(), JsValue> {
        let model = parse_model(model)?;
        self.state.apply_color_model(model).map_err(to_js_error)
    }

    /// Ideal low-pass filter; `radius` defaults to the configured cutoff.
    pub fn apply_low_pass(&mut self, radius: Option<f64>) -> Result<(), JsValue> {
        self.state
            .apply_filter(FilterKind::LowPass, radius)
            .map_err(to_js_error)
    }

    /// Ideal high-pass filter; `radius` defaults to the configured cutoff.
    pub fn apply_high_pass(&mut self, radius: Option<f64>) -> Result<(), JsValue> {
        self.state
            .apply_filter(FilterKind::HighPass, radius)
            .map_err(to_js_error)
    }

    /// Replace the working image with its equalized luma.
    pub fn equalize(&mut self) -> Result<(), JsValue> {
        self.state.equalize().map_err(to_js_error)
    }

    /// Step back one state. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.state.undo()
    }

    /// Step forward one state. Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        self.state.redo()
    }

    #[wasm_bindgen(getter)]
    pub fn can_undo(&self) -> bool {
        self.state.history.can_undo()
    }

    #[wasm_bindgen(getter)]
    pub fn can_redo(&self) -> bool {
        self.state.history.can_redo()
    }

    /// Statistics of the working image.
    pub fn statistics(&self) -> Result<JsStatistics, JsValue> {
        analysis::compute_statistics(&self.current_js()?)
    }

    /// Histograms of the working image under its current color model.
    pub fn histogram(&self) -> Result<JsChannelCurves, JsValue> {
        analysis::compute_histogram(&self.current_js()?, self.state.model.as_str())
    }

    /// Channel planes of the working image under its current color model.
    pub fn decompose(&self) -> Result<js_sys::Array, JsValue> {
        analysis::decompose_channels(&self.current_js()?, self.state.model.as_str())
    }

    /// Connected components of the working image.
    pub fn components(&self) -> Result<JsLabeling, JsValue> {
        analysis::label_components(&self.current_js()?)
    }

    /// Encode the working image in the configured export format.
    pub fn export_bytes(&self) -> Result<Vec<u8>, JsValue> {
        self.state.export_bytes().map_err(to_js_error)
    }

    /// File name for an export made now: `result_<unix-millis>.<format>`.
    pub fn export_file_name(&self) -> String {
        output_file_name(js_sys::Date::now() as u128, &self.state.config.export_format)
    }
}

impl JsSession {
    fn current_js(&self) -> Result<JsRasterImage, JsValue> {
        self.state
            .current()
            .map(|img| JsRasterImage::from_raster(img.clone()))
            .map_err(to_js_error)
    }
}


/// WASM-specific tests for the exported session surface.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn png() -> Vec<u8> {
        let img = RasterImage::filled(8, 8, 3, 90).unwrap();
        imlab_core::encode_png(&img).unwrap()
    }

    #[wasm_bindgen_test]
    fn test_new_with_undefined_config() {
        let session = JsSession::new(JsValue::UNDEFINED).unwrap();
        assert!(!session.has_image());
        assert!(session.current().is_none());
    }

    #[wasm_bindgen_test]
    fn test_open_edit_undo_redo() {
        let mut session = JsSession::new(JsValue::NULL).unwrap();
        session.open_bytes(&png()).unwrap();
        assert_eq!(session.color_model(), "RGB");

        session.apply_color_model("hsv").unwrap();
        assert!(session.can_undo());
        assert!(session.undo());
        assert_eq!(session.color_model(), "RGB");
        assert!(session.redo());
        assert_eq!(session.color_model(), "HSV");
        assert!(session.export_file_name().ends_with(".png"));
    }
}
