//! Frequency filter WASM bindings.
//!
//! Stateless versions of the filters a session applies; the result is always a
//! new single-channel image.

use imlab_core::{apply_frequency_filter, FilterKind, MaskProfile};
use wasm_bindgen::prelude::*;

use crate::types::{to_js_error, JsRasterImage};

/// Ideal low-pass filter with cutoff `radius` (in frequency bins).
#[wasm_bindgen]
pub fn apply_low_pass(image: &JsRasterImage, radius: f64) -> Result<JsRasterImage, JsValue> {
    filter(image, FilterKind::LowPass, MaskProfile::Ideal, radius)
}

/// Ideal high-pass filter with cutoff `radius` (in frequency bins).
#[wasm_bindgen]
pub fn apply_high_pass(image: &JsRasterImage, radius: f64) -> Result<JsRasterImage, JsValue> {
    filter(image, FilterKind::HighPass, MaskProfile::Ideal, radius)
}

/// Filter with a named mask profile.
///
/// # Arguments
/// * `high_pass` - Pass frequencies outside the disc instead of inside
/// * `profile` - "ideal", "gaussian" or "butterworth"
/// * `order` - Butterworth order (ignored by the other profiles)
#[wasm_bindgen]
pub fn apply_filter(
    image: &JsRasterImage,
    high_pass: bool,
    profile: &str,
    order: u32,
    radius: f64,
) -> Result<JsRasterImage, JsValue> {
    let profile = profile_from_str(profile, order)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown mask profile: {}", profile)))?;
    let kind = if high_pass {
        FilterKind::HighPass
    } else {
        FilterKind::LowPass
    };
    filter(image, kind, profile, radius)
}

fn filter(
    image: &JsRasterImage,
    kind: FilterKind,
    profile: MaskProfile,
    radius: f64,
) -> Result<JsRasterImage, JsValue> {
    apply_frequency_filter(image.raster(), kind, profile, radius)
        .map(JsRasterImage::from_raster)
        .map_err(to_js_error)
}

fn profile_from_str(name: &str, order: u32) -> Option<MaskProfile> {
    match name.to_ascii_lowercase().as_str() {
        "ideal" => Some(MaskProfile::Ideal),
        "gaussian" => Some(MaskProfile::Gaussian),
        "butterworth" => Some(MaskProfile::Butterworth {
            order: order.max(1),
        }),
        _ => None,
    }
}
