//! imlab WASM - WebAssembly bindings for imlab
//!
//! This crate exposes the imlab-core analysis and filtering functionality to
//! JavaScript/TypeScript applications.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper for raster images
//! - `analysis` - Statistics, histograms, channel decomposition, labeling
//! - `filter` - Fourier-domain low/high-pass filters
//! - `session` - Editing session with undo/redo history and export
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsSession } from '@imlab/wasm';
//!
//! await init();
//!
//! const session = new JsSession(undefined);
//! session.open_bytes(new Uint8Array(await file.arrayBuffer()));
//! const stats = session.statistics();
//! console.log(`mean ${stats.mean}, entropy ${stats.entropy}`);
//! ```

use wasm_bindgen::prelude::*;

mod analysis;
mod filter;
mod logger;
mod session;
mod types;

// Re-export public types
pub use analysis::{
    compute_histogram, compute_statistics, decompose_channels, equalize_histogram,
    label_components, label_components_seeded, JsChannelCurves, JsChannelPlane, JsLabeling,
    JsStatistics,
};
pub use filter::{apply_filter, apply_high_pass, apply_low_pass};
pub use session::JsSession;
pub use types::JsRasterImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    logger::install(log::LevelFilter::Info);
}

/// Route core debug logging to the console (off by default).
#[wasm_bindgen]
pub fn enable_debug_logging() {
    log::set_max_level(log::LevelFilter::Debug);
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
