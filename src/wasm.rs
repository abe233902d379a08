use wasm_bindgen::prelude::*;

use crate::config::AppConfig;
use crate::model::{LayerKind, Rgb};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    let config = AppConfig::load_or_default();
    if let Err(e) = console_log::init_with_level(config.preferences.log_level.to_level()) {
        web_sys::console::log_1(&format!("Logger already initialized: {}", e).into());
    }
    log::info!("satview WASM starting...");
}

/// Approximate index for a pixel color already read from a canvas.
///
/// Returns undefined for the RGB layer or an unknown layer name.
#[wasm_bindgen(js_name = indexValue)]
pub fn index_value(layer: &str, r: u8, g: u8, b: u8) -> Option<f64> {
    let layer: LayerKind = layer.parse().ok()?;
    layer
        .index_formula()
        .map(|formula| formula.apply(Rgb::new(r, g, b)))
}
