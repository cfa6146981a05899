//! Browser bindings for the HCM project timeline.
//!
//! `TimelineHandle` (wasm32 only) mounts a view on a `<canvas>` and wires DOM
//! events into it. The free functions below are stateless helpers for pages
//! that only need period math or an SVG snapshot.

pub mod bridge;
#[cfg(target_arch = "wasm32")]
mod canvas;
#[cfg(target_arch = "wasm32")]
mod handle;
pub mod registry;

#[cfg(target_arch = "wasm32")]
pub use canvas::{CanvasSurface, DomResolver};
#[cfg(target_arch = "wasm32")]
pub use handle::TimelineHandle;

use wasm_bindgen::prelude::*;

/// Periods covering `[minDate, maxDate]` as JSON `[{ start, end, label }]`.
#[wasm_bindgen(js_name = timePeriods)]
pub fn time_periods(min_date: &str, max_date: &str, granularity: &str) -> Result<String, JsError> {
    bridge::periods_json(min_date, max_date, granularity).map_err(|e| JsError::new(&e.to_string()))
}

/// Render a dataset (object or API rows) to an SVG document.
#[wasm_bindgen(js_name = exportSvg)]
pub fn export_svg(
    dataset_json: &str,
    config_json: Option<String>,
    width: f64,
    today: Option<String>,
) -> Result<String, JsError> {
    bridge::export_svg(dataset_json, config_json.as_deref(), width, today.as_deref())
        .map_err(|e| JsError::new(&e.to_string()))
}
