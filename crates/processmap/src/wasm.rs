//! WebAssembly bindings for processmap
//!
//! Browser-facing wrappers around the codec. Diagrams cross the boundary as
//! their JSON form; errors become JavaScript exceptions.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use crate::core::{Diagram, Notation};
#[cfg(target_arch = "wasm32")]
use crate::plugins::notation::NotationConfig;

#[cfg(target_arch = "wasm32")]
fn to_js<E: std::fmt::Display>(err: E) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Initialize WASM module
///
/// Sets up panic hooks and logging for better error messages in the browser.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    // Logs go to the browser console
    use crate::core::logging::init_logging;
    let _ = init_logging(Some("info"), None);
}

/// Decode draw.io XML and return the diagram as JSON
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn decode_drawio(xml: &str) -> Result<String, JsValue> {
    let diagram = crate::decode(xml).map_err(to_js)?;
    diagram.to_json().map_err(to_js)
}

/// Encode a diagram given as JSON into draw.io XML
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn encode_drawio(diagram_json: &str) -> Result<String, JsValue> {
    let diagram = Diagram::from_json(diagram_json).map_err(to_js)?;
    crate::encode(&diagram).map_err(to_js)
}

/// Notation tag (`vad`, `epc`, `org`, `bpmn`) of a draw.io document
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn detect_notation(xml: &str) -> Result<String, JsValue> {
    let notation = crate::detect_notation(xml).map_err(to_js)?;
    Ok(notation.as_str().to_string())
}

/// Validation report of a diagram given as JSON
///
/// # Returns
/// * JSON string with fields: isValid, errors, warnings
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn validate_diagram(diagram_json: &str) -> Result<String, JsValue> {
    let diagram = Diagram::from_json(diagram_json).map_err(to_js)?;
    serde_json::to_string(&diagram.validate()).map_err(to_js)
}

/// New element from the built-in catalogue, as JSON
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn create_element(notation: &str, stencil: &str) -> Result<String, JsValue> {
    let notation = notation.parse::<Notation>().map_err(to_js)?;
    let element = NotationConfig::default()
        .create_element(notation, stencil)
        .map_err(to_js)?;
    element.to_json().map_err(to_js)
}

#[cfg(not(target_arch = "wasm32"))]
pub mod wasm {
    //! Placeholder module for non-WASM builds
    //!
    //! This module is only available when compiling for WASM targets.
}
