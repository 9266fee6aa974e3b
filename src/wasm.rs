//! WASM bindings for decorating pages in the browser.

use wasm_bindgen::prelude::*;

use crate::config::Config;
use crate::dom::Marker;
use crate::xref::{Hosts, PatternSet, decorate_html};

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_err(e: crate::Error) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Decorate `html` with the standard rules and default hosts.
///
/// `marker` is a class name or CSS selector.
#[wasm_bindgen]
pub fn decorate(html: &str, marker: &str) -> Result<String, JsValue> {
    let marker = Marker::parse(marker).map_err(js_err)?;
    let patterns = PatternSet::standard(&Hosts::default()).map_err(js_err)?;
    Ok(decorate_html(html, &marker, &patterns))
}

/// Decorate `html` using hosts or custom rules from a JSON configuration.
#[wasm_bindgen]
pub fn decorate_with_config(html: &str, marker: &str, config_json: &str) -> Result<String, JsValue> {
    let marker = Marker::parse(marker).map_err(js_err)?;
    let patterns = Config::from_json(config_json)
        .and_then(|config| config.patterns())
        .map_err(js_err)?;
    Ok(decorate_html(html, &marker, &patterns))
}
