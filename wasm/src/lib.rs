use bpmn_rs_renderer::{OutputKind, RenderOptions, Theme, parse_process, render_with_options, validate};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BpmnRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    column_spacing: Option<f64>,
    row_spacing: Option<f64>,
    svg: Option<bool>,
}

fn build_render_options(options: BpmnRenderOptions) -> RenderOptions {
    let mut render_options = RenderOptions::bpmn();
    if options.theme.as_deref() == Some("modern") {
        render_options.config.theme = Theme::modern();
    }
    if let Some(font_family) = options.font_family {
        render_options.config.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        render_options.config.theme.font_size = font_size;
    }
    if let Some(spacing) = options.column_spacing {
        render_options.config.layout.column_spacing = spacing;
    }
    if let Some(spacing) = options.row_spacing {
        render_options.config.layout.row_spacing = spacing;
    }
    if options.svg == Some(true) {
        render_options.output = OutputKind::Svg;
    }
    render_options
}

/// Compiles process JSON to BPMN XML (or an SVG preview with `{"svg": true}`).
#[wasm_bindgen]
pub fn process_json_to_bpmn(json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<BpmnRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        BpmnRenderOptions::default()
    };

    render_with_options(json, build_render_options(options))
        .map_err(|error| JsValue::from_str(&error.to_string()))
}

/// Returns the validation errors of process JSON as a JSON array of strings.
#[wasm_bindgen]
pub fn validate_process_json(json: &str) -> Result<String, JsValue> {
    let document = parse_process(json).map_err(|error| JsValue::from_str(&error.to_string()))?;
    let errors = validate(&document.process);
    serde_json::to_string(&errors).map_err(|error| JsValue::from_str(&error.to_string()))
}
