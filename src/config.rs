use crate::generate::GenerationConfig;
use crate::simulate::SimulationOptions;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Width/height footprint of one node kind, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub width: f64,
    pub height: f64,
}

impl Footprint {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Horizontal center of column 0.
    pub base_center_x: f64,
    pub column_spacing: f64,
    pub top_margin: f64,
    pub row_spacing: f64,
    /// Fixed drop below the shallower endpoint before an edge turns across.
    pub edge_drop: f64,
    /// Share of the vertical distance added to the edge rail.
    pub edge_rail_bias: f64,
    pub event_size: Footprint,
    pub task_size: Footprint,
    pub gateway_size: Footprint,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            base_center_x: 500.0,
            column_spacing: 260.0,
            top_margin: 80.0,
            row_spacing: 140.0,
            edge_drop: 20.0,
            edge_rail_bias: 0.2,
            event_size: Footprint::new(36.0, 36.0),
            task_size: Footprint::new(150.0, 90.0),
            gateway_size: Footprint::new(50.0, 50.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
    /// Space kept around the diagram in SVG previews.
    pub padding: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#FFFFFF".to_string(),
            padding: 40.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
    pub simulation: SimulationOptions,
    pub generation: GenerationConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::bpmn_default();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
            simulation: SimulationOptions::default(),
            generation: GenerationConfig::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfig>,
    render: Option<RenderConfigFile>,
    simulation: Option<SimulationConfigFile>,
    generation: Option<GenerationConfigFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    primary_color: Option<String>,
    primary_text_color: Option<String>,
    primary_border_color: Option<String>,
    line_color: Option<String>,
    background: Option<String>,
    pending_color: Option<String>,
    running_color: Option<String>,
    success_color: Option<String>,
    failure_color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    background: Option<String>,
    padding: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SimulationConfigFile {
    base_delay_ms: Option<u64>,
    failure_rate: Option<f64>,
    seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfigFile {
    retries: Option<u32>,
    backoff_ms: Option<u64>,
}

/// Loads a JSON (or JSON5) config file on top of [`Config::default`].
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = json5::from_str(contents)?;
    let mut config = Config::default();

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "modern" {
            config.theme = Theme::modern();
        } else if theme_name == "base" || theme_name == "default" || theme_name == "bpmn" {
            config.theme = Theme::bpmn_default();
        }
        config.render.background = config.theme.background.clone();
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.primary_color {
            config.theme.primary_color = v;
        }
        if let Some(v) = vars.primary_text_color {
            config.theme.primary_text_color = v;
        }
        if let Some(v) = vars.primary_border_color {
            config.theme.primary_border_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.background {
            config.render.background = v.clone();
            config.theme.background = v;
        }
        if let Some(v) = vars.pending_color {
            config.theme.pending_color = v;
        }
        if let Some(v) = vars.running_color {
            config.theme.running_color = v;
        }
        if let Some(v) = vars.success_color {
            config.theme.success_color = v;
        }
        if let Some(v) = vars.failure_color {
            config.theme.failure_color = v;
        }
    }

    if let Some(layout) = parsed.layout {
        config.layout = layout;
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
        if let Some(v) = render.background {
            config.render.background = v;
        }
        if let Some(v) = render.padding {
            config.render.padding = v;
        }
    }

    if let Some(sim) = parsed.simulation {
        if let Some(v) = sim.base_delay_ms {
            config.simulation.base_delay_ms = v;
        }
        if let Some(v) = sim.failure_rate {
            config.simulation.failure_rate = v;
        }
        if sim.seed.is_some() {
            config.simulation.seed = sim.seed;
        }
    }

    if let Some(generation) = parsed.generation {
        if let Some(v) = generation.retries {
            config.generation.retries = v;
        }
        if let Some(v) = generation.backoff_ms {
            config.generation.backoff_ms = v;
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_footprint_dominates_events() {
        let layout = LayoutConfig::default();
        assert!(layout.task_size.width >= 2.5 * layout.event_size.width);
        assert!(layout.task_size.height >= 2.5 * layout.event_size.height);
    }

    #[test]
    fn parses_json5_overrides() {
        let config = parse_config(
            r##"{
                // comments are fine
                theme: "modern",
                themeVariables: { failureColor: "#ff0000" },
                layout: { columnSpacing: 300, eventSize: { width: 40, height: 40 } },
                simulation: { baseDelayMs: 10, failureRate: 0.5, seed: 7 },
                generation: { retries: 0 },
            }"##,
        )
        .unwrap();
        assert_eq!(config.theme.failure_color, "#ff0000");
        assert_eq!(config.theme.font_family, Theme::modern().font_family);
        assert_eq!(config.layout.column_spacing, 300.0);
        assert_eq!(config.layout.row_spacing, 140.0);
        assert_eq!(config.layout.event_size, Footprint::new(40.0, 40.0));
        assert_eq!(config.simulation.base_delay_ms, 10);
        assert_eq!(config.simulation.failure_rate, 0.5);
        assert_eq!(config.simulation.seed, Some(7));
        assert_eq!(config.generation.retries, 0);
        assert_eq!(config.generation.backoff_ms, 500);
    }

    #[test]
    fn layout_keys_are_camel_case() {
        let config = parse_config(r#"{ "layout": { "rowSpacing": 200, "edgeRailBias": 0.5 } }"#)
            .unwrap();
        assert_eq!(config.layout.row_spacing, 200.0);
        assert_eq!(config.layout.edge_rail_bias, 0.5);

        let config = parse_config(r#"{ "layout": { "row_spacing": 200 } }"#).unwrap();
        assert_eq!(config.layout.row_spacing, 140.0);
    }

    #[test]
    fn missing_path_yields_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.layout.base_center_x, 500.0);
        assert_eq!(config.simulation.base_delay_ms, 600);
    }
}
