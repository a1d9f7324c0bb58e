pub mod bpmn;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod generate;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod render;
pub mod run_log;
pub mod simulate;
pub mod theme;
pub mod validate;

#[cfg(feature = "cli")]
pub use cli::run;

pub use bpmn::render_bpmn;
pub use config::{Config, LayoutConfig, RenderConfig};
pub use generate::{
    GenerationConfig, GenerationDiagnostics, GenerationError, MockGenerator, ProcessGenerator,
    generate_with_retry,
};
pub use ir::{NodeKind, ProcessDocument, ProcessModel, ProcessNode, SequenceFlow};
pub use layout::{DiagramLayout, LayoutError, compute_layout};
pub use parser::parse_process;
pub use run_log::RunLog;
pub use simulate::{RunController, RunEvent, RunStatus, SimulationOptions, start_demo_run};
pub use theme::Theme;
pub use validate::{ValidationIssue, validate};

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("process is invalid: {}", .0.join("; "))]
    Invalid(Vec<String>),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Layout and BPMN XML of one process.
#[derive(Debug, Clone)]
pub struct Compiled {
    pub layout: DiagramLayout,
    pub xml: String,
}

/// Validates `model`, lays it out and serializes it.
///
/// Validation gates everything else: an invalid model never reaches layout.
pub fn compile(model: &ProcessModel, config: &LayoutConfig) -> Result<Compiled, ProcessError> {
    let errors = validate(model);
    if !errors.is_empty() {
        debug!(process = %model.id, errors = errors.len(), "validation rejected process");
        return Err(ProcessError::Invalid(errors));
    }
    let layout = compute_layout(model, config)?;
    let xml = render_bpmn(model, &layout);
    debug!(process = %model.id, bytes = xml.len(), "process compiled");
    Ok(Compiled { layout, xml })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputKind {
    #[default]
    Bpmn,
    Svg,
    Layout,
}

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub config: Config,
    pub output: OutputKind,
}

impl RenderOptions {
    pub fn bpmn() -> Self {
        Self::default()
    }

    pub fn svg() -> Self {
        Self {
            output: OutputKind::Svg,
            ..Self::default()
        }
    }
}

/// Parses process JSON and renders it in one call.
pub fn render_with_options(input: &str, options: RenderOptions) -> anyhow::Result<String> {
    let document = parse_process(input)?;
    let compiled = compile(&document.process, &options.config.layout)?;
    match options.output {
        OutputKind::Bpmn => Ok(compiled.xml),
        OutputKind::Svg => Ok(render::render_svg(
            &compiled.layout,
            &options.config.theme,
            &options.config.render,
            None,
        )),
        OutputKind::Layout => layout_dump::layout_dump_json(&compiled.layout),
    }
}

pub fn render(input: &str) -> anyhow::Result<String> {
    render_with_options(input, RenderOptions::bpmn())
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: &str = r#"{"process": {"id": "P1", "nodes": [
        {"id": "s", "type": "startEvent"},
        {"id": "t", "type": "task", "name": "Do X"},
        {"id": "e", "type": "endEvent"}
    ], "flows": [
        {"id": "f1", "source": "s", "target": "t"},
        {"id": "f2", "source": "t", "target": "e"}
    ]}}"#;

    #[test]
    fn render_produces_bpmn() {
        let xml = render(INPUT).unwrap();
        assert!(xml.contains("<bpmn:task id=\"t\" name=\"Do X\" />"));
        assert_eq!(xml.matches("<bpmndi:BPMNShape").count(), 3);
    }

    #[test]
    fn render_svg_and_layout() {
        let svg = render_with_options(INPUT, RenderOptions::svg()).unwrap();
        assert!(svg.starts_with("<svg"));
        let options = RenderOptions {
            output: OutputKind::Layout,
            ..RenderOptions::default()
        };
        let dump = render_with_options(INPUT, options).unwrap();
        assert!(dump.contains("\"process\": \"P1\""));
    }

    #[test]
    fn compile_gates_on_validation() {
        let mut model = ProcessModel::new("P");
        model
            .add_node("t", NodeKind::Task, None)
            .add_flow("f", "t", "ghost");
        match compile(&model, &LayoutConfig::default()) {
            Err(ProcessError::Invalid(errors)) => {
                assert_eq!(
                    errors,
                    vec![
                        "no start event found",
                        "no end event found",
                        "flow f references unknown nodes"
                    ]
                );
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn invalid_input_surfaces_messages() {
        let err = render(r#"{"process": {"id": "P", "nodes": [], "flows": []}}"#).unwrap_err();
        assert!(err.to_string().contains("no start event found"));
    }
}
