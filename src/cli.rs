use crate::config::{Config, load_config};
use crate::generate::{GenerationDiagnostics, MockGenerator, generate_with_retry};
use crate::ir::{ProcessDocument, ProcessModel};
use crate::layout_dump::{layout_dump_json, write_layout_dump};
use crate::parser::parse_process;
use crate::render::{render_svg, write_output_svg};
use crate::run_log::RunLog;
use crate::simulate::{SimulationOptions, start_demo_run};
use crate::validate::validate;
use crate::{ProcessError, compile};
use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(name = "bpmnr", version, about = "Process graph to BPMN 2.0 compiler and demo runner")]
pub struct Args {
    /// Input file (.json) or '-' for stdin
    #[arg(short = 'i', long = "input", conflicts_with = "prompt")]
    pub input: Option<PathBuf>,

    /// Generate the process from a text description with the offline generator
    #[arg(short = 'p', long = "prompt")]
    pub prompt: Option<String>,

    /// Output file. Defaults to stdout except for PNG.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "bpmn")]
    pub output_format: OutputFormat,

    /// Config JSON/JSON5 file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Only validate the process and list its errors
    #[arg(long = "validate", conflicts_with = "simulate")]
    pub validate: bool,

    /// Run the demo simulation and write the run JSON
    #[arg(long = "simulate")]
    pub simulate: bool,

    /// Base delay of the demo run in milliseconds
    #[arg(long = "base-delay")]
    pub base_delay: Option<u64>,

    /// Failure probability of the demo run (0..1)
    #[arg(long = "failure-rate")]
    pub failure_rate: Option<f64>,

    /// Seed for a reproducible demo run
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Log debug output to stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Bpmn,
    Svg,
    Png,
    Layout,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;
    execute(&args)
}

fn init_tracing(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow::anyhow!("Failed to create env filter: {e}"))?;
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_writer(io::stderr);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    Ok(())
}

fn execute(args: &Args) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, args);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let (document, diag) = load_document(args, &config, &runtime)?;
    let model = &document.process;

    if args.validate {
        let errors = validate(model);
        if errors.is_empty() {
            println!("{}: valid", model.id);
            return Ok(());
        }
        for error in &errors {
            println!("- {error}");
        }
        bail!("{} validation error(s)", errors.len());
    }

    let compiled = match compile(model, &config.layout) {
        Ok(compiled) => compiled,
        Err(ProcessError::Invalid(errors)) => {
            for error in &errors {
                eprintln!("- {error}");
            }
            bail!("process {} is invalid ({} error(s))", model.id, errors.len());
        }
        Err(err) => return Err(err.into()),
    };

    if args.simulate {
        let log = runtime.block_on(simulate(model, config.simulation.clone()));
        info!(
            events = log.len(),
            terminal = log.terminal_count(),
            "demo run recorded"
        );
        return write_text(&log.to_export_json(diag.as_ref())?, args.output.as_deref());
    }

    match args.output_format {
        OutputFormat::Bpmn => write_text(&compiled.xml, args.output.as_deref()),
        OutputFormat::Svg => {
            let svg = render_svg(&compiled.layout, &config.theme, &config.render, None);
            write_output_svg(&svg, args.output.as_deref())
        }
        OutputFormat::Layout => match args.output.as_deref() {
            Some(path) => write_layout_dump(path, &compiled.layout),
            None => write_text(&layout_dump_json(&compiled.layout)?, None),
        },
        #[cfg(feature = "png")]
        OutputFormat::Png => {
            let svg = render_svg(&compiled.layout, &config.theme, &config.render, None);
            let output = ensure_output(&args.output, "png")?;
            crate::render::write_output_png(&svg, &output, &config.render, &config.theme)
        }
        #[cfg(not(feature = "png"))]
        OutputFormat::Png => bail!("PNG output requires the `png` feature"),
    }
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }
    if let Some(delay) = args.base_delay {
        config.simulation.base_delay_ms = delay;
    }
    if let Some(rate) = args.failure_rate {
        config.simulation.failure_rate = rate;
    }
    if args.seed.is_some() {
        config.simulation.seed = args.seed;
    }
}

fn load_document(
    args: &Args,
    config: &Config,
    runtime: &tokio::runtime::Runtime,
) -> Result<(ProcessDocument, Option<GenerationDiagnostics>)> {
    if let Some(prompt) = args.prompt.as_deref() {
        let (result, diag) = runtime.block_on(generate_with_retry(
            &MockGenerator,
            prompt,
            &[],
            &config.generation,
        ));
        return Ok((result?, Some(diag)));
    }
    let input = read_input(args.input.as_deref())?;
    Ok((parse_process(&input)?, None))
}

/// Runs the demo to completion, stopping early on Ctrl-C.
async fn simulate(model: &ProcessModel, options: SimulationOptions) -> RunLog {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let controller = start_demo_run(model, options, move |event| {
        let _ = tx.send(event);
    });

    let mut log = RunLog::new();
    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(event) => log.push(event),
                None => break,
            },
            _ = tokio::signal::ctrl_c(), if !controller.is_stopped() => {
                warn!("interrupted, stopping demo run");
                controller.stop();
            }
        }
    }
    controller.wait().await;
    log
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn write_text(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, text)?,
        None => println!("{text}"),
    }
    Ok(())
}

#[cfg(feature = "png")]
fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("bpmnr-{}-{name}", std::process::id()))
    }

    #[test]
    fn parses_flags() {
        let args = Args::try_parse_from([
            "bpmnr",
            "-i",
            "order.json",
            "-e",
            "layout",
            "--simulate",
            "--base-delay",
            "5",
            "--failure-rate",
            "0.5",
            "--seed",
            "9",
        ])
        .unwrap();
        assert_eq!(args.output_format, OutputFormat::Layout);
        assert!(args.simulate);

        let mut config = Config::default();
        apply_overrides(&mut config, &args);
        assert_eq!(config.simulation.base_delay_ms, 5);
        assert_eq!(config.simulation.failure_rate, 0.5);
        assert_eq!(config.simulation.seed, Some(9));
        assert_eq!(config.render.width, 1200.0);
    }

    #[test]
    fn prompt_conflicts_with_input() {
        assert!(Args::try_parse_from(["bpmnr", "-i", "a.json", "--prompt", "x"]).is_err());
        assert!(Args::try_parse_from(["bpmnr", "--validate", "--simulate"]).is_err());
    }

    #[test]
    fn prompt_to_bpmn_file() {
        let output = temp_path("prompt.bpmn");
        let args = Args::try_parse_from([
            "bpmnr",
            "--prompt",
            "Pack; Ship",
            "-o",
            output.to_str().unwrap(),
        ])
        .unwrap();
        execute(&args).unwrap();
        let xml = std::fs::read_to_string(&output).unwrap();
        let _ = std::fs::remove_file(&output);
        assert!(xml.contains("<bpmn:task id=\"Activity_2\" name=\"Ship\" />"));
        assert!(xml.contains("<bpmn:endEvent id=\"EndEvent_3\" name=\"Ende\" />"));
    }

    #[test]
    fn simulate_writes_run_json_with_diag() {
        let output = temp_path("run.json");
        let args = Args::try_parse_from([
            "bpmnr",
            "--prompt",
            "Pack",
            "--simulate",
            "--base-delay",
            "0",
            "--seed",
            "1",
            "-o",
            output.to_str().unwrap(),
        ])
        .unwrap();
        execute(&args).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        let _ = std::fs::remove_file(&output);
        assert_eq!(json["diag"]["provider"], "mock");
        let events = json["events"].as_array().unwrap();
        assert_eq!(events.first().unwrap()["elementId"], "StartEvent_1");
        assert_eq!(events.last().unwrap()["elementId"], "EndEvent_2");
        assert_eq!(events.last().unwrap()["status"], "success");
    }

    #[test]
    fn invalid_input_fails() {
        let input = temp_path("invalid.json");
        std::fs::write(&input, r#"{"process": {"id": "P", "nodes": [], "flows": []}}"#).unwrap();
        let args =
            Args::try_parse_from(["bpmnr", "-i", input.to_str().unwrap(), "--validate"]).unwrap();
        let err = execute(&args).unwrap_err();
        let _ = std::fs::remove_file(&input);
        assert!(err.to_string().contains("2 validation error(s)"));
    }
}
