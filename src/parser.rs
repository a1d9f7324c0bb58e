use crate::ir::{ProcessDocument, ProcessModel};
use anyhow::{Context, Result, anyhow, bail};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json5?|JSON5?)?\s*(.*?)\s*```").unwrap());

/// Parses a process graph from JSON text.
///
/// Accepts the `{ "process": { ... } }` envelope or a bare model object, in
/// strict JSON or JSON5. Text around the object (prose, a Markdown code fence)
/// is tolerated: the fenced block is tried first, then the span from the first
/// `{` to the last `}`.
pub fn parse_process(input: &str) -> Result<ProcessDocument> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        bail!("empty process input");
    }
    if !trimmed.contains('{') {
        bail!("no JSON object found in input");
    }

    let mut candidates = vec![trimmed];
    if let Some(fenced) = FENCE_RE.captures(trimmed).and_then(|caps| caps.get(1)) {
        candidates.push(fenced.as_str());
    }
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            candidates.push(&trimmed[start..=end]);
        }
    }

    let mut last_err = None;
    for candidate in candidates {
        match parse_candidate(candidate) {
            Ok(document) => return Ok(document),
            Err(err) => last_err = Some(err),
        }
    }
    Err(last_err.unwrap_or_else(|| anyhow!("no JSON object found in input")))
}

fn parse_candidate(text: &str) -> Result<ProcessDocument> {
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(_) => json5::from_str(text).context("input is neither JSON nor JSON5")?,
    };
    document_from_value(value)
}

fn document_from_value(value: Value) -> Result<ProcessDocument> {
    if value.get("process").is_some() {
        return serde_json::from_value(value).context("invalid process document");
    }
    if value.get("nodes").is_some() {
        let model: ProcessModel = serde_json::from_value(value).context("invalid process model")?;
        return Ok(ProcessDocument::from(model));
    }
    bail!("expected a `process` object or a model with `nodes`")
}
