//! Prompt-to-process generation.
//!
//! Real text-to-graph services live outside this crate; they plug in through
//! [`ProcessGenerator`]. [`MockGenerator`] is the deterministic offline
//! implementation used by the CLI and tests, and [`generate_with_retry`]
//! wraps any generator with bounded retries and diagnostics.

use crate::ir::{NodeKind, ProcessDocument, ProcessModel};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

static STEP_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n|\.|;|->").unwrap());

const DEFAULT_PROMPT: &str = "Start; Schritt; Ende";
const DEFAULT_STEPS: [&str; 3] = ["Prozess starten", "Schritt ausführen", "Prozess beenden"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("generator request failed: {0}")]
    Request(String),
    #[error("generator returned an unusable document: {0}")]
    InvalidDocument(String),
}

/// Turns a free-text description into a process document.
///
/// `known_errors` carries validation messages from a previous attempt so a
/// generator can correct itself; implementations may ignore it.
pub trait ProcessGenerator {
    fn name(&self) -> &str;

    fn generate(
        &self,
        prompt: &str,
        known_errors: &[String],
    ) -> impl Future<Output = Result<ProcessDocument, GenerationError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Extra attempts after the first failure.
    pub retries: u32,
    /// Delay before the first retry; doubles for each further retry.
    pub backoff_ms: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            retries: 2,
            backoff_ms: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationDiagnostics {
    pub provider: String,
    pub ok: bool,
    pub attempts: u32,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Calls `generator` until it succeeds or `config.retries` extra attempts are
/// used up, sleeping `backoff_ms`, `2 * backoff_ms`, ... between attempts.
///
/// Diagnostics are produced for both outcomes.
pub async fn generate_with_retry<G>(
    generator: &G,
    prompt: &str,
    known_errors: &[String],
    config: &GenerationConfig,
) -> (Result<ProcessDocument, GenerationError>, GenerationDiagnostics)
where
    G: ProcessGenerator,
{
    let started = Instant::now();
    let mut backoff = Duration::from_millis(config.backoff_ms);
    let mut attempts = 0;
    let result = loop {
        attempts += 1;
        match generator.generate(prompt, known_errors).await {
            Ok(document) => break Ok(document),
            Err(err) if attempts <= config.retries => {
                warn!(
                    provider = generator.name(),
                    attempt = attempts,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %err,
                    "generation attempt failed, retrying"
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
            Err(err) => break Err(err),
        }
    };

    let diagnostics = GenerationDiagnostics {
        provider: generator.name().to_string(),
        ok: result.is_ok(),
        attempts,
        duration_ms: started.elapsed().as_millis() as u64,
        error: result.as_ref().err().map(|err| err.to_string()),
    };
    match &result {
        Ok(document) => info!(
            provider = %diagnostics.provider,
            attempts,
            nodes = document.process.nodes.len(),
            "process generated"
        ),
        Err(err) => warn!(provider = %diagnostics.provider, attempts, error = %err, "generation failed"),
    }
    (result, diagnostics)
}

/// Offline generator that turns each sentence-like fragment of the prompt
/// into one task of a linear process.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockGenerator;

impl MockGenerator {
    pub fn build(&self, prompt: &str) -> ProcessDocument {
        let prompt = if prompt.is_empty() { DEFAULT_PROMPT } else { prompt };
        let steps = extract_steps(prompt);

        let mut model = ProcessModel::new("Process_1");
        model.name = Some("Generated Process".to_string());

        let start_id = stable_id("StartEvent", 0);
        model.add_node(&start_id, NodeKind::Start, Some("Start"));
        let mut last_id = start_id;
        for (idx, step) in steps.iter().enumerate() {
            let task_id = stable_id("Activity", idx);
            model
                .add_node(&task_id, NodeKind::Task, Some(step.as_str()))
                .add_flow(&stable_id("Flow", idx), &last_id, &task_id);
            last_id = task_id;
        }
        let end_id = stable_id("EndEvent", steps.len());
        model
            .add_node(&end_id, NodeKind::End, Some("Ende"))
            .add_flow(&stable_id("Flow", steps.len()), &last_id, &end_id);

        ProcessDocument::from(model)
    }
}

impl ProcessGenerator for MockGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    fn generate(
        &self,
        prompt: &str,
        known_errors: &[String],
    ) -> impl Future<Output = Result<ProcessDocument, GenerationError>> + Send {
        if !known_errors.is_empty() {
            debug!(count = known_errors.len(), "mock generator ignores known errors");
        }
        let document = self.build(prompt);
        async move { Ok(document) }
    }
}

/// Extracts a process document from a free-text generator reply, such as a
/// chat completion that wraps the JSON in prose or a code fence.
pub fn document_from_reply(reply: &str) -> Result<ProcessDocument, GenerationError> {
    crate::parser::parse_process(reply)
        .map_err(|err| GenerationError::InvalidDocument(err.to_string()))
}

fn stable_id(prefix: &str, index: usize) -> String {
    format!("{prefix}_{}", index + 1)
}

fn extract_steps(text: &str) -> Vec<String> {
    let mut steps: Vec<String> = Vec::new();
    for fragment in STEP_SPLIT_RE.split(text) {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            continue;
        }
        let repeated = steps
            .last()
            .is_some_and(|last| last.to_lowercase() == fragment.to_lowercase());
        if !repeated {
            steps.push(fragment.to_string());
        }
    }
    if steps.is_empty() {
        return DEFAULT_STEPS.iter().map(|step| step.to_string()).collect();
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Flaky {
        failures: u32,
        calls: AtomicU32,
    }

    impl Flaky {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
            }
        }
    }

    impl ProcessGenerator for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }

        fn generate(
            &self,
            prompt: &str,
            _known_errors: &[String],
        ) -> impl Future<Output = Result<ProcessDocument, GenerationError>> + Send {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let result = if call < self.failures {
                Err(GenerationError::Request(format!("status 503 on call {call}")))
            } else {
                Ok(MockGenerator.build(prompt))
            };
            async move { result }
        }
    }

    #[test]
    fn steps_split_on_delimiters() {
        assert_eq!(
            extract_steps("Receive order -> Check stock. Ship;\nInvoice"),
            vec!["Receive order", "Check stock", "Ship", "Invoice"]
        );
    }

    #[test]
    fn consecutive_duplicates_collapse_case_insensitively() {
        assert_eq!(
            extract_steps("Check; check ; CHECK. Ship; Check"),
            vec!["Check", "Ship", "Check"]
        );
    }

    #[test]
    fn delimiter_only_prompt_uses_default_steps() {
        assert_eq!(extract_steps(" ; . -> \n"), DEFAULT_STEPS.to_vec());
    }

    #[test]
    fn mock_document_is_a_valid_chain() {
        let document = MockGenerator.build("Pack; Ship");
        let model = &document.process;
        assert_eq!(model.id, "Process_1");
        assert_eq!(model.name.as_deref(), Some("Generated Process"));
        let ids: Vec<&str> = model.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["StartEvent_1", "Activity_1", "Activity_2", "EndEvent_3"]);
        let flows: Vec<(&str, &str, &str)> = model
            .flows
            .iter()
            .map(|f| (f.id.as_str(), f.source_id.as_str(), f.target_id.as_str()))
            .collect();
        assert_eq!(
            flows,
            vec![
                ("Flow_1", "StartEvent_1", "Activity_1"),
                ("Flow_2", "Activity_1", "Activity_2"),
                ("Flow_3", "Activity_2", "EndEvent_3"),
            ]
        );
        assert!(validate(model).is_empty());
    }

    #[test]
    fn empty_prompt_uses_default_prompt() {
        let document = MockGenerator.build("");
        let labels: Vec<&str> = document
            .process
            .nodes_of_kind(NodeKind::Task)
            .filter_map(|n| n.label.as_deref())
            .collect();
        assert_eq!(labels, vec!["Start", "Schritt", "Ende"]);
    }

    #[test]
    fn reply_with_prose_is_accepted() {
        let reply = "Here you go:\n```json\n{\"process\": {\"id\": \"P\", \"nodes\": [], \"flows\": []}}\n```";
        assert_eq!(document_from_reply(reply).unwrap().process.id, "P");
        assert!(matches!(
            document_from_reply("no json here"),
            Err(GenerationError::InvalidDocument(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn retry_recovers_after_transient_failures() {
        let generator = Flaky::new(2);
        let started = Instant::now();
        let (result, diag) =
            generate_with_retry(&generator, "A; B", &[], &GenerationConfig::default()).await;
        assert!(result.is_ok());
        assert_eq!(diag.attempts, 3);
        assert!(diag.ok);
        assert_eq!(diag.provider, "flaky");
        assert!(diag.error.is_none());
        // 500 ms then 1000 ms of backoff.
        assert!(started.elapsed() >= Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn retry_gives_up_and_reports() {
        let generator = Flaky::new(10);
        let config = GenerationConfig {
            retries: 1,
            backoff_ms: 10,
        };
        let (result, diag) = generate_with_retry(&generator, "A", &[], &config).await;
        assert!(matches!(result, Err(GenerationError::Request(_))));
        assert_eq!(diag.attempts, 2);
        assert!(!diag.ok);
        assert!(diag.error.unwrap().contains("503"));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn diagnostics_serialize_in_camel_case() {
        let (_, diag) =
            generate_with_retry(&MockGenerator, "A", &[], &GenerationConfig::default()).await;
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["provider"], "mock");
        assert_eq!(json["attempts"], 1);
        assert!(json.get("durationMs").is_some());
        assert!(json.get("error").is_none());
    }
}
