//! Demo run simulator.
//!
//! Replays a process as a synthetic execution: every node, in model order,
//! goes through `pending -> running -> success | failure`, with randomized
//! timing and injected failures. A failed node is retried once and the retry
//! always succeeds. This is a visualisation aid, not a workflow engine.

use crate::ir::ProcessModel;
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const MESSAGE_OK: &str = "OK";
pub const MESSAGE_FAILURE: &str = "Demo-Fehler";
pub const MESSAGE_RETRY: &str = "Retry";
pub const MESSAGE_RETRY_SUCCESS: &str = "Erfolg nach Retry";

static FAILURE_EXEMPT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)start|end").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Pending,
    Running,
    Success,
    Failure,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failure)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunEvent {
    pub element_id: String,
    pub status: RunStatus,
    /// Wall-clock milliseconds since the Unix epoch.
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RunEvent {
    fn now(element_id: &str, status: RunStatus) -> Self {
        Self {
            element_id: element_id.to_string(),
            status,
            timestamp: epoch_millis(),
            duration_ms: None,
            message: None,
        }
    }

    fn with_duration(mut self, since: Instant) -> Self {
        self.duration_ms = Some(since.elapsed().as_millis() as u64);
        self
    }

    fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationOptions {
    pub base_delay_ms: u64,
    /// Probability in `[0, 1]` that a non-exempt node fails its first attempt.
    pub failure_rate: f64,
    /// Fixed seed for a reproducible run; seeded from the clock when absent.
    pub seed: Option<u64>,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            base_delay_ms: 600,
            failure_rate: 0.15,
            seed: None,
        }
    }
}

impl SimulationOptions {
    fn delay(&self, factor: f64) -> Duration {
        Duration::from_secs_f64((self.base_delay_ms as f64 * factor).max(0.0) / 1000.0)
    }
}

/// Handle to a spawned demo run.
#[derive(Debug)]
pub struct RunController {
    cancel: CancellationToken,
    handle: JoinHandle<usize>,
}

impl RunController {
    /// Requests a stop. The run exits at its next checkpoint; a delay that is
    /// already sleeping is not cut short.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the run to end and returns how many nodes reached a
    /// terminal status.
    pub async fn wait(self) -> usize {
        match self.handle.await {
            Ok(completed) => completed,
            Err(err) => {
                warn!(error = %err, "demo run task ended abnormally");
                0
            }
        }
    }
}

/// Spawns a demo run of `model` on the current tokio runtime.
///
/// Events are handed to `on_event` one at a time, in emission order.
pub fn start_demo_run<F>(model: &ProcessModel, options: SimulationOptions, on_event: F) -> RunController
where
    F: FnMut(RunEvent) + Send + 'static,
{
    let order: Vec<String> = model.nodes.iter().map(|node| node.id.clone()).collect();
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(run_demo(order, options, cancel.clone(), on_event));
    RunController { cancel, handle }
}

/// Walks `order` sequentially and emits the lifecycle of each node.
///
/// `cancel` is checked before every transition. Returns the number of nodes
/// that reached a terminal status.
pub async fn run_demo<F>(
    order: Vec<String>,
    options: SimulationOptions,
    cancel: CancellationToken,
    mut on_event: F,
) -> usize
where
    F: FnMut(RunEvent),
{
    let mut rng = StdRng::seed_from_u64(options.seed.unwrap_or_else(clock_seed));
    let failure_rate = options.failure_rate.clamp(0.0, 1.0);
    let mut emit = |event: RunEvent| {
        debug!(
            element = %event.element_id,
            status = event.status.as_str(),
            duration_ms = ?event.duration_ms,
            "demo run event"
        );
        on_event(event);
    };

    info!(
        nodes = order.len(),
        base_delay_ms = options.base_delay_ms,
        failure_rate,
        "demo run started"
    );

    let mut completed = 0;
    'nodes: for id in &order {
        if cancel.is_cancelled() {
            break;
        }
        let started = Instant::now();
        emit(RunEvent::now(id, RunStatus::Pending));

        tokio::time::sleep(options.delay(0.5)).await;
        if cancel.is_cancelled() {
            break;
        }
        emit(RunEvent::now(id, RunStatus::Running));

        let jitter: f64 = rng.gen_range(0.0..1.0);
        tokio::time::sleep(options.delay(1.0 + jitter)).await;
        if cancel.is_cancelled() {
            break;
        }
        let roll: f64 = rng.gen_range(0.0..1.0);
        let failed = roll < failure_rate && !FAILURE_EXEMPT_RE.is_match(id);
        if !failed {
            emit(
                RunEvent::now(id, RunStatus::Success)
                    .with_duration(started)
                    .with_message(MESSAGE_OK),
            );
            completed += 1;
            continue;
        }

        emit(
            RunEvent::now(id, RunStatus::Failure)
                .with_duration(started)
                .with_message(MESSAGE_FAILURE),
        );
        completed += 1;

        tokio::time::sleep(options.delay(0.6)).await;
        if cancel.is_cancelled() {
            break 'nodes;
        }
        emit(RunEvent::now(id, RunStatus::Running).with_message(MESSAGE_RETRY));

        tokio::time::sleep(options.delay(1.0)).await;
        if cancel.is_cancelled() {
            break 'nodes;
        }
        emit(
            RunEvent::now(id, RunStatus::Success)
                .with_duration(started)
                .with_message(MESSAGE_RETRY_SUCCESS),
        );
    }

    if cancel.is_cancelled() {
        info!(completed, "demo run stopped");
    } else {
        info!(completed, "demo run finished");
    }
    completed
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
