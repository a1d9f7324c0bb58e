use crate::generate::GenerationDiagnostics;
use crate::simulate::{RunEvent, RunStatus};
use serde::Serialize;
use std::collections::HashMap;

/// Ordered record of the events of one demo run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunLog {
    events: Vec<RunEvent>,
}

#[derive(Serialize)]
struct RunExport<'a> {
    events: &'a [RunEvent],
    diag: Option<&'a GenerationDiagnostics>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: RunEvent) {
        self.events.push(event);
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn events(&self) -> &[RunEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn filter(&self, status: RunStatus) -> impl Iterator<Item = &RunEvent> {
        self.events.iter().filter(move |event| event.status == status)
    }

    pub fn history<'a>(&'a self, element_id: &'a str) -> impl Iterator<Item = &'a RunEvent> {
        self.events
            .iter()
            .filter(move |event| event.element_id == element_id)
    }

    /// Most recent status of every element seen so far.
    pub fn latest_statuses(&self) -> HashMap<String, RunStatus> {
        let mut latest = HashMap::new();
        for event in &self.events {
            latest.insert(event.element_id.clone(), event.status);
        }
        latest
    }

    pub fn terminal_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| event.status.is_terminal())
            .count()
    }

    /// `{ "events": [...], "diag": {...} | null }`, pretty-printed.
    pub fn to_export_json(&self, diag: Option<&GenerationDiagnostics>) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&RunExport {
            events: &self.events,
            diag,
        })
    }
}

impl Extend<RunEvent> for RunLog {
    fn extend<T: IntoIterator<Item = RunEvent>>(&mut self, iter: T) {
        self.events.extend(iter);
    }
}

impl FromIterator<RunEvent> for RunLog {
    fn from_iter<T: IntoIterator<Item = RunEvent>>(iter: T) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}
