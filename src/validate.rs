use crate::bpmn::RESERVED_IDS;
use crate::ir::{NodeKind, ProcessModel};
use std::collections::HashSet;
use thiserror::Error;

/// A structural defect found in a [`ProcessModel`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("no start event found")]
    MissingStart,
    #[error("no end event found")]
    MissingEnd,
    #[error("gateway {0} has open edges")]
    OpenGateway(String),
    #[error("flow {0} references unknown nodes")]
    DanglingFlow(String),
    #[error("node id {0} is used more than once")]
    DuplicateNodeId(String),
    #[error("flow id {0} is used more than once")]
    DuplicateFlowId(String),
    #[error("flow id {0} collides with a node id")]
    FlowIdCollision(String),
    #[error("id {0} clashes with another id of the BPMN document")]
    DocumentIdCollision(String),
}

/// Runs every structural check and returns the issues in a fixed order:
/// start/end presence, gateways, flow endpoints, id uniqueness.
///
/// Uniqueness covers the whole serialized document: the process id, every
/// node and flow id, their `_di` diagram ids and the fixed container ids.
pub fn validate_issues(model: &ProcessModel) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if model.nodes_of_kind(NodeKind::Start).next().is_none() {
        issues.push(ValidationIssue::MissingStart);
    }
    if model.nodes_of_kind(NodeKind::End).next().is_none() {
        issues.push(ValidationIssue::MissingEnd);
    }

    for gateway in model.nodes_of_kind(NodeKind::ExclusiveGateway) {
        if model.incoming_count(&gateway.id) == 0 || model.outgoing_count(&gateway.id) == 0 {
            issues.push(ValidationIssue::OpenGateway(gateway.id.clone()));
        }
    }

    for flow in &model.flows {
        if !model.contains_node(&flow.source_id) || !model.contains_node(&flow.target_id) {
            issues.push(ValidationIssue::DanglingFlow(flow.id.clone()));
        }
    }

    let mut node_ids = HashSet::new();
    let mut reported = HashSet::new();
    for node in &model.nodes {
        if !node_ids.insert(node.id.as_str()) && reported.insert(node.id.as_str()) {
            issues.push(ValidationIssue::DuplicateNodeId(node.id.clone()));
        }
    }

    let mut flow_ids = HashSet::new();
    let mut reported = HashSet::new();
    for flow in &model.flows {
        if !flow_ids.insert(flow.id.as_str()) && reported.insert(flow.id.as_str()) {
            issues.push(ValidationIssue::DuplicateFlowId(flow.id.clone()));
        }
    }

    let mut collisions = HashSet::new();
    for flow in &model.flows {
        if node_ids.contains(flow.id.as_str()) && collisions.insert(flow.id.as_str()) {
            issues.push(ValidationIssue::FlowIdCollision(flow.id.clone()));
        }
    }

    let structural: Vec<&str> = model
        .nodes
        .iter()
        .map(|node| node.id.as_str())
        .chain(model.flows.iter().map(|flow| flow.id.as_str()))
        .collect();
    let diagram_ids: HashSet<String> = structural.iter().map(|id| format!("{id}_di")).collect();
    let is_taken = |id: &str| RESERVED_IDS.contains(&id) || diagram_ids.contains(id);

    let mut reported = HashSet::new();
    if (is_taken(&model.id) || structural.contains(&model.id.as_str()))
        && reported.insert(model.id.as_str())
    {
        issues.push(ValidationIssue::DocumentIdCollision(model.id.clone()));
    }
    for id in structural {
        if is_taken(id) && reported.insert(id) {
            issues.push(ValidationIssue::DocumentIdCollision(id.to_string()));
        }
    }

    issues
}

/// Human-readable error list; empty means the model may be laid out.
pub fn validate(model: &ProcessModel) -> Vec<String> {
    validate_issues(model)
        .iter()
        .map(ToString::to_string)
        .collect()
}
