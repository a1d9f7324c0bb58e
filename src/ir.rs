use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    #[serde(rename = "startEvent", alias = "start")]
    Start,
    #[serde(rename = "endEvent", alias = "end")]
    End,
    #[serde(rename = "task")]
    Task,
    #[serde(rename = "exclusiveGateway")]
    ExclusiveGateway,
}

impl NodeKind {
    /// Local element name inside the `bpmn:` namespace.
    pub fn element_name(self) -> &'static str {
        match self {
            Self::Start => "startEvent",
            Self::End => "endEvent",
            Self::Task => "task",
            Self::ExclusiveGateway => "exclusiveGateway",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(rename = "name", default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ProcessNode {
    pub fn new(id: impl Into<String>, kind: NodeKind, label: Option<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceFlow {
    pub id: String,
    #[serde(rename = "source")]
    pub source_id: String,
    #[serde(rename = "target")]
    pub target_id: String,
}

impl SequenceFlow {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source_id: source.into(),
            target_id: target.into(),
        }
    }
}

/// A process graph in insertion order.
///
/// Nothing is checked at construction time: flows may reference unknown
/// nodes and ids may repeat. Run [`crate::validate::validate`] before laying
/// the model out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessModel {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub nodes: Vec<ProcessNode>,
    #[serde(default)]
    pub flows: Vec<SequenceFlow>,
}

/// The `{ "process": { ... } }` envelope exchanged with graph generators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDocument {
    pub process: ProcessModel,
}

/// Successor and predecessor lists keyed by node id, in flow declaration order.
///
/// Flows that mention unknown ids still get entries so queries stay total on
/// malformed models.
#[derive(Debug, Clone, Default)]
pub struct Adjacency<'a> {
    outgoing: HashMap<&'a str, Vec<&'a str>>,
    incoming: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> Adjacency<'a> {
    pub fn outgoing(&self, node_id: &str) -> &[&'a str] {
        self.outgoing
            .get(node_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn incoming(&self, node_id: &str) -> &[&'a str] {
        self.incoming
            .get(node_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

impl ProcessModel {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn add_node(&mut self, id: &str, kind: NodeKind, label: Option<&str>) -> &mut Self {
        self.nodes
            .push(ProcessNode::new(id, kind, label.map(str::to_string)));
        self
    }

    pub fn add_flow(&mut self, id: &str, source: &str, target: &str) -> &mut Self {
        self.flows.push(SequenceFlow::new(id, source, target));
        self
    }

    pub fn node(&self, id: &str) -> Option<&ProcessNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|node| node.id == id)
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &ProcessNode> {
        self.nodes.iter().filter(move |node| node.kind == kind)
    }

    pub fn incoming_count(&self, node_id: &str) -> usize {
        self.flows
            .iter()
            .filter(|flow| flow.target_id == node_id)
            .count()
    }

    pub fn outgoing_count(&self, node_id: &str) -> usize {
        self.flows
            .iter()
            .filter(|flow| flow.source_id == node_id)
            .count()
    }

    /// The first start event, or the first node when no start event exists.
    pub fn start_node_id(&self) -> Option<&str> {
        self.nodes_of_kind(NodeKind::Start)
            .next()
            .or_else(|| self.nodes.first())
            .map(|node| node.id.as_str())
    }

    pub fn adjacency(&self) -> Adjacency<'_> {
        let mut adjacency = Adjacency::default();
        for node in &self.nodes {
            adjacency.outgoing.entry(node.id.as_str()).or_default();
            adjacency.incoming.entry(node.id.as_str()).or_default();
        }
        for flow in &self.flows {
            adjacency
                .outgoing
                .entry(flow.source_id.as_str())
                .or_default()
                .push(flow.target_id.as_str());
            adjacency
                .incoming
                .entry(flow.target_id.as_str())
                .or_default()
                .push(flow.source_id.as_str());
        }
        adjacency
    }
}

impl From<ProcessModel> for ProcessDocument {
    fn from(process: ProcessModel) -> Self {
        Self { process }
    }
}
