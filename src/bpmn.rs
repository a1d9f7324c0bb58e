//! BPMN 2.0 XML serialization.
//!
//! The document has two halves that reference the same ids: the semantic
//! `bpmn:process` (one element per node, then one `bpmn:sequenceFlow` per
//! flow) and the `bpmndi:BPMNDiagram` plane (one `BPMNShape` per node and one
//! `BPMNEdge` per flow, ids suffixed with `_di`).

use crate::ir::ProcessModel;
use crate::layout::DiagramLayout;

const DEFINITIONS_ID: &str = "Definitions_1";
const DIAGRAM_ID: &str = "BPMNDiagram_1";
const PLANE_ID: &str = "BPMNPlane_1";
/// Ids the serializer emits besides the model's own.
pub(crate) const RESERVED_IDS: [&str; 3] = [DEFINITIONS_ID, DIAGRAM_ID, PLANE_ID];
const TARGET_NAMESPACE: &str = "http://bpmn.io/schema/bpmn";

const NS_XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const NS_BPMN: &str = "http://www.omg.org/spec/BPMN/20100524/MODEL";
pub const NS_BPMNDI: &str = "http://www.omg.org/spec/BPMN/20100524/DI";
pub const NS_DC: &str = "http://www.omg.org/spec/DD/20100524/DC";
pub const NS_DI: &str = "http://www.omg.org/spec/DD/20100524/DI";

/// Renders `model` with the shapes and edges of `layout`.
///
/// Performs no validation: `layout` must come from
/// [`crate::layout::compute_layout`] on the same model.
pub fn render_bpmn(model: &ProcessModel, layout: &DiagramLayout) -> String {
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!(
        "<bpmn:definitions xmlns:xsi=\"{NS_XSI}\" xmlns:bpmn=\"{NS_BPMN}\" xmlns:bpmndi=\"{NS_BPMNDI}\" xmlns:dc=\"{NS_DC}\" xmlns:di=\"{NS_DI}\" id=\"{DEFINITIONS_ID}\" targetNamespace=\"{TARGET_NAMESPACE}\">",
    ));

    xml.push_str(&format!(
        "<bpmn:process id=\"{}\"{} isExecutable=\"false\">",
        escape_xml(&model.id),
        name_attr(model.name.as_deref())
    ));
    for node in &model.nodes {
        xml.push_str(&format!(
            "<bpmn:{} id=\"{}\"{} />",
            node.kind.element_name(),
            escape_xml(&node.id),
            name_attr(node.label.as_deref())
        ));
    }
    for flow in &model.flows {
        xml.push_str(&format!(
            "<bpmn:sequenceFlow id=\"{}\" sourceRef=\"{}\" targetRef=\"{}\" />",
            escape_xml(&flow.id),
            escape_xml(&flow.source_id),
            escape_xml(&flow.target_id)
        ));
    }
    xml.push_str("</bpmn:process>");

    xml.push_str(&format!(
        "<bpmndi:BPMNDiagram id=\"{DIAGRAM_ID}\"><bpmndi:BPMNPlane id=\"{PLANE_ID}\" bpmnElement=\"{}\">",
        escape_xml(&layout.process_id)
    ));
    for node in &layout.nodes {
        let id = escape_xml(&node.id);
        let b = node.bounds;
        xml.push_str(&format!(
            "<bpmndi:BPMNShape id=\"{id}_di\" bpmnElement=\"{id}\"><dc:Bounds x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" /></bpmndi:BPMNShape>",
            b.x, b.y, b.w, b.h
        ));
    }
    for edge in &layout.edges {
        let id = escape_xml(&edge.id);
        xml.push_str(&format!(
            "<bpmndi:BPMNEdge id=\"{id}_di\" bpmnElement=\"{id}\">"
        ));
        for point in &edge.waypoints {
            xml.push_str(&format!(
                "<di:waypoint x=\"{}\" y=\"{}\" />",
                point.x, point.y
            ));
        }
        xml.push_str("</bpmndi:BPMNEdge>");
    }
    xml.push_str("</bpmndi:BPMNPlane></bpmndi:BPMNDiagram>");

    xml.push_str("</bpmn:definitions>");
    xml
}

fn name_attr(name: Option<&str>) -> String {
    match name {
        Some(name) if !name.is_empty() => format!(" name=\"{}\"", escape_xml(name)),
        _ => String::new(),
    }
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
