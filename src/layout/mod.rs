pub mod bounds;
mod columns;
mod error;
mod ranking;
pub mod routing;
pub(crate) mod types;
pub use columns::assign_columns;
pub use error::LayoutError;
pub use ranking::compute_levels;
pub use types::*;

use crate::config::LayoutConfig;
use crate::ir::ProcessModel;
use std::collections::HashMap;
use tracing::debug;

use bounds::node_bounds;
use routing::route_edge;

/// Runs the full layout pipeline: levels, columns, bounds, edge routes.
///
/// Leveling and column assignment are total, so cyclic or disconnected
/// graphs still get a position for every node. The only failure is a flow
/// whose endpoint is not a node of the model, which validation rejects.
pub fn compute_layout(
    model: &ProcessModel,
    config: &LayoutConfig,
) -> Result<DiagramLayout, LayoutError> {
    let adjacency = model.adjacency();
    let start_id = model.start_node_id();
    let levels = compute_levels(model, &adjacency, start_id);
    let columns = assign_columns(model, &adjacency, start_id);

    let nodes: Vec<NodeLayout> = model
        .nodes
        .iter()
        .map(|node| {
            let level = levels.get(node.id.as_str()).copied().unwrap_or(0);
            let column = columns.get(node.id.as_str()).copied().unwrap_or(0);
            NodeLayout {
                id: node.id.clone(),
                kind: node.kind,
                label: node.label.clone(),
                level,
                column,
                bounds: node_bounds(node.kind, level, column, config),
            }
        })
        .collect();

    let by_id: HashMap<&str, &Bounds> = nodes
        .iter()
        .map(|node| (node.id.as_str(), &node.bounds))
        .collect();
    let lookup = |flow: &str, node: &str| {
        by_id
            .get(node)
            .copied()
            .ok_or_else(|| LayoutError::MissingBounds {
                flow: flow.to_string(),
                node: node.to_string(),
            })
    };

    let mut edges = Vec::with_capacity(model.flows.len());
    for flow in &model.flows {
        let source = lookup(&flow.id, &flow.source_id)?;
        let target = lookup(&flow.id, &flow.target_id)?;
        edges.push(EdgeLayout {
            id: flow.id.clone(),
            from: flow.source_id.clone(),
            to: flow.target_id.clone(),
            waypoints: route_edge(source, target, config),
        });
    }

    debug!(
        process = %model.id,
        nodes = nodes.len(),
        edges = edges.len(),
        depth = nodes.iter().map(|node| node.level).max().unwrap_or(0),
        "layout computed"
    );

    Ok(DiagramLayout {
        process_id: model.id.clone(),
        nodes,
        edges,
    })
}
