use std::collections::{HashMap, HashSet, VecDeque};

use crate::ir::{Adjacency, ProcessModel};

/// Kahn-style traversal order seeded from `start_id`.
///
/// A node is enqueued once every registered predecessor has been dequeued.
/// Nodes never reached (disconnected, or stuck behind a cycle) are appended
/// in model order so the result always covers the whole model.
pub(super) fn traversal_order<'a>(
    model: &'a ProcessModel,
    adjacency: &Adjacency<'a>,
    start_id: Option<&'a str>,
) -> Vec<&'a str> {
    let mut indegree: HashMap<&str, usize> = model
        .nodes
        .iter()
        .map(|node| (node.id.as_str(), adjacency.incoming(&node.id).len()))
        .collect();

    let mut queue: VecDeque<&'a str> = VecDeque::new();
    if let Some(start) = start_id.filter(|id| indegree.contains_key(id)) {
        queue.push_back(start);
    }

    let mut order = Vec::with_capacity(model.nodes.len());
    let mut seen: HashSet<&str> = HashSet::new();
    while let Some(current) = queue.pop_front() {
        if !seen.insert(current) {
            continue;
        }
        order.push(current);
        for &next in adjacency.outgoing(current) {
            let Some(remaining) = indegree.get_mut(next) else {
                continue;
            };
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                queue.push_back(next);
            }
        }
    }

    for node in &model.nodes {
        if seen.insert(node.id.as_str()) {
            order.push(node.id.as_str());
        }
    }
    order
}

/// Longest-path depth per node.
///
/// The start node sits at level 0; every other node lands one below its
/// deepest predecessor, evaluated in traversal order. On cyclic input a node
/// keeps the level it last received, so the result is total but best effort.
pub fn compute_levels<'a>(
    model: &'a ProcessModel,
    adjacency: &Adjacency<'a>,
    start_id: Option<&'a str>,
) -> HashMap<&'a str, usize> {
    let order = traversal_order(model, adjacency, start_id);
    let mut levels: HashMap<&'a str, usize> = HashMap::with_capacity(order.len());
    if let Some(start) = start_id {
        levels.insert(start, 0);
    }

    for id in order {
        if Some(id) == start_id {
            continue;
        }
        let parents = adjacency.incoming(id);
        let level = parents
            .iter()
            .map(|parent| levels.get(parent).copied().unwrap_or(0) + 1)
            .max()
            .unwrap_or(0);
        levels.insert(id, level);
    }
    levels
}
