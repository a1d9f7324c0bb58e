use std::collections::HashMap;

use crate::ir::{Adjacency, ProcessModel};

use super::types::round_half_up;

/// Signed lane offsets for a split with `count` branches: `-1, +1, -2, +2, ...`.
pub(super) fn split_offsets(count: usize) -> Vec<i32> {
    let mut offsets = Vec::with_capacity(count);
    let mut step = 1;
    for idx in 0..count {
        if idx % 2 == 0 {
            offsets.push(-step);
        } else {
            offsets.push(step);
            step += 1;
        }
    }
    offsets
}

/// Horizontal lane per node, 0 being the center.
///
/// Depth-first pre-order walk from `start_id`; the first column a node
/// receives wins. Splits fan their successors out with [`split_offsets`].
/// Afterwards every merge (more than one incoming flow) is re-centered on the
/// rounded mean of its predecessors, in model order. Unreached nodes get 0.
pub fn assign_columns<'a>(
    model: &'a ProcessModel,
    adjacency: &Adjacency<'a>,
    start_id: Option<&'a str>,
) -> HashMap<&'a str, i32> {
    let mut columns: HashMap<&'a str, i32> = HashMap::with_capacity(model.nodes.len());

    let mut stack: Vec<(&'a str, i32)> = Vec::new();
    if let Some(start) = start_id {
        stack.push((start, 0));
    }
    while let Some((node_id, column)) = stack.pop() {
        // A visited node already had its whole subtree walked.
        if columns.contains_key(node_id) {
            continue;
        }
        columns.insert(node_id, column);

        let successors = adjacency.outgoing(node_id);
        if successors.len() <= 1 {
            if let Some(&next) = successors.first() {
                stack.push((next, column));
            }
            continue;
        }
        let offsets = split_offsets(successors.len());
        // Reversed so the first declared branch is walked first.
        for (&next, offset) in successors.iter().zip(offsets).rev() {
            stack.push((next, column + offset));
        }
    }

    for node in &model.nodes {
        let parents = adjacency.incoming(&node.id);
        if parents.len() > 1 {
            let sum: i32 = parents
                .iter()
                .map(|parent| columns.get(parent).copied().unwrap_or(0))
                .sum();
            let mean = f64::from(sum) / parents.len() as f64;
            columns.insert(node.id.as_str(), round_half_up(mean));
        }
    }

    for node in &model.nodes {
        columns.entry(node.id.as_str()).or_insert(0);
    }
    columns
}
