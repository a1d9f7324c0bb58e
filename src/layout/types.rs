use serde::Serialize;

use crate::ir::NodeKind;

/// Integer pixel rectangle, top-left anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Bounds {
    pub fn center_x(&self) -> i32 {
        round_half_up(f64::from(self.x) + f64::from(self.w) / 2.0)
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    /// Bottom-center exit point.
    pub fn exit_point(&self) -> Point {
        Point::new(self.center_x(), self.bottom())
    }

    /// Top-center entry point.
    pub fn entry_point(&self) -> Point {
        Point::new(self.center_x(), self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeLayout {
    pub id: String,
    pub kind: NodeKind,
    pub label: Option<String>,
    pub level: usize,
    pub column: i32,
    pub bounds: Bounds,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLayout {
    pub id: String,
    pub from: String,
    pub to: String,
    pub waypoints: Vec<Point>,
}

/// Result of one layout pass; nodes and edges keep model order.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramLayout {
    pub process_id: String,
    pub nodes: Vec<NodeLayout>,
    pub edges: Vec<EdgeLayout>,
}

impl DiagramLayout {
    pub fn node(&self, id: &str) -> Option<&NodeLayout> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&EdgeLayout> {
        self.edges.iter().find(|edge| edge.id == id)
    }

    /// Smallest rectangle covering every node and waypoint, if any.
    pub fn extent(&self) -> Option<Bounds> {
        let mut min_x = i32::MAX;
        let mut min_y = i32::MAX;
        let mut max_x = i32::MIN;
        let mut max_y = i32::MIN;
        for node in &self.nodes {
            min_x = min_x.min(node.bounds.x);
            min_y = min_y.min(node.bounds.y);
            max_x = max_x.max(node.bounds.right());
            max_y = max_y.max(node.bounds.bottom());
        }
        for point in self.edges.iter().flat_map(|edge| edge.waypoints.iter()) {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
        }
        if min_x > max_x {
            return None;
        }
        Some(Bounds {
            x: min_x,
            y: min_y,
            w: max_x - min_x,
            h: max_y - min_y,
        })
    }
}

/// Rounds half-way values toward positive infinity (`-0.5 -> 0`, `2.5 -> 3`).
pub(crate) fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}
